/// Module for folding per-contract detection results into corpus-wide statistics.
///
/// `AggregateStats` is a plain sum: `accumulate` adds one contract, `merge` adds another
/// shard. Both are associative and commutative, so workers can each own a shard and merge in
/// any order.
use crate::catalog::{Selector, SelectorCatalog};
use crate::detection::DetectionResult;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Which contracts contribute to `selector_counts`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TallyPolicy {
    /// Count the matched selectors of every contract.
    #[default]
    AllMatches,
    /// Count selectors only for contracts whose composite verdict is true.
    MatchingOnly,
}

/// Corpus-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_contracts: u64,
    pub matching_contracts: u64,
    /// Occurrences per selector, keyed in order of first appearance.
    pub selector_counts: IndexMap<Selector, u64>,
}

/// One row of the selector ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedSelector {
    pub name: &'static str,
    pub selector: Selector,
    pub count: u64,
}

/// Identifier used in rankings for selectors missing from the catalog.
pub const UNCATALOGUED: &str = "UNKNOWN";

impl AggregateStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one contract's result, counting every matched selector.
    pub fn accumulate(&mut self, result: &DetectionResult) {
        self.accumulate_with(result, TallyPolicy::AllMatches);
    }

    /// Adds one contract's result under `policy`.
    pub fn accumulate_with(&mut self, result: &DetectionResult, policy: TallyPolicy) {
        self.total_contracts += 1;
        let is_match = result.is_match();
        if is_match {
            self.matching_contracts += 1;
        }
        if is_match || policy == TallyPolicy::AllMatches {
            for selector in &result.matched_selectors {
                *self.selector_counts.entry(*selector).or_default() += 1;
            }
        }
    }

    /// Adds another shard into this one.
    pub fn merge(&mut self, other: Self) {
        self.total_contracts += other.total_contracts;
        self.matching_contracts += other.matching_contracts;
        for (selector, count) in other.selector_counts {
            *self.selector_counts.entry(selector).or_default() += count;
        }
    }

    /// Sum of all selector counts.
    pub fn total_selector_hits(&self) -> u64 {
        self.selector_counts.values().sum()
    }

    /// Selectors by count descending; ties follow catalog order, then selector value.
    pub fn rank(&self, catalog: &SelectorCatalog) -> Vec<RankedSelector> {
        let mut ranked: Vec<RankedSelector> = self
            .selector_counts
            .iter()
            .map(|(selector, &count)| RankedSelector {
                name: catalog.lookup(selector).unwrap_or(UNCATALOGUED),
                selector: *selector,
                count,
            })
            .collect();
        let tie_key = |r: &RankedSelector| {
            (
                catalog.position(&r.selector).unwrap_or(usize::MAX),
                r.selector,
            )
        };
        ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| tie_key(a).cmp(&tie_key(b))));
        ranked
    }
}

impl FromIterator<AggregateStats> for AggregateStats {
    fn from_iter<I: IntoIterator<Item = AggregateStats>>(shards: I) -> Self {
        shards.into_iter().fold(Self::default(), |mut acc, shard| {
            acc.merge(shard);
            acc
        })
    }
}

/// Adds `result` into `stats`.
pub fn accumulate(result: &DetectionResult, stats: &mut AggregateStats) {
    stats.accumulate(result);
}

/// Ranks the selectors in `stats`.
pub fn rank(stats: &AggregateStats, catalog: &SelectorCatalog) -> Vec<RankedSelector> {
    stats.rank(catalog)
}
