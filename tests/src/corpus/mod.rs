mod harvest;
mod mirror;
mod scan;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One contract served by the mock mirror node.
#[derive(Debug, Clone)]
pub(crate) struct MockContract {
    pub num: u64,
    pub bytecode: &'static str,
    pub runtime_bytecode: &'static str,
}

impl MockContract {
    pub(crate) const fn new(num: u64, runtime_bytecode: &'static str) -> Self {
        Self {
            num,
            bytecode: "0x6080",
            runtime_bytecode,
        }
    }

    /// A contract whose record carries neither init nor runtime code.
    pub(crate) const fn without_code(num: u64) -> Self {
        Self {
            num,
            bytecode: "0x",
            runtime_bytecode: "0x",
        }
    }

    pub(crate) fn contract_id(&self) -> String {
        format!("0.0.{}", self.num)
    }

    pub(crate) fn evm_address(&self) -> String {
        format!("0x{:040x}", self.num)
    }

    fn summary(&self) -> Value {
        json!({ "contract_id": self.contract_id(), "evm_address": self.evm_address() })
    }

    fn record(&self) -> Value {
        json!({
            "contract_id": self.contract_id(),
            "evm_address": self.evm_address(),
            "bytecode": self.bytecode,
            "runtime_bytecode": self.runtime_bytecode,
        })
    }
}

#[derive(Clone)]
struct MirrorState {
    contracts: Arc<Vec<MockContract>>,
    hits: Arc<AtomicUsize>,
}

/// In-process stand-in for the mirror node REST API.
pub(crate) struct MockMirror {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl MockMirror {
    /// Number of single-contract requests served so far.
    pub(crate) fn contract_hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

pub(crate) async fn spawn_mirror(mut contracts: Vec<MockContract>) -> MockMirror {
    contracts.sort_by(|a, b| b.num.cmp(&a.num));
    let hits = Arc::new(AtomicUsize::new(0));
    let state = MirrorState {
        contracts: Arc::new(contracts),
        hits: Arc::clone(&hits),
    };
    let app = Router::new()
        .route("/api/v1/contracts", get(list_contracts))
        .route("/api/v1/contracts/:id", get(get_contract))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tracing::debug!("mock mirror node on {}", addr);

    MockMirror {
        base_url: format!("http://{addr}"),
        hits,
    }
}

async fn list_contracts(
    State(state): State<MirrorState>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let limit: usize = query
        .get("limit")
        .and_then(|l| l.parse().ok())
        .unwrap_or(25);
    let below: Option<u64> = query
        .get("contract.id")
        .and_then(|v| v.strip_prefix("lt:"))
        .and_then(|id| id.rsplit('.').next())
        .and_then(|num| num.parse().ok());

    let remaining: Vec<&MockContract> = state
        .contracts
        .iter()
        .filter(|c| below.is_none_or(|b| c.num < b))
        .collect();
    let page: Vec<&MockContract> = remaining.iter().copied().take(limit).collect();
    let next = match page.last() {
        Some(last) if remaining.len() > page.len() => Value::String(format!(
            "/api/v1/contracts?limit={limit}&order=desc&contract.id=lt:{}",
            last.contract_id()
        )),
        _ => Value::Null,
    };

    Json(json!({
        "contracts": page.iter().map(|c| c.summary()).collect::<Vec<_>>(),
        "links": { "next": next },
    }))
}

async fn get_contract(
    State(state): State<MirrorState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state
        .contracts
        .iter()
        .find(|c| c.contract_id() == id || c.evm_address() == id)
        .map(|c| Json(c.record()))
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "_status": { "messages": [{ "message": "Not found" }] } })),
            )
        })
}

/// Six contracts 0.0.1001..=0.0.1006. 0.0.1002 has no code at all; 0.0.1006 has no runtime
/// code and falls back to init code.
pub(crate) fn fixture_contracts() -> Vec<MockContract> {
    vec![
        // PUSH4 cryptoTransfer, PUSH2 0x0167, CALL
        MockContract::new(1001, "0x63189a554c610167f1"),
        MockContract::without_code(1002),
        // PUSH4 associateToken twice, PUSH20 padded address, CALL
        MockContract::new(
            1003,
            "0x6349146bde6349146bde730000000000000000000000000000000000000167f1",
        ),
        // selector literal without any call
        MockContract::new(1004, "0x63189a554c00"),
        // PUSH1 0x03, PUSH4 createFungibleToken, PUSH2 0x0167, CALL
        MockContract::new(1005, "0x6003630fb65bf3610167f1"),
        MockContract::new(1006, "0x"),
    ]
}
