//! Catalog of known token-service selectors.
//!
//! The catalog is an immutable value built once (usually at process start) and handed to the
//! detectors by reference. It also carries the reserved system-contract address literal and
//! the token-creation subset used by the secp256k1 heuristic.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use sysprobe_utils::errors::SelectorError;

/// Short-form address of the token-service system contract (`0x167`), as a compiler emits it
/// with leading zero bytes elided.
pub const TOKEN_SERVICE_ADDRESS: [u8; 2] = [0x01, 0x67];

/// 4-byte function selector.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Selector(pub [u8; 4]);

impl Selector {
    /// Builds a selector from its big-endian integer form, e.g. `0x189a554c`.
    pub const fn from_u32(value: u32) -> Self {
        Self(value.to_be_bytes())
    }

    /// Returns the selector for `bytes` if it is exactly four bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; 4]>::try_from(bytes).ok().map(Self)
    }

    /// Computes `keccak256(signature)[..4]` for a canonical signature such as
    /// `allowance(address,address)`.
    pub fn from_signature(signature: &str) -> Self {
        let hash = Keccak256::digest(signature.as_bytes());
        Self([hash[0], hash[1], hash[2], hash[3]])
    }

    /// Big-endian integer form.
    pub const fn as_u32(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.as_u32())
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector(0x{self})")
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let clean = s.trim();
        let clean = clean.strip_prefix("0x").unwrap_or(clean);
        let bytes = hex::decode(clean)?;
        Self::from_slice(&bytes).ok_or(SelectorError::InvalidLength(bytes.len()))
    }
}

impl Serialize for Selector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Selector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A catalog row: selector, canonical identifier and the Solidity signature it derives from.
///
/// Struct parameters are written by their Solidity type name (`HederaToken`), so only
/// signatures made of elementary types hash back to `selector`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorEntry {
    pub selector: Selector,
    pub name: &'static str,
    pub signature: &'static str,
}

/// Token-service functions, in the order reports list them on ties.
const TOKEN_SERVICE_SELECTORS: &[(u32, &str, &str)] = &[
    (0x189a554c, "ABI_ID_CRYPTO_TRANSFER", "cryptoTransfer(TokenTransferList[])"),
    (0x0e71804f, "ABI_ID_CRYPTO_TRANSFER_V2", "cryptoTransfer(TransferList,TokenTransferList[])"),
    (0x278e0b88, "ABI_ID_MINT_TOKEN", "mintToken(address,uint64,bytes[])"),
    (0xe0f4059a, "ABI_ID_MINT_TOKEN_V2", "mintToken(address,int64,bytes[])"),
    (0xacb9cff9, "ABI_ID_BURN_TOKEN", "burnToken(address,uint64,int64[])"),
    (0xd6910d06, "ABI_ID_BURN_TOKEN_V2", "burnToken(address,int64,int64[])"),
    (0x2e63879b, "ABI_ID_ASSOCIATE_TOKENS", "associateTokens(address,address[])"),
    (0x49146bde, "ABI_ID_ASSOCIATE_TOKEN", "associateToken(address,address)"),
    (0x78b63918, "ABI_ID_DISSOCIATE_TOKENS", "dissociateTokens(address,address[])"),
    (0x099794e8, "ABI_ID_DISSOCIATE_TOKEN", "dissociateToken(address,address)"),
    (0x7812a04b, "ABI_ID_CREATE_FUNGIBLE_TOKEN", "createFungibleToken(HederaToken,uint256,uint256)"),
    (0xc23baeb6, "ABI_ID_CREATE_FUNGIBLE_TOKEN_V2", "createFungibleToken(HederaToken,uint64,uint32)"),
    (0x0fb65bf3, "ABI_ID_CREATE_FUNGIBLE_TOKEN_V3", "createFungibleToken(HederaToken,int64,int32)"),
    (0x4c381ae7, "ABI_ID_CREATE_FUNGIBLE_TOKEN_WITH_FEES", "createFungibleTokenWithCustomFees(HederaToken,uint256,uint256,FixedFee[],FractionalFee[])"),
    (0xb937581a, "ABI_ID_CREATE_FUNGIBLE_TOKEN_WITH_FEES_V2", "createFungibleTokenWithCustomFees(HederaToken,uint64,uint32,FixedFee[],FractionalFee[])"),
    (0x2af0c59a, "ABI_ID_CREATE_FUNGIBLE_TOKEN_WITH_FEES_V3", "createFungibleTokenWithCustomFees(HederaToken,int64,int32,FixedFee[],FractionalFee[])"),
    (0x9dc711e0, "ABI_ID_CREATE_NON_FUNGIBLE_TOKEN", "createNonFungibleToken(HederaToken)"),
    (0x9c89bb35, "ABI_ID_CREATE_NON_FUNGIBLE_TOKEN_V2", "createNonFungibleToken(HederaToken)"),
    (0xea83f293, "ABI_ID_CREATE_NON_FUNGIBLE_TOKEN_V3", "createNonFungibleToken(HederaToken)"),
    (0x5bc7c0e6, "ABI_ID_CREATE_NON_FUNGIBLE_TOKEN_WITH_FEES", "createNonFungibleTokenWithCustomFees(HederaToken,FixedFee[],RoyaltyFee[])"),
    (0x45733969, "ABI_ID_CREATE_NON_FUNGIBLE_TOKEN_WITH_FEES_V2", "createNonFungibleTokenWithCustomFees(HederaToken,FixedFee[],RoyaltyFee[])"),
    (0xabb54eb5, "ABI_ID_CREATE_NON_FUNGIBLE_TOKEN_WITH_FEES_V3", "createNonFungibleTokenWithCustomFees(HederaToken,FixedFee[],RoyaltyFee[])"),
    (0x82bba493, "ABI_ID_TRANSFER_TOKENS", "transferTokens(address,address[],int64[])"),
    (0xeca36917, "ABI_ID_TRANSFER_TOKEN", "transferToken(address,address,address,int64)"),
    (0x2c4ba191, "ABI_ID_TRANSFER_NFTS", "transferNFTs(address,address[],address[],int64[])"),
    (0x5cfc9011, "ABI_ID_TRANSFER_NFT", "transferNFT(address,address,address,int64)"),
    (0xe1f21c67, "ABI_ID_APPROVE", "approve(address,address,uint256)"),
    (0x15dacbea, "ABI_ID_TRANSFER_FROM", "transferFrom(address,address,address,uint256)"),
    (0xdd62ed3e, "ABI_ID_ERC_ALLOWANCE", "allowance(address,address)"),
    (0x7336aaf0, "ABI_ID_APPROVE_NFT", "approveNFT(address,address,uint256)"),
    (0x9b23d3d9, "ABI_ID_TRANSFER_FROM_NFT", "transferFromNFT(address,address,address,uint256)"),
    (0x098f2366, "ABI_ID_GET_APPROVED", "getApproved(address,uint256)"),
    (0x367605ca, "ABI_ID_SET_APPROVAL_FOR_ALL", "setApprovalForAll(address,address,bool)"),
    (0xf49f40db, "ABI_ID_IS_APPROVED_FOR_ALL", "isApprovedForAll(address,address,address)"),
    (0x46de0fb1, "ABI_ID_IS_FROZEN", "isFrozen(address,address)"),
    (0xf2c31ff4, "ABI_ID_IS_KYC", "isKyc(address,address)"),
    (0xf069f712, "ABI_ID_DELETE_TOKEN", "deleteToken(address)"),
    (0xae7611a0, "ABI_ID_GET_TOKEN_CUSTOM_FEES", "getTokenCustomFees(address)"),
    (0xa7daa18d, "ABI_ID_GET_TOKEN_DEFAULT_FREEZE_STATUS", "getTokenDefaultFreezeStatus(address)"),
    (0x335e04c1, "ABI_ID_GET_TOKEN_DEFAULT_KYC_STATUS", "getTokenDefaultKycStatus(address)"),
    (0xd614cdb8, "ABI_ID_GET_TOKEN_EXPIRY_INFO", "getTokenExpiryInfo(address)"),
    (0x3f28a19b, "ABI_ID_GET_FUNGIBLE_TOKEN_INFO", "getFungibleTokenInfo(address)"),
    (0x1f69565f, "ABI_ID_GET_TOKEN_INFO", "getTokenInfo(address)"),
    (0x287e1da8, "ABI_ID_GET_NON_FUNGIBLE_TOKEN_INFO", "getNonFungibleTokenInfo(address,int64)"),
    (0x3c4dd32e, "ABI_ID_GET_TOKEN_KEY", "getTokenKey(address,uint256)"),
    (0x5b8f8584, "ABI_ID_FREEZE", "freezeToken(address,address)"),
    (0x52f91387, "ABI_ID_UNFREEZE", "unfreezeToken(address,address)"),
    (0x8f8d7f99, "ABI_ID_GRANT_TOKEN_KYC", "grantTokenKyc(address,address)"),
    (0xaf99c633, "ABI_ID_REVOKE_TOKEN_KYC", "revokeTokenKyc(address,address)"),
    (0x7c41ad2c, "ABI_ID_PAUSE_TOKEN", "pauseToken(address)"),
    (0x3b3bff0f, "ABI_ID_UNPAUSE_TOKEN", "unpauseToken(address)"),
    (0x9790686d, "ABI_WIPE_TOKEN_ACCOUNT_FUNGIBLE", "wipeTokenAccount(address,address,uint32)"),
    (0xefef57f9, "ABI_WIPE_TOKEN_ACCOUNT_FUNGIBLE_V2", "wipeTokenAccount(address,address,int64)"),
    (0xf7f38e26, "ABI_WIPE_TOKEN_ACCOUNT_NFT", "wipeTokenAccountNFT(address,address,int64[])"),
    (0x2cccc36f, "ABI_ID_UPDATE_TOKEN_INFO", "updateTokenInfo(address,HederaToken)"),
    (0x18370d34, "ABI_ID_UPDATE_TOKEN_INFO_V2", "updateTokenInfo(address,HederaToken)"),
    (0x7d305cfa, "ABI_ID_UPDATE_TOKEN_INFO_V3", "updateTokenInfo(address,HederaToken)"),
    (0x593d6e82, "ABI_ID_UPDATE_TOKEN_EXPIRY_INFO", "updateTokenExpiryInfo(address,Expiry)"),
    (0xd27be6cd, "ABI_ID_UPDATE_TOKEN_EXPIRY_INFO_V2", "updateTokenExpiryInfo(address,Expiry)"),
    (0x6fc3cbaf, "ABI_ID_UPDATE_TOKEN_KEYS", "updateTokenKeys(address,TokenKey[])"),
    (0x19f37361, "ABI_ID_IS_TOKEN", "isToken(address)"),
    (0x93272baf, "ABI_ID_GET_TOKEN_TYPE", "getTokenType(address)"),
    (0x618dc65e, "ABI_ID_REDIRECT_FOR_TOKEN", "redirectForToken(address,bytes)"),
];

/// `createFungibleToken` / `createNonFungibleToken` variants (plain and with custom fees) that
/// the secp256k1 key heuristic looks for.
const TOKEN_CREATION_SELECTORS: [Selector; 4] = [
    Selector::from_u32(0x0fb65bf3),
    Selector::from_u32(0x2af0c59a),
    Selector::from_u32(0xea83f293),
    Selector::from_u32(0xabb54eb5),
];

/// Immutable selector catalog.
#[derive(Debug, Clone)]
pub struct SelectorCatalog {
    entries: Vec<SelectorEntry>,
    index: HashMap<Selector, usize>,
    system_contract_address: Vec<u8>,
    token_creation: Vec<Selector>,
}

impl Default for SelectorCatalog {
    fn default() -> Self {
        Self::token_service()
    }
}

impl SelectorCatalog {
    /// The token-service catalog: 63 selectors, address `0x167`.
    pub fn token_service() -> Self {
        let entries = TOKEN_SERVICE_SELECTORS
            .iter()
            .map(|&(value, name, signature)| SelectorEntry {
                selector: Selector::from_u32(value),
                name,
                signature,
            })
            .collect();
        Self::new(
            entries,
            TOKEN_SERVICE_ADDRESS.to_vec(),
            TOKEN_CREATION_SELECTORS.to_vec(),
        )
    }

    /// Builds a catalog from explicit parts. Later duplicates of a selector are ignored.
    pub fn new(
        entries: Vec<SelectorEntry>,
        system_contract_address: Vec<u8>,
        token_creation: Vec<Selector>,
    ) -> Self {
        let mut index = HashMap::with_capacity(entries.len());
        let mut unique = Vec::with_capacity(entries.len());
        for entry in entries {
            if index.contains_key(&entry.selector) {
                tracing::warn!("duplicate catalog selector {} ignored", entry.selector);
                continue;
            }
            index.insert(entry.selector, unique.len());
            unique.push(entry);
        }
        Self {
            entries: unique,
            index,
            system_contract_address,
            token_creation,
        }
    }

    /// Identifier for `selector`, if catalogued.
    pub fn lookup(&self, selector: &Selector) -> Option<&'static str> {
        self.entry(selector).map(|e| e.name)
    }

    pub fn contains(&self, selector: &Selector) -> bool {
        self.index.contains_key(selector)
    }

    pub fn entry(&self, selector: &Selector) -> Option<&SelectorEntry> {
        self.index.get(selector).map(|&i| &self.entries[i])
    }

    /// Position of `selector` in catalog order.
    pub fn position(&self, selector: &Selector) -> Option<usize> {
        self.index.get(selector).copied()
    }

    /// All `(selector, identifier)` pairs in catalog order.
    pub fn enumerate(&self) -> impl Iterator<Item = (Selector, &'static str)> + '_ {
        self.entries.iter().map(|e| (e.selector, e.name))
    }

    pub fn entries(&self) -> &[SelectorEntry] {
        &self.entries
    }

    /// Reserved system-contract address in short form (no leading zero bytes).
    pub fn system_contract_address(&self) -> &[u8] {
        &self.system_contract_address
    }

    /// Selectors identifying the token-creation variants.
    pub fn token_creation_selectors(&self) -> &[Selector] {
        &self.token_creation
    }

    pub fn is_token_creation(&self, selector: &Selector) -> bool {
        self.token_creation.contains(selector)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
