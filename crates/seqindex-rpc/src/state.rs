//! State lookups answered by the node's controller rather than the index.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use seqindex_core::ids::{Address, Id, TxId};
use seqindex_core::parser::Genesis;

use crate::error::ServiceError;

/// Resource usage of a transaction:
/// bandwidth, compute, storage read, storage allocate, storage write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dimensions(pub [u64; 5]);

/// Execution record of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxStatus {
    pub timestamp: i64,
    pub success: bool,
    pub units: Dimensions,
    pub fee: u64,
}

/// Asset metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetInfo {
    pub symbol: Vec<u8>,
    pub decimals: u8,
    pub metadata: Vec<u8>,
    pub supply: u64,
    pub owner: Address,
    pub warp: bool,
}

/// The node-side collaborator that owns chain state.
///
/// `Ok(None)` means "not there"; `Err` is reserved for failures.
#[async_trait]
pub trait StateController: Send + Sync {
    fn genesis(&self) -> Genesis;

    async fn transaction(&self, tx_id: TxId) -> Result<Option<TxStatus>, ServiceError>;

    async fn asset(&self, asset: Id) -> Result<Option<AssetInfo>, ServiceError>;

    async fn balance(&self, address: Address, asset: Id) -> Result<u64, ServiceError>;

    async fn loan(&self, asset: Id, destination: Id) -> Result<u64, ServiceError>;
}

// ─── Request / response shapes ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisReply {
    pub genesis: Genesis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxArgs {
    #[serde(rename = "txId")]
    pub tx_id: TxId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReply {
    pub timestamp: i64,
    pub success: bool,
    pub units: Dimensions,
    pub fee: u64,
}

impl From<TxStatus> for TxReply {
    fn from(s: TxStatus) -> Self {
        Self {
            timestamp: s.timestamp,
            success: s.success,
            units: s.units,
            fee: s.fee,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetArgs {
    pub asset: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReply {
    pub symbol: Vec<u8>,
    pub decimals: u8,
    pub metadata: Vec<u8>,
    pub supply: u64,
    /// Owner address in text form.
    pub owner: String,
    pub warp: bool,
}

impl From<AssetInfo> for AssetReply {
    fn from(a: AssetInfo) -> Self {
        Self {
            symbol: a.symbol,
            decimals: a.decimals,
            metadata: a.metadata,
            supply: a.supply,
            owner: a.owner.to_string(),
            warp: a.warp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceArgs {
    /// Address text; parsed by the handler so a bad value is a client error.
    pub address: String,
    pub asset: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceReply {
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanArgs {
    pub destination: Id,
    pub asset: Id,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanReply {
    pub amount: u64,
}
