//! Blocks, raw transactions and execution results as delivered by the engine.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ids::{BlockId, Id, TxId};

// ─── Transaction ──────────────────────────────────────────────────────────────

/// A raw, still-encoded transaction.
///
/// Layout: `[action type u8][action len u32 BE][action][auth type u8][auth]`.
/// Decoding goes through a [`Parser`](crate::parser::Parser)'s registries.
#[derive(Clone, PartialEq, Eq)]
pub struct Transaction {
    bytes: Vec<u8>,
}

impl Transaction {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into() }
    }

    /// Assemble a transaction from its action and auth parts.
    pub fn encode(action_type: u8, action: &[u8], auth_type: u8, auth: &[u8]) -> Self {
        let mut bytes = Vec::with_capacity(1 + 4 + action.len() + 1 + auth.len());
        bytes.push(action_type);
        bytes.extend_from_slice(&(action.len() as u32).to_be_bytes());
        bytes.extend_from_slice(action);
        bytes.push(auth_type);
        bytes.extend_from_slice(auth);
        Self { bytes }
    }

    /// The transaction id: `sha256` of the raw bytes.
    pub fn id(&self) -> TxId {
        Id::digest(&self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("id", &self.id())
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(&self.bytes)))
    }
}

impl<'de> Deserialize<'de> for Transaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let s = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(s)
            .map(Self::new)
            .map_err(serde::de::Error::custom)
    }
}

// ─── ExecutionResult ──────────────────────────────────────────────────────────

/// Outcome of executing one transaction, parallel to the block's tx list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    #[serde(default)]
    pub fee: u64,
    #[serde(default)]
    pub output: Vec<u8>,
}

impl ExecutionResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn failed() -> Self {
        Self::default()
    }
}

// ─── StatelessBlock ───────────────────────────────────────────────────────────

/// A finalized block as handed over by the consensus/VM engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatelessBlock {
    /// Parent block id.
    pub parent: BlockId,
    /// Unix timestamp in milliseconds.
    pub timestamp: i64,
    pub height: u64,
    pub txs: Vec<Transaction>,
    pub state_root: Id,
}

// ─── BlockHeader ──────────────────────────────────────────────────────────────

/// The retained view of an accepted block, keyed by its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub id: BlockId,
    pub parent: BlockId,
    pub timestamp: i64,
    pub height: u64,
    pub state_root: Id,
    pub txs: Vec<Transaction>,
}

impl BlockHeader {
    pub fn new(id: BlockId, block: &StatelessBlock) -> Self {
        Self {
            id,
            parent: block.parent,
            timestamp: block.timestamp,
            height: block.height,
            state_root: block.state_root,
            txs: block.txs.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_layout() {
        let tx = Transaction::encode(7, &[1, 2, 3], 1, &[9]);
        assert_eq!(tx.as_bytes(), &[7, 0, 0, 0, 3, 1, 2, 3, 1, 9]);
    }

    #[test]
    fn tx_id_is_content_hash() {
        let a = Transaction::new(vec![1, 2, 3]);
        let b = Transaction::new(vec![1, 2, 3]);
        let c = Transaction::new(vec![3, 2, 1]);
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn transaction_serde_hex() {
        let tx = Transaction::new(vec![0xde, 0xad]);
        let json = serde_json::to_string(&tx).unwrap();
        assert_eq!(json, "\"0xdead\"");
        let back: Transaction = serde_json::from_str("\"dead\"").unwrap();
        assert_eq!(back, tx);
    }

    #[test]
    fn execution_result_defaults() {
        let r: ExecutionResult = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(r, ExecutionResult::ok());
    }
}
