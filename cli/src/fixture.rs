//! Block fixture files and the offline state controller used by the CLI.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use seqindex_core::block::{ExecutionResult, StatelessBlock};
use seqindex_core::ids::{Address, Id, TxId};
use seqindex_core::parser::Genesis;
use seqindex_rpc::state::{AssetInfo, StateController, TxStatus};
use seqindex_rpc::ServiceError;

/// One accepted block and the execution results of its transactions.
///
/// ```json
/// { "block": { "parent": "1111...LpoYY", "timestamp": 100, "height": 0,
///              "txs": ["0x00000000..."], "state_root": "1111...LpoYY" },
///   "results": [{ "success": true }] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureBlock {
    pub block: StatelessBlock,
    #[serde(default)]
    pub results: Vec<ExecutionResult>,
}

/// Read a JSON array of [`FixtureBlock`]s.
pub fn load_blocks(path: &Path) -> Result<Vec<FixtureBlock>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading block fixtures from {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

/// Read a JSON document, or fall back to its default when no path is given.
pub fn load_json<T>(path: Option<&Path>) -> Result<T>
where
    T: serde::de::DeserializeOwned + Default,
{
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
        }
        None => Ok(T::default()),
    }
}

/// A controller with no chain state behind it: every lookup misses.
pub struct OfflineState {
    genesis: Genesis,
}

impl OfflineState {
    pub fn new(genesis: Genesis) -> Self {
        Self { genesis }
    }
}

#[async_trait]
impl StateController for OfflineState {
    fn genesis(&self) -> Genesis {
        self.genesis.clone()
    }

    async fn transaction(&self, _tx_id: TxId) -> Result<Option<TxStatus>, ServiceError> {
        Ok(None)
    }

    async fn asset(&self, _asset: Id) -> Result<Option<AssetInfo>, ServiceError> {
        Ok(None)
    }

    async fn balance(&self, _address: Address, _asset: Id) -> Result<u64, ServiceError> {
        Ok(0)
    }

    async fn loan(&self, _asset: Id, _destination: Id) -> Result<u64, ServiceError> {
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seqindex_core::ids::EMPTY_CB58;

    #[test]
    fn fixture_json_shape() {
        let json = format!(
            r#"[{{
                "block": {{
                    "parent": "{EMPTY_CB58}",
                    "timestamp": 100,
                    "height": 0,
                    "txs": ["0x0a0b"],
                    "state_root": "{EMPTY_CB58}"
                }},
                "results": [{{ "success": false }}]
            }}]"#
        );
        let blocks: Vec<FixtureBlock> = serde_json::from_str(&json).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].block.txs[0].as_bytes(), &[0x0a, 0x0b]);
        assert!(!blocks[0].results[0].success);
    }

    #[tokio::test]
    async fn offline_state_misses() {
        let state = OfflineState::new(Genesis::default());
        assert_eq!(state.transaction(Id::EMPTY).await.unwrap(), None);
        assert_eq!(state.balance(Address::new([0; 33]), Id::EMPTY).await.unwrap(), 0);
    }
}
