//! Parser adapter: chain id, rules per timestamp, and the registries needed to
//! decode raw transactions.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::block::Transaction;
use crate::error::DecodeError;
use crate::ids::Id;
use crate::registry::{
    decode_transaction, ActionRegistry, AuthRegistry, DecodedTransaction, MemoryActionRegistry,
    MemoryAuthRegistry,
};

// ─── Genesis / Rules ──────────────────────────────────────────────────────────

/// Genesis configuration of the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genesis {
    /// Human-readable address prefix.
    #[serde(default = "default_hrp")]
    pub hrp: String,
    /// Minimum gap between blocks (milliseconds).
    pub min_block_gap: i64,
    /// Window in which a transaction stays valid (milliseconds).
    pub valid_window: i64,
    /// Maximum number of transactions per block.
    pub max_block_txs: usize,
    /// Base fee per transaction.
    pub base_fee: u64,
    /// Rule changes that activate at a timestamp, in activation order.
    #[serde(default)]
    pub upgrades: Vec<RuleUpgrade>,
}

fn default_hrp() -> String {
    "seq".into()
}

impl Default for Genesis {
    fn default() -> Self {
        Self {
            hrp: default_hrp(),
            min_block_gap: 100,
            valid_window: 60_000,
            max_block_txs: 20_000,
            base_fee: 100,
            upgrades: Vec::new(),
        }
    }
}

/// Rule parameters overridden from `activation` (unix ms) onwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleUpgrade {
    pub activation: i64,
    #[serde(default)]
    pub min_block_gap: Option<i64>,
    #[serde(default)]
    pub max_block_txs: Option<usize>,
    #[serde(default)]
    pub base_fee: Option<u64>,
}

impl Genesis {
    /// Rules in force at `timestamp`.
    pub fn rules(&self, timestamp: i64, network_id: u32, chain_id: Id) -> Rules {
        let mut rules = Rules {
            network_id,
            chain_id,
            min_block_gap: self.min_block_gap,
            valid_window: self.valid_window,
            max_block_txs: self.max_block_txs,
            base_fee: self.base_fee,
        };
        for upgrade in self.upgrades.iter().filter(|u| u.activation <= timestamp) {
            if let Some(gap) = upgrade.min_block_gap {
                rules.min_block_gap = gap;
            }
            if let Some(max) = upgrade.max_block_txs {
                rules.max_block_txs = max;
            }
            if let Some(fee) = upgrade.base_fee {
                rules.base_fee = fee;
            }
        }
        rules
    }
}

/// Rule set in force for a given timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rules {
    pub network_id: u32,
    pub chain_id: Id,
    pub min_block_gap: i64,
    pub valid_window: i64,
    pub max_block_txs: usize,
    pub base_fee: u64,
}

// ─── Parser ───────────────────────────────────────────────────────────────────

/// Everything needed to turn raw transaction bytes into typed actions.
pub trait Parser: Send + Sync {
    fn chain_id(&self) -> Id;

    fn rules(&self, timestamp: i64) -> Rules;

    fn registry(&self) -> (&dyn ActionRegistry, &dyn AuthRegistry);
}

impl Transaction {
    /// Decode this transaction through `parser`'s registries.
    pub fn decode(&self, parser: &dyn Parser) -> Result<DecodedTransaction, DecodeError> {
        let (actions, auths) = parser.registry();
        decode_transaction(self, actions, auths)
    }
}

/// The node's parser: genesis plus the injected registries.
///
/// Immutable after construction; share it behind an `Arc`.
pub struct ServerParser {
    network_id: u32,
    chain_id: Id,
    genesis: Arc<Genesis>,
    actions: Arc<dyn ActionRegistry>,
    auths: Arc<dyn AuthRegistry>,
}

impl ServerParser {
    /// Parser over the default in-memory registries.
    pub fn new(network_id: u32, chain_id: Id, genesis: Arc<Genesis>) -> Self {
        Self::with_registries(
            network_id,
            chain_id,
            genesis,
            Arc::new(MemoryActionRegistry::new()),
            Arc::new(MemoryAuthRegistry::new()),
        )
    }

    pub fn with_registries(
        network_id: u32,
        chain_id: Id,
        genesis: Arc<Genesis>,
        actions: Arc<dyn ActionRegistry>,
        auths: Arc<dyn AuthRegistry>,
    ) -> Self {
        Self {
            network_id,
            chain_id,
            genesis,
            actions,
            auths,
        }
    }

    pub fn genesis(&self) -> &Genesis {
        &self.genesis
    }
}

impl Parser for ServerParser {
    fn chain_id(&self) -> Id {
        self.chain_id
    }

    fn rules(&self, timestamp: i64) -> Rules {
        self.genesis.rules(timestamp, self.network_id, self.chain_id)
    }

    fn registry(&self) -> (&dyn ActionRegistry, &dyn AuthRegistry) {
        (self.actions.as_ref(), self.auths.as_ref())
    }
}
