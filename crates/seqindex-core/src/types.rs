//! Namespace partition types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::block::StatelessBlock;
use crate::ids::{BlockId, Id, TxId};

// ─── NamespaceTransaction ─────────────────────────────────────────────────────

/// A successful sequencer message, as seen by one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceTransaction {
    /// Hex-encoded chain id of the message.
    pub namespace: String,
    pub tx_id: TxId,
    /// Position of the transaction in its block.
    pub index: u64,
    /// Opaque message payload.
    pub transaction: Vec<u8>,
}

// ─── SequencerBlock ───────────────────────────────────────────────────────────

/// A block's successful sequencer messages grouped by namespace.
///
/// Lists keep block order. Namespaces without qualifying transactions are
/// absent rather than present with an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencerBlock {
    pub parent: BlockId,
    pub timestamp: i64,
    pub height: u64,
    pub state_root: Id,
    pub txs: BTreeMap<String, Vec<NamespaceTransaction>>,
}

impl SequencerBlock {
    /// An empty partition carrying `block`'s header fields.
    pub fn for_block(block: &StatelessBlock) -> Self {
        Self {
            parent: block.parent,
            timestamp: block.timestamp,
            height: block.height,
            state_root: block.state_root,
            txs: BTreeMap::new(),
        }
    }

    /// Append `tx` to its namespace's list.
    pub fn push(&mut self, tx: NamespaceTransaction) {
        self.txs.entry(tx.namespace.clone()).or_default().push(tx);
    }

    /// Transactions for `namespace`, empty if it had none.
    pub fn namespace(&self, namespace: &str) -> &[NamespaceTransaction] {
        self.txs.get(namespace).map(Vec::as_slice).unwrap_or_default()
    }

    /// Namespaces with at least one transaction, in lexical order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.txs.keys().map(String::as_str)
    }

    /// Total transactions across all namespaces.
    pub fn tx_count(&self) -> usize {
        self.txs.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns_tx(namespace: &str, index: u64) -> NamespaceTransaction {
        NamespaceTransaction {
            namespace: namespace.into(),
            tx_id: Id::digest(&index.to_be_bytes()),
            index,
            transaction: vec![index as u8],
        }
    }

    #[test]
    fn push_groups_by_namespace_in_order() {
        let mut block = SequencerBlock::default();
        block.push(ns_tx("aa", 0));
        block.push(ns_tx("bb", 1));
        block.push(ns_tx("aa", 3));

        let aa: Vec<u64> = block.namespace("aa").iter().map(|t| t.index).collect();
        assert_eq!(aa, vec![0, 3]);
        assert_eq!(block.namespace("bb").len(), 1);
        assert_eq!(block.tx_count(), 3);
        assert_eq!(block.namespaces().collect::<Vec<_>>(), vec!["aa", "bb"]);
    }

    #[test]
    fn missing_namespace_is_empty() {
        let block = SequencerBlock::default();
        assert!(block.namespace("cc").is_empty());
    }
}
