//! Block identifier derivation.

use sha2::{Digest, Sha256};

use crate::block::{ExecutionResult, StatelessBlock};
use crate::error::CodecError;
use crate::ids::{BlockId, Id};

/// Derives the canonical id of an accepted block.
pub trait BlockCodec: Send + Sync {
    fn block_id(
        &self,
        block: &StatelessBlock,
        results: &[ExecutionResult],
    ) -> Result<BlockId, CodecError>;
}

/// Hashes the block's canonical byte encoding with SHA-256.
///
/// Encoding: `parent ‖ timestamp (i64 BE) ‖ height (u64 BE) ‖ tx count (u32 BE)
/// ‖ (len u32 BE ‖ tx bytes)* ‖ state root`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256BlockCodec;

impl Sha256BlockCodec {
    pub fn encode(block: &StatelessBlock) -> Vec<u8> {
        let tx_bytes: usize = block.txs.iter().map(|tx| 4 + tx.len()).sum();
        let mut out = Vec::with_capacity(32 + 8 + 8 + 4 + tx_bytes + 32);
        out.extend_from_slice(block.parent.as_bytes());
        out.extend_from_slice(&block.timestamp.to_be_bytes());
        out.extend_from_slice(&block.height.to_be_bytes());
        out.extend_from_slice(&(block.txs.len() as u32).to_be_bytes());
        for tx in &block.txs {
            out.extend_from_slice(&(tx.len() as u32).to_be_bytes());
            out.extend_from_slice(tx.as_bytes());
        }
        out.extend_from_slice(block.state_root.as_bytes());
        out
    }
}

impl BlockCodec for Sha256BlockCodec {
    fn block_id(
        &self,
        block: &StatelessBlock,
        results: &[ExecutionResult],
    ) -> Result<BlockId, CodecError> {
        if block.txs.len() != results.len() {
            return Err(CodecError::ResultsMismatch {
                txs: block.txs.len(),
                results: results.len(),
            });
        }
        Ok(Id::new(Sha256::digest(Self::encode(block)).into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Transaction;

    fn block(height: u64, timestamp: i64) -> StatelessBlock {
        StatelessBlock {
            parent: Id::EMPTY,
            timestamp,
            height,
            txs: vec![Transaction::new(vec![1, 2, 3])],
            state_root: Id::EMPTY,
        }
    }

    #[test]
    fn id_depends_on_content() {
        let codec = Sha256BlockCodec;
        let results = [ExecutionResult::ok()];
        let a = codec.block_id(&block(1, 100), &results).unwrap();
        let b = codec.block_id(&block(1, 100), &results).unwrap();
        let c = codec.block_id(&block(2, 100), &results).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn results_must_match_transactions() {
        let err = Sha256BlockCodec.block_id(&block(1, 100), &[]).unwrap_err();
        assert_eq!(err, CodecError::ResultsMismatch { txs: 1, results: 0 });
    }
}
