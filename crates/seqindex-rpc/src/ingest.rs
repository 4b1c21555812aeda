//! Ingestion pipeline: folds each accepted block into the [`BlockIndex`].
//!
//! Per block:
//!   - derive the block id through the [`BlockCodec`]
//!   - decode every transaction and collect the successful sequencer
//!     messages by namespace
//!   - commit header + partition + both indices under one write lock
//!
//! All fallible work happens before the commit, so a failed call leaves
//! nothing visible to readers.

use std::sync::Arc;

use tracing::{debug, info};

use seqindex_core::block::{BlockHeader, ExecutionResult, StatelessBlock};
use seqindex_core::codec::BlockCodec;
use seqindex_core::error::{CodecError, IngestError};
use seqindex_core::ids::BlockId;
use seqindex_core::parser::Parser;
use seqindex_core::types::{NamespaceTransaction, SequencerBlock};
use seqindex_storage::BlockIndex;

/// Single-writer entry point of the index.
#[derive(Clone)]
pub struct Ingestor {
    index: Arc<BlockIndex>,
    codec: Arc<dyn BlockCodec>,
    parser: Arc<dyn Parser>,
}

impl Ingestor {
    pub fn new(index: Arc<BlockIndex>, codec: Arc<dyn BlockCodec>, parser: Arc<dyn Parser>) -> Self {
        Self {
            index,
            codec,
            parser,
        }
    }

    /// Index one accepted block. `results` must be parallel to `block.txs`.
    pub fn ingest(
        &self,
        block: &StatelessBlock,
        results: &[ExecutionResult],
    ) -> Result<BlockId, IngestError> {
        if block.txs.len() != results.len() {
            return Err(CodecError::ResultsMismatch {
                txs: block.txs.len(),
                results: results.len(),
            }
            .into());
        }
        let id = self.codec.block_id(block, results)?;
        let partition = partition(block, results, self.parser.as_ref())?;
        let namespaced = partition.tx_count();

        self.index.commit(BlockHeader::new(id, block), partition)?;

        info!(
            height = block.height,
            %id,
            txs = block.txs.len(),
            namespaced,
            "block indexed"
        );
        Ok(id)
    }

    /// Replay an ordered sequence of blocks. Stops at the first failure.
    pub fn replay<'a, I>(&self, blocks: I) -> Result<usize, IngestError>
    where
        I: IntoIterator<Item = (&'a StatelessBlock, &'a [ExecutionResult])>,
    {
        let mut count = 0;
        for (block, results) in blocks {
            self.ingest(block, results)?;
            count += 1;
        }
        debug!(count, "replay complete");
        Ok(count)
    }

    pub fn index(&self) -> &Arc<BlockIndex> {
        &self.index
    }
}

/// Group the block's successful sequencer messages by namespace.
///
/// Every transaction is decoded, failed ones included; any decode failure
/// aborts the ingestion.
pub fn partition(
    block: &StatelessBlock,
    results: &[ExecutionResult],
    parser: &dyn Parser,
) -> Result<SequencerBlock, IngestError> {
    let mut out = SequencerBlock::for_block(block);

    for (index, (tx, result)) in block.txs.iter().zip(results).enumerate() {
        let decoded = tx
            .decode(parser)
            .map_err(|source| IngestError::Decode { index, source })?;
        if !result.success {
            continue;
        }
        let Some(msg) = decoded.action.as_sequencer_msg() else {
            continue;
        };
        out.push(NamespaceTransaction {
            namespace: msg.namespace(),
            tx_id: decoded.id,
            index: index as u64,
            transaction: msg.data.clone(),
        });
    }
    Ok(out)
}
