//! Read side: header windows and per-block transaction lookups.
//!
//! The three header queries differ only in how the start height is found;
//! all of them end in [`BlockIndex::window`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use seqindex_core::block::Transaction;
use seqindex_core::config::{MissingTimestamp, QueryConfig};
use seqindex_core::ids::BlockId;
use seqindex_core::types::NamespaceTransaction;
use seqindex_storage::{BlockIndex, Window};

use crate::error::ServiceError;

// ─── Request / response shapes ────────────────────────────────────────────────

/// Reference to a block in a header window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub id: BlockId,
}

/// A page of block ids plus links to the neighbouring pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeadersResponse {
    pub from: u64,
    pub blocks: Vec<BlockInfo>,
    pub prev: Option<BlockInfo>,
    pub next: Option<BlockInfo>,
}

impl From<Window> for BlockHeadersResponse {
    fn from(w: Window) -> Self {
        Self {
            from: w.from,
            blocks: w.blocks.into_iter().map(|id| BlockInfo { id }).collect(),
            prev: w.prev.map(|id| BlockInfo { id }),
            next: w.next.map(|id| BlockInfo { id }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBlockHeadersByHeightArgs {
    pub height: u64,
    pub end: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBlockHeadersIdArgs {
    /// cb58 block id; empty asks for the default window.
    #[serde(default)]
    pub id: String,
    pub end: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBlockHeadersByStartArgs {
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBlockTransactionsArgs {
    #[serde(rename = "block_id", default)]
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetBlockTransactionsByNamespaceArgs {
    #[serde(rename = "block_id", default)]
    pub id: String,
    pub namespace: String,
}

/// Raw transactions of one block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub txs: Vec<Transaction>,
    pub id: BlockId,
}

/// One namespace's transactions within one block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeqTransactionResponse {
    pub txs: Vec<NamespaceTransaction>,
    pub id: BlockId,
}

// ─── QueryService ─────────────────────────────────────────────────────────────

/// Read-only view over the [`BlockIndex`]. Cheap to clone.
#[derive(Clone)]
pub struct QueryService {
    index: Arc<BlockIndex>,
    config: QueryConfig,
}

/// Parse an optional cb58 id: empty → `None`, malformed → error.
fn parse_block_id(raw: &str) -> Result<Option<BlockId>, ServiceError> {
    if raw.is_empty() {
        return Ok(None);
    }
    Ok(Some(raw.parse()?))
}

impl QueryService {
    pub fn new(index: Arc<BlockIndex>, config: QueryConfig) -> Self {
        Self { index, config }
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    fn window(&self, start: u64, end: i64) -> BlockHeadersResponse {
        self.index
            .window(start, end, self.config.page_limit())
            .into()
    }

    /// Window starting at an explicit height.
    pub fn block_headers_by_height(&self, args: &GetBlockHeadersByHeightArgs) -> BlockHeadersResponse {
        self.window(args.height, args.end)
    }

    /// Window starting at the block with the given id.
    ///
    /// An empty or unknown id yields the default (empty) response.
    pub fn block_headers_by_id(
        &self,
        args: &GetBlockHeadersIdArgs,
    ) -> Result<BlockHeadersResponse, ServiceError> {
        let Some(id) = parse_block_id(&args.id)? else {
            return Ok(BlockHeadersResponse::default());
        };
        let Some(header) = self.index.header(&id) else {
            debug!(%id, "headers requested for unknown block");
            return Ok(BlockHeadersResponse::default());
        };
        Ok(self.window(header.height, args.end))
    }

    /// Window starting at the block with exactly timestamp `start`.
    pub fn block_headers_by_start(
        &self,
        args: &GetBlockHeadersByStartArgs,
    ) -> Result<BlockHeadersResponse, ServiceError> {
        let start = match self.index.height_at_timestamp(args.start) {
            Some(height) => height,
            None => match self.config.missing_timestamp {
                MissingTimestamp::Reject => return Err(ServiceError::NoBlockAtTimestamp(args.start)),
                MissingTimestamp::FromGenesis => 0,
            },
        };
        Ok(self.window(start, args.end))
    }

    /// Every raw transaction of a block; empty if the block is unknown.
    pub fn block_transactions(
        &self,
        args: &GetBlockTransactionsArgs,
    ) -> Result<TransactionResponse, ServiceError> {
        let Some(id) = parse_block_id(&args.id)? else {
            return Ok(TransactionResponse::default());
        };
        let txs = self
            .index
            .header(&id)
            .map(|h| h.txs.clone())
            .unwrap_or_default();
        Ok(TransactionResponse { txs, id })
    }

    /// The successful sequencer messages of one namespace within a block.
    pub fn block_transactions_by_namespace(
        &self,
        args: &GetBlockTransactionsByNamespaceArgs,
    ) -> Result<SeqTransactionResponse, ServiceError> {
        let Some(id) = parse_block_id(&args.id)? else {
            return Ok(SeqTransactionResponse::default());
        };
        let txs = self
            .index
            .sequencer_block(&id)
            .map(|b| b.namespace(&args.namespace).to_vec())
            .unwrap_or_default();
        Ok(SeqTransactionResponse { txs, id })
    }
}
