//! In-memory block index.
//!
//! Holds the height index, time index, header store and namespace store
//! behind a single `RwLock` so a commit is visible to readers all at once.
//! The index is derived data: rebuild it by replaying accepted blocks.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use seqindex_core::block::BlockHeader;
use seqindex_core::error::IngestError;
use seqindex_core::ids::BlockId;
use seqindex_core::types::SequencerBlock;

/// Result of a bounded ascending scan over the height index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Window {
    /// Start height of the scan.
    pub from: u64,
    /// Blocks in the window, ascending by height.
    pub blocks: Vec<BlockId>,
    /// Block at `from - 1`, if any.
    pub prev: Option<BlockId>,
    /// First block past the window, if the scan stopped early.
    pub next: Option<BlockId>,
}

#[derive(Default)]
struct Inner {
    ids_by_height: BTreeMap<u64, BlockId>,
    /// timestamp → lowest height carrying it
    heights_by_time: BTreeMap<i64, u64>,
    headers: HashMap<BlockId, Arc<BlockHeader>>,
    sequencer_blocks: HashMap<BlockId, Arc<SequencerBlock>>,
}

/// The four indices over accepted blocks.
///
/// One writer ([`commit`](Self::commit)), any number of concurrent readers.
#[derive(Default)]
pub struct BlockIndex {
    inner: RwLock<Inner>,
    inconsistencies: AtomicU64,
}

impl BlockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one block into all four structures under a single write lock.
    ///
    /// Fails without touching the index if the height is already present.
    pub fn commit(&self, header: BlockHeader, partition: SequencerBlock) -> Result<(), IngestError> {
        let id = header.id;
        let height = header.height;
        let timestamp = header.timestamp;

        let mut inner = self.inner.write();
        if inner.ids_by_height.contains_key(&height) {
            return Err(IngestError::HeightAlreadyIndexed(height));
        }
        if let Some((&last, _)) = inner.ids_by_height.last_key_value() {
            if height != last + 1 {
                warn!(last, height, "non-contiguous height ingested");
            }
        }

        inner.ids_by_height.insert(height, id);
        inner.heights_by_time.entry(timestamp).or_insert(height);
        inner.headers.insert(id, Arc::new(header));
        inner.sequencer_blocks.insert(id, Arc::new(partition));
        Ok(())
    }

    /// Ascend from `start` (inclusive), collecting blocks until one has a
    /// timestamp greater than `end` or `limit` blocks were collected.
    ///
    /// Entries whose stored header disagrees with the scan key are skipped
    /// and counted in [`inconsistencies`](Self::inconsistencies).
    pub fn window(&self, start: u64, end: i64, limit: Option<usize>) -> Window {
        let inner = self.inner.read();

        let prev = start
            .checked_sub(1)
            .and_then(|h| inner.ids_by_height.get(&h).copied());

        let mut blocks = Vec::new();
        let mut next = None;

        for (&height, &id) in inner.ids_by_height.range(start..) {
            let header = match inner.headers.get(&id) {
                Some(h) if h.height == height => h,
                other => {
                    self.inconsistencies.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        height,
                        %id,
                        stored_height = other.map(|h| h.height),
                        "height index entry disagrees with header store, skipping"
                    );
                    continue;
                }
            };

            if header.timestamp > end || limit.is_some_and(|max| blocks.len() >= max) {
                next = Some(id);
                break;
            }
            blocks.push(id);
        }

        debug!(start, end, found = blocks.len(), has_next = next.is_some(), "window scan");
        Window {
            from: start,
            blocks,
            prev,
            next,
        }
    }

    /// Height of the first block with exactly this timestamp.
    pub fn height_at_timestamp(&self, timestamp: i64) -> Option<u64> {
        self.inner.read().heights_by_time.get(&timestamp).copied()
    }

    pub fn header(&self, id: &BlockId) -> Option<Arc<BlockHeader>> {
        self.inner.read().headers.get(id).cloned()
    }

    /// Header of the block indexed at `height`.
    pub fn header_at(&self, height: u64) -> Option<Arc<BlockHeader>> {
        let inner = self.inner.read();
        let id = inner.ids_by_height.get(&height)?;
        inner.headers.get(id).cloned()
    }

    /// Every indexed header in height order. Cost follows the number of
    /// blocks, not the height range.
    pub fn headers(&self) -> Vec<Arc<BlockHeader>> {
        let inner = self.inner.read();
        inner
            .ids_by_height
            .iter()
            .filter_map(|(&height, id)| {
                inner.headers.get(id).filter(|h| h.height == height).cloned()
            })
            .collect()
    }

    /// Namespace partition of block `id`.
    pub fn sequencer_block(&self, id: &BlockId) -> Option<Arc<SequencerBlock>> {
        self.inner.read().sequencer_blocks.get(id).cloned()
    }

    pub fn latest_height(&self) -> Option<u64> {
        self.inner
            .read()
            .ids_by_height
            .last_key_value()
            .map(|(&h, _)| h)
    }

    /// Number of indexed blocks.
    pub fn len(&self) -> usize {
        self.inner.read().ids_by_height.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count of skipped height-index entries seen by scans so far.
    pub fn inconsistencies(&self) -> u64 {
        self.inconsistencies.load(Ordering::Relaxed)
    }

    #[cfg(test)]
    fn corrupt_height_entry(&self, height: u64, id: BlockId) {
        self.inner.write().ids_by_height.insert(height, id);
    }
}
