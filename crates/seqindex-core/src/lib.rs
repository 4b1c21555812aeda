//! seqindex-core: types shared by the block index and its query service.
//!
//! # Architecture
//!
//! ```text
//! engine ── accept_block ──► Ingestor ──► BlockIndex ◄── QueryService ◄── SeqRpcServer
//!                              │            ├── height → id
//!                  BlockCodec ─┤            ├── timestamp → height
//!                  Parser ─────┘            ├── id → header
//!                                           └── id → namespace partition
//! ```

pub mod block;
pub mod codec;
pub mod config;
pub mod error;
pub mod ids;
pub mod parser;
pub mod registry;
pub mod types;

pub use block::{BlockHeader, ExecutionResult, StatelessBlock, Transaction};
pub use codec::{BlockCodec, Sha256BlockCodec};
pub use config::{LogConfig, MissingTimestamp, QueryConfig, ServiceConfig};
pub use error::{CodecError, DecodeError, IngestError, ParseIdError};
pub use ids::{Address, BlockId, Id, TxId};
pub use parser::{Genesis, Parser, Rules, ServerParser};
pub use registry::{Action, ActionRegistry, AuthRegistry, SequencerMsg};
pub use types::{NamespaceTransaction, SequencerBlock};
