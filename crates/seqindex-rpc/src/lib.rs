//! seqindex-rpc: ingestion pipeline, header-window queries and RPC handlers.

pub mod builder;
pub mod error;
pub mod ingest;
pub mod query;
pub mod server;
pub mod state;

pub use builder::ServiceBuilder;
pub use error::ServiceError;
pub use ingest::Ingestor;
pub use query::{BlockHeadersResponse, BlockInfo, QueryService};
pub use server::SeqRpcServer;
pub use state::StateController;
