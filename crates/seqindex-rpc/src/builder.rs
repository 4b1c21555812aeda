//! Fluent builder for wiring a [`SeqRpcServer`].
//!
//! # Example
//!
//! ```rust,ignore
//! use seqindex_core::config::MissingTimestamp;
//! use seqindex_rpc::ServiceBuilder;
//!
//! let server = ServiceBuilder::new()
//!     .network_id(1337)
//!     .missing_timestamp(MissingTimestamp::FromGenesis)
//!     .max_page_size(500)
//!     .build(controller);
//! ```

use std::sync::Arc;

use seqindex_core::codec::{BlockCodec, Sha256BlockCodec};
use seqindex_core::config::{MissingTimestamp, ServiceConfig};
use seqindex_core::ids::Id;
use seqindex_core::parser::{Genesis, Parser, ServerParser};
use seqindex_core::registry::{
    ActionRegistry, AuthRegistry, MemoryActionRegistry, MemoryAuthRegistry,
};
use seqindex_storage::BlockIndex;

use crate::ingest::Ingestor;
use crate::query::QueryService;
use crate::server::SeqRpcServer;
use crate::state::StateController;

/// Fluent builder for [`ServiceConfig`] and the server built from it.
pub struct ServiceBuilder {
    config: ServiceConfig,
    genesis: Genesis,
    codec: Arc<dyn BlockCodec>,
    actions: Arc<dyn ActionRegistry>,
    auths: Arc<dyn AuthRegistry>,
}

impl Default for ServiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self {
            config: ServiceConfig::default(),
            genesis: Genesis::default(),
            codec: Arc::new(Sha256BlockCodec),
            actions: Arc::new(MemoryActionRegistry::new()),
            auths: Arc::new(MemoryAuthRegistry::new()),
        }
    }

    /// Start from a loaded configuration.
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn network_id(mut self, id: u32) -> Self {
        self.config.network_id = id;
        self
    }

    pub fn chain_id(mut self, id: Id) -> Self {
        self.config.chain_id = id;
        self
    }

    pub fn genesis(mut self, genesis: Genesis) -> Self {
        self.genesis = genesis;
        self
    }

    /// Replace the block id derivation.
    pub fn codec(mut self, codec: Arc<dyn BlockCodec>) -> Self {
        self.codec = codec;
        self
    }

    /// Replace the action registry used to decode transactions.
    pub fn action_registry(mut self, actions: Arc<dyn ActionRegistry>) -> Self {
        self.actions = actions;
        self
    }

    pub fn auth_registry(mut self, auths: Arc<dyn AuthRegistry>) -> Self {
        self.auths = auths;
        self
    }

    /// Behavior of start-timestamp queries with no exact match.
    pub fn missing_timestamp(mut self, policy: MissingTimestamp) -> Self {
        self.config.query.missing_timestamp = policy;
        self
    }

    /// Cap the number of blocks per header window. Zero removes the cap.
    pub fn max_page_size(mut self, size: usize) -> Self {
        self.config.query.max_page_size = Some(size).filter(|&n| n > 0);
        self
    }

    pub fn build_config(&self) -> ServiceConfig {
        self.config.clone()
    }

    /// Wire parser, index, ingestor and query service into a server.
    pub fn build(self, controller: Arc<dyn StateController>) -> SeqRpcServer {
        let parser: Arc<dyn Parser> = Arc::new(ServerParser::with_registries(
            self.config.network_id,
            self.config.chain_id,
            Arc::new(self.genesis),
            self.actions,
            self.auths,
        ));
        let index = Arc::new(BlockIndex::new());
        let ingestor = Ingestor::new(Arc::clone(&index), self.codec, Arc::clone(&parser));
        let queries = QueryService::new(index, self.config.query);
        SeqRpcServer::new(controller, parser, ingestor, queries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use seqindex_core::block::{ExecutionResult, StatelessBlock};
    use seqindex_core::error::{DecodeError, IngestError};
    use seqindex_core::ids::{Address, TxId};
    use seqindex_core::registry::{ed25519_placeholder_auth, SequencerMsg, ED25519_ID};

    use crate::error::ServiceError;
    use crate::state::{AssetInfo, TxStatus};

    struct NoState;

    #[async_trait]
    impl StateController for NoState {
        fn genesis(&self) -> Genesis {
            Genesis::default()
        }
        async fn transaction(&self, _: TxId) -> Result<Option<TxStatus>, ServiceError> {
            Ok(None)
        }
        async fn asset(&self, _: Id) -> Result<Option<AssetInfo>, ServiceError> {
            Ok(None)
        }
        async fn balance(&self, _: Address, _: Id) -> Result<u64, ServiceError> {
            Ok(0)
        }
        async fn loan(&self, _: Id, _: Id) -> Result<u64, ServiceError> {
            Ok(0)
        }
    }

    #[test]
    fn injected_action_registry_is_used() {
        let server = ServiceBuilder::new()
            .action_registry(Arc::new(MemoryActionRegistry::empty()))
            .build(Arc::new(NoState));

        let tx = SequencerMsg::new(b"A".to_vec(), b"x".to_vec())
            .into_transaction(ED25519_ID, &ed25519_placeholder_auth());
        let block = StatelessBlock {
            parent: Id::EMPTY,
            timestamp: 1,
            height: 0,
            txs: vec![tx],
            state_root: Id::EMPTY,
        };
        let err = server.accept_block(&block, &[ExecutionResult::ok()]).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Ingest(IngestError::Decode { source: DecodeError::UnknownAction(0), .. })
        ));
    }

    #[test]
    fn builder_defaults() {
        let cfg = ServiceBuilder::new().build_config();
        assert_eq!(cfg.network_id, 1);
        assert_eq!(cfg.chain_id, Id::EMPTY);
        assert_eq!(cfg.query.missing_timestamp, MissingTimestamp::Reject);
        assert_eq!(cfg.query.max_page_size, None);
    }

    #[test]
    fn builder_custom() {
        let chain = Id::digest(b"chain");
        let cfg = ServiceBuilder::new()
            .network_id(1337)
            .chain_id(chain)
            .missing_timestamp(MissingTimestamp::FromGenesis)
            .max_page_size(25)
            .build_config();

        assert_eq!(cfg.network_id, 1337);
        assert_eq!(cfg.chain_id, chain);
        assert_eq!(cfg.query.missing_timestamp, MissingTimestamp::FromGenesis);
        assert_eq!(cfg.query.max_page_size, Some(25));

        let uncapped = ServiceBuilder::new().max_page_size(0).build_config();
        assert_eq!(uncapped.query.max_page_size, None);
    }
}
