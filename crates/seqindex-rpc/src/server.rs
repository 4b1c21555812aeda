//! RPC façade: one handler per method, plus the accept-block hook.
//!
//! Handlers return their reply by value. The transport layer owns framing.

use std::sync::Arc;

use tracing::{debug, instrument};

use seqindex_core::block::{ExecutionResult, StatelessBlock};
use seqindex_core::ids::{Address, BlockId};
use seqindex_core::parser::Parser;

use crate::error::ServiceError;
use crate::ingest::Ingestor;
use crate::query::{
    BlockHeadersResponse, GetBlockHeadersByHeightArgs, GetBlockHeadersByStartArgs,
    GetBlockHeadersIdArgs, GetBlockTransactionsArgs, GetBlockTransactionsByNamespaceArgs,
    QueryService, SeqTransactionResponse, TransactionResponse,
};
use crate::state::{
    AssetArgs, AssetReply, BalanceArgs, BalanceReply, GenesisReply, LoanArgs, LoanReply,
    StateController, TxArgs, TxReply,
};

/// The node's JSON-RPC handlers.
pub struct SeqRpcServer {
    controller: Arc<dyn StateController>,
    parser: Arc<dyn Parser>,
    ingestor: Ingestor,
    queries: QueryService,
}

impl SeqRpcServer {
    pub fn new(
        controller: Arc<dyn StateController>,
        parser: Arc<dyn Parser>,
        ingestor: Ingestor,
        queries: QueryService,
    ) -> Self {
        Self {
            controller,
            parser,
            ingestor,
            queries,
        }
    }

    /// Shared transaction parser.
    pub fn parser(&self) -> &Arc<dyn Parser> {
        &self.parser
    }

    pub fn queries(&self) -> &QueryService {
        &self.queries
    }

    /// Write side, for rebuilding the index from stored blocks.
    pub fn ingestor(&self) -> &Ingestor {
        &self.ingestor
    }

    // ─── Write side ──────────────────────────────────────────────────────────

    /// Called by the engine once per finalized block, in height order.
    pub fn accept_block(
        &self,
        block: &StatelessBlock,
        results: &[ExecutionResult],
    ) -> Result<BlockId, ServiceError> {
        Ok(self.ingestor.ingest(block, results)?)
    }

    // ─── State passthrough ───────────────────────────────────────────────────

    pub fn genesis(&self) -> GenesisReply {
        GenesisReply {
            genesis: self.controller.genesis(),
        }
    }

    #[instrument(name = "Server.Tx", skip_all, fields(tx_id = %args.tx_id))]
    pub async fn tx(&self, args: &TxArgs) -> Result<TxReply, ServiceError> {
        self.controller
            .transaction(args.tx_id)
            .await?
            .map(TxReply::from)
            .ok_or(ServiceError::TxNotFound)
    }

    #[instrument(name = "Server.Asset", skip_all, fields(asset = %args.asset))]
    pub async fn asset(&self, args: &AssetArgs) -> Result<AssetReply, ServiceError> {
        self.controller
            .asset(args.asset)
            .await?
            .map(AssetReply::from)
            .ok_or(ServiceError::AssetNotFound)
    }

    #[instrument(name = "Server.Balance", skip_all, fields(asset = %args.asset))]
    pub async fn balance(&self, args: &BalanceArgs) -> Result<BalanceReply, ServiceError> {
        let address: Address = args.address.parse()?;
        let amount = self.controller.balance(address, args.asset).await?;
        Ok(BalanceReply { amount })
    }

    #[instrument(name = "Server.Loan", skip_all, fields(asset = %args.asset))]
    pub async fn loan(&self, args: &LoanArgs) -> Result<LoanReply, ServiceError> {
        let amount = self.controller.loan(args.asset, args.destination).await?;
        Ok(LoanReply { amount })
    }

    // ─── Index queries ───────────────────────────────────────────────────────

    pub async fn get_block_headers_by_height(
        &self,
        args: &GetBlockHeadersByHeightArgs,
    ) -> Result<BlockHeadersResponse, ServiceError> {
        debug!(height = args.height, end = args.end, "getBlockHeadersByHeight");
        Ok(self.queries.block_headers_by_height(args))
    }

    pub async fn get_block_headers_id(
        &self,
        args: &GetBlockHeadersIdArgs,
    ) -> Result<BlockHeadersResponse, ServiceError> {
        debug!(id = %args.id, end = args.end, "getBlockHeadersID");
        self.queries.block_headers_by_id(args)
    }

    pub async fn get_block_headers_by_start(
        &self,
        args: &GetBlockHeadersByStartArgs,
    ) -> Result<BlockHeadersResponse, ServiceError> {
        debug!(start = args.start, end = args.end, "getBlockHeadersByStart");
        self.queries.block_headers_by_start(args)
    }

    pub async fn get_block_transactions(
        &self,
        args: &GetBlockTransactionsArgs,
    ) -> Result<TransactionResponse, ServiceError> {
        debug!(id = %args.id, "getBlockTransactions");
        self.queries.block_transactions(args)
    }

    pub async fn get_block_transactions_by_namespace(
        &self,
        args: &GetBlockTransactionsByNamespaceArgs,
    ) -> Result<SeqTransactionResponse, ServiceError> {
        debug!(id = %args.id, namespace = %args.namespace, "getBlockTransactionsByNamespace");
        self.queries.block_transactions_by_namespace(args)
    }
}
