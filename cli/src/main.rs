//! seqindex CLI: rebuild the block index from fixture files and query it.
//!
//! # Commands
//! ```text
//! seqindex info
//! seqindex replay  --blocks <file.json>
//! seqindex headers --blocks <file.json> (--height N | --id ID | --start TS) --end TS
//! seqindex txs     --blocks <file.json> --id ID [--namespace NS]
//! ```
//!
//! Results go to stdout as JSON; logs go to stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use seqindex_core::config::{LogConfig, ServiceConfig};
use seqindex_core::parser::Genesis;
use seqindex_rpc::query::{
    GetBlockHeadersByHeightArgs, GetBlockHeadersByStartArgs, GetBlockHeadersIdArgs,
    GetBlockTransactionsArgs, GetBlockTransactionsByNamespaceArgs,
};
use seqindex_rpc::{SeqRpcServer, ServiceBuilder};

mod fixture;

use fixture::{load_blocks, load_json, OfflineState};

#[derive(Parser)]
#[command(
    name = "seqindex",
    about = "Sequencer block indexer: header windows and namespace lookups",
    version
)]
struct Cli {
    /// Service configuration (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Genesis rules (JSON)
    #[arg(long, global = true)]
    genesis: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show build info and the effective configuration
    Info,

    /// Replay block fixtures and summarize the resulting index
    Replay {
        /// JSON array of blocks with their execution results
        #[arg(long)]
        blocks: PathBuf,
    },

    /// Header window starting at a height, a block id or a timestamp
    Headers {
        #[arg(long)]
        blocks: PathBuf,
        #[command(flatten)]
        from: WindowStart,
        /// Inclusive upper timestamp bound
        #[arg(long, allow_hyphen_values = true)]
        end: i64,
    },

    /// Transactions of one block, optionally for a single namespace
    Txs {
        #[arg(long)]
        blocks: PathBuf,
        /// cb58 block id
        #[arg(long)]
        id: String,
        /// Hex-encoded chain id
        #[arg(long)]
        namespace: Option<String>,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct WindowStart {
    #[arg(long)]
    height: Option<u64>,
    #[arg(long)]
    id: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    start: Option<i64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config: ServiceConfig = load_json(cli.config.as_deref())?;
    if cli.verbose {
        config.log.level = "debug".into();
    }
    init_tracing(&config.log);
    let genesis: Genesis = load_json(cli.genesis.as_deref())?;

    match cli.command {
        Commands::Info => cmd_info(&config, &genesis),
        Commands::Replay { blocks } => cmd_replay(config, genesis, &blocks),
        Commands::Headers { blocks, from, end } => {
            cmd_headers(config, genesis, &blocks, from, end).await
        }
        Commands::Txs { blocks, id, namespace } => {
            cmd_txs(config, genesis, &blocks, id, namespace).await
        }
    }
}

/// Install the global subscriber. Writes to stderr so stdout stays valid JSON.
fn init_tracing(config: &LogConfig) {
    let filter = EnvFilter::try_new(config.directives()).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Build a server and fold every fixture block into its index.
fn rebuild(config: ServiceConfig, genesis: Genesis, path: &Path) -> Result<SeqRpcServer> {
    let fixtures = load_blocks(path)?;
    let server = ServiceBuilder::new()
        .config(config)
        .genesis(genesis.clone())
        .build(Arc::new(OfflineState::new(genesis)));

    let count = server
        .ingestor()
        .replay(fixtures.iter().map(|f| (&f.block, f.results.as_slice())))
        .with_context(|| format!("replaying {}", path.display()))?;
    info!(count, path = %path.display(), "index rebuilt");
    Ok(server)
}

// ─── Command implementations ─────────────────────────────────────────────────

fn cmd_info(config: &ServiceConfig, genesis: &Genesis) -> Result<()> {
    print_json(&json!({
        "version": env!("CARGO_PKG_VERSION"),
        "config": config,
        "genesis": genesis,
    }))
}

fn cmd_replay(config: ServiceConfig, genesis: Genesis, path: &Path) -> Result<()> {
    let server = rebuild(config, genesis, path)?;
    print_json(&replay_summary(&server))
}

/// Per-block overview of the rebuilt index.
fn replay_summary(server: &SeqRpcServer) -> serde_json::Value {
    let index = server.ingestor().index();

    let blocks: Vec<serde_json::Value> = index
        .headers()
        .iter()
        .map(|header| {
            let namespaces: serde_json::Map<String, serde_json::Value> = index
                .sequencer_block(&header.id)
                .map(|b| {
                    b.namespaces()
                        .map(|ns| (ns.to_string(), json!(b.namespace(ns).len())))
                        .collect()
                })
                .unwrap_or_default();
            json!({
                "height": header.height,
                "id": header.id,
                "timestamp": header.timestamp,
                "time": chrono::DateTime::from_timestamp_millis(header.timestamp)
                    .map(|t| t.to_rfc3339()),
                "txs": header.txs.len(),
                "namespaces": namespaces,
            })
        })
        .collect();

    json!({
        "indexed": index.len(),
        "latest_height": index.latest_height(),
        "inconsistencies": index.inconsistencies(),
        "blocks": blocks,
    })
}

async fn cmd_headers(
    config: ServiceConfig,
    genesis: Genesis,
    path: &Path,
    from: WindowStart,
    end: i64,
) -> Result<()> {
    let server = rebuild(config, genesis, path)?;

    let resp = match from {
        WindowStart { height: Some(height), .. } => {
            server
                .get_block_headers_by_height(&GetBlockHeadersByHeightArgs { height, end })
                .await?
        }
        WindowStart { id: Some(id), .. } => {
            server
                .get_block_headers_id(&GetBlockHeadersIdArgs { id, end })
                .await?
        }
        WindowStart { start: Some(start), .. } => {
            server
                .get_block_headers_by_start(&GetBlockHeadersByStartArgs { start, end })
                .await?
        }
        WindowStart { .. } => anyhow::bail!("one of --height, --id or --start is required"),
    };
    print_json(&resp)
}

async fn cmd_txs(
    config: ServiceConfig,
    genesis: Genesis,
    path: &Path,
    id: String,
    namespace: Option<String>,
) -> Result<()> {
    let server = rebuild(config, genesis, path)?;

    match namespace {
        Some(namespace) => {
            let resp = server
                .get_block_transactions_by_namespace(&GetBlockTransactionsByNamespaceArgs {
                    id,
                    namespace,
                })
                .await?;
            print_json(&resp)
        }
        None => {
            let resp = server
                .get_block_transactions(&GetBlockTransactionsArgs { id })
                .await?;
            print_json(&resp)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn replay_summary_lists_only_indexed_heights() {
        use seqindex_core::block::StatelessBlock;
        use seqindex_core::ids::Id;

        let server = ServiceBuilder::new().build(Arc::new(OfflineState::new(Genesis::default())));
        for (height, timestamp) in [(0u64, 1_000i64), (4_000_000_000, 2_000)] {
            let block = StatelessBlock {
                parent: Id::EMPTY,
                timestamp,
                height,
                txs: vec![],
                state_root: Id::EMPTY,
            };
            server.accept_block(&block, &[]).unwrap();
        }

        let summary = replay_summary(&server);
        assert_eq!(summary["indexed"], 2);
        assert_eq!(summary["latest_height"], 4_000_000_000u64);
        let heights: Vec<u64> = summary["blocks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["height"].as_u64().unwrap())
            .collect();
        assert_eq!(heights, vec![0, 4_000_000_000]);
        assert_eq!(summary["blocks"][0]["time"], "1970-01-01T00:00:01+00:00");
    }

    #[test]
    fn headers_requires_one_start() {
        let none = Cli::try_parse_from(["seqindex", "headers", "--blocks", "b.json", "--end", "5"]);
        assert!(none.is_err());

        let two = Cli::try_parse_from([
            "seqindex", "headers", "--blocks", "b.json", "--height", "1", "--start", "2", "--end", "5",
        ]);
        assert!(two.is_err());

        let ok = Cli::try_parse_from(["seqindex", "headers", "--blocks", "b.json", "--height", "1", "--end", "5"])
            .unwrap();
        match ok.command {
            Commands::Headers { from, end, .. } => {
                assert_eq!(from.height, Some(1));
                assert_eq!(end, 5);
            }
            _ => panic!("expected headers"),
        }
    }
}
