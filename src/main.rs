use clap::Parser;
use miette::{IntoDiagnostic, Result};
use paymerge::application::engine::MergeEngine;
use paymerge::config::EngineConfig;
use paymerge::domain::ports::{SharedAuditStore, SharedClock, SharedLedger};
use paymerge::infrastructure::audit::AuditRecorder;
use paymerge::infrastructure::clock::SystemClock;
use paymerge::infrastructure::dependency_graph::DependencyGraph;
use paymerge::infrastructure::in_memory::{InMemoryAuditStore, InMemoryLedger};
#[cfg(feature = "storage-rocksdb")]
use paymerge::infrastructure::rocksdb::RocksDBStore;
use paymerge::infrastructure::xsd::XsdCompiler;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding one .xsd schema and the .xml payment documents
    dir: PathBuf,

    /// JSON file overriding the engine defaults
    #[arg(long, env = "PAYMERGE_CONFIG")]
    config: Option<PathBuf>,

    /// Dependency graph CSV (revenue_code,payment_type,payment_ground).
    /// The built-in graph is used when omitted.
    #[arg(long, env = "PAYMERGE_GRAPH")]
    graph: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "PAYMERGE_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Repeat for more verbose logs (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    let graph = match &cli.graph {
        Some(path) => DependencyGraph::from_csv_path(path)?,
        None => DependencyGraph::builtin()?,
    };
    let (ledger, audit) = open_stores(cli.db_path)?;

    let (events, receiver) = tokio::sync::mpsc::unbounded_channel();
    let recorder = AuditRecorder::spawn(audit, receiver);

    let clock: SharedClock = Arc::new(SystemClock);
    let rules = MergeEngine::standard_rules(&config, Arc::new(graph), clock.clone(), ledger.clone());
    let engine = MergeEngine::new(config, Arc::new(XsdCompiler), rules, clock, ledger, events)?;

    let result = engine.run(&cli.dir).await;

    // Dropping the engine closes the audit channel so the recorder can finish.
    drop(engine);
    match recorder.await.into_diagnostic()? {
        Ok(stored) => tracing::debug!(stored, "audit trail recorded"),
        Err(e) => tracing::warn!(error = %e, "audit trail incomplete"),
    }

    let report = result?;
    println!("{} was created!", report.artifact_name());
    Ok(())
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<(SharedLedger, SharedAuditStore)> {
    if let Some(db_path) = db_path {
        let store = RocksDBStore::open(db_path)?;
        return Ok((Arc::new(store.clone()), Arc::new(store)));
    }
    Ok(in_memory_stores())
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<(SharedLedger, SharedAuditStore)> {
    if db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_stores())
}

fn in_memory_stores() -> (SharedLedger, SharedAuditStore) {
    (
        Arc::new(InMemoryLedger::new()),
        Arc::new(InMemoryAuditStore::new()),
    )
}
