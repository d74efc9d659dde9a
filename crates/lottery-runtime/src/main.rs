//! # Lottery Node
//!
//! Replays a JSON action script against a lottery node and prints the
//! report as JSON on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use lottery_runtime::{init_tracing, run_script, LotteryNode, RuntimeConfig, Script};
use shared_types::{InMemoryKVStore, KeyValueStore};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "lottery-node")]
#[command(about = "Replay lottery actions against a local node", version)]
struct Args {
    /// Action script (JSON)
    script: PathBuf,

    /// Runtime config file (JSON); environment variables when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, overrides the configured level
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON logs
    #[arg(long)]
    json_logs: bool,

    /// Persistent store directory (requires the `rocksdb` feature)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

type Stores = (Box<dyn KeyValueStore>, Box<dyn KeyValueStore>);

#[cfg(feature = "rocksdb")]
fn open_stores(data_dir: Option<&Path>) -> Result<Stores> {
    use lottery_runtime::adapters::{RocksDbConfig, RocksDbStore};

    let Some(dir) = data_dir else {
        return Ok(memory_stores());
    };
    let state = RocksDbStore::open(RocksDbConfig::new(dir.join("state")))
        .context("opening state store")?;
    let history = RocksDbStore::open(RocksDbConfig::new(dir.join("history")))
        .context("opening history store")?;
    info!(data_dir = %dir.display(), "using RocksDB stores");
    Ok((Box::new(state), Box::new(history)))
}

#[cfg(not(feature = "rocksdb"))]
fn open_stores(data_dir: Option<&Path>) -> Result<Stores> {
    if let Some(dir) = data_dir {
        tracing::warn!(
            data_dir = %dir.display(),
            "built without the rocksdb feature, using in-memory stores"
        );
    }
    Ok(memory_stores())
}

fn memory_stores() -> Stores {
    (
        Box::new(InMemoryKVStore::new()),
        Box::new(InMemoryKVStore::new()),
    )
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RuntimeConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RuntimeConfig::from_env().context("loading config from environment")?,
    };
    if let Some(level) = args.log_level {
        config.log_level = level;
    }
    if args.json_logs {
        config.json_logs = true;
    }
    if args.data_dir.is_some() {
        config.data_dir = args.data_dir;
    }

    init_tracing(&config.log_level, config.json_logs).context("initializing tracing")?;
    info!(version = lottery_runtime::VERSION, "starting lottery node");

    let script = Script::from_file(&args.script)
        .with_context(|| format!("loading script {}", args.script.display()))?;

    let (state, history) = open_stores(config.data_dir.as_deref())?;
    let mut node = LotteryNode::new(&config, state, history).context("building node")?;

    let report = run_script(&mut node, &script).context("running script")?;
    let json = serde_json::to_string_pretty(&report).context("encoding report")?;

    match args.output {
        Some(path) => std::fs::write(&path, json)
            .with_context(|| format!("writing report {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}
