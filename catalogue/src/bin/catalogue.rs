//! Catalogue CLI
//!
//! Runs one catalogue method against a store snapshot kept in a JSON file
//! of hex-encoded key/value pairs.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use triekit_catalogue::{CatalogueConfig, Runtime};
use triekit_hostapi::{InvocationContext, MemStore, Snapshot, StoreConfig};

/// Book catalogue over a flat key-value store
#[derive(Parser, Debug)]
#[command(name = "catalogue")]
#[command(about = "Invoke book catalogue methods against a store snapshot")]
struct Args {
    /// Snapshot file; created on the first successful call
    #[arg(short, long)]
    state: PathBuf,

    /// Account id of the caller
    #[arg(long, default_value = "anonymous")]
    signer: String,

    /// Block timestamp in nanoseconds (defaults to now)
    #[arg(long)]
    timestamp: Option<u64>,

    /// Use the shared `rating` / `v` prefixes for every book's ratings and comments
    #[arg(long)]
    shared_prefixes: bool,

    /// Method name, e.g. AddBook or getBooks
    method: String,

    /// JSON arguments
    #[arg(default_value = "{}")]
    args: String,
}

fn load_snapshot(path: &Path, config: StoreConfig) -> Result<MemStore> {
    if !path.exists() {
        return Ok(MemStore::with_config(config));
    }
    let raw = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let snapshot =
        Snapshot::from_json(&raw).with_context(|| format!("parsing {}", path.display()))?;
    MemStore::from_snapshot(&snapshot, config).with_context(|| format!("decoding {}", path.display()))
}

fn save_snapshot(path: &Path, store: &MemStore) -> Result<()> {
    let raw = store.snapshot().to_json_pretty()?;
    std::fs::write(path, raw).with_context(|| format!("writing {}", path.display()))
}

fn now_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

fn run(args: Args) -> Result<bool> {
    let store_config = StoreConfig::default();
    let mut store = load_snapshot(&args.state, store_config.clone())?;

    let config = if args.shared_prefixes {
        CatalogueConfig::shared_prefixes()
    } else {
        CatalogueConfig::default()
    };
    let runtime = Runtime::new(config, store_config);
    let ctx = InvocationContext::new(args.signer, args.timestamp.unwrap_or_else(now_nanos));

    let outcome = runtime.invoke(&mut store, &ctx, &args.method, args.args.as_bytes());
    if !outcome.is_ok() {
        eprintln!(
            "error [{}]: {}",
            outcome.error_code,
            outcome.error.as_deref().unwrap_or("unknown failure")
        );
        return Ok(false);
    }

    let value = outcome.return_json().context("decoding return data")?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    save_snapshot(&args.state, &store)?;
    Ok(true)
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!("{:#}", err);
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
