use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use syndication_ledger::application::orchestrator::{Operation, SyndicationOrchestrator};
use syndication_ledger::config::LedgerConfig;
use syndication_ledger::domain::ports::SharedStateAccessor;
use syndication_ledger::infrastructure::in_memory::InMemoryStateStore;
use syndication_ledger::interfaces::csv::invocation_reader::InvocationReader;
use syndication_ledger::interfaces::csv::result_writer::ResultWriter;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Invocations CSV file (header row, then `operation,arg0,arg1,...`)
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Ledger configuration JSON (participant roster, index key, consistency mode)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn open_store(db_path: Option<PathBuf>) -> Result<SharedStateAccessor> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store =
                syndication_ledger::infrastructure::rocksdb::RocksDBStateStore::open(path)
                    .into_diagnostic()?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Arc::new(InMemoryStateStore::new()))
        }
        None => Ok(Arc::new(InMemoryStateStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(path) => LedgerConfig::load(path).into_diagnostic()?,
        None => LedgerConfig::default(),
    };
    let store = open_store(cli.db_path)?;
    let orchestrator = SyndicationOrchestrator::new(store, config);

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = InvocationReader::new(file);
    let stdout = io::stdout();
    let mut writer = ResultWriter::new(stdout.lock());

    for invocation in reader.invocations() {
        let invocation = match invocation {
            Ok(invocation) => invocation,
            Err(e) => {
                error!(error = %e, "Error reading invocation");
                continue;
            }
        };

        let outcome = match invocation.operation.as_str() {
            "Init" => orchestrator.init(&invocation.args).await,
            name => match name.parse::<Operation>() {
                Ok(operation) => orchestrator.execute(operation, &invocation.args).await,
                Err(e) => Err(e),
            },
        };
        if let Err(e) = &outcome {
            error!(operation = %invocation.operation, error = %e, "Error processing invocation");
        }
        writer
            .write_result(&invocation.operation, &outcome)
            .into_diagnostic()?;
    }

    writer.flush().into_diagnostic()?;
    Ok(())
}
