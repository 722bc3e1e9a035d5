//! `quarterly` command-line entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use quarterly::{
    Config, FinancialStore, Importer, IngestError, LogFormat, MetricSlot, NoopStore, SqliteStore,
    parse_tree,
};

#[derive(Debug, Parser)]
#[command(name = "quarterly")]
#[command(about = "Import quarterly financial statement exports into SQLite")]
struct Cli {
    /// SQLite database file (overrides DATABASE_PATH).
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse an export tree and upsert every record.
    Import {
        /// Root directory of the exports (overrides CSV_PATH).
        path: Option<PathBuf>,
        /// Parse and count without writing.
        #[arg(long)]
        dry_run: bool,
    },
    /// Parse an export tree and print records as JSON lines.
    Parse {
        /// Root directory of the exports (overrides CSV_PATH).
        path: Option<PathBuf>,
    },
    /// List stored companies.
    Companies,
    /// List stored categories.
    Categories,
    /// Print one metric across quarters.
    Series {
        /// Metric column, e.g. `revenue` or `net_profit`.
        metric: String,
        /// Restrict to these companies.
        #[arg(long = "company")]
        companies: Vec<String>,
    },
    /// Delete every record of a company.
    Delete {
        /// Company name as stored.
        company: String,
    },
    /// Show, set or delete the note attached to a company.
    Note {
        /// Company name as stored.
        company: String,
        /// New note text; omit to show the current note.
        text: Option<String>,
        /// Remove the note instead.
        #[arg(long, conflicts_with = "text")]
        delete: bool,
    },
    /// Show, set or delete the chart color of a company.
    Color {
        /// Company name as stored.
        company: String,
        /// New color, e.g. `#1f77b4`; omit to show the current color.
        value: Option<String>,
        /// Reset to the default color.
        #[arg(long, conflicts_with = "value")]
        delete: bool,
    },
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

fn source_root(path: Option<PathBuf>, config: &Config) -> Result<PathBuf> {
    match path.or_else(|| config.csv_path.clone()) {
        Some(root) => Ok(root),
        None => bail!("no export directory given; pass PATH or set CSV_PATH"),
    }
}

fn open_store(cli_database: Option<PathBuf>, config: &Config) -> Result<Arc<SqliteStore>> {
    let path = cli_database.unwrap_or_else(|| config.database_path.clone());
    let store = SqliteStore::new(&path)
        .with_context(|| format!("failed to open database {}", path.display()))?;
    Ok(Arc::new(store))
}

/// Resolves on Ctrl-C, or on SIGTERM where the platform has it.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {}
        () = terminate => {}
    }
}

/// Flip the returned receiver to `true` once a shutdown signal arrives.
fn cancel_on_shutdown() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping after the current record");
        let _ = tx.send(true);
    });
    rx
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    init_tracing(&config);
    let cli = Cli::parse();

    match cli.command {
        Commands::Import { path, dry_run } => {
            let root = source_root(path, &config)?;
            info!(root = %root.display(), dry_run, "Starting data import");

            let store: Arc<dyn FinancialStore> = if dry_run {
                Arc::new(NoopStore::new())
            } else {
                open_store(cli.database, &config)?
            };

            let importer = Importer::new(store).with_cancellation(cancel_on_shutdown());
            match importer.run(&root).await {
                Ok(summary) => println!(
                    "import complete: files={} skipped={} records={} written={} failed={}",
                    summary.files_parsed,
                    summary.files_failed,
                    summary.records_parsed,
                    summary.records_written,
                    summary.records_failed
                ),
                Err(IngestError::Cancelled) => {
                    eprintln!("import cancelled; records written so far are kept");
                    std::process::exit(130);
                }
                Err(e) => return Err(e).context("import failed"),
            }
        }
        Commands::Parse { path } => {
            let root = source_root(path, &config)?;
            let report = parse_tree(&root)?;
            for record in &report.records {
                println!("{}", serde_json::to_string(record)?);
            }
            for failure in &report.failures {
                eprintln!("skipped: {failure}");
            }
        }
        Commands::Companies => {
            let store = open_store(cli.database, &config)?;
            for company in store.companies().await? {
                println!("{company}");
            }
        }
        Commands::Categories => {
            let store = open_store(cli.database, &config)?;
            for category in store.categories().await? {
                println!("{category}");
            }
        }
        Commands::Series { metric, companies } => {
            let metric: MetricSlot = metric.parse()?;
            let store = open_store(cli.database, &config)?;
            for point in store.metric_series(metric, &companies).await? {
                println!("{}", serde_json::to_string(&point)?);
            }
        }
        Commands::Delete { company } => {
            let store = open_store(cli.database, &config)?;
            let deleted = store.delete_company(&company).await?;
            println!("deleted {deleted} records for {company}");
        }
        Commands::Note {
            company,
            text,
            delete,
        } => {
            let store = open_store(cli.database, &config)?;
            if delete {
                if !store.delete_company_note(&company).await? {
                    eprintln!("no note stored for {company}");
                }
            } else if let Some(text) = text {
                store.set_company_note(&company, &text).await?;
            } else if let Some(note) = store.company_note(&company).await? {
                println!("{note}");
            }
        }
        Commands::Color {
            company,
            value,
            delete,
        } => {
            let store = open_store(cli.database, &config)?;
            if delete {
                store.delete_company_color(&company).await?;
            } else if let Some(value) = value {
                store.set_company_color(&company, &value).await?;
            } else {
                println!("{}", store.company_color(&company).await?);
            }
        }
    }

    Ok(())
}
