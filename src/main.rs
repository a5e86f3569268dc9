//! loopia-dns - command-line host for the record reconciler
//!
//! Each subcommand runs one reconciliation verb against one record and prints
//! the result as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use loopia_dns::{
    Config, DesiredRecord, ExecutionMode, LoopiaClient, ReadOutcome, Reconciler, ZoneRecordApi,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

//==============================================================================
// Main
//==============================================================================

#[derive(Debug, Parser)]
#[command(name = "loopia-dns")]
#[command(version = VERSION)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the records under a zone/subdomain
    List {
        #[arg(long)]
        zone: String,
        #[arg(long)]
        name: String,
    },
    /// Ensure a record exists
    Create {
        #[command(flatten)]
        record: RecordArgs,
        #[arg(long)]
        dry_run: bool,
    },
    /// Refresh a tracked record
    Read {
        #[arg(long)]
        id: String,
        #[command(flatten)]
        record: RecordArgs,
    },
    /// Replace a record's type/value/ttl
    Update {
        #[arg(long)]
        old_type: String,
        #[arg(long)]
        old_value: String,
        #[arg(long, default_value_t = 3600)]
        old_ttl: u32,
        #[command(flatten)]
        record: RecordArgs,
        #[arg(long)]
        dry_run: bool,
    },
    /// Remove every record matching type and value
    Delete {
        #[command(flatten)]
        record: RecordArgs,
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Args)]
struct RecordArgs {
    #[arg(long)]
    zone: String,
    #[arg(long)]
    name: String,
    #[arg(long = "type")]
    record_type: String,
    #[arg(long)]
    value: String,
    #[arg(long, default_value_t = 3600)]
    ttl: u32,
}

impl From<RecordArgs> for DesiredRecord {
    fn from(args: RecordArgs) -> Self {
        DesiredRecord::new(args.zone, args.name, args.record_type, args.value, args.ttl)
    }
}

fn mode(dry_run: bool) -> ExecutionMode {
    if dry_run {
        ExecutionMode::Preview
    } else {
        ExecutionMode::Apply
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config).context("Config load failed")?;

    let verbose = cli.verbose || config.verbose;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let client = LoopiaClient::new(&config).context("Loopia client failed")?;
    let reconciler = Reconciler::new(&client);

    let output = match cli.command {
        Command::List { zone, name } => {
            let records = client
                .get_zone_records(&zone, &name)
                .await
                .context("List failed")?;
            serde_json::to_value(records)?
        }
        Command::Create { record, dry_run } => {
            let desired = DesiredRecord::from(record);
            let outcome = reconciler
                .create(&desired, mode(dry_run))
                .await
                .context("Create failed")?;
            json!({
                "id": outcome.id.to_string(),
                "changed": outcome.changed,
                "record": outcome.record,
            })
        }
        Command::Read { id, record } => {
            let prior = DesiredRecord::from(record);
            match reconciler.read(&id, &prior).await.context("Read failed")? {
                ReadOutcome::Present { id, current } => json!({ "id": id, "record": current }),
                ReadOutcome::Vanished => json!({ "id": "", "record": null }),
            }
        }
        Command::Update {
            old_type,
            old_value,
            old_ttl,
            record,
            dry_run,
        } => {
            let new = DesiredRecord::from(record);
            let old = DesiredRecord {
                record_type: old_type,
                value: old_value,
                ttl: old_ttl,
                ..new.clone()
            };
            let outcome = reconciler
                .update(&old, &new, mode(dry_run))
                .await
                .context("Update failed")?;
            json!({
                "id": outcome.id.to_string(),
                "changed": outcome.changed,
                "record": outcome.record,
            })
        }
        Command::Delete { record, dry_run } => {
            let old = DesiredRecord::from(record);
            let removed = reconciler
                .delete(&old, mode(dry_run))
                .await
                .context("Delete failed")?;
            json!({ "removed": removed })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
