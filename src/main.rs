mod error;
mod journal;
mod loader;
mod parse;
mod schema;
mod warehouse;

use clap::Parser;
use error::LoaderError;
use journal::JournalRecord;
use std::{path::PathBuf, process::ExitCode, time::Duration};
use tracing_subscriber::EnvFilter;
use warehouse::{
    bigquery::{BigQuery, DEFAULT_API_URL},
    TableRef, Warehouse,
};

const SAMPLE_SIZE: usize = 5;

#[derive(Parser)]
#[command(name = "journal-loader")]
#[command(about = "Load SCImago Journal Rank data into BigQuery", long_about = None)]
struct Args {
    /// GCP project ID
    #[arg(long)]
    project_id: String,

    /// BigQuery dataset ID (e.g., journal_rank)
    #[arg(long)]
    dataset_id: String,

    /// BigQuery table ID
    #[arg(long, default_value = "scimagojr_2024")]
    table_id: String,

    /// Path to the SCImago CSV export
    #[arg(long, default_value = "scimagojr_2024.csv")]
    csv_file: PathBuf,

    /// OAuth2 access token used as the bearer credential
    #[arg(long, env = "GOOGLE_OAUTH_ACCESS_TOKEN", hide_env_values = true)]
    access_token: String,

    /// Root URL of the BigQuery REST API
    #[arg(long, env = "BIGQUERY_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Interval between load job status checks
    #[arg(long, default_value_t = 1000)]
    poll_interval_ms: u64,
}

impl Args {
    fn table(&self) -> TableRef {
        TableRef::new(&self.project_id, &self.dataset_id, &self.table_id)
    }
}

/// Recreate the table and fill it with the journals, returning the stored row count.
async fn refresh<W: Warehouse>(
    warehouse: &mut W,
    table: &TableRef,
    journals: &[JournalRecord],
) -> Result<u64, LoaderError> {
    tracing::info!("Creating BigQuery table...");
    schema::recreate_table(warehouse, table).await?;

    tracing::info!("Loading data into BigQuery...");
    loader::load_journals(warehouse, table, journals).await
}

/// Run the whole load. The warehouse is not contacted until the CSV has been read.
async fn execute(args: &Args) -> Result<u64, LoaderError> {
    tracing::info!("Processing CSV file: {}", args.csv_file.display());
    let journals = parse::extract(&args.csv_file)?;
    tracing::info!("Extracted {} journal entries", journals.len());
    tracing::info!(
        "Sample data (first {SAMPLE_SIZE} entries): {}",
        parse::sample(&journals, SAMPLE_SIZE)
    );

    let mut warehouse = BigQuery::new(
        args.access_token.clone(),
        &args.api_url,
        Duration::from_millis(args.poll_interval_ms),
    )?;

    refresh(&mut warehouse, &args.table(), &journals).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    if let Err(error) = execute(&args).await {
        eprintln!("Fatal Error: {error}");
        return ExitCode::FAILURE;
    }

    tracing::info!("Done! Journal data has been loaded into BigQuery.");
    tracing::info!(
        "Point queries that read journal impact data at '{}' to use this table.",
        args.table_id
    );

    ExitCode::SUCCESS
}
