//! Bulk-loads candidates from a semicolon-delimited file.
//!
//! `import_candidates --path file.csv`

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use recruitment_tracker::{
    config::{get_config, init_config},
    database::{
        pool::{create_pool, run_migrations},
        PgCandidateRepository,
    },
    services::import_service::{ImportOptions, ImportService},
    telemetry,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "import_candidates",
    about = "Read candidates from a CSV file and store them in the database",
    version
)]
struct Args {
    /// CSV file with eight `;`-separated columns per row
    #[arg(long)]
    path: PathBuf,

    /// Encoding of the file; defaults to IMPORT_ENCODING, then gbk
    #[arg(long)]
    encoding: Option<String>,

    /// Treat the first row as a header and skip it
    #[arg(long, default_value_t = false)]
    skip_header: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_config()?;
    let config = get_config();
    telemetry::init(&config.log_level, config.log_format)?;

    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set to import candidates")?;
    let pool = create_pool(database_url, config.database_max_connections).await?;
    run_migrations(&pool).await?;

    let options = ImportOptions {
        encoding: args
            .encoding
            .unwrap_or_else(|| config.import_encoding.clone()),
        skip_header: args.skip_header,
    };
    let service = ImportService::new(Arc::new(PgCandidateRepository::new(pool)));
    let report = service
        .import_file(&args.path, &options)
        .await
        .with_context(|| format!("import of {} failed", args.path.display()))?;

    info!(
        imported = report.imported,
        skipped_header = report.skipped_header,
        "Done"
    );
    Ok(())
}
