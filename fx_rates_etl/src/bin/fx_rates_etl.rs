use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use fx_rates_etl::config::{
    DEFAULT_ENV_FILE, DEFAULT_EXPORT_DIR, DEFAULT_SCHEMA_DIR, DbConfig, ECB_DAILY_ZIP_URL,
    PipelineConfig,
};
use fx_rates_etl::pipeline::{Pipeline, RunSummary};
use fx_rates_etl::rates::source::EcbZipSource;

#[derive(Parser)]
#[command(version, about = "Load the daily ECB exchange rates and convert order amounts to EUR")]
struct Cli {
    /// File holding public_ip, port, db_name, user_name and password
    #[arg(long, value_name = "FILE", default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Directory containing the schema .sql files
    #[arg(long, value_name = "DIR", default_value = DEFAULT_SCHEMA_DIR)]
    schema_dir: PathBuf,

    /// Directory the dated CSV snapshot is written to
    #[arg(long, value_name = "DIR", default_value = DEFAULT_EXPORT_DIR)]
    export_dir: PathBuf,

    /// URL of the zipped rates publication
    #[arg(long, value_name = "URL", default_value = ECB_DAILY_ZIP_URL)]
    source_url: String,
}

fn run(cli: Cli) -> Result<RunSummary> {
    // 1) Credentials
    let db = DbConfig::from_env_file(&cli.env_file)
        .with_context(|| format!("loading {}", cli.env_file.display()))?;

    // 2) Explicit config, passed down to every step
    let mut config = PipelineConfig::with_defaults(db)?;
    config.schema_dir = cli.schema_dir;
    config.export_dir = cli.export_dir;
    config.source_url = cli.source_url;

    // 3) Run
    let source = EcbZipSource::new(config.source_url.clone())?;
    Ok(Pipeline::new(config, source).run()?)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    fx_rates_etl::logging::init_tracing();

    match run(cli) {
        Ok(summary) => {
            info!(
                date = %summary.publication_date,
                rates = summary.rates_fetched,
                written = summary.rates_written,
                orders = summary.orders_converted,
                snapshot = %summary.snapshot_path.display(),
                "Run complete"
            );
            Ok(())
        }
        Err(e) => {
            error!("Run failed: {e:#}");
            Err(e)
        }
    }
}
