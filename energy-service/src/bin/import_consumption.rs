use std::{env, path::PathBuf};

use anyhow::{bail, Result};
use energy_service::{config::AppConfig, import::import_consumption_file, observability};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        bail!("usage: import_consumption <csv_file_path>");
    }
    let file_path = PathBuf::from(&args[1]);

    // ENERGY_CONFIG may point at a different store than the dashboard uses.
    let cfg = AppConfig::load()?;

    let written = import_consumption_file(&file_path, cfg.store.store(), cfg.ingest.batch_size).await?;
    tracing::info!(rows = written, file = %file_path.display(), "import finished");

    Ok(())
}
