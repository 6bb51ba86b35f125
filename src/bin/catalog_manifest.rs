use anyhow::{Context, Result};

use outcome_terminal::catalog::{CategoryField, SqliteCatalogSource, build_catalog};
use outcome_terminal::config::{self, AppConfig};
use outcome_terminal::context::vocabulary_manifest;
use outcome_terminal::encoding::EncoderRegistry;
use outcome_terminal::telemetry;

fn main() -> Result<()> {
    config::load_dotenv();
    telemetry::init_stderr();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let config = AppConfig::from_env_and_args(&args)?;

    let source = SqliteCatalogSource::open(&config.db_path, &config.table)?;
    let catalog = build_catalog(&source)?;
    let encoders = EncoderRegistry::build(&catalog);

    eprintln!("Catalog: {}", config.db_path.display());
    for field in CategoryField::ALL {
        eprintln!("  {field}: {} values", catalog.len(field));
    }

    let manifest = vocabulary_manifest(&encoders);
    let json = serde_json::to_string_pretty(&serde_json::json!({ "vocabulary": manifest }))
        .context("serialize vocabulary manifest")?;
    println!("{json}");
    Ok(())
}
