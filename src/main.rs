use std::{env, path::Path, process::ExitCode};

use anyhow::{Context, Result};
use env_logger::Env;
use log::{error, info};

use book_import_batch::{
    config::ImportConfig, core::job::Job, import::job::BookImportJobBuilder,
    item::mongodb::mongodb_repository::MongoLibraryRepository,
};

const DEFAULT_CONFIG: &str = "import.json";

fn load_config() -> Result<ImportConfig> {
    let config = match env::args().nth(1) {
        Some(path) => ImportConfig::from_path(&path)
            .with_context(|| format!("cannot load settings from {path}"))?,
        None if Path::new(DEFAULT_CONFIG).exists() => ImportConfig::from_path(DEFAULT_CONFIG)
            .with_context(|| format!("cannot load settings from {DEFAULT_CONFIG}"))?,
        None => ImportConfig::default(),
    };

    let config = config.with_env_overrides();
    config.validate()?;
    Ok(config)
}

fn run() -> Result<()> {
    let config = load_config()?;

    let repository =
        MongoLibraryRepository::connect(&config.mongodb.uri, &config.mongodb.database)
            .with_context(|| format!("cannot connect to {}", config.mongodb.uri))?;

    let job = BookImportJobBuilder::new(&config)
        .repository(&repository)
        .cleaner(&repository)
        .build();

    let execution = job.run()?;

    for step in &execution.step_executions {
        info!(
            "{}: read {}, filtered {}, written {}",
            step.name, step.read_count, step.filter_count, step.write_count
        );
    }
    info!("Import finished in {:?}", execution.duration);

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("Import failed: {error:#}");
            ExitCode::FAILURE
        }
    }
}
