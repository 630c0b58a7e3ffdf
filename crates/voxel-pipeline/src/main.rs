//! Voxel Feature Pipeline - Main Entry Point

use anyhow::Context;
use std::path::PathBuf;
use tracing::info;
use voxel_pipeline::{init_logging, Pipeline, PipelineConfig};

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = PipelineConfig::load(config_path.as_deref()).context("loading configuration")?;

    init_logging(config.log_level(), config.log_json);

    info!("=== Voxel Feature Pipeline v{} ===", env!("CARGO_PKG_VERSION"));

    let report = Pipeline::new(config).run().context("running pipeline")?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
