//! Voxel Feature Pipeline
//!
//! Loads a raw volume, extracts per-voxel features, optionally reduces the
//! resulting list and persists it for downstream consumers.

mod settings;

pub use settings::{OutputSettings, PipelineConfig, ReductionSettings, VolumeSettings, ENV_PREFIX};

use data_reduction::{ReductionError, VolumeReducer};
use feature_engine::{ExtractError, FeatureExtractor, FeatureList};
use feature_store::{encode_compact, Encoding, FeatureRepository, StorageError};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use volume_grid::{Dimensions, GridError, SampleFormat, VolumeGrid};

/// Snapshot name of the list produced by extraction
pub const EXTRACTED_SNAPSHOT: &str = "extracted";
/// Snapshot name of the list handed downstream
pub const OUTPUT_SNAPSHOT: &str = "output";

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Reduction(#[from] ReductionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Summary of one run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub dimensions: Dimensions,
    pub sample_format: SampleFormat,
    pub extracted: usize,
    pub retained: usize,
    pub dropped: usize,
    pub drop_fraction: f64,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
    pub encoding: Encoding,
    pub elapsed_ms: u64,
}

/// Initialize the global tracing subscriber
pub fn init_logging(level: Level, json: bool) {
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let result = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };
    result.expect("Failed to set tracing subscriber");
}

/// Extraction, reduction and persistence driven by a [`PipelineConfig`]
pub struct Pipeline {
    config: PipelineConfig,
    extractor: FeatureExtractor,
    repository: FeatureRepository,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            extractor: FeatureExtractor::new(config.extraction),
            repository: FeatureRepository::new(),
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Snapshots of the last run
    pub fn repository(&self) -> &FeatureRepository {
        &self.repository
    }

    /// Load the configured raw volume and process it
    pub fn run(&self) -> Result<PipelineReport, PipelineError> {
        let volume = &self.config.volume;
        info!(
            "Loading volume {} ({} {})",
            volume.path.display(),
            volume.dimensions(),
            volume.format
        );
        let grid = VolumeGrid::load_raw(&volume.path, volume.dimensions(), volume.format)?;
        self.process(&grid)
    }

    /// Extract, reduce and persist features of an in-memory grid
    pub fn process(&self, grid: &VolumeGrid) -> Result<PipelineReport, PipelineError> {
        let started = Instant::now();

        let stage = Instant::now();
        let extracted = self.extractor.extract(grid)?;
        metrics::histogram!("voxfeat_stage_seconds", "stage" => "extract")
            .record(stage.elapsed().as_secs_f64());
        metrics::counter!("voxfeat_records_extracted").increment(extracted.len() as u64);
        if extracted.is_empty() {
            warn!("Grid {} produced no interior voxels", grid.dimensions());
        }

        let settings = self.config.reduction;
        let stage = Instant::now();
        let output = self.reduce(&extracted)?;
        metrics::histogram!("voxfeat_stage_seconds", "stage" => "reduce")
            .record(stage.elapsed().as_secs_f64());

        let extracted_len = extracted.len();
        let retained = output.len();
        let dropped = extracted_len - retained;
        metrics::counter!("voxfeat_records_retained").increment(retained as u64);
        metrics::counter!("voxfeat_records_dropped").increment(dropped as u64);

        self.repository.put(EXTRACTED_SNAPSHOT, extracted)?;
        self.repository.put(OUTPUT_SNAPSHOT, output)?;
        self.persist()?;

        let report = PipelineReport {
            dimensions: grid.dimensions(),
            sample_format: grid.format(),
            extracted: extracted_len,
            retained,
            dropped,
            drop_fraction: settings.drop_fraction,
            seed: settings.seed,
            output: self.config.output.path.clone(),
            encoding: self.config.output.encoding,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            "Pipeline finished: {} extracted, {} retained in {} ms",
            report.extracted, report.retained, report.elapsed_ms
        );
        Ok(report)
    }

    fn reduce(&self, extracted: &FeatureList) -> Result<FeatureList, PipelineError> {
        let settings = self.config.reduction;
        let config = settings.reduction_config();

        // validate even when the stage is skipped
        let fraction = config.effective_fraction()?;
        if fraction == 0.0 {
            return Ok(extracted.clone());
        }

        let reduced = match settings.seed {
            Some(seed) => VolumeReducer::seeded(config, seed).reduce(extracted)?,
            None => VolumeReducer::from_entropy(config).reduce(extracted)?,
        };
        Ok(reduced)
    }

    fn persist(&self) -> Result<(), PipelineError> {
        let Some(path) = &self.config.output.path else {
            return Ok(());
        };

        match self.config.output.encoding {
            Encoding::Fixed => self.repository.persist(OUTPUT_SNAPSHOT, path)?,
            Encoding::Compact => {
                let list = self
                    .repository
                    .get(OUTPUT_SNAPSHOT)?
                    .ok_or_else(|| StorageError::NotFound(OUTPUT_SNAPSHOT.to_string()))?;
                std::fs::write(path, encode_compact(&list)?).map_err(StorageError::from)?;
                info!("Wrote compact feature list to {}", path.display());
            }
        }
        Ok(())
    }
}
