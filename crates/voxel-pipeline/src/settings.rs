//! Pipeline Settings

use crate::PipelineError;
use config::{Config, Environment, File};
use data_reduction::{FractionPolicy, ReductionConfig};
use feature_engine::ExtractorConfig;
use feature_store::Encoding;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::Level;
use volume_grid::{Dimensions, SampleFormat};

/// Prefix of environment variables overriding file settings,
/// e.g. `VOXFEAT__REDUCTION__DROP_FRACTION=0.5`
pub const ENV_PREFIX: &str = "VOXFEAT";

/// Raw volume input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSettings {
    /// Headerless little-endian sample file
    pub path: PathBuf,
    /// `[nx, ny, nz]`
    pub dimensions: [usize; 3],
    pub format: SampleFormat,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("volume.raw"),
            dimensions: [64, 64, 64],
            format: SampleFormat::UInt16,
        }
    }
}

impl VolumeSettings {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::from(self.dimensions)
    }
}

/// Reduction stage settings
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReductionSettings {
    /// Fraction of records to drop; 0 skips the stage
    pub drop_fraction: f64,
    pub policy: FractionPolicy,
    /// Fixed seed for reproducible runs; entropy-seeded when absent
    pub seed: Option<u64>,
}

impl ReductionSettings {
    pub fn reduction_config(&self) -> ReductionConfig {
        ReductionConfig {
            drop_fraction: self.drop_fraction,
            policy: self.policy,
        }
    }
}

/// Where the final feature list goes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Output file; the list is only kept in memory when absent
    pub path: Option<PathBuf>,
    pub encoding: Encoding,
}

/// Full pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub volume: VolumeSettings,
    pub extraction: ExtractorConfig,
    pub reduction: ReductionSettings,
    pub output: OutputSettings,
    /// trace, debug, info, warn or error
    pub log_level: String,
    /// Emit log lines as JSON
    pub log_json: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            volume: VolumeSettings::default(),
            extraction: ExtractorConfig::default(),
            reduction: ReductionSettings::default(),
            output: OutputSettings::default(),
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl PipelineConfig {
    /// Load from an optional TOML/JSON/YAML file, then apply `VOXFEAT__*` overrides
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Configured log level, falling back to INFO when unparseable
    pub fn log_level(&self) -> Level {
        Level::from_str(&self.log_level).unwrap_or(Level::INFO)
    }
}
