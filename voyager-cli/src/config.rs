use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use voyager_core::{ConfigError, CoreError, EngineConfig, SampleGrid};
use voyager_render::{ExportMetadata, RenderError, RenderResult};

/// Config file read when no path is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "voyager.json";

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Core(e.into())
    }
}

/// The sample grid as written in the config file.
///
/// Coordinates are decimal strings so deep zooms keep every digit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_center_re")]
    pub center_re: String,
    #[serde(default = "default_center_im")]
    pub center_im: String,
    /// Complex-plane units between neighbouring samples.
    #[serde(default = "default_scale")]
    pub scale: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

fn default_center_re() -> String {
    "-0.75".to_string()
}
fn default_center_im() -> String {
    "0".to_string()
}
fn default_scale() -> String {
    "0.005".to_string()
}
fn default_width() -> u32 {
    800
}
fn default_height() -> u32 {
    600
}
fn default_output() -> PathBuf {
    PathBuf::from("voyager.png")
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            center_re: default_center_re(),
            center_im: default_center_im(),
            scale: default_scale(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl GridConfig {
    /// Parse the grid at `bits` of precision.
    pub fn build(&self, bits: u32) -> Result<SampleGrid, ConfigError> {
        SampleGrid::parse(
            &self.center_re,
            &self.center_im,
            &self.scale,
            self.width,
            self.height,
            bits,
        )
    }
}

/// One render: the engine, the grid it samples, and where the image goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub engine: EngineConfig,
    #[serde(default)]
    pub grid: GridConfig,
    /// Worker threads; one per core when absent.
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

impl RenderConfig {
    /// Load and parse a JSON config file.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        debug!("Reading config from {}", path.display());
        let json = fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json).map_err(|source| CliError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// PNG metadata describing this render.
    pub fn export_metadata(&self, result: &RenderResult) -> ExportMetadata {
        let params = &self.engine.params;
        ExportMetadata {
            kind: result.kind.to_string(),
            formula: self.engine.recurrence.describe(),
            center_re: self.grid.center_re.clone(),
            center_im: self.grid.center_im.clone(),
            spacing: self.grid.scale.clone(),
            max_iterations: params.max_iterations,
            precision_digits: params.precision.digits,
            escape_radius: params.escape_radius,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voyager_core::{PrecisionMode, RecurrenceConfig};

    const SAMPLE: &str = include_str!("../../voyager.json");

    #[test]
    fn sample_config_parses() {
        let config = RenderConfig::from_json(SAMPLE).unwrap();
        assert_eq!(config.engine.recurrence, RecurrenceConfig::mandelbrot());
        assert_eq!(config.engine.params.precision.mode, PrecisionMode::Hardware);
        assert!((config.engine.params.escape_radius_sq() - 4.0).abs() < f64::EPSILON);
        assert_eq!(config.output, PathBuf::from("voyager.png"));
        let grid = config.grid.build(64).unwrap();
        assert_eq!((grid.width(), grid.height()), (config.grid.width, config.grid.height));
    }

    #[test]
    fn sample_config_round_trips() {
        let config = RenderConfig::from_json(SAMPLE).unwrap();
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert_eq!(RenderConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = RenderConfig::from_json(
            r#"{
                "engine": {
                    "params": { "max_iterations": 100 },
                    "recurrence": { "terms": [] }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.grid, GridConfig::default());
        assert_eq!(config.threads, None);
        assert_eq!(config.engine.params.precision.mode, PrecisionMode::Arbitrary);
    }

    #[test]
    fn invalid_params_fail_to_parse() {
        let result = RenderConfig::from_json(
            r#"{ "engine": { "params": { "max_iterations": 10, "escape_radius": -1 },
                             "recurrence": { "terms": [] } } }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = RenderConfig::load(Path::new("/nonexistent/voyager.json")).unwrap_err();
        assert!(matches!(err, CliError::Read { .. }));
    }

    #[test]
    fn bad_grid_is_a_config_error() {
        let grid = GridConfig {
            width: 0,
            ..GridConfig::default()
        };
        assert!(matches!(grid.build(64), Err(ConfigError::InvalidGrid { .. })));
    }
}
