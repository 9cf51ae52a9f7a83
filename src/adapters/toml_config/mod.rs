// TOML config adapter - Pipeline configuration from TOML files

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::model::PipelineConfig;
use crate::error::{MovieError, MovieResult};

/// Files tried, in order, when no explicit path is given
pub const DEFAULT_CONFIG_PATHS: [&str; 2] = ["movieavi.toml", "config/movieavi.toml"];

#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    movieavi: PipelineConfig,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse the `[movieavi]` table; missing keys keep their defaults
    pub fn parse(content: &str) -> MovieResult<PipelineConfig> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| MovieError::config(format!("Failed to parse TOML config: {}", e)))?;
        Ok(file.movieavi)
    }

    /// Load configuration from a file
    pub fn load(path: &Path) -> MovieResult<PipelineConfig> {
        if !path.exists() {
            return Err(MovieError::config(format!(
                "Config file does not exist: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            MovieError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        info!("Loading configuration from: {}", path.display());
        Self::parse(&content)
    }

    /// First existing default config file under `base_dir`
    pub fn find_config_file(base_dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_PATHS
            .iter()
            .map(|candidate| base_dir.join(candidate))
            .find(|candidate| candidate.is_file())
    }

    /// Load `explicit` if given, else the first default file found, else defaults
    pub fn load_or_default(explicit: Option<&Path>, base_dir: &Path) -> MovieResult<PipelineConfig> {
        match explicit {
            Some(path) => Self::load(path),
            None => match Self::find_config_file(base_dir) {
                Some(path) => Self::load(&path),
                None => {
                    debug!("No config file found, using defaults");
                    Ok(PipelineConfig::default())
                }
            },
        }
    }

    /// Serialize configuration as a `[movieavi]` TOML document
    pub fn serialize(config: &PipelineConfig) -> MovieResult<String> {
        toml::to_string_pretty(&ConfigFile {
            movieavi: config.clone(),
        })
        .map_err(|e| MovieError::config(format!("Failed to serialize config: {}", e)))
    }

    /// Write configuration, creating the parent directory if needed
    pub fn save(config: &PipelineConfig, path: &Path) -> MovieResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, Self::serialize(config)?)?;
        Ok(())
    }
}
