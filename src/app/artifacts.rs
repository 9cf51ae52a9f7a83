//! Stage artifacts
//!
//! Each stage's ordered output can be written to disk and read back so a run can resume from
//! a later stage. JSON by default, YAML when the file ends in `.yaml` or `.yml`.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{MovieError, MovieResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Yaml,
}

impl ArtifactFormat {
    pub fn for_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml") | Some("yml") => ArtifactFormat::Yaml,
            _ => ArtifactFormat::Json,
        }
    }
}

pub fn save_artifact<T: Serialize + ?Sized>(path: &Path, value: &T) -> MovieResult<()> {
    let text = match ArtifactFormat::for_path(path) {
        ArtifactFormat::Json => serde_json::to_string_pretty(value)?,
        ArtifactFormat::Yaml => serde_yaml::to_string(value).map_err(|e| {
            MovieError::config(format!("Failed to write {}: {}", path.display(), e))
        })?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    Ok(())
}

pub fn load_artifact<T: DeserializeOwned>(path: &Path) -> MovieResult<T> {
    let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => MovieError::InputNotFound {
            path: path.display().to_string(),
        },
        _ => MovieError::Io(e),
    })?;
    match ArtifactFormat::for_path(path) {
        ArtifactFormat::Json => Ok(serde_json::from_str(&text)?),
        ArtifactFormat::Yaml => serde_yaml::from_str(&text).map_err(|e| {
            MovieError::config(format!("Failed to read {}: {}", path.display(), e))
        }),
    }
}
