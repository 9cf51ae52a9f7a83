//! Configuration initialization and hierarchy management

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::adapters::toml_config::TomlConfigAdapter;
use crate::cli::args::PipelineArgs;
use crate::cli::Cli;
use crate::domain::model::PipelineConfig;
use crate::error::{MovieError, MovieResult};

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<PipelineConfig> {
    info!("Initializing configuration hierarchy");

    let base_dir = std::env::current_dir().context("Failed to read current directory")?;
    let mut config = TomlConfigAdapter::load_or_default(cli.config.as_deref(), &base_dir)?;

    let env_overrides = apply_environment_overrides(&mut config, |key| std::env::var(key).ok())?;
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }

    let cli_overrides = apply_cli_overrides(&mut config, &cli.pipeline);
    if cli_overrides > 0 {
        info!("Applied {} CLI configuration overrides", cli_overrides);
    }

    config.validate()?;
    Ok(config)
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> MovieResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| MovieError::config(format!("Invalid value for {}: '{}'", key, value)))
}

/// Apply `MOVIEAVI_*` variables; returns how many were set
pub fn apply_environment_overrides<F>(config: &mut PipelineConfig, lookup: F) -> MovieResult<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = 0;
    let mut found = |key: &str| {
        let value = lookup(key);
        if let Some(value) = &value {
            debug!("Found environment override: {} = {}", key, value);
            applied += 1;
        }
        value
    };

    if let Some(value) = found("MOVIEAVI_FFMPEG_PATH") {
        config.ffmpeg_path = value.into();
    }
    if let Some(value) = found("MOVIEAVI_SEGMENT_SECONDS") {
        config.segment_seconds = parse_env("MOVIEAVI_SEGMENT_SECONDS", &value)?;
    }
    if let Some(value) = found("MOVIEAVI_MAX_FRAMES") {
        config.max_frames_per_clip = parse_env("MOVIEAVI_MAX_FRAMES", &value)?;
    }
    if let Some(value) = found("MOVIEAVI_DESCRIPTION_MODEL") {
        config.description_model = value;
    }
    if let Some(value) = found("MOVIEAVI_SCRIPT_MODEL") {
        config.script_model = value;
    }
    if let Some(value) = found("MOVIEAVI_VOICE") {
        config.voice = value.parse()?;
    }
    if let Some(value) = found("MOVIEAVI_TOOL_TIMEOUT_SECS") {
        config.tool_timeout_secs = parse_env("MOVIEAVI_TOOL_TIMEOUT_SECS", &value)?;
    }

    Ok(applied)
}

/// Apply CLI flags; returns how many were given
pub fn apply_cli_overrides(config: &mut PipelineConfig, args: &PipelineArgs) -> usize {
    let mut applied = 0;

    if let Some(path) = &args.ffmpeg {
        config.ffmpeg_path = path.clone();
        applied += 1;
    }
    if let Some(seconds) = args.segment_seconds {
        config.segment_seconds = seconds;
        applied += 1;
    }
    if let Some(frames) = args.max_frames {
        config.max_frames_per_clip = frames;
        applied += 1;
    }
    if let Some(model) = &args.description_model {
        config.description_model = model.clone();
        applied += 1;
    }
    if let Some(model) = &args.script_model {
        config.script_model = model.clone();
        applied += 1;
    }
    if let Some(voice) = args.voice {
        config.voice = voice;
        applied += 1;
    }
    if let Some(speed) = args.speech_speed {
        config.speech_speed = speed;
        applied += 1;
    }
    if let Some(timeout) = args.tool_timeout {
        config.tool_timeout_secs = timeout;
        applied += 1;
    }

    applied
}
