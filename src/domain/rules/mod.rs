// Domain rules - Prompt construction, naming and response validation

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;

use crate::domain::model::*;
use crate::error::{MovieError, MovieResult};
use crate::utils::path::{replace_extension, to_forward_slashes};

/// Context handed to the first clip, which has no predecessor
pub const FIRST_CLIP_CONTEXT: &str = "This is the first clip, so no previous scene.";

/// Schema instruction appended to the planner guidance
pub const SCRIPT_SCHEMA_HINT: &str = r#"Return your answer as a JSON object with the format
{"script": [
    {"clip_path": path of the video clip file,
     "narration": text of the narration for the clip in the summary video}, ...
]}."#;

/// Instructions for describing one clip given the previous description
pub fn description_instructions(guidance: &str, previous_description: &str) -> String {
    format!(
        "{} Generate a detailed description of this clip from a longer video. \
         The previous clip in the sequence had a description: {}",
        guidance.trim(),
        previous_description
    )
    .trim_start()
    .to_string()
}

/// Distance between sampled frames: `floor(total / max)`, never below one
pub fn frame_interval(total_frames: u64, max_frames: usize) -> u64 {
    let max_frames = max_frames.max(1) as u64;
    (total_frames / max_frames).max(1)
}

/// Whether the frame at `index` is kept by uniform sampling
pub fn should_sample_frame(index: u64, interval: u64, kept: usize, max_frames: usize) -> bool {
    kept < max_frames && index % interval.max(1) == 0
}

/// Record sent to the planner for each described clip
#[derive(Debug, Serialize)]
pub struct ClipRecord<'a> {
    pub clip_path: String,
    pub description: &'a str,
}

/// Planner context: the (clip_path, description) records as pretty JSON
pub fn clip_records_json(descriptions: &[ClipDescription]) -> MovieResult<String> {
    let records: Vec<ClipRecord<'_>> = descriptions
        .iter()
        .map(|d| ClipRecord {
            clip_path: d.clip.path.to_string_lossy().to_string(),
            description: &d.description,
        })
        .collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Prompt with a response-schema instruction appended
pub fn with_schema_hint(prompt: &str, schema_hint: &str) -> String {
    if schema_hint.trim().is_empty() {
        return prompt.to_string();
    }
    format!("{}\n{}", prompt.trim_end(), schema_hint)
}

/// Strip a surrounding markdown code fence, if the model added one
fn strip_code_fence(raw: &str) -> &str {
    let text = raw.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

/// Parse the planner's structured response into ordered script entries
pub fn parse_script_response(raw: &str) -> MovieResult<Vec<ScriptEntry>> {
    let value: Value = serde_json::from_str(strip_code_fence(raw)).map_err(|e| {
        MovieError::script_format(format!("response is not valid JSON: {}", e))
    })?;

    let object = value
        .as_object()
        .ok_or_else(|| MovieError::script_format("response is not a JSON object"))?;

    let script = object
        .get("script")
        .ok_or_else(|| MovieError::script_format("response does not contain 'script' field"))?;

    serde_json::from_value::<Vec<ScriptEntry>>(script.clone()).map_err(|e| {
        MovieError::script_format(format!(
            "'script' must be an array of {{clip_path, narration}} objects: {}",
            e
        ))
    })
}

/// Script entries split by whether their clip was described earlier
#[derive(Debug, Default)]
pub struct KnownClipPartition {
    pub known: Vec<ScriptEntry>,
    pub unknown: Vec<ScriptEntry>,
}

/// Separate entries referencing described clips from those that do not, preserving order
pub fn partition_known_clips(
    entries: Vec<ScriptEntry>,
    descriptions: &[ClipDescription],
) -> KnownClipPartition {
    let seen: HashSet<String> = descriptions
        .iter()
        .map(|d| to_forward_slashes(&d.clip.path))
        .collect();

    let mut partition = KnownClipPartition::default();
    for entry in entries {
        if seen.contains(&to_forward_slashes(&entry.clip_path)) {
            partition.known.push(entry);
        } else {
            partition.unknown.push(entry);
        }
    }
    partition
}

/// Where narration audio for a clip is written
pub fn narration_audio_path(
    clip_path: &Path,
    output_dir: Option<&Path>,
    audio_extension: &str,
) -> PathBuf {
    match output_dir {
        Some(dir) => {
            let file_name = clip_path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| clip_path.to_path_buf());
            dir.join(replace_extension(&file_name, audio_extension))
        }
        None => replace_extension(clip_path, audio_extension),
    }
}

/// Position-tagged name of a processed clip
pub fn processed_clip_path(dir: &Path, position: usize, extension: &str) -> PathBuf {
    dir.join(format!("processed_clip_{:03}.{}", position, extension))
}

/// One concat manifest line; single quotes escaped the way the concat demuxer expects
pub fn manifest_line(path: &Path) -> String {
    format!("file '{}'", to_forward_slashes(path).replace('\'', r"'\''"))
}

/// Concat manifest in script order
pub fn build_manifest(clips: &[ProcessedClip]) -> String {
    let mut ordered: Vec<&ProcessedClip> = clips.iter().collect();
    ordered.sort_by_key(|clip| clip.position);
    ordered
        .into_iter()
        .map(|clip| manifest_line(&clip.path) + "\n")
        .collect()
}
