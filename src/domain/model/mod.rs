// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MovieError;

/// Narration voice offered by the speech service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    #[default]
    Nova,
    Alloy,
    Echo,
    Fable,
    Onyx,
    Shimmer,
}

impl Voice {
    /// All recognised voices
    pub const ALL: [Voice; 6] = [
        Voice::Nova,
        Voice::Alloy,
        Voice::Echo,
        Voice::Fable,
        Voice::Onyx,
        Voice::Shimmer,
    ];

    /// Voice identifier as sent to the service
    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Nova => "nova",
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Shimmer => "shimmer",
        }
    }
}

impl FromStr for Voice {
    type Err = MovieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Voice::ALL
            .into_iter()
            .find(|voice| voice.as_str() == wanted)
            .ok_or_else(|| {
                MovieError::config(format!(
                    "Invalid voice: {}. Valid voices: nova, alloy, echo, fable, onyx, shimmer",
                    s
                ))
            })
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fixed-duration segment of the source video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clip {
    pub path: PathBuf,
    pub index: usize,
}

impl Clip {
    pub fn new(path: impl Into<PathBuf>, index: usize) -> Self {
        Self {
            path: path.into(),
            index,
        }
    }
}

/// Description of a clip, generated with the previous clip's description as context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipDescription {
    pub clip: Clip,
    pub description: String,
}

impl ClipDescription {
    pub fn new(clip: Clip, description: impl Into<String>) -> Self {
        Self {
            clip,
            description: description.into(),
        }
    }

    /// Path of the described clip
    pub fn clip_path(&self) -> &Path {
        &self.clip.path
    }
}

/// Result of describing an ordered clip sequence
#[derive(Debug, Clone, PartialEq)]
pub enum DescribeOutcome {
    /// At least one clip was described; survivors in input order
    Described(Vec<ClipDescription>),
    /// The clip sequence was empty
    NoInput,
    /// Every clip failed
    AllFailed { attempted: usize },
}

impl DescribeOutcome {
    /// Descriptions produced, empty for both sentinels
    pub fn descriptions(&self) -> &[ClipDescription] {
        match self {
            DescribeOutcome::Described(descriptions) => descriptions,
            _ => &[],
        }
    }

    pub fn into_descriptions(self) -> Vec<ClipDescription> {
        match self {
            DescribeOutcome::Described(descriptions) => descriptions,
            _ => Vec::new(),
        }
    }
}

/// One element of the narration script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptEntry {
    pub clip_path: PathBuf,
    pub narration: String,
}

impl ScriptEntry {
    pub fn new(clip_path: impl Into<PathBuf>, narration: impl Into<String>) -> Self {
        Self {
            clip_path: clip_path.into(),
            narration: narration.into(),
        }
    }
}

/// Script entry after speech synthesis was attempted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NarratedClip {
    pub clip_path: PathBuf,
    pub narration_text: String,
    /// None until synthesis succeeds
    pub audio_path: Option<PathBuf>,
}

/// Per-entry outcome of narration synthesis
#[derive(Debug, Clone, Default, Serialize)]
pub struct NarrationReport {
    pub narrated: Vec<NarratedClip>,
}

impl NarrationReport {
    /// Number of entries that produced audio
    pub fn succeeded(&self) -> usize {
        self.narrated
            .iter()
            .filter(|clip| clip.audio_path.is_some())
            .count()
    }

    /// Number of entries without audio
    pub fn failed(&self) -> usize {
        self.narrated.len() - self.succeeded()
    }

    /// Overall success: at least one entry produced audio
    pub fn any_succeeded(&self) -> bool {
        self.succeeded() > 0
    }
}

/// Clip whose audio track was replaced by its narration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedClip {
    pub path: PathBuf,
    /// Position of the originating entry in the script
    pub position: usize,
    /// Narration audio consumed by this clip
    pub audio_path: PathBuf,
}

/// Script entry that did not reach the final movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedEntry {
    pub position: usize,
    pub clip_path: PathBuf,
    pub reason: String,
}

/// Outcome of a successful assembly
#[derive(Debug, Clone, Serialize)]
pub struct AssemblyReport {
    pub output: PathBuf,
    pub processed: usize,
    pub skipped: Vec<SkippedEntry>,
    /// Intermediate files that could not be deleted
    pub cleanup_failures: Vec<PathBuf>,
}

/// Base64 JPEG frame as a `data:` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame(String);

impl EncodedFrame {
    pub const JPEG_PREFIX: &'static str = "data:image/jpeg;base64,";

    /// Wrap base64 JPEG payload
    pub fn from_base64_jpeg(payload: &str) -> Self {
        Self(format!("{}{}", Self::JPEG_PREFIX, payload))
    }

    pub fn as_data_url(&self) -> &str {
        &self.0
    }

    pub fn into_data_url(self) -> String {
        self.0
    }
}

/// Request to split a source video into fixed-duration clips
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentRequest {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub segment_seconds: u32,
    pub clip_extension: String,
}

impl SegmentRequest {
    /// Output pattern handed to the media tool, e.g. `clips/clip_%03d.mp4`
    pub fn output_pattern(&self) -> PathBuf {
        self.output_dir
            .join(format!("clip_%03d.{}", self.clip_extension))
    }
}

/// Encoding settings used when replacing a clip's audio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemuxSettings {
    pub video_codec: String,
    pub preset: String,
    pub audio_codec: String,
    pub audio_bitrate: String,
    /// Upper bound on how long the last frame is held when narration runs long
    pub freeze_pad_secs: u32,
}

impl Default for RemuxSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            preset: "ultrafast".to_string(),
            audio_codec: "aac".to_string(),
            audio_bitrate: "192k".to_string(),
            freeze_pad_secs: 5,
        }
    }
}

/// Request to combine a clip's video with external narration audio
#[derive(Debug, Clone, PartialEq)]
pub struct RemuxRequest {
    pub video: PathBuf,
    pub audio: PathBuf,
    pub output: PathBuf,
    pub settings: RemuxSettings,
}

/// Settings shared by every pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Media tool executable
    pub ffmpeg_path: PathBuf,
    /// Bound on every media tool invocation
    pub tool_timeout_secs: u64,
    pub segment_seconds: u32,
    pub max_frames_per_clip: usize,
    pub description_model: String,
    pub script_model: String,
    pub description_max_tokens: u32,
    pub voice: Voice,
    pub speech_model: String,
    pub speech_speed: f32,
    pub video_extension: String,
    pub audio_extension: String,
    pub remux: RemuxSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            tool_timeout_secs: 1800,
            segment_seconds: 60,
            max_frames_per_clip: 10,
            description_model: "gpt-4o-mini".to_string(),
            script_model: "gpt-4o-mini".to_string(),
            description_max_tokens: 1000,
            voice: Voice::Nova,
            speech_model: "tts-1".to_string(),
            speech_speed: 1.0,
            video_extension: "mp4".to_string(),
            audio_extension: "mp3".to_string(),
            remux: RemuxSettings::default(),
        }
    }
}

impl PipelineConfig {
    pub const SPEECH_SPEED_RANGE: std::ops::RangeInclusive<f32> = 0.25..=4.0;

    /// Reject values no stage can work with
    pub fn validate(&self) -> Result<(), MovieError> {
        if self.segment_seconds == 0 {
            return Err(MovieError::config("segment_seconds must be greater than 0"));
        }
        if self.max_frames_per_clip == 0 {
            return Err(MovieError::config("max_frames_per_clip must be greater than 0"));
        }
        if self.tool_timeout_secs == 0 {
            return Err(MovieError::config("tool_timeout_secs must be greater than 0"));
        }
        if !Self::SPEECH_SPEED_RANGE.contains(&self.speech_speed) {
            return Err(MovieError::config(format!(
                "speech_speed must be between 0.25 and 4.0, got {}",
                self.speech_speed
            )));
        }
        for (name, value) in [
            ("description_model", &self.description_model),
            ("script_model", &self.script_model),
            ("speech_model", &self.speech_model),
            ("video_extension", &self.video_extension),
            ("audio_extension", &self.audio_extension),
        ] {
            if value.trim().is_empty() {
                return Err(MovieError::config(format!("{} must not be empty", name)));
            }
        }
        if self.video_extension == self.audio_extension {
            return Err(MovieError::config(
                "video_extension and audio_extension must differ",
            ));
        }
        Ok(())
    }
}

/// Per-stage counts for a full pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub clips: usize,
    pub described: usize,
    pub scripted: usize,
    pub unknown_paths_dropped: usize,
    pub narrated: usize,
    pub assembly: AssemblyReport,
}

#[cfg(test)]
mod tests;
