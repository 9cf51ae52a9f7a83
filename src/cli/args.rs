//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, Subcommand};
use clap_num::number_range;

use crate::adapters::openai::VIDEO_DESCRIPTION_FRAMES;
use crate::domain::model::{PipelineConfig, Voice};

fn segment_seconds_range(s: &str) -> Result<u32, String> {
    number_range(s, 1, 86_400)
}

fn max_frames_range(s: &str) -> Result<usize, String> {
    number_range(s, 1, 100)
}

// number_range needs Ord, which f32 lacks
fn speech_speed_range(s: &str) -> Result<f32, String> {
    let speed: f32 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if PipelineConfig::SPEECH_SPEED_RANGE.contains(&speed) {
        Ok(speed)
    } else {
        Err(format!("speech speed must be between 0.25 and 4.0, got {}", speed))
    }
}

fn timeout_range(s: &str) -> Result<u64, String> {
    number_range(s, 1, 86_400)
}

/// Pipeline settings that override the config file and environment
#[derive(Args, Debug, Default, Clone)]
pub struct PipelineArgs {
    /// Media tool executable
    #[arg(long, global = true)]
    pub ffmpeg: Option<PathBuf>,

    /// Clip length in seconds
    #[arg(long, global = true, value_parser = segment_seconds_range)]
    pub segment_seconds: Option<u32>,

    /// Maximum frames sampled per clip
    #[arg(long, global = true, value_parser = max_frames_range)]
    pub max_frames: Option<usize>,

    /// Vision model used for clip descriptions
    #[arg(long, global = true)]
    pub description_model: Option<String>,

    /// Model used to plan the narration script
    #[arg(long, global = true)]
    pub script_model: Option<String>,

    /// Narration voice (nova, alloy, echo, fable, onyx, shimmer)
    #[arg(long, global = true)]
    pub voice: Option<Voice>,

    /// Narration speed (0.25-4.0)
    #[arg(long, global = true, value_parser = speech_speed_range)]
    pub speech_speed: Option<f32>,

    /// Timeout for each media tool invocation, in seconds
    #[arg(long, global = true, value_parser = timeout_range)]
    pub tool_timeout: Option<u64>,
}

/// Arguments for the split command
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Source video
    #[arg(short, long)]
    pub input: PathBuf,

    /// Clip directory (emptied before splitting)
    #[arg(short, long, default_value = "clips")]
    pub output_dir: PathBuf,
}

/// Arguments for the describe command
#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Directory holding clip_NNN files
    #[arg(short, long, default_value = "clips")]
    pub clips_dir: PathBuf,

    /// Extra instructions for every description
    #[arg(short, long, default_value = "")]
    pub guidance: String,

    /// Where to write the descriptions (.json, .yaml)
    #[arg(short, long, default_value = "descriptions.json")]
    pub output: PathBuf,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Descriptions written by `describe`
    #[arg(short, long, default_value = "descriptions.json")]
    pub descriptions: PathBuf,

    /// What the summary should focus on
    #[arg(short, long)]
    pub guidance: String,

    /// Where to write the script (.json, .yaml)
    #[arg(short, long, default_value = "script.json")]
    pub output: PathBuf,

    /// Drop entries whose clip was never described
    #[arg(long)]
    pub drop_unknown: bool,
}

/// Arguments for the narrate command
#[derive(Args, Debug)]
pub struct NarrateArgs {
    /// Script written by `plan`
    #[arg(short, long, default_value = "script.json")]
    pub script: PathBuf,

    /// Audio directory; audio is written next to each clip when omitted
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Where to write the per-entry report
    #[arg(long)]
    pub report: Option<PathBuf>,
}

/// Arguments for the assemble command
#[derive(Args, Debug)]
pub struct AssembleArgs {
    /// Script written by `plan`
    #[arg(short, long, default_value = "script.json")]
    pub script: PathBuf,

    /// Final video
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments for the summarize command
#[derive(Args, Debug)]
pub struct SummarizeArgs {
    /// Source video
    #[arg(short, long)]
    pub input: PathBuf,

    /// Final video
    #[arg(short, long)]
    pub output: PathBuf,

    /// Clip directory (emptied before splitting)
    #[arg(long, default_value = "clips")]
    pub clips_dir: PathBuf,

    /// Extra instructions for every clip description
    #[arg(long, default_value = "")]
    pub description_guidance: String,

    /// What the summary should focus on
    #[arg(long)]
    pub script_guidance: String,

    /// Save descriptions and script here
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,
}

/// Arguments for the ask command
#[derive(Args, Debug)]
pub struct AskArgs {
    /// Prompt text
    pub prompt: String,

    /// System instructions
    #[arg(long)]
    pub instructions: Option<String>,

    #[arg(long, default_value = "gpt-4o-mini")]
    pub model: String,

    /// Request a JSON object response
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the transcribe command
#[derive(Args, Debug)]
pub struct TranscribeArgs {
    /// Audio file
    pub audio: PathBuf,
}

/// Arguments for the imagine command
#[derive(Args, Debug)]
pub struct ImagineArgs {
    /// Image prompt
    pub prompt: String,

    #[arg(long, default_value = "dall-e-3")]
    pub model: String,
}

/// Arguments for the embed command
#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Text to embed
    pub text: String,

    #[arg(long, default_value = "text-embedding-3-small")]
    pub model: String,

    /// Remove URLs from the text first
    #[arg(long)]
    pub strip_urls: bool,
}

/// Arguments for the agent command
#[derive(Args, Debug)]
pub struct AgentArgs {
    /// Override the API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: AgentCommands,
}

#[derive(Subcommand, Debug)]
pub enum AgentCommands {
    /// List agents
    List,
    /// Print the most recent conversation transcript
    Recent {
        agent_id: String,
    },
    /// Print summaries of recent conversations
    Summaries {
        agent_id: String,

        /// Earliest start time (RFC 3339, or YYYY-MM-DD for midnight UTC)
        #[arg(long)]
        since: String,

        /// Only conversations longer than this many seconds
        #[arg(long, default_value_t = 0)]
        min_duration: u64,
    },
    /// Update an agent; only the given fields change
    Update {
        agent_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        first_message: Option<String>,
        #[arg(long)]
        prompt: Option<String>,
        #[arg(long)]
        llm: Option<String>,
        #[arg(long)]
        max_duration: Option<u64>,
    },
}

/// Arguments for the describe-video command
#[derive(Args, Debug)]
pub struct DescribeVideoArgs {
    /// Video file
    #[arg(short, long)]
    pub input: PathBuf,

    /// What the description should cover
    #[arg(short = 'n', long, default_value = "Describe what happens in this video.")]
    pub instructions: String,

    #[arg(long, default_value = "gpt-4o-mini")]
    pub model: String,

    /// Frames sampled from the whole video
    #[arg(long, default_value_t = VIDEO_DESCRIPTION_FRAMES, value_parser = max_frames_range)]
    pub frames: usize,
}

/// Arguments for the read command
#[derive(Args, Debug)]
pub struct ReadArgs {
    /// PDF or DOCX document
    pub document: PathBuf,
}
