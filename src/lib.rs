//! MovieAvi Library
//!
//! Turns a long video into a short narrated summary: the video is split into clips, each clip
//! is described with the previous one as context, a language model picks and orders the clips
//! worth keeping and writes narration, the narration is voiced, and the narrated clips are
//! concatenated into the final movie. The generative and agent services used along the way are
//! exposed on their own too.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod error;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{MovieAvi, SummaryRequest};
pub use domain::model::{
    AssemblyReport, Clip, ClipDescription, DescribeOutcome, NarrationReport, PipelineConfig,
    ScriptEntry, SummaryReport, Voice,
};
pub use error::{MovieError, MovieResult};
