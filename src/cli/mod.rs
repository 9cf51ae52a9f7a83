//! CLI module for MovieAvi
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// MovieAvi
///
/// Summarizes a long video into a short narrated movie, and exposes the generative
/// services it is built on.
#[derive(Parser)]
#[command(name = "movieavi")]
#[command(about = "MovieAvi - Narrated movie summaries from long videos")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Logging level (RUST_LOG takes precedence)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Log output format (pretty, json)
    #[arg(long, default_value = "pretty", global = true)]
    pub log_format: String,

    /// Configuration file (default: movieavi.toml, then config/movieavi.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub pipeline: args::PipelineArgs,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Split a video into fixed-duration clips
    Split(args::SplitArgs),
    /// Describe every clip, each with the previous clip as context
    Describe(args::DescribeArgs),
    /// Plan the narration script from clip descriptions
    Plan(args::PlanArgs),
    /// Synthesize narration audio for a script
    Narrate(args::NarrateArgs),
    /// Remux narrated clips and concatenate the final video
    Assemble(args::AssembleArgs),
    /// Run the whole pipeline
    Summarize(args::SummarizeArgs),
    /// Generate text
    Ask(args::AskArgs),
    /// Transcribe an audio file
    Transcribe(args::TranscribeArgs),
    /// Describe a whole video from frames sampled across it
    DescribeVideo(args::DescribeVideoArgs),
    /// Generate an image
    Imagine(args::ImagineArgs),
    /// Print an embedding vector as JSON
    Embed(args::EmbedArgs),
    /// Print the text of a PDF or DOCX document
    Read(args::ReadArgs),
    /// Conversational agents
    Agent(args::AgentArgs),
}
