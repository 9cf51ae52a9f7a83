//! MovieAvi CLI
//!
//! Narrated movie summaries from long videos, built on an external media tool and remote
//! generative services.
//!
//! # Usage
//!
//! ```bash
//! movieavi summarize --input film.mp4 --output summary.mp4 --script-guidance "Tell the heist story"
//! movieavi split --input film.mp4 --output-dir clips
//! movieavi describe --clips-dir clips --output descriptions.json
//! movieavi agent recent <agent-id>
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use movieavi::adapters::tracing_log::{init_logging, LogFormat};
use movieavi::app::container::DefaultAppContainer;
use movieavi::cli::{commands, Cli, Commands};
use movieavi::config_initialization::initialize_configuration_hierarchy;

/// Main entry point for the MovieAvi CLI application
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_format: LogFormat = cli.log_format.parse()?;
    init_logging(&cli.log_level, log_format)?;
    info!("Starting MovieAvi");

    let config = initialize_configuration_hierarchy(&cli)?;
    let container = DefaultAppContainer::new(config);

    match cli.command {
        Commands::Split(args) => commands::split(args, &container).await?,
        Commands::Describe(args) => commands::describe(args, &container).await?,
        Commands::Plan(args) => commands::plan(args, &container).await?,
        Commands::Narrate(args) => commands::narrate(args, &container).await?,
        Commands::Assemble(args) => commands::assemble(args, &container).await?,
        Commands::Summarize(args) => commands::summarize(args, &container).await?,
        Commands::Ask(args) => commands::ask(args).await?,
        Commands::Transcribe(args) => commands::transcribe(args).await?,
        Commands::DescribeVideo(args) => commands::describe_video(args).await?,
        Commands::Imagine(args) => commands::imagine(args).await?,
        Commands::Embed(args) => commands::embed(args).await?,
        Commands::Read(args) => commands::read(args).await?,
        Commands::Agent(args) => commands::agent(args).await?,
    }

    info!("MovieAvi completed successfully");
    Ok(())
}
