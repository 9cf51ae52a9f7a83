//! Command implementations

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use crate::adapters::documents::read_document;
use crate::adapters::elevenlabs::{AgentUpdate, ElevenLabsClient, ElevenLabsConfig};
use crate::adapters::openai::{OpenAiServices, OutputType};
use crate::adapters::LibavFrameSampler;
use crate::app::artifacts::{load_artifact, save_artifact};
use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::app::SummaryRequest;
use crate::cli::args::*;
use crate::domain::model::*;
use crate::domain::rules::partition_known_clips;
use crate::utils::path::list_clips;
use crate::utils::text::remove_urls;
use crate::utils::Utils;

/// Execute the split command
pub async fn split(args: SplitArgs, container: &DefaultAppContainer) -> Result<()> {
    info!("Input: {}", args.input.display());
    warn!(
        "Everything inside {} will be deleted before splitting",
        args.output_dir.display()
    );

    let clips = container
        .segment_interactor()?
        .split(&args.input, &args.output_dir, container.config().segment_seconds)
        .await
        .context("Failed to split video")?;

    for clip in &clips {
        println!("{}", clip.path.display());
    }
    Ok(())
}

/// Execute the describe command
pub async fn describe(args: DescribeArgs, container: &DefaultAppContainer) -> Result<()> {
    let config = container.config();
    let clips = list_clips(&args.clips_dir, &config.video_extension)
        .with_context(|| format!("Failed to list clips in {}", args.clips_dir.display()))?;
    info!("Describing {} clips", clips.len());

    let outcome = container
        .describe_interactor()
        .describe_all(
            &clips,
            &args.guidance,
            config.max_frames_per_clip,
            &config.description_model,
        )
        .await;

    match outcome {
        DescribeOutcome::Described(descriptions) => {
            save_artifact(&args.output, &descriptions)
                .context("Failed to write descriptions")?;
            println!(
                "Described {} of {} clips -> {}",
                descriptions.len(),
                clips.len(),
                args.output.display()
            );
            Ok(())
        }
        DescribeOutcome::NoInput => bail!("No clips found in {}", args.clips_dir.display()),
        DescribeOutcome::AllFailed { attempted } => {
            bail!("All {} clips failed description", attempted)
        }
    }
}

/// Execute the plan command
pub async fn plan(args: PlanArgs, container: &DefaultAppContainer) -> Result<()> {
    let descriptions: Vec<ClipDescription> = load_artifact(&args.descriptions)
        .context("Failed to read descriptions")?;

    let mut script = container
        .script_interactor()
        .plan(&descriptions, &args.guidance, &container.config().script_model)
        .await
        .context("Failed to plan narration script")?;

    if args.drop_unknown {
        let partition = partition_known_clips(script, &descriptions);
        for entry in &partition.unknown {
            warn!(clip = %entry.clip_path.display(), "Dropping entry for unknown clip");
        }
        script = partition.known;
    }

    save_artifact(&args.output, &script).context("Failed to write script")?;
    println!("Script with {} entries -> {}", script.len(), args.output.display());
    Ok(())
}

/// Execute the narrate command
pub async fn narrate(args: NarrateArgs, container: &DefaultAppContainer) -> Result<()> {
    let script: Vec<ScriptEntry> = load_artifact(&args.script).context("Failed to read script")?;

    let report = container
        .narration_interactor()
        .synthesize_all(&script, container.config().voice, args.output_dir.as_deref())
        .await
        .context("Failed to synthesize narration")?;

    if let Some(path) = &args.report {
        save_artifact(path, &report).context("Failed to write narration report")?;
    }
    display_narration_report(&report);

    if !report.any_succeeded() {
        bail!("No narration audio was produced");
    }
    Ok(())
}

/// Execute the assemble command
pub async fn assemble(args: AssembleArgs, container: &DefaultAppContainer) -> Result<()> {
    let script: Vec<ScriptEntry> = load_artifact(&args.script).context("Failed to read script")?;

    let report = container
        .assembly_interactor()?
        .assemble(&script, &args.output)
        .await
        .context("Failed to assemble summary video")?;

    display_assembly_report(&report);
    Ok(())
}

/// Execute the summarize command
pub async fn summarize(args: SummarizeArgs, container: &DefaultAppContainer) -> Result<()> {
    info!("Input: {}", args.input.display());
    info!("Output: {}", args.output.display());

    let pipeline = container.movie_avi()?;
    let request = SummaryRequest {
        source: args.input,
        clips_dir: args.clips_dir,
        output: args.output,
        description_guidance: args.description_guidance,
        script_guidance: args.script_guidance,
        artifacts_dir: args.artifacts_dir,
    };

    let report = pipeline
        .summarize(&request)
        .await
        .context("Summarization failed")?;

    println!("Clips:      {}", report.clips);
    println!("Described:  {}", report.described);
    println!(
        "Scripted:   {} ({} unknown clip paths dropped)",
        report.scripted, report.unknown_paths_dropped
    );
    println!("Narrated:   {}", report.narrated);
    display_assembly_report(&report.assembly);
    Ok(())
}

/// Execute the ask command
pub async fn ask(args: AskArgs) -> Result<()> {
    let output_type = if args.json {
        OutputType::JsonObject
    } else {
        OutputType::Text
    };
    let reply = OpenAiServices::new(None)
        .generate_text(&args.prompt, args.instructions.as_deref(), &args.model, output_type)
        .await
        .context("Text generation failed")?;
    println!("{}", reply);
    Ok(())
}

/// Execute the transcribe command
pub async fn transcribe(args: TranscribeArgs) -> Result<()> {
    let text = OpenAiServices::new(None)
        .recognize_speech(&args.audio)
        .await
        .with_context(|| format!("Failed to transcribe {}", args.audio.display()))?;
    println!("{}", text);
    Ok(())
}

/// Execute the describe-video command
pub async fn describe_video(args: DescribeVideoArgs) -> Result<()> {
    let sampler = LibavFrameSampler::new();
    let description = OpenAiServices::new(None)
        .generate_video_description(&sampler, &args.input, &args.instructions, &args.model, args.frames)
        .await
        .with_context(|| format!("Failed to describe {}", args.input.display()))?;
    println!("{}", description);
    Ok(())
}

/// Execute the imagine command
pub async fn imagine(args: ImagineArgs) -> Result<()> {
    let image = OpenAiServices::new(None)
        .generate_image(&args.prompt, &args.model)
        .await
        .context("Image generation failed")?;
    println!("{}", image.url);
    if let Some(revised) = image.revised_prompt {
        println!("Revised prompt: {}", revised);
    }
    Ok(())
}

/// Execute the embed command
pub async fn embed(args: EmbedArgs) -> Result<()> {
    let text = if args.strip_urls {
        remove_urls(&args.text)
    } else {
        args.text
    };
    let embedding = OpenAiServices::new(None)
        .get_embedding(&text, &args.model)
        .await
        .context("Embedding failed")?;
    println!("{}", serde_json::to_string(&embedding)?);
    Ok(())
}

/// Execute the read command
pub async fn read(args: ReadArgs) -> Result<()> {
    let path = args.document.clone();
    let text = tokio::task::spawn_blocking(move || read_document(&args.document))
        .await
        .context("Document reader task failed")?
        .with_context(|| format!("Failed to read {}", path.display()))?;
    println!("{}", text);
    Ok(())
}

/// Execute an agent subcommand
pub async fn agent(args: AgentArgs) -> Result<()> {
    let mut config = ElevenLabsConfig::from_env()?;
    if let Some(base_url) = args.base_url {
        config = config.with_base_url(base_url);
    }
    let client = ElevenLabsClient::new(config)?;

    match args.command {
        AgentCommands::List => {
            for agent in client.get_agents().await.context("Failed to list agents")? {
                println!("{}\t{}", agent.agent_id, agent.name);
            }
        }
        AgentCommands::Recent { agent_id } => {
            let text = client
                .most_recent_conversation_string(&agent_id)
                .await
                .context("Failed to fetch most recent conversation")?;
            print!("{}", text);
        }
        AgentCommands::Summaries {
            agent_id,
            since,
            min_duration,
        } => {
            let since = parse_since(&since)?;
            let text = client
                .conversation_summaries_string(&agent_id, since, min_duration)
                .await
                .context("Failed to fetch conversation summaries")?;
            println!("{}", text);
        }
        AgentCommands::Update {
            agent_id,
            name,
            first_message,
            prompt,
            llm,
            max_duration,
        } => {
            let update = AgentUpdate {
                agent_id: Some(agent_id.clone()),
                name,
                first_message,
                prompt,
                llm,
                max_duration_seconds: max_duration,
            };
            if !client.update_agent(&update).await? {
                bail!("Agent {} was not updated", agent_id);
            }
            println!("Updated agent {}", agent_id);
        }
    }
    Ok(())
}

/// RFC 3339 timestamp, or a bare date meaning midnight UTC
fn parse_since(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Ok(time.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid --since value '{}'", value))?;
    date.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .with_context(|| format!("Invalid --since value '{}'", value))
}

/// Display narration results in human-readable format
fn display_narration_report(report: &NarrationReport) {
    println!("Narration Results");
    println!("=================");
    for clip in &report.narrated {
        match &clip.audio_path {
            Some(audio) => println!("  ✓ {} -> {}", clip.clip_path.display(), audio.display()),
            None => println!("  ✗ {}", clip.clip_path.display()),
        }
    }
    println!("{} succeeded, {} failed", report.succeeded(), report.failed());
}

/// Display assembly results in human-readable format
fn display_assembly_report(report: &AssemblyReport) {
    println!("Output:     {}", report.output.display());
    if let Ok(metadata) = std::fs::metadata(&report.output) {
        println!("Size:       {}", Utils::format_file_size(metadata.len()));
    }
    println!("Processed:  {}", report.processed);
    for skipped in &report.skipped {
        println!(
            "  skipped #{} {}: {}",
            skipped.position,
            skipped.clip_path.display(),
            skipped.reason
        );
    }
    for path in &report.cleanup_failures {
        println!("  not deleted: {}", path.display());
    }
}
