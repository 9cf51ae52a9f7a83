// Summarize interactor - The composed movie summarization pipeline

use std::path::PathBuf;

use tracing::{info, warn};

use crate::app::artifacts::save_artifact;
use crate::app::assembly_interactor::AssemblyInteractor;
use crate::app::describe_interactor::DescribeInteractor;
use crate::app::narration_interactor::NarrationInteractor;
use crate::app::script_interactor::ScriptInteractor;
use crate::app::segment_interactor::SegmentInteractor;
use crate::domain::model::*;
use crate::domain::rules::partition_known_clips;
use crate::error::{MovieError, MovieResult};

/// Inputs of one summarization run
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub source: PathBuf,
    /// Cleared before splitting
    pub clips_dir: PathBuf,
    pub output: PathBuf,
    pub description_guidance: String,
    pub script_guidance: String,
    /// Where descriptions and the script are saved, if anywhere
    pub artifacts_dir: Option<PathBuf>,
}

/// Movie summarization pipeline: split, describe, plan, narrate, assemble
pub struct MovieAvi {
    segmenter: SegmentInteractor,
    describer: DescribeInteractor,
    planner: ScriptInteractor,
    narrator: NarrationInteractor,
    assembler: AssemblyInteractor,
    config: PipelineConfig,
}

impl MovieAvi {
    pub fn new(
        segmenter: SegmentInteractor,
        describer: DescribeInteractor,
        planner: ScriptInteractor,
        narrator: NarrationInteractor,
        assembler: AssemblyInteractor,
        config: PipelineConfig,
    ) -> Self {
        Self {
            segmenter,
            describer,
            planner,
            narrator,
            assembler,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage in sequence.
    ///
    /// Per-item failures are skipped inside each stage; a missing source, an empty
    /// description set, an invalid script or an empty assembly abort the run.
    pub async fn summarize(&self, request: &SummaryRequest) -> MovieResult<SummaryReport> {
        let clips = self
            .segmenter
            .split(&request.source, &request.clips_dir, self.config.segment_seconds)
            .await?;

        let outcome = self
            .describer
            .describe_all(
                &clips,
                &request.description_guidance,
                self.config.max_frames_per_clip,
                &self.config.description_model,
            )
            .await;
        let descriptions = match outcome {
            DescribeOutcome::Described(descriptions) => descriptions,
            DescribeOutcome::NoInput => {
                return Err(MovieError::service(
                    "describe",
                    format!("no clips were produced from {}", request.source.display()),
                ))
            }
            DescribeOutcome::AllFailed { attempted } => {
                return Err(MovieError::service(
                    "describe",
                    format!("all {} clips failed description", attempted),
                ))
            }
        };
        if let Some(dir) = &request.artifacts_dir {
            save_artifact(&dir.join("descriptions.json"), &descriptions)?;
        }

        let script = self
            .planner
            .plan(
                &descriptions,
                &request.script_guidance,
                &self.config.script_model,
            )
            .await?;
        let scripted = script.len();
        let partition = partition_known_clips(script, &descriptions);
        for entry in &partition.unknown {
            warn!(clip = %entry.clip_path.display(), "Dropping script entry for a clip that was never described");
        }
        if let Some(dir) = &request.artifacts_dir {
            save_artifact(&dir.join("script.json"), &partition.known)?;
        }

        let narration = self
            .narrator
            .synthesize_all(&partition.known, self.config.voice, None)
            .await?;
        if !narration.any_succeeded() {
            warn!("No narration audio was produced");
        }

        let assembly = self
            .assembler
            .assemble(&partition.known, &request.output)
            .await?;

        let report = SummaryReport {
            clips: clips.len(),
            described: descriptions.len(),
            scripted,
            unknown_paths_dropped: partition.unknown.len(),
            narrated: narration.succeeded(),
            assembly,
        };
        info!(
            "Summary complete: {} clips, {} described, {} scripted, {} narrated, {} assembled",
            report.clips,
            report.described,
            report.scripted,
            report.narrated,
            report.assembly.processed
        );
        Ok(report)
    }
}
