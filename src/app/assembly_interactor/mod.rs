// Assembly interactor - Remuxes narrated clips and concatenates the final movie

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::model::*;
use crate::domain::rules::*;
use crate::error::{MovieError, MovieResult};
use crate::ports::MediaToolPort;
use crate::utils::path::{absolute_path, replace_extension};

/// Interactor for the assembly stage
pub struct AssemblyInteractor {
    media_tool: Arc<dyn MediaToolPort>,
    settings: RemuxSettings,
    video_extension: String,
    audio_extension: String,
}

impl AssemblyInteractor {
    pub fn new(
        media_tool: Arc<dyn MediaToolPort>,
        settings: RemuxSettings,
        video_extension: impl Into<String>,
        audio_extension: impl Into<String>,
    ) -> Self {
        Self {
            media_tool,
            settings,
            video_extension: video_extension.into(),
            audio_extension: audio_extension.into(),
        }
    }

    /// Build the final movie at `output` from the script, in script order.
    ///
    /// Entries missing their video or sibling audio, or whose remux fails, are skipped.
    /// Intermediate clips and narration audio are deleted only after a successful concat.
    pub async fn assemble(
        &self,
        entries: &[ScriptEntry],
        output: &Path,
    ) -> MovieResult<AssemblyReport> {
        let output = absolute_path(output)?;
        let work_dir = output
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        tokio::fs::create_dir_all(&work_dir).await?;

        let mut processed = Vec::new();
        let mut skipped = Vec::new();

        for (position, entry) in entries.iter().enumerate() {
            match self.process_entry(position, entry, &work_dir).await {
                Ok(clip) => {
                    info!(clip = %clip.path.display(), "Processed script entry {}", position);
                    processed.push(clip);
                }
                Err(reason) => {
                    warn!(clip = %entry.clip_path.display(), position, "Skipping entry: {}", reason);
                    skipped.push(SkippedEntry {
                        position,
                        clip_path: entry.clip_path.clone(),
                        reason,
                    });
                }
            }
        }

        if processed.is_empty() {
            error!("No valid clips processed, cannot create summary video");
            return Err(MovieError::Assembly {
                message: format!("none of the {} script entries could be processed", entries.len()),
                stderr: None,
            });
        }

        self.concat(&processed, &output).await?;
        info!(output = %output.display(), "Summary video created");

        let cleanup_failures = cleanup(&processed).await;
        Ok(AssemblyReport {
            output,
            processed: processed.len(),
            skipped,
            cleanup_failures,
        })
    }

    async fn process_entry(
        &self,
        position: usize,
        entry: &ScriptEntry,
        work_dir: &Path,
    ) -> Result<ProcessedClip, String> {
        let video = absolute_path(&entry.clip_path).map_err(|e| e.to_string())?;
        let audio = replace_extension(&video, &self.audio_extension);
        if !video.is_file() {
            return Err(format!("video not found: {}", video.display()));
        }
        if !audio.is_file() {
            return Err(format!("narration audio not found: {}", audio.display()));
        }

        let request = RemuxRequest {
            video,
            audio: audio.clone(),
            output: processed_clip_path(work_dir, position, &self.video_extension),
            settings: self.settings.clone(),
        };
        match self.media_tool.remux(&request).await {
            Ok(()) => Ok(ProcessedClip {
                path: request.output,
                position,
                audio_path: audio,
            }),
            Err(e) => Err(match e.tool_stderr() {
                Some(stderr) => format!("{}: {}", e, stderr),
                None => e.to_string(),
            }),
        }
    }

    async fn concat(&self, processed: &[ProcessedClip], output: &Path) -> MovieResult<()> {
        // Removed on drop, whether or not the concat succeeds
        let mut manifest = tempfile::Builder::new()
            .prefix("movieavi-concat-")
            .suffix(".txt")
            .tempfile()?;
        manifest.write_all(build_manifest(processed).as_bytes())?;
        manifest.flush()?;

        self.media_tool
            .concat(manifest.path(), output)
            .await
            .map_err(|e| {
                error!(output = %output.display(), "Concatenation failed, keeping intermediate files");
                MovieError::Assembly {
                    message: e.to_string(),
                    stderr: e.tool_stderr().map(str::to_string),
                }
            })
    }
}

/// Delete each intermediate file once; a clip scripted twice shares its audio
async fn cleanup(processed: &[ProcessedClip]) -> Vec<PathBuf> {
    let mut failures = Vec::new();
    let mut seen = HashSet::new();
    for path in processed
        .iter()
        .flat_map(|clip| [&clip.path, &clip.audio_path])
        .filter(|path| seen.insert(*path))
    {
        if let Err(e) = tokio::fs::remove_file(path).await {
            warn!(path = %path.display(), "Could not delete intermediate file: {}", e);
            failures.push(path.clone());
        }
    }
    failures
}
