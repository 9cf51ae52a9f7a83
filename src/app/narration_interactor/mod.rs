// Narration interactor - Synthesizes narration audio per script entry

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::model::*;
use crate::domain::rules::narration_audio_path;
use crate::error::MovieResult;
use crate::ports::GenerativePort;

/// Interactor for the narration stage
pub struct NarrationInteractor {
    generative: Arc<dyn GenerativePort>,
    audio_extension: String,
    speed: f32,
}

impl NarrationInteractor {
    pub fn new(
        generative: Arc<dyn GenerativePort>,
        audio_extension: impl Into<String>,
        speed: f32,
    ) -> Self {
        Self {
            generative,
            audio_extension: audio_extension.into(),
            speed,
        }
    }

    /// Synthesize every entry, writing audio next to its clip or into `output_dir`.
    ///
    /// Entries that fail keep `audio_path = None`; the remaining entries still run.
    pub async fn synthesize_all(
        &self,
        entries: &[ScriptEntry],
        voice: Voice,
        output_dir: Option<&Path>,
    ) -> MovieResult<NarrationReport> {
        if let Some(dir) = output_dir {
            tokio::fs::create_dir_all(dir).await?;
        }

        let mut report = NarrationReport::default();
        for entry in entries {
            let target = narration_audio_path(&entry.clip_path, output_dir, &self.audio_extension);
            let audio_path = match self.synthesize_one(&entry.narration, voice, &target).await {
                Ok(()) => {
                    info!(audio = %target.display(), "Narration saved");
                    Some(target)
                }
                Err(e) => {
                    warn!(clip = %entry.clip_path.display(), error = %e, "Narration failed");
                    None
                }
            };
            report.narrated.push(NarratedClip {
                clip_path: entry.clip_path.clone(),
                narration_text: entry.narration.clone(),
                audio_path,
            });
        }

        info!(
            "Narrated {} of {} entries",
            report.succeeded(),
            report.narrated.len()
        );
        Ok(report)
    }

    async fn synthesize_one(&self, text: &str, voice: Voice, target: &Path) -> MovieResult<()> {
        let audio = self
            .generative
            .synthesize_speech(text, voice, self.speed)
            .await?;
        tokio::fs::write(target, audio).await?;
        Ok(())
    }
}
