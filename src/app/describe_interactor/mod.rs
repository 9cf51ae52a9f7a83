// Describe interactor - Context-carrying description of an ordered clip sequence

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::model::*;
use crate::domain::rules::*;
use crate::error::MovieResult;
use crate::ports::{FrameSamplerPort, GenerativePort};

/// Interactor for the description stage
pub struct DescribeInteractor {
    sampler: Arc<dyn FrameSamplerPort>,
    generative: Arc<dyn GenerativePort>,
    max_tokens: u32,
}

impl DescribeInteractor {
    pub fn new(
        sampler: Arc<dyn FrameSamplerPort>,
        generative: Arc<dyn GenerativePort>,
        max_tokens: u32,
    ) -> Self {
        Self {
            sampler,
            generative,
            max_tokens,
        }
    }

    /// Describe each clip in order, feeding it the last successful description.
    ///
    /// A clip that fails is dropped and leaves the rolling context untouched.
    pub async fn describe_all(
        &self,
        clips: &[Clip],
        guidance: &str,
        max_frames_per_clip: usize,
        model: &str,
    ) -> DescribeOutcome {
        if clips.is_empty() {
            return DescribeOutcome::NoInput;
        }

        let mut described = Vec::with_capacity(clips.len());
        let mut previous = FIRST_CLIP_CONTEXT.to_string();

        for clip in clips {
            match self
                .describe_clip(clip, guidance, &previous, max_frames_per_clip, model)
                .await
            {
                Ok(description) => {
                    info!(clip = %clip.path.display(), "Described clip {}", clip.index);
                    previous = description.clone();
                    described.push(ClipDescription::new(clip.clone(), description));
                }
                Err(e) => {
                    warn!(clip = %clip.path.display(), error = %e, "Skipping clip that could not be described");
                }
            }
        }

        if described.is_empty() {
            DescribeOutcome::AllFailed {
                attempted: clips.len(),
            }
        } else {
            DescribeOutcome::Described(described)
        }
    }

    async fn describe_clip(
        &self,
        clip: &Clip,
        guidance: &str,
        previous: &str,
        max_frames: usize,
        model: &str,
    ) -> MovieResult<String> {
        let frames = self.sampler.sample_frames(&clip.path, max_frames).await?;
        debug!("Sampled {} frames from {}", frames.len(), clip.path.display());
        let instructions = description_instructions(guidance, previous);
        self.generative
            .describe_visual_segment(&instructions, &frames, model, self.max_tokens)
            .await
    }
}
