// Ports - Interface definitions (contracts)

use std::path::Path;

use async_trait::async_trait;

use crate::domain::model::*;
use crate::error::MovieResult;

/// Port for the external media-processing tool
#[async_trait]
pub trait MediaToolPort: Send + Sync {
    /// Demux the source into fixed-duration, codec-copied, timestamp-reset clips
    async fn segment(&self, request: &SegmentRequest) -> MovieResult<()>;

    /// Replace a clip's audio with narration, freezing the last frame if narration runs long
    async fn remux(&self, request: &RemuxRequest) -> MovieResult<()>;

    /// Stream-copy concatenation of the clips listed in `manifest`
    async fn concat(&self, manifest: &Path, output: &Path) -> MovieResult<()>;
}

/// Port for the remote generative services the pipeline consumes
#[async_trait]
pub trait GenerativePort: Send + Sync {
    /// Describe a clip from its sampled frames
    async fn describe_visual_segment(
        &self,
        instructions: &str,
        frames: &[EncodedFrame],
        model: &str,
        max_tokens: u32,
    ) -> MovieResult<String>;

    /// Chat completion constrained to a JSON object; returns the raw JSON text
    async fn structured_complete(
        &self,
        prompt: &str,
        context: &str,
        schema_hint: &str,
        model: &str,
    ) -> MovieResult<String>;

    /// Text to speech
    async fn synthesize_speech(&self, text: &str, voice: Voice, speed: f32) -> MovieResult<Vec<u8>>;
}

/// Port for sampling still frames out of a clip
#[async_trait]
pub trait FrameSamplerPort: Send + Sync {
    /// Up to `max_frames` frames spread uniformly across the clip
    async fn sample_frames(&self, clip: &Path, max_frames: usize) -> MovieResult<Vec<EncodedFrame>>;
}
