//! FFmpeg execution adapter
//!
//! Runs the external `ffmpeg` executable for splitting, remuxing and concatenation.
//! Every invocation is bounded by a timeout; a timeout is reported the same way as a
//! non-zero exit.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::domain::model::*;
use crate::error::{MovieError, MovieResult};
use crate::ports::MediaToolPort;

/// FFmpeg-based media tool adapter
pub struct FfmpegAdapter {
    ffmpeg_path: PathBuf,
    timeout: Duration,
}

impl FfmpegAdapter {
    /// Create new FFmpeg adapter, failing if the executable cannot be found
    pub fn new(ffmpeg_path: impl AsRef<Path>, timeout: Duration) -> MovieResult<Self> {
        let ffmpeg_path = which::which(ffmpeg_path.as_ref()).map_err(|_| {
            MovieError::MediaToolNotFound {
                path: ffmpeg_path.as_ref().display().to_string(),
            }
        })?;
        Ok(Self {
            ffmpeg_path,
            timeout,
        })
    }

    /// Resolved executable path
    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }

    /// Arguments for codec-copy segmentation with per-clip timestamp reset
    pub fn segment_args(request: &SegmentRequest) -> Vec<String> {
        vec![
            "-i".to_string(),
            request.source.to_string_lossy().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            "-map".to_string(),
            "0".to_string(),
            "-segment_time".to_string(),
            request.segment_seconds.to_string(),
            "-f".to_string(),
            "segment".to_string(),
            "-reset_timestamps".to_string(),
            "1".to_string(),
            request.output_pattern().to_string_lossy().to_string(),
        ]
    }

    /// Arguments for replacing a clip's audio with narration
    ///
    /// Output stops at the shortest stream, but the video is first padded by cloning its
    /// last frame for up to `freeze_pad_secs`, so narration that outlasts the clip is kept.
    pub fn remux_args(request: &RemuxRequest) -> Vec<String> {
        let settings = &request.settings;
        vec![
            "-y".to_string(),
            "-i".to_string(),
            request.video.to_string_lossy().to_string(),
            "-i".to_string(),
            request.audio.to_string_lossy().to_string(),
            "-map".to_string(),
            "0:v:0".to_string(),
            "-map".to_string(),
            "1:a:0".to_string(),
            "-c:v".to_string(),
            settings.video_codec.clone(),
            "-preset".to_string(),
            settings.preset.clone(),
            "-c:a".to_string(),
            settings.audio_codec.clone(),
            "-b:a".to_string(),
            settings.audio_bitrate.clone(),
            "-strict".to_string(),
            "experimental".to_string(),
            "-shortest".to_string(),
            "-vf".to_string(),
            format!(
                "tpad=stop_mode=clone:stop_duration={}",
                settings.freeze_pad_secs
            ),
            request.output.to_string_lossy().to_string(),
        ]
    }

    /// Arguments for stream-copy concatenation of a manifest
    pub fn concat_args(manifest: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            manifest.to_string_lossy().to_string(),
            "-c".to_string(),
            "copy".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    /// Run the tool, capturing stderr as the diagnostic payload
    pub(crate) async fn run(&self, operation: &str, args: &[String]) -> MovieResult<()> {
        debug!(
            "Running {}: {} {}",
            operation,
            self.ffmpeg_path.display(),
            args.join(" ")
        );

        let child = Command::new(&self.ffmpeg_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MovieError::MediaTool {
                operation: operation.to_string(),
                message: format!("failed to start {}: {}", self.ffmpeg_path.display(), e),
                stderr: None,
                exit_code: None,
            })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    operation,
                    "Media tool timed out after {} seconds, killing process",
                    self.timeout.as_secs()
                );
                return Err(MovieError::MediaTool {
                    operation: operation.to_string(),
                    message: format!("timed out after {} seconds", self.timeout.as_secs()),
                    stderr: None,
                    exit_code: None,
                });
            }
        };

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(MovieError::MediaTool {
            operation: operation.to_string(),
            message: format!("exited with {}", output.status),
            stderr: (!stderr.is_empty()).then_some(stderr),
            exit_code: output.status.code(),
        })
    }
}

#[async_trait]
impl MediaToolPort for FfmpegAdapter {
    async fn segment(&self, request: &SegmentRequest) -> MovieResult<()> {
        self.run("segment", &Self::segment_args(request)).await
    }

    async fn remux(&self, request: &RemuxRequest) -> MovieResult<()> {
        self.run("remux", &Self::remux_args(request)).await
    }

    async fn concat(&self, manifest: &Path, output: &Path) -> MovieResult<()> {
        self.run("concat", &Self::concat_args(manifest, output)).await
    }
}
