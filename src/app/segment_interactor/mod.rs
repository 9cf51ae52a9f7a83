// Segment interactor - Splits a source video into fixed-duration clips

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::model::*;
use crate::error::{MovieError, MovieResult};
use crate::ports::MediaToolPort;
use crate::utils::path::{empty_directory, list_clips};

/// Interactor for the segmentation stage
pub struct SegmentInteractor {
    media_tool: Arc<dyn MediaToolPort>,
    clip_extension: String,
}

impl SegmentInteractor {
    pub fn new(media_tool: Arc<dyn MediaToolPort>, clip_extension: impl Into<String>) -> Self {
        Self {
            media_tool,
            clip_extension: clip_extension.into(),
        }
    }

    /// Split `source` into `segment_seconds` clips inside `output_dir`.
    ///
    /// Destructive: anything already inside `output_dir` is deleted first. When the media tool
    /// fails the directory is left as the tool left it.
    pub async fn split(
        &self,
        source: &Path,
        output_dir: &Path,
        segment_seconds: u32,
    ) -> MovieResult<Vec<Clip>> {
        if !source.is_file() {
            error!(path = %source.display(), "Source video not found");
            return Err(MovieError::InputNotFound {
                path: source.display().to_string(),
            });
        }
        if segment_seconds == 0 {
            return Err(MovieError::config("segment length must be greater than 0"));
        }

        if output_dir.exists() {
            warn!(dir = %output_dir.display(), "Clearing existing clip directory");
            let failures = empty_directory(output_dir)?;
            if let Some((path, e)) = failures.into_iter().next() {
                error!(path = %path.display(), "Could not clear clip directory: {}", e);
                return Err(MovieError::Io(e));
            }
        }
        std::fs::create_dir_all(output_dir)?;

        info!(
            "Splitting {} into {}s clips under {}",
            source.display(),
            segment_seconds,
            output_dir.display()
        );
        let request = SegmentRequest {
            source: source.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            segment_seconds,
            clip_extension: self.clip_extension.clone(),
        };
        if let Err(e) = self.media_tool.segment(&request).await {
            error!(path = %source.display(), stderr = e.tool_stderr().unwrap_or(""), "Segmentation failed");
            return Err(e);
        }

        let clips = list_clips(output_dir, &self.clip_extension)?;
        info!("Created {} clips", clips.len());
        Ok(clips)
    }
}
