use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{FfmpegAdapter, LibavFrameSampler, OpenAiServices};
use crate::app::{
    AssemblyInteractor, DescribeInteractor, MovieAvi, NarrationInteractor, ScriptInteractor,
    SegmentInteractor,
};
use crate::domain::model::PipelineConfig;
use crate::error::MovieResult;
use crate::ports::{FrameSamplerPort, GenerativePort, MediaToolPort};

pub trait AppContainer: Send + Sync {
    fn segment_interactor(&self) -> MovieResult<SegmentInteractor>;
    fn describe_interactor(&self) -> DescribeInteractor;
    fn script_interactor(&self) -> ScriptInteractor;
    fn narration_interactor(&self) -> NarrationInteractor;
    fn assembly_interactor(&self) -> MovieResult<AssemblyInteractor>;
    fn movie_avi(&self) -> MovieResult<MovieAvi>;
}

pub struct DefaultAppContainer {
    config: PipelineConfig,
    media_tool: Option<Arc<dyn MediaToolPort>>,
    sampler: Arc<dyn FrameSamplerPort>,
    generative: Arc<dyn GenerativePort>,
}

impl DefaultAppContainer {
    /// Real adapters; the media tool is resolved on first use so text-only stages run without it
    pub fn new(config: PipelineConfig) -> Self {
        let generative = OpenAiServices::new(None).with_speech_model(config.speech_model.clone());
        Self {
            config,
            media_tool: None,
            sampler: Arc::new(LibavFrameSampler::new()),
            generative: Arc::new(generative),
        }
    }

    /// Explicit ports, e.g. test doubles
    pub fn with_ports(
        config: PipelineConfig,
        media_tool: Arc<dyn MediaToolPort>,
        sampler: Arc<dyn FrameSamplerPort>,
        generative: Arc<dyn GenerativePort>,
    ) -> Self {
        Self {
            config,
            media_tool: Some(media_tool),
            sampler,
            generative,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn media_tool(&self) -> MovieResult<Arc<dyn MediaToolPort>> {
        match &self.media_tool {
            Some(media_tool) => Ok(Arc::clone(media_tool)),
            None => Ok(Arc::new(FfmpegAdapter::new(
                &self.config.ffmpeg_path,
                Duration::from_secs(self.config.tool_timeout_secs),
            )?)),
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn segment_interactor(&self) -> MovieResult<SegmentInteractor> {
        Ok(SegmentInteractor::new(
            self.media_tool()?,
            self.config.video_extension.clone(),
        ))
    }

    fn describe_interactor(&self) -> DescribeInteractor {
        DescribeInteractor::new(
            Arc::clone(&self.sampler),
            Arc::clone(&self.generative),
            self.config.description_max_tokens,
        )
    }

    fn script_interactor(&self) -> ScriptInteractor {
        ScriptInteractor::new(Arc::clone(&self.generative))
    }

    fn narration_interactor(&self) -> NarrationInteractor {
        NarrationInteractor::new(
            Arc::clone(&self.generative),
            self.config.audio_extension.clone(),
            self.config.speech_speed,
        )
    }

    fn assembly_interactor(&self) -> MovieResult<AssemblyInteractor> {
        Ok(AssemblyInteractor::new(
            self.media_tool()?,
            self.config.remux.clone(),
            self.config.video_extension.clone(),
            self.config.audio_extension.clone(),
        ))
    }

    fn movie_avi(&self) -> MovieResult<MovieAvi> {
        let media_tool = self.media_tool()?;
        Ok(MovieAvi::new(
            SegmentInteractor::new(Arc::clone(&media_tool), self.config.video_extension.clone()),
            self.describe_interactor(),
            self.script_interactor(),
            self.narration_interactor(),
            AssemblyInteractor::new(
                media_tool,
                self.config.remux.clone(),
                self.config.video_extension.clone(),
                self.config.audio_extension.clone(),
            ),
            self.config.clone(),
        ))
    }
}
