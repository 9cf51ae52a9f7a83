use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use movieavi::app::container::{AppContainer, DefaultAppContainer};
use movieavi::app::*;
use movieavi::domain::model::*;
use movieavi::domain::rules::FIRST_CLIP_CONTEXT;
use movieavi::ports::*;
use movieavi::{MovieError, MovieResult};

/// Test doubles for the pipeline ports
mod test_utils {
    use super::*;

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Media tool that writes placeholder files instead of running ffmpeg
    #[derive(Default)]
    pub struct FakeMediaTool {
        pub source_seconds: u32,
        pub fail_remux_for: HashSet<String>,
        pub fail_concat: bool,
        pub remuxed: Mutex<Vec<RemuxRequest>>,
        pub manifests: Mutex<Vec<String>>,
    }

    impl FakeMediaTool {
        pub fn with_source_seconds(seconds: u32) -> Self {
            Self {
                source_seconds: seconds,
                ..Default::default()
            }
        }

        pub fn concat_calls(&self) -> usize {
            self.manifests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl MediaToolPort for FakeMediaTool {
        async fn segment(&self, request: &SegmentRequest) -> MovieResult<()> {
            let count = self.source_seconds.div_ceil(request.segment_seconds);
            for index in 0..count {
                let path = request
                    .output_dir
                    .join(format!("clip_{:03}.{}", index, request.clip_extension));
                std::fs::write(path, b"video")?;
            }
            Ok(())
        }

        async fn remux(&self, request: &RemuxRequest) -> MovieResult<()> {
            self.remuxed.lock().unwrap().push(request.clone());
            if self.fail_remux_for.contains(&file_name(&request.video)) {
                return Err(MovieError::MediaTool {
                    operation: "remux".to_string(),
                    message: "exited with exit status: 1".to_string(),
                    stderr: Some("Invalid data found when processing input".to_string()),
                    exit_code: Some(1),
                });
            }
            std::fs::write(&request.output, b"processed")?;
            Ok(())
        }

        async fn concat(&self, manifest: &Path, output: &Path) -> MovieResult<()> {
            self.manifests
                .lock()
                .unwrap()
                .push(std::fs::read_to_string(manifest)?);
            if self.fail_concat {
                return Err(MovieError::MediaTool {
                    operation: "concat".to_string(),
                    message: "exited with exit status: 1".to_string(),
                    stderr: Some("Non-monotonous DTS".to_string()),
                    exit_code: Some(1),
                });
            }
            std::fs::write(output, b"movie")?;
            Ok(())
        }
    }

    /// Sampler that tags each frame with the clip file name
    #[derive(Default)]
    pub struct FakeSampler {
        pub fail_for: HashSet<String>,
    }

    #[async_trait]
    impl FrameSamplerPort for FakeSampler {
        async fn sample_frames(&self, clip: &Path, max_frames: usize) -> MovieResult<Vec<EncodedFrame>> {
            let name = file_name(clip);
            if self.fail_for.contains(&name) {
                return Err(MovieError::FrameSampling {
                    path: clip.display().to_string(),
                    message: "no frames could be decoded".to_string(),
                });
            }
            Ok(vec![EncodedFrame::from_base64_jpeg(&name); max_frames.min(3)])
        }
    }

    /// Generative services with scripted answers
    #[derive(Default)]
    pub struct FakeGenerative {
        pub fail_description_for: HashSet<String>,
        pub fail_speech_for: HashSet<String>,
        pub script_response: Mutex<String>,
        /// (clip name, instructions) per description request
        pub description_requests: Mutex<Vec<(String, String)>>,
        pub planner_contexts: Mutex<Vec<String>>,
    }

    impl FakeGenerative {
        pub fn with_script(script: impl Into<String>) -> Self {
            Self {
                script_response: Mutex::new(script.into()),
                ..Default::default()
            }
        }

        pub fn instructions_for(&self, clip: &str) -> Option<String> {
            self.description_requests
                .lock()
                .unwrap()
                .iter()
                .find(|(name, _)| name == clip)
                .map(|(_, instructions)| instructions.clone())
        }
    }

    #[async_trait]
    impl GenerativePort for FakeGenerative {
        async fn describe_visual_segment(
            &self,
            instructions: &str,
            frames: &[EncodedFrame],
            _model: &str,
            _max_tokens: u32,
        ) -> MovieResult<String> {
            let clip = frames
                .first()
                .map(|frame| frame.as_data_url().trim_start_matches(EncodedFrame::JPEG_PREFIX).to_string())
                .unwrap_or_default();
            self.description_requests
                .lock()
                .unwrap()
                .push((clip.clone(), instructions.to_string()));
            if self.fail_description_for.contains(&clip) {
                return Err(MovieError::service("OpenAI", "rate limited"));
            }
            Ok(format!("Scene from {}", clip))
        }

        async fn structured_complete(
            &self,
            _prompt: &str,
            context: &str,
            _schema_hint: &str,
            _model: &str,
        ) -> MovieResult<String> {
            self.planner_contexts.lock().unwrap().push(context.to_string());
            Ok(self.script_response.lock().unwrap().clone())
        }

        async fn synthesize_speech(&self, text: &str, _voice: Voice, _speed: f32) -> MovieResult<Vec<u8>> {
            if self.fail_speech_for.contains(text) {
                return Err(MovieError::service("OpenAI", "speech failed"));
            }
            Ok(text.as_bytes().to_vec())
        }
    }

    pub fn clips_in(dir: &Path, names: &[&str]) -> Vec<Clip> {
        names
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let path = dir.join(name);
                std::fs::write(&path, b"video").unwrap();
                Clip::new(path, index)
            })
            .collect()
    }

    pub fn script_json(entries: &[(PathBuf, &str)]) -> String {
        let script: Vec<serde_json::Value> = entries
            .iter()
            .map(|(path, narration)| {
                serde_json::json!({"clip_path": path.to_string_lossy(), "narration": narration})
            })
            .collect();
        serde_json::json!({ "script": script }).to_string()
    }
}

use test_utils::*;

fn describer(sampler: FakeSampler, generative: Arc<FakeGenerative>) -> DescribeInteractor {
    DescribeInteractor::new(Arc::new(sampler), generative, 1000)
}

fn assembler(media_tool: Arc<FakeMediaTool>) -> AssemblyInteractor {
    AssemblyInteractor::new(media_tool, RemuxSettings::default(), "mp4", "mp3")
}

#[tokio::test]
async fn test_split_yields_ordered_clips_and_clears_directory() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("film.mp4");
    std::fs::write(&source, b"source").unwrap();
    let clips_dir = temp.path().join("clips");
    std::fs::create_dir_all(clips_dir.join("old_run")).unwrap();
    std::fs::write(clips_dir.join("clip_009.mp4"), b"stale").unwrap();

    let segmenter = SegmentInteractor::new(Arc::new(FakeMediaTool::with_source_seconds(185)), "mp4");
    let clips = segmenter.split(&source, &clips_dir, 60).await.unwrap();

    let names: Vec<String> = clips
        .iter()
        .map(|clip| clip.path.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["clip_000.mp4", "clip_001.mp4", "clip_002.mp4", "clip_003.mp4"]);
    assert_eq!(clips.iter().map(|c| c.index).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert!(!clips_dir.join("old_run").exists());
    assert!(!clips_dir.join("clip_009.mp4").exists());
}

#[tokio::test]
async fn test_split_missing_source_is_input_not_found() {
    let temp = TempDir::new().unwrap();
    let segmenter = SegmentInteractor::new(Arc::new(FakeMediaTool::with_source_seconds(60)), "mp4");
    let err = segmenter
        .split(&temp.path().join("missing.mp4"), &temp.path().join("clips"), 60)
        .await
        .unwrap_err();
    assert!(matches!(err, MovieError::InputNotFound { .. }));
    assert!(!temp.path().join("clips").exists());
}

#[tokio::test]
async fn test_failed_clip_is_dropped_and_context_skips_it() {
    let temp = TempDir::new().unwrap();
    let clips = clips_in(
        temp.path(),
        &["clip_000.mp4", "clip_001.mp4", "clip_002.mp4", "clip_003.mp4"],
    );
    let generative = Arc::new(FakeGenerative {
        fail_description_for: HashSet::from(["clip_002.mp4".to_string()]),
        ..Default::default()
    });

    let outcome = describer(FakeSampler::default(), Arc::clone(&generative))
        .describe_all(&clips, "Follow the detective.", 10, "gpt-4o-mini")
        .await;

    let described: Vec<usize> = outcome.descriptions().iter().map(|d| d.clip.index).collect();
    assert_eq!(described, vec![0, 1, 3]);

    let first = generative.instructions_for("clip_000.mp4").unwrap();
    assert!(first.contains(FIRST_CLIP_CONTEXT));
    let last = generative.instructions_for("clip_003.mp4").unwrap();
    assert!(last.ends_with("Scene from clip_001.mp4"));
    assert!(!last.contains(FIRST_CLIP_CONTEXT));
}

#[tokio::test]
async fn test_sampling_failure_is_a_skip() {
    let temp = TempDir::new().unwrap();
    let clips = clips_in(temp.path(), &["clip_000.mp4", "clip_001.mp4"]);
    let generative = Arc::new(FakeGenerative::default());
    let sampler = FakeSampler {
        fail_for: HashSet::from(["clip_000.mp4".to_string()]),
    };

    let outcome = describer(sampler, Arc::clone(&generative))
        .describe_all(&clips, "", 10, "gpt-4o-mini")
        .await;
    assert_eq!(outcome.descriptions().len(), 1);
    // Nothing succeeded before clip 1, so it still gets the first-clip context
    let instructions = generative.instructions_for("clip_001.mp4").unwrap();
    assert!(instructions.contains(FIRST_CLIP_CONTEXT));
}

#[tokio::test]
async fn test_describe_sentinels() {
    let temp = TempDir::new().unwrap();
    let generative = Arc::new(FakeGenerative {
        fail_description_for: HashSet::from(["clip_000.mp4".to_string(), "clip_001.mp4".to_string()]),
        ..Default::default()
    });
    let interactor = describer(FakeSampler::default(), generative);

    assert_eq!(
        interactor.describe_all(&[], "", 10, "gpt-4o-mini").await,
        DescribeOutcome::NoInput
    );

    let clips = clips_in(temp.path(), &["clip_000.mp4", "clip_001.mp4"]);
    assert_eq!(
        interactor.describe_all(&clips, "", 10, "gpt-4o-mini").await,
        DescribeOutcome::AllFailed { attempted: 2 }
    );
}

#[tokio::test]
async fn test_plan_returns_subset_in_model_order() {
    let temp = TempDir::new().unwrap();
    let clips = clips_in(temp.path(), &["clip_000.mp4", "clip_001.mp4", "clip_003.mp4"]);
    let descriptions: Vec<ClipDescription> = clips
        .iter()
        .map(|clip| ClipDescription::new(clip.clone(), "scene"))
        .collect();
    let generative = Arc::new(FakeGenerative::with_script(script_json(&[
        (clips[2].path.clone(), "Finally, the escape."),
        (clips[0].path.clone(), "It began at the harbour."),
    ])));

    let script = ScriptInteractor::new(Arc::clone(&generative) as Arc<dyn GenerativePort>)
        .plan(&descriptions, "Tell the story backwards.", "gpt-4o-mini")
        .await
        .unwrap();

    assert_eq!(script.len(), 2);
    assert_eq!(script[0].clip_path, clips[2].path);
    assert_eq!(script[1].clip_path, clips[0].path);

    let context = generative.planner_contexts.lock().unwrap()[0].clone();
    let records: serde_json::Value = serde_json::from_str(&context).unwrap();
    assert_eq!(records.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_plan_without_script_field_is_script_format_error() {
    let generative = Arc::new(FakeGenerative::with_script(r#"{"clips": []}"#));
    let err = ScriptInteractor::new(generative)
        .plan(&[], "Summarize.", "gpt-4o-mini")
        .await
        .unwrap_err();
    assert!(matches!(err, MovieError::ScriptFormat { .. }));
}

#[tokio::test]
async fn test_narration_continues_after_failed_entry() {
    let temp = TempDir::new().unwrap();
    let clips = clips_in(temp.path(), &["clip_000.mp4", "clip_001.mp4"]);
    let generative = Arc::new(FakeGenerative {
        fail_speech_for: HashSet::from(["Broken line.".to_string()]),
        ..Default::default()
    });
    let audio_dir = temp.path().join("audio");
    let entries = vec![
        ScriptEntry::new(&clips[0].path, "Broken line."),
        ScriptEntry::new(&clips[1].path, "A fine line."),
    ];

    let report = NarrationInteractor::new(generative, "mp3", 1.0)
        .synthesize_all(&entries, Voice::Onyx, Some(&audio_dir))
        .await
        .unwrap();

    assert_eq!(report.succeeded(), 1);
    assert!(report.narrated[0].audio_path.is_none());
    assert_eq!(
        report.narrated[1].audio_path.as_deref(),
        Some(audio_dir.join("clip_001.mp3").as_path())
    );
    assert_eq!(std::fs::read(audio_dir.join("clip_001.mp3")).unwrap(), b"A fine line.");
}

#[tokio::test]
async fn test_subset_script_produces_two_audio_files_and_ordered_manifest() {
    let temp = TempDir::new().unwrap();
    let clips = clips_in(temp.path(), &["clip_000.mp4", "clip_001.mp4", "clip_003.mp4"]);
    let entries = vec![
        ScriptEntry::new(&clips[0].path, "It began at the harbour."),
        ScriptEntry::new(&clips[2].path, "Finally, the escape."),
    ];

    let report = NarrationInteractor::new(Arc::new(FakeGenerative::default()), "mp3", 1.0)
        .synthesize_all(&entries, Voice::Nova, None)
        .await
        .unwrap();
    assert_eq!(report.succeeded(), 2);
    let audio_files: Vec<PathBuf> = std::fs::read_dir(temp.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "mp3"))
        .collect();
    assert_eq!(audio_files.len(), 2);

    let media_tool = Arc::new(FakeMediaTool::default());
    let output = temp.path().join("out/summary.mp4");
    let assembly = assembler(Arc::clone(&media_tool))
        .assemble(&entries, &output)
        .await
        .unwrap();

    assert_eq!(assembly.processed, 2);
    assert!(output.exists());
    let remuxed: Vec<PathBuf> = media_tool
        .remuxed
        .lock()
        .unwrap()
        .iter()
        .map(|request| request.video.clone())
        .collect();
    assert!(remuxed[0].ends_with("clip_000.mp4"));
    assert!(remuxed[1].ends_with("clip_003.mp4"));

    let manifest = media_tool.manifests.lock().unwrap()[0].clone();
    let lines: Vec<&str> = manifest.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("file '") && lines[0].ends_with("processed_clip_000.mp4'"));
    assert!(lines[1].ends_with("processed_clip_001.mp4'"));
}

#[tokio::test]
async fn test_manifest_keeps_survivor_order_when_entries_fail() {
    let temp = TempDir::new().unwrap();
    let clips = clips_in(
        temp.path(),
        &["clip_000.mp4", "clip_001.mp4", "clip_002.mp4", "clip_003.mp4"],
    );
    // clip_001 has no audio, clip_002 fails to remux
    for clip in [&clips[0], &clips[2], &clips[3]] {
        std::fs::write(clip.path.with_extension("mp3"), b"audio").unwrap();
    }
    let entries: Vec<ScriptEntry> = [3, 1, 2, 0]
        .iter()
        .map(|&i| ScriptEntry::new(&clips[i].path, "narration"))
        .collect();
    let media_tool = Arc::new(FakeMediaTool {
        fail_remux_for: HashSet::from(["clip_002.mp4".to_string()]),
        ..Default::default()
    });

    let report = assembler(Arc::clone(&media_tool))
        .assemble(&entries, &temp.path().join("summary.mp4"))
        .await
        .unwrap();

    assert_eq!(report.processed, 2);
    let skipped: Vec<usize> = report.skipped.iter().map(|s| s.position).collect();
    assert_eq!(skipped, vec![1, 2]);
    assert!(report.skipped[1].reason.contains("Invalid data found"));

    let manifest = media_tool.manifests.lock().unwrap()[0].clone();
    let lines: Vec<&str> = manifest.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("processed_clip_000.mp4'"));
    assert!(lines[1].ends_with("processed_clip_003.mp4'"));
}

#[tokio::test]
async fn test_assemble_with_nothing_processable_leaves_output_unwritten() {
    let temp = TempDir::new().unwrap();
    let clips = clips_in(temp.path(), &["clip_000.mp4"]);
    let entries = vec![
        ScriptEntry::new(&clips[0].path, "No audio was made for this."),
        ScriptEntry::new(temp.path().join("clip_404.mp4"), "Invented clip."),
    ];
    let media_tool = Arc::new(FakeMediaTool::default());
    let output = temp.path().join("summary.mp4");

    let err = assembler(Arc::clone(&media_tool))
        .assemble(&entries, &output)
        .await
        .unwrap_err();

    assert!(matches!(err, MovieError::Assembly { .. }));
    assert!(!output.exists());
    assert_eq!(media_tool.concat_calls(), 0);
}

#[tokio::test]
async fn test_successful_assembly_removes_intermediate_files() {
    let temp = TempDir::new().unwrap();
    let clips = clips_in(temp.path(), &["clip_000.mp4", "clip_001.mp4"]);
    for clip in &clips {
        std::fs::write(clip.path.with_extension("mp3"), b"audio").unwrap();
    }
    let entries: Vec<ScriptEntry> = clips
        .iter()
        .map(|clip| ScriptEntry::new(&clip.path, "narration"))
        .collect();

    let report = assembler(Arc::new(FakeMediaTool::default()))
        .assemble(&entries, &temp.path().join("summary.mp4"))
        .await
        .unwrap();

    assert!(report.cleanup_failures.is_empty());
    for clip in &clips {
        assert!(!clip.path.with_extension("mp3").exists());
        // Source clips are not narration artifacts
        assert!(clip.path.exists());
    }
    assert!(!temp.path().join("processed_clip_000.mp4").exists());
    assert!(!temp.path().join("processed_clip_001.mp4").exists());
}

#[tokio::test]
async fn test_clip_scripted_twice_is_cleaned_up_once() {
    let temp = TempDir::new().unwrap();
    let clips = clips_in(temp.path(), &["clip_000.mp4"]);
    let audio = clips[0].path.with_extension("mp3");
    std::fs::write(&audio, b"audio").unwrap();
    let entries = vec![
        ScriptEntry::new(&clips[0].path, "First mention."),
        ScriptEntry::new(&clips[0].path, "Second mention."),
    ];
    let media_tool = Arc::new(FakeMediaTool::default());

    let report = assembler(Arc::clone(&media_tool))
        .assemble(&entries, &temp.path().join("summary.mp4"))
        .await
        .unwrap();

    assert_eq!(report.processed, 2);
    assert_eq!(media_tool.manifests.lock().unwrap()[0].lines().count(), 2);
    assert!(report.cleanup_failures.is_empty());
    assert!(!audio.exists());
    assert!(!temp.path().join("processed_clip_000.mp4").exists());
    assert!(!temp.path().join("processed_clip_001.mp4").exists());
}

#[tokio::test]
async fn test_failed_concat_keeps_intermediate_files() {
    let temp = TempDir::new().unwrap();
    let clips = clips_in(temp.path(), &["clip_000.mp4"]);
    std::fs::write(clips[0].path.with_extension("mp3"), b"audio").unwrap();
    let entries = vec![ScriptEntry::new(&clips[0].path, "narration")];
    let media_tool = Arc::new(FakeMediaTool {
        fail_concat: true,
        ..Default::default()
    });

    let err = assembler(media_tool)
        .assemble(&entries, &temp.path().join("summary.mp4"))
        .await
        .unwrap_err();

    assert!(matches!(err, MovieError::Assembly { .. }));
    assert_eq!(err.tool_stderr(), Some("Non-monotonous DTS"));
    assert!(clips[0].path.with_extension("mp3").exists());
    assert!(temp.path().join("processed_clip_000.mp4").exists());
    assert!(!temp.path().join("summary.mp4").exists());
}

#[tokio::test]
async fn test_full_pipeline_drops_unknown_clip_paths() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("film.mp4");
    std::fs::write(&source, b"source").unwrap();
    let clips_dir = temp.path().join("clips");
    let artifacts_dir = temp.path().join("artifacts");

    let generative = Arc::new(FakeGenerative {
        fail_description_for: HashSet::from(["clip_002.mp4".to_string()]),
        script_response: Mutex::new(script_json(&[
            (clips_dir.join("clip_000.mp4"), "It began at the harbour."),
            (clips_dir.join("clip_002.mp4"), "This clip was never described."),
            (clips_dir.join("clip_003.mp4"), "Finally, the escape."),
        ])),
        ..Default::default()
    });
    let media_tool = Arc::new(FakeMediaTool::with_source_seconds(185));
    let container = DefaultAppContainer::with_ports(
        PipelineConfig::default(),
        Arc::clone(&media_tool) as Arc<dyn MediaToolPort>,
        Arc::new(FakeSampler::default()),
        Arc::clone(&generative) as Arc<dyn GenerativePort>,
    );

    let report = container
        .movie_avi()
        .unwrap()
        .summarize(&SummaryRequest {
            source,
            clips_dir: clips_dir.clone(),
            output: temp.path().join("summary.mp4"),
            description_guidance: String::new(),
            script_guidance: "Tell the story.".to_string(),
            artifacts_dir: Some(artifacts_dir.clone()),
        })
        .await
        .unwrap();

    assert_eq!(report.clips, 4);
    assert_eq!(report.described, 3);
    assert_eq!(report.scripted, 3);
    assert_eq!(report.unknown_paths_dropped, 1);
    assert_eq!(report.narrated, 2);
    assert_eq!(report.assembly.processed, 2);
    assert!(temp.path().join("summary.mp4").exists());
    assert!(artifacts_dir.join("descriptions.json").exists());

    let saved: Vec<ScriptEntry> =
        artifacts::load_artifact(&artifacts_dir.join("script.json")).unwrap();
    assert_eq!(saved.len(), 2);
}

#[tokio::test]
async fn test_full_pipeline_fails_when_every_description_fails() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("film.mp4");
    std::fs::write(&source, b"source").unwrap();
    let container = DefaultAppContainer::with_ports(
        PipelineConfig::default(),
        Arc::new(FakeMediaTool::with_source_seconds(30)),
        Arc::new(FakeSampler {
            fail_for: HashSet::from(["clip_000.mp4".to_string()]),
        }),
        Arc::new(FakeGenerative::default()),
    );

    let err = container
        .movie_avi()
        .unwrap()
        .summarize(&SummaryRequest {
            source,
            clips_dir: temp.path().join("clips"),
            output: temp.path().join("summary.mp4"),
            description_guidance: String::new(),
            script_guidance: "Tell the story.".to_string(),
            artifacts_dir: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, MovieError::ServiceCall { .. }));
    assert!(err.to_string().contains("all 1 clips failed"));
}
