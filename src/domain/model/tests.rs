// Unit tests for domain models

#[cfg(test)]
mod tests {
    use crate::domain::model::*;
    use crate::error::MovieError;
    use std::path::PathBuf;

    #[test]
    fn test_voice_parse_is_case_insensitive() {
        assert_eq!("Nova".parse::<Voice>().unwrap(), Voice::Nova);
        assert_eq!(" shimmer ".parse::<Voice>().unwrap(), Voice::Shimmer);
        assert_eq!("ONYX".parse::<Voice>().unwrap(), Voice::Onyx);
    }

    #[test]
    fn test_voice_parse_invalid() {
        let err = "robot".parse::<Voice>().unwrap_err();
        assert!(err.to_string().contains("robot"));
    }

    #[test]
    fn test_voice_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Voice::Fable).unwrap();
        assert_eq!(json, "\"fable\"");
        let voice: Voice = serde_json::from_str("\"echo\"").unwrap();
        assert_eq!(voice, Voice::Echo);
    }

    #[test]
    fn test_describe_outcome_sentinels_are_distinct() {
        assert_ne!(
            DescribeOutcome::NoInput,
            DescribeOutcome::AllFailed { attempted: 0 }
        );
        assert!(DescribeOutcome::AllFailed { attempted: 3 }
            .descriptions()
            .is_empty());

        let described = DescribeOutcome::Described(vec![ClipDescription::new(
            Clip::new("clips/clip_000.mp4", 0),
            "a harbour at dawn",
        )]);
        assert_eq!(described.descriptions().len(), 1);
        assert_eq!(
            described.descriptions()[0].clip_path(),
            PathBuf::from("clips/clip_000.mp4").as_path()
        );
    }

    #[test]
    fn test_narration_report_counts() {
        let report = NarrationReport {
            narrated: vec![
                NarratedClip {
                    clip_path: PathBuf::from("clip_000.mp4"),
                    narration_text: "It begins.".to_string(),
                    audio_path: Some(PathBuf::from("clip_000.mp3")),
                },
                NarratedClip {
                    clip_path: PathBuf::from("clip_003.mp4"),
                    narration_text: "It ends.".to_string(),
                    audio_path: None,
                },
            ],
        };
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.failed(), 1);
        assert!(report.any_succeeded());
        assert!(!NarrationReport::default().any_succeeded());
    }

    #[test]
    fn test_segment_request_output_pattern() {
        let request = SegmentRequest {
            source: PathBuf::from("movie.mp4"),
            output_dir: PathBuf::from("clips"),
            segment_seconds: 60,
            clip_extension: "mp4".to_string(),
        };
        assert_eq!(
            request.output_pattern(),
            PathBuf::from("clips").join("clip_%03d.mp4")
        );
    }

    #[test]
    fn test_encoded_frame_data_url() {
        let frame = EncodedFrame::from_base64_jpeg("AAAA");
        assert_eq!(frame.as_data_url(), "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn test_remux_settings_defaults() {
        let settings = RemuxSettings::default();
        assert_eq!(settings.preset, "ultrafast");
        assert_eq!(settings.audio_bitrate, "192k");
        assert_eq!(settings.freeze_pad_secs, 5);
    }

    #[test]
    fn test_pipeline_config_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert_eq!(config.segment_seconds, 60);
        assert_eq!(config.max_frames_per_clip, 10);
        assert_eq!(config.voice, Voice::Nova);
        config.validate().unwrap();
    }

    #[test]
    fn test_pipeline_config_validation() {
        let mut config = PipelineConfig::default();
        config.speech_speed = 4.5;
        assert!(matches!(config.validate(), Err(MovieError::Config { .. })));

        let mut config = PipelineConfig::default();
        config.segment_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.audio_extension = "mp4".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_script_entry_deserializes_from_model_output() {
        let entry: ScriptEntry = serde_json::from_str(
            r#"{"clip_path": "clips/clip_003.mp4", "narration": "The storm breaks."}"#,
        )
        .unwrap();
        assert_eq!(entry.clip_path, PathBuf::from("clips/clip_003.mp4"));
        assert_eq!(entry.narration, "The storm breaks.");
    }
}
