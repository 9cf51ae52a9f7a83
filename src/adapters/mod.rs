// Adapters - External system implementations

pub mod documents;
pub mod elevenlabs;
pub mod exec_ffmpeg;
pub mod frames_libav;
pub mod openai;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use elevenlabs::ElevenLabsClient;
pub use exec_ffmpeg::FfmpegAdapter;
pub use frames_libav::LibavFrameSampler;
pub use openai::OpenAiServices;
pub use toml_config::TomlConfigAdapter;
