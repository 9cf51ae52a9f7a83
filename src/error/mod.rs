//! Error handling module for MovieAvi

use thiserror::Error;

/// Main error type for MovieAvi operations
#[derive(Error, Debug)]
pub enum MovieError {
    /// Input file not found or inaccessible
    #[error("Input file not found: {path}")]
    InputNotFound { path: String },

    /// Media tool executable could not be located
    #[error("Media tool not found at '{path}'. Please ensure FFmpeg is installed and available in PATH")]
    MediaToolNotFound { path: String },

    /// Media tool exited with a non-zero status, failed to spawn, or timed out
    #[error("Media tool {operation} failed: {message}")]
    MediaTool {
        operation: String,
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    /// Remote generative or agent service failure
    #[error("{service} call failed: {message}")]
    ServiceCall { service: String, message: String },

    /// Narration script response could not be parsed
    #[error("Invalid narration script: {message}")]
    ScriptFormat { message: String },

    /// Final movie could not be assembled
    #[error("Assembly failed: {message}")]
    Assembly {
        message: String,
        stderr: Option<String>,
    },

    /// Frame extraction error
    #[error("Failed to sample frames from {path}: {message}")]
    FrameSampling { path: String, message: String },

    /// Document could not be read as text
    #[error("Failed to read document {path}: {message}")]
    Document { path: String, message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MovieError {
    /// Build a service call error
    pub fn service(service: impl Into<String>, message: impl ToString) -> Self {
        Self::ServiceCall {
            service: service.into(),
            message: message.to_string(),
        }
    }

    /// Build a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Build a script format error
    pub fn script_format(message: impl Into<String>) -> Self {
        Self::ScriptFormat {
            message: message.into(),
        }
    }

    /// Diagnostic output captured from the media tool, if any
    pub fn tool_stderr(&self) -> Option<&str> {
        match self {
            Self::MediaTool { stderr, .. } | Self::Assembly { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }
}

impl From<async_openai::error::OpenAIError> for MovieError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        Self::service("OpenAI", err)
    }
}

impl From<reqwest::Error> for MovieError {
    fn from(err: reqwest::Error) -> Self {
        Self::service("ElevenLabs", err)
    }
}

/// Result type alias for MovieAvi operations
pub type MovieResult<T> = std::result::Result<T, MovieError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_stderr_is_exposed() {
        let err = MovieError::MediaTool {
            operation: "concat".to_string(),
            message: "exit status 1".to_string(),
            stderr: Some("Invalid data found".to_string()),
            exit_code: Some(1),
        };
        assert_eq!(err.tool_stderr(), Some("Invalid data found"));
        assert!(err.to_string().contains("concat"));

        let err = MovieError::script_format("missing script");
        assert_eq!(err.tool_stderr(), None);
    }
}
