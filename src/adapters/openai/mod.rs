//! OpenAI services adapter
//!
//! Implements [`GenerativePort`] over `async-openai` and exposes the remaining single-call
//! capabilities (text, chat, image generation, image description, transcription, embeddings).

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestMessageContentPartImageArgs,
    ChatCompletionRequestMessageContentPartTextArgs, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
    ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs,
    CreateEmbeddingRequestArgs, CreateImageRequestArgs, CreateSpeechRequestArgs,
    CreateTranscriptionRequestArgs, Image, ImageModel, ImageQuality, ImageResponseFormat,
    ImageSize, ImageUrlArgs, ResponseFormat, SpeechModel,
};
use async_openai::Client;
use async_trait::async_trait;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::model::{EncodedFrame, Voice};
use crate::domain::rules::with_schema_hint;
use crate::error::{MovieError, MovieResult};
use crate::ports::{FrameSamplerPort, GenerativePort};
use crate::utils::text::single_line;

const SERVICE: &str = "OpenAI";
const DEFAULT_INSTRUCTIONS: &str = "You are helpful AI named Jarvis";

/// Frames sampled when describing a whole video
pub const VIDEO_DESCRIPTION_FRAMES: usize = 15;

/// Failed requests are reported, never retried
fn no_retry() -> ExponentialBackoff {
    ExponentialBackoffBuilder::new()
        .with_max_elapsed_time(Some(Duration::ZERO))
        .build()
}

/// Requested shape of a text completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputType {
    #[default]
    Text,
    JsonObject,
}

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of a conversation kept by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Caller-owned conversation history
pub type ChatHistory = Vec<ChatMessage>;

/// Generated image reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub url: String,
    pub revised_prompt: Option<String>,
}

/// OpenAI-backed generative services
pub struct OpenAiServices {
    client: Client<OpenAIConfig>,
    speech_model: String,
    chat_timeout: Duration,
    speech_timeout: Duration,
}

impl OpenAiServices {
    /// Create a client; without an explicit key `OPENAI_API_KEY` is used
    pub fn new(api_key: Option<String>) -> Self {
        let config = match api_key {
            Some(key) => OpenAIConfig::new().with_api_key(key),
            None => OpenAIConfig::new(),
        };
        Self::with_config(config)
    }

    /// Create a client from an explicit configuration (custom base URL, organisation)
    pub fn with_config(config: OpenAIConfig) -> Self {
        Self {
            client: Client::with_config(config).with_backoff(no_retry()),
            speech_model: "tts-1".to_string(),
            chat_timeout: Duration::from_secs(300),
            speech_timeout: Duration::from_secs(120),
        }
    }

    /// Set the text-to-speech model
    pub fn with_speech_model(mut self, model: impl Into<String>) -> Self {
        self.speech_model = model.into();
        self
    }

    /// Set request timeouts
    pub fn with_timeouts(mut self, chat: Duration, speech: Duration) -> Self {
        self.chat_timeout = chat;
        self.speech_timeout = speech;
        self
    }

    async fn bounded<T, F>(&self, limit: Duration, call: F) -> MovieResult<T>
    where
        F: Future<Output = Result<T, OpenAIError>>,
    {
        match tokio::time::timeout(limit, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(MovieError::service(
                SERVICE,
                format!("request timed out after {} seconds", limit.as_secs()),
            )),
        }
    }

    async fn complete(
        &self,
        model: &str,
        messages: Vec<ChatCompletionRequestMessage>,
        output_type: OutputType,
        max_tokens: Option<u32>,
    ) -> MovieResult<String> {
        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(model).messages(messages);
        if output_type == OutputType::JsonObject {
            request.response_format(ResponseFormat::JsonObject);
        }
        if let Some(max_tokens) = max_tokens {
            request.max_tokens(max_tokens);
        }
        let request = request.build()?;

        let response = self
            .bounded(self.chat_timeout, self.client.chat().create(request))
            .await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| MovieError::service(SERVICE, "No content in response from OpenAI"))
    }

    /// Text completion with system instructions
    pub async fn generate_text(
        &self,
        prompt: &str,
        instructions: Option<&str>,
        model: &str,
        output_type: OutputType,
    ) -> MovieResult<String> {
        let messages = vec![
            system_message(instructions.unwrap_or(DEFAULT_INSTRUCTIONS))?,
            user_message(prompt)?,
        ];
        self.complete(model, messages, output_type, None).await
    }

    /// Chat reply; the user message and the reply are appended to `history`
    pub async fn generate_chat_response(
        &self,
        history: &mut ChatHistory,
        user_message_text: &str,
        instructions: &str,
        model: &str,
    ) -> MovieResult<String> {
        history.push(ChatMessage {
            role: ChatRole::User,
            content: user_message_text.to_string(),
        });

        let mut messages = vec![system_message(instructions)?];
        for message in history.iter() {
            messages.push(match message.role {
                ChatRole::User => user_message(&message.content)?,
                ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
                    .content(message.content.as_str())
                    .build()?
                    .into(),
            });
        }

        let reply = self.complete(model, messages, OutputType::Text, None).await?;
        history.push(ChatMessage {
            role: ChatRole::Assistant,
            content: reply.clone(),
        });
        Ok(reply)
    }

    /// Generate one 1024x1024 image
    pub async fn generate_image(&self, prompt: &str, model: &str) -> MovieResult<GeneratedImage> {
        let request = CreateImageRequestArgs::default()
            .prompt(prompt)
            .model(image_model(model))
            .n(1)
            .size(ImageSize::S1024x1024)
            .quality(ImageQuality::Standard)
            .response_format(ImageResponseFormat::Url)
            .build()?;

        let response = self
            .bounded(self.chat_timeout, self.client.images().create(request))
            .await?;
        let image = response
            .data
            .first()
            .ok_or_else(|| MovieError::service(SERVICE, "No image in response from OpenAI"))?;
        match image.as_ref() {
            Image::Url {
                url,
                revised_prompt,
            } => Ok(GeneratedImage {
                url: url.clone(),
                revised_prompt: revised_prompt.clone(),
            }),
            Image::B64Json { .. } => Err(MovieError::service(
                SERVICE,
                "Expected an image URL but received inline data",
            )),
        }
    }

    /// Describe local images with a vision model
    pub async fn generate_image_description(
        &self,
        image_paths: &[&Path],
        instructions: &str,
        model: &str,
    ) -> MovieResult<String> {
        let mut frames = Vec::with_capacity(image_paths.len());
        for path in image_paths {
            let bytes = tokio::fs::read(path).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    MovieError::InputNotFound {
                        path: path.display().to_string(),
                    }
                } else {
                    MovieError::Io(e)
                }
            })?;
            frames.push(EncodedFrame::from_base64_jpeg(&BASE64_STANDARD.encode(bytes)));
        }
        self.describe_visual_segment(instructions, &frames, model, 1000)
            .await
    }

    /// Describe a whole video from up to `max_frames` frames spread across it
    pub async fn generate_video_description(
        &self,
        sampler: &dyn FrameSamplerPort,
        video: &Path,
        instructions: &str,
        model: &str,
        max_frames: usize,
    ) -> MovieResult<String> {
        if !video.is_file() {
            return Err(MovieError::InputNotFound {
                path: video.display().to_string(),
            });
        }
        let frames = sampler.sample_frames(video, max_frames).await?;
        info!("Describing {} from {} frames", video.display(), frames.len());
        self.describe_visual_segment(instructions, &frames, model, 1000)
            .await
    }

    /// Transcribe an audio file
    pub async fn recognize_speech(&self, audio_path: &Path) -> MovieResult<String> {
        if !audio_path.exists() {
            return Err(MovieError::InputNotFound {
                path: audio_path.display().to_string(),
            });
        }
        let request = CreateTranscriptionRequestArgs::default()
            .file(audio_path)
            .model("whisper-1")
            .build()?;
        let response = self
            .bounded(self.speech_timeout, self.client.audio().transcribe(request))
            .await?;
        Ok(response.text)
    }

    /// Embedding vector for `text`; newlines are flattened first
    pub async fn get_embedding(&self, text: &str, model: &str) -> MovieResult<Vec<f32>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(model)
            .input(single_line(text))
            .build()?;
        let response = self
            .bounded(self.chat_timeout, self.client.embeddings().create(request))
            .await?;
        response
            .data
            .into_iter()
            .next()
            .map(|embedding| embedding.embedding)
            .ok_or_else(|| MovieError::service(SERVICE, "No embedding in response from OpenAI"))
    }
}

#[async_trait]
impl GenerativePort for OpenAiServices {
    async fn describe_visual_segment(
        &self,
        instructions: &str,
        frames: &[EncodedFrame],
        model: &str,
        max_tokens: u32,
    ) -> MovieResult<String> {
        debug!("Requesting description from {} with {} frames", model, frames.len());
        let parts = [
            vec![ChatCompletionRequestUserMessageContentPart::Text(
                ChatCompletionRequestMessageContentPartTextArgs::default()
                    .text(instructions)
                    .build()?,
            )],
            frames
                .iter()
                .map(|frame| -> Result<_, OpenAIError> {
                    Ok(ChatCompletionRequestUserMessageContentPart::ImageUrl(
                        ChatCompletionRequestMessageContentPartImageArgs::default()
                            .image_url(ImageUrlArgs::default().url(frame.as_data_url()).build()?)
                            .build()?,
                    ))
                })
                .collect::<Result<_, _>>()?,
        ]
        .concat();

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(parts))
            .build()?
            .into();
        self.complete(model, vec![message], OutputType::Text, Some(max_tokens))
            .await
    }

    async fn structured_complete(
        &self,
        prompt: &str,
        context: &str,
        schema_hint: &str,
        model: &str,
    ) -> MovieResult<String> {
        info!("Requesting structured completion from {}", model);
        let messages = vec![
            system_message(context)?,
            user_message(&with_schema_hint(prompt, schema_hint))?,
        ];
        self.complete(model, messages, OutputType::JsonObject, None)
            .await
    }

    async fn synthesize_speech(&self, text: &str, voice: Voice, speed: f32) -> MovieResult<Vec<u8>> {
        let request = CreateSpeechRequestArgs::default()
            .input(text)
            .voice(openai_voice(voice))
            .model(speech_model(&self.speech_model))
            .speed(speed)
            .build()?;
        let response = self
            .bounded(self.speech_timeout, self.client.audio().speech(request))
            .await?;
        Ok(response.bytes.to_vec())
    }
}

fn system_message(content: &str) -> Result<ChatCompletionRequestMessage, OpenAIError> {
    Ok(ChatCompletionRequestSystemMessageArgs::default()
        .content(content)
        .build()?
        .into())
}

fn user_message(content: &str) -> Result<ChatCompletionRequestMessage, OpenAIError> {
    Ok(ChatCompletionRequestUserMessageArgs::default()
        .content(content)
        .build()?
        .into())
}

fn openai_voice(voice: Voice) -> async_openai::types::Voice {
    use async_openai::types::Voice as OpenAiVoice;
    match voice {
        Voice::Nova => OpenAiVoice::Nova,
        Voice::Alloy => OpenAiVoice::Alloy,
        Voice::Echo => OpenAiVoice::Echo,
        Voice::Fable => OpenAiVoice::Fable,
        Voice::Onyx => OpenAiVoice::Onyx,
        Voice::Shimmer => OpenAiVoice::Shimmer,
    }
}

fn speech_model(name: &str) -> SpeechModel {
    match name {
        "tts-1" => SpeechModel::Tts1,
        "tts-1-hd" => SpeechModel::Tts1Hd,
        other => SpeechModel::Other(other.to_string()),
    }
}

fn image_model(name: &str) -> ImageModel {
    match name {
        "dall-e-2" => ImageModel::DallE2,
        "dall-e-3" => ImageModel::DallE3,
        other => ImageModel::Other(other.to_string()),
    }
}
