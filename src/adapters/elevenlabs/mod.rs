//! ElevenLabs conversational-agent client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::error::{MovieError, MovieResult};

const SERVICE: &str = "ElevenLabs";
const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io/v1/convai";
const PAGE_PAUSE: Duration = Duration::from_millis(100);

/// Configuration for the ElevenLabs client.
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    /// Agents hidden from `get_agents`
    pub protected_agent_ids: Vec<String>,
}

impl ElevenLabsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            protected_agent_ids: Vec::new(),
        }
    }

    /// Read the key from `ELEVENLABS_API_KEY`.
    pub fn from_env() -> MovieResult<Self> {
        let key = std::env::var("ELEVENLABS_API_KEY")
            .map_err(|_| MovieError::config("ELEVENLABS_API_KEY is not set"))?;
        Ok(Self::new(key))
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub agent_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct AgentList {
    agents: Vec<AgentSummary>,
}

/// Agent with its raw conversation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Agent {
    pub agent_id: String,
    pub name: String,
    #[serde(default)]
    pub conversation_config: Value,
}

impl Agent {
    pub fn first_message(&self) -> Option<&str> {
        self.conversation_config
            .pointer("/agent/first_message")
            .and_then(Value::as_str)
    }

    pub fn prompt(&self) -> Option<&str> {
        self.conversation_config
            .pointer("/agent/prompt/prompt")
            .and_then(Value::as_str)
    }

    pub fn max_duration_seconds(&self) -> Option<u64> {
        self.conversation_config
            .pointer("/conversation/max_duration_seconds")
            .and_then(Value::as_u64)
    }
}

/// Partial agent update; only the fields that are set are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentUpdate {
    pub agent_id: Option<String>,
    pub name: Option<String>,
    pub first_message: Option<String>,
    pub prompt: Option<String>,
    pub llm: Option<String>,
    pub max_duration_seconds: Option<u64>,
}

impl AgentUpdate {
    /// PATCH body holding only the present fields
    pub fn payload(&self) -> Value {
        let mut payload = Map::new();
        if let Some(name) = &self.name {
            payload.insert("name".into(), json!(name));
        }

        let mut agent = Map::new();
        if let Some(first_message) = &self.first_message {
            agent.insert("first_message".into(), json!(first_message));
        }
        let mut prompt = Map::new();
        if let Some(text) = &self.prompt {
            prompt.insert("prompt".into(), json!(text));
        }
        if let Some(llm) = &self.llm {
            prompt.insert("llm".into(), json!(llm));
        }
        if !prompt.is_empty() {
            agent.insert("prompt".into(), Value::Object(prompt));
        }

        let mut conversation_config = Map::new();
        if !agent.is_empty() {
            conversation_config.insert("agent".into(), Value::Object(agent));
        }
        if let Some(max_duration) = self.max_duration_seconds {
            conversation_config.insert(
                "conversation".into(),
                json!({ "max_duration_seconds": max_duration }),
            );
        }
        if !conversation_config.is_empty() {
            payload.insert(
                "conversation_config".into(),
                Value::Object(conversation_config),
            );
        }
        Value::Object(payload)
    }
}

/// Conversation list item.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationSummary {
    pub conversation_id: String,
    #[serde(default)]
    pub start_time_unix_secs: i64,
    #[serde(default)]
    pub call_duration_secs: u64,
}

#[derive(Debug, Deserialize)]
struct ConversationPage {
    conversations: Vec<ConversationSummary>,
    #[serde(default)]
    has_more: bool,
    next_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptMessage {
    pub role: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationMetadata {
    #[serde(default)]
    pub start_time_unix_secs: i64,
    #[serde(default)]
    pub call_duration_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConversationAnalysis {
    #[serde(default)]
    pub data_collection_results: Map<String, Value>,
    pub transcript_summary: Option<String>,
}

impl ConversationAnalysis {
    /// Value collected for a data-collection field such as `SPEAKER`
    pub fn collected(&self, field: &str) -> Option<String> {
        let value = self.data_collection_results.get(field)?.get("value")?;
        match value {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Full conversation with transcript.
#[derive(Debug, Clone, Deserialize)]
pub struct Conversation {
    pub conversation_id: String,
    #[serde(default)]
    pub transcript: Vec<TranscriptMessage>,
    #[serde(default)]
    pub metadata: ConversationMetadata,
    #[serde(default)]
    pub analysis: ConversationAnalysis,
}

/// Client for the ElevenLabs Conversational AI API.
pub struct ElevenLabsClient {
    http: Client,
    config: ElevenLabsConfig,
}

impl ElevenLabsClient {
    pub fn new(config: ElevenLabsConfig) -> MovieResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> MovieResult<T> {
        let url = format!("{}{}", self.config.base_url, path);
        debug!("GET {}", url);
        let response = self
            .http
            .get(&url)
            .header("xi-api-key", &self.config.api_key)
            .query(query)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MovieError::service(
                SERVICE,
                format!("{} returned {}: {}", path, status, body),
            ));
        }
        Ok(response.json().await?)
    }

    /// Agents available to this key, minus the protected ones
    pub async fn get_agents(&self) -> MovieResult<Vec<AgentSummary>> {
        let list: AgentList = self.get_json("/agents", &[]).await?;
        Ok(list
            .agents
            .into_iter()
            .filter(|agent| !self.config.protected_agent_ids.contains(&agent.agent_id))
            .collect())
    }

    pub async fn get_agent(&self, agent_id: &str) -> MovieResult<Agent> {
        self.get_json(&format!("/agents/{}", agent_id), &[]).await
    }

    /// Returns whether the service accepted the update
    pub async fn update_agent(&self, update: &AgentUpdate) -> MovieResult<bool> {
        let Some(agent_id) = update.agent_id.as_deref().filter(|id| !id.is_empty()) else {
            warn!("No agent_id provided, cannot update agent");
            return Ok(false);
        };

        info!(agent_id, "Updating agent");
        let response = self
            .http
            .patch(format!("{}/agents/{}", self.config.base_url, agent_id))
            .header("xi-api-key", &self.config.api_key)
            .json(&update.payload())
            .send()
            .await?;
        Ok(response.status() == StatusCode::OK)
    }

    /// Every conversation of an agent, newest first, following cursor pagination
    pub async fn get_all_conversations(
        &self,
        agent_id: &str,
    ) -> MovieResult<Vec<ConversationSummary>> {
        let mut conversations = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![("agent_id", agent_id)];
            if let Some(cursor) = cursor.as_deref() {
                query.push(("cursor", cursor));
            }
            let page: ConversationPage = self.get_json("/conversations", &query).await?;
            conversations.extend(page.conversations);

            cursor = page.next_cursor.filter(|_| page.has_more);
            tokio::time::sleep(PAGE_PAUSE).await;
            if cursor.is_none() {
                break;
            }
        }
        Ok(conversations)
    }

    pub async fn get_conversation(&self, conversation_id: &str) -> MovieResult<Conversation> {
        self.get_json(&format!("/conversations/{}", conversation_id), &[])
            .await
    }

    pub async fn get_most_recent_conversation(&self, agent_id: &str) -> MovieResult<Conversation> {
        let conversations = self.get_all_conversations(agent_id).await?;
        let latest = conversations.first().ok_or_else(|| {
            MovieError::service(SERVICE, format!("agent {} has no conversations", agent_id))
        })?;
        self.get_conversation(&latest.conversation_id).await
    }

    /// Most recent conversation rendered as a plain-text transcript
    pub async fn most_recent_conversation_string(&self, agent_id: &str) -> MovieResult<String> {
        let conversation = self.get_most_recent_conversation(agent_id).await?;
        let agent = self.get_agent(agent_id).await?;
        Ok(render_transcript(&agent.name, &conversation))
    }

    /// Summaries of conversations started at or after `since` and longer than `min_duration_secs`
    pub async fn conversation_summaries_string(
        &self,
        agent_id: &str,
        since: DateTime<Utc>,
        min_duration_secs: u64,
    ) -> MovieResult<String> {
        let conversations: Vec<ConversationSummary> = self
            .get_all_conversations(agent_id)
            .await?
            .into_iter()
            .filter(|c| c.start_time_unix_secs >= since.timestamp())
            .filter(|c| c.call_duration_secs > min_duration_secs)
            .collect();
        info!(
            "There are {} conversations after {} with a minimum call duration of {} seconds",
            conversations.len(),
            since,
            min_duration_secs
        );

        let mut summaries = String::from("[");
        for summary in &conversations {
            let conversation = self.get_conversation(&summary.conversation_id).await?;
            summaries.push_str(&render_summary(summary, &conversation.analysis));
        }
        summaries.push(']');
        Ok(summaries)
    }
}

fn utc_time(unix_secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(unix_secs, 0)
}

fn render_transcript(agent_name: &str, conversation: &Conversation) -> String {
    let time = utc_time(conversation.metadata.start_time_unix_secs)
        .map(|t| t.format("%B %d, %Y, %I:%M %p").to_string())
        .unwrap_or_default();

    let mut text = format!(
        "Most recent conversation of {}\nTIME: {}\nCONVERSATION\n",
        agent_name, time
    );
    for message in &conversation.transcript {
        let Some(body) = message.message.as_deref().filter(|m| !m.is_empty()) else {
            continue;
        };
        let role = if message.role == "agent" {
            agent_name
        } else {
            message.role.as_str()
        };
        text.push_str(&format!("{}: {}\n", role, body));
    }
    text
}

fn render_summary(summary: &ConversationSummary, analysis: &ConversationAnalysis) -> String {
    let time = utc_time(summary.start_time_unix_secs)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();
    format!(
        "\n{{\nTIME: {},\nSPEAKER: {},\nDURATION: {} seconds,\nSUMMARY:{}}},",
        time,
        analysis.collected("SPEAKER").unwrap_or_default(),
        summary.call_duration_secs,
        analysis.transcript_summary.as_deref().unwrap_or_default()
    )
}
