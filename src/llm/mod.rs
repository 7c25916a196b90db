//! Streaming chat-model clients.
//!
//! Each provider turns a [`ModelRequest`] into a stream of [`ModelDelta`]s:
//! incremental content in the provider's own shape, plus fully assembled tool
//! calls. Clients are built per run by a [`ModelFactory`].

pub mod gemini;
pub mod openai;
pub mod sse;

use crate::config::{ApiKeys, Config, Endpoints};
use crate::error::{FactCheckError, Result};
use crate::models::{Message, Provider, RunConfig, ToolCall, ToolSpec};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;
use tracing::debug;

pub use gemini::GeminiChatModel;
pub use openai::OpenAiChatModel;

/// Incremental content of a streamed response.
///
/// OpenAI streams plain strings. Gemini streams lists of parts, where each
/// part is an object that may carry a `text` field (or is a bare string).
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkContent {
    Text(String),
    Fragments(Vec<Value>),
}

impl ChunkContent {
    /// The human-readable text carried by this chunk; non-text fragments are skipped.
    pub fn text(&self) -> String {
        match self {
            ChunkContent::Text(text) => text.clone(),
            ChunkContent::Fragments(items) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.as_str()),
                    Value::Object(map) => map.get("text").and_then(|t| t.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelDelta {
    Content(ChunkContent),
    ToolCall(ToolCall),
}

#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub system_prompt: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSpec>,
}

pub type ModelStream = BoxStream<'static, Result<ModelDelta>>;

#[async_trait]
pub trait ChatModel: Send + Sync {
    fn provider(&self) -> Provider;

    fn model_id(&self) -> &str;

    /// Send one request and stream the reply. Tool calls are yielded once complete.
    async fn stream(&self, request: &ModelRequest) -> Result<ModelStream>;
}

/// Builds a model client for a run configuration.
pub trait ModelFactory: Send + Sync {
    fn create(&self, run: &RunConfig) -> Result<Box<dyn ChatModel>>;
}

/// Factory backed by the hosted OpenAI and Gemini APIs.
#[derive(Debug, Clone)]
pub struct ProviderModelFactory {
    client: reqwest::Client,
    keys: ApiKeys,
    endpoints: Endpoints,
    stream_timeout: u64,
}

impl ProviderModelFactory {
    pub fn new(
        client: reqwest::Client,
        keys: ApiKeys,
        endpoints: Endpoints,
        stream_timeout: u64,
    ) -> Self {
        Self {
            client,
            keys,
            endpoints,
            stream_timeout,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &Config) -> Self {
        Self::new(
            client,
            config.keys.clone(),
            config.endpoints.clone(),
            config.stream_timeout,
        )
    }
}

impl ModelFactory for ProviderModelFactory {
    fn create(&self, run: &RunConfig) -> Result<Box<dyn ChatModel>> {
        let model = run.effective_model();
        if model != run.model {
            debug!(requested = %run.model, using = %model, "substituted model for provider");
        }

        match run.provider {
            Provider::OpenAi => {
                let api_key = self.keys.openai.clone().ok_or_else(|| {
                    FactCheckError::ConfigError(
                        "OPENAI_API_KEY environment variable not set".to_string(),
                    )
                })?;
                Ok(Box::new(OpenAiChatModel::new(
                    self.client.clone(),
                    &self.endpoints.openai,
                    api_key,
                    model,
                    self.stream_timeout,
                )))
            }
            Provider::Gemini => {
                let api_key = self.keys.google.clone().ok_or_else(|| {
                    FactCheckError::ConfigError(
                        "GOOGLE_API_KEY environment variable not set".to_string(),
                    )
                })?;
                Ok(Box::new(GeminiChatModel::new(
                    self.client.clone(),
                    &self.endpoints.gemini,
                    api_key,
                    model,
                    self.stream_timeout,
                )))
            }
        }
    }
}
