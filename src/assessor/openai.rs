#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Assessor backed by an OpenAI-compatible chat completion endpoint.

use anyhow::{Context, Result};
use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
    },
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::{Assessor, AssessorError, OutputSchema, extract_json};
use crate::config::OpenAiEnv;

/// Assessor backed by an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct OpenAiAssessor {
    /// API client.
    client:      OpenAIClient<OpenAIConfig>,
    /// Model identifier.
    model:       String,
    /// Sampling temperature.
    temperature: f32,
    /// System message sent before each instruction.
    system:      String,
}

impl OpenAiAssessor {
    /// Creates an assessor for `env`, using `system` as the system message.
    pub fn new(env: &OpenAiEnv, system: impl Into<String>) -> Result<Self> {
        let http_client = Client::builder()
            // Avoid macOS dynamic store lookups that fail in sandboxed environments.
            .no_proxy()
            .build()
            .context("Failed to construct HTTP client for the assessor")?;

        let client = OpenAIClient::with_config(
            OpenAIConfig::new()
                .with_api_base(env.api_base().to_owned())
                .with_api_key(env.api_key().to_owned()),
        )
        .with_http_client(http_client);

        Ok(Self {
            client,
            model: env.model().to_owned(),
            temperature: env.temperature(),
            system: system.into(),
        })
    }
}

#[async_trait]
impl Assessor for OpenAiAssessor {
    async fn assess(
        &self,
        instruction: &str,
        schema: &OutputSchema,
    ) -> Result<Value, AssessorError> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system.clone())
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(instruction.to_string())
                .build()?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .n(1)
            .response_format(ResponseFormat::JsonObject)
            .build()?;

        debug!(schema = schema.name, model = %self.model, "sending assessor request");
        let response = self.client.chat().create(request).await?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or(AssessorError::EmptyResponse)?;

        serde_json::from_str(extract_json(&content)).map_err(|source| AssessorError::Malformed {
            schema: schema.name,
            source,
        })
    }
}
