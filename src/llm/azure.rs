use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::{ChatMessage, ChatModel, ModelTurn, ToolCall, ToolDefinition};
use crate::config::LlmConfig;
use crate::error::{GraphChatError, Result};

/// Request structure for the chat completions API
#[derive(Serialize)]
struct CompletionRequest<'a> {
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tools: &'a [ToolDefinition],
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
    temperature: f32,
}

/// Response structure from the chat completions API
#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

/// Azure OpenAI chat completions client
///
/// One request per reasoning step; no retries, a failed call fails the turn.
pub struct AzureOpenAiClient {
    client: Client,
    url: Url,
    api_key: String,
    temperature: f32,
}

impl std::fmt::Debug for AzureOpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAiClient")
            .field("url", &self.url.as_str())
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl AzureOpenAiClient {
    /// Create a new client
    ///
    /// # Arguments
    ///
    /// * `endpoint` - Resource endpoint, e.g. `https://my-resource.openai.azure.com`
    /// * `api_key` - Azure OpenAI key
    /// * `config` - Deployment, API version, temperature and timeout
    pub fn new(endpoint: &str, api_key: String, config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GraphChatError::Connection(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: completions_url(endpoint, &config.deployment, &config.api_version)?,
            api_key,
            temperature: config.temperature,
        })
    }

    /// Send a one-line prompt to confirm the endpoint, key and deployment work
    pub async fn ping(&self) -> Result<String> {
        let turn = self
            .complete(&[ChatMessage::user("Hello, this is a test.")], &[])
            .await
            .map_err(|e| GraphChatError::Connection(e.to_string()))?;
        match turn {
            ModelTurn::Answer(text) => Ok(text),
            ModelTurn::ToolCalls { .. } => Ok(String::new()),
        }
    }
}

#[async_trait]
impl ChatModel for AzureOpenAiClient {
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolDefinition]) -> Result<ModelTurn> {
        let request = CompletionRequest {
            messages,
            tools,
            tool_choice: if tools.is_empty() { None } else { Some("auto") },
            temperature: self.temperature,
        };

        let start = std::time::Instant::now();
        let response = self
            .client
            .post(self.url.clone())
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GraphChatError::Llm(format!("Network error: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            return Err(GraphChatError::Llm(format!(
                "Azure OpenAI API error {}: {}",
                status, body
            )));
        }

        let result: CompletionResponse = response
            .json()
            .await
            .map_err(|e| GraphChatError::Llm(format!("Failed to parse response: {}", e)))?;

        log::debug!("Chat completion took {:?}", start.elapsed());
        into_turn(result)
    }
}

fn completions_url(endpoint: &str, deployment: &str, api_version: &str) -> Result<Url> {
    let mut url = Url::parse(endpoint)
        .map_err(|e| GraphChatError::Config(format!("Invalid model endpoint {}: {}", endpoint, e)))?;
    url.path_segments_mut()
        .map_err(|_| GraphChatError::Config(format!("Model endpoint cannot be a base URL: {}", endpoint)))?
        .pop_if_empty()
        .extend(["openai", "deployments", deployment, "chat", "completions"]);
    url.query_pairs_mut().append_pair("api-version", api_version);
    Ok(url)
}

fn into_turn(response: CompletionResponse) -> Result<ModelTurn> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GraphChatError::Llm("Empty response from Azure OpenAI".to_string()))?;

    if choice.finish_reason.as_deref() == Some("content_filter") {
        return Err(GraphChatError::Llm(
            "Response was blocked by the content filter".to_string(),
        ));
    }

    match choice.message.tool_calls {
        Some(calls) if !calls.is_empty() => Ok(ModelTurn::ToolCalls {
            content: choice.message.content,
            calls,
        }),
        _ => Ok(ModelTurn::Answer(choice.message.content.unwrap_or_default())),
    }
}
