use std::time::Duration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use log::{debug, trace, error};
use crate::config::ProviderConfig;
use crate::error::Error;
use super::{ChatMessage, Completion, CompletionBackend, CompletionRequest};

// ===== Wire Types =====

#[derive(Debug, Clone, Serialize)]
pub struct GroqChatRequest<'a>
{   pub model: &'a str
  , pub messages: &'a [ChatMessage]
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>
  , pub stream: bool
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroqChatResponse
{   pub choices: Vec<Choice>
  , #[serde(default)]
    pub usage: Option<Usage>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice
{   pub message: ResponseMessage
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage
{   #[serde(default)]
    pub content: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage
{   #[serde(default)]
    pub total_tokens: Option<u32>
}

// ===== Groq Client =====

/// Client for the Groq OpenAI-compatible chat completion API.
/// Built once at startup and shared; holds no per-request state.
pub struct GroqClient
{   api_key: String
  , chat_url: String
  , model: String
  , verbose: bool
  , http_client: reqwest::Client
}

impl GroqClient
{   /// Build a client from provider configuration.
    /// Fails with `MissingApiKey` when no credential is configured.
    pub fn new(config: &ProviderConfig) -> Result<Self, Error>
    {   debug!("Creating GroqClient for model: {}", config.model);

        let api_key = config.api_key.clone()
          .ok_or_else(|| {
            error!("No Groq API key configured");
            Error::MissingApiKey("Groq".to_string())
          })?;

        let http_client = reqwest::Client::builder()
          .timeout(Duration::from_secs(config.timeout_secs))
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            Error::InvalidConfiguration(e.to_string())
          })?;

        Ok(GroqClient
        {   api_key
          , chat_url: format!(
              "{}/chat/completions",
              config.api_base.trim_end_matches('/')
            )
          , model: config.model.clone()
          , verbose: config.verbose
          , http_client
        })
    }
}

#[async_trait]
impl CompletionBackend for GroqClient
{   async fn complete(&self, request: CompletionRequest)
      -> Result<Completion, Error>
    {   debug!(
          "Sending {} messages to Groq model: {}",
          request.messages.len(),
          self.model
        );

        let body = GroqChatRequest
        {   model: &self.model
          , messages: &request.messages
          , max_tokens: request.max_tokens
          , temperature: request.temperature
          , top_p: request.top_p
          , stream: false
        };

        if self.verbose
        {   debug!("Groq request: {:?}", body);
        } else
        {   trace!("Groq request: {:?}", body);
        }

        let response = self.http_client
          .post(self.chat_url.as_str())
          .bearer_auth(&self.api_key)
          .json(&body)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            if e.is_timeout()
            {   Error::Timeout
            } else
            {   Error::HttpError(e.to_string())
            }
          })?;

        let status = response.status();
        trace!("Groq response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("Groq API error ({}): {}", status, error_text);
            return Err(Error::ApiError(
              format!("Groq error ({}): {}", status, error_text)
            ));
        }

        let chat_response: GroqChatResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            Error::ParseError(e.to_string())
          })?;

        let total_tokens = chat_response.usage
          .as_ref()
          .and_then(|u| u.total_tokens);

        let content = chat_response.choices
          .into_iter()
          .next()
          .ok_or_else(|| {
            error!("No choices in response");
            Error::NoChoicesInResponse
          })?
          .message
          .content
          .ok_or_else(|| {
            error!("First choice carried no content");
            Error::ParseError(
              "choice message has no content".to_string()
            )
          })?;

        debug!(
          "Groq returned {} chars, usage: {:?}",
          content.len(),
          total_tokens
        );
        Ok(Completion { content, total_tokens })
    }

    fn model(&self) -> &str
    {   &self.model
    }
}
