//! Request and response types for the gateway

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::Error;
use crate::{ContentType, Length, Style, Tone};

pub const MAX_TEXT_CHARS: usize = 5000;
pub const MAX_PROMPT_CHARS: usize = 2000;
pub const MAX_CONTEXT_CHARS: usize = 5000;
pub const MIN_MAX_TOKENS: u32 = 100;
pub const MAX_MAX_TOKENS: u32 = 2000;
pub const MAX_REPHRASE_TEMPERATURE: f32 = 2.0;
pub const MAX_CONTENT_TEMPERATURE: f32 = 1.5;

/// Caller overrides for sampling parameters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Overrides
{   pub temperature: Option<f32>
  , pub max_tokens: Option<u32>
}

/// Modes a result was produced with
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection
{   Rephrase(Style)
  , Content
    {   kind: ContentType
      , tone: Tone
      , length: Length
    }
}

/// Outcome of one transformation
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationResult
{   pub text: String
  , /// Seconds spent in the external call
    pub processing_time: f64
  , pub tokens_used: Option<u32>
  , pub model: String
  , pub selection: Selection
}

// ===== HTTP bodies =====

fn default_true() -> bool
{   true
}

/// Body of `POST /rephrase`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RephraseRequest
{   pub text: String
  , #[serde(default = "default_style")]
    pub style: Style
  , #[serde(default = "default_true")]
    pub preserve_meaning: bool
  , #[serde(default)]
    pub max_tokens: Option<u32>
  , #[serde(default)]
    pub temperature: Option<f32>
}

fn default_style() -> Style
{   Style::Formal
}

impl RephraseRequest
{   pub fn new(text: impl Into<String>, style: Style) -> Self
    {   RephraseRequest
        {   text: text.into()
          , style
          , preserve_meaning: true
          , max_tokens: None
          , temperature: None
        }
    }

    /// Range checks that schema validation would reject
    pub fn validate(&self) -> Result<(), Error>
    {   check_chars("text", &self.text, MAX_TEXT_CHARS)?;
        check_max_tokens(self.max_tokens)?;
        check_temperature(self.temperature, MAX_REPHRASE_TEMPERATURE)
    }

    pub fn overrides(&self) -> Overrides
    {   Overrides
        {   temperature: self.temperature
          , max_tokens: self.max_tokens
        }
    }
}

/// Body of `POST /generate-content`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRequest
{   pub prompt: String
  , #[serde(default)]
    pub context: Option<String>
  , #[serde(rename = "type", default = "default_content_type")]
    pub kind: ContentType
  , #[serde(default = "default_tone")]
    pub tone: Tone
  , #[serde(default = "default_length")]
    pub length: Length
  , #[serde(default)]
    pub max_tokens: Option<u32>
  , #[serde(default)]
    pub temperature: Option<f32>
}

fn default_content_type() -> ContentType
{   ContentType::New
}

fn default_tone() -> Tone
{   Tone::Professional
}

fn default_length() -> Length
{   Length::Medium
}

impl ContentRequest
{   pub fn new(prompt: impl Into<String>, kind: ContentType) -> Self
    {   ContentRequest
        {   prompt: prompt.into()
          , context: None
          , kind
          , tone: default_tone()
          , length: default_length()
          , max_tokens: None
          , temperature: None
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self
    {   self.context = Some(context.into());
        self
    }

    pub fn validate(&self) -> Result<(), Error>
    {   check_chars("prompt", &self.prompt, MAX_PROMPT_CHARS)?;
        if let Some(context) = &self.context
        {   check_chars("context", context, MAX_CONTEXT_CHARS)?;
        }
        check_max_tokens(self.max_tokens)?;
        check_temperature(self.temperature, MAX_CONTENT_TEMPERATURE)
    }

    pub fn overrides(&self) -> Overrides
    {   Overrides
        {   temperature: self.temperature
          , max_tokens: self.max_tokens
        }
    }
}

fn check_chars(field: &str, value: &str, limit: usize)
  -> Result<(), Error>
{   let count = value.chars().count();
    if count > limit
    {   return Err(Error::InvalidRequest(format!(
          "{} must be at most {} characters (got {})",
          field, limit, count
        )));
    }
    Ok(())
}

fn check_max_tokens(max_tokens: Option<u32>) -> Result<(), Error>
{   match max_tokens
    {   Some(n) if !(MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(&n) => {
          Err(Error::InvalidRequest(format!(
            "max_tokens must be between {} and {} (got {})",
            MIN_MAX_TOKENS, MAX_MAX_TOKENS, n
          )))
        }
      , _ => Ok(())
    }
}

fn check_temperature(temperature: Option<f32>, max: f32)
  -> Result<(), Error>
{   match temperature
    {   Some(t) if !(0.0..=max).contains(&t) => {
          Err(Error::InvalidRequest(format!(
            "temperature must be between 0 and {} (got {})",
            max, t
          )))
        }
      , _ => Ok(())
    }
}

/// Body returned by `POST /rephrase`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RephraseResponse
{   pub original_text: String
  , pub rephrased_text: String
  , pub style: Style
  , pub processing_time: f64
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>
}

impl RephraseResponse
{   pub fn from_result(
      request: &RephraseRequest
    , result: TransformationResult
    ) -> Self
    {   RephraseResponse
        {   original_text: request.text.clone()
          , rephrased_text: result.text
          , style: request.style
          , processing_time: result.processing_time
          , tokens_used: result.tokens_used
        }
    }
}

/// Body returned by `POST /generate-content`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentResponse
{   pub generated_content: String
  , pub prompt: String
  , #[serde(rename = "type")]
    pub kind: ContentType
  , pub tone: Tone
  , pub length: Length
  , pub processing_time: f64
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_used: Option<u32>
}

impl ContentResponse
{   pub fn from_result(
      request: &ContentRequest
    , result: TransformationResult
    ) -> Self
    {   ContentResponse
        {   generated_content: result.text
          , prompt: request.prompt.clone()
          , kind: request.kind
          , tone: request.tone
          , length: request.length
          , processing_time: result.processing_time
          , tokens_used: result.tokens_used
        }
    }
}

/// One entry of a rephrase batch response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RephraseBatchItem
{   Ok(RephraseResponse)
  , Failed
    {   error: String
      , original_text: String
      , style: Style
    }
}

/// One entry of a content batch response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentBatchItem
{   Ok(ContentResponse)
  , Failed
    {   error: String
      , prompt: String
      , #[serde(rename = "type")]
      kind: ContentType
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse<T>
{   pub results: Vec<T>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse
{   pub status: String
  , pub timestamp: DateTime<Utc>
  , pub groq_available: bool
  , pub version: String
}

/// Error body for every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse
{   pub error: String
  , pub status_code: u16
  , pub timestamp: DateTime<Utc>
}
