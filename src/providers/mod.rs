//! Completion backends
//!
//! The orchestrator talks to a `CompletionBackend`; production uses
//! the Groq client, tests plug in their own implementation.

pub mod groq;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::Error;

// Re-export for convenience
pub use groq::GroqClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

impl ChatMessage
{   pub fn system(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "system".to_string()
          , content: content.into()
        }
    }

    pub fn user(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "user".to_string()
          , content: content.into()
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self
    {   ChatMessage
        {   role: "assistant".to_string()
          , content: content.into()
        }
    }
}

/// One chat completion call, provider-agnostic.
/// Unset sampling fields are left to the provider's defaults.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompletionRequest
{   pub messages: Vec<ChatMessage>
  , pub temperature: Option<f32>
  , pub max_tokens: Option<u32>
  , pub top_p: Option<f32>
}

/// Raw completion text and reported usage
#[derive(Debug, Clone, PartialEq)]
pub struct Completion
{   pub content: String
  , pub total_tokens: Option<u32>
}

#[async_trait]
pub trait CompletionBackend: Send + Sync
{   /// Run one non-streaming completion
    async fn complete(&self, request: CompletionRequest)
      -> Result<Completion, Error>;

    /// Model identifier sent with each call
    fn model(&self) -> &str;
}
