//! Configuration for the completion provider and the HTTP server

use serde::{Deserialize, Serialize};
use log::warn;
use crate::error::Error;

pub const DEFAULT_API_BASE: &str
  = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// API credential; `None` leaves the gateway degraded
    #[serde(skip_serializing)]
    pub api_key: Option<String>
  , /// API base URL
    pub api_base: String
  , /// Model identifier sent with every completion
    pub model: String
  , /// Request timeout in seconds
    pub timeout_secs: u64
  , /// Enable detailed logging of provider traffic
    pub verbose: bool
}

impl Default for ProviderConfig
{   fn default() -> Self
    {   ProviderConfig
        {   api_key: None
          , api_base: DEFAULT_API_BASE.to_string()
          , model: DEFAULT_MODEL.to_string()
          , timeout_secs: DEFAULT_TIMEOUT_SECS
          , verbose: false
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig
{   pub host: String
  , pub port: u16
}

impl Default for ServerConfig
{   fn default() -> Self
    {   ServerConfig
        {   host: "0.0.0.0".to_string()
          , port: 8000
        }
    }
}

/// Gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig
{   pub provider: ProviderConfig
  , pub server: ServerConfig
}

impl GatewayConfig
{   /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, Error>
    {   Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
      F: Fn(&str) -> Option<String>
    {   let mut config = GatewayConfig::default();

        config.provider.api_key = lookup("GROQ_API_KEY")
          .map(|k| k.trim().to_string())
          .filter(|k| !k.is_empty());
        if config.provider.api_key.is_none()
        {   warn!("GROQ_API_KEY not found in environment or .env file");
        }

        if let Some(base) = lookup("GROQ_API_BASE")
        {   config.provider.api_base
              = base.trim().trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("GROQ_MODEL")
        {   config.provider.model = model.trim().to_string();
        }
        if let Some(raw) = lookup("GROQ_TIMEOUT_SECS")
        {   config.provider.timeout_secs
              = parse_var("GROQ_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = lookup("GROQ_VERBOSE")
        {   config.provider.verbose
              = parse_var("GROQ_VERBOSE", &raw)?;
        }
        if let Some(host) = lookup("HOST")
        {   config.server.host = host.trim().to_string();
        }
        if let Some(raw) = lookup("PORT")
        {   config.server.port = parse_var("PORT", &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Whether a provider credential is present
    pub fn has_credential(&self) -> bool
    {   self.provider.api_key.is_some()
    }

    fn validate(&self) -> Result<(), Error>
    {   if self.provider.model.is_empty()
        {   return Err(Error::InvalidConfiguration(
              "GROQ_MODEL cannot be empty".to_string()
            ));
        }
        if self.provider.timeout_secs == 0
        {   return Err(Error::InvalidConfiguration(
              "GROQ_TIMEOUT_SECS must be positive".to_string()
            ));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: &str)
  -> Result<T, Error>
{   raw.trim().parse().map_err(|_| {
      Error::InvalidConfiguration(
        format!("{} has invalid value: {}", name, raw)
      )
    })
}
