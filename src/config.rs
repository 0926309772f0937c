//! Configuration for providers, retries and credentials

use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the completion API key
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable holding the inference API key
pub const HUGGINGFACE_API_KEY: &str = "HUGGINGFACE_API_KEY";

/// Request timeout used when a provider sets none
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ===== Credentials =====

/// The two secrets both providers need.
/// Only built through `resolve`, so holding one means
/// both keys were present.
#[derive(Clone)]
pub struct Credentials
{   openai_api_key: String
  , huggingface_api_key: String
}

impl Credentials
{   /// Read both keys from the process environment
    pub fn from_env() -> Result<Self, crate::error::Error>
    {   Credentials::resolve(|name| std::env::var(name).ok())
    }

    /// Resolve both keys through `lookup`.
    /// Unset and empty values count as missing, and every
    /// missing name is reported, not just the first.
    pub fn resolve<F>(lookup: F)
      -> Result<Self, crate::error::Error>
    where
      F: Fn(&str) -> Option<String>
    {   let read = |name: &str| lookup(name)
          .filter(|value| !value.is_empty());

        let openai = read(OPENAI_API_KEY);
        let huggingface = read(HUGGINGFACE_API_KEY);

        match (openai, huggingface)
        {   (Some(openai_api_key), Some(huggingface_api_key)) => {
              debug!("Resolved credentials for both providers");
              Ok(Credentials
              {   openai_api_key
                , huggingface_api_key
              })
            }
          , (openai, huggingface) => {
              let mut missing = vec![];
              if openai.is_none()
              {   missing.push(OPENAI_API_KEY.to_string());
              }
              if huggingface.is_none()
              {   missing.push(HUGGINGFACE_API_KEY.to_string());
              }
              error!("Missing credentials: {:?}", missing);
              Err(crate::error::Error::MissingCredentials(missing))
            }
        }
    }

    pub fn openai_api_key(&self) -> &str
    {   &self.openai_api_key
    }

    pub fn huggingface_api_key(&self) -> &str
    {   &self.huggingface_api_key
    }
}

// Keys stay out of logs and panics.
impl std::fmt::Debug for Credentials
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   f.debug_struct("Credentials")
          .field("openai_api_key", &"<redacted>")
          .field("huggingface_api_key", &"<redacted>")
          .finish()
    }
}

// ===== Provider / generation / retry settings =====

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig
{   /// Model identifier sent to the provider
    pub model: String
  , /// API base URL (if custom)
    pub api_base: Option<String>
  , /// Request timeout in seconds
    pub timeout_secs: Option<u64>
}

impl ProviderConfig
{   pub fn new(model: impl Into<String>) -> Self
    {   ProviderConfig
        {   model: model.into()
          , api_base: None
          , timeout_secs: None
        }
    }

    pub fn timeout(&self) -> Duration
    {   Duration::from_secs(
          self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)
        )
    }
}

/// Sampling parameters for the completion API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig
{   pub max_tokens: usize
  , pub temperature: f32
}

impl Default for GenerationConfig
{   fn default() -> Self
    {   GenerationConfig
        {   max_tokens: 150
          , temperature: 0.7
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig
{   /// Max attempts per provider call
    pub max_retries: usize
  , /// Delay before the second attempt, in milliseconds;
    /// doubles for every further attempt
    pub backoff_base_ms: u64
}

impl Default for RetryConfig
{   fn default() -> Self
    {   RetryConfig
        {   max_retries: 3
          , backoff_base_ms: 500
        }
    }
}

/// Comparison configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig
{   /// Completion API settings
    pub completion: ProviderConfig
  , /// Inference API settings
    pub inference: ProviderConfig
  , /// Local model settings; when set, replaces the inference side
    pub local: Option<ProviderConfig>
  , /// Sampling parameters for the completion side
    pub generation: GenerationConfig
  , /// Retry settings applied to both providers
    pub retry: RetryConfig
  , /// Talk to the chat completion endpoint instead
    pub use_chat_api: bool
}

impl CompareConfig
{   pub fn validate(&self) -> Result<(), crate::error::Error>
    {   let local_model_empty = self.local.as_ref()
          .map(|local| local.model.trim().is_empty())
          .unwrap_or(false);
        if self.completion.model.trim().is_empty()
          || self.inference.model.trim().is_empty()
          || local_model_empty
        {   return Err(crate::error::Error::InvalidConfiguration(
              "model identifier must not be empty".to_string()
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature)
        {   return Err(crate::error::Error::InvalidConfiguration(
              format!(
                "temperature {} outside 0.0..=2.0",
                self.generation.temperature
              )
            ));
        }
        Ok(())
    }
}

impl Default for CompareConfig
{   fn default() -> Self
    {   CompareConfig
        {   completion: ProviderConfig::new(
              crate::providers::openai::DEFAULT_COMPLETION_MODEL
            )
          , inference: ProviderConfig::new(
              crate::providers::huggingface::DEFAULT_MODEL
            )
          , local: None
          , generation: GenerationConfig::default()
          , retry: RetryConfig::default()
          , use_chat_api: false
        }
    }
}
