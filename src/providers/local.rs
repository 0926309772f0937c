use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{GenerationConfig, ProviderConfig};
use crate::error::Error;
use crate::request::Generation;

/// Default address of a local Ollama server
pub const LOCAL_API_BASE: &str
  = "http://localhost:11434";

pub const DEFAULT_MODEL: &str = "gpt2";

#[derive(Debug, Clone, Serialize)]
pub struct LocalOptions
{   /// Upper bound on generated tokens
    pub num_predict: usize
}

/// Body of `POST /api/generate`
#[derive(Debug, Clone, Serialize)]
pub struct LocalGenerateRequest
{   pub model: String
  , pub prompt: String
  , pub stream: bool
  , pub options: LocalOptions
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalGenerateResponse
{   #[serde(default)]
    pub response: Option<Value>
}

/// `response` text, or `NoResponse` when absent or not a string
pub fn normalize_local(response: &LocalGenerateResponse) -> Generation
{   response.response.as_ref()
      .and_then(Value::as_str)
      .map(Generation::from_raw)
      .unwrap_or(Generation::NoResponse)
}

/// Client for a model served on this machine, over the Ollama
/// generate endpoint. No credentials are sent.
pub struct LocalClient
{   api_base: String
  , model: String
  , max_length: usize
  , http_client: reqwest::Client
}

impl LocalClient
{   pub fn new(
      provider: &ProviderConfig
    , generation: &GenerationConfig
    ) -> Result<Self, Error>
    {   debug!("Creating LocalClient for {}", provider.model);
        Ok(LocalClient
        {   api_base: provider.api_base.clone()
              .unwrap_or_else(|| LOCAL_API_BASE.to_string())
          , model: provider.model.clone()
          , max_length: generation.max_tokens
          , http_client: super::build_http_client(provider.timeout())?
        })
    }

    pub fn url(&self) -> String
    {   super::endpoint(&self.api_base, "api/generate")
    }
}

#[async_trait::async_trait]
impl super::TextProvider for LocalClient
{   fn provider(&self) -> crate::Provider
    {   crate::Provider::Local
    }

    fn model(&self) -> &str
    {   &self.model
    }

    async fn generate(&self, prompt: &str)
      -> Result<Generation, Error>
    {   debug!("Handling local generation for: {}", self.model);

        let request = LocalGenerateRequest
        {   model: self.model.clone()
          , prompt: prompt.to_string()
          , stream: false
          , options: LocalOptions
            {   num_predict: self.max_length
            }
        };

        let body = super::post_json(
          &self.http_client,
          &self.url(),
          None,
          &request
        ).await?;

        let response: LocalGenerateResponse = serde_json::from_str(&body)
          .map_err(|e| {
            error!("Parse error: {}", e);
            Error::from(e)
          })?;

        Ok(normalize_local(&response))
    }
}
