use log::{debug, error, warn};
use serde_json::Value;

use crate::config::ProviderConfig;
use crate::error::Error;
use crate::request::{Generation, InferenceRequest};

pub const HUGGINGFACE_API_BASE: &str
  = "https://api-inference.huggingface.co";

pub const DEFAULT_MODEL: &str = "gpt2";

/// Inference responses are a non-empty array whose first element
/// carries `generated_text`. Anything else is `UnexpectedFormat`.
pub fn normalize_inference(response: &Value) -> Generation
{   match response
    {   Value::Array(items) if !items.is_empty() => {
          items[0].get("generated_text")
            .and_then(Value::as_str)
            .map(Generation::from_raw)
            .unwrap_or(Generation::NoResponse)
        }
      , other => {
          warn!("Unexpected inference response: {}", other);
          Generation::UnexpectedFormat
        }
    }
}

/// Client for `POST /models/{model}`
pub struct InferenceClient
{   api_key: String
  , api_base: String
  , model: String
  , http_client: reqwest::Client
}

impl InferenceClient
{   pub fn new(
      api_key: impl Into<String>
    , provider: &ProviderConfig
    ) -> Result<Self, Error>
    {   debug!("Creating InferenceClient for {}", provider.model);
        Ok(InferenceClient
        {   api_key: api_key.into()
          , api_base: provider.api_base.clone()
              .unwrap_or_else(|| HUGGINGFACE_API_BASE.to_string())
          , model: provider.model.clone()
          , http_client: super::build_http_client(provider.timeout())?
        })
    }

    pub fn url(&self) -> String
    {   super::endpoint(
          &self.api_base,
          &format!("models/{}", self.model)
        )
    }
}

#[async_trait::async_trait]
impl super::TextProvider for InferenceClient
{   fn provider(&self) -> crate::Provider
    {   crate::Provider::HuggingFaceInterface
    }

    fn model(&self) -> &str
    {   &self.model
    }

    async fn generate(&self, prompt: &str)
      -> Result<Generation, Error>
    {   debug!("Handling inference for: {}", self.model);

        let request = InferenceRequest
        {   inputs: prompt.to_string()
        };

        let body = super::post_json(
          &self.http_client,
          &self.url(),
          Some(self.api_key.as_str()),
          &request
        ).await?;

        let response: Value = serde_json::from_str(&body)
          .map_err(|e| {
            error!("Parse error: {}", e);
            Error::from(e)
          })?;

        Ok(normalize_inference(&response))
    }
}
