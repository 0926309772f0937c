use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{GenerationConfig, ProviderConfig};
use crate::error::Error;
use crate::request::{
  ChatCompletionRequest, ChatMessage, CompletionRequest, Generation,
};

pub const OPENAI_API_BASE: &str
  = "https://api.openai.com";

pub const DEFAULT_COMPLETION_MODEL: &str = "text-davinci-003";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";

// ===== Response shapes =====
//
// Every field is optional: a null or missing field, or one of the
// wrong JSON type, is a soft failure rather than a parse error.

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse
{   #[serde(default)]
    pub choices: Option<Vec<CompletionChoice>>
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice
{   #[serde(default)]
    pub text: Option<Value>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse
{   #[serde(default)]
    pub choices: Option<Vec<ChatChoice>>
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice
{   #[serde(default)]
    pub message: Option<Value>
}

/// First choice's text, or `NoResponse` when it is absent
pub fn normalize_completion(response: &CompletionResponse) -> Generation
{   response.choices.as_deref()
      .and_then(<[CompletionChoice]>::first)
      .and_then(|choice| choice.text.as_ref())
      .and_then(Value::as_str)
      .map(Generation::from_raw)
      .unwrap_or(Generation::NoResponse)
}

/// First choice's message content, or `NoResponse`
pub fn normalize_chat(response: &ChatCompletionResponse) -> Generation
{   response.choices.as_deref()
      .and_then(<[ChatChoice]>::first)
      .and_then(|choice| choice.message.as_ref())
      .and_then(|message| message.get("content"))
      .and_then(Value::as_str)
      .map(Generation::from_raw)
      .unwrap_or(Generation::NoResponse)
}

// ===== Shared connection =====

/// Key, endpoint and HTTP client shared by both OpenAI clients
pub struct OpenAIConnection
{   api_key: String
  , api_base: String
  , model: String
  , generation: GenerationConfig
  , http_client: reqwest::Client
}

impl OpenAIConnection
{   pub fn new(
      api_key: impl Into<String>
    , provider: &ProviderConfig
    , generation: GenerationConfig
    ) -> Result<Self, Error>
    {   Ok(OpenAIConnection
        {   api_key: api_key.into()
          , api_base: provider.api_base.clone()
              .unwrap_or_else(|| OPENAI_API_BASE.to_string())
          , model: provider.model.clone()
          , generation
          , http_client: super::build_http_client(provider.timeout())?
        })
    }

    pub fn url(&self, path: &str) -> String
    {   super::endpoint(&self.api_base, path)
    }

    /// POST `request` to `path` and decode the body as `R`
    async fn send<B, R>(&self, path: &str, request: &B)
      -> Result<R, Error>
    where
      B: Serialize + std::fmt::Debug + Sync
    , R: serde::de::DeserializeOwned
    {   let body = super::post_json(
          &self.http_client,
          &self.url(path),
          Some(self.api_key.as_str()),
          request
        ).await?;

        serde_json::from_str(&body).map_err(|e| {
          error!("Parse error: {}", e);
          Error::from(e)
        })
    }
}

// ===== Completion client =====

const COMPLETIONS_PATH: &str = "v1/completions";

/// Client for `POST /v1/completions`
pub struct CompletionClient
{   connection: OpenAIConnection
}

impl CompletionClient
{   pub fn new(
      api_key: impl Into<String>
    , provider: &ProviderConfig
    , generation: GenerationConfig
    ) -> Result<Self, Error>
    {   debug!("Creating CompletionClient for {}", provider.model);
        Ok(CompletionClient
        {   connection: OpenAIConnection::new(api_key, provider, generation)?
        })
    }

    pub fn url(&self) -> String
    {   self.connection.url(COMPLETIONS_PATH)
    }
}

#[async_trait::async_trait]
impl super::TextProvider for CompletionClient
{   fn provider(&self) -> crate::Provider
    {   crate::Provider::OpenAI
    }

    fn model(&self) -> &str
    {   &self.connection.model
    }

    async fn generate(&self, prompt: &str)
      -> Result<Generation, Error>
    {   debug!("Handling completion for: {}", self.connection.model);

        let request = CompletionRequest
        {   model: self.connection.model.clone()
          , prompt: prompt.to_string()
          , max_tokens: self.connection.generation.max_tokens
          , temperature: self.connection.generation.temperature
        };

        let response: CompletionResponse = self.connection
          .send(COMPLETIONS_PATH, &request)
          .await?;
        Ok(normalize_completion(&response))
    }
}

// ===== Chat completion client =====

const CHAT_COMPLETIONS_PATH: &str = "v1/chat/completions";

/// Client for `POST /v1/chat/completions`
pub struct ChatCompletionClient
{   connection: OpenAIConnection
}

impl ChatCompletionClient
{   pub fn new(
      api_key: impl Into<String>
    , provider: &ProviderConfig
    , generation: GenerationConfig
    ) -> Result<Self, Error>
    {   debug!("Creating ChatCompletionClient for {}", provider.model);
        Ok(ChatCompletionClient
        {   connection: OpenAIConnection::new(api_key, provider, generation)?
        })
    }

    pub fn url(&self) -> String
    {   self.connection.url(CHAT_COMPLETIONS_PATH)
    }
}

#[async_trait::async_trait]
impl super::TextProvider for ChatCompletionClient
{   fn provider(&self) -> crate::Provider
    {   crate::Provider::OpenAI
    }

    fn model(&self) -> &str
    {   &self.connection.model
    }

    async fn generate(&self, prompt: &str)
      -> Result<Generation, Error>
    {   debug!("Handling chat completion for: {}", self.connection.model);

        let request = ChatCompletionRequest
        {   model: self.connection.model.clone()
          , messages: vec![
              ChatMessage
              {   role: "user".to_string()
                , content: prompt.to_string()
              }
            ]
          , max_tokens: self.connection.generation.max_tokens
          , temperature: self.connection.generation.temperature
        };

        let response: ChatCompletionResponse = self.connection
          .send(CHAT_COMPLETIONS_PATH, &request)
          .await?;
        Ok(normalize_chat(&response))
    }
}
