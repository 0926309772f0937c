//! Text generation provider implementations

pub mod huggingface;
pub mod local;
pub mod openai;

use async_trait::async_trait;
use log::{error, trace};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Error;
use crate::request::Generation;
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};

// Re-export for convenience
pub use huggingface::InferenceClient;
pub use local::LocalClient;
pub use openai::{ChatCompletionClient, CompletionClient};

/// A backend that turns a prompt into text.
///
/// Transport failures and non-2xx statuses come back as transient
/// errors, undecodable bodies as `Error::Parse`; a decodable body
/// with the wrong shape is a soft failure inside `Generation`.
#[async_trait]
pub trait TextProvider: Send + Sync
{   fn provider(&self) -> crate::Provider;

    fn model(&self) -> &str;

    async fn generate(&self, prompt: &str)
      -> Result<Generation, Error>;

    /// Wrap this provider in `policy`
    fn with_retry(self, policy: RetryPolicy) -> Retrying<Self>
    where
      Self: Sized
    {   Retrying::new(self, policy)
    }
}

#[async_trait]
impl TextProvider for Box<dyn TextProvider>
{   fn provider(&self) -> crate::Provider
    {   (**self).provider()
    }

    fn model(&self) -> &str
    {   (**self).model()
    }

    async fn generate(&self, prompt: &str)
      -> Result<Generation, Error>
    {   (**self).generate(prompt).await
    }
}

// ===== Retry wrapper =====

/// Applies a `RetryPolicy` to any provider
pub struct Retrying<P>
{   inner: P
  , policy: RetryPolicy
  , sleeper: Arc<dyn Sleeper>
}

impl<P> Retrying<P>
{   pub fn new(inner: P, policy: RetryPolicy) -> Self
    {   Retrying
        {   inner
          , policy
          , sleeper: Arc::new(TokioSleeper)
        }
    }

    /// Replace the sleeper used between attempts
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self
    {   self.sleeper = sleeper;
        self
    }

    pub fn policy(&self) -> &RetryPolicy
    {   &self.policy
    }

    pub fn inner(&self) -> &P
    {   &self.inner
    }
}

#[async_trait]
impl<P: TextProvider> TextProvider for Retrying<P>
{   fn provider(&self) -> crate::Provider
    {   self.inner.provider()
    }

    fn model(&self) -> &str
    {   self.inner.model()
    }

    async fn generate(&self, prompt: &str)
      -> Result<Generation, Error>
    {   let name = format!(
          "{} {}",
          self.inner.provider().display_name(),
          self.inner.model()
        );
        self.policy
          .run(&name, self.sleeper.as_ref(), move || {
            self.inner.generate(prompt)
          })
          .await
    }
}

// ===== Shared HTTP plumbing =====

/// Client for one provider: bounded by `timeout`, and keeping no
/// idle connections so every attempt opens its own.
pub(crate) fn build_http_client(timeout: Duration)
  -> Result<reqwest::Client, Error>
{   reqwest::Client::builder()
      .timeout(timeout)
      .pool_max_idle_per_host(0)
      .build()
      .map_err(|e| {
        error!("Failed to build HTTP client: {}", e);
        Error::InvalidConfiguration(e.to_string())
      })
}

/// POST `body`, with a bearer token when `api_key` is set, and
/// return the raw response text of a 2xx answer.
pub(crate) async fn post_json<B>(
  http_client: &reqwest::Client
, url: &str
, api_key: Option<&str>
, body: &B
) -> Result<String, Error>
where
  B: Serialize + std::fmt::Debug + Sync
{   trace!("POST {} with {:?}", url, body);

    let mut request = http_client
      .post(url)
      .header("Content-Type", "application/json");
    if let Some(api_key) = api_key
    {   request = request
          .header("Authorization", format!("Bearer {}", api_key));
    }

    let response = request
      .json(body)
      .send()
      .await
      .map_err(|e| {
        error!("HTTP error: {}", e);
        Error::from(e)
      })?;

    let status = response.status();
    trace!("Response status from {}: {}", url, status);

    if !status.is_success()
    {   let error_text = response.text().await
          .unwrap_or_else(|_|
            "Unknown error".to_string()
          );
        error!("API error from {}: {} {}", url, status, error_text);
        return Err(Error::Api
        {   status: status.as_u16()
          , body: error_text
        });
    }

    response.text().await.map_err(|e| {
      error!("Failed to read response body: {}", e);
      Error::from(e)
    })
}

/// Join a base URL and a path without doubling the slash
pub(crate) fn endpoint(api_base: &str, path: &str) -> String
{   format!(
      "{}/{}",
      api_base.trim_end_matches('/'),
      path.trim_start_matches('/')
    )
}
