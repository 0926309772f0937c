//! Request payloads and normalized result types

use serde::{Deserialize, Serialize};

// ===== Request payloads =====

/// Body of a completion API call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest
{   pub model: String
  , pub prompt: String
  , pub max_tokens: usize
  , pub temperature: f32
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

/// Body of a chat completion API call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionRequest
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub max_tokens: usize
  , pub temperature: f32
}

/// Body of an inference API call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceRequest
{   pub inputs: String
}

// ===== Results =====

/// What a provider produced for one prompt.
/// Soft failures are tags, never sentinel strings, so a model
/// that literally answers "No response" stays `Text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation
{   /// Trimmed generated text
    Text(String)
  , /// Success response without the expected text field
    NoResponse
  , /// Success response whose overall shape was unexpected
    UnexpectedFormat
}

impl Generation
{   /// Build a `Text` from raw provider output, trimming it.
    pub fn from_raw(raw: &str) -> Self
    {   Generation::Text(raw.trim().to_string())
    }

    pub fn text(&self) -> Option<&str>
    {   match self
        {   Generation::Text(text) => Some(text)
          , _ => None
        }
    }
}

/// Outcome of one provider within a comparison.
/// Exactly one per provider per `compare` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedResult
{   Text(String)
  , NoResponse
  , UnexpectedFormat
  , Failed(crate::error::Error)
}

impl NormalizedResult
{   pub fn text(&self) -> Option<&str>
    {   match self
        {   NormalizedResult::Text(text) => Some(text)
          , _ => None
        }
    }

    pub fn is_failure(&self) -> bool
    {   matches!(self, NormalizedResult::Failed(_))
    }

    /// Human readable line for console output, labelled
    /// with the provider it came from.
    pub fn describe(&self, provider: &crate::Provider) -> String
    {   let name = provider.display_name();
        match self
        {   NormalizedResult::Text(text) => text.clone()
          , NormalizedResult::NoResponse => {
              "No response".to_string()
            }
          , NormalizedResult::UnexpectedFormat => {
              format!("Unexpected {} response format.", name)
            }
          , NormalizedResult::Failed(e) => match e.root()
            {   crate::error::Error::Parse(_) => {
                  format!("Error parsing {} response.", name)
                }
              , _ => format!("{} API request failed: {}", name, e)
            }
        }
    }
}

impl From<Result<Generation, crate::error::Error>> for NormalizedResult
{   fn from(result: Result<Generation, crate::error::Error>) -> Self
    {   match result
        {   Ok(Generation::Text(text)) => NormalizedResult::Text(text)
          , Ok(Generation::NoResponse) => NormalizedResult::NoResponse
          , Ok(Generation::UnexpectedFormat) => {
              NormalizedResult::UnexpectedFormat
            }
          , Err(e) => NormalizedResult::Failed(e)
        }
    }
}
