pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod retry;
pub mod compare;
use serde::{Deserialize, Serialize};

/*

llm-compare sends one prompt to two different text generation
backends and reports whether they answered the same thing.

llm-compare/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports and Provider
│   ├── main.rs         # llm-compare command line
│   ├── error.rs        # Error type and transient classification
│   ├── config.rs       # Credentials and provider/retry settings
│   ├── compare.rs      # Comparator, Comparison, Verdict
│   ├── providers/
│   │   ├── mod.rs      # TextProvider, Retrying, HTTP helpers
│   │   ├── openai.rs   # completion + chat completion clients
│   │   ├── local.rs    # local model over the Ollama generate API
│   │   └── huggingface.rs
│   ├── request.rs      # Payloads, Generation, NormalizedResult
│   └── retry.rs        # RetryPolicy with exponential backoff
└── tests/

*/

pub use compare::{Comparator, Comparison, ProviderReport, Verdict};
pub use config::{CompareConfig, Credentials};
pub use error::Error;
pub use providers::{Retrying, TextProvider};
pub use request::{Generation, NormalizedResult};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};

/// Backends a comparison can talk to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Hash)]
pub enum Provider
{
  /// OpenAI completion and chat completion APIs
  OpenAI
  ,
  /// Hugging Face Inference API
  HuggingFaceInterface
  ,
  /// Local/self-hosted models (Ollama generate API)
  Local
}

impl Provider
{   /// Name used in console output and diagnostics
    pub fn display_name(&self) -> &'static str
    {   match self
        {   Provider::OpenAI => "OpenAI"
          , Provider::HuggingFaceInterface => "Hugging Face"
          , Provider::Local => "Local"
        }
    }
}
