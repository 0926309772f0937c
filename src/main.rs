use anyhow::Result;
use clap::Parser;
use llm_compare::config::{CompareConfig, Credentials, ProviderConfig};
use llm_compare::providers::openai::DEFAULT_CHAT_MODEL;
use llm_compare::Comparator;

/// llm-compare - send one prompt to two LLM backends
///
/// Queries the OpenAI completion API and the Hugging Face Inference
/// API (or a local model) with the same prompt and reports whether
/// they agree.
///
/// Requires OPENAI_API_KEY and HUGGINGFACE_API_KEY, read from the
/// environment or a .env file in the working directory.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli
{   /// Prompt sent to both providers
    #[arg(default_value = "Tell me a joke about AI.")]
    prompt: String
  , /// Completion model (defaults to text-davinci-003, or gpt-3.5-turbo with --chat)
    #[arg(long, value_name = "MODEL")]
    completion_model: Option<String>
  , /// Inference API model
    #[arg(long, value_name = "MODEL", default_value = "gpt2")]
    inference_model: String
  , /// Use the chat completion endpoint
    #[arg(long)]
    chat: bool
  , /// Compare against this local model instead of the inference API
    #[arg(long, value_name = "MODEL")]
    local_model: Option<String>
  , /// Local model server base URL (defaults to http://localhost:11434)
    #[arg(long, value_name = "URL", requires = "local_model")]
    local_base: Option<String>
  , /// Attempts per provider call
    #[arg(long, default_value_t = 3)]
    max_retries: usize
  , /// Backoff before the second attempt, doubled after every failure
    #[arg(long = "backoff-ms", default_value_t = 500)]
    backoff_ms: u64
  , /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>
  , /// Completion API base URL (also via OPENAI_API_BASE)
    #[arg(long, env = "OPENAI_API_BASE", value_name = "URL")]
    openai_base: Option<String>
  , /// Inference API base URL (also via HUGGINGFACE_API_BASE)
    #[arg(long, env = "HUGGINGFACE_API_BASE", value_name = "URL")]
    huggingface_base: Option<String>
}

impl Cli
{   fn to_config(&self) -> CompareConfig
    {   let mut config = CompareConfig::default();

        let completion_model = match (&self.completion_model, self.chat)
        {   (Some(model), _) => model.clone()
          , (None, true) => DEFAULT_CHAT_MODEL.to_string()
          , (None, false) => config.completion.model.clone()
        };
        config.completion = ProviderConfig
        {   model: completion_model
          , api_base: self.openai_base.clone()
          , timeout_secs: self.timeout_secs
        };
        config.inference = ProviderConfig
        {   model: self.inference_model.clone()
          , api_base: self.huggingface_base.clone()
          , timeout_secs: self.timeout_secs
        };
        config.local = self.local_model.as_ref().map(|model| {
          ProviderConfig
          {   model: model.clone()
            , api_base: self.local_base.clone()
            , timeout_secs: self.timeout_secs
          }
        });
        config.retry.max_retries = self.max_retries;
        config.retry.backoff_base_ms = self.backoff_ms;
        config.use_chat_api = self.chat;
        config
    }
}

#[tokio::main]
async fn main() -> Result<()>
{   env_logger::Builder::from_env(
      env_logger::Env::default().default_filter_or("warn")
    ).init();
    if let Err(e) = dotenvy::dotenv()
    {   log::debug!("No .env loaded: {}", e);
    }

    let cli = Cli::parse();
    let credentials = Credentials::from_env()?;
    let comparator = Comparator::from_config(
      &cli.to_config(),
      &credentials
    )?;

    comparator.compare_and_print(&cli.prompt).await;
    Ok(())
}
