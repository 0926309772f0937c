use log::{debug, info};
use std::fmt;
use std::sync::Arc;

use crate::config::{CompareConfig, Credentials};
use crate::providers::{
  ChatCompletionClient, CompletionClient, InferenceClient, LocalClient,
  TextProvider,
};
use crate::request::NormalizedResult;
use crate::retry::{RetryPolicy, Sleeper};

/// Whether two providers agreed on a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict
{   /// Both produced text and the texts are byte-equal
    Same
  , /// Both produced text and the texts differ
    Different
  , /// At least one side produced no text to compare
    Inconclusive
}

impl Verdict
{   /// Exact equality; no case folding or whitespace collapsing
    /// beyond the trim each provider already applied.
    pub fn of(a: &NormalizedResult, b: &NormalizedResult) -> Self
    {   match (a.text(), b.text())
        {   (Some(a), Some(b)) if a == b => Verdict::Same
          , (Some(_), Some(_)) => Verdict::Different
          , _ => Verdict::Inconclusive
        }
    }
}

impl fmt::Display for Verdict
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   match self
        {   Verdict::Same => {
              write!(f, "Both models generated the same response.")
            }
          , Verdict::Different => {
              write!(f, "The models generated different responses.")
            }
          , Verdict::Inconclusive => {
              write!(f,
                "Could not compare: at least one model produced no text."
              )
            }
        }
    }
}

/// One provider's side of a comparison
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderReport
{   pub provider: crate::Provider
  , pub model: String
  , pub result: NormalizedResult
}

impl ProviderReport
{   pub fn describe(&self) -> String
    {   self.result.describe(&self.provider)
    }
}

/// Full outcome of `Comparator::compare`
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison
{   pub prompt: String
  , pub primary: ProviderReport
  , pub secondary: ProviderReport
  , pub verdict: Verdict
}

impl fmt::Display for Comparison
{   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {   writeln!(f, "Prompt: {}", self.prompt)?;
        writeln!(f)?;
        for report in [&self.primary, &self.secondary]
        {   writeln!(f,
              "{} {} Response:",
              report.provider.display_name(),
              report.model
            )?;
            writeln!(f, "{}", report.describe())?;
            writeln!(f)?;
        }
        write!(f, "{}", self.verdict)
    }
}

/// Sends one prompt to two providers and compares the answers
pub struct Comparator
{   primary: Box<dyn TextProvider>
  , secondary: Box<dyn TextProvider>
}

impl Comparator
{   /// Compare any two providers, as given
    pub fn new(
      primary: Box<dyn TextProvider>
    , secondary: Box<dyn TextProvider>
    ) -> Self
    {   Comparator
        {   primary
          , secondary
        }
    }

    /// Completion (or chat) API against the inference API, or
    /// against a local model when one is configured. Both sides
    /// are wrapped in the configured retry policy.
    pub fn from_config(
      config: &CompareConfig
    , credentials: &Credentials
    ) -> Result<Self, crate::error::Error>
    {   Comparator::from_config_with_sleeper(config, credentials, None)
    }

    /// Like `from_config`, with a custom sleeper between attempts
    pub fn from_config_with_sleeper(
      config: &CompareConfig
    , credentials: &Credentials
    , sleeper: Option<Arc<dyn Sleeper>>
    ) -> Result<Self, crate::error::Error>
    {   config.validate()?;
        let policy = RetryPolicy::from(&config.retry);
        debug!("Building comparator with {:?}", policy);

        let primary: Box<dyn TextProvider> = if config.use_chat_api
        {   Box::new(ChatCompletionClient::new(
              credentials.openai_api_key(),
              &config.completion,
              config.generation.clone()
            )?)
        } else
        {   Box::new(CompletionClient::new(
              credentials.openai_api_key(),
              &config.completion,
              config.generation.clone()
            )?)
        };
        let secondary: Box<dyn TextProvider> = match &config.local
        {   Some(local) => Box::new(
              LocalClient::new(local, &config.generation)?
            )
          , None => Box::new(InferenceClient::new(
              credentials.huggingface_api_key(),
              &config.inference
            )?)
        };

        let mut primary = primary.with_retry(policy.clone());
        let mut secondary = secondary.with_retry(policy);
        if let Some(sleeper) = sleeper
        {   primary = primary.with_sleeper(Arc::clone(&sleeper));
            secondary = secondary.with_sleeper(sleeper);
        }

        Ok(Comparator::new(Box::new(primary), Box::new(secondary)))
    }

    /// Query both providers, one after the other.
    /// Never fails: provider errors land in the report.
    pub async fn compare(&self, prompt: &str) -> Comparison
    {   debug!("Comparing providers for prompt: {}", prompt);

        let primary = ProviderReport
        {   provider: self.primary.provider()
          , model: self.primary.model().to_string()
          , result: self.primary.generate(prompt).await.into()
        };
        let secondary = ProviderReport
        {   provider: self.secondary.provider()
          , model: self.secondary.model().to_string()
          , result: self.secondary.generate(prompt).await.into()
        };

        let verdict = Verdict::of(&primary.result, &secondary.result);
        info!("Comparison verdict: {:?}", verdict);

        Comparison
        {   prompt: prompt.to_string()
          , primary
          , secondary
          , verdict
        }
    }

    /// `compare`, then print the prompt, both responses and
    /// the verdict to stdout.
    pub async fn compare_and_print(&self, prompt: &str) -> Comparison
    {   let comparison = self.compare(prompt).await;
        println!("{}", comparison);
        comparison
    }
}
