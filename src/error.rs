use std::fmt;

/// Custom error type for provider calls and comparisons
/// Implements Clone so a failure can be kept inside a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// One or more required credentials are unset or empty
    MissingCredentials(Vec<String>)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Transport-level failure (connect, DNS, reset)
    Http(String)
  , /// Request exceeded the configured timeout
    Timeout
  , /// API answered with a non-2xx status
    Api
    {   status: u16
      , body: String
    }
  , /// Response body was not the JSON we asked for
    Parse(String)
  , /// Every attempt failed with a transient error
    RetriesExhausted
    {   attempts: usize
      , last: Box<Error>
    }
  , /// Generic error
    Other(String)
}

impl Error
{   /// Whether retrying the same request may succeed.
    /// Transport failures, timeouts and non-2xx statuses are
    /// transient; parse and configuration errors are not.
    pub fn is_transient(&self) -> bool
    {   matches!(
          self,
          Error::Http(_) | Error::Timeout | Error::Api { .. }
        )
    }

    /// The error that ended the call, looking through
    /// retry exhaustion.
    pub fn root(&self) -> &Error
    {   match self
        {   Error::RetriesExhausted { last, .. } => last.root()
          , other => other
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingCredentials(names) => {
              write!(f,
                "Missing API keys: {}. Please check your environment variables.",
                names.join(", ")
              )
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Http(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::Timeout => {
              write!(f, "Request timed out")
            }
          , Error::Api { status, body } => {
              write!(f, "API error (HTTP {}): {}", status, body)
            }
          , Error::Parse(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::RetriesExhausted { attempts, last } => {
              write!(f,
                "giving up after {} attempts: {}",
                attempts, last
              )
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   if e.is_timeout()
        {   return Error::Timeout;
        }
        match e.status()
        {   Some(status) => Error::Api
            {   status: status.as_u16()
              , body: e.to_string()
            }
          , None if e.is_decode() => Error::Parse(e.to_string())
          , None => Error::Http(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::Parse(e.to_string())
    }
}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
