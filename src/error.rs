use thiserror::Error;

/// Errors surfaced by every stage of the brochure pipeline.
///
/// Nothing is recovered internally; each variant terminates the current
/// top-level operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Network or HTTP failure while retrieving a page
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Structured output from the link classifier did not match the schema
    #[error("could not parse link classification: {0}")]
    SchemaParse(String),

    /// A backend/model name the dispatcher does not know
    #[error("unknown model selection: {0}")]
    UnknownSelection(String),

    /// The text-generation call failed (quota, auth, timeout, empty reply)
    #[error("generation failed: {0}")]
    Generation(String),

    /// Invalid or unreadable configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Writing the result out failed
    #[error("output failed: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn fetch(url: &str, reason: impl ToString) -> Self {
        Error::Fetch {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<async_openai::error::OpenAIError> for Error {
    fn from(e: async_openai::error::OpenAIError) -> Self {
        Error::Generation(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
