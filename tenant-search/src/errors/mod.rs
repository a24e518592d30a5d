//! Error types for the tenant search CLI.

use tenant_search_repository::SearchFacadeError;
use thiserror::Error;

/// Errors that can occur while running a CLI command.
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A command argument could not be parsed.
    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument { argument: String, reason: String },

    /// The search operation failed.
    #[error(transparent)]
    Search(#[from] SearchFacadeError),

    /// The result could not be rendered.
    #[error("Output error: {0}")]
    OutputError(String),
}

impl CliError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(argument: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an output error.
    pub fn output(msg: impl Into<String>) -> Self {
        Self::OutputError(msg.into())
    }

    /// The underlying search error, if any.
    pub fn search_error(&self) -> Option<&SearchFacadeError> {
        match self {
            Self::Search(e) => Some(e),
            _ => None,
        }
    }
}
