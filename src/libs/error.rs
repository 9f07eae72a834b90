//! Error types shared by the API clients and the synchronisation workflow.
//!
//! Every layer below the command line returns [`Error`]. Commands wrap it with
//! `anyhow` context and the binary prints the final chain before exiting with
//! status 1.

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A required configuration key has no value.
    #[error("{0} not set")]
    ConfigMissing(&'static str),

    /// The request never produced a response.
    #[error("{context}. Error: '{source}'")]
    Transport {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with an unexpected status code.
    #[error("{context}. HTTP status code: {}", .status.as_u16())]
    Status { context: String, status: StatusCode },

    /// The response body did not have the expected shape.
    #[error("{context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Data is present but unusable (bad dates, missing work type, ...).
    #[error("{0}")]
    Validation(String),

    /// A lookup by name or id returned nothing.
    #[error("{0}")]
    NotFound(String),

    /// Terminal interaction failed.
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// Template parsing or rendering failed.
    #[error("{0}")]
    Template(String),

    /// Failure while processing a single time entry.
    #[error("{context}\nError: {source}")]
    Entry {
        context: String,
        #[source]
        source: Box<Error>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn entry(context: impl Into<String>, source: Error) -> Self {
        Self::Entry {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Self::Prompt(err.to_string())
    }
}
