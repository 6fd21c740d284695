// src/error.rs
use thiserror::Error;

use crate::config::ConfigError;
use crate::technitium::ClientError;
use crate::validation::ValidationError;

/// Diagnostic surfaced by a resource or data source.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A client call failed. `summary` names the operation, e.g.
    /// "Could not create DHCP scope LAN".
    #[error("{summary}: {source}")]
    Client {
        summary: String,
        #[source]
        source: ClientError,
    },

    #[error("invalid value: {0}")]
    Validation(#[from] ValidationError),

    #[error("provider configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("not found: {0}")]
    NotFound(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

impl ProviderError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        ProviderError::NotFound(msg.into())
    }

    /// Underlying client failure, if any.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            ProviderError::Client { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Attach an operation summary to a client result.
pub trait Summarize<T> {
    fn summarize<F: FnOnce() -> String>(self, summary: F) -> ProviderResult<T>;
}

impl<T> Summarize<T> for Result<T, ClientError> {
    fn summarize<F: FnOnce() -> String>(self, summary: F) -> ProviderResult<T> {
        self.map_err(|source| ProviderError::Client {
            summary: summary(),
            source,
        })
    }
}
