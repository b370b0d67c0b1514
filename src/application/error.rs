//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::application::format::Format;
use crate::domain::{DomainError, NodeKind};

/// Application errors wrap domain errors and add codec and I/O context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("cannot decode {format} input: {source}")]
    Decode {
        format: Format,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("cannot encode {format} output: {source}")]
    Encode {
        format: Format,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("unknown format: {0:?}")]
    UnknownFormat(String),

    #[error("{role} document is a {kind}, expected a mapping")]
    NotAMapping { role: &'static str, kind: NodeKind },

    #[error("unable to set {key}={value}: {source}")]
    SetFailed {
        key: String,
        value: String,
        #[source]
        source: DomainError,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
