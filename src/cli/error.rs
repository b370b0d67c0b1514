//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => exitcode::USAGE,
            CliError::Infra(InfraError::Io { source, .. }) => io_exit_code(source.kind()),
            CliError::Infra(InfraError::Application(e)) => application_exit_code(e),
        }
    }
}

fn io_exit_code(kind: std::io::ErrorKind) -> i32 {
    match kind {
        std::io::ErrorKind::NotFound => exitcode::NOINPUT,
        std::io::ErrorKind::PermissionDenied => exitcode::CANTCREAT,
        _ => exitcode::IOERR,
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Domain(_)
        | ApplicationError::SetFailed { .. }
        | ApplicationError::Decode { .. }
        | ApplicationError::Encode { .. }
        | ApplicationError::NotAMapping { .. } => exitcode::DATAERR,
        ApplicationError::UnknownFormat(_) => exitcode::USAGE,
        ApplicationError::Config { .. } => exitcode::CONFIG,
        ApplicationError::Io { source, .. } => io_exit_code(source.kind()),
    }
}
