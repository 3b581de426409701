//! CLI error type.

use fgmodule::PackageError;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Packaging failed.
    #[error(transparent)]
    Package(#[from] PackageError),

    /// Invalid combination of arguments or config values.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Writing command output failed.
    #[error("Failed to write output: {0}")]
    Output(String),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Package(e) if e.is_config_error() => 2,
            CliError::Config(_) => 2,
            CliError::Package(_) | CliError::Output(_) => 1,
        }
    }
}
