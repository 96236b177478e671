//! CLI error types.

use forge_core::ForgeError;
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Setup failed before any probing started.
    #[error(transparent)]
    Forge(#[from] ForgeError),

    /// Writing output failed.
    #[error("failed writing output: {0}")]
    Output(#[from] std::io::Error),
}
