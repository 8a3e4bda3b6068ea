use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all depdump operations.
#[derive(Debug, Error, Diagnostic)]
pub enum DumpError {
    /// I/O operation failed (e.g. unwritable output).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be encoded or decoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The resolution snapshot is unreadable, malformed or not closed.
    #[error("Invalid resolution snapshot: {message}")]
    #[diagnostic(help(
        "Declare every `selected` id once under `components` and every group name once"
    ))]
    Snapshot { message: String },

    /// Invalid or malformed configuration (e.g. depdump.toml).
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check your depdump.toml for syntax errors"))]
    Config { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type DumpResult<T> = miette::Result<T>;
