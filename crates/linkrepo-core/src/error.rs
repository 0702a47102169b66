//! Error types for linkrepo-core

use thiserror::Error;

use crate::sync::TransportError;

/// Result type alias using linkrepo-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in linkrepo-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// An edit, removal or move addressed a position outside the collection
    #[error("Index {index} is out of range for {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    /// An entry's tag or fields do not form a known entry kind
    #[error("Invalid entry variant: {0}")]
    InvalidVariant(String),

    /// A commit was requested while another one is still outstanding
    #[error("A commit is already in progress; try again once it finishes")]
    SyncInProgress,

    /// The remote store rejected or failed a request
    #[error("Could not save changes: {0}")]
    Transport(#[from] TransportError),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Client configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether the failure leaves the session usable and the caller may retry.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::SyncInProgress | Self::Transport(_))
    }
}
