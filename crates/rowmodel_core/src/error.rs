//! Error types for rowmodel.

use crate::database::Slot;
use thiserror::Error;

/// Result type for rowmodel operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in rowmodel operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The configuration passed at construction is malformed.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what is missing or malformed.
        message: String,
    },

    /// `connect()` was called on a handle constructed without a config.
    #[error("no config was supplied at construction, cannot connect")]
    MissingConfig,

    /// The handle was used before a successful `connect()`.
    #[error("the database is not connected, call connect() first")]
    NotConnected,

    /// No database was ever registered under the slot.
    #[error("no database registered in the {slot} slot")]
    NotRegistered {
        /// The slot that was looked up.
        slot: Slot,
    },

    /// The configured adapter cannot be opened by this driver.
    #[error("unsupported adapter: {adapter}")]
    UnsupportedAdapter {
        /// The adapter name from the active environment.
        adapter: String,
    },

    /// A single-key operation was invoked on a composite-key model.
    #[error("{operation} requires a single-column primary key, use the where-based variant instead")]
    CompositeKey {
        /// The operation that was misused.
        operation: &'static str,
    },

    /// A table or column identifier failed allow-list validation.
    #[error("invalid {kind} identifier: {ident}")]
    InvalidIdentifier {
        /// Identifier kind (`table`, `column`).
        kind: &'static str,
        /// The offending identifier.
        ident: String,
    },

    /// Driver-level error, propagated as-is.
    #[error("driver error: {0}")]
    Driver(#[from] rusqlite::Error),
}

impl CoreError {
    /// Creates an invalid config error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Creates an unsupported adapter error.
    pub fn unsupported_adapter(adapter: impl Into<String>) -> Self {
        Self::UnsupportedAdapter {
            adapter: adapter.into(),
        }
    }

    /// Creates a composite key misuse error.
    pub const fn composite_key(operation: &'static str) -> Self {
        Self::CompositeKey { operation }
    }

    /// Creates an invalid identifier error.
    pub fn invalid_identifier(kind: &'static str, ident: impl Into<String>) -> Self {
        Self::InvalidIdentifier {
            kind,
            ident: ident.into(),
        }
    }
}
