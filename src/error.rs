//! Error types for the session data store.

use sea_orm::{DbErr, SqlErr};

use crate::codec::CodecError;

/// Errors raised by [`SessionDataStore`](crate::SessionDataStore) operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Missing or invalid schema names, detected before any statement runs.
    #[error("invalid store configuration: {0}")]
    Config(String),

    /// The attribute blob of a stored session could not be decoded.
    #[error("unreadable session {id} for context {context}")]
    Unreadable {
        id: String,
        context: String,
        #[source]
        source: CodecError,
    },

    /// The session exhausted its load attempts and is no longer read from the database.
    #[error("unreadable session {id} for context {context} (permanently quarantined)")]
    Quarantined { id: String, context: String },

    /// Session attributes could not be encoded for storage.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Connectivity or SQL failure reported by the backing store.
    #[error("database error: {0}")]
    Backend(#[from] DbErr),
}

impl StoreError {
    /// Whether this error means the session data exists but cannot be used.
    ///
    /// Callers usually treat such a session as absent while logging it apart
    /// from a genuine miss.
    pub fn is_unreadable(&self) -> bool {
        matches!(self, Self::Unreadable { .. } | Self::Quarantined { .. })
    }

    /// Whether an insert hit an existing row with the same key.
    pub fn is_duplicate_key(&self) -> bool {
        match self {
            Self::Backend(e) => matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))),
            _ => false,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, StoreError>;
