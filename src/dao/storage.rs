use std::error::Error;
use thiserror::Error;

use crate::dao::query::Table;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    #[error("cannot encode row for `{}`", table.name())]
    Encode {
        table: Table,
        #[source]
        source: serde_json::Error,
    },
    #[error("unexpected row in `{}`", table.name())]
    Decode {
        table: Table,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct an encode error for a row of `table`.
    pub fn encode(table: Table, source: serde_json::Error) -> Self {
        StorageError::Encode { table, source }
    }

    /// Construct a decode error for a row of `table`.
    pub fn decode(table: Table, source: serde_json::Error) -> Self {
        StorageError::Decode { table, source }
    }
}
