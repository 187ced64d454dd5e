//! Error types for book storage operations

use thiserror::Error;

/// Result type alias for storage operations
pub type BookStorageResult<T> = Result<T, BookStorageError>;

/// Storage error types for book operations
#[derive(Debug, Error)]
pub enum BookStorageError {
    /// The store client could not be built from the given settings
    #[error("Invalid store configuration: {0}")]
    ConfigError(String),

    /// The request never produced a response (connect, TLS, timeout)
    #[error("Failed to reach the book store: {0}")]
    TransportError(#[from] reqwest::Error),

    /// The request failed inside the client middleware stack
    #[error("Book store request failed: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),

    /// The store answered with a non-success status
    #[error("Book store returned {status}: {message}")]
    UpstreamError {
        /// HTTP status returned by the store
        status: u16,
        /// Body of the error response
        message: String,
    },

    /// A row could not be decoded into a book
    #[error("Failed to parse book: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A lookup by id matched more than one row
    #[error("Expected exactly one book with id {id}, found {count}")]
    UnexpectedRowCount {
        /// Requested id
        id: String,
        /// Number of rows returned
        count: usize,
    },

    /// An update targeted an id that does not exist
    #[error("Book not found: {0}")]
    NotFound(String),
}
