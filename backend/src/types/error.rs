//! Error kinds shared by the route handlers
//!
//! Handlers decide how each kind is presented (notice text and redirect target). This
//! module only knows how to log a kind and what detail is safe to show to the visitor.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use catalog_storage::book::BookStorageError;
use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// The requested book does not exist
    #[error("Libro no encontrado")]
    NotFound,

    /// Submitted form data is malformed
    #[error("{0}")]
    Validation(String),

    /// The request body could not be read as a multipart form
    #[error("Upload error: {0}")]
    Upload(#[from] MultipartError),

    /// The book store call failed
    #[error("Book store error: {0}")]
    Storage(BookStorageError),

    /// The session store failed
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

impl From<BookStorageError> for AppError {
    fn from(err: BookStorageError) -> Self {
        match err {
            BookStorageError::NotFound(_) => Self::NotFound,
            err => Self::Storage(err),
        }
    }
}

impl AppError {
    /// Logs the error server-side, `warn` for visitor mistakes and `error` for failures
    pub fn log(&self) {
        match self {
            Self::NotFound | Self::Validation(_) | Self::Upload(_) => {
                tracing::warn!("Client error: {self}");
            }
            Self::Storage(_) | Self::Session(_) => tracing::error!("Server error: {self}"),
        }
    }

    /// Detail that can be shown in a notice
    ///
    /// Store and session failures are reduced to a generic sentence.
    #[must_use]
    pub fn public_detail(&self) -> String {
        match self {
            Self::NotFound | Self::Validation(_) => self.to_string(),
            Self::Upload(err) => err.body_text(),
            Self::Storage(_) | Self::Session(_) => {
                "el catálogo no está disponible en este momento".to_string()
            }
        }
    }

    /// Status for errors that must end the request instead of becoming a notice
    #[must_use]
    pub fn rejection_status(&self) -> Option<StatusCode> {
        match self {
            Self::Upload(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                Some(StatusCode::PAYLOAD_TOO_LARGE)
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        let status = match &self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upload(err) => err.status(),
            Self::Storage(_) | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, self.public_detail()).into_response()
    }
}
