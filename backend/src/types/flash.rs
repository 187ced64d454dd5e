//! One-shot notices carried in the visitor's session

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use strum::Display;
use tower_sessions::Session;

use super::AppError;

/// Session key holding pending notices
const FLASH_SESSION_KEY: &str = "_flashes";

/// Notice severity, used by the front-end for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NoticeLevel {
    /// Operation completed
    Success,
    /// Operation failed or input was rejected
    Error,
}

/// A message shown once on the next rendered page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity
    pub level: NoticeLevel,
    /// Text shown to the visitor
    pub message: String,
}

impl Notice {
    /// A success notice
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// An error notice
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Flash queue of the requesting session
///
/// Notices pushed before a redirect survive until the next page takes them.
#[derive(Debug, Clone)]
pub struct Flash(Session);

impl Flash {
    /// Wraps a session
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    /// Queues a notice for the next rendered page
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store fails
    pub async fn push(&self, notice: Notice) -> Result<(), AppError> {
        let mut pending: Vec<Notice> = self.0.get(FLASH_SESSION_KEY).await?.unwrap_or_default();
        pending.push(notice);
        self.0.insert(FLASH_SESSION_KEY, pending).await?;
        Ok(())
    }

    /// Queues a success notice
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store fails
    pub async fn success(&self, message: impl Into<String>) -> Result<(), AppError> {
        self.push(Notice::success(message)).await
    }

    /// Queues an error notice
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store fails
    pub async fn error(&self, message: impl Into<String>) -> Result<(), AppError> {
        self.push(Notice::error(message)).await
    }

    /// Removes and returns every pending notice
    ///
    /// # Errors
    ///
    /// Returns `AppError::Session` if the session store fails
    pub async fn take(&self) -> Result<Vec<Notice>, AppError> {
        Ok(self
            .0
            .remove::<Vec<Notice>>(FLASH_SESSION_KEY)
            .await?
            .unwrap_or_default())
    }
}

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(Self)
    }
}
