use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::types::AppError;

/// Session key holding the administrator flag
pub const ADMIN_SESSION_KEY: &str = "admin_logged_in";

/// Where unauthenticated visitors are sent
pub const LOGIN_PATH: &str = "/login";

/// Capability proving the request comes from an authenticated administrator
///
/// Only [`authorize`] creates it, and only [`require_admin`] puts it in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminToken(());

/// Grants the admin capability when the session flag is set
#[must_use]
pub const fn authorize(admin_flag: Option<bool>) -> Option<AdminToken> {
    match admin_flag {
        Some(true) => Some(AdminToken(())),
        _ => None,
    }
}

/// Axum extractor for the admin capability
///
/// Use it in admin handlers so they can only run behind [`require_admin`]:
/// ```ignore
/// async fn admin_handler(_admin: AdminToken) -> impl IntoResponse {
///     "Admin content"
/// }
/// ```
impl<S> FromRequestParts<S> for AdminToken
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .copied()
            .ok_or_else(|| Redirect::to(LOGIN_PATH))
    }
}

/// Admin gate middleware
///
/// This middleware:
/// 1. Reads the administrator flag from the session
/// 2. Adds `AdminToken` to request extensions when it is set
/// 3. Otherwise redirects to the login page without running the handler
pub async fn require_admin(session: Session, mut request: Request, next: Next) -> Response {
    let flag = session
        .get::<bool>(ADMIN_SESSION_KEY)
        .await
        .unwrap_or_else(|err| {
            AppError::from(err).log();
            None
        });

    match authorize(flag) {
        Some(token) => {
            request.extensions_mut().insert(token);
            next.run(request).await
        }
        None => {
            tracing::debug!(path = %request.uri().path(), "Admin route without session");
            Redirect::to(LOGIN_PATH).into_response()
        }
    }
}

/// Marks the session as authenticated, rotating its id
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails
pub async fn sign_in(session: &Session) -> Result<(), AppError> {
    session.cycle_id().await?;
    session.insert(ADMIN_SESSION_KEY, true).await?;
    Ok(())
}

/// Clears the administrator flag; other session data (pending notices) is kept
///
/// # Errors
///
/// Returns `AppError::Session` if the session store fails
pub async fn sign_out(session: &Session) -> Result<(), AppError> {
    session.remove::<bool>(ADMIN_SESSION_KEY).await?;
    Ok(())
}
