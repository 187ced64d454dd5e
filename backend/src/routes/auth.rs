use std::sync::Arc;

use axum::{
    extract::rejection::FormRejection,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::{
    middleware::auth::{sign_in, sign_out},
    pages::{Empty, Page, PageName},
    types::{AppConfig, AppError, Flash, Notice},
};

/// Credentials posted by the login form
#[derive(Deserialize)]
pub struct LoginForm {
    /// Submitted user name
    #[serde(default)]
    pub username: String,
    /// Submitted password
    #[serde(default)]
    pub password: String,
}

/// Login form
pub async fn login_page(flash: Flash) -> Result<Page<Empty>, AppError> {
    Ok(Page::new(PageName::Login, flash.take().await?, Empty {}))
}

/// Checks the submitted credentials against the configured administrator
///
/// On success the session is marked as authenticated and the visitor lands on the admin
/// listing. On failure the session is left untouched and the form is shown again with
/// a notice that does not say which field was wrong. A body that is not a readable
/// form is a failed attempt too.
#[instrument(skip_all)]
pub async fn login(
    Extension(config): Extension<Arc<AppConfig>>,
    session: Session,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Response, AppError> {
    let flash = Flash::new(session.clone());
    let accepted = match form {
        Ok(Form(form)) => config.admin.matches(&form.username, &form.password),
        Err(rejection) => {
            warn!(%rejection, "Unreadable login form");
            false
        }
    };

    if accepted {
        sign_in(&session).await?;
        flash.success("Inicio de sesión exitoso").await?;
        info!("Administrator signed in");
        return Ok(Redirect::to("/admin").into_response());
    }

    warn!("Rejected administrator login");
    let mut notices = flash.take().await?;
    notices.push(Notice::error("Usuario o contraseña incorrectos"));
    Ok(Page::new(PageName::Login, notices, Empty {}).into_response())
}

/// Clears the administrator flag, whether or not it was set
#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    sign_out(&session).await?;
    Flash::new(session)
        .success("Sesión cerrada correctamente")
        .await?;
    Ok(Redirect::to("/"))
}
