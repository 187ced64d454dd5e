use axum::Json;
use serde::Serialize;

/// Liveness payload
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    /// Current version of the application
    semver: String,
    /// Commit hash of the current build (if available)
    rev: Option<String>,
}

/// Liveness probe with the running build
///
/// Never touches the book store.
pub async fn handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        semver: env!("CARGO_PKG_VERSION").to_string(),
        rev: option_env!("GIT_REV").map(ToString::to_string),
    })
}
