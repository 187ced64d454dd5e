/// Back office
pub mod admin;
/// Login and logout
pub mod auth;
/// Public catalog pages
pub mod catalog;
/// Liveness probe
pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::middleware::require_admin;

/// Creates the router with all handler routes
pub fn handler() -> Router {
    let public_routes = Router::new()
        .route("/", get(catalog::index))
        .route("/libro/{id}", get(catalog::book_detail))
        .route("/buscar", get(catalog::search))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/health", get(health::handler));

    let admin_routes = Router::new()
        .route("/admin", get(admin::panel))
        .route(
            "/admin/agregar",
            get(admin::add_book_page).post(admin::add_book),
        )
        .route(
            "/admin/editar/{id}",
            get(admin::edit_book_page).post(admin::edit_book),
        )
        .route("/admin/eliminar/{id}", post(admin::delete_book))
        .layer(middleware::from_fn(require_admin));

    public_routes.merge(admin_routes)
}
