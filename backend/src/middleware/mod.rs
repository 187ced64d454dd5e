/// Administrator session gate
pub mod auth;

pub use auth::{require_admin, AdminToken};
