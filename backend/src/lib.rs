//! Biblioteca: book catalog service with a single-administrator back office

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// Shaping of store results for the pages
pub mod catalog;

/// Cover image handling
pub mod images;

/// Request middleware
pub mod middleware;

/// Page models
pub mod pages;

/// Route handlers
pub mod routes;

/// Server setup
pub mod server;

/// Session storage
pub mod sessions;

/// Shared types
pub mod types;
