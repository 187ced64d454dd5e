//! Page models
//!
//! Each page is the data a template needs, serialized as JSON together with the page
//! name and the notices to show.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use catalog_storage::book::Book;
use serde::Serialize;
use strum::Display;

use crate::types::Notice;

/// Pages rendered by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PageName {
    /// Public catalog
    Index,
    /// One book
    BookDetail,
    /// Search results
    Search,
    /// Login form
    Login,
    /// Admin listing
    Admin,
    /// Create form
    AddBook,
    /// Edit form
    EditBook,
}

/// A rendered page: name, pending notices and the page data
#[derive(Debug, Serialize)]
pub struct Page<T> {
    /// Which page this is
    pub page: PageName,
    /// Notices to show once
    pub notices: Vec<Notice>,
    /// Page specific fields, inlined
    #[serde(flatten)]
    pub data: T,
}

impl<T> Page<T> {
    /// Assembles a page
    #[must_use]
    pub const fn new(page: PageName, notices: Vec<Notice>, data: T) -> Self {
        Self {
            page,
            notices,
            data,
        }
    }
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Public catalog listing
#[derive(Debug, Serialize)]
pub struct CatalogData {
    /// Books ordered by title
    #[serde(rename = "libros")]
    pub books: Vec<Book>,
    /// Distinct categories of the listed books
    #[serde(rename = "categorias")]
    pub categories: Vec<String>,
}

/// Search results with the submitted filter echoed back
#[derive(Debug, Serialize)]
pub struct SearchData {
    /// Matching books
    #[serde(rename = "libros")]
    pub books: Vec<Book>,
    /// Submitted text
    pub query: String,
    /// Submitted category
    #[serde(rename = "categoria")]
    pub category: String,
    /// Always the global category set, whatever the filter
    #[serde(rename = "categorias")]
    pub categories: Vec<String>,
}

/// A single book (detail and edit pages)
#[derive(Debug, Serialize)]
pub struct BookData {
    /// The book
    #[serde(rename = "libro")]
    pub book: Book,
}

/// Admin listing, newest first
#[derive(Debug, Serialize)]
pub struct AdminData {
    /// Every book
    #[serde(rename = "libros")]
    pub books: Vec<Book>,
}

/// Pages without data of their own (login, create form)
#[derive(Debug, Serialize)]
pub struct Empty {}
