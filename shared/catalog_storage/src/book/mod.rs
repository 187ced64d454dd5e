//! Book storage module for the `libros` collection
//!
//! The hosted store is the source of truth for every book. Nothing here caches rows
//! between calls: each [`BookStore`] method is one round-trip to the backing store.

mod error;
mod memory;
mod postgrest;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, IntoStaticStr};

pub use error::{BookStorageError, BookStorageResult};
pub use memory::InMemoryBookStore;
pub use postgrest::PostgrestBookStore;

/// Default name of the books collection in the hosted store
pub const DEFAULT_TABLE_NAME: &str = "libros";

/// A book row as stored in the `libros` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned identifier (identity column or UUID)
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Free-text reference code
    #[serde(rename = "referencia", default, deserialize_with = "nullable")]
    pub reference: String,
    /// Title, primary sort key
    #[serde(rename = "titulo", default, deserialize_with = "nullable")]
    pub title: String,
    /// Authors as a single free-text field
    #[serde(rename = "autores", default, deserialize_with = "nullable")]
    pub authors: String,
    /// Classification used by the category filter
    #[serde(rename = "categoria", default, deserialize_with = "nullable")]
    pub category: String,
    /// Number of pages
    #[serde(rename = "num_paginas", default, deserialize_with = "nullable")]
    pub page_count: i32,
    /// Copies on the shelf
    #[serde(rename = "cantidad_ejemplares", default, deserialize_with = "nullable")]
    pub copies_available: i32,
    /// Cover as a `data:image/...;base64,...` URI
    #[serde(rename = "imagen_url", default)]
    pub image: Option<String>,
    /// Store-assigned creation timestamp
    pub created_at: DateTime<Utc>,
}

/// The writable fields of a book, sent on insert and on full-replace update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    /// Free-text reference code
    #[serde(rename = "referencia")]
    pub reference: String,
    /// Title
    #[serde(rename = "titulo")]
    pub title: String,
    /// Authors
    #[serde(rename = "autores")]
    pub authors: String,
    /// Category
    #[serde(rename = "categoria")]
    pub category: String,
    /// Number of pages
    #[serde(rename = "num_paginas")]
    pub page_count: i32,
    /// Copies on the shelf
    #[serde(rename = "cantidad_ejemplares")]
    pub copies_available: i32,
    /// Cover data URI, `null` when the book has no cover
    #[serde(rename = "imagen_url")]
    pub image: Option<String>,
}

/// Column names of the `libros` collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, IntoStaticStr)]
pub enum BookColumn {
    /// Primary key
    #[strum(serialize = "id")]
    Id,
    /// Reference code
    #[strum(serialize = "referencia")]
    Reference,
    /// Title
    #[strum(serialize = "titulo")]
    Title,
    /// Authors
    #[strum(serialize = "autores")]
    Authors,
    /// Category
    #[strum(serialize = "categoria")]
    Category,
    /// Creation timestamp
    #[strum(serialize = "created_at")]
    CreatedAt,
}

/// Orderings offered by the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookOrder {
    /// Public catalog: `titulo` ascending
    TitleAsc,
    /// Admin panel: `created_at` descending
    NewestFirst,
}

impl BookOrder {
    /// Column the ordering is applied to
    #[must_use]
    pub const fn column(self) -> BookColumn {
        match self {
            Self::TitleAsc => BookColumn::Title,
            Self::NewestFirst => BookColumn::CreatedAt,
        }
    }

    /// Whether rows come out largest first
    #[must_use]
    pub const fn is_descending(self) -> bool {
        matches!(self, Self::NewestFirst)
    }
}

/// Search filter over the catalog
///
/// `text` matches `titulo`, `autores` or `referencia` case-insensitively by substring
/// (any of the three). `category` requires exact equality on `categoria`. Both
/// constraints apply together when set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    /// Substring searched in title, authors and reference
    pub text: Option<String>,
    /// Exact category
    pub category: Option<String>,
}

impl BookFilter {
    /// Builds a filter from raw query-string values; empty values mean "no constraint"
    #[must_use]
    pub fn new(text: &str, category: &str) -> Self {
        let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_string());
        Self {
            text: non_empty(text),
            category: non_empty(category),
        }
    }

    /// Text columns the free-text query is matched against
    #[must_use]
    pub const fn text_columns() -> [BookColumn; 3] {
        [BookColumn::Title, BookColumn::Authors, BookColumn::Reference]
    }

    /// Evaluates the filter against a book
    #[must_use]
    pub fn matches(&self, book: &Book) -> bool {
        let text_ok = self.text.as_deref().is_none_or(|text| {
            let needle = text.to_lowercase();
            [&book.title, &book.authors, &book.reference]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        });
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|category| book.category == category);

        text_ok && category_ok
    }
}

/// Row-oriented access to the books collection
///
/// Implementations report every failure as a [`BookStorageError`]; callers decide how
/// it is presented.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Every book in the given order
    async fn list(&self, order: BookOrder) -> BookStorageResult<Vec<Book>>;

    /// The single book with `id`, `None` when no row matches
    async fn get_one(&self, id: &str) -> BookStorageResult<Option<Book>>;

    /// Books matching `filter`, ordered by title ascending
    async fn search(&self, filter: &BookFilter) -> BookStorageResult<Vec<Book>>;

    /// The `categoria` value of every book, duplicates included
    async fn categories(&self) -> BookStorageResult<Vec<String>>;

    /// Inserts one book and returns the stored row
    async fn insert(&self, record: BookRecord) -> BookStorageResult<Book>;

    /// Replaces the writable fields of the book with `id`
    async fn update(&self, id: &str, record: BookRecord) -> BookStorageResult<()>;

    /// Deletes the book with `id`; deleting a missing id is not an error
    async fn delete(&self, id: &str) -> BookStorageResult<()>;
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(id) => id,
        RawId::Number(id) => id.to_string(),
    })
}
