//! Process-local book store used in development and tests

use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{
    Book, BookFilter, BookOrder, BookRecord, BookStorageError, BookStorageResult, BookStore,
};

/// Book store kept in process memory
///
/// Rows live in insertion order; orderings are applied on read like the hosted store
/// does. Ids are UUID v4 and `created_at` is the insertion time.
#[derive(Debug, Default)]
pub struct InMemoryBookStore {
    books: RwLock<Vec<Book>>,
}

impl InMemoryBookStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted(mut books: Vec<Book>, order: BookOrder) -> Vec<Book> {
        match order {
            BookOrder::TitleAsc => books.sort_by(|a, b| a.title.cmp(&b.title)),
            BookOrder::NewestFirst => {
                // Later inserts win ties on equal timestamps
                books.reverse();
                books.sort_by_key(|book| Reverse(book.created_at));
            }
        }
        books
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn list(&self, order: BookOrder) -> BookStorageResult<Vec<Book>> {
        let books = self.books.read().await.clone();
        Ok(Self::sorted(books, order))
    }

    async fn get_one(&self, id: &str) -> BookStorageResult<Option<Book>> {
        let books = self.books.read().await;
        Ok(books.iter().find(|book| book.id == id).cloned())
    }

    async fn search(&self, filter: &BookFilter) -> BookStorageResult<Vec<Book>> {
        let books = self
            .books
            .read()
            .await
            .iter()
            .filter(|book| filter.matches(book))
            .cloned()
            .collect();
        Ok(Self::sorted(books, BookOrder::TitleAsc))
    }

    async fn categories(&self) -> BookStorageResult<Vec<String>> {
        let books = self.books.read().await;
        Ok(books.iter().map(|book| book.category.clone()).collect())
    }

    async fn insert(&self, record: BookRecord) -> BookStorageResult<Book> {
        let book = Book {
            id: uuid::Uuid::new_v4().to_string(),
            reference: record.reference,
            title: record.title,
            authors: record.authors,
            category: record.category,
            page_count: record.page_count,
            copies_available: record.copies_available,
            image: record.image,
            created_at: Utc::now(),
        };

        self.books.write().await.push(book.clone());
        tracing::debug!(id = %book.id, "Inserted book into memory store");

        Ok(book)
    }

    async fn update(&self, id: &str, record: BookRecord) -> BookStorageResult<()> {
        let mut books = self.books.write().await;
        let book = books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or_else(|| BookStorageError::NotFound(id.to_string()))?;

        book.reference = record.reference;
        book.title = record.title;
        book.authors = record.authors;
        book.category = record.category;
        book.page_count = record.page_count;
        book.copies_available = record.copies_available;
        book.image = record.image;

        Ok(())
    }

    async fn delete(&self, id: &str) -> BookStorageResult<()> {
        self.books.write().await.retain(|book| book.id != id);
        Ok(())
    }
}
