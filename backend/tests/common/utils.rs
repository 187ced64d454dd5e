use async_trait::async_trait;
use axum::{http::header, response::Response};
use catalog_storage::book::{
    Book, BookFilter, BookOrder, BookRecord, BookStorageError, BookStorageResult, BookStore,
};
use http_body_util::BodyExt;
use uuid::Uuid;

/// A file part for a multipart body: field name, file name, content
pub type MultipartFile<'a> = (&'a str, &'a str, &'a [u8]);

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Redirect target, if any
pub fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .map(|value| value.to_str().unwrap())
}

/// Messages of the notices on a rendered page
pub fn notice_messages(page: &serde_json::Value) -> Vec<String> {
    page["notices"]
        .as_array()
        .unwrap()
        .iter()
        .map(|notice| notice["message"].as_str().unwrap().to_string())
        .collect()
}

/// Titles of the books on a rendered page, in order
pub fn titles(page: &serde_json::Value) -> Vec<String> {
    page["libros"]
        .as_array()
        .unwrap()
        .iter()
        .map(|book| book["titulo"].as_str().unwrap().to_string())
        .collect()
}

/// Encodes a `multipart/form-data` body, returning the content type and the bytes
pub fn multipart_body(fields: &[(&str, &str)], file: Option<MultipartFile<'_>>) -> (String, Vec<u8>) {
    let boundary = format!("----biblioteca-{}", Uuid::new_v4().simple());
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((name, filename, content)) = file {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={boundary}"), body)
}

/// Form fields of a complete, valid book
pub fn book_fields<'a>(title: &'a str, category: &'a str) -> Vec<(&'a str, &'a str)> {
    vec![
        ("referencia", "REF-001"),
        ("titulo", title),
        ("autores", "Gabriel García Márquez"),
        ("categoria", category),
        ("num_paginas", "417"),
        ("cantidad_ejemplares", "3"),
    ]
}

/// A record ready to be inserted straight into a store
pub fn book_record(title: &str, authors: &str, reference: &str, category: &str) -> BookRecord {
    BookRecord {
        reference: reference.to_string(),
        title: title.to_string(),
        authors: authors.to_string(),
        category: category.to_string(),
        page_count: 200,
        copies_available: 2,
        image: None,
    }
}

/// A store whose every call fails as if the hosted service were down
pub struct FailingBookStore;

fn unavailable<T>() -> BookStorageResult<T> {
    Err(BookStorageError::UpstreamError {
        status: 503,
        message: "service unavailable".to_string(),
    })
}

#[async_trait]
impl BookStore for FailingBookStore {
    async fn list(&self, _order: BookOrder) -> BookStorageResult<Vec<Book>> {
        unavailable()
    }

    async fn get_one(&self, _id: &str) -> BookStorageResult<Option<Book>> {
        unavailable()
    }

    async fn search(&self, _filter: &BookFilter) -> BookStorageResult<Vec<Book>> {
        unavailable()
    }

    async fn categories(&self) -> BookStorageResult<Vec<String>> {
        unavailable()
    }

    async fn insert(&self, _record: BookRecord) -> BookStorageResult<Book> {
        unavailable()
    }

    async fn update(&self, _id: &str, _record: BookRecord) -> BookStorageResult<()> {
        unavailable()
    }

    async fn delete(&self, _id: &str) -> BookStorageResult<()> {
        unavailable()
    }
}
