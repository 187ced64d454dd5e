//! Catalog storage for the Biblioteca service
//!
//! This crate owns the `libros` collection: the book entity, the query vocabulary
//! understood by the hosted store, and the [`book::BookStore`] implementations used by
//! the backend (a `PostgREST` client and a process-local store).

pub mod book;
