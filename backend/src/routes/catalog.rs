use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Path, Query},
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use catalog_storage::book::{BookFilter, BookOrder, BookStorageError, BookStore};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::{
    catalog::{distinct_categories, or_empty},
    pages::{BookData, CatalogData, Page, PageName, SearchData},
    types::{AppError, Flash},
};

/// Query string of `/buscar`
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    /// Free text matched against title, authors and reference
    #[serde(default)]
    pub q: String,
    /// Exact category
    #[serde(default, rename = "categoria")]
    pub category: String,
}

/// Public catalog, ordered by title
///
/// A store failure is logged and the page is shown empty.
#[instrument(skip_all)]
pub async fn index(
    Extension(store): Extension<Arc<dyn BookStore>>,
    flash: Flash,
) -> Result<Page<CatalogData>, AppError> {
    let books = or_empty(store.list(BookOrder::TitleAsc).await);
    let categories = distinct_categories(books.iter().map(|book| book.category.clone()));

    Ok(Page::new(
        PageName::Index,
        flash.take().await?,
        CatalogData { books, categories },
    ))
}

/// Detail page of one book
///
/// A missing id or a store failure sends the visitor back to the catalog with a notice.
#[instrument(skip(store, flash))]
pub async fn book_detail(
    Path(id): Path<String>,
    Extension(store): Extension<Arc<dyn BookStore>>,
    flash: Flash,
) -> Result<Response, AppError> {
    let book = store
        .get_one(&id)
        .await
        .map_err(AppError::from)
        .and_then(|book| book.ok_or(AppError::NotFound));

    match book {
        Ok(book) => {
            let notices = flash.take().await?;
            Ok(Page::new(PageName::BookDetail, notices, BookData { book }).into_response())
        }
        Err(err) => {
            err.log();
            flash.error("Libro no encontrado").await?;
            Ok(Redirect::to("/").into_response())
        }
    }
}

/// Search results
///
/// Text and category constraints are combined; the category list offered next to the
/// results is always the full one. On failure the page is empty but still echoes the
/// submitted filter. A query string that cannot be read counts as an empty search.
#[instrument(skip(store, flash))]
pub async fn search(
    params: Result<Query<SearchParams>, QueryRejection>,
    Extension(store): Extension<Arc<dyn BookStore>>,
    flash: Flash,
) -> Result<Page<SearchData>, AppError> {
    let params = params.map_or_else(
        |rejection| {
            warn!(%rejection, "Unreadable search query, searching without filters");
            SearchParams::default()
        },
        |Query(params)| params,
    );
    let filter = BookFilter::new(&params.q, &params.category);

    let results = async {
        let books = store.search(&filter).await?;
        let categories = distinct_categories(store.categories().await?);
        Ok::<_, BookStorageError>((books, categories))
    }
    .await;
    let (books, categories) = or_empty(results);

    Ok(Page::new(
        PageName::Search,
        flash.take().await?,
        SearchData {
            books,
            query: params.q,
            category: params.category,
            categories,
        },
    ))
}
