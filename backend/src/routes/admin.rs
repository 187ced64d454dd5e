use std::sync::Arc;

use axum::{
    extract::Path,
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use catalog_storage::book::{Book, BookOrder, BookStore};
use tracing::{info, instrument};

use crate::{
    catalog::or_empty,
    middleware::AdminToken,
    pages::{AdminData, BookData, Empty, Page, PageName},
    types::{AppError, BookSubmission, Flash, Notice},
};

const ADMIN_PATH: &str = "/admin";

/// Admin listing, newest first
#[instrument(skip_all)]
pub async fn panel(
    _admin: AdminToken,
    Extension(store): Extension<Arc<dyn BookStore>>,
    flash: Flash,
) -> Result<Page<AdminData>, AppError> {
    let books = or_empty(store.list(BookOrder::NewestFirst).await);

    Ok(Page::new(
        PageName::Admin,
        flash.take().await?,
        AdminData { books },
    ))
}

/// Create form
pub async fn add_book_page(_admin: AdminToken, flash: Flash) -> Result<Page<Empty>, AppError> {
    Ok(Page::new(PageName::AddBook, flash.take().await?, Empty {}))
}

/// Creates a book from the submitted form
///
/// On failure the create form is shown again with the reason; nothing is written.
#[instrument(skip_all)]
pub async fn add_book(
    _admin: AdminToken,
    Extension(store): Extension<Arc<dyn BookStore>>,
    flash: Flash,
    submission: Result<BookSubmission, AppError>,
) -> Result<Response, AppError> {
    let result = match submission {
        Ok(submission) => store
            .insert(submission.into_record(None))
            .await
            .map_err(AppError::from),
        Err(err) => Err(err),
    };

    match result {
        Ok(book) => {
            info!(id = %book.id, "Book created");
            flash.success("Libro agregado exitosamente").await?;
            Ok(Redirect::to(ADMIN_PATH).into_response())
        }
        Err(err) => {
            err.log();
            if let Some(status) = err.rejection_status() {
                return Ok((status, err.public_detail()).into_response());
            }

            let mut notices = flash.take().await?;
            notices.push(Notice::error(format!(
                "Error al agregar libro: {}",
                err.public_detail()
            )));
            Ok(Page::new(PageName::AddBook, notices, Empty {}).into_response())
        }
    }
}

/// Edit form, prefilled with the stored row
#[instrument(skip(store, flash))]
pub async fn edit_book_page(
    _admin: AdminToken,
    Path(id): Path<String>,
    Extension(store): Extension<Arc<dyn BookStore>>,
    flash: Flash,
) -> Result<Response, AppError> {
    match fetch(store.as_ref(), &id).await {
        Ok(book) => {
            let notices = flash.take().await?;
            Ok(Page::new(PageName::EditBook, notices, BookData { book }).into_response())
        }
        Err(err) => {
            err.log();
            flash.error("Error al editar libro").await?;
            Ok(Redirect::to(ADMIN_PATH).into_response())
        }
    }
}

/// Replaces the listed fields of a book
///
/// The stored cover is kept unless a new file of an accepted type is sent. A rejected
/// form shows the edit page again with the stored row; a missing book or a store
/// failure goes back to the listing.
#[instrument(skip(store, flash, submission))]
pub async fn edit_book(
    _admin: AdminToken,
    Path(id): Path<String>,
    Extension(store): Extension<Arc<dyn BookStore>>,
    flash: Flash,
    submission: Result<BookSubmission, AppError>,
) -> Result<Response, AppError> {
    let submission = match submission {
        Ok(submission) => submission,
        Err(err) => {
            err.log();
            if let Some(status) = err.rejection_status() {
                return Ok((status, err.public_detail()).into_response());
            }
            return invalid_edit(store.as_ref(), &id, &flash, &err).await;
        }
    };

    let result = async {
        let current = fetch(store.as_ref(), &id).await?;
        store
            .update(&id, submission.into_record(current.image))
            .await?;
        Ok::<_, AppError>(())
    }
    .await;

    match result {
        Ok(()) => {
            info!("Book updated");
            flash.success("Libro actualizado exitosamente").await?;
        }
        Err(err) => {
            err.log();
            flash
                .error(format!(
                    "Error al actualizar libro: {}",
                    err.public_detail()
                ))
                .await?;
        }
    }

    Ok(Redirect::to(ADMIN_PATH).into_response())
}

/// Deletes a book; an unknown id counts as deleted
#[instrument(skip(store, flash))]
pub async fn delete_book(
    _admin: AdminToken,
    Path(id): Path<String>,
    Extension(store): Extension<Arc<dyn BookStore>>,
    flash: Flash,
) -> Result<Redirect, AppError> {
    match store.delete(&id).await {
        Ok(()) => {
            info!("Book deleted");
            flash.success("Libro eliminado exitosamente").await?;
        }
        Err(err) => {
            AppError::from(err).log();
            flash.error("Error al eliminar libro").await?;
        }
    }

    Ok(Redirect::to(ADMIN_PATH))
}

async fn fetch(store: &dyn BookStore, id: &str) -> Result<Book, AppError> {
    store.get_one(id).await?.ok_or(AppError::NotFound)
}

/// Shows the edit page again with the stored row and the rejection reason
async fn invalid_edit(
    store: &dyn BookStore,
    id: &str,
    flash: &Flash,
    err: &AppError,
) -> Result<Response, AppError> {
    let notice = format!("Error al actualizar libro: {}", err.public_detail());

    match fetch(store, id).await {
        Ok(book) => {
            let mut notices = flash.take().await?;
            notices.push(Notice::error(notice));
            Ok(Page::new(PageName::EditBook, notices, BookData { book }).into_response())
        }
        Err(fetch_err) => {
            fetch_err.log();
            flash.error("Error al editar libro").await?;
            Ok(Redirect::to(ADMIN_PATH).into_response())
        }
    }
}
