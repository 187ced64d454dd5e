//! Custom extractors for form submissions

use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
};
use catalog_storage::book::BookRecord;
use validator::{Validate, ValidationError};

use crate::{images, types::AppError};

/// Multipart field carrying the cover file
const IMAGE_FIELD: &str = "imagen";

/// A file received in the cover field
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Name given by the browser
    pub filename: String,
    /// Raw file content
    pub bytes: Bytes,
}

impl UploadedImage {
    /// The cover as a data URI, `None` when the file type is not accepted
    #[must_use]
    pub fn to_data_uri(&self) -> Option<String> {
        images::to_data_uri(&self.filename, &self.bytes)
    }
}

/// Book fields after parsing, before they reach the store
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct BookDraft {
    /// Catalog reference code
    #[validate(custom(function = "not_blank", message = "La referencia es obligatoria"))]
    pub reference: String,
    /// Title
    #[validate(custom(function = "not_blank", message = "El título es obligatorio"))]
    pub title: String,
    /// Authors, free text
    #[validate(custom(function = "not_blank", message = "Los autores son obligatorios"))]
    pub authors: String,
    /// Category
    #[validate(custom(function = "not_blank", message = "La categoría es obligatoria"))]
    pub category: String,
    /// Number of pages
    #[validate(range(min = 0, message = "El número de páginas no puede ser negativo"))]
    pub page_count: i32,
    /// Copies on the shelf
    #[validate(range(min = 0, message = "La cantidad de ejemplares no puede ser negativa"))]
    pub copies_available: i32,
}

/// A validated create/edit form
///
/// Built from a `multipart/form-data` body with the text fields `referencia`,
/// `titulo`, `autores`, `categoria`, the integer fields `num_paginas` and
/// `cantidad_ejemplares`, and an optional `imagen` file.
#[derive(Debug, Clone)]
pub struct BookSubmission {
    /// Text and number fields
    pub draft: BookDraft,
    /// Cover file, if one was picked
    pub image: Option<UploadedImage>,
}

impl BookSubmission {
    /// Reads every field of the form
    ///
    /// # Errors
    ///
    /// Returns `AppError::Upload` if the body cannot be read (including when it is too
    /// large) and `AppError::Validation` if a field is missing or malformed
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut fields = HashMap::new();
        let mut image = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            if name == IMAGE_FIELD {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // Browsers send an empty, nameless part when no file was picked
                if !filename.is_empty() {
                    image = Some(UploadedImage { filename, bytes });
                }
            } else {
                fields.insert(name, field.text().await?);
            }
        }

        Ok(Self {
            draft: parse_draft(&fields)?,
            image,
        })
    }

    /// The row to write: a valid new cover replaces `current_image`, anything else keeps it
    #[must_use]
    pub fn into_record(self, current_image: Option<String>) -> BookRecord {
        let image = match &self.image {
            Some(upload) => upload.to_data_uri().or(current_image),
            None => current_image,
        };

        BookRecord {
            reference: self.draft.reference,
            title: self.draft.title,
            authors: self.draft.authors,
            category: self.draft.category,
            page_count: self.draft.page_count,
            copies_available: self.draft.copies_available,
            image,
        }
    }
}

/// Text values are stored as typed; surrounding spaces only matter for emptiness
fn text_field(fields: &HashMap<String, String>, name: &str) -> String {
    fields.get(name).cloned().unwrap_or_default()
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn integer_field(fields: &HashMap<String, String>, name: &str) -> Result<i32, AppError> {
    let raw = fields.get(name).map_or("", |value| value.trim());
    raw.parse().map_err(|_| {
        AppError::Validation(format!(
            "El campo '{name}' debe ser un número entero (recibido: '{raw}')"
        ))
    })
}

fn parse_draft(fields: &HashMap<String, String>) -> Result<BookDraft, AppError> {
    let draft = BookDraft {
        reference: text_field(fields, "referencia"),
        title: text_field(fields, "titulo"),
        authors: text_field(fields, "autores"),
        category: text_field(fields, "categoria"),
        page_count: integer_field(fields, "num_paginas")?,
        copies_available: integer_field(fields, "cantidad_ejemplares")?,
    };

    draft.validate().map_err(|errors| {
        let mut field_errors: Vec<_> = errors.field_errors().into_iter().collect();
        field_errors.sort_by(|(a, _), (b, _)| a.cmp(b));

        let messages: Vec<String> = field_errors
            .into_iter()
            .flat_map(|(_, errors)| errors.iter())
            .map(|error| {
                error
                    .message
                    .as_ref()
                    .map_or_else(|| error.code.to_string(), ToString::to_string)
            })
            .collect();

        AppError::Validation(messages.join("; "))
    })?;

    Ok(draft)
}

impl<S> FromRequest<S> for BookSubmission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state).await.map_err(|_| {
            AppError::Validation("El formulario debe enviarse como multipart/form-data".to_string())
        })?;

        Self::from_multipart(multipart).await
    }
}
