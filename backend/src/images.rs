//! Inline cover images
//!
//! Covers are not stored as files: the uploaded bytes are base64-encoded into a
//! `data:image/<ext>;base64,<payload>` URI kept in the book row.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// File extensions accepted for covers
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Lowercased text after the last dot of `filename`
fn lowercase_extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, extension)| extension.to_lowercase())
}

/// Whether `filename` has an accepted image extension
#[must_use]
pub fn allowed_file(filename: &str) -> bool {
    lowercase_extension(filename)
        .is_some_and(|extension| ALLOWED_EXTENSIONS.contains(&extension.as_str()))
}

/// Encodes an upload as a data URI, `None` for names [`allowed_file`] rejects
#[must_use]
pub fn to_data_uri(filename: &str, bytes: &[u8]) -> Option<String> {
    if !allowed_file(filename) {
        return None;
    }
    let extension = lowercase_extension(filename)?;
    Some(format!(
        "data:image/{extension};base64,{}",
        STANDARD.encode(bytes)
    ))
}
