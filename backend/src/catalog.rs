//! Shaping of store results for the catalog pages

use std::collections::BTreeSet;

use catalog_storage::book::BookStorageResult;

use crate::types::AppError;

/// Sorted distinct categories, feeding the category filter
pub fn distinct_categories<I>(categories: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    categories
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Read paths never fail the page: a store error is logged and replaced by an empty value
pub fn or_empty<T: Default>(result: BookStorageResult<T>) -> T {
    result.unwrap_or_else(|err| {
        AppError::from(err).log();
        T::default()
    })
}
