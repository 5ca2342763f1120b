use miette::Diagnostic;
use thiserror::Error;

/// Failures surfaced by a [`crate::Catalog`] implementation.
///
/// These are transport/storage failures (the backend could not answer at
/// all), not the data-shape defects `AdjStore` already degrades gracefully
/// (a malformed header is "no header", not an error — see `spec.md` §7).
#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    /// The backend could not be reached or returned a transport-level error.
    #[error("catalog backend error: {0}")]
    Backend(String),

    /// The backend returned data that could not be deserialized into the
    /// shape the catalog contract requires.
    #[error("catalog returned malformed data: {0}")]
    MalformedData(String),
}

/// Convenience alias for fallible catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
