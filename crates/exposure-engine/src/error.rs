use miette::Diagnostic;
use thiserror::Error;

/// Failures that can occur while building an [`crate::EngineContext`] from
/// a `Catalog` backend. Resolution itself never returns an error type (a
/// failed `resolve()` is `(false, -1, None)`, not an `Err`), matching
/// `spec.md` §7's "no failure kind aborts the batch driver" for the
/// query path; only context *construction* can fail outright, since at
/// that point there is no partial result to report instead.
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    /// The catalog backend failed one of the bulk loading passes.
    #[error("failed to load resolution context: {0}")]
    Catalog(#[from] exposure_catalog::CatalogError),
}
