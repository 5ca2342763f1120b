//! Shared identifiers and value types for the exposure resolution engine.
//!
//! This crate has no behavior of its own; it exists so that
//! `exposure-catalog`, `exposure-solver` and `exposure-engine` agree on the
//! same `NodeId`/`NameId`/`PyMask`/`PackageName`/`FailReason` types without
//! a dependency cycle.

mod fail_reason;
mod ids;
mod py_mask;

pub mod package_name;

pub use fail_reason::FailReason;
pub use ids::{NameId, NodeId};
pub use package_name::{PackageName, ParsePackageNameError};
pub use py_mask::PyMask;
