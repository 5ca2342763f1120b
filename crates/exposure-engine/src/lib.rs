mod context;
mod error;
mod options;
mod resolve;

pub use context::{load_context, EngineContext};
pub use error::EngineError;
pub use options::{EngineOptions, ResolutionFront};
pub use resolve::{resolve, DependencyTree, Resolution};
