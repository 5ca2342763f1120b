mod adjstore;
mod arrays;
mod cache;
mod catalog;
mod error;
mod header;

pub use adjstore::{AdjStore, AdjStoreCacheSizes, CandidateIter};
pub use arrays::CatalogArrays;
pub use cache::BoundedCache;
pub use catalog::{AdjDepsRow, Catalog, NodeRecord, NodeTiming, RawHeader};
pub use error::{CatalogError, CatalogResult};
pub use header::{ChunkInfo, DepHeader};
