use crate::error::CatalogResult;
use exposure_types::{NameId, NodeId};

/// One row of `node_ids`: a specific `(package_name, version)`.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    /// Dense node identifier.
    pub id: NodeId,
    /// Canonicalized package name this node is a version of.
    pub name: String,
    /// The version string, opaque to the engine (candidate ordering comes
    /// from upload time, not from parsing this string).
    pub version: String,
}

/// One row of `requires_python_with_timestamps`.
#[derive(Debug, Clone)]
pub struct NodeTiming {
    /// The node this timing/mask information is about.
    pub id: NodeId,
    /// Compatible-interpreter bitset; `None` if the catalog has no record.
    pub py_mask: Option<u32>,
    /// Epoch-seconds upload time; `None` if the catalog has no record.
    pub first_upload_time: Option<i64>,
}

/// One row of `adj_deps`: the ordered dependency-name list for a source node.
#[derive(Debug, Clone)]
pub struct AdjDepsRow {
    /// The source node.
    pub src: NodeId,
    /// The distinct names `src` depends on, in the catalog's stable order
    /// (this order becomes the constraint ordering the backtracker uses).
    pub deps: Vec<NameId>,
}

/// Raw `(min_t, max_t, count)` parallel arrays for one `(src, dep_name)`
/// header, exactly as `adj_headers` returns them, before the chunk-length
/// consistency check in [`crate::adjstore::AdjStore`].
#[derive(Debug, Clone, Default)]
pub struct RawHeader {
    /// Per-chunk minimum upload time.
    pub mi: Vec<Option<i64>>,
    /// Per-chunk maximum upload time.
    pub ma: Vec<Option<i64>>,
    /// Per-chunk candidate count.
    pub n: Vec<Option<u32>>,
}

/// The abstract, read-only catalog surface the engine consumes (`spec.md` §6).
///
/// Any backend — a database, a set of flat files, an in-memory fixture —
/// that can answer these six queries is sufficient to build a
/// [`crate::CatalogArrays`] and drive [`crate::adjstore::AdjStore`]. All
/// bulk methods are called at most once per process lifetime (see
/// `spec.md` §3, "Lifecycle"); the per-edge methods are called lazily and
/// are expected to be cached by the caller, not by the implementation.
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    /// The canonical-name ↔ id bijection.
    async fn name_ids(&self) -> CatalogResult<Vec<(String, NameId)>>;

    /// Every node in the catalog, with its package name and version string.
    async fn node_ids(&self) -> CatalogResult<Vec<NodeRecord>>;

    /// Per-node Python mask and upload time.
    async fn requires_python_with_timestamps(&self) -> CatalogResult<Vec<NodeTiming>>;

    /// Per-source ordered list of dependency names.
    async fn adj_deps(&self) -> CatalogResult<Vec<AdjDepsRow>>;

    /// The chunked header for one `(src, dep_name)` edge-group, or `None` if
    /// `src` has no dependency named `dep_name`.
    async fn adj_header(&self, src: NodeId, dep_name: NameId) -> CatalogResult<Option<RawHeader>>;

    /// The ordered (`upload_time` ascending) candidate array for one chunk.
    async fn adj_chunk(
        &self,
        src: NodeId,
        dep_name: NameId,
        chunk: u32,
    ) -> CatalogResult<Vec<NodeId>>;
}
