//! A file-backed JSON [`Catalog`], the Rust analogue of loading a fixture
//! collection into an in-memory Mongo stand-in for local testing. This is
//! the only concrete `Catalog` implementation the engine itself ships;
//! production backends (a real database, flat Parquet files, ...) live
//! outside this crate.

use exposure_catalog::{AdjDepsRow, Catalog, CatalogError, CatalogResult, NodeRecord, NodeTiming, RawHeader};
use exposure_types::{NameId, NodeId};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct RawNodeRecord {
    id: u32,
    name: String,
    version: String,
}

#[derive(Debug, Deserialize)]
struct RawNodeTiming {
    id: u32,
    py_mask: Option<u32>,
    first_upload_time: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawAdjDepsRow {
    src: u32,
    deps: Vec<u32>,
}

#[derive(Debug, Deserialize)]
struct RawHeaderEntry {
    src: u32,
    dep_name: u32,
    mi: Vec<Option<i64>>,
    ma: Vec<Option<i64>>,
    n: Vec<Option<u32>>,
}

#[derive(Debug, Deserialize)]
struct RawChunkEntry {
    src: u32,
    dep_name: u32,
    chunk: u32,
    dst_ids: Vec<u32>,
}

/// Root bit metadata for one subgraph, matching `pipstyle/run.py`'s meta
/// document shape (`pkg`, `root_versions`, `root_ids`, `nbits`).
#[derive(Debug, Deserialize)]
pub struct SubgraphMeta {
    pub pkg: String,
    pub root_versions: Vec<String>,
    pub root_ids: Vec<u32>,
    pub nbits: u32,
}

#[derive(Debug, Deserialize)]
struct RawFixture {
    name_ids: Vec<(String, u32)>,
    node_ids: Vec<RawNodeRecord>,
    requires_python_with_timestamps: Vec<RawNodeTiming>,
    adj_deps: Vec<RawAdjDepsRow>,
    #[serde(default)]
    adj_headers: Vec<RawHeaderEntry>,
    #[serde(default)]
    adj_chunks: Vec<RawChunkEntry>,
    meta: SubgraphMeta,
    subgraph_nodes: Vec<u32>,
}

/// A full fixture: the catalog data plus the subgraph metadata/node list
/// the driver needs, all loaded from one JSON file.
pub struct JsonFixture {
    catalog: JsonCatalog,
    pub meta: SubgraphMeta,
    pub subgraph_nodes: Vec<NodeId>,
}

pub struct JsonCatalog {
    name_ids: Vec<(String, NameId)>,
    node_ids: Vec<NodeRecord>,
    timings: Vec<NodeTiming>,
    adj_deps: Vec<AdjDepsRow>,
    headers: HashMap<(NodeId, NameId), RawHeader>,
    chunks: HashMap<(NodeId, NameId, u32), Vec<NodeId>>,
}

impl JsonFixture {
    pub async fn load(path: &Path) -> Result<Self, FixtureError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| FixtureError::Io(path.display().to_string(), e.to_string()))?;
        let raw: RawFixture = serde_json::from_str(&contents).map_err(|e| FixtureError::Parse(e.to_string()))?;

        let name_ids: Vec<(String, NameId)> = raw.name_ids.into_iter().map(|(n, id)| (n, NameId(id))).collect();
        let node_ids: Vec<NodeRecord> = raw
            .node_ids
            .into_iter()
            .map(|r| NodeRecord { id: NodeId(r.id), name: r.name, version: r.version })
            .collect();
        let timings: Vec<NodeTiming> = raw
            .requires_python_with_timestamps
            .into_iter()
            .map(|r| NodeTiming { id: NodeId(r.id), py_mask: r.py_mask, first_upload_time: r.first_upload_time })
            .collect();
        let adj_deps: Vec<AdjDepsRow> = raw
            .adj_deps
            .into_iter()
            .map(|r| AdjDepsRow { src: NodeId(r.src), deps: r.deps.into_iter().map(NameId).collect() })
            .collect();

        let mut headers = HashMap::with_capacity(raw.adj_headers.len());
        for h in raw.adj_headers {
            headers.insert((NodeId(h.src), NameId(h.dep_name)), RawHeader { mi: h.mi, ma: h.ma, n: h.n });
        }
        let mut chunks = HashMap::with_capacity(raw.adj_chunks.len());
        for c in raw.adj_chunks {
            chunks.insert(
                (NodeId(c.src), NameId(c.dep_name), c.chunk),
                c.dst_ids.into_iter().map(NodeId).collect(),
            );
        }

        let subgraph_nodes = raw.subgraph_nodes.into_iter().map(NodeId).collect();

        Ok(Self {
            catalog: JsonCatalog { name_ids, node_ids, timings, adj_deps, headers, chunks },
            meta: raw.meta,
            subgraph_nodes,
        })
    }

    pub fn into_parts(self) -> (JsonCatalog, SubgraphMeta, Vec<NodeId>) {
        (self.catalog, self.meta, self.subgraph_nodes)
    }
}

/// Failures while reading or parsing a fixture file.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("failed to read fixture {0}: {1}")]
    Io(String, String),
    #[error("failed to parse fixture: {0}")]
    Parse(String),
}

#[async_trait::async_trait]
impl Catalog for JsonCatalog {
    async fn name_ids(&self) -> CatalogResult<Vec<(String, NameId)>> {
        Ok(self.name_ids.clone())
    }
    async fn node_ids(&self) -> CatalogResult<Vec<NodeRecord>> {
        Ok(self.node_ids.clone())
    }
    async fn requires_python_with_timestamps(&self) -> CatalogResult<Vec<NodeTiming>> {
        Ok(self.timings.clone())
    }
    async fn adj_deps(&self) -> CatalogResult<Vec<AdjDepsRow>> {
        Ok(self.adj_deps.clone())
    }
    async fn adj_header(&self, src: NodeId, dep_name: NameId) -> CatalogResult<Option<RawHeader>> {
        Ok(self.headers.get(&(src, dep_name)).cloned())
    }
    async fn adj_chunk(&self, src: NodeId, dep_name: NameId, chunk: u32) -> CatalogResult<Vec<NodeId>> {
        Ok(self.chunks.get(&(src, dep_name, chunk)).cloned().unwrap_or_default())
    }
}

impl From<FixtureError> for CatalogError {
    fn from(err: FixtureError) -> Self {
        CatalogError::Backend(err.to_string())
    }
}
