//! Bulk context loading, mirroring `pipstyle.loader.load_context`'s four
//! passes: name ids, node arrays (py mask + upload time), node_id -> name_id,
//! and `adj_deps`. Headers and chunks are deliberately *not* loaded here;
//! `AdjStore` queries them on demand through its own LRU caches.

use crate::error::EngineError;
use crate::options::EngineOptions;
use exposure_catalog::{AdjStore, Catalog, CatalogArrays};
use exposure_types::{NameId, NodeId, PyMask};
use std::collections::HashMap;
use std::sync::Arc;

/// Everything a query needs: the flat lookup arrays, the adjacency store,
/// and (for diagnostics only) the name-id to name string mapping.
pub struct EngineContext {
    pub arrays: Arc<CatalogArrays>,
    pub adj: Arc<AdjStore>,
    pub name_by_id: HashMap<NameId, String>,
}

/// Loads a full [`EngineContext`] from `catalog`, running each of the four
/// bulk passes exactly once, as `spec.md` §3's "Lifecycle" requires.
pub async fn load_context(catalog: Arc<dyn Catalog>, options: &EngineOptions) -> Result<EngineContext, EngineError> {
    tracing::info!("loading name_ids");
    let name_rows = catalog.name_ids().await?;
    let mut name_to_id: HashMap<String, NameId> = HashMap::with_capacity(name_rows.len());
    let mut name_by_id: HashMap<NameId, String> = HashMap::with_capacity(name_rows.len());
    for (name, id) in name_rows {
        name_to_id.insert(name.clone(), id);
        name_by_id.insert(id, name);
    }
    tracing::info!(count = name_by_id.len(), "loaded name_id mappings");

    tracing::info!("loading node_ids");
    let node_rows = catalog.node_ids().await?;
    tracing::info!(count = node_rows.len(), "loaded node_id rows");

    tracing::info!("loading requires_python_with_timestamps");
    let timing_rows = catalog.requires_python_with_timestamps().await?;
    tracing::info!(count = timing_rows.len(), "loaded node py_mask/time rows");

    let max_id = node_rows
        .iter()
        .map(|r| r.id.0)
        .chain(timing_rows.iter().map(|r| r.id.0))
        .max()
        .map(|n| n as usize)
        .unwrap_or(0);
    let len = max_id + 1;

    let mut node_name_id: Vec<Option<NameId>> = vec![None; len];
    for row in &node_rows {
        if let Some(&name_id) = name_to_id.get(&row.name) {
            node_name_id[row.id.index()] = Some(name_id);
        }
    }

    let mut all_mask: u32 = 0;
    for row in &timing_rows {
        if let Some(mask) = row.py_mask {
            all_mask |= mask;
        }
    }
    let fallback_mask = if all_mask == 0 { PyMask::ALL } else { PyMask(all_mask) };

    let mut py_mask: Vec<PyMask> = vec![fallback_mask; len];
    let mut upload_time: Vec<Option<i64>> = vec![None; len];
    for row in &timing_rows {
        if let Some(mask) = row.py_mask {
            py_mask[row.id.index()] = PyMask(mask);
        }
        upload_time[row.id.index()] = row.first_upload_time;
    }

    let arrays = Arc::new(CatalogArrays::new(upload_time, py_mask, node_name_id));

    tracing::info!("loading adj_deps");
    let adj_deps_rows = catalog.adj_deps().await?;
    let mut adj_deps: HashMap<NodeId, Vec<NameId>> = HashMap::with_capacity(adj_deps_rows.len());
    for row in adj_deps_rows {
        adj_deps.insert(row.src, row.deps);
    }
    tracing::info!(count = adj_deps.len(), "loaded adj_deps entries into memory");

    tracing::info!(
        header_cache_cap = options.cache_sizes.header_cache_cap,
        chunk_cache_cap = options.cache_sizes.chunk_cache_cap,
        edge_cache_cap = options.cache_sizes.edge_cache_cap,
        "adj_headers/adj_chunks will be queried on demand with LRU caching"
    );
    let adj = Arc::new(AdjStore::new(catalog, arrays.clone(), adj_deps, options.cache_sizes.clone()));

    tracing::info!("context loading complete");
    Ok(EngineContext { arrays, adj, name_by_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use exposure_catalog::{AdjDepsRow, CatalogResult, NodeRecord, NodeTiming, RawHeader};

    struct FixtureCatalog;

    #[async_trait::async_trait]
    impl Catalog for FixtureCatalog {
        async fn name_ids(&self) -> CatalogResult<Vec<(String, NameId)>> {
            Ok(vec![("alpha".to_string(), NameId(0)), ("beta".to_string(), NameId(1))])
        }
        async fn node_ids(&self) -> CatalogResult<Vec<NodeRecord>> {
            Ok(vec![
                NodeRecord { id: NodeId(0), name: "alpha".to_string(), version: "1.0".to_string() },
                NodeRecord { id: NodeId(1), name: "beta".to_string(), version: "2.0".to_string() },
            ])
        }
        async fn requires_python_with_timestamps(&self) -> CatalogResult<Vec<NodeTiming>> {
            Ok(vec![
                NodeTiming { id: NodeId(0), py_mask: Some(0b11), first_upload_time: Some(100) },
                NodeTiming { id: NodeId(1), py_mask: Some(0b01), first_upload_time: Some(200) },
            ])
        }
        async fn adj_deps(&self) -> CatalogResult<Vec<AdjDepsRow>> {
            Ok(vec![AdjDepsRow { src: NodeId(0), deps: vec![NameId(1)] }])
        }
        async fn adj_header(&self, _src: NodeId, _dep_name: NameId) -> CatalogResult<Option<RawHeader>> {
            Ok(None)
        }
        async fn adj_chunk(&self, _src: NodeId, _dep_name: NameId, _chunk: u32) -> CatalogResult<Vec<NodeId>> {
            Ok(vec![])
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn loads_arrays_and_adj_deps_from_bulk_passes() {
        let ctx = load_context(Arc::new(FixtureCatalog), &EngineOptions::default()).await.unwrap();
        assert_eq!(ctx.arrays.upload_time(NodeId(0)), Some(100));
        assert_eq!(ctx.arrays.py_mask(NodeId(1)), PyMask(0b01));
        assert_eq!(ctx.arrays.name_id(NodeId(0)), Some(NameId(0)));
        assert_eq!(ctx.adj.dep_names(NodeId(0)), &[NameId(1)]);
        assert_eq!(ctx.name_by_id.get(&NameId(1)).map(String::as_str), Some("beta"));
    }
}
