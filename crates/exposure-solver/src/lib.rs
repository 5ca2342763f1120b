mod csp;
mod drive;
mod error;
mod provider;
mod resolver;
mod types;

pub use csp::{ExposureSolverCsp, SolveResult};
pub use drive::{resolve_pins, DEFAULT_MAX_ROUNDS};
pub use error::{ResolutionImpossible, ResolutionTooDeep, ResolveError};
pub use provider::DbProvider;
pub use resolver::{DependencyGraph, ExposureProvider, Resolver, ResolverResult};
pub use types::{Candidate, Requirement};

#[cfg(test)]
mod tests {
    use super::*;
    use exposure_catalog::{
        AdjDepsRow, AdjStore, AdjStoreCacheSizes, Catalog, CatalogArrays, CatalogResult, NodeRecord, NodeTiming,
        RawHeader,
    };
    use exposure_types::{NameId, NodeId, PyMask};
    use std::collections::HashMap;
    use std::sync::Arc;

    /// A tiny, fully in-memory catalog: `start(0) -> mid(1) -> root(2)`,
    /// all compatible, all within the time window. Used to exercise both
    /// resolution fronts against an identical fixture.
    struct TinyCatalog {
        headers: HashMap<(NodeId, NameId), RawHeader>,
        chunks: HashMap<(NodeId, NameId, u32), Vec<NodeId>>,
        adj_deps: Vec<AdjDepsRow>,
    }

    #[async_trait::async_trait]
    impl Catalog for TinyCatalog {
        async fn name_ids(&self) -> CatalogResult<Vec<(String, NameId)>> {
            Ok(vec![])
        }
        async fn node_ids(&self) -> CatalogResult<Vec<NodeRecord>> {
            Ok(vec![])
        }
        async fn requires_python_with_timestamps(&self) -> CatalogResult<Vec<NodeTiming>> {
            Ok(vec![])
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

    fn build_chain_fixture() -> (Arc<AdjStore>, Arc<CatalogArrays>, NodeId, NodeId, NodeId, NameId, NameId, NameId, i64) {
        let start = NodeId(0);
        let mid = NodeId(1);
        let root = NodeId(2);

        let name_start = NameId(10);
        let name_mid = NameId(11);
        let name_root = NameId(12);

        let arrays = Arc::new(CatalogArrays::new(
            vec![Some(100), Some(200), Some(50)],
            vec![PyMask::ALL, PyMask::ALL, PyMask::ALL],
            vec![Some(name_start), Some(name_mid), Some(name_root)],
        ));

        let mut headers = HashMap::new();
        headers.insert(
            (start, name_mid),
            RawHeader {
                mi: vec![Some(200)],
                ma: vec![Some(200)],
                n: vec![Some(1)],
            },
        );
        headers.insert(
            (mid, name_root),
            RawHeader {
                mi: vec![Some(50)],
                ma: vec![Some(50)],
                n: vec![Some(1)],
            },
        );
        let mut chunks = HashMap::new();
        chunks.insert((start, name_mid, 0), vec![mid]);
        chunks.insert((mid, name_root, 0), vec![root]);

        let adj_deps = vec![
            AdjDepsRow { src: start, deps: vec![name_mid] },
            AdjDepsRow { src: mid, deps: vec![name_root] },
        ];

        let catalog = Arc::new(TinyCatalog { headers, chunks, adj_deps: adj_deps.clone() });
        let mut map = HashMap::new();
        for row in adj_deps {
            map.insert(row.src, row.deps);
        }

        let adj = Arc::new(AdjStore::new(catalog, arrays.clone(), map, AdjStoreCacheSizes::default()));
        (adj, arrays, start, mid, root, name_start, name_mid, name_root, 200)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn csp_solver_finds_chain_to_root() {
        let (adj, arrays, start, _mid, root, _name_start, _name_mid, name_root, t) = build_chain_fixture();
        let solver = ExposureSolverCsp::new(&adj, &arrays, root, name_root, None);
        let result = solver.exposure(start, t);
        assert!(result.ok);
        assert_eq!(result.depth_to_root, Some(2));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn csp_solver_reports_reason_when_unreachable() {
        let (adj, arrays, start, _mid, root, _name_start, _name_mid, name_root, _t) = build_chain_fixture();
        // Cutting off before `mid` was even uploaded makes the start itself ineligible.
        let solver = ExposureSolverCsp::new(&adj, &arrays, root, name_root, None);
        let result = solver.exposure(start, 10);
        assert!(!result.ok);
        assert_eq!(result.fail_reason, Some(exposure_types::FailReason::StartAfterT));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn resolver_loop_agrees_with_csp_solver() {
        let (adj, arrays, start, _mid, root, _name_start, _name_mid, name_root, t) = build_chain_fixture();
        let result = resolve_pins(&adj, &arrays, start, root, name_root, t, DEFAULT_MAX_ROUNDS);
        let resolved = result.expect("chain resolves");
        assert_eq!(resolved.mapping.get(&name_root).map(|c| c.node_id), Some(root));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn resolver_loop_reports_impossible_when_root_unreachable_by_time() {
        let (adj, arrays, start, _mid, root, _name_start, _name_mid, name_root, _t) = build_chain_fixture();
        let result = resolve_pins(&adj, &arrays, start, root, name_root, 10, DEFAULT_MAX_ROUNDS);
        assert!(result.is_err());
    }
}
