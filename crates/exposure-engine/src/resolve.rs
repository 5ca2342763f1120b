//! The `resolve()` entry point (`spec.md` §4.6), matching
//! `pipstyle.entrypoint.ResolutionRunner.resolve` exactly: the `t := max(...)`
//! default and fast-fail, then a dispatch to one of the two resolution
//! fronts, with depth and an optional debug tree computed from whichever
//! front ran.

use crate::context::EngineContext;
use crate::options::{EngineOptions, ResolutionFront};
use exposure_solver::{resolve_pins, Candidate, ExposureSolverCsp};
use exposure_types::{FailReason, NameId, NodeId};
use std::collections::{HashMap, HashSet, VecDeque};

/// A flat `{nodes, edges, mapping}` dependency tree, for `--debug` dumps.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DependencyTree {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<(NodeId, NodeId)>,
    pub mapping: Vec<(NameId, NodeId)>,
}

/// The outcome of one [`resolve`] call.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub ok: bool,
    /// Hop count from `node_id`'s name to `root_name_id` in the resolved
    /// dependency graph, or `-1` if unresolved, or if resolved but root was
    /// never reached as a dependency (only as a bare requirement).
    pub depth: i32,
    pub tree: Option<DependencyTree>,
    /// Set only on a failed backtracker-front run; the resolver front has no
    /// equivalent taxonomy and always leaves this `None`.
    pub fail_reason: Option<FailReason>,
}

fn not_resolved() -> Resolution {
    Resolution { ok: false, depth: -1, tree: None, fail_reason: None }
}

/// Resolves `node_id` against pinned `root_id`/`root_name_id`. If `t` is
/// `None`, it defaults to `max(upload_time[node_id], upload_time[root_id])`;
/// if either is missing, fails fast with `ok=false, depth=-1`, matching
/// `ResolutionRunner.resolve`'s early return.
pub fn resolve(
    ctx: &EngineContext,
    options: &EngineOptions,
    node_id: NodeId,
    root_id: NodeId,
    root_name_id: NameId,
    t: Option<i64>,
    debug: bool,
) -> Resolution {
    let t = match t {
        Some(t) => t,
        None => {
            let (Some(tn), Some(tr)) = (ctx.arrays.upload_time(node_id), ctx.arrays.upload_time(root_id)) else {
                return not_resolved();
            };
            tn.max(tr)
        }
    };

    match options.front {
        ResolutionFront::Resolver => resolve_with_resolver(ctx, options, node_id, root_id, root_name_id, t, debug),
        ResolutionFront::Backtracker => resolve_with_backtracker(ctx, options, node_id, root_id, root_name_id, t, debug),
    }
}

fn resolve_with_resolver(
    ctx: &EngineContext,
    options: &EngineOptions,
    node_id: NodeId,
    root_id: NodeId,
    root_name_id: NameId,
    t: i64,
    debug: bool,
) -> Resolution {
    let result = match resolve_pins(&ctx.adj, &ctx.arrays, node_id, root_id, root_name_id, t, options.max_rounds) {
        Ok(result) => result,
        Err(_) => return not_resolved(),
    };

    let Some(start_name_id) = ctx.arrays.name_id(node_id) else {
        return not_resolved();
    };

    let depth = compute_depth_over_names(&result.graph, start_name_id, root_name_id);
    let tree = debug.then(|| build_tree(&result.mapping, &result.graph));
    Resolution { ok: true, depth, tree, fail_reason: None }
}

fn resolve_with_backtracker(
    ctx: &EngineContext,
    options: &EngineOptions,
    node_id: NodeId,
    root_id: NodeId,
    root_name_id: NameId,
    t: i64,
    debug: bool,
) -> Resolution {
    let solver = ExposureSolverCsp::new(&ctx.adj, &ctx.arrays, root_id, root_name_id, options.max_candidates_per_dep_opt());
    let result = solver.exposure(node_id, t);
    if !result.ok {
        return Resolution { ok: false, depth: -1, tree: None, fail_reason: result.fail_reason };
    }

    let depth = result.depth_to_root.map(|d| d as i32).unwrap_or(-1);
    let tree = if debug {
        let pins = result.pins.unwrap_or_default();
        let edges = result.name_edges.unwrap_or_default();
        Some(build_tree_from_pins(&pins, &edges))
    } else {
        None
    };
    Resolution { ok: true, depth, tree, fail_reason: None }
}

/// BFS from `start_name_id` to `root_name_id` following parent-depends-on-child
/// edges, mirroring `entrypoint.py`'s `_compute_depth`.
fn compute_depth_over_names(
    graph: &exposure_solver::DependencyGraph,
    start_name_id: NameId,
    root_name_id: NameId,
) -> i32 {
    if start_name_id == root_name_id {
        return 0;
    }
    let mut seen: HashSet<NameId> = HashSet::new();
    seen.insert(start_name_id);
    let mut queue: VecDeque<(NameId, i32)> = VecDeque::new();
    queue.push_back((start_name_id, 0));
    while let Some((v, d)) = queue.pop_front() {
        if v == root_name_id {
            return d;
        }
        for w in graph.children(v) {
            if seen.insert(w) {
                queue.push_back((w, d + 1));
            }
        }
    }
    -1
}

fn build_tree(
    mapping: &HashMap<NameId, Candidate>,
    graph: &exposure_solver::DependencyGraph,
) -> DependencyTree {
    let nodes: Vec<NodeId> = mapping.values().map(|c| c.node_id).collect();
    let name_to_node: HashMap<NameId, NodeId> = mapping.iter().map(|(&n, c)| (n, c.node_id)).collect();
    let edges: Vec<(NodeId, NodeId)> = graph
        .edges()
        .filter_map(|(parent, child)| {
            let p = name_to_node.get(&parent)?;
            let c = name_to_node.get(&child)?;
            Some((*p, *c))
        })
        .collect();
    let mapping: Vec<(NameId, NodeId)> = mapping.iter().map(|(&n, c)| (n, c.node_id)).collect();
    DependencyTree { nodes, edges, mapping }
}

fn build_tree_from_pins(pins: &HashMap<NameId, NodeId>, name_edges: &HashSet<(NameId, NameId)>) -> DependencyTree {
    let nodes: Vec<NodeId> = pins.values().copied().collect();
    let edges: Vec<(NodeId, NodeId)> = name_edges
        .iter()
        .filter_map(|&(parent, child)| {
            let p = pins.get(&parent)?;
            let c = pins.get(&child)?;
            Some((*p, *c))
        })
        .collect();
    let mapping: Vec<(NameId, NodeId)> = pins.iter().map(|(&n, &nid)| (n, nid)).collect();
    DependencyTree { nodes, edges, mapping }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::load_context;
    use exposure_catalog::{AdjDepsRow, Catalog, CatalogResult, NodeRecord, NodeTiming, RawHeader};
    use std::sync::Arc;

    struct ChainCatalog;

    #[async_trait::async_trait]
    impl Catalog for ChainCatalog {
        async fn name_ids(&self) -> CatalogResult<Vec<(String, NameId)>> {
            Ok(vec![
                ("start".to_string(), NameId(0)),
                ("mid".to_string(), NameId(1)),
                ("root".to_string(), NameId(2)),
            ])
        }
        async fn node_ids(&self) -> CatalogResult<Vec<NodeRecord>> {
            Ok(vec![
                NodeRecord { id: NodeId(0), name: "start".to_string(), version: "1".to_string() },
                NodeRecord { id: NodeId(1), name: "mid".to_string(), version: "1".to_string() },
                NodeRecord { id: NodeId(2), name: "root".to_string(), version: "1".to_string() },
            ])
        }
        async fn requires_python_with_timestamps(&self) -> CatalogResult<Vec<NodeTiming>> {
            Ok(vec![
                NodeTiming { id: NodeId(0), py_mask: Some(0b11), first_upload_time: Some(100) },
                NodeTiming { id: NodeId(1), py_mask: Some(0b11), first_upload_time: Some(200) },
                NodeTiming { id: NodeId(2), py_mask: Some(0b11), first_upload_time: Some(50) },
            ])
        }
        async fn adj_deps(&self) -> CatalogResult<Vec<AdjDepsRow>> {
            Ok(vec![
                AdjDepsRow { src: NodeId(0), deps: vec![NameId(1)] },
                AdjDepsRow { src: NodeId(1), deps: vec![NameId(2)] },
            ])
        }
        async fn adj_header(&self, src: NodeId, dep_name: NameId) -> CatalogResult<Option<RawHeader>> {
            match (src, dep_name) {
                (NodeId(0), NameId(1)) => Ok(Some(RawHeader { mi: vec![Some(200)], ma: vec![Some(200)], n: vec![Some(1)] })),
                (NodeId(1), NameId(2)) => Ok(Some(RawHeader { mi: vec![Some(50)], ma: vec![Some(50)], n: vec![Some(1)] })),
                _ => Ok(None),
            }
        }
        async fn adj_chunk(&self, src: NodeId, dep_name: NameId, chunk: u32) -> CatalogResult<Vec<NodeId>> {
            match (src, dep_name, chunk) {
                (NodeId(0), NameId(1), 0) => Ok(vec![NodeId(1)]),
                (NodeId(1), NameId(2), 0) => Ok(vec![NodeId(2)]),
                _ => Ok(vec![]),
            }
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn resolver_front_resolves_and_computes_depth() {
        let ctx = load_context(Arc::new(ChainCatalog), &EngineOptions::default()).await.unwrap();
        let result = resolve(&ctx, &EngineOptions::default(), NodeId(0), NodeId(2), NameId(2), Some(200), true);
        assert!(result.ok);
        assert_eq!(result.depth, 2);
        let tree = result.tree.expect("debug tree requested");
        assert_eq!(tree.nodes.len(), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn backtracker_front_agrees_on_depth() {
        let ctx = load_context(Arc::new(ChainCatalog), &EngineOptions::default()).await.unwrap();
        let mut options = EngineOptions::default();
        options.with_front(ResolutionFront::Backtracker);
        let result = resolve(&ctx, &options, NodeId(0), NodeId(2), NameId(2), Some(200), false);
        assert!(result.ok);
        assert_eq!(result.depth, 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn defaults_t_to_max_upload_time_and_fast_fails_when_missing() {
        let ctx = load_context(Arc::new(ChainCatalog), &EngineOptions::default()).await.unwrap();
        let result = resolve(&ctx, &EngineOptions::default(), NodeId(0), NodeId(2), NameId(2), None, false);
        assert!(result.ok);
        assert_eq!(result.depth, 2);

        let result = resolve(&ctx, &EngineOptions::default(), NodeId(99), NodeId(2), NameId(2), None, false);
        assert!(!result.ok);
        assert_eq!(result.depth, -1);
    }
}
