//! Builds the root requirement and runs the resolver loop, mirroring
//! `pipstyle.entrypoint.ResolutionRunner.resolve`'s resolvelib invocation
//! (but returning a `Result` instead of letting `ResolutionImpossible`/
//! `ResolutionTooDeep` propagate as exceptions).

use crate::error::ResolveError;
use crate::provider::DbProvider;
use crate::resolver::{Resolver, ResolverResult};
use exposure_catalog::{AdjStore, CatalogArrays};
use exposure_types::{NameId, NodeId};

/// Default resolvelib round budget, matching `ResolutionRunner.resolve`'s
/// `max_rounds: int = 100` default.
pub const DEFAULT_MAX_ROUNDS: usize = 100;

/// Resolves `start_node_id` against the pinned `root_node_id`/`root_name_id`
/// at cutoff `t`, returning the resolved pin set and dependency graph on
/// success.
pub fn resolve_pins(
    adj: &AdjStore,
    arrays: &CatalogArrays,
    start_node_id: NodeId,
    root_node_id: NodeId,
    root_name_id: NameId,
    t: i64,
    max_rounds: usize,
) -> Result<ResolverResult, ResolveError> {
    let start_name_id = arrays.name_id(start_node_id).unwrap_or(root_name_id);

    let provider = DbProvider::new(adj, arrays, start_node_id, root_node_id, root_name_id, t);
    let root_requirement = provider.root_requirement(start_name_id);
    let resolver = Resolver::new(provider);

    resolver.resolve(vec![root_requirement], max_rounds)
}
