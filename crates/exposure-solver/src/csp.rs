//! Global-consistency backtracking solver (`spec.md` §4.4).
//!
//! Mirrors `ExposureSolverCSP` from the Mongo-backed original: a single
//! global `chosen: NameId -> NodeId` pin map, a cycle guard via an
//! in-recursion-stack set, and `root_required`/`best_depth` bookkeeping
//! that is deliberately *not* rewound on backtrack, the same way the
//! Python keeps them in boxed mutable cells shared across the whole
//! search tree.

use exposure_catalog::{AdjStore, CatalogArrays};
use exposure_types::{FailReason, NameId, NodeId, PyMask};
use std::collections::{HashMap, HashSet};

/// Outcome of one [`ExposureSolverCsp::exposure`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveResult {
    /// Whether a globally consistent, root-requiring assignment exists.
    pub ok: bool,
    /// Minimum depth from `start` to the root pin, if `ok`.
    pub depth_to_root: Option<u32>,
    /// The most frequent failure reason encountered during the search, if
    /// `!ok`. `None` only for the trivial `start == root` success case.
    pub fail_reason: Option<FailReason>,
    /// The global `name -> node` pin set witnessing success, if `ok`. Lets a
    /// caller build the same `{nodes, edges, mapping}` debug shape the
    /// resolver front builds from its own pinned mapping.
    pub pins: Option<HashMap<NameId, NodeId>>,
    /// `(parent_name, dep_name)` edges validated during the search that
    /// witness `pins`, if `ok`.
    pub name_edges: Option<HashSet<(NameId, NameId)>>,
}

struct SolveState {
    chosen: HashMap<NameId, NodeId>,
    in_stack: HashSet<NodeId>,
    fail_ctr: HashMap<FailReason, u32>,
    root_required: bool,
    best_depth: Option<u32>,
    name_edges: HashSet<(NameId, NameId)>,
}

impl SolveState {
    fn record(&mut self, reason: FailReason) {
        *self.fail_ctr.entry(reason).or_insert(0) += 1;
    }

    fn representative_reason(&self) -> FailReason {
        self.fail_ctr
            .iter()
            .max_by_key(|(_, count)| **count)
            .map(|(reason, _)| *reason)
            .unwrap_or(FailReason::Unsat)
    }
}

/// The CSP-correct exposure solver: is there a globally consistent pin set
/// reaching `root_id` from a given start node by time `t`?
pub struct ExposureSolverCsp<'a> {
    adj: &'a AdjStore,
    arrays: &'a CatalogArrays,
    root_id: NodeId,
    root_name_id: NameId,
    /// `0` (mapped from the Python's `max_candidates_per_dep: int = 0`)
    /// means unlimited; represented here as `None`.
    max_candidates_per_dep: Option<usize>,
}

impl<'a> ExposureSolverCsp<'a> {
    /// Builds a solver fixed to one `(root_id, root_name_id)` pin.
    pub fn new(
        adj: &'a AdjStore,
        arrays: &'a CatalogArrays,
        root_id: NodeId,
        root_name_id: NameId,
        max_candidates_per_dep: Option<usize>,
    ) -> Self {
        Self {
            adj,
            arrays,
            root_id,
            root_name_id,
            max_candidates_per_dep,
        }
    }

    /// Determines whether `start_id` is exposed to `root_id` at cutoff `t`.
    pub fn exposure(&self, start_id: NodeId, t: i64) -> SolveResult {
        if start_id == self.root_id {
            return SolveResult {
                ok: true,
                depth_to_root: Some(0),
                fail_reason: None,
                pins: Some(HashMap::new()),
                name_edges: Some(HashSet::new()),
            };
        }

        let Some(tm0) = self.arrays.upload_time(start_id) else {
            return SolveResult {
                ok: false,
                depth_to_root: None,
                fail_reason: Some(FailReason::StartTimeMissing),
                pins: None,
                name_edges: None,
            };
        };
        if tm0 > t {
            return SolveResult {
                ok: false,
                depth_to_root: None,
                fail_reason: Some(FailReason::StartAfterT),
                pins: None,
                name_edges: None,
            };
        }

        let m0 = self.arrays.py_mask(start_id);
        if m0.is_empty() {
            return SolveResult {
                ok: false,
                depth_to_root: None,
                fail_reason: Some(FailReason::StartPymaskZero),
                pins: None,
                name_edges: None,
            };
        }

        let Some(start_name_id) = self.arrays.name_id(start_id) else {
            return SolveResult {
                ok: false,
                depth_to_root: None,
                fail_reason: Some(FailReason::StartNameMissing),
                pins: None,
                name_edges: None,
            };
        };

        let allowed_py = m0 & self.arrays.py_mask(self.root_id);
        if allowed_py.is_empty() {
            return SolveResult {
                ok: false,
                depth_to_root: None,
                fail_reason: Some(FailReason::RootPymaskConflictAtStart),
                pins: None,
                name_edges: None,
            };
        }

        let mut state = SolveState {
            chosen: HashMap::new(),
            in_stack: HashSet::new(),
            fail_ctr: HashMap::new(),
            root_required: false,
            best_depth: None,
            name_edges: HashSet::new(),
        };
        state.chosen.insert(start_name_id, start_id);
        state.chosen.insert(self.root_name_id, self.root_id);
        state.in_stack.insert(start_id);

        let ok = self.solve_node(start_id, t, allowed_py, 0, &mut state);

        if ok && state.root_required {
            if let Some(depth) = state.best_depth {
                return SolveResult {
                    ok: true,
                    depth_to_root: Some(depth),
                    fail_reason: None,
                    pins: Some(state.chosen),
                    name_edges: Some(state.name_edges),
                };
            }
        }

        SolveResult {
            ok: false,
            depth_to_root: None,
            fail_reason: Some(state.representative_reason()),
            pins: None,
            name_edges: None,
        }
    }

    /// Ensures `node_id`'s outgoing dependencies are all satisfiable under
    /// the current global `chosen` pins.
    fn solve_node(
        &self,
        node_id: NodeId,
        t: i64,
        allowed_py: PyMask,
        depth_from_start: u32,
        state: &mut SolveState,
    ) -> bool {
        let dep_ids = self.adj.dep_names(node_id).to_vec();
        if dep_ids.is_empty() {
            return true;
        }
        self.backtrack(&dep_ids, 0, node_id, t, allowed_py, depth_from_start, state)
    }

    fn backtrack(
        &self,
        dep_ids: &[NameId],
        i: usize,
        node_id: NodeId,
        t: i64,
        allowed_py: PyMask,
        depth_from_start: u32,
        state: &mut SolveState,
    ) -> bool {
        if i == dep_ids.len() {
            return true;
        }

        let dep_name_id = dep_ids[i];
        if dep_name_id == self.root_name_id {
            state.root_required = true;
        }
        if let Some(parent_name_id) = self.arrays.name_id(node_id) {
            state.name_edges.insert((parent_name_id, dep_name_id));
        }

        if let Some(dst_id) = state.chosen.get(&dep_name_id).copied() {
            let Some(tm) = self.arrays.upload_time(dst_id) else {
                state.record(FailReason::ChosenDstTimeInvalid);
                return false;
            };
            if tm > t {
                state.record(FailReason::ChosenDstTimeInvalid);
                return false;
            }

            if !self.adj.edge_exists(node_id, dep_name_id, dst_id, t) {
                state.record(FailReason::EdgeMissingForChosen);
                return false;
            }

            let new_allowed = allowed_py & self.arrays.py_mask(dst_id);
            if new_allowed.is_empty() {
                state.record(FailReason::PythonConflictWithChosen);
                return false;
            }

            if state.in_stack.contains(&dst_id) {
                return self.backtrack(dep_ids, i + 1, node_id, t, new_allowed, depth_from_start, state);
            }

            state.in_stack.insert(dst_id);
            let ok_child = self.solve_node(dst_id, t, new_allowed, depth_from_start + 1, state);
            state.in_stack.remove(&dst_id);

            if !ok_child {
                state.record(FailReason::ChildUnsatWithChosen);
                return false;
            }

            if dst_id == self.root_id {
                let d = depth_from_start + 1;
                if state.best_depth.map_or(true, |bd| d < bd) {
                    state.best_depth = Some(d);
                }
            }

            return self.backtrack(dep_ids, i + 1, node_id, t, new_allowed, depth_from_start, state);
        }

        let candidates: Vec<NodeId> = if dep_name_id == self.root_name_id {
            vec![self.root_id]
        } else {
            self.adj
                .candidates_newest_first(node_id, dep_name_id, t, self.max_candidates_per_dep)
                .collect()
        };

        let mut any_tried = false;
        for dst_id in candidates {
            any_tried = true;

            let Some(tm) = self.arrays.upload_time(dst_id) else {
                continue;
            };
            if tm > t {
                continue;
            }

            let new_allowed = allowed_py & self.arrays.py_mask(dst_id);
            if new_allowed.is_empty() {
                continue;
            }

            if state.in_stack.contains(&dst_id) {
                continue;
            }

            state.chosen.insert(dep_name_id, dst_id);
            state.in_stack.insert(dst_id);

            let ok_child = self.solve_node(dst_id, t, new_allowed, depth_from_start + 1, state);

            state.in_stack.remove(&dst_id);

            if ok_child {
                if dst_id == self.root_id {
                    let d = depth_from_start + 1;
                    if state.best_depth.map_or(true, |bd| d < bd) {
                        state.best_depth = Some(d);
                    }
                }

                if self.backtrack(dep_ids, i + 1, node_id, t, new_allowed, depth_from_start, state) {
                    return true;
                }
            }

            state.chosen.remove(&dep_name_id);
        }

        if !any_tried {
            state.record(FailReason::NoCandidatesForDep);
        } else {
            state.record(FailReason::AllCandidatesFailedForDep);
        }
        false
    }
}
