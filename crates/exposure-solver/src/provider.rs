//! DB-backed provider for the resolvelib-style loop, mirroring `pipstyle.provider.DBProvider`:
//! all candidate discovery, root pinning, and time/Python filtering happen here, not in
//! [`crate::resolver::Resolver`] itself.

use crate::resolver::ExposureProvider;
use crate::types::{Candidate, Requirement};
use exposure_catalog::{AdjStore, CatalogArrays};
use exposure_types::{NameId, NodeId, PyMask};
use std::collections::{HashMap, HashSet};

/// Provider fixed to one `(start, root, t)` query, exactly as `DBProvider.__init__` fixes them
/// for the lifetime of a single `resolve()` call.
pub struct DbProvider<'a> {
    adj: &'a AdjStore,
    arrays: &'a CatalogArrays,
    start_node_id: NodeId,
    root_node_id: NodeId,
    root_name_id: NameId,
    t: i64,
}

impl<'a> DbProvider<'a> {
    pub fn new(
        adj: &'a AdjStore,
        arrays: &'a CatalogArrays,
        start_node_id: NodeId,
        root_node_id: NodeId,
        root_name_id: NameId,
        t: i64,
    ) -> Self {
        Self {
            adj,
            arrays,
            start_node_id,
            root_node_id,
            root_name_id,
            t,
        }
    }

    /// The root requirement for `start_name_id`, with no parent.
    pub fn root_requirement(&self, start_name_id: NameId) -> Requirement {
        Requirement {
            name_id: start_name_id,
            parent: None,
        }
    }

    /// Intersection of Python masks over every currently pinned candidate.
    /// `ALL` (no constraint) when nothing is pinned yet.
    fn allowed_py_mask(&self, resolutions: &HashMap<NameId, Candidate>) -> PyMask {
        let mut mask = PyMask::ALL;
        for cand in resolutions.values() {
            mask = mask & self.arrays.py_mask(cand.node_id);
            if mask.is_empty() {
                break;
            }
        }
        mask
    }
}

impl ExposureProvider for DbProvider<'_> {
    fn find_matches(
        &self,
        identifier: NameId,
        requirements: &[Requirement],
        incompatibilities: &[Candidate],
        resolutions: &HashMap<NameId, Candidate>,
    ) -> Vec<Candidate> {
        let has_root_requirement = requirements.iter().any(|r| r.parent.is_none());

        let allowed: HashSet<NodeId> = if has_root_requirement {
            std::iter::once(self.start_node_id).collect()
        } else if identifier == self.root_name_id {
            match self.arrays.upload_time(self.root_node_id) {
                Some(tm) if tm <= self.t => std::iter::once(self.root_node_id).collect(),
                _ => HashSet::new(),
            }
        } else {
            let parent_ids: Vec<NodeId> = requirements.iter().filter_map(|r| r.parent.map(|c| c.node_id)).collect();
            if parent_ids.is_empty() {
                HashSet::new()
            } else {
                let mut allowed: Option<HashSet<NodeId>> = None;
                for src_id in parent_ids {
                    let cands: HashSet<NodeId> = self
                        .adj
                        .candidates_newest_first(src_id, identifier, self.t, None)
                        .collect();
                    allowed = Some(match allowed {
                        None => cands,
                        Some(prev) => prev.intersection(&cands).copied().collect(),
                    });
                }
                allowed.unwrap_or_default()
            }
        };

        let incompat_set: HashSet<NodeId> = incompatibilities.iter().map(|c| c.node_id).collect();
        let allowed_py = self.allowed_py_mask(resolutions);

        let mut valid: Vec<NodeId> = allowed
            .into_iter()
            .filter(|nid| !incompat_set.contains(nid))
            .filter(|&nid| matches!(self.arrays.upload_time(nid), Some(tm) if tm <= self.t))
            .filter(|&nid| !(self.arrays.py_mask(nid) & allowed_py).is_empty())
            .collect();

        valid.sort_by_key(|&nid| std::cmp::Reverse(self.arrays.upload_time(nid).unwrap_or(0)));

        valid
            .into_iter()
            .map(|nid| Candidate {
                node_id: nid,
                name_id: self.arrays.name_id(nid).unwrap_or(identifier),
            })
            .collect()
    }

    fn is_satisfied_by(&self, requirement: &Requirement, candidate: &Candidate) -> bool {
        if candidate.name_id != requirement.name_id {
            return false;
        }
        match requirement.parent {
            None => candidate.node_id == self.start_node_id,
            Some(parent) => {
                if self.root_name_id == requirement.name_id {
                    candidate.node_id == self.root_node_id
                } else {
                    self.adj
                        .edge_exists(parent.node_id, requirement.name_id, candidate.node_id, self.t)
                }
            }
        }
    }

    fn get_dependencies(&self, candidate: &Candidate) -> Vec<Requirement> {
        self.adj
            .dep_names(candidate.node_id)
            .iter()
            .map(|&dep_name_id| Requirement {
                name_id: dep_name_id,
                parent: Some(*candidate),
            })
            .collect()
    }

    fn get_preference(&self, identifier: NameId, _resolutions: &HashMap<NameId, Candidate>) -> i64 {
        identifier.0 as i64
    }
}
