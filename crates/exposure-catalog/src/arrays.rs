use exposure_types::{NameId, NodeId, PyMask};

/// Flat, node-indexed arrays: upload time, Python mask, package-name id.
///
/// Load cost is `O(|Nodes|)`; lookups are `O(1)` and infallible. These are
/// the hottest lookups in the solver's inner loop, so they are plain array
/// fetches guarded by a bounds check rather than a `HashMap` — matching
/// `pipstyle.loader.ResolutionContext`'s `node_py_mask`/`node_time`/`node_name_id`
/// lists, which are indexed the same way (`node_time[nid] if nid < len(...)
/// else None`).
#[derive(Debug, Clone, Default)]
pub struct CatalogArrays {
    upload_time: Vec<Option<i64>>,
    py_mask: Vec<PyMask>,
    name_id: Vec<Option<NameId>>,
}

impl CatalogArrays {
    /// Builds the arrays from parallel, node-indexed data. All three slices
    /// are expected to already share the same length (the loader pads them
    /// to `max_node_id + 1` before calling this), but lookups degrade
    /// gracefully even if they don't.
    pub fn new(
        upload_time: Vec<Option<i64>>,
        py_mask: Vec<PyMask>,
        name_id: Vec<Option<NameId>>,
    ) -> Self {
        Self {
            upload_time,
            py_mask,
            name_id,
        }
    }

    /// Epoch-seconds upload time for `node`, or `None` if missing or
    /// out of range. A missing upload time means the node is unusable as a
    /// choice (`spec.md` §3).
    pub fn upload_time(&self, node: NodeId) -> Option<i64> {
        self.upload_time.get(node.index()).copied().flatten()
    }

    /// Python-compatibility bitmask for `node`. Out-of-range or unrecorded
    /// nodes report [`PyMask::ALL`], never an empty mask.
    pub fn py_mask(&self, node: NodeId) -> PyMask {
        self.py_mask.get(node.index()).copied().unwrap_or(PyMask::ALL)
    }

    /// The package-name id `node` is a version of, or `None` if missing or
    /// out of range. A missing name id means the node cannot participate in
    /// global-consistency pinning.
    pub fn name_id(&self, node: NodeId) -> Option<NameId> {
        self.name_id.get(node.index()).copied().flatten()
    }

    /// Number of nodes the arrays were built with.
    pub fn len(&self) -> usize {
        self.upload_time.len()
    }

    /// True if the arrays hold no nodes.
    pub fn is_empty(&self) -> bool {
        self.upload_time.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_is_missing() {
        let arrays = CatalogArrays::new(vec![Some(10)], vec![PyMask(0b11)], vec![Some(NameId(0))]);
        assert_eq!(arrays.upload_time(NodeId(5)), None);
        assert_eq!(arrays.py_mask(NodeId(5)), PyMask::ALL);
        assert_eq!(arrays.name_id(NodeId(5)), None);
    }

    #[test]
    fn in_range_lookups() {
        let arrays = CatalogArrays::new(vec![Some(10), None], vec![PyMask(0b11), PyMask(0)], vec![Some(NameId(0)), None]);
        assert_eq!(arrays.upload_time(NodeId(0)), Some(10));
        assert_eq!(arrays.upload_time(NodeId(1)), None);
        assert_eq!(arrays.py_mask(NodeId(1)), PyMask(0));
        assert_eq!(arrays.name_id(NodeId(1)), None);
    }
}
