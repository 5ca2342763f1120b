use std::fmt;

/// Identifies a specific `(package_name, version)` row in the catalog.
///
/// Dense and array-indexed: [`NodeId`] values are used directly as indices
/// into [`crate::PyMask`]/upload-time/name-id arrays, so callers should treat
/// out-of-range ids as "missing" rather than as a programming error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Returns the id as a plain array index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        NodeId(value)
    }
}

/// Identifies a canonicalized package name.
///
/// Dense, like [`NodeId`]; the pin set used by both resolution fronts is
/// keyed by `NameId` so that "one version per package name" is simply "one
/// entry per key" in a map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct NameId(pub u32);

impl NameId {
    /// Returns the id as a plain array index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NameId {
    fn from(value: u32) -> Self {
        NameId(value)
    }
}
