use exposure_types::NameId;

/// A specific `(package, version)`, identified by its dense node id.
///
/// Equality and hashing are keyed on `node_id` alone, mirroring the Python
/// `Candidate.__eq__`/`__hash__` (a candidate's identity in the resolver is
/// purely "which node", not also "which name" — though the two always
/// agree in a well-formed catalog).
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub node_id: exposure_types::NodeId,
    pub name_id: NameId,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.node_id == other.node_id
    }
}

impl Eq for Candidate {}

impl std::hash::Hash for Candidate {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.node_id.hash(state);
    }
}

/// A dependency on `name_id`, requested by `parent` (`None` for the root
/// requirement: the package the caller is resolving for).
#[derive(Debug, Clone, Copy)]
pub struct Requirement {
    pub name_id: NameId,
    pub parent: Option<Candidate>,
}

impl PartialEq for Requirement {
    fn eq(&self, other: &Self) -> bool {
        self.name_id == other.name_id
            && self.parent.map(|c| c.node_id) == other.parent.map(|c| c.node_id)
    }
}

impl Eq for Requirement {}

impl std::hash::Hash for Requirement {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name_id.hash(state);
        self.parent.map(|c| c.node_id).hash(state);
    }
}
