//! A small, generic resolvelib-style resolution loop (`spec.md` §4.5).
//!
//! The vendored `pipstyle.resolvelib` package is not ported; its observable
//! contract — criteria keyed by identifier, conflict tracking via
//! per-identifier incompatibility sets, round-bounded backjumping — is
//! reimplemented directly against an [`ExposureProvider`], generic the same
//! way `resolve/dependency_provider.rs` + `resolve/solve.rs` are generic
//! over `resolvo`'s `DependencyProvider`.

use crate::error::{ResolutionImpossible, ResolutionTooDeep, ResolveError};
use crate::types::{Candidate, Requirement};
use exposure_types::NameId;
use std::collections::{HashMap, HashSet};

/// Per-identifier resolution state: the accumulated requirements that must
/// be satisfied, and the candidates already ruled out.
#[derive(Debug, Default, Clone)]
struct Criterion {
    requirements: Vec<Requirement>,
    incompatibilities: Vec<Candidate>,
}

/// Parent-depends-on-child edges between package-name identifiers,
/// mirroring `resolvelib`'s `Result.graph._forwards` that `entrypoint.py`
/// walks in `_compute_depth`/`_build_dependency_tree`.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    forwards: HashMap<NameId, HashSet<NameId>>,
}

impl DependencyGraph {
    fn add_edge(&mut self, from: NameId, to: NameId) {
        self.forwards.entry(from).or_default().insert(to);
    }

    /// Identifiers `from` directly depends on, in the resolved graph.
    pub fn children(&self, from: NameId) -> impl Iterator<Item = NameId> + '_ {
        self.forwards.get(&from).into_iter().flatten().copied()
    }

    /// All `(parent, child)` edges, for building a flat dependency tree.
    pub fn edges(&self) -> impl Iterator<Item = (NameId, NameId)> + '_ {
        self.forwards
            .iter()
            .flat_map(|(&from, tos)| tos.iter().map(move |&to| (from, to)))
    }
}

/// A successful resolution: one candidate per identifier, plus the
/// dependency graph between identifiers.
#[derive(Debug, Clone)]
pub struct ResolverResult {
    pub mapping: HashMap<NameId, Candidate>,
    pub graph: DependencyGraph,
}

/// The five-method provider contract the resolution loop drives, matching
/// `pipstyle.resolvelib.providers.AbstractProvider`'s shape.
pub trait ExposureProvider {
    /// Candidates for `identifier` consistent with `requirements`, after
    /// excluding `incompatibilities`, given the identifiers already pinned
    /// in `resolutions`. Expected newest-first, as `find_matches` yields in
    /// the Python provider.
    fn find_matches(
        &self,
        identifier: NameId,
        requirements: &[Requirement],
        incompatibilities: &[Candidate],
        resolutions: &HashMap<NameId, Candidate>,
    ) -> Vec<Candidate>;

    /// Whether `candidate` satisfies `requirement`.
    fn is_satisfied_by(&self, requirement: &Requirement, candidate: &Candidate) -> bool;

    /// The requirements introduced by pinning `candidate`.
    fn get_dependencies(&self, candidate: &Candidate) -> Vec<Requirement>;

    /// Lower is resolved first. The reference implementation ([`crate::provider::DbProvider`])
    /// returns the identifier itself, an arbitrary but deterministic order.
    fn get_preference(&self, identifier: NameId, resolutions: &HashMap<NameId, Candidate>) -> i64;
}

/// Drives an [`ExposureProvider`] to a fixed point or reports why it
/// couldn't reach one.
pub struct Resolver<P> {
    provider: P,
}

impl<P: ExposureProvider> Resolver<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Resolves `root_requirements`, bounded to `max_rounds` rounds.
    pub fn resolve(
        &self,
        root_requirements: Vec<Requirement>,
        max_rounds: usize,
    ) -> Result<ResolverResult, ResolveError> {
        let mut criteria: HashMap<NameId, Criterion> = HashMap::new();
        let mut mapping: HashMap<NameId, Candidate> = HashMap::new();
        let mut graph = DependencyGraph::default();

        for req in root_requirements {
            criteria.entry(req.name_id).or_default().requirements.push(req);
        }

        for _round in 0..max_rounds {
            self.evict_stale_pins(&mut criteria, &mut mapping);

            let mut unresolved: Vec<NameId> = criteria
                .keys()
                .filter(|id| !mapping.contains_key(id))
                .copied()
                .collect();

            if unresolved.is_empty() {
                return Ok(ResolverResult { mapping, graph });
            }

            unresolved.sort_by_key(|&id| (self.provider.get_preference(id, &mapping), id.0));
            let identifier = unresolved[0];

            let crit = criteria.get(&identifier).expect("criterion must exist for an unresolved identifier");
            let candidates = self.provider.find_matches(
                identifier,
                &crit.requirements,
                &crit.incompatibilities,
                &mapping,
            );

            let chosen = candidates
                .into_iter()
                .find(|cand| crit.requirements.iter().all(|r| self.provider.is_satisfied_by(r, cand)));

            let Some(candidate) = chosen else {
                return Err(ResolveError::Impossible(ResolutionImpossible));
            };

            mapping.insert(identifier, candidate);

            for dep in self.provider.get_dependencies(&candidate) {
                graph.add_edge(identifier, dep.name_id);
                let dep_crit = criteria.entry(dep.name_id).or_default();
                if !dep_crit.requirements.contains(&dep) {
                    dep_crit.requirements.push(dep);
                }
            }
        }

        Err(ResolveError::TooDeep(ResolutionTooDeep { max_rounds }))
    }

    /// Removes pins that no longer satisfy every requirement on their
    /// identifier (a later-discovered requirement narrowed the criterion),
    /// recording the stale candidate as an incompatibility so the next
    /// `find_matches` call for that identifier excludes it.
    fn evict_stale_pins(
        &self,
        criteria: &mut HashMap<NameId, Criterion>,
        mapping: &mut HashMap<NameId, Candidate>,
    ) {
        let stale: Vec<NameId> = mapping
            .iter()
            .filter(|(id, cand)| {
                let crit = &criteria[id];
                !crit.requirements.iter().all(|r| self.provider.is_satisfied_by(r, cand))
            })
            .map(|(id, _)| *id)
            .collect();

        for id in stale {
            if let Some(cand) = mapping.remove(&id) {
                criteria.get_mut(&id).unwrap().incompatibilities.push(cand);
            }
        }
    }
}
