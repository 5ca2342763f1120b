//! Tunable knobs for context loading and resolution, modeled on
//! `solve_options.rs::ResolveOptions`'s builder-setter shape.

use exposure_catalog::AdjStoreCacheSizes;
use exposure_solver::DEFAULT_MAX_ROUNDS;

/// Which resolution front `resolve()` should treat as authoritative for
/// `ok`/`depth`. See `DESIGN.md` for why the resolver loop is the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResolutionFront {
    /// Run the resolvelib-style resolver loop (C5): matches
    /// `pipstyle.entrypoint.ResolutionRunner.resolve` exactly, including its
    /// BFS-over-NameIds depth computation and dependency-tree emission.
    #[default]
    Resolver,
    /// Run the backtracking solver (C4) instead: cheaper (no dependency
    /// graph is built), but cannot emit a `--debug` tree shaped by pinned
    /// candidates in the resolver sense.
    Backtracker,
}

/// Additional options that influence context loading and resolution. Passing
/// [`Default::default`] gives sane defaults matching `pipstyle`'s own.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// LRU capacities for the header/chunk/edge caches behind `AdjStore`.
    pub cache_sizes: AdjStoreCacheSizes,

    /// Caps candidates considered per dependency name, `0` meaning
    /// unlimited. Only consulted by the backtracking front.
    pub max_candidates_per_dep: usize,

    /// Round budget for the resolver front before `ResolutionTooDeep`.
    pub max_rounds: usize,

    /// Which front `resolve()` runs.
    pub front: ResolutionFront,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            cache_sizes: AdjStoreCacheSizes::default(),
            max_candidates_per_dep: 0,
            max_rounds: DEFAULT_MAX_ROUNDS,
            front: ResolutionFront::default(),
        }
    }
}

impl EngineOptions {
    /// Change the LRU cache capacities behind `AdjStore`.
    pub fn with_cache_sizes(&mut self, cache_sizes: AdjStoreCacheSizes) -> &mut Self {
        self.cache_sizes = cache_sizes;
        self
    }

    /// Change the per-dependency candidate cap (`0` = unlimited).
    pub fn with_max_candidates_per_dep(&mut self, max_candidates_per_dep: usize) -> &mut Self {
        self.max_candidates_per_dep = max_candidates_per_dep;
        self
    }

    /// Change the resolver round budget.
    pub fn with_max_rounds(&mut self, max_rounds: usize) -> &mut Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Change which resolution front `resolve()` runs.
    pub fn with_front(&mut self, front: ResolutionFront) -> &mut Self {
        self.front = front;
        self
    }

    pub(crate) fn max_candidates_per_dep_opt(&self) -> Option<usize> {
        match self.max_candidates_per_dep {
            0 => None,
            n => Some(n),
        }
    }
}
