use std::fmt;

/// Why an `exposure()` query failed, for diagnostics.
///
/// This is plain data, not an error type: a failed exposure check is an
/// expected, successfully-computed outcome, not a propagating failure (see
/// `spec.md` §7, "no failure kind aborts the batch driver").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailReason {
    /// The start node has no recorded upload time.
    StartTimeMissing,
    /// The start node could not be mapped to a package name.
    StartNameMissing,
    /// The start node's upload time is after the cutoff.
    StartAfterT,
    /// The start node's Python mask is empty.
    StartPymaskZero,
    /// Start and root Python masks do not intersect.
    RootPymaskConflictAtStart,
    /// No candidate exists for a dependency name at all.
    NoCandidatesForDep,
    /// Candidates existed but none led to a satisfiable assignment.
    AllCandidatesFailedForDep,
    /// A dependency name was already pinned, but the catalog has no edge to it.
    EdgeMissingForChosen,
    /// A dependency name was already pinned, but the Python masks conflict.
    PythonConflictWithChosen,
    /// A dependency name was already pinned to a node invalid at time `t`.
    ChosenDstTimeInvalid,
    /// Recursing into an already-pinned child failed.
    ChildUnsatWithChosen,
    /// No search failure was recorded, yet the search was not successful
    /// (e.g. because root was never a requirement). Mirrors the Python
    /// fallback reason `"unsat"`.
    Unsat,
}

impl fmt::Display for FailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailReason::StartTimeMissing => "start_time_missing",
            FailReason::StartNameMissing => "start_name_missing",
            FailReason::StartAfterT => "start_after_t",
            FailReason::StartPymaskZero => "start_pymask_zero",
            FailReason::RootPymaskConflictAtStart => "root_pymask_conflict_at_start",
            FailReason::NoCandidatesForDep => "no_candidates_for_dep",
            FailReason::AllCandidatesFailedForDep => "all_candidates_failed_for_dep",
            FailReason::EdgeMissingForChosen => "edge_missing_for_chosen",
            FailReason::PythonConflictWithChosen => "python_conflict_with_chosen",
            FailReason::ChosenDstTimeInvalid => "chosen_dst_time_invalid",
            FailReason::ChildUnsatWithChosen => "child_unsat_with_chosen",
            FailReason::Unsat => "unsat",
        };
        f.write_str(s)
    }
}
