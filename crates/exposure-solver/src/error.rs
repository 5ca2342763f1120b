use miette::Diagnostic;
use thiserror::Error;

/// Raised by [`crate::resolver::Resolver::resolve`] when no assignment
/// satisfies every requirement, mirroring `resolvelib.resolvers.ResolutionImpossible`.
#[derive(Debug, Error, Diagnostic)]
#[error("no assignment satisfies all requirements")]
pub struct ResolutionImpossible;

/// Raised when resolution exceeds its round budget, mirroring
/// `resolvelib.resolvers.ResolutionTooDeep`.
#[derive(Debug, Error, Diagnostic)]
#[error("resolution exceeded {max_rounds} rounds without converging")]
pub struct ResolutionTooDeep {
    pub max_rounds: usize,
}

/// The two ways [`crate::resolver::Resolver::resolve`] can fail.
#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Impossible(#[from] ResolutionImpossible),

    #[error(transparent)]
    #[diagnostic(transparent)]
    TooDeep(#[from] ResolutionTooDeep),
}
