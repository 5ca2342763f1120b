use std::fmt;
use std::ops::BitAnd;

/// Up to 26 bits, one per compatible Python interpreter version.
///
/// A missing mask on a node is represented by [`PyMask::ALL`] (the observed
/// OR of every known mask), per `spec.md` §3: "Missing → treated as the
/// observed OR of all known masks (`ALL_MASK`)".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PyMask(pub u32);

impl PyMask {
    /// All 26 Python-version bits set. Used as the fallback "all known
    /// masks OR'd together" value when the catalog observes no masks at
    /// all (see `pipstyle.loader.load_context`'s `all_mask` fallback).
    pub const ALL: PyMask = PyMask((1u32 << 26) - 1);

    /// The empty mask: no interpreter is compatible.
    pub const NONE: PyMask = PyMask(0);

    /// True if no interpreter version satisfies this mask.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitAnd for PyMask {
    type Output = PyMask;

    fn bitand(self, rhs: Self) -> Self::Output {
        PyMask(self.0 & rhs.0)
    }
}

impl fmt::Display for PyMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#028b}", self.0)
    }
}
