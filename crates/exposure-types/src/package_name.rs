use miette::Diagnostic;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;
use thiserror::Error;

/// A canonicalized package name.
///
/// Stores both the source string this instance was created from and its
/// normalized form, so that the original spelling is never lost even
/// though equality, hashing and ordering all go through the normalized
/// form. Validation and normalization follow PEP 503, the same rule the
/// catalog's own name canonicalization is assumed to already apply.
#[derive(Debug, Clone, Eq)]
pub struct PackageName {
    source: Box<str>,
    normalized: Box<str>,
}

impl PackageName {
    /// The string this instance was created from.
    pub fn as_source_str(&self) -> &str {
        self.source.as_ref()
    }

    /// The normalized form: lowercase, with runs of `-`, `_`, `.` folded to
    /// a single `-`.
    pub fn as_str(&self) -> &str {
        self.normalized.as_ref()
    }
}

/// Error parsing a [`PackageName`].
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum ParsePackageNameError {
    /// The string did not match the PEP 503 name grammar.
    #[error("invalid package name '{0}'")]
    InvalidPackageName(String),
}

impl FromStr for PackageName {
    type Err = ParsePackageNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static NAME_VALIDATE: OnceLock<regex::Regex> = OnceLock::new();
        let name_validate = NAME_VALIDATE.get_or_init(|| {
            // https://packaging.python.org/specifications/core-metadata/#name
            regex::Regex::new(r"(?i-u)^([A-Z0-9]|[A-Z0-9][A-Z0-9._-]*[A-Z0-9])$").unwrap()
        });

        if !name_validate.is_match(s) {
            return Err(ParsePackageNameError::InvalidPackageName(s.to_owned()));
        }

        // https://www.python.org/dev/peps/pep-0503/#normalized-names
        let mut normalized = s.replace(['-', '_', '.'], "-");
        normalized.make_ascii_lowercase();

        Ok(PackageName {
            source: s.to_owned().into_boxed_str(),
            normalized: normalized.into_boxed_str(),
        })
    }
}

impl Hash for PackageName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state)
    }
}

impl PartialEq for PackageName {
    fn eq(&self, other: &Self) -> bool {
        self.normalized.eq(&other.normalized)
    }
}

impl PartialOrd for PackageName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.normalized.cmp(&other.normalized)
    }
}

impl Display for PackageName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_dashes_dots_underscores() {
        let a: PackageName = "Foo.Bar_Baz".parse().unwrap();
        let b: PackageName = "foo-bar-baz".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "foo-bar-baz");
        assert_eq!(a.as_source_str(), "Foo.Bar_Baz");
    }

    #[test]
    fn rejects_invalid_name() {
        assert!("".parse::<PackageName>().is_err());
        assert!("-leading-dash".parse::<PackageName>().is_err());
    }
}
