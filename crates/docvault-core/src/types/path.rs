//! Materialized folder paths.
//!
//! A path is a `/`-joined sequence of folder names. The root is the empty
//! path. Leading and trailing slashes are accepted on input and dropped.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A validated folder path. `FolderPath::root()` is the empty path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FolderPath(String);

impl FolderPath {
    /// The root sentinel.
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Parse and normalize a path string.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let trimmed = raw.trim().trim_matches('/');
        if trimmed.is_empty() {
            return Ok(Self::root());
        }
        for segment in trimmed.split('/') {
            validate_segment(segment)?;
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Whether this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The normalized string form (empty for root).
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the folder names in this path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Number of segments (0 for root).
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// The last segment, or `None` for root.
    pub fn name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.0.rsplit('/').next()
        }
    }

    /// The parent path, or `None` for root.
    pub fn parent(&self) -> Option<FolderPath> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => Some(Self::root()),
        }
    }

    /// Append a single folder name.
    pub fn join(&self, name: &str) -> Result<FolderPath, AppError> {
        validate_segment(name)?;
        if self.is_root() {
            Ok(Self(name.to_string()))
        } else {
            Ok(Self(format!("{}/{}", self.0, name)))
        }
    }

    /// Every non-root path from the first segment down to and including this one.
    ///
    /// A path is valid only if each of these names an existing folder.
    pub fn ancestors(&self) -> Vec<FolderPath> {
        let mut out = Vec::with_capacity(self.depth());
        let mut current = Self::root();
        for segment in self.segments() {
            current = Self(if current.is_root() {
                segment.to_string()
            } else {
                format!("{}/{}", current.0, segment)
            });
            out.push(current.clone());
        }
        out
    }

    /// Whether this path equals `other` or lies beneath it.
    pub fn is_within(&self, other: &FolderPath) -> bool {
        if other.is_root() || self == other {
            return true;
        }
        self.0.starts_with(&other.0) && self.0.as_bytes().get(other.0.len()) == Some(&b'/')
    }

    /// Re-root this path from `from` to `to`, or `None` if it does not lie
    /// within `from`.
    pub fn rebase(&self, from: &FolderPath, to: &FolderPath) -> Option<FolderPath> {
        if !self.is_within(from) {
            return None;
        }
        let rest = if from.is_root() {
            self.0.as_str()
        } else {
            self.0[from.0.len()..].trim_start_matches('/')
        };
        Some(match (to.is_root(), rest.is_empty()) {
            (_, true) => to.clone(),
            (true, false) => Self(rest.to_string()),
            (false, false) => Self(format!("{}/{}", to.0, rest)),
        })
    }
}

fn validate_segment(segment: &str) -> Result<(), AppError> {
    if segment.trim().is_empty() {
        return Err(AppError::validation("Folder name cannot be empty"));
    }
    if segment == "." || segment == ".." {
        return Err(AppError::validation(format!(
            "'{segment}' is not a valid folder name"
        )));
    }
    if segment.contains('/') {
        return Err(AppError::validation(format!(
            "Folder name '{segment}' cannot contain '/'"
        )));
    }
    Ok(())
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0)
    }
}

impl FromStr for FolderPath {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FolderPath {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FolderPath> for String {
    fn from(path: FolderPath) -> String {
        path.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(raw: &str) -> FolderPath {
        FolderPath::parse(raw).expect("valid path")
    }

    #[test]
    fn test_root_normalization() {
        assert!(p("").is_root());
        assert!(p("/").is_root());
        assert_eq!(p("/docs/reports/").as_str(), "docs/reports");
    }

    #[test]
    fn test_rejects_bad_segments() {
        assert!(FolderPath::parse("docs//reports").is_err());
        assert!(FolderPath::parse("docs/../etc").is_err());
        assert!(FolderPath::root().join("a/b").is_err());
        assert!(FolderPath::root().join("  ").is_err());
    }

    #[test]
    fn test_parent_and_name() {
        let path = p("docs/reports/2024");
        assert_eq!(path.name(), Some("2024"));
        assert_eq!(path.parent(), Some(p("docs/reports")));
        assert_eq!(p("docs").parent(), Some(FolderPath::root()));
        assert_eq!(FolderPath::root().parent(), None);
    }

    #[test]
    fn test_ancestors_include_self() {
        let names: Vec<String> = p("a/b/c")
            .ancestors()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(names, vec!["a", "a/b", "a/b/c"]);
        assert!(FolderPath::root().ancestors().is_empty());
    }

    #[test]
    fn test_is_within() {
        assert!(p("a/b").is_within(&p("a")));
        assert!(p("a").is_within(&p("a")));
        assert!(p("a").is_within(&FolderPath::root()));
        assert!(!p("ab").is_within(&p("a")));
        assert!(!p("a").is_within(&p("a/b")));
    }

    #[test]
    fn test_rebase() {
        assert_eq!(p("a/b/c").rebase(&p("a/b"), &p("x")), Some(p("x/c")));
        assert_eq!(p("a/b").rebase(&p("a/b"), &p("x/y")), Some(p("x/y")));
        assert_eq!(p("a/b").rebase(&p("a"), &FolderPath::root()), Some(p("b")));
        assert_eq!(p("a").rebase(&FolderPath::root(), &p("z")), Some(p("z/a")));
        assert_eq!(p("ab").rebase(&p("a"), &p("x")), None);
    }

    #[test]
    fn test_serde_validates() {
        let path: FolderPath = serde_json::from_str("\"/x/y\"").expect("deserialize");
        assert_eq!(path, p("x/y"));
        assert!(serde_json::from_str::<FolderPath>("\"x//y\"").is_err());
    }
}
