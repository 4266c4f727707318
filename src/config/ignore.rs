// Ignore list module
// Path patterns that are invisible to clients, matched segment by segment

use serde::Deserialize;

/// Patterns ignored regardless of configuration
pub const DEFAULT_IGNORES: &[&str] = &[".DS_Store", ".git/"];

/// A single ignore pattern.
///
/// - `name` matches any path segment called `name`, at any depth
/// - `name/` does the same but only for directories
/// - `a/b` or `/a` is anchored at the served root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnorePattern {
    segments: Vec<String>,
    dir_only: bool,
    anchored: bool,
}

impl IgnorePattern {
    /// Parse a pattern, returns `None` for blank input
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let segments: Vec<String> = raw
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .map(ToString::to_string)
            .collect();
        if segments.is_empty() {
            return None;
        }
        Some(Self {
            anchored: raw.starts_with('/') || segments.len() > 1,
            dir_only: raw.ends_with('/'),
            segments,
        })
    }

    /// Check a root-relative path. `is_dir` describes the last segment;
    /// every earlier segment is a directory by construction.
    pub fn matches<S: AsRef<str>>(&self, path: &[S], is_dir: bool) -> bool {
        let Some(last) = path.len().checked_sub(1) else {
            return false;
        };

        if self.anchored {
            let n = self.segments.len();
            if path.len() < n {
                return false;
            }
            let prefix_matches = path
                .iter()
                .zip(&self.segments)
                .all(|(seg, pat)| seg.as_ref() == pat);
            return prefix_matches && (!self.dir_only || path.len() > n || is_dir);
        }

        let name = &self.segments[0];
        path.iter()
            .enumerate()
            .any(|(i, seg)| seg.as_ref() == name && (!self.dir_only || i < last || is_dir))
    }
}

/// Ordered set of ignore patterns
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<String>")]
pub struct IgnoreList {
    patterns: Vec<IgnorePattern>,
}

impl From<Vec<String>> for IgnoreList {
    fn from(raw: Vec<String>) -> Self {
        raw.iter().map(String::as_str).collect()
    }
}

impl<'a> FromIterator<&'a str> for IgnoreList {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut list = Self::default();
        for raw in iter {
            list.push(raw);
        }
        list
    }
}

impl IgnoreList {
    /// Default patterns followed by `self`'s patterns
    #[must_use]
    pub fn with_defaults(self) -> Self {
        let mut list: Self = DEFAULT_IGNORES.iter().copied().collect();
        for pattern in self.patterns {
            if !list.patterns.contains(&pattern) {
                list.patterns.push(pattern);
            }
        }
        list
    }

    /// Append a pattern, skipping blanks and duplicates
    pub fn push(&mut self, raw: &str) {
        if let Some(pattern) = IgnorePattern::parse(raw) {
            if !self.patterns.contains(&pattern) {
                self.patterns.push(pattern);
            }
        }
    }

    pub fn is_ignored<S: AsRef<str>>(&self, path: &[S], is_dir: bool) -> bool {
        self.patterns.iter().any(|p| p.matches(path, is_dir))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> IgnoreList {
        IgnoreList::default().with_defaults()
    }

    #[test]
    fn test_git_subtree_ignored() {
        let list = defaults();
        assert!(list.is_ignored(&[".git"], true));
        assert!(list.is_ignored(&[".git", "config"], false));
        assert!(list.is_ignored(&["sub", ".git", "HEAD"], false));
    }

    #[test]
    fn test_dir_pattern_does_not_hide_plain_file() {
        let list = defaults();
        // `.git/` only applies to directories
        assert!(!list.is_ignored(&[".git"], false));
    }

    #[test]
    fn test_segment_match_not_substring() {
        let list = defaults();
        assert!(!list.is_ignored(&["mygit", "config"], false));
        assert!(!list.is_ignored(&[".github", "workflows"], false));
        assert!(!list.is_ignored(&["notes.DS_Store"], false));
    }

    #[test]
    fn test_file_pattern_any_depth() {
        let list = defaults();
        assert!(list.is_ignored(&[".DS_Store"], false));
        assert!(list.is_ignored(&["a", "b", ".DS_Store"], false));
    }

    #[test]
    fn test_anchored_pattern() {
        let list: IgnoreList = ["docs/private", "/build"].into_iter().collect();
        assert!(list.is_ignored(&["docs", "private"], true));
        assert!(list.is_ignored(&["docs", "private", "x.txt"], false));
        assert!(!list.is_ignored(&["other", "docs", "private"], true));
        assert!(list.is_ignored(&["build"], false));
        assert!(!list.is_ignored(&["src", "build"], false));
    }

    #[test]
    fn test_root_is_never_ignored() {
        let list = defaults();
        let empty: [&str; 0] = [];
        assert!(!list.is_ignored(&empty, true));
    }

    #[test]
    fn test_with_defaults_keeps_order_and_dedups() {
        let list = IgnoreList::from(vec![
            "node_modules".to_string(),
            ".git/".to_string(),
            "  ".to_string(),
        ])
        .with_defaults();
        assert_eq!(list.len(), 3);
        assert!(list.is_ignored(&["node_modules"], true));
    }
}
