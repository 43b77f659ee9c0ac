//! Canonical path helpers.
//!
//! Index paths, tracked roots and tree-node paths all share one form:
//! components relative to the canonical root joined by `/`, with no leading,
//! trailing or doubled separators. The canonical root itself is `""`.
//! Prefix tests are component-wise, so `home/a` is not under `home/ab`.

use crate::error::{IndexError, IndexResult};

/// Bring a `/`-separated path into canonical form.
///
/// Empty and `.` components are dropped; `..` is rejected because it would
/// let a path escape the canonical root.
pub fn normalize(raw: &str) -> IndexResult<String> {
    let mut parts = Vec::new();
    for component in raw.split('/') {
        match component {
            "" | "." => {}
            ".." => return Err(IndexError::InvalidPath(raw.to_string())),
            other => parts.push(other),
        }
    }
    Ok(parts.join("/"))
}

/// Returns `true` when `path` equals `prefix` or lies beneath it.
pub fn is_under(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => rest.starts_with('/'),
        None => false,
    }
}

/// Proper ancestors of a canonical path, nearest first. The canonical root
/// is not included.
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> + '_ {
    path.rmatch_indices('/').map(move |(i, _)| &path[..i])
}

/// Append one component to a canonical path.
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Last component of a canonical path (`""` for the canonical root).
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancestors_walk_upwards() {
        let found: Vec<_> = ancestors("home/u/.config/nvim").collect();
        assert_eq!(found, vec!["home/u/.config", "home/u", "home"]);
        assert_eq!(ancestors("top").count(), 0);
    }

    #[test]
    fn normalize_strips_separators() {
        assert_eq!(normalize("/home/u/.config/").unwrap(), "home/u/.config");
        assert_eq!(normalize("a//b/./c").unwrap(), "a/b/c");
        assert_eq!(normalize("/").unwrap(), "");
    }

    #[test]
    fn normalize_rejects_parent_components() {
        assert!(matches!(normalize("a/../b"), Err(IndexError::InvalidPath(_))));
    }

    #[test]
    fn is_under_is_component_wise() {
        assert!(is_under("home/a/file", "home/a"));
        assert!(is_under("home/a", "home/a"));
        assert!(!is_under("home/ab/file", "home/a"));
        assert!(!is_under("home", "home/a"));
        assert!(is_under("anything", ""));
    }

    #[test]
    fn join_and_file_name() {
        assert_eq!(join("", "a"), "a");
        assert_eq!(join("a/b", "c"), "a/b/c");
        assert_eq!(file_name("a/b/c"), "c");
        assert_eq!(file_name("c"), "c");
        assert_eq!(file_name(""), "");
    }
}
