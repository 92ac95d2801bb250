//! Remote path handling.
//!
//! Paths on the server are absolute, `/`-separated and rooted at the shared
//! folder (`/` itself is the root). These helpers keep every path the client
//! sends in that shape, and refuse anything that would climb out of the root.

use crate::error::{ErrorKind, Result};

/// Normalizes a remote path.
///
/// Whitespace around the whole path is dropped; entry names keep theirs.
/// Leading/trailing/duplicate separators and `.` segments are dropped, `..`
/// pops a segment. Climbing above the root and NUL bytes are rejected with
/// [`InvalidPath`](crate::error::ErrorKind::InvalidPath).
///
/// # Examples
///
/// ```
/// use filestation_client::path::normalize;
/// assert_eq!(normalize("").unwrap(), "/");
/// assert_eq!(normalize("docs//fw/./a.bin").unwrap(), "/docs/fw/a.bin");
/// assert_eq!(normalize("/docs/old/../new/").unwrap(), "/docs/new");
/// assert!(normalize("/../etc/passwd").is_err());
/// ```
pub fn normalize(path: &str) -> Result<String> {
    if path.contains('\0') {
        exn::bail!(ErrorKind::InvalidPath(path.to_string()));
    }
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.trim().split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                if segments.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.to_string()));
                }
            },
            s => segments.push(s),
        }
    }
    Ok(format!("/{}", segments.join("/")))
}

/// Joins a single entry name onto a directory.
///
/// The name must be a plain entry name: no separators, not `.` or `..`.
pub fn join(dir: &str, name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() || name == "." || name == ".." || name.contains('/') || name.contains('\0') {
        exn::bail!(ErrorKind::InvalidPath(name.to_string()));
    }
    let dir = normalize(dir)?;
    Ok(match dir.as_str() {
        "/" => format!("/{name}"),
        _ => format!("{dir}/{name}"),
    })
}

/// Parent of an already-normalized path. The root is its own parent.
pub fn parent(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &path[..i],
    }
}

/// Final segment of a path, or `None` for the root.
pub fn file_name(path: &str) -> Option<&str> {
    path.rsplit('/').next().filter(|s| !s.is_empty())
}

/// One clickable step in a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: String,
    pub path: String,
}

/// `Home` followed by one crumb per segment of `path`.
///
/// ```
/// use filestation_client::path::breadcrumbs;
/// let crumbs = breadcrumbs("/a/b");
/// let labels: Vec<_> = crumbs.iter().map(|c| c.label.as_str()).collect();
/// assert_eq!(labels, ["Home", "a", "b"]);
/// assert_eq!(crumbs[2].path, "/a/b");
/// ```
pub fn breadcrumbs(path: &str) -> Vec<Crumb> {
    let mut crumbs = vec![Crumb {
        label: "Home".to_string(),
        path: "/".to_string(),
    }];
    let mut current = String::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        current.push('/');
        current.push_str(segment);
        crumbs.push(Crumb {
            label: segment.to_string(),
            path: current.clone(),
        });
    }
    crumbs
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/", "/")]
    #[case("", "/")]
    #[case("a", "/a")]
    #[case("/a/b/", "/a/b")]
    #[case("//a///b", "/a/b")]
    #[case("/a/./b", "/a/b")]
    #[case("/a/b/..", "/a")]
    #[case("/a/../..b", "/..b")]
    #[case("  /a/b ", "/a/b")]
    #[case("/a /b", "/a /b")]
    #[case("/fw/ old.bin", "/fw/ old.bin")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(normalize(input).unwrap(), expected);
    }

    #[rstest]
    #[case("..")]
    #[case("/../a")]
    #[case("/a/../../b")]
    #[case("/a\0b")]
    fn test_normalize_rejects(#[case] input: &str) {
        let err = normalize(input).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidPath(_)));
    }

    #[rstest]
    #[case("/", "a.bin", "/a.bin")]
    #[case("/fw", "a.bin", "/fw/a.bin")]
    #[case("fw/", " new ", "/fw/new")]
    fn test_join(#[case] dir: &str, #[case] name: &str, #[case] expected: &str) {
        assert_eq!(join(dir, name).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("..")]
    #[case("a/b")]
    fn test_join_rejects_non_names(#[case] name: &str) {
        assert!(join("/", name).is_err());
    }

    #[rstest]
    #[case("/", "/")]
    #[case("/a", "/")]
    #[case("/a/b", "/a")]
    fn test_parent(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(parent(path), expected);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("/a/b.bin"), Some("b.bin"));
        assert_eq!(file_name("/"), None);
    }

    #[test]
    fn test_root_breadcrumbs() {
        assert_eq!(breadcrumbs("/"), vec![Crumb { label: "Home".into(), path: "/".into() }]);
    }
}
