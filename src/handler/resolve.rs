//! Request path resolution
//!
//! Maps the part of a URL path after the mount prefix onto a file beneath the
//! media root. Two checks keep requests inside the root: a lexical pass that
//! refuses `..` segments climbing above it, and a canonical pass that follows
//! symlinks and compares against the canonical root.

use crate::error::ServeError;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Strip the mount prefix from a request path
#[inline]
pub fn strip_prefix<'a>(path: &'a str, prefix: &str) -> Option<&'a str> {
    path.strip_prefix(prefix)
}

/// Percent-decode and lexically normalize the relative part of a request path
///
/// Empty and `.` segments are dropped, `..` removes the previous segment.
/// A `..` with nothing left to remove would leave the root and is rejected.
///
/// # Examples
/// ```
/// use manofwar::handler::resolve::decode_relative;
/// use std::path::PathBuf;
///
/// assert_eq!(decode_relative("shows/a%20b.mp4").unwrap(), PathBuf::from("shows/a b.mp4"));
/// assert!(decode_relative("../secret").is_err());
/// ```
pub fn decode_relative(raw: &str) -> Result<PathBuf, ServeError> {
    let decoded = urlencoding::decode(raw)
        .map_err(|e| ServeError::InvalidPath(format!("{raw}: {e}")))?;

    if decoded.contains('\0') {
        return Err(ServeError::InvalidPath(raw.to_string()));
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split(&['/', '\\'][..]) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(ServeError::Traversal(raw.to_string()));
                }
            }
            name => segments.push(name),
        }
    }

    Ok(segments.iter().collect())
}

/// Resolve `relative` beneath `root`, following symlinks
///
/// Fails with `NotFound` when either path cannot be canonicalized and with
/// `Traversal` when the canonical target is not a descendant of the canonical
/// root.
pub async fn resolve_within(root: &Path, relative: &Path) -> Result<PathBuf, ServeError> {
    let canonical_root = fs::canonicalize(root)
        .await
        .map_err(|source| ServeError::NotFound {
            path: root.to_path_buf(),
            source,
        })?;

    let joined = canonical_root.join(relative);
    let target = fs::canonicalize(&joined)
        .await
        .map_err(|source| ServeError::NotFound {
            path: joined.clone(),
            source,
        })?;

    if !target.starts_with(&canonical_root) {
        tracing::warn!(
            "Path traversal attempt blocked: {} -> {}",
            relative.display(),
            target.display()
        );
        return Err(ServeError::Traversal(relative.display().to_string()));
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_prefix() {
        assert_eq!(strip_prefix("/media/a.txt", "/media/"), Some("a.txt"));
        assert_eq!(strip_prefix("/media/", "/media/"), Some(""));
        assert_eq!(strip_prefix("/other/a.txt", "/media/"), None);
    }

    #[test]
    fn test_decode_plain_and_nested() {
        assert_eq!(decode_relative("test.txt").unwrap(), PathBuf::from("test.txt"));
        assert_eq!(
            decode_relative("shows/s01/e01.mkv").unwrap(),
            PathBuf::from("shows/s01/e01.mkv")
        );
        assert_eq!(
            decode_relative("my%20movie.mp4").unwrap(),
            PathBuf::from("my movie.mp4")
        );
    }

    #[test]
    fn test_decode_normalizes_inside_root() {
        assert_eq!(decode_relative("a/../b.txt").unwrap(), PathBuf::from("b.txt"));
        assert_eq!(decode_relative("./a//b.txt").unwrap(), PathBuf::from("a/b.txt"));
        assert_eq!(decode_relative("").unwrap(), PathBuf::new());
    }

    #[test]
    fn test_decode_rejects_escape() {
        assert!(matches!(
            decode_relative("../etc/passwd"),
            Err(ServeError::Traversal(_))
        ));
        assert!(matches!(
            decode_relative("a/../../secret"),
            Err(ServeError::Traversal(_))
        ));
        assert!(matches!(
            decode_relative("%2e%2e/secret"),
            Err(ServeError::Traversal(_))
        ));
        assert!(matches!(
            decode_relative("..%5csecret"),
            Err(ServeError::Traversal(_))
        ));
    }

    #[test]
    fn test_decode_rejects_nul_and_bad_utf8() {
        assert!(matches!(
            decode_relative("a%00.txt"),
            Err(ServeError::InvalidPath(_))
        ));
        assert!(matches!(
            decode_relative("%ff%fe"),
            Err(ServeError::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("clip.mp4"), b"data").unwrap();

        let resolved = resolve_within(dir.path(), Path::new("clip.mp4")).await.unwrap();
        assert_eq!(resolved, dir.path().canonicalize().unwrap().join("clip.mp4"));
    }

    #[tokio::test]
    async fn test_resolve_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_within(dir.path(), Path::new("missing.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServeError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nope");
        let err = resolve_within(&root, Path::new("a.txt")).await.unwrap_err();
        assert!(matches!(err, ServeError::NotFound { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_rejects_symlink_escape() {
        let outside = tempfile::tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), b"secret").unwrap();

        let root = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("secret.txt"),
            root.path().join("link.txt"),
        )
        .unwrap();

        let err = resolve_within(root.path(), Path::new("link.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServeError::Traversal(_)));
    }
}
