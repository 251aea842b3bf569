//! Path seam rules.
//!
//! Every string operation routing depends on lives here, spelled out instead
//! of buried in framework sugar:
//!
//! - local paths get a leading `/` if missing, and nothing else — `/x` and
//!   `/x/` stay distinct routes;
//! - mount prefixes lose trailing slashes, so prefix + local always meets at
//!   exactly one `/`;
//! - static remainders are resolved component-by-component with `..` (and
//!   friends) rejected before the filesystem is ever touched.

use std::path::{Path, PathBuf};

/// Normalizes a group-local route path: ensures a leading `/`.
///
/// Trailing slashes are preserved — whether `/x/` means the same route as
/// `/x` is the application's call, not ours.
pub(crate) fn normalize_local(path: &str) -> String {
    if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    }
}

/// Normalizes a mount prefix: `""` and `"/"` both mean "mount at root";
/// a missing leading `/` is added; trailing slashes are trimmed.
pub(crate) fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

/// Joins a normalized prefix and a normalized local path.
///
/// With the invariants above (prefix has no trailing `/`, local has a leading
/// `/`), plain concatenation yields exactly one slash at the seam — never
/// zero, never two.
pub(crate) fn join(prefix: &str, local: &str) -> String {
    debug_assert!(!prefix.ends_with('/'));
    debug_assert!(local.starts_with('/'));
    format!("{prefix}{local}")
}

/// Resolves a URL remainder inside `root`, refusing anything that could
/// escape it.
///
/// The check is lexical: the remainder is split on `/`, empty and `.`
/// segments are dropped, and any `..`, backslash-bearing, or colon-bearing
/// segment returns `None` — the caller turns that into a forbidden-path
/// error. Only plain name components are ever pushed onto the root.
pub(crate) fn resolve_under(root: &Path, remainder: &str) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();
    for segment in remainder.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            // Windows forms: backslash is a separator there, and a colon
            // makes a segment a `C:`-style drive prefix, which `PathBuf::push`
            // swaps in as a new root instead of appending.
            s if s.contains('\\') || s.contains(':') => return None,
            s => resolved.push(s),
        }
    }
    Some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_paths_gain_a_leading_slash_only() {
        assert_eq!(normalize_local("greeting"), "/greeting");
        assert_eq!(normalize_local("/greeting"), "/greeting");
        // Policy: trailing slashes are significant. `/x` and `/x/` are two
        // different routes and neither is rewritten into the other.
        assert_eq!(normalize_local("/x/"), "/x/");
        assert_eq!(normalize_local(""), "/");
    }

    #[test]
    fn prefixes_normalize_to_rootable_form() {
        assert_eq!(normalize_prefix(""), "");
        assert_eq!(normalize_prefix("/"), "");
        assert_eq!(normalize_prefix("api_v1"), "/api_v1");
        assert_eq!(normalize_prefix("/api_v1"), "/api_v1");
        assert_eq!(normalize_prefix("/api_v1/"), "/api_v1");
    }

    #[test]
    fn join_always_yields_one_seam_slash() {
        assert_eq!(join("", "/greeting"), "/greeting");
        assert_eq!(join("", "/"), "/");
        assert_eq!(join("/api_v1", "/greeting"), "/api_v1/greeting");
        assert_eq!(
            join(&normalize_prefix("/api_v1/"), &normalize_local("greeting")),
            "/api_v1/greeting"
        );
    }

    #[test]
    fn resolve_stays_inside_the_root() {
        let root = Path::new("/srv/assets");
        assert_eq!(
            resolve_under(root, "css/style.css"),
            Some(PathBuf::from("/srv/assets/css/style.css"))
        );
        // Empty and `.` segments are noise, not escapes.
        assert_eq!(
            resolve_under(root, "css//./style.css"),
            Some(PathBuf::from("/srv/assets/css/style.css"))
        );
    }

    #[test]
    fn traversal_is_rejected_lexically() {
        let root = Path::new("/srv/assets");
        assert_eq!(resolve_under(root, "../../etc/passwd"), None);
        assert_eq!(resolve_under(root, "css/../../../etc/passwd"), None);
        assert_eq!(resolve_under(root, "..\\elsewhere"), None);
    }

    #[test]
    fn drive_prefixed_segments_are_rejected() {
        // On Windows, pushing a `C:`-style segment replaces the accumulated
        // path rather than extending it, so these fail on every platform.
        let root = Path::new("/srv/assets");
        assert_eq!(resolve_under(root, "C:/boot.ini"), None);
        assert_eq!(resolve_under(root, "css/C:x"), None);
        assert_eq!(resolve_under(root, "C:"), None);
    }
}
