//! Drive-relative path conventions shared by every storage adapter.
//!
//! Paths use `/` as the delimiter regardless of backend. A folder path is
//! canonical when it has no leading delimiter and, unless it is the drive
//! root (`""`), ends with exactly one trailing delimiter. Object-storage
//! adapters rely on this form because the folder marker object's key is the
//! canonical folder path itself.

/// The path delimiter used by all drives.
pub const DELIMITER: char = '/';

/// Join a parent path and a child name with a single delimiter.
///
/// The result carries no trailing delimiter; pass it through
/// [`normalize_folder_path`] when it names a folder.
pub fn join_path(parent: &str, name: &str) -> String {
    let parent = parent.trim().trim_matches(DELIMITER);
    let name = name.trim().trim_matches(DELIMITER);
    match (parent.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => parent.to_string(),
        (false, false) => format!("{parent}{DELIMITER}{name}"),
    }
}

/// Return the canonical folder form of `path`.
pub fn normalize_folder_path(path: &str) -> String {
    let trimmed = path.trim().trim_start_matches(DELIMITER);
    if trimmed.is_empty() {
        return String::new();
    }
    let mut normalized = trimmed.trim_end_matches(DELIMITER).to_string();
    normalized.push(DELIMITER);
    normalized
}

/// Canonical path of the folder `name` located under `parent`.
pub fn folder_path(parent: &str, name: &str) -> String {
    normalize_folder_path(&join_path(parent, name))
}

/// Canonical path of the parent folder of `path`.
///
/// Top-level folders have the drive root (`""`) as their parent.
pub fn parent_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches(DELIMITER);
    match trimmed.rfind(DELIMITER) {
        Some(idx) => normalize_folder_path(&trimmed[..idx]),
        None => String::new(),
    }
}

/// The last segment of `path`, ignoring any trailing delimiter.
pub fn last_segment(path: &str) -> &str {
    let trimmed = path.trim().trim_end_matches(DELIMITER);
    match trimmed.rfind(DELIMITER) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Whether `key` names a folder (ends with the delimiter).
pub fn is_folder_key(key: &str) -> bool {
    key.ends_with(DELIMITER)
}

/// Whether `path` lies at or below `folder`.
pub fn is_within(folder: &str, path: &str) -> bool {
    let folder = normalize_folder_path(folder);
    let path = normalize_folder_path(path);
    folder.is_empty() || path.starts_with(&folder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("programs/prog1/", "study-001"), "programs/prog1/study-001");
        assert_eq!(join_path("", "programs"), "programs");
        assert_eq!(join_path("a/", "/b/"), "a/b");
        assert_eq!(join_path("a", ""), "a");
    }

    #[test]
    fn test_normalize_folder_path() {
        assert_eq!(normalize_folder_path("a/b/c"), "a/b/c/");
        assert_eq!(normalize_folder_path("a/b/c/"), "a/b/c/");
        assert_eq!(normalize_folder_path("/a//"), "a/");
        assert_eq!(normalize_folder_path(""), "");
        assert_eq!(normalize_folder_path("   "), "");
    }

    #[test]
    fn test_folder_path_matches_normalized_lookup() {
        assert_eq!(folder_path("a/b", "c"), normalize_folder_path("a/b/c"));
    }

    #[test]
    fn test_parent_path_and_last_segment() {
        let path = "programs/prog1/study-001/";
        assert_eq!(parent_path(path), "programs/prog1/");
        assert_eq!(last_segment(path), "study-001");
        assert_eq!(parent_path("programs/"), "");
        assert_eq!(last_segment("programs/"), "programs");
        assert_eq!(parent_path(""), "");
    }

    #[test]
    fn test_is_within() {
        assert!(is_within("programs/prog1/", "programs/prog1/study-001"));
        assert!(is_within("", "anything"));
        assert!(!is_within("programs/prog1/", "programs/prog10/"));
    }
}
