//! Destination resolution for a pipeline run.
//!
//! A payload asks for `<root>/<name>`. If that entry already exists the run
//! either stops or continues into a sibling with a ` 1`, ` 2`, … suffix on the
//! leaf name. Nothing is created here; the directory appears only once
//! extraction starts placing files.

mod sanitize;

pub use sanitize::{
    sanitize_component, sanitize_component_within, truncate_bytes, FALLBACK_NAME, NAME_MAX,
    SUFFIX_RESERVE,
};

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Requested logical destination plus the concrete, currently unused path chosen for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationRequest {
    logical: PathBuf,
    concrete: PathBuf,
}

impl DestinationRequest {
    /// Resolve `logical` to a path that does not exist right now.
    pub fn resolve(logical: PathBuf) -> Self {
        let concrete = unique_dir(&logical);
        if concrete != logical {
            tracing::debug!(
                logical = %logical.display(),
                concrete = %concrete.display(),
                "destination exists, using unique sibling"
            );
        }
        Self { logical, concrete }
    }

    pub fn logical(&self) -> &Path {
        &self.logical
    }

    pub fn concrete(&self) -> &Path {
        &self.concrete
    }
}

/// `<root>/<sanitized name>`. The name always becomes exactly one path
/// component, short enough to take a ` N` suffix.
pub fn logical_destination(root: &Path, name: &str) -> PathBuf {
    root.join(sanitize_component_within(name, NAME_MAX - SUFFIX_RESERVE))
}

/// True if any filesystem entry (file, directory, dangling symlink) is at `path`.
pub fn exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Returns the directory `path` if free, otherwise the first free sibling
/// `<leaf> N` for N = 1, 2, … The whole leaf is kept, dots included
/// (`Chair v1.2` → `Chair v1.2 1`).
///
/// Only uniqueness at call time is guaranteed; a concurrent writer can still
/// take the name before it is used.
pub fn unique_dir(path: &Path) -> PathBuf {
    if !exists(path) {
        return path.to_path_buf();
    }
    let leaf = path
        .file_name()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from(FALLBACK_NAME));
    first_free(path, |n| {
        let mut name = leaf.clone();
        name.push(format!(" {}", n));
        name
    })
}

/// Returns the file `path` if free, otherwise the first free sibling named
/// `<stem> N[.ext]` for N = 1, 2, …
pub fn unique_path(path: &Path) -> PathBuf {
    if !exists(path) {
        return path.to_path_buf();
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from(FALLBACK_NAME));
    let extension = path.extension();
    first_free(path, |n| {
        let mut name = stem.clone();
        name.push(format!(" {}", n));
        if let Some(ext) = extension {
            name.push(".");
            name.push(ext);
        }
        name
    })
}

fn first_free<F>(path: &Path, name_for: F) -> PathBuf
where
    F: Fn(u64) -> OsString,
{
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let mut n: u64 = 1;
    loop {
        let candidate = parent.join(name_for(n));
        if !exists(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn free_path_is_returned_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("Chair");
        assert_eq!(unique_dir(&p), p);
    }

    #[test]
    fn existing_directory_gets_numbered_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("Chair");
        fs::create_dir(&p).unwrap();
        assert_eq!(unique_dir(&p), dir.path().join("Chair 1"));
    }

    #[test]
    fn skips_names_left_by_previous_runs() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("Chair");
        fs::create_dir(&p).unwrap();
        fs::create_dir(dir.path().join("Chair 1")).unwrap();
        fs::write(dir.path().join("Chair 2"), b"a file, not a dir").unwrap();
        let got = unique_dir(&p);
        assert_eq!(got, dir.path().join("Chair 3"));
        assert!(!exists(&got));
    }

    #[test]
    fn file_suffix_goes_before_extension() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("Chair.credit.txt");
        fs::write(&p, b"x").unwrap();
        assert_eq!(unique_path(&p), dir.path().join("Chair.credit 1.txt"));
    }

    #[test]
    fn logical_destination_sanitizes_name() {
        let root = Path::new("out");
        assert_eq!(logical_destination(root, "Chair"), PathBuf::from("out/Chair"));
        assert_eq!(logical_destination(root, "../evil"), PathBuf::from("out/_evil"));
    }

    #[test]
    fn request_keeps_logical_and_concrete() {
        let dir = tempfile::tempdir().unwrap();
        let logical = dir.path().join("Lamp");
        let first = DestinationRequest::resolve(logical.clone());
        assert_eq!(first.concrete(), logical.as_path());
        fs::create_dir(&logical).unwrap();
        let second = DestinationRequest::resolve(logical.clone());
        assert_eq!(second.logical(), logical.as_path());
        assert_eq!(second.concrete(), dir.path().join("Lamp 1").as_path());
    }

    #[test]
    fn dotted_directory_names_keep_their_leaf() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("Chair v1.2");
        fs::create_dir(&p).unwrap();
        assert_eq!(unique_dir(&p), dir.path().join("Chair v1.2 1"));
        let request = DestinationRequest::resolve(p);
        assert_eq!(request.concrete(), dir.path().join("Chair v1.2 1").as_path());
    }

    #[test]
    fn long_names_leave_room_for_the_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let logical = logical_destination(dir.path(), &"C".repeat(300));
        let leaf = logical.file_name().unwrap().len();
        assert_eq!(leaf, NAME_MAX - SUFFIX_RESERVE);
        fs::create_dir(&logical).unwrap();
        let sibling = unique_dir(&logical);
        assert!(sibling.file_name().unwrap().len() <= NAME_MAX);
        fs::create_dir(&sibling).unwrap();
    }
}
