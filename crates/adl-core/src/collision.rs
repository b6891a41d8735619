//! Collision-safe target names for extracted files.
//!
//! An extracted file keeps its own name when that is free in the destination;
//! otherwise a decimal counter is prefixed to the whole file name
//! (`chair.obj` → `1chair.obj` → `2chair.obj` …). The number of probes is
//! bounded; when every probe is taken the file is skipped.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::destination::{self, truncate_bytes, NAME_MAX};

/// Names probed per file, counting the unprefixed original.
pub const MAX_NAME_PROBES: usize = 10;

/// Returns the first free name among `candidate`, `1<name>`, … `9<name>`,
/// or `None` when all of them are occupied.
pub fn resolve(candidate: &Path) -> Option<PathBuf> {
    if !destination::exists(candidate) {
        return Some(candidate.to_path_buf());
    }
    let file_name = candidate.file_name()?;
    let parent = candidate.parent().unwrap_or_else(|| Path::new(""));

    (1..MAX_NAME_PROBES)
        .map(|n| parent.join(prefixed(n, file_name)))
        .find(|p| !destination::exists(p))
}

/// `<n><file_name>`, shortening the stem when the result would exceed NAME_MAX.
fn prefixed(n: usize, file_name: &OsStr) -> OsString {
    let prefix = n.to_string();
    let name = match file_name.to_str() {
        Some(name) if prefix.len() + name.len() > NAME_MAX => name,
        _ => {
            let mut name = OsString::from(prefix);
            name.push(file_name);
            return name;
        }
    };
    let (stem, ext) = match name.rfind('.') {
        Some(i) if i > 0 => name.split_at(i),
        _ => (name, ""),
    };
    let room = NAME_MAX.saturating_sub(prefix.len() + ext.len());
    OsString::from(format!("{}{}{}", prefix, truncate_bytes(stem, room), ext))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn free_candidate_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("chair.obj");
        assert_eq!(resolve(&p), Some(p.clone()));
        // Still unchanged on a second call: nothing was created.
        assert_eq!(resolve(&p), Some(p));
    }

    #[test]
    fn taken_candidate_gets_numeric_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("chair.obj");
        fs::write(&p, b"v1").unwrap();
        assert_eq!(resolve(&p), Some(dir.path().join("1chair.obj")));
        fs::write(dir.path().join("1chair.obj"), b"v2").unwrap();
        assert_eq!(resolve(&p), Some(dir.path().join("2chair.obj")));
    }

    #[test]
    fn directory_with_same_name_counts_as_taken() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("textures");
        fs::create_dir(&p).unwrap();
        assert_eq!(resolve(&p), Some(dir.path().join("1textures")));
    }

    #[test]
    fn eleven_same_named_files_place_ten() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("model.fbx");
        let mut placed = 0;
        let mut dropped = 0;
        for i in 0..11 {
            match resolve(&p) {
                Some(target) => {
                    assert!(!target.exists(), "resolver returned an occupied path");
                    fs::write(&target, format!("copy {i}")).unwrap();
                    placed += 1;
                }
                None => dropped += 1,
            }
        }
        assert_eq!(placed, 10);
        assert_eq!(dropped, 1);
        assert!(dir.path().join("9model.fbx").exists());
        assert!(!dir.path().join("10model.fbx").exists());
        // First writer was never overwritten.
        assert_eq!(fs::read_to_string(&p).unwrap(), "copy 0");
    }

    #[test]
    fn prefix_on_longest_name_still_fits() {
        let dir = tempfile::tempdir().unwrap();
        let long = format!("{}.obj", "a".repeat(NAME_MAX - 4));
        let p = dir.path().join(&long);
        fs::write(&p, b"v1").unwrap();
        let next = resolve(&p).unwrap();
        let name = next.file_name().unwrap().to_str().unwrap();
        assert_eq!(name.len(), NAME_MAX);
        assert!(name.starts_with("1a"));
        assert!(name.ends_with(".obj"));
        fs::write(&next, b"v2").unwrap();
    }
}
