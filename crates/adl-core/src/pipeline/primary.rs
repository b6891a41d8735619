//! Pick the file a caller should preselect after a run.

use std::path::{Path, PathBuf};

/// Extensions treated as 3-D model files.
pub const MODEL_EXTENSIONS: &[&str] = &[
    "obj", "fbx", "gltf", "glb", "dae", "blend", "3ds", "stl", "ply", "usdz",
];

pub fn is_model(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| MODEL_EXTENSIONS.iter().any(|m| e.eq_ignore_ascii_case(m)))
        .unwrap_or(false)
}

/// First model file in `files` (relative to `destination`), else `destination`.
pub fn primary_artifact(destination: &Path, files: &[String]) -> PathBuf {
    files
        .iter()
        .map(|f| destination.join(f))
        .find(|p| is_model(p))
        .unwrap_or_else(|| destination.to_path_buf())
}
