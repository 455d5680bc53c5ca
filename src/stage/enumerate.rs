// src/stage/enumerate.rs

use std::fs;
use std::path::{Path, PathBuf};

use nix::unistd::{access, AccessFlags};

/// Lazily yield the executable regular files in a stage directory.
///
/// A missing directory is not an error: the sequence is simply empty.
/// Entries come back in directory order; no sorting is imposed.
pub fn stage_scripts(dir: &Path) -> impl Iterator<Item = PathBuf> {
    fs::read_dir(dir)
        .ok()
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .map(|entry| entry.path())
        .filter(|path| access(path.as_path(), AccessFlags::X_OK).is_ok())
}
