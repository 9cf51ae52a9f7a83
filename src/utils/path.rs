//! Path utilities for clip and artifact naming

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::domain::model::Clip;
use crate::error::MovieResult;

/// Render a path with forward slashes, as the concat demuxer expects on every platform
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Same path with its extension swapped
pub fn replace_extension(path: &Path, extension: &str) -> PathBuf {
    path.with_extension(extension)
}

/// Resolve a path against the current directory without touching the filesystem
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    std::path::absolute(path)
}

/// Index of a segmenter output file named `clip_NNN.<ext>`
pub fn parse_clip_index(file_name: &str, extension: &str) -> Option<usize> {
    let stem = file_name
        .strip_prefix("clip_")?
        .strip_suffix(extension)?
        .strip_suffix('.')?;
    if stem.is_empty() || !stem.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    stem.parse().ok()
}

/// Segmenter clips found directly inside `dir`, ordered by index
pub fn list_clips(dir: &Path, extension: &str) -> MovieResult<Vec<Clip>> {
    let mut clips = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if let Some(index) = parse_clip_index(&name, extension) {
            clips.push(Clip::new(entry.path(), index));
        }
    }
    clips.sort_by_key(|clip| clip.index);
    Ok(clips)
}

/// Remove everything inside `dir`, returning the entries that could not be deleted
pub fn empty_directory(dir: &Path) -> io::Result<Vec<(PathBuf, io::Error)>> {
    let mut failures = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        let path = entry.path().to_path_buf();
        let result = if entry.file_type().is_dir() {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        if let Err(e) = result {
            failures.push((path, e));
        }
    }
    Ok(failures)
}
