//! Output naming and working-file paths

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{ArchiverError, ArchiverResult};

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// `<dir>/<stem>_make_zero.ts`, the rebased working copy of `source`
pub fn make_zero_path(dir: &Path, source: &Path) -> PathBuf {
    dir.join(format!("{}_make_zero.ts", stem(source)))
}

/// `<dir>/<stem>-<number><suffix>` for the numbered segments of a scene job
pub fn numbered_output_path(dir: &Path, source: &Path, number: usize) -> PathBuf {
    let suffix = source
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    dir.join(format!("{}-{}{}", stem(source), number, suffix))
}

/// Default output of a single cut: `<stem>-cut<suffix>` next to the source
pub fn default_cut_output(source: &Path) -> PathBuf {
    let dir = source.parent().unwrap_or_else(|| Path::new(""));
    let suffix = source
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_else(|| ".ts".to_string());
    dir.join(format!("{}-cut{}", stem(source), suffix))
}

/// Selected sample indices from a directory of `<index>.<extension>` stills.
///
/// Files whose stem is not a number are ignored. The result is ascending and
/// free of duplicates.
pub fn collect_scene_indices(dir: &Path, extension: &str) -> ArchiverResult<Vec<usize>> {
    if !dir.is_dir() {
        return Err(ArchiverError::source_not_found(dir));
    }

    let mut indices = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(|e| ArchiverError::Io(e.into()))?;
        let path = entry.path();
        let matches_extension = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension));
        if !entry.file_type().is_file() || !matches_extension {
            continue;
        }
        match stem(path).parse::<usize>() {
            Ok(index) => indices.push(index),
            Err(_) => debug!("Skipping {}: stem is not an index", path.display()),
        }
    }

    indices.sort_unstable();
    indices.dedup();
    Ok(indices)
}
