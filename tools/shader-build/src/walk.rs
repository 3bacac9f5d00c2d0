//! Recursive shader discovery

use std::cell::Cell;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Everything the directory walk found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalkResult {
    /// Files and folders visited below the root, excluded folders included
    pub entries_walked: usize,
    /// Shader sources in discovery order
    pub shader_paths: Vec<PathBuf>,
}

/// Whether `path` contains any of the exclude patterns (case-sensitive substring)
pub fn is_excluded(path: &Path, exclude_patterns: &[String]) -> bool {
    let path_str = path.to_string_lossy();
    exclude_patterns
        .iter()
        .any(|pattern| path_str.contains(pattern.as_str()))
}

/// Collect every file below `root` whose name ends with `extension`.
///
/// Directories whose full path contains an exclude pattern are not descended
/// into. The root itself is never excluded. Entries are visited sorted by
/// file name so repeated runs process shaders in the same order.
pub fn find_shader_files(root: &Path, extension: &str, exclude_patterns: &[String]) -> WalkResult {
    let excluded_dirs = Cell::new(0usize);
    let mut result = WalkResult::default();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let skip = entry.depth() > 0
                && entry.file_type().is_dir()
                && is_excluded(entry.path(), exclude_patterns);
            if skip {
                tracing::debug!("Skipping excluded folder {}", entry.path().display());
                excluded_dirs.set(excluded_dirs.get() + 1);
            }
            !skip
        });

    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Failed to read an entry below {}: {}", root.display(), e);
                continue;
            }
        };
        if entry.depth() == 0 {
            continue;
        }
        result.entries_walked += 1;

        if is_shader_file(&entry, extension) {
            tracing::debug!("Found \"{}\"", entry.path().display());
            result.shader_paths.push(entry.into_path());
        }
    }

    result.entries_walked += excluded_dirs.get();
    result
}

fn is_shader_file(entry: &DirEntry, extension: &str) -> bool {
    entry.file_type().is_file() && entry.file_name().to_string_lossy().ends_with(extension)
}
