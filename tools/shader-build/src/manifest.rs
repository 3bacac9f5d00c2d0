//! List file consumed by the outer build system

use std::path::{Path, PathBuf};

use crate::error::BuildError;

/// Path as written to the manifest: relative to `base` when beneath it
pub fn manifest_entry(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .to_string()
}

/// Comma-join entries, no trailing separator
pub fn render_manifest<S: AsRef<str>>(entries: &[S]) -> String {
    entries
        .iter()
        .map(|e| e.as_ref())
        .collect::<Vec<_>>()
        .join(",")
}

/// Write every generated source path (relative to `base`) as the whole file
pub fn write_manifest(
    list_file: &Path,
    generated_sources: &[PathBuf],
    base: &Path,
) -> Result<(), BuildError> {
    let entries: Vec<String> = generated_sources
        .iter()
        .map(|p| manifest_entry(p, base))
        .collect();
    std::fs::write(list_file, render_manifest(&entries))
        .map_err(|e| BuildError::io("Failed to write", list_file, e))?;
    tracing::info!(
        "Wrote {} source path{} to {}",
        entries.len(),
        if entries.len() == 1 { "" } else { "s" },
        list_file.display()
    );
    Ok(())
}
