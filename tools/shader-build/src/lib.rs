//! Shader build library
//!
//! Finds GLSL sources below a root folder, compiles each one to a C header
//! with sokol-shdc, scrapes reflection data out of the generated header and
//! appends descriptor-table macros for the engine. A companion `.c` file is
//! written next to every header and, optionally, a comma-separated list of
//! those files for the outer build.

pub mod args;
pub mod compiler;
pub mod config;
pub mod emit;
pub mod error;
pub mod escape;
pub mod manifest;
pub mod reflection;
pub mod walk;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub use args::BuildArgs;
pub use compiler::{ShaderCompiler, ShaderUnit};
pub use config::BuildConfig;
pub use error::{BuildError, ReflectionError};
pub use reflection::ReflectionRecord;

/// What a run did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub entries_walked: usize,
    /// Companion sources in processing order
    pub generated_sources: Vec<PathBuf>,
    /// Shaders whose header had no program banner
    pub unnamed_shaders: Vec<PathBuf>,
    pub manifest: Option<PathBuf>,
}

/// Run the whole pipeline for already-classified arguments.
///
/// `working_dir` is the base for manifest-relative paths.
pub fn run(args: &BuildArgs, config: &BuildConfig, working_dir: &Path) -> Result<RunSummary> {
    let mut exclude_patterns: Vec<String> = config.scan.exclude.clone();
    for pattern in &args.exclude_patterns {
        if !exclude_patterns.contains(pattern) {
            exclude_patterns.push(pattern.clone());
        }
    }

    let walk = walk::find_shader_files(&args.target_path, &config.scan.extension, &exclude_patterns);
    let mut summary = RunSummary {
        entries_walked: walk.entries_walked,
        ..RunSummary::default()
    };

    if walk.shader_paths.is_empty() {
        tracing::info!(
            "No shader files found ({} files/folders walked)",
            walk.entries_walked
        );
    } else {
        let count = walk.shader_paths.len();
        tracing::info!("Found {} shader{}", count, if count == 1 { "" } else { "s" });

        let compiler = ShaderCompiler::new(&config.compiler, &args.forwarded)?;
        tracing::debug!("Using compiler {}", compiler.program().display());

        for shader_path in &walk.shader_paths {
            let unit = ShaderUnit::new(shader_path)?;
            if !process_shader(&compiler, &unit, &config.output.runtime_header)? {
                summary.unnamed_shaders.push(unit.source_path.clone());
            }
            summary.generated_sources.push(unit.companion_path);
        }
    }

    let list_file = args
        .list_file
        .clone()
        .or_else(|| config.output.list_file.clone());
    if let Some(list_file) = list_file {
        manifest::write_manifest(&list_file, &summary.generated_sources, working_dir)?;
        summary.manifest = Some(list_file);
    }

    Ok(summary)
}

/// Compile, scrape and annotate one shader.
///
/// Returns false when the header had no program name; the header is then
/// left as generated but the companion source is still written.
pub fn process_shader(compiler: &ShaderCompiler, unit: &ShaderUnit, runtime_header: &str) -> Result<bool> {
    tracing::info!("Compiling \"{}\"...", unit.source_path.display());
    compiler.compile(unit)?;

    let header = std::fs::read_to_string(&unit.header_path)
        .with_context(|| format!("Failed to read {}", unit.header_path.display()))?;

    let named = match reflection::scan_header(&header) {
        Ok(record) => {
            tracing::debug!(
                "{}: {} attributes, {} images, {} samplers, {} uniforms",
                record.shader_name,
                record.attributes.len(),
                record.images.len(),
                record.samplers.len(),
                record.uniforms.len()
            );
            let metadata = emit::render_metadata(&record, &unit.absolute_path)?;
            emit::append_metadata(&unit.header_path, &metadata)?;
            true
        }
        Err(e) => {
            tracing::warn!("{}: {}, skipping metadata", unit.header_path.display(), e);
            false
        }
    };

    tracing::info!("Generating \"{}\"...", unit.companion_path.display());
    emit::write_companion_source(&unit.companion_path, runtime_header, &unit.header_file_name())?;

    Ok(named)
}
