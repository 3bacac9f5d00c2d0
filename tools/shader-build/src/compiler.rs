//! External shader compiler invocation
//!
//! One synchronous process per shader. Any failure is fatal for the run.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

use crate::config::CompilerSection;
use crate::error::BuildError;

/// One discovered shader source and the paths derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderUnit {
    /// Path as discovered by the walk
    pub source_path: PathBuf,
    /// Absolute form of `source_path` with `.` and `..` resolved
    pub absolute_path: PathBuf,
    /// `<absolute_path>.h`, written by the compiler
    pub header_path: PathBuf,
    /// `<absolute_path>.c`, written by us
    pub companion_path: PathBuf,
}

impl ShaderUnit {
    pub fn new(source_path: impl Into<PathBuf>) -> Result<Self, BuildError> {
        let source_path = source_path.into();
        let absolute_path = std::path::absolute(&source_path)
            .map(|path| normalize(&path))
            .map_err(|e| BuildError::io("Failed to resolve", &source_path, e))?;
        Ok(Self {
            header_path: with_suffix(&absolute_path, ".h"),
            companion_path: with_suffix(&absolute_path, ".c"),
            source_path,
            absolute_path,
        })
    }

    /// File name of the generated header, as used in `#include` lines
    pub fn header_file_name(&self) -> String {
        self.header_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

/// Lexically resolve `.` and `..` (no symlink lookups)
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Append a suffix to the full file name (`a.glsl` -> `a.glsl.h`)
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

fn path_option(name: &str, path: &Path) -> OsString {
    let mut option = OsString::from(name);
    option.push(path.as_os_str());
    option
}

/// Resolved compiler plus the arguments shared by every invocation
#[derive(Debug, Clone)]
pub struct ShaderCompiler {
    program: PathBuf,
    format: String,
    error_format: String,
    languages: String,
    /// Config `extra_args` followed by forwarded command-line tokens
    trailing_args: Vec<String>,
}

impl ShaderCompiler {
    /// Locate the compiler executable and capture the fixed arguments
    pub fn new(section: &CompilerSection, forwarded: &[String]) -> Result<Self, BuildError> {
        let program =
            which::which(&section.program).map_err(|source| BuildError::CompilerNotFound {
                program: section.program.clone(),
                source,
            })?;

        Ok(Self {
            program,
            format: section.format.clone(),
            error_format: section.error_format.clone(),
            languages: section.languages.clone(),
            trailing_args: section
                .extra_args
                .iter()
                .chain(forwarded.iter())
                .cloned()
                .collect(),
        })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Argument vector for one shader (program name excluded)
    ///
    /// Paths go through verbatim: there is no shell in between.
    pub fn arguments(&self, unit: &ShaderUnit) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            format!("--format={}", self.format).into(),
            format!("--errfmt={}", self.error_format).into(),
            format!("--slang={}", self.languages).into(),
            path_option("--input=", &unit.absolute_path),
            path_option("--output=", &unit.header_path),
        ];
        args.extend(self.trailing_args.iter().map(OsString::from));
        args
    }

    /// Run the compiler on one shader and wait for it.
    ///
    /// Compiler output is only surfaced when it fails.
    pub fn compile(&self, unit: &ShaderUnit) -> Result<(), BuildError> {
        let args = self.arguments(unit);
        tracing::debug!(
            "Command: {} {}",
            self.program.display(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| BuildError::CompilerLaunch {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            // Keep the compiler's own (msvc-style) diagnostics intact for IDEs
            eprint!("{}", String::from_utf8_lossy(&output.stdout));
            eprint!("{}", String::from_utf8_lossy(&output.stderr));
            return Err(BuildError::CompilerFailed {
                input: unit.source_path.clone(),
                code: output.status.code(),
            });
        }

        if !unit.header_path.is_file() {
            return Err(BuildError::HeaderMissing(unit.header_path.clone()));
        }
        Ok(())
    }
}
