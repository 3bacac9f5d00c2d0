//! shader_build.toml parsing
//!
//! Every key is optional. A missing file means "all defaults".

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::BuildError;

/// File name looked up in the target root when no `--config=` is given
pub const DEFAULT_CONFIG_FILE: &str = "shader_build.toml";

/// Top-level config structure
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    #[serde(default)]
    pub compiler: CompilerSection,
    #[serde(default)]
    pub scan: ScanSection,
    #[serde(default)]
    pub output: OutputSection,
}

/// How the external shader compiler is invoked
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerSection {
    /// Executable name or path (looked up on PATH)
    pub program: String,
    /// Value for `--format=`
    pub format: String,
    /// Value for `--errfmt=`
    pub error_format: String,
    /// Value for `--slang=`, colon separated
    pub languages: String,
    /// Inserted before the forwarded command-line tokens
    pub extra_args: Vec<String>,
}

impl Default for CompilerSection {
    fn default() -> Self {
        Self {
            program: "sokol-shdc".to_string(),
            format: "sokol_impl".to_string(),
            error_format: "msvc".to_string(),
            languages: "hlsl5:glsl430:metal_macos".to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Which files are picked up by the directory walk
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ScanSection {
    /// File name suffix of shader sources
    pub extension: String,
    /// Substring patterns, merged with `--exclude=` arguments
    pub exclude: Vec<String>,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            extension: ".glsl".to_string(),
            exclude: Vec::new(),
        }
    }
}

/// Generated artifacts
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    /// Header included first by every companion source file
    pub runtime_header: String,
    /// Manifest path used when `--list_file=` is absent
    pub list_file: Option<PathBuf>,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            runtime_header: "shader_include.h".to_string(),
            list_file: None,
        }
    }
}

impl BuildConfig {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self, BuildError> {
        let content = std::fs::read_to_string(path).map_err(|e| BuildError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&content).map_err(|e| BuildError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parse config from string
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Resolve the config for a run.
    ///
    /// An explicit path must exist; otherwise `shader_build.toml` in the
    /// target root is used if present.
    pub fn resolve(explicit: Option<&Path>, target_root: &Path) -> Result<Self, BuildError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let implicit = target_root.join(DEFAULT_CONFIG_FILE);
        if implicit.is_file() {
            tracing::debug!("Using config {}", implicit.display());
            Self::load(&implicit)
        } else {
            Ok(Self::default())
        }
    }
}
