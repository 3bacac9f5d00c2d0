//! Command-line token classification
//!
//! Tokens are split into options we handle ourselves (`--exclude=`,
//! `--list_file=`, `--config=`), the single positional root path, and
//! everything else, which is forwarded untouched to the shader compiler.

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::error::BuildError;
use crate::escape::unescape_string;

pub const USAGE: &str = "Usage: shader-build [root_path] {--exclude=\"pattern\"} {--list_file=\"path\"} {--config=\"path\"} {shdc_options...}";

/// Result of classifying raw tokens, before the root path is validated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedArgs {
    pub target_path: Option<String>,
    pub exclude_patterns: BTreeSet<String>,
    pub list_file: Option<String>,
    pub config_file: Option<String>,
    /// Unrecognized tokens in their original order
    pub forwarded: Vec<String>,
    /// Extra positional tokens that were dropped
    pub ignored_paths: Vec<String>,
}

/// Validated arguments for a build run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildArgs {
    pub target_path: PathBuf,
    pub exclude_patterns: BTreeSet<String>,
    pub list_file: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub forwarded: Vec<String>,
}

/// Classify raw command-line tokens (program name already removed)
pub fn classify<I, S>(tokens: I) -> ClassifiedArgs
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut args = ClassifiedArgs::default();

    for token in tokens {
        let token = token.as_ref();
        let pieces: Vec<&str> = token.split('=').collect();

        if pieces.len() == 2 {
            let name = strip_dashes(pieces[0].trim());
            let value = unescape_string(pieces[1].trim());
            match name {
                "exclude" => {
                    args.exclude_patterns.insert(value);
                }
                "list_file" => args.list_file = Some(value),
                "config" => args.config_file = Some(value),
                _ => args.forwarded.push(token.to_string()),
            }
        } else if token.starts_with('-') {
            // Bare flag, the compiler decides what it means
            args.forwarded.push(token.to_string());
        } else if pieces.len() == 1 {
            if args.target_path.is_none() {
                args.target_path = Some(unescape_string(token.trim()));
            } else {
                tracing::warn!("Multiple path arguments given! Ignoring argument: \"{}\"", token);
                args.ignored_paths.push(token.to_string());
            }
        } else {
            args.forwarded.push(token.to_string());
        }
    }

    args
}

/// Strip at most two leading dashes
fn strip_dashes(name: &str) -> &str {
    let name = name.strip_prefix('-').unwrap_or(name);
    name.strip_prefix('-').unwrap_or(name)
}

impl ClassifiedArgs {
    /// Check the root path and convert into [`BuildArgs`]
    pub fn validate(self) -> Result<BuildArgs, BuildError> {
        let Some(target) = self.target_path else {
            return Err(BuildError::Usage("No target path specified!".to_string()));
        };
        let target_path = PathBuf::from(target);
        if !target_path.is_dir() {
            return Err(BuildError::NotADirectory(target_path));
        }

        Ok(BuildArgs {
            target_path,
            exclude_patterns: self.exclude_patterns,
            list_file: self.list_file.map(PathBuf::from),
            config_file: self.config_file.map(PathBuf::from),
            forwarded: self.forwarded,
        })
    }
}

impl BuildArgs {
    /// Classify and validate in one step
    pub fn parse<I, S>(tokens: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        classify(tokens).validate()
    }
}
