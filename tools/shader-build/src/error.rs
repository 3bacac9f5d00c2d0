//! Error types for the shader build pipeline

use std::path::PathBuf;

/// Fatal errors that abort a build run
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// No target path was given on the command line
    #[error("{0}")]
    Usage(String),

    /// The target path exists but is not a directory (or does not exist)
    #[error("Invalid path given (the path does not exist): \"{}\"", .0.display())]
    NotADirectory(PathBuf),

    /// Config file could not be read or parsed
    #[error("failed to load config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    /// The shader compiler is not on PATH (or not executable)
    #[error("shader compiler '{program}' not found: {source}")]
    CompilerNotFound {
        program: String,
        #[source]
        source: which::Error,
    },

    /// The shader compiler was found but could not be started
    #[error("failed to launch shader compiler '{program}': {source}")]
    CompilerLaunch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The shader compiler ran but reported failure
    #[error("shader compiler failed on {} ({})", .input.display(), describe_exit(.code))]
    CompilerFailed { input: PathBuf, code: Option<i32> },

    /// The compiler succeeded but the expected header is not on disk
    #[error("shader compiler did not produce {}", .0.display())]
    HeaderMissing(PathBuf),

    /// Filesystem failure on a specific path
    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Process exit code this error should terminate the run with
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) | Self::NotADirectory(_) => 2,
            Self::CompilerFailed { code, .. } => code.unwrap_or(1),
            _ => 1,
        }
    }

    /// Whether usage text should accompany the error message
    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_) | Self::NotADirectory(_))
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    code.map(|c| format!("exit code: {}", c))
        .unwrap_or_else(|| "terminated by signal".to_string())
}

/// Non-fatal scanner outcomes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReflectionError {
    /// No `Shader program: 'NAME':` banner anywhere in the header
    #[error("no \"Shader program: '...':\" line found in generated header")]
    NameNotFound,
}
