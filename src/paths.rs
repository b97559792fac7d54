//! XDG-compliant path resolution for voxroute.
//!
//! Provides [`AssistantPaths`]: where the TOML config and the pattern file
//! live when the CLI is not given explicit paths.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors from path resolution.
#[derive(Debug, Error, Diagnostic)]
pub enum PathError {
    #[error("cannot determine home directory")]
    #[diagnostic(
        code(voxroute::paths::no_home),
        help(
            "Set the HOME environment variable, or pass --config and --patterns explicitly."
        )
    )]
    NoHome,

    #[error("failed to create directory: {path}")]
    #[diagnostic(
        code(voxroute::paths::create_dir),
        help("Check that the parent directory exists and you have write permissions.")
    )]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type PathResult<T> = std::result::Result<T, PathError>;

/// Global XDG-compliant directories for voxroute.
#[derive(Debug, Clone)]
pub struct AssistantPaths {
    /// `$XDG_CONFIG_HOME/voxroute/`
    pub config_dir: PathBuf,
    /// `$XDG_DATA_HOME/voxroute/`
    pub data_dir: PathBuf,
}

impl AssistantPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> PathResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join("voxroute");

        let data_dir = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".local/share"))
            .join("voxroute");

        Ok(Self {
            config_dir,
            data_dir,
        })
    }

    /// Create all base directories. Idempotent.
    pub fn ensure_dirs(&self) -> PathResult<()> {
        for dir in [&self.config_dir, &self.data_dir] {
            std::fs::create_dir_all(dir).map_err(|e| PathError::CreateDir {
                path: dir.display().to_string(),
                source: e,
            })?;
        }
        Ok(())
    }

    /// Path to the assistant config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Path to the default pattern file.
    pub fn patterns_file(&self) -> PathBuf {
        self.data_dir.join("patterns.json")
    }
}
