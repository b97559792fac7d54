//! Assistant configuration, persisted as TOML.
//!
//! Every field has a default so an empty or missing file yields a working
//! assistant. The config is usually found at `$XDG_CONFIG_HOME/voxroute/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult, VoxResult};
use crate::paths::AssistantPaths;
use crate::plugin::registry::KeywordMatching;

/// Tunables for the routing core and the built-in plugins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Classifier confidence above which the intent path is taken.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Number of recent utterances kept in the context window.
    #[serde(default = "default_context_capacity")]
    pub context_capacity: usize,
    /// Pattern file override. Falls back to the XDG data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns_file: Option<PathBuf>,
    /// Seed for response-template selection. Unset means entropy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_seed: Option<u64>,
    /// How registry keywords are matched against raw text.
    #[serde(default)]
    pub keyword_matching: KeywordMatching,
    /// Directory the dev-tools plugin inspects.
    #[serde(default = "default_project_root")]
    pub project_root: PathBuf,
}

fn default_confidence_threshold() -> f64 {
    0.5
}
fn default_context_capacity() -> usize {
    5
}
fn default_project_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            context_capacity: default_context_capacity(),
            patterns_file: None,
            response_seed: None,
            keyword_matching: KeywordMatching::default(),
            project_root: default_project_root(),
        }
    }
}

impl AssistantConfig {
    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ConfigError::Invalid {
                message: format!(
                    "confidence_threshold must be within [0, 1], got {}",
                    self.confidence_threshold
                ),
            });
        }
        if self.context_capacity == 0 {
            return Err(ConfigError::Invalid {
                message: "context_capacity must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Load from a TOML file and validate.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise return defaults.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save to a TOML file.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize {
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }
}

/// Config and pattern locations after applying explicit overrides.
#[derive(Debug, Clone)]
pub struct AssistantSetup {
    pub config_path: PathBuf,
    pub patterns_path: PathBuf,
    pub config: AssistantConfig,
}

impl AssistantSetup {
    /// Resolve the config file (override, else XDG), load it, then pick the
    /// pattern file: override, else the config's `patterns_file`, else XDG.
    ///
    /// XDG directories are only consulted when an override is missing.
    pub fn resolve(
        config_override: Option<&Path>,
        patterns_override: Option<&Path>,
    ) -> VoxResult<Self> {
        let config_path = match config_override {
            Some(path) => path.to_path_buf(),
            None => AssistantPaths::resolve()?.config_file(),
        };
        let config = AssistantConfig::load_or_default(&config_path)?;

        let patterns_path = match (patterns_override, &config.patterns_file) {
            (Some(path), _) => path.to_path_buf(),
            (None, Some(path)) => path.clone(),
            (None, None) => AssistantPaths::resolve()?.patterns_file(),
        };

        Ok(Self {
            config_path,
            patterns_path,
            config,
        })
    }
}
