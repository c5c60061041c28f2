//! Configuration loaded from `sqlbind.toml`.
//!
//! ```toml
//! [compiler]
//! strict = false
//! pass_through_casts = false
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{SqlBindError, SqlBindResult};

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "sqlbind.toml";

/// Compiler behaviour switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Reject templates ending inside a literal or block comment.
    pub strict: bool,

    /// Copy `::` through untouched instead of reading `:name` after it.
    pub pass_through_casts: bool,
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub compiler: CompilerOptions,
}

impl Config {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> SqlBindResult<Self> {
        toml::from_str(content).map_err(|e| SqlBindError::Config(e.to_string()))
    }

    /// Load configuration from a file.
    pub fn load(path: impl AsRef<Path>) -> SqlBindResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| SqlBindError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load `./sqlbind.toml`, then `<config dir>/sqlbind/config.toml`,
    /// falling back to defaults when neither exists.
    pub fn discover() -> SqlBindResult<Self> {
        match Self::candidates().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn candidates() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("sqlbind").join("config.toml"));
        }
        paths
    }
}
