//! Configuration file support
//!
//! Reads from ~/.config/zettel/config.toml by default; the binary accepts
//! `--config` to point elsewhere.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Application-wide options.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Root directory of the note collection; workspaces live below it.
    pub root_dir: String,

    /// Workspace used when a command does not name one.
    #[serde(default = "default_workspace")]
    pub default_workspace: String,

    /// Optional extra directory tracked by `commit`, e.g. a search index.
    #[serde(default)]
    pub index_dir: Option<String>,
}

fn default_workspace() -> String {
    "main".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            root_dir: "~/vault/zettel".to_string(),
            default_workspace: default_workspace(),
            index_dir: None,
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read config '{}': {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            Error::config(format!("cannot decode config '{}': {}", path.display(), e))
        })
    }

    /// Write config as TOML, overwriting the file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string(self)
            .map_err(|e| Error::config(format!("cannot encode config: {}", e)))?;
        fs::write(path, content).map_err(|e| Error::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Root directory with `~`/`$HOME` expanded.
    pub fn expanded_root(&self) -> PathBuf {
        PathBuf::from(expand_home(&self.root_dir))
    }
}

/// Expand a leading `~` or `$HOME` to the user's home directory. Paths
/// without such a prefix, and environments without `HOME`, pass through
/// unchanged.
pub fn expand_home(text: &str) -> String {
    let Some(home) = std::env::var_os("HOME") else {
        return text.to_string();
    };
    let home = home.to_string_lossy();
    for token in ["~", "$HOME"] {
        if let Some(rest) = text.strip_prefix(token) {
            return format!("{}{}", home, rest);
        }
    }
    text.to_string()
}
