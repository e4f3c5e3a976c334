//! Typed repository configuration, stored as TOML in `.grove/config.toml`

use crate::artifacts::branch::branch_name::BranchName;
use crate::artifacts::core::lockfile::Lockfile;
use crate::error::{Error, IoResultExt, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "config.toml";

/// On-disk encoding of object files. Ids never depend on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Frames stored byte-for-byte
    #[default]
    None,
    /// Frames stored zlib-deflated
    Zlib,
}

/// How history walks treat an unreadable parent commit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    /// Fail with `CorruptGraph`
    #[default]
    Strict,
    /// Stop the walk and record why
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryConfig {
    pub default_branch: String,
    pub compression: Compression,
    pub history: HistoryMode,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        RepositoryConfig {
            default_branch: "main".to_string(),
            compression: Compression::default(),
            history: HistoryMode::default(),
        }
    }
}

impl RepositoryConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e).at_path(path),
        };

        let config: RepositoryConfig = toml::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate(path)?;

        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut lock = Lockfile::acquire(path)?;
        lock.write_all(content.as_bytes())?;
        lock.commit()
    }

    pub fn default_branch(&self) -> Result<BranchName> {
        BranchName::try_parse(self.default_branch.as_str())
    }

    fn validate(&self, path: &Path) -> Result<()> {
        self.default_branch().map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(())
    }
}
