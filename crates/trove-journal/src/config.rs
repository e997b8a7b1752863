use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Repository name → storage root mapping.
///
/// Roots are plain filesystem paths or `file:` URIs. Loaded from TOML:
///
/// ```toml
/// [repositories]
/// repository = "/var/lib/trove/resources"
/// archive = "file:///mnt/archive/resources"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub repositories: BTreeMap<String, String>,
}

impl StorageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of one repository root.
    pub fn with_repository(mut self, name: impl Into<String>, root: impl Into<String>) -> Self {
        self.repositories.insert(name.into(), root.into());
        self
    }

    /// Parse a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Unreadable {
            path: PathBuf::new(),
            reason: e.to_string(),
        })
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Collect roots from flat properties such as `repo1.resources = /data`.
    ///
    /// Every key ending in `suffix` contributes one entry, named by the key's
    /// first dot-separated component.
    pub fn from_properties<'a, I>(properties: I, suffix: &str) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let repositories = properties
            .into_iter()
            .filter(|(key, _)| key.ends_with(suffix))
            .filter_map(|(key, value)| {
                let name = key.split('.').next().filter(|n| !n.is_empty())?;
                Some((name.to_string(), value.to_string()))
            })
            .collect();
        Self { repositories }
    }

    /// Resolve the storage root for a repository key.
    pub fn root(&self, repository: &str) -> Result<PathBuf, ConfigError> {
        let raw = self
            .repositories
            .get(repository)
            .ok_or_else(|| ConfigError::NoStorageRoot(repository.to_string()))?;
        root_path(raw)
    }
}

fn root_path(raw: &str) -> Result<PathBuf, ConfigError> {
    let Some(rest) = raw.strip_prefix("file:") else {
        return Ok(PathBuf::from(raw));
    };
    let path = match rest.strip_prefix("//") {
        Some(authority_and_path) => {
            let split = authority_and_path.find('/').unwrap_or(authority_and_path.len());
            let (authority, path) = authority_and_path.split_at(split);
            if !authority.is_empty() && authority != "localhost" {
                return Err(ConfigError::InvalidRoot {
                    root: raw.to_string(),
                    reason: format!("remote authority {authority:?} is not supported"),
                });
            }
            path
        }
        None => rest,
    };
    if path.is_empty() {
        return Err(ConfigError::InvalidRoot {
            root: raw.to_string(),
            reason: "empty path".into(),
        });
    }
    Ok(PathBuf::from(path))
}
