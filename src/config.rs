//! Configuration file and flag precedence
//!
//! Defaults live in `~/.k8sx/config.toml` (or the file given with
//! `--config`). Flags and their environment variables override it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use k8sx_search::SearchOptions;

/// Contents of the optional config file
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub kubeconfig: Option<PathBuf>,
    pub namespaces: Vec<String>,
    pub contexts: Vec<String>,
    pub timeout_secs: Option<u64>,
    pub concurrency: Option<usize>,
    pub resolve_owners: Option<bool>,
}

impl FileConfig {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".k8sx").join("config.toml"))
    }

    /// Load an explicit config file, or the default one if it exists
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Values taken from flags or their environment variables
#[derive(Debug, Default)]
pub struct Overrides {
    pub kubeconfig: Option<PathBuf>,
    pub namespaces: Vec<String>,
    pub contexts: Vec<String>,
    pub timeout_secs: Option<u64>,
    pub concurrency: Option<usize>,
    pub no_owners: bool,
}

/// Effective settings after merging the config file with the flags
#[derive(Debug)]
pub struct Settings {
    pub kubeconfig: Option<PathBuf>,
    pub contexts: Vec<String>,
    pub options: SearchOptions,
}

impl Settings {
    pub fn resolve(overrides: Overrides, file: FileConfig) -> Self {
        let defaults = SearchOptions::default();

        let namespaces = if overrides.namespaces.is_empty() {
            file.namespaces
        } else {
            overrides.namespaces
        };
        let contexts = if overrides.contexts.is_empty() {
            file.contexts
        } else {
            overrides.contexts
        };
        let timeout = overrides
            .timeout_secs
            .or(file.timeout_secs)
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let concurrency = overrides
            .concurrency
            .or(file.concurrency)
            .unwrap_or(defaults.concurrency);
        let resolve_owners = !overrides.no_owners && file.resolve_owners.unwrap_or(true);

        let options = SearchOptions::default()
            .with_namespaces(&namespaces)
            .with_timeout(timeout)
            .with_concurrency(concurrency)
            .with_owner_resolution(resolve_owners);

        Self {
            kubeconfig: overrides.kubeconfig.or(file.kubeconfig),
            contexts: contexts
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            options,
        }
    }
}
