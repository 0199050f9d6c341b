//! Registry configuration loader.

use std::path::Path;

use crate::config::SnippetConfig;
use crate::loaders::{LoadResult, read_file};

/// Loader for registry configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Fields missing from the file keep their defaults.
    pub fn load(path: &Path) -> LoadResult<SnippetConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse config data from TOML text.
    pub fn parse(content: &str) -> LoadResult<SnippetConfig> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))
    }
}
