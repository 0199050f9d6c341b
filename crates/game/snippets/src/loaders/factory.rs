//! Content factory for building a snippet registry from a data directory.

use std::path::{Path, PathBuf};

use crate::config::SnippetConfig;
use crate::loaders::{ConfigLoader, LoadResult, SnippetLoader};
use crate::registry::SnippetRegistry;

/// Content factory that loads snippet content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml        (optional)
/// └── snippets/
///     ├── greetings.json
///     └── notes.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Path to the directory containing data files
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load registry configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<SnippetConfig> {
        ConfigLoader::load(&self.config_path())
    }

    /// Build a registry from `snippets/`, configured by `config.toml` when
    /// present.
    pub fn load_registry(&self) -> LoadResult<SnippetRegistry> {
        let config = if self.config_path().is_file() {
            self.load_config()?
        } else {
            SnippetConfig::default()
        };
        let mut registry = SnippetRegistry::with_config(config);
        SnippetLoader::load_dir(&mut registry, &self.snippets_dir())?;
        Ok(registry)
    }

    /// Clear `registry` and load `snippets/` again.
    pub fn reload(&self, registry: &mut SnippetRegistry) -> LoadResult<usize> {
        SnippetLoader::reload_dir(registry, &self.snippets_dir())
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.toml")
    }

    fn snippets_dir(&self) -> PathBuf {
        self.data_dir.join("snippets")
    }
}
