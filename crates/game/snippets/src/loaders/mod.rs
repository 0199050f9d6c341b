//! Content loaders for reading snippet data from files.
//!
//! This module reads JSON/RON snippet files into a [`SnippetRegistry`](crate::SnippetRegistry)
//! and TOML files into a [`SnippetConfig`](crate::SnippetConfig).

pub mod config;
pub mod factory;
pub mod file;

pub use config::ConfigLoader;
pub use factory::ContentFactory;
pub use file::SnippetLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
