//! Registry configuration.

use serde::Deserialize;

/// Tunables for a [`SnippetRegistry`](crate::SnippetRegistry).
///
/// Loaded from TOML by [`ConfigLoader`](crate::loaders::ConfigLoader); every
/// field is optional in the file.
///
/// ```toml
/// max_expansion_depth = 16
/// warn_on_mixed_categories = false
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SnippetConfig {
    /// How many levels of nested replacement [`expand`](crate::SnippetRegistry::expand)
    /// follows before giving up.
    pub max_expansion_depth: usize,

    /// Log a warning when an id is requested from a category that also holds
    /// anonymous entries.
    pub warn_on_mixed_categories: bool,
}

impl SnippetConfig {
    pub const DEFAULT_MAX_EXPANSION_DEPTH: usize = 32;
}

impl Default for SnippetConfig {
    fn default() -> Self {
        Self {
            max_expansion_depth: Self::DEFAULT_MAX_EXPANSION_DEPTH,
            warn_on_mixed_categories: true,
        }
    }
}
