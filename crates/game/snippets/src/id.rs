//! Snippet identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier naming a single snippet.
///
/// Identifiers are assigned by content authors and must be unique across the
/// whole registry. The empty string is the *null* identifier: content may not
/// use it, and the registry never hands it out.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnippetId(String);

impl SnippetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns true for the null identifier.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SnippetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SnippetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SnippetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for SnippetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One selectable row of a category listing.
///
/// [`SnippetChoice::None`] is the explicit "no selection" row that UI pickers
/// show above the real entries. It never stands for a missing lookup result.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SnippetChoice {
    /// The "no selection" row.
    None,
    /// A real snippet.
    Id(SnippetId),
}

impl SnippetChoice {
    /// Returns the identifier, or `None` for the "no selection" row.
    pub fn id(&self) -> Option<&SnippetId> {
        match self {
            Self::None => None,
            Self::Id(id) => Some(id),
        }
    }
}
