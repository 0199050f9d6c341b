//! Error types for snippet loading and expansion.
//!
//! Lookups never fail: unknown identifiers and categories come back as
//! `None`. Only loading and expansion can error.

use crate::id::SnippetId;

/// Load-time error for a single snippet record.
///
/// Any of these aborts the record being loaded. Whether the rest of the
/// content batch is still loaded is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnippetError {
    /// A required field is missing from an entry object.
    #[error("snippet in category '{category}' is missing mandatory field '{field}'")]
    MissingField {
        category: String,
        field: &'static str,
    },

    /// An entry gave the null (empty) identifier explicitly.
    #[error("null snippet id specified in category '{category}'")]
    NullId { category: String },

    /// An identifier is already registered, in this or another category.
    #[error("duplicate snippet id '{id}' in category '{category}'")]
    DuplicateId { category: String, id: SnippetId },

    /// An entry could not be interpreted at all.
    #[error("invalid snippet entry in category '{category}': {reason}")]
    InvalidEntry { category: String, reason: String },
}

/// Error produced while expanding `<category>` tags.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpandError {
    /// Replacements kept introducing tags past the configured depth, which
    /// almost always means categories that reference each other in a cycle.
    #[error("expansion of '{tag}' exceeded maximum depth {depth}")]
    DepthExceeded { tag: String, depth: usize },
}
