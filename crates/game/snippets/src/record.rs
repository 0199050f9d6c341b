//! Record shapes consumed by [`SnippetRegistry::load`](crate::SnippetRegistry::load).
//!
//! A record names a category and carries either a list of entries or a
//! single entry inline:
//!
//! ```json
//! { "type": "snippet", "category": "<greeting>",
//!   "text": [ "Hello.", { "id": "greet_formal", "text": "Good day." } ] }
//!
//! { "type": "snippet", "category": "note", "id": "note_1", "text": "Buy milk." }
//! ```

use serde::{Deserialize, Deserializer};

use crate::effect::ExamineEffect;
use crate::id::SnippetId;
use crate::translation::Translation;

/// One content record: a category plus its entries.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "RawRecord")]
pub struct SnippetRecord {
    pub category: String,
    pub entries: RecordEntries,
}

/// Entries of a [`SnippetRecord`].
#[derive(Clone, Debug, PartialEq)]
pub enum RecordEntries {
    /// `text` was an array.
    Batch(Vec<BatchEntry>),
    /// The record itself is the entry.
    Single(SnippetEntry),
}

/// Element of a `text` array.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(from = "RawBatchEntry")]
pub enum BatchEntry {
    /// Plain string: joins the category's anonymous pool.
    Anonymous(Translation),
    /// Object: handled like a single entry.
    Entry(SnippetEntry),
}

/// Entry object with optional identifier and attached data.
///
/// `text` is optional here so that a missing field surfaces as
/// [`SnippetError::MissingField`](crate::SnippetError::MissingField) from the
/// registry rather than as a parse failure.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct SnippetEntry {
    #[serde(default)]
    pub text: Option<Translation>,
    /// `Some(null id)` when the field was present but null or empty.
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<SnippetId>,
    /// Present but `null` is a parse error.
    #[serde(default, deserialize_with = "present_effect")]
    pub effect_on_examine: Option<ExamineEffect>,
    #[serde(default)]
    pub name: Option<Translation>,
}

impl SnippetEntry {
    pub fn new(text: Translation) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<SnippetId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn with_name(mut self, name: Translation) -> Self {
        self.name = Some(name);
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: ExamineEffect) -> Self {
        self.effect_on_examine = Some(effect);
        self
    }
}

impl SnippetRecord {
    /// Record holding a list of entries.
    pub fn batch(category: impl Into<String>, entries: Vec<BatchEntry>) -> Self {
        Self {
            category: category.into(),
            entries: RecordEntries::Batch(entries),
        }
    }

    /// Record holding one entry inline.
    pub fn single(category: impl Into<String>, entry: SnippetEntry) -> Self {
        Self {
            category: category.into(),
            entries: RecordEntries::Single(entry),
        }
    }
}

/// Keeps an explicit `null` distinguishable from an absent field.
fn present_id<'de, D>(deserializer: D) -> Result<Option<SnippetId>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = Option::<SnippetId>::deserialize(deserializer)?;
    Ok(Some(id.unwrap_or_default()))
}

/// A present field must hold an effect; [`ExamineEffect`] rejects `null`.
fn present_effect<'de, D>(deserializer: D) -> Result<Option<ExamineEffect>, D::Error>
where
    D: Deserializer<'de>,
{
    ExamineEffect::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
struct RawRecord {
    category: String,
    #[serde(default)]
    text: Option<RawText>,
    #[serde(default, deserialize_with = "present_id")]
    id: Option<SnippetId>,
    #[serde(default, deserialize_with = "present_effect")]
    effect_on_examine: Option<ExamineEffect>,
    #[serde(default)]
    name: Option<Translation>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawText {
    Batch(Vec<BatchEntry>),
    Single(Translation),
}

impl From<RawRecord> for SnippetRecord {
    fn from(raw: RawRecord) -> Self {
        let text = match raw.text {
            Some(RawText::Batch(entries)) => {
                return Self {
                    category: raw.category,
                    entries: RecordEntries::Batch(entries),
                };
            }
            Some(RawText::Single(text)) => Some(text),
            None => None,
        };
        let entries = RecordEntries::Single(SnippetEntry {
            text,
            id: raw.id,
            effect_on_examine: raw.effect_on_examine,
            name: raw.name,
        });
        Self {
            category: raw.category,
            entries,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBatchEntry {
    Anonymous(String),
    Entry(SnippetEntry),
}

impl From<RawBatchEntry> for BatchEntry {
    fn from(raw: RawBatchEntry) -> Self {
        match raw {
            RawBatchEntry::Anonymous(text) => Self::Anonymous(Translation::new(text)),
            RawBatchEntry::Entry(entry) => Self::Entry(entry),
        }
    }
}
