//! Localizable snippet text.
//!
//! A [`Translation`] stores the source-language text of a snippet together with
//! the optional plural form and disambiguation context a localization catalog
//! would need. Catalog lookup itself lives outside this crate, so
//! [`Translation::translated`] returns the source text.

use std::fmt;

use serde::Deserialize;

/// Localizable string as written in content files.
///
/// Accepts either a plain string or an object:
///
/// ```json
/// { "str": "bottle", "str_pl": "bottles", "ctxt": "container" }
/// { "str_sp": "sheep" }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawTranslation")]
pub struct Translation {
    raw: String,
    raw_pl: Option<String>,
    ctxt: Option<String>,
    needs_translation: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTranslation {
    Plain(String),
    Full {
        #[serde(rename = "str")]
        raw: Option<String>,
        #[serde(rename = "str_sp")]
        same_plural: Option<String>,
        #[serde(rename = "str_pl")]
        raw_pl: Option<String>,
        ctxt: Option<String>,
    },
}

impl TryFrom<RawTranslation> for Translation {
    type Error = String;

    fn try_from(raw: RawTranslation) -> Result<Self, Self::Error> {
        match raw {
            RawTranslation::Plain(text) => Ok(Self::new(text)),
            RawTranslation::Full {
                raw,
                same_plural,
                raw_pl,
                ctxt,
            } => {
                let (raw, raw_pl) = match (same_plural, raw) {
                    (Some(text), _) => (text.clone(), Some(text)),
                    (None, Some(raw)) => (raw, raw_pl),
                    (None, None) => {
                        return Err("translation object needs \"str\" or \"str_sp\"".to_owned());
                    }
                };
                Ok(Self {
                    raw,
                    raw_pl,
                    ctxt,
                    needs_translation: true,
                })
            }
        }
    }
}

impl Translation {
    /// Empty text that needs no translation.
    pub const fn empty() -> Self {
        Self {
            raw: String::new(),
            raw_pl: None,
            ctxt: None,
            needs_translation: false,
        }
    }

    /// Translatable text without plural form or context.
    pub fn new(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            raw_pl: None,
            ctxt: None,
            needs_translation: true,
        }
    }

    /// Text that is displayed verbatim in every language.
    pub fn no_translation(raw: impl Into<String>) -> Self {
        Self {
            needs_translation: false,
            ..Self::new(raw)
        }
    }

    /// Adds a plural form (builder pattern).
    #[must_use]
    pub fn with_plural(mut self, raw_pl: impl Into<String>) -> Self {
        self.raw_pl = Some(raw_pl.into());
        self
    }

    /// Adds a disambiguation context (builder pattern).
    #[must_use]
    pub fn with_context(mut self, ctxt: impl Into<String>) -> Self {
        self.ctxt = Some(ctxt.into());
        self
    }

    /// Source-language text.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn context(&self) -> Option<&str> {
        self.ctxt.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Text for display.
    pub fn translated(&self) -> String {
        self.raw.clone()
    }

    /// Text for display, picking the plural form when `count != 1`.
    pub fn translated_count(&self, count: u64) -> String {
        match (&self.raw_pl, count) {
            (Some(plural), n) if n != 1 => plural.clone(),
            _ => self.raw.clone(),
        }
    }

    /// Hash older saves used to reference this text.
    ///
    /// Only plain translatable strings (no context, no plural form) were ever
    /// referenced by hash, so every other shape returns `None`.
    pub fn legacy_hash(&self) -> Option<i32> {
        if self.needs_translation && self.ctxt.is_none() && self.raw_pl.is_none() {
            Some(djb2_hash(self.raw.as_bytes()))
        } else {
            None
        }
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// djb2 string hash, reinterpreted as signed like the stored save values.
pub fn djb2_hash(bytes: &[u8]) -> i32 {
    let mut hash: u32 = 5381;
    for &byte in bytes {
        hash = hash.wrapping_mul(33).wrapping_add(u32::from(byte));
    }
    hash as i32
}
