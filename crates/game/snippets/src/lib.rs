//! Text snippets for game content.
//!
//! This crate keeps the short texts content authors group into categories
//! (signs, notes, rumors, greetings) and provides:
//! - Lookup of identified snippets by [`SnippetId`]
//! - Uniform random selection within a category, optionally seeded
//! - Expansion of `<category>` tags inside text
//! - Migration of legacy text hashes from old saves to identifiers
//!
//! Content is loaded into an explicit [`SnippetRegistry`] value; there is no
//! global instance. With the `loaders` feature, JSON/RON data files are read
//! by [`loaders::SnippetLoader`].

pub mod config;
pub mod effect;
pub mod error;
mod expand;
pub mod id;
pub mod record;
pub mod registry;
pub mod rng;
pub mod translation;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use config::SnippetConfig;
pub use effect::ExamineEffect;
pub use error::{ExpandError, SnippetError};
pub use id::{SnippetChoice, SnippetId};
pub use record::{BatchEntry, RecordEntries, SnippetEntry, SnippetRecord};
pub use registry::SnippetRegistry;
pub use rng::{SeedSource, SnippetRng, ThreadSeeds};
pub use translation::Translation;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, SnippetLoader};
