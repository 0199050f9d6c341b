//! The snippet registry: loading, lookup, random selection and hash migration.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use rand::seq::SliceRandom;

use crate::config::SnippetConfig;
use crate::effect::ExamineEffect;
use crate::error::SnippetError;
use crate::id::{SnippetChoice, SnippetId};
use crate::record::{BatchEntry, RecordEntries, SnippetEntry, SnippetRecord};
use crate::rng::{SeedSource, SnippetRng, ThreadSeeds};
use crate::translation::Translation;

static EMPTY_TRANSLATION: Translation = Translation::empty();

/// Entries of one category.
#[derive(Clone, Debug, Default)]
struct CategorySnippets {
    /// Identifier-bearing entries in insertion order.
    ids: Vec<SnippetId>,
    /// Anonymous entries.
    no_id: Vec<Translation>,
}

impl CategorySnippets {
    fn len(&self) -> usize {
        self.ids.len() + self.no_id.len()
    }

    fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.no_id.is_empty()
    }
}

/// All snippet categories and identifiers known to the game.
///
/// Populated by [`load`](Self::load) during content loading, queried for the
/// rest of the run, and [`clear`](Self::clear)ed on reload.
///
/// The legacy hash index behind [`migrate_hash_to_id`](Self::migrate_hash_to_id)
/// is derived from the loaded texts. Every mutation discards it and the next
/// migration lookup rebuilds it.
#[derive(Clone, Debug, Default)]
pub struct SnippetRegistry {
    config: SnippetConfig,
    snippets_by_category: HashMap<String, CategorySnippets>,
    snippets_by_id: HashMap<SnippetId, Translation>,
    /// Identifiers in load order, so index builds are deterministic.
    load_order: Vec<SnippetId>,
    effects_by_id: HashMap<SnippetId, ExamineEffect>,
    names_by_id: HashMap<SnippetId, Translation>,
    hash_to_id_migration: Option<HashMap<i32, SnippetId>>,
}

impl SnippetRegistry {
    /// Creates an empty registry with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the given configuration.
    pub fn with_config(config: SnippetConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &SnippetConfig {
        &self.config
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Loads one content record.
    ///
    /// A `text` array goes through [`add_batch`](Self::add_batch), anything
    /// else is a single entry for [`add_entry`](Self::add_entry).
    pub fn load(&mut self, record: SnippetRecord) -> Result<(), SnippetError> {
        self.discard_migration("load");
        match record.entries {
            RecordEntries::Batch(entries) => self.add_batch(&record.category, entries),
            RecordEntries::Single(entry) => self.add_entry(&record.category, entry),
        }
    }

    /// Adds a list of entries to `category`.
    ///
    /// Stops at the first failing entry; entries before it stay loaded.
    pub fn add_batch(
        &mut self,
        category: &str,
        entries: Vec<BatchEntry>,
    ) -> Result<(), SnippetError> {
        self.discard_migration("add_batch");
        for entry in entries {
            match entry {
                BatchEntry::Anonymous(text) => self.category_mut(category).no_id.push(text),
                BatchEntry::Entry(entry) => self.add_entry(category, entry)?,
            }
        }
        Ok(())
    }

    /// Adds a single entry to `category`.
    ///
    /// # Errors
    ///
    /// - [`SnippetError::MissingField`] if `text` is absent
    /// - [`SnippetError::NullId`] if `id` is present but null
    /// - [`SnippetError::DuplicateId`] if `id` is already registered anywhere
    ///
    /// Nothing is inserted when an error is returned.
    pub fn add_entry(&mut self, category: &str, entry: SnippetEntry) -> Result<(), SnippetError> {
        self.discard_migration("add_entry");
        let SnippetEntry {
            text,
            id,
            effect_on_examine,
            name,
        } = entry;

        let text = text.ok_or_else(|| SnippetError::MissingField {
            category: category.to_owned(),
            field: "text",
        })?;

        let Some(id) = id else {
            self.category_mut(category).no_id.push(text);
            return Ok(());
        };

        if id.is_null() {
            return Err(SnippetError::NullId {
                category: category.to_owned(),
            });
        }
        if self.snippets_by_id.contains_key(&id) {
            return Err(SnippetError::DuplicateId {
                category: category.to_owned(),
                id,
            });
        }

        self.category_mut(category).ids.push(id.clone());
        self.snippets_by_id.insert(id.clone(), text);
        self.load_order.push(id.clone());
        if let Some(effect) = effect_on_examine {
            self.effects_by_id.insert(id.clone(), effect);
        }
        self.names_by_id.insert(id, name.unwrap_or_default());
        Ok(())
    }

    /// Removes every snippet and the migration index.
    pub fn clear(&mut self) {
        self.hash_to_id_migration = None;
        self.snippets_by_category.clear();
        self.snippets_by_id.clear();
        self.load_order.clear();
        self.effects_by_id.clear();
        self.names_by_id.clear();
    }

    fn category_mut(&mut self, category: &str) -> &mut CategorySnippets {
        self.snippets_by_category
            .entry(category.to_owned())
            .or_default()
    }

    fn discard_migration(&mut self, caller: &'static str) {
        if self.hash_to_id_migration.take().is_some() {
            tracing::warn!(
                "SnippetRegistry::{} called after SnippetRegistry::migrate_hash_to_id",
                caller
            );
        }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn has_category(&self, category: &str) -> bool {
        self.snippets_by_category.contains_key(category)
    }

    pub fn has_id(&self, id: &SnippetId) -> bool {
        self.snippets_by_id.contains_key(id)
    }

    pub fn get_by_id(&self, id: &SnippetId) -> Option<Translation> {
        self.snippets_by_id.get(id).cloned()
    }

    pub fn get_effect_by_id(&self, id: &SnippetId) -> Option<ExamineEffect> {
        self.effects_by_id.get(id).cloned()
    }

    /// Display name of a snippet. Loaded snippets without a `name` field have
    /// an empty name, not `None`.
    pub fn get_name_by_id(&self, id: &SnippetId) -> Option<Translation> {
        self.names_by_id.get(id).cloned()
    }

    /// Text of a snippet, or a shared empty [`Translation`] if the id is
    /// unknown. Use [`get_by_id`](Self::get_by_id) to tell the two apart.
    pub fn get_ref_by_id(&self, id: &SnippetId) -> &Translation {
        self.snippets_by_id.get(id).unwrap_or(&EMPTY_TRANSLATION)
    }

    /// Identifier-bearing entries of `category` with their display text, in
    /// insertion order.
    ///
    /// With `include_null_marker`, a non-empty listing starts with a
    /// `(SnippetChoice::None, "")` row for pickers that allow "no selection".
    /// Anonymous entries are never listed. Unknown categories give an empty
    /// list.
    pub fn list_by_category(
        &self,
        category: &str,
        include_null_marker: bool,
    ) -> Vec<(SnippetChoice, String)> {
        let Some(snippets) = self.snippets_by_category.get(category) else {
            return Vec::new();
        };

        let mut listing = Vec::with_capacity(snippets.ids.len() + 1);
        if include_null_marker && !snippets.ids.is_empty() {
            listing.push((SnippetChoice::None, String::new()));
        }
        for id in &snippets.ids {
            let text = self.get_ref_by_id(id).translated();
            listing.push((SnippetChoice::Id(id.clone()), text));
        }
        listing
    }

    /// `(identifier-bearing, anonymous)` entry counts of `category`.
    pub fn category_counts(&self, category: &str) -> Option<(usize, usize)> {
        self.snippets_by_category
            .get(category)
            .map(|snippets| (snippets.ids.len(), snippets.no_id.len()))
    }

    /// All identifiers in load order.
    pub fn ids(&self) -> impl Iterator<Item = &SnippetId> + '_ {
        self.load_order.iter()
    }

    pub fn id_count(&self) -> usize {
        self.snippets_by_id.len()
    }

    pub fn category_count(&self) -> usize {
        self.snippets_by_category.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets_by_category.is_empty()
    }

    // ========================================================================
    // Random selection
    // ========================================================================

    /// Uniformly random identifier from `category`.
    ///
    /// Returns `None` for unknown categories and for categories without
    /// identifier-bearing entries. Anonymous entries can never be returned
    /// here, so their presence is logged.
    pub fn random_id_from_category(&self, category: &str) -> Option<SnippetId> {
        let snippets = self.snippets_by_category.get(category)?;
        if !snippets.no_id.is_empty() && self.config.warn_on_mixed_categories {
            tracing::warn!(
                "ids are required, but not specified for some snippets in category {}",
                category
            );
        }
        snippets.ids.choose(&mut rand::thread_rng()).cloned()
    }

    /// Random entry of `category`, seeded from the process RNG.
    pub fn random_from_category(&self, category: &str) -> Option<Translation> {
        self.pick_from_category(category, &mut ThreadSeeds).cloned()
    }

    /// Random entry of `category` for a fixed seed.
    ///
    /// Identifier-bearing and anonymous entries are equally likely. The same
    /// seed always selects the same entry as long as the category is
    /// unchanged.
    pub fn random_from_category_seeded(&self, category: &str, seed: u32) -> Option<Translation> {
        let snippets = self.snippets_by_category.get(category)?;
        self.select(snippets, seed).cloned()
    }

    /// Draws a seed only when `category` has something to pick from.
    pub(crate) fn pick_from_category(
        &self,
        category: &str,
        seeds: &mut dyn SeedSource,
    ) -> Option<&Translation> {
        let snippets = self.snippets_by_category.get(category)?;
        if snippets.is_empty() {
            return None;
        }
        self.select(snippets, seeds.next_seed())
    }

    /// Ids occupy `[0, ids)`, anonymous entries `[ids, ids + anonymous)`.
    fn select<'a>(&'a self, snippets: &'a CategorySnippets, seed: u32) -> Option<&'a Translation> {
        if snippets.is_empty() {
            return None;
        }
        let index = SnippetRng::from_seed(u64::from(seed)).uniform_index(snippets.len());
        match snippets.ids.get(index) {
            Some(id) => self.snippets_by_id.get(id),
            None => snippets.no_id.get(index - snippets.ids.len()),
        }
    }

    // ========================================================================
    // Legacy hash migration
    // ========================================================================

    /// Maps a legacy text hash from old saves to the current identifier.
    ///
    /// The index is built on first use after any mutation. When several
    /// texts share a hash, the one loaded first wins.
    pub fn migrate_hash_to_id(&mut self, old_hash: i32) -> Option<SnippetId> {
        if self.hash_to_id_migration.is_none() {
            self.hash_to_id_migration = Some(self.build_migration_index());
        }
        self.hash_to_id_migration
            .as_ref()
            .and_then(|index| index.get(&old_hash))
            .cloned()
    }

    /// Returns true if the migration index is currently built.
    pub fn is_migration_built(&self) -> bool {
        self.hash_to_id_migration.is_some()
    }

    /// Drops the migration index without logging.
    pub fn invalidate_migration(&mut self) {
        self.hash_to_id_migration = None;
    }

    fn build_migration_index(&self) -> HashMap<i32, SnippetId> {
        let mut index = HashMap::new();
        for id in &self.load_order {
            let Some(hash) = self.snippets_by_id.get(id).and_then(Translation::legacy_hash) else {
                continue;
            };
            match index.entry(hash) {
                Entry::Vacant(slot) => {
                    slot.insert(id.clone());
                }
                Entry::Occupied(existing) => {
                    tracing::debug!(
                        "legacy hash {} of snippet {} already maps to {}",
                        hash,
                        id,
                        existing.get()
                    );
                }
            }
        }
        tracing::debug!("built snippet hash migration index with {} entries", index.len());
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> SnippetId {
        SnippetId::from(raw)
    }

    fn entry(raw_id: &str, text: &str) -> SnippetEntry {
        SnippetEntry::new(Translation::new(text)).with_id(raw_id)
    }

    fn anonymous(text: &str) -> BatchEntry {
        BatchEntry::Anonymous(Translation::new(text))
    }

    #[test]
    fn add_entry_stores_text_name_and_effect() {
        let mut registry = SnippetRegistry::new();
        let effect = ExamineEffect::new(vec![serde_json::json!({ "u_message": "hi" })]);
        registry
            .add_entry(
                "note",
                entry("note_1", "Buy milk.")
                    .with_name(Translation::new("Shopping list"))
                    .with_effect(effect.clone()),
            )
            .unwrap();
        registry.add_entry("note", entry("note_2", "Feed cat.")).unwrap();

        assert!(registry.has_category("note"));
        assert!(registry.has_id(&id("note_1")));
        assert_eq!(registry.get_by_id(&id("note_1")), Some(Translation::new("Buy milk.")));
        assert_eq!(
            registry.get_name_by_id(&id("note_1")),
            Some(Translation::new("Shopping list"))
        );
        assert_eq!(registry.get_effect_by_id(&id("note_1")), Some(effect));

        // No name field stores an empty name; no effect stores nothing.
        assert_eq!(registry.get_name_by_id(&id("note_2")), Some(Translation::default()));
        assert_eq!(registry.get_effect_by_id(&id("note_2")), None);
    }

    #[test]
    fn entry_without_id_is_anonymous() {
        let mut registry = SnippetRegistry::new();
        registry
            .add_entry("rumor", SnippetEntry::new(Translation::new("They say...")))
            .unwrap();
        assert_eq!(registry.category_counts("rumor"), Some((0, 1)));
        assert_eq!(registry.id_count(), 0);
    }

    #[test]
    fn missing_text_is_rejected() {
        let mut registry = SnippetRegistry::new();
        let entry = SnippetEntry {
            id: Some(id("note_1")),
            ..SnippetEntry::default()
        };
        let err = registry.add_entry("note", entry).unwrap_err();
        assert_eq!(
            err,
            SnippetError::MissingField {
                category: "note".into(),
                field: "text",
            }
        );
        assert!(!registry.has_category("note"));
        assert!(!registry.has_id(&id("note_1")));
    }

    #[test]
    fn null_id_is_rejected() {
        let mut registry = SnippetRegistry::new();
        let err = registry.add_entry("note", entry("", "x")).unwrap_err();
        assert!(matches!(err, SnippetError::NullId { .. }));
        assert!(!registry.has_category("note"));
    }

    #[test]
    fn duplicate_id_is_rejected_across_categories() {
        let mut registry = SnippetRegistry::new();
        registry.add_entry("a", entry("dup", "first")).unwrap();

        let same = registry.add_entry("a", entry("dup", "second")).unwrap_err();
        assert!(matches!(same, SnippetError::DuplicateId { .. }));

        let other = registry.add_entry("b", entry("dup", "third")).unwrap_err();
        assert_eq!(
            other,
            SnippetError::DuplicateId {
                category: "b".into(),
                id: id("dup"),
            }
        );

        assert_eq!(registry.get_by_id(&id("dup")), Some(Translation::new("first")));
        assert_eq!(registry.category_counts("a"), Some((1, 0)));
        assert!(!registry.has_category("b"));
    }

    #[test]
    fn load_dispatches_batch_and_single() {
        let mut registry = SnippetRegistry::new();
        registry
            .load(SnippetRecord::batch(
                "<greeting>",
                vec![anonymous("Hi."), BatchEntry::Entry(entry("greet_formal", "Good day."))],
            ))
            .unwrap();
        registry
            .load(SnippetRecord::single("note", entry("note_1", "Buy milk.")))
            .unwrap();

        assert_eq!(registry.category_counts("<greeting>"), Some((1, 1)));
        assert_eq!(registry.category_counts("note"), Some((1, 0)));
        assert_eq!(registry.category_count(), 2);
    }

    #[test]
    fn batch_keeps_entries_before_failure() {
        let mut registry = SnippetRegistry::new();
        registry.add_entry("a", entry("dup", "first")).unwrap();
        let result = registry.add_batch(
            "b",
            vec![
                anonymous("kept"),
                BatchEntry::Entry(entry("dup", "rejected")),
                anonymous("never reached"),
            ],
        );
        assert!(result.is_err());
        assert_eq!(registry.category_counts("b"), Some((0, 1)));
    }

    #[test]
    fn ref_lookup_falls_back_to_empty() {
        let mut registry = SnippetRegistry::new();
        registry.add_entry("note", entry("note_1", "Buy milk.")).unwrap();
        assert_eq!(registry.get_ref_by_id(&id("note_1")).raw(), "Buy milk.");
        assert!(registry.get_ref_by_id(&id("missing")).is_empty());
        assert_eq!(registry.get_by_id(&id("missing")), None);
        assert_eq!(registry.get_name_by_id(&id("missing")), None);
        assert_eq!(registry.get_effect_by_id(&id("missing")), None);
    }

    #[test]
    fn listing_prepends_null_marker_and_skips_anonymous() {
        let mut registry = SnippetRegistry::new();
        registry
            .add_batch(
                "sign",
                vec![
                    BatchEntry::Entry(entry("sign_b", "Beware.")),
                    anonymous("Scribbles."),
                    BatchEntry::Entry(entry("sign_a", "Welcome.")),
                ],
            )
            .unwrap();

        let listing = registry.list_by_category("sign", true);
        assert_eq!(
            listing,
            vec![
                (SnippetChoice::None, String::new()),
                (SnippetChoice::Id(id("sign_b")), "Beware.".to_owned()),
                (SnippetChoice::Id(id("sign_a")), "Welcome.".to_owned()),
            ]
        );

        let plain = registry.list_by_category("sign", false);
        assert_eq!(plain.len(), 2);
        assert_eq!(plain[0].0, SnippetChoice::Id(id("sign_b")));

        assert!(registry.list_by_category("missing", true).is_empty());
    }

    #[test]
    fn listing_has_no_marker_without_ids() {
        let mut registry = SnippetRegistry::new();
        registry.add_batch("rumor", vec![anonymous("Psst.")]).unwrap();
        assert!(registry.list_by_category("rumor", true).is_empty());
    }

    #[test]
    fn random_id_requires_id_entries() {
        let mut registry = SnippetRegistry::new();
        assert_eq!(registry.random_id_from_category("missing"), None);

        registry.add_batch("rumor", vec![anonymous("Psst.")]).unwrap();
        assert_eq!(registry.random_id_from_category("rumor"), None);

        registry
            .add_batch(
                "mixed",
                vec![anonymous("Psst."), BatchEntry::Entry(entry("only", "Only."))],
            )
            .unwrap();
        for _ in 0..8 {
            assert_eq!(registry.random_id_from_category("mixed"), Some(id("only")));
        }
    }

    #[test]
    fn random_id_is_always_a_member() {
        let mut registry = SnippetRegistry::new();
        for name in ["a", "b", "c"] {
            registry.add_entry("cat", entry(name, name)).unwrap();
        }
        for _ in 0..32 {
            let picked = registry.random_id_from_category("cat").unwrap();
            assert!(registry.has_id(&picked));
        }
    }

    #[test]
    fn seeded_selection_is_deterministic() {
        let mut registry = SnippetRegistry::new();
        registry
            .add_batch(
                "cat",
                vec![
                    BatchEntry::Entry(entry("x", "X")),
                    BatchEntry::Entry(entry("y", "Y")),
                    anonymous("Z"),
                    anonymous("W"),
                ],
            )
            .unwrap();

        for seed in [0, 1, 2, 17, 9_999, u32::MAX] {
            let first = registry.random_from_category_seeded("cat", seed);
            assert!(first.is_some());
            for _ in 0..4 {
                assert_eq!(registry.random_from_category_seeded("cat", seed), first);
            }
        }
    }

    #[test]
    fn seeded_selection_is_close_to_uniform() {
        let mut registry = SnippetRegistry::new();
        registry
            .add_batch(
                "cat",
                vec![
                    BatchEntry::Entry(entry("x", "X")),
                    BatchEntry::Entry(entry("y", "Y")),
                    anonymous("Z"),
                ],
            )
            .unwrap();

        let draws = 6_000u32;
        let mut counts: HashMap<String, u32> = HashMap::new();
        for seed in 0..draws {
            let text = registry.random_from_category_seeded("cat", seed).unwrap();
            *counts.entry(text.translated()).or_default() += 1;
        }

        assert_eq!(counts.len(), 3);
        let expected = draws / 3;
        for (text, count) in counts {
            let deviation = count.abs_diff(expected);
            assert!(
                deviation < expected / 10,
                "{} drawn {} times, expected about {}",
                text,
                count,
                expected
            );
        }
    }

    #[test]
    fn random_selection_absent_for_unknown_or_empty() {
        let mut registry = SnippetRegistry::new();
        assert_eq!(registry.random_from_category("missing"), None);
        assert_eq!(registry.random_from_category_seeded("missing", 3), None);

        registry.add_batch("empty", Vec::new()).unwrap();
        assert!(!registry.has_category("empty"));

        registry.add_batch("one", vec![anonymous("only")]).unwrap();
        assert_eq!(registry.random_from_category("one"), Some(Translation::new("only")));
    }

    #[test]
    fn migration_finds_matching_hash() {
        let mut registry = SnippetRegistry::new();
        registry.add_entry("note", entry("note_1", "Buy milk.")).unwrap();
        registry.add_entry("note", entry("note_2", "Feed cat.")).unwrap();

        let hash = Translation::new("Feed cat.").legacy_hash().unwrap();
        assert_eq!(registry.migrate_hash_to_id(hash), Some(id("note_2")));
        assert!(registry.is_migration_built());

        let missing = Translation::new("Never loaded.").legacy_hash().unwrap();
        assert_eq!(registry.migrate_hash_to_id(missing), None);
    }

    #[test]
    fn migration_skips_texts_without_hash() {
        let mut registry = SnippetRegistry::new();
        let text = Translation::new("lead").with_context("metal");
        registry
            .add_entry("ore", SnippetEntry::new(text).with_id("ore_lead"))
            .unwrap();
        let plain_hash = Translation::new("lead").legacy_hash().unwrap();
        assert_eq!(registry.migrate_hash_to_id(plain_hash), None);
    }

    #[test]
    fn migration_prefers_first_loaded_on_collision() {
        let mut registry = SnippetRegistry::new();
        registry.add_entry("a", entry("first", "Same text.")).unwrap();
        registry.add_entry("b", entry("second", "Same text.")).unwrap();
        let hash = Translation::new("Same text.").legacy_hash().unwrap();
        assert_eq!(registry.migrate_hash_to_id(hash), Some(id("first")));
    }

    #[test]
    fn mutation_invalidates_migration_index() {
        let mut registry = SnippetRegistry::new();
        registry.add_entry("note", entry("note_1", "Buy milk.")).unwrap();

        let late = Translation::new("Late entry.").legacy_hash().unwrap();
        assert_eq!(registry.migrate_hash_to_id(late), None);
        assert!(registry.is_migration_built());

        registry.add_entry("note", entry("note_2", "Late entry.")).unwrap();
        assert!(!registry.is_migration_built());
        assert_eq!(registry.migrate_hash_to_id(late), Some(id("note_2")));

        registry.invalidate_migration();
        assert!(!registry.is_migration_built());
    }

    #[test]
    fn clear_resets_everything() {
        let mut registry = SnippetRegistry::new();
        let effect = ExamineEffect::new(vec![serde_json::json!({ "u_message": "hi" })]);
        registry
            .add_entry("note", entry("note_1", "Buy milk.").with_effect(effect))
            .unwrap();
        let hash = Translation::new("Buy milk.").legacy_hash().unwrap();
        assert_eq!(registry.migrate_hash_to_id(hash), Some(id("note_1")));

        registry.clear();

        assert!(registry.is_empty());
        assert!(!registry.is_migration_built());
        assert!(!registry.has_category("note"));
        assert!(!registry.has_id(&id("note_1")));
        assert_eq!(registry.get_by_id(&id("note_1")), None);
        assert_eq!(registry.get_name_by_id(&id("note_1")), None);
        assert_eq!(registry.get_effect_by_id(&id("note_1")), None);
        assert_eq!(registry.ids().count(), 0);
        assert_eq!(registry.migrate_hash_to_id(hash), None);
        assert!(registry.is_migration_built());
    }

    #[test]
    fn registry_is_shareable_after_load() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SnippetRegistry>();
    }
}
