//! Snippet file loader.
//!
//! A snippet file holds one record or an array of records, in JSON or RON
//! (map syntax). Records carrying a `type` other than `"snippet"` are skipped
//! so snippets can share files with other content.
//!
//! ```json
//! [
//!   { "type": "snippet", "category": "<greeting>", "text": [ "Hi.", "Hello." ] },
//!   { "type": "snippet", "category": "note", "id": "note_1", "text": "Buy milk." }
//! ]
//! ```
//!
//! Load errors name the record index. For JSON they also name the line and
//! column the record starts at (or the line of the bad field). RON files are
//! parsed as a whole first, so their record errors carry only the index.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use serde_json::value::RawValue;

use crate::loaders::{LoadResult, read_file};
use crate::record::SnippetRecord;
use crate::registry::SnippetRegistry;

/// Content type tag of snippet records.
pub const SNIPPET_TYPE: &str = "snippet";

/// Data file formats understood by [`SnippetLoader`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentFormat {
    Json,
    Ron,
}

impl ContentFormat {
    /// Format for a file extension, if it is a content file at all.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(Self::Json),
            "ron" => Some(Self::Ron),
            _ => None,
        }
    }
}

/// 1-based position in a content file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Location {
    line: usize,
    column: usize,
}

impl Location {
    fn at(content: &str, offset: usize) -> Self {
        let before = content.get(..offset).unwrap_or(content);
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => before.len() - newline,
            None => before.len() + 1,
        };
        Self { line, column }
    }

    /// Moves a position reported relative to the record text into the file.
    fn shifted(self, line: usize, column: usize) -> Self {
        if line <= 1 {
            Self {
                line: self.line,
                column: self.column + column.saturating_sub(1),
            }
        } else {
            Self {
                line: self.line + line - 1,
                column,
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {} column {}", self.line, self.column)
    }
}

/// Type tag of a record; every other field is left to [`SnippetRecord`].
#[derive(Deserialize)]
struct RecordHeader {
    #[serde(rename = "type", default)]
    kind: Option<Value>,
}

/// Loader for snippet records from data files.
pub struct SnippetLoader;

impl SnippetLoader {
    /// Load every snippet record of a file into `registry`.
    ///
    /// Returns the number of records loaded. Loading stops at the first bad
    /// record; records before it stay in the registry.
    pub fn load_file(registry: &mut SnippetRegistry, path: &Path) -> LoadResult<usize> {
        let format = ContentFormat::from_path(path).ok_or_else(|| {
            anyhow::anyhow!("Unsupported snippet file extension: {}", path.display())
        })?;
        let content = read_file(path)?;
        let loaded = Self::load_str(registry, &content, format)
            .with_context(|| format!("Failed to load snippets from {}", path.display()))?;

        tracing::debug!("loaded {} snippet records from {}", loaded, path.display());
        Ok(loaded)
    }

    /// Load snippet records from already-read file contents.
    pub fn load_str(
        registry: &mut SnippetRegistry,
        content: &str,
        format: ContentFormat,
    ) -> LoadResult<usize> {
        match format {
            ContentFormat::Json => Self::load_json(registry, content),
            ContentFormat::Ron => Self::load_ron(registry, content),
        }
    }

    fn load_json(registry: &mut SnippetRegistry, content: &str) -> LoadResult<usize> {
        let parsed = if content.trim_start().starts_with('[') {
            serde_json::from_str::<Vec<&RawValue>>(content)
        } else {
            serde_json::from_str::<&RawValue>(content).map(|raw| vec![raw])
        };
        let records = parsed.map_err(|e| anyhow::anyhow!("Failed to parse snippet JSON: {}", e))?;

        let mut loaded = 0;
        for (index, raw) in records.into_iter().enumerate() {
            let text = raw.get();
            let offset = (text.as_ptr() as usize).saturating_sub(content.as_ptr() as usize);
            let start = Location::at(content, offset);

            let header: RecordHeader = serde_json::from_str(text)
                .map_err(|e| invalid_json_record(index, start, &e))?;
            if !is_snippet_type(header.kind.as_ref()) {
                continue;
            }
            let record: SnippetRecord = serde_json::from_str(text)
                .map_err(|e| invalid_json_record(index, start, &e))?;
            load_record(registry, record, &format!("#{} at {}", index, start))?;
            loaded += 1;
        }
        Ok(loaded)
    }

    fn load_ron(registry: &mut SnippetRegistry, content: &str) -> LoadResult<usize> {
        let records = match ron::from_str::<Value>(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse snippet RON: {}", e))?
        {
            Value::Array(items) => items,
            other => vec![other],
        };

        let mut loaded = 0;
        for (index, value) in records.into_iter().enumerate() {
            if !is_snippet_type(value.get("type")) {
                continue;
            }
            let record = SnippetRecord::deserialize(value)
                .map_err(|e| anyhow::anyhow!("Invalid snippet record #{}: {}", index, e))?;
            load_record(registry, record, &format!("#{}", index))?;
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Load every `.json`/`.ron` file directly inside `dir`, in path order.
    pub fn load_dir(registry: &mut SnippetRegistry, dir: &Path) -> LoadResult<usize> {
        let mut loaded = 0;
        for path in content_files(dir)? {
            loaded += Self::load_file(registry, &path)?;
        }
        tracing::debug!(
            "loaded {} snippet records ({} ids) from {}",
            loaded,
            registry.id_count(),
            dir.display()
        );
        Ok(loaded)
    }

    /// Clear `registry` and load `dir` again.
    pub fn reload_dir(registry: &mut SnippetRegistry, dir: &Path) -> LoadResult<usize> {
        registry.clear();
        Self::load_dir(registry, dir)
    }
}

fn is_snippet_type(kind: Option<&Value>) -> bool {
    match kind {
        None => true,
        Some(Value::String(kind)) => kind == SNIPPET_TYPE,
        Some(_) => false,
    }
}

fn load_record(registry: &mut SnippetRegistry, record: SnippetRecord, at: &str) -> LoadResult<()> {
    let category = record.category.clone();
    registry
        .load(record)
        .with_context(|| format!("Snippet record {} (category '{}')", at, category))
}

fn invalid_json_record(index: usize, start: Location, err: &serde_json::Error) -> anyhow::Error {
    let message = err.to_string();
    if err.line() == 0 {
        return anyhow::anyhow!("Invalid snippet record #{} at {}: {}", index, start, message);
    }
    let suffix = format!(" at line {} column {}", err.line(), err.column());
    let message = match message.strip_suffix(suffix.as_str()) {
        Some(trimmed) => trimmed.to_owned(),
        None => message.clone(),
    };
    let at = start.shifted(err.line(), err.column());
    anyhow::anyhow!("Invalid snippet record #{} at {}: {}", index, at, message)
}

fn content_files(dir: &Path) -> LoadResult<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| anyhow::anyhow!("Failed to read directory {}: {}", dir.display(), e))?
            .path();
        if path.is_file() && ContentFormat::from_path(&path).is_some() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
