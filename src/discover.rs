//! Source discovery.
//!
//! Stage 1 of the build. Walks the docs directory once and classifies every
//! file by logical document key and detected locale, producing an immutable
//! [`DiscoveryIndex`] that every later stage reads.
//!
//! ## Layouts
//!
//! ```text
//! suffix mode                      folder mode
//! docs/                            docs/
//! ├── index.md       (none)        ├── en/index.md      (en, index.md)
//! ├── index.fr.md    (fr)          ├── fr/index.md      (fr, index.md)
//! ├── guide/                       ├── fr/guide/start.md(fr, guide/start.md)
//! │   └── start.fr.md(fr)          └── assets/logo.png  (none, assets/logo.png)
//! └── logo.png       (none)
//! ```
//!
//! - **Suffix**: a `.<code>` segment right before the final extension marks
//!   the locale and is removed from the key. The code must be configured;
//!   `notes.xx.md` with no `xx` locale keeps its full name and is
//!   locale-agnostic.
//! - **Folder**: a first path segment equal to a configured code marks the
//!   locale and is removed from the key. Any other top-level folder holds
//!   shared, locale-agnostic files.
//!
//! ## Skipped Entries
//!
//! Hidden files and directories (leading `.`) and the root `config.toml` are
//! never source files.
//!
//! ## Failure
//!
//! Any traversal error aborts discovery: a partial index would make fallback
//! decisions elsewhere silently wrong. Two files landing on the same
//! `(locale, key)` pair are a [`ResolutionConflictError`]. Keys that differ
//! only by letter case are distinct documents; they are logged with a
//! warning since they collide once copied to a case-insensitive filesystem.

use crate::config::{CONFIG_FILENAME, DocsStructure};
use crate::locale::LocaleRegistry;
use crate::resolve::ResolutionConflictError;
use serde::Serialize;
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// File extensions rendered as documents. Everything else is an asset.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["md", "markdown"];

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Docs directory not found: {0}")]
    MissingRoot(PathBuf),
    #[error("Failed to traverse docs directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),
    #[error(transparent)]
    Conflict(#[from] ResolutionConflictError),
}

/// Locale-independent identity of a source file.
///
/// A `/`-separated path relative to the docs root with the locale marker
/// removed. Two files sharing a key are the same document in different
/// languages.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DocKey(String);

impl DocKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final extension, lowercased. Empty when the file has none.
    pub fn extension(&self) -> String {
        extension_of(self.file_name())
    }

    pub fn file_name(&self) -> &str {
        self.0.rsplit_once('/').map_or(self.0.as_str(), |(_, name)| name)
    }

    pub fn is_document(&self) -> bool {
        DOCUMENT_EXTENSIONS.contains(&self.extension().as_str())
    }
}

impl Borrow<str> for DocKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One discovered file. Immutable for the rest of the build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceFile {
    /// Path relative to the docs root, `/`-separated, marker included.
    pub src_path: String,
    /// Absolute (or root-joined) path for reading.
    #[serde(skip)]
    pub abs_path: PathBuf,
    pub key: DocKey,
    /// Detected locale, `None` for locale-agnostic files.
    pub locale: Option<String>,
}

impl SourceFile {
    pub fn is_document(&self) -> bool {
        self.key.is_document()
    }

    /// Locale label for display: the code, or `none`.
    pub fn locale_label(&self) -> &str {
        self.locale.as_deref().unwrap_or("none")
    }
}

/// All source files, keyed by logical document then by detected locale.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryIndex {
    structure: DocsStructure,
    documents: BTreeMap<DocKey, Vec<SourceFile>>,
}

impl DiscoveryIndex {
    /// Empty index for a given layout.
    pub fn new(structure: DocsStructure) -> Self {
        Self {
            structure,
            documents: BTreeMap::new(),
        }
    }

    /// Add a record, refusing a second file for the same `(locale, key)`.
    pub fn insert(&mut self, file: SourceFile) -> Result<(), ResolutionConflictError> {
        let variants = self.documents.entry(file.key.clone()).or_default();
        if let Some(existing) = variants.iter().find(|f| f.locale == file.locale) {
            return Err(ResolutionConflictError::new(
                file.locale_label(),
                file.key.as_str(),
                &existing.src_path,
                &file.src_path,
            ));
        }
        variants.push(file);
        variants.sort_by(|a, b| a.locale.cmp(&b.locale));
        Ok(())
    }

    pub fn structure(&self) -> DocsStructure {
        self.structure
    }

    /// Logical keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &DocKey> {
        self.documents.keys()
    }

    /// Every locale variant of a key, locale-agnostic first.
    pub fn variants(&self, key: &str) -> &[SourceFile] {
        self.documents.get(key).map_or(&[], Vec::as_slice)
    }

    /// The record for `(locale, key)`; `None` as locale selects the agnostic file.
    pub fn get(&self, key: &str, locale: Option<&str>) -> Option<&SourceFile> {
        self.variants(key)
            .iter()
            .find(|f| f.locale.as_deref() == locale)
    }

    /// All records, grouped by key.
    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.documents.values().flatten()
    }

    /// Number of distinct logical documents.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Number of source files.
    pub fn file_count(&self) -> usize {
        self.documents.values().map(Vec::len).sum()
    }
}

/// Walk `root` and build the discovery index.
pub fn discover(
    root: &Path,
    structure: DocsStructure,
    registry: &LocaleRegistry,
) -> Result<DiscoveryIndex, DiscoveryError> {
    if !root.is_dir() {
        return Err(DiscoveryError::MissingRoot(root.to_path_buf()));
    }

    let mut index = DiscoveryIndex::new(structure);
    // Lowercased (locale, key) -> source path, to flag case-only variants.
    let mut folded: HashMap<(Option<String>, String), String> = HashMap::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel_path = relative_slash_path(entry.path(), root)?;
        if rel_path == CONFIG_FILENAME {
            continue;
        }

        let (key, locale) = classify(&rel_path, structure, registry);
        debug!(
            "discovered {rel_path} as {key} ({})",
            locale.as_deref().unwrap_or("none")
        );

        let fold_key = (locale.clone(), key.as_str().to_lowercase());
        if let Some(other) = folded.get(&fold_key) {
            warn!("{rel_path} and {other} differ only by letter case");
        } else {
            folded.insert(fold_key, rel_path.clone());
        }

        index.insert(SourceFile {
            abs_path: entry.path().to_path_buf(),
            src_path: rel_path,
            key,
            locale,
        })?;
    }

    Ok(index)
}

/// Derive the logical key and detected locale of a relative path.
pub fn classify(
    rel_path: &str,
    structure: DocsStructure,
    registry: &LocaleRegistry,
) -> (DocKey, Option<String>) {
    match structure {
        DocsStructure::Suffix => classify_suffix(rel_path, registry),
        DocsStructure::Folder => classify_folder(rel_path, registry),
    }
}

fn classify_suffix(rel_path: &str, registry: &LocaleRegistry) -> (DocKey, Option<String>) {
    let (dir, file_name) = match rel_path.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, rel_path),
    };

    // name.<code>.<ext>: both `name` and `ext` must be non-empty
    let stripped = file_name
        .rsplit_once('.')
        .filter(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
        .and_then(|(stem, ext)| {
            let (base, code) = stem.rsplit_once('.')?;
            (!base.is_empty() && registry.contains(code)).then(|| (format!("{base}.{ext}"), code))
        });

    match stripped {
        Some((name, code)) => {
            let key = match dir {
                Some(dir) => format!("{dir}/{name}"),
                None => name,
            };
            (DocKey::new(key), Some(code.to_string()))
        }
        None => (DocKey::new(rel_path), None),
    }
}

fn classify_folder(rel_path: &str, registry: &LocaleRegistry) -> (DocKey, Option<String>) {
    match rel_path.split_once('/') {
        Some((first, rest)) if !rest.is_empty() && registry.contains(first) => {
            (DocKey::new(rest), Some(first.to_string()))
        }
        _ => (DocKey::new(rel_path), None),
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn relative_slash_path(path: &Path, root: &Path) -> Result<String, DiscoveryError> {
    let rel = path
        .strip_prefix(root)
        .map_err(|_| DiscoveryError::NonUtf8Path(path.to_path_buf()))?;
    let mut parts = Vec::new();
    for component in rel.components() {
        let part = component
            .as_os_str()
            .to_str()
            .ok_or_else(|| DiscoveryError::NonUtf8Path(path.to_path_buf()))?;
        parts.push(part);
    }
    Ok(parts.join("/"))
}

fn extension_of(path: &str) -> String {
    let name = path.rsplit_once('/').map_or(path, |(_, name)| name);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_lowercase(),
        _ => String::new(),
    }
}
