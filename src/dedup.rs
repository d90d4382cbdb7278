//! Search-index deduplication.
//!
//! A single shared search index would otherwise list the same content once
//! per tree: a page with no French translation appears at `/page.html` and,
//! through fallback, at `/fr/page.html`. The consumer indexes the default
//! locale's version once and skips `(locale, key)` whenever
//! [`Deduplicator::is_duplicate_of_default`] says so.
//!
//! Two resolutions are duplicates when they point at the same source file,
//! or at files with the same SHA-256 content hash. This compares sources,
//! not rendered pages: a translated file that renders identically is not
//! caught, and locale-specific page furniture (switcher, site name) is
//! ignored.
//!
//! Hashes are computed lazily, once per source file, and cached for the
//! build. An unreadable file is logged and treated as distinct content.

use crate::discover::SourceFile;
use crate::resolve::Resolver;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

/// Decides which `(locale, key)` pairs repeat the default locale's content.
#[derive(Debug)]
pub struct Deduplicator<'a> {
    resolver: Resolver<'a>,
    hashes: Mutex<HashMap<PathBuf, Option<String>>>,
}

impl<'a> Deduplicator<'a> {
    pub fn new(resolver: Resolver<'a>) -> Self {
        Self {
            resolver,
            hashes: Mutex::new(HashMap::new()),
        }
    }

    /// True when `(locale, key)` resolves to the same content as `(default, key)`.
    ///
    /// Absent documents are never duplicates.
    pub fn is_duplicate_of_default(&self, locale: &str, key: &str) -> bool {
        let default_code = self.resolver.registry().default_code();
        let (Some(mine), Some(default)) = (
            self.resolver.resolve(locale, key),
            self.resolver.resolve(default_code, key),
        ) else {
            return false;
        };

        if mine.source.src_path == default.source.src_path {
            return true;
        }
        match (self.content_hash(mine.source), self.content_hash(default.source)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    fn content_hash(&self, file: &SourceFile) -> Option<String> {
        if let Some(cached) = self.lock().get(&file.abs_path) {
            return cached.clone();
        }
        let hash = match hash_file(&file.abs_path) {
            Ok(hash) => Some(hash),
            Err(err) => {
                warn!("Could not hash {} for deduplication: {err}", file.src_path);
                None
            }
        };
        self.lock().insert(file.abs_path.clone(), hash.clone());
        hash
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Option<String>>> {
        // Inserts are single calls, so a poisoned map is still consistent.
        self.hashes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocsStructure;
    use crate::discover::discover;
    use crate::test_helpers::{registry, write_tree};

    #[test]
    fn fallback_to_same_file_is_duplicate() {
        let tmp = write_tree(&[("index.md", "# Home")]);
        let registry = registry("en", &[("en", true), ("fr", true)]);
        let index = discover(tmp.path(), DocsStructure::Suffix, &registry).unwrap();
        let dedup = Deduplicator::new(Resolver::new(&index, &registry, true));

        assert!(dedup.is_duplicate_of_default("fr", "index.md"));
        assert!(dedup.is_duplicate_of_default("en", "index.md"));
    }

    #[test]
    fn translated_file_is_not_duplicate() {
        let tmp = write_tree(&[("index.md", "# Home"), ("index.fr.md", "# Accueil")]);
        let registry = registry("en", &[("en", true), ("fr", true)]);
        let index = discover(tmp.path(), DocsStructure::Suffix, &registry).unwrap();
        let dedup = Deduplicator::new(Resolver::new(&index, &registry, true));

        assert!(!dedup.is_duplicate_of_default("fr", "index.md"));
    }

    #[test]
    fn identical_bytes_are_duplicate() {
        let tmp = write_tree(&[("logo.png", "same-bytes"), ("logo.fr.png", "same-bytes")]);
        let registry = registry("en", &[("en", true), ("fr", true)]);
        let index = discover(tmp.path(), DocsStructure::Suffix, &registry).unwrap();
        let dedup = Deduplicator::new(Resolver::new(&index, &registry, true));

        assert!(dedup.is_duplicate_of_default("fr", "logo.png"));
    }

    #[test]
    fn absent_document_is_not_duplicate() {
        let tmp = write_tree(&[("only.fr.md", "# Seulement")]);
        let registry = registry("en", &[("en", true), ("fr", true)]);
        let index = discover(tmp.path(), DocsStructure::Suffix, &registry).unwrap();
        let dedup = Deduplicator::new(Resolver::new(&index, &registry, true));

        assert!(!dedup.is_duplicate_of_default("fr", "only.md"));
        assert!(!dedup.is_duplicate_of_default("fr", "missing.md"));
    }

    #[test]
    fn unreadable_file_is_not_duplicate() {
        let tmp = write_tree(&[("page.md", "# Page"), ("page.fr.md", "# Page")]);
        let registry = registry("en", &[("en", true), ("fr", true)]);
        let index = discover(tmp.path(), DocsStructure::Suffix, &registry).unwrap();
        std::fs::remove_file(tmp.path().join("page.fr.md")).unwrap();
        let dedup = Deduplicator::new(Resolver::new(&index, &registry, true));

        assert!(!dedup.is_duplicate_of_default("fr", "page.md"));
    }

    #[test]
    fn hash_file_is_stable() {
        let tmp = write_tree(&[("a.txt", "hello"), ("b.txt", "hello"), ("c.txt", "world")]);
        let a = hash_file(&tmp.path().join("a.txt")).unwrap();
        let b = hash_file(&tmp.path().join("b.txt")).unwrap();
        let c = hash_file(&tmp.path().join("c.txt")).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
