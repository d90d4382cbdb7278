//! Shared test utilities for the static-i18n test suite.
//!
//! Builds throwaway docs trees and locale setups so module tests can stay
//! focused on behavior.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = write_tree(&[("index.md", "# Home"), ("index.fr.md", "# Accueil")]);
//! let registry = registry("en", &[("en", true), ("fr", true)]);
//! let index = discover(tmp.path(), DocsStructure::Suffix, &registry).unwrap();
//! ```

use std::fs;
use tempfile::TempDir;

use crate::config::{LanguageConfig, SiteConfig};
use crate::locale::LocaleRegistry;

// =========================================================================
// Fixture setup
// =========================================================================

/// Write `(relative path, contents)` pairs into a fresh temp directory.
///
/// Parent directories are created as needed.
pub fn write_tree(files: &[(&str, &str)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (rel, contents) in files {
        let path = tmp.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
    }
    tmp
}

// =========================================================================
// Locale setups
// =========================================================================

/// Config with `default_language = default` and one `[[languages]]` entry
/// per `(code, build)` pair, in order.
pub fn site_config(default: &str, languages: &[(&str, bool)]) -> SiteConfig {
    SiteConfig {
        default_language: default.to_string(),
        languages: languages
            .iter()
            .map(|(code, build)| LanguageConfig {
                build: *build,
                ..LanguageConfig::new(*code)
            })
            .collect(),
        ..SiteConfig::default()
    }
}

/// Registry built from [`site_config`]. Panics on an invalid setup.
pub fn registry(default: &str, languages: &[(&str, bool)]) -> LocaleRegistry {
    LocaleRegistry::new(&site_config(default, languages))
        .unwrap_or_else(|e| panic!("invalid test locale setup: {e}"))
}

// =========================================================================
// Output tree inspection
// =========================================================================

/// Every file under `dir`, as sorted `/`-separated relative paths.
pub fn list_files(dir: &std::path::Path) -> Vec<String> {
    let mut files: Vec<String> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    files.sort();
    files
}
