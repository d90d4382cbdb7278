//! Fallback resolution.
//!
//! Picks, for every `(locale, key)` pair, the source file that supplies the
//! document's content. The chain is evaluated in order and the first hit
//! wins:
//!
//! 1. **Exact locale**: a file marked with the requested locale.
//! 2. **Default locale**: a file marked with the default locale (skipped when
//!    the requested locale is the default, since tier 1 covers it).
//! 3. **Locale-agnostic**: a file with no locale marker.
//!
//! No hit means the document does not exist for that locale. That is a
//! normal outcome, not an error: the locale's tree simply omits the page.
//!
//! With `fallback_to_default = false`, non-default locales stop after tier 1
//! for documents. Assets keep the full chain so translated pages can still
//! reference shared images.
//!
//! Resolution is a pure function of the discovery index: the index holds at
//! most one file per `(locale, key)`, so there is never a tie to break.

use crate::discover::{DiscoveryIndex, DocKey, SourceFile};
use crate::locale::LocaleRegistry;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Two distinct source files claim the same `(locale, key)` or output path.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Conflicting files for '{key}' in locale '{locale}': choose either '{first}' or '{second}' but not both")]
pub struct ResolutionConflictError {
    pub locale: String,
    pub key: String,
    pub first: String,
    pub second: String,
}

impl ResolutionConflictError {
    pub fn new(locale: &str, key: &str, first: &str, second: &str) -> Self {
        Self {
            locale: locale.to_string(),
            key: key.to_string(),
            first: first.to_string(),
            second: second.to_string(),
        }
    }
}

/// Which step of the fallback chain supplied a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    ExactLocale,
    DefaultLocale,
    LocaleAgnostic,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactLocale => f.write_str("exact"),
            Self::DefaultLocale => f.write_str("default"),
            Self::LocaleAgnostic => f.write_str("agnostic"),
        }
    }
}

/// The winning source file for a `(locale, key)` pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution<'a> {
    pub source: &'a SourceFile,
    pub tier: Tier,
}

/// Evaluates the fallback chain against a discovery index.
///
/// Holds only shared references, so one resolver can serve every locale from
/// parallel workers.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    index: &'a DiscoveryIndex,
    registry: &'a LocaleRegistry,
    fallback_to_default: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(
        index: &'a DiscoveryIndex,
        registry: &'a LocaleRegistry,
        fallback_to_default: bool,
    ) -> Self {
        Self {
            index,
            registry,
            fallback_to_default,
        }
    }

    pub fn index(&self) -> &'a DiscoveryIndex {
        self.index
    }

    pub fn registry(&self) -> &'a LocaleRegistry {
        self.registry
    }

    /// Resolve one document for one locale.
    pub fn resolve(&self, locale: &str, key: &str) -> Option<Resolution<'a>> {
        if let Some(source) = self.index.get(key, Some(locale)) {
            return Some(Resolution {
                source,
                tier: Tier::ExactLocale,
            });
        }

        let is_default = self.registry.is_default(locale);
        if !is_default && !self.falls_back(key) {
            return None;
        }

        if !is_default
            && let Some(source) = self.index.get(key, Some(self.registry.default_code()))
        {
            return Some(Resolution {
                source,
                tier: Tier::DefaultLocale,
            });
        }

        self.index.get(key, None).map(|source| Resolution {
            source,
            tier: Tier::LocaleAgnostic,
        })
    }

    /// Resolve every known key for a locale, dropping absent documents.
    pub fn resolve_all(&self, locale: &str) -> BTreeMap<&'a DocKey, Resolution<'a>> {
        self.index
            .keys()
            .filter_map(|key| self.resolve(locale, key.as_str()).map(|r| (key, r)))
            .collect()
    }

    fn falls_back(&self, key: &str) -> bool {
        self.fallback_to_default || !DocKey::new(key).is_document()
    }
}
