//! Site configuration module.
//!
//! Handles loading and validating `config.toml`. The file lives at the root of
//! the docs directory and is never treated as a source document.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_name = "Documentation"
//! site_url = "https://docs.example.com/"   # Enables sitemap.xml (no default)
//! default_language = "en"
//! docs_structure = "suffix"     # "suffix" (page.fr.md) or "folder" (fr/page.md)
//! use_directory_urls = false    # page.md -> page.html (true: page/index.html)
//! fallback_to_default = true    # Missing translations fall back to default content
//!
//! [[languages]]
//! locale = "en"
//! name = "English"
//!
//! [[languages]]
//! locale = "fr"
//! name = "Français"
//! build = true                  # Produce a dedicated /fr/ tree
//! site_name = "Documentation FR"
//!
//! [nav_translations.fr]
//! "Getting Started" = "Premiers pas"
//! ```
//!
//! ## Language Order
//!
//! `[[languages]]` is an array of tables so its order is preserved: the
//! registry iterates locales in exactly the order they appear here. The
//! default language does not have to come first.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the configuration file inside the docs directory.
pub const CONFIG_FILENAME: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid locale code '{0}': expected `ll`, `ll_RR` or `ll-RR`")]
    InvalidLocale(String),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// How locale variants are expressed in the source tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocsStructure {
    /// `page.fr.md` next to `page.md`.
    #[default]
    Suffix,
    /// `fr/page.md` parallel to `en/page.md`.
    Folder,
}

impl fmt::Display for DocsStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suffix => f.write_str("suffix"),
            Self::Folder => f.write_str("folder"),
        }
    }
}

/// One `[[languages]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LanguageConfig {
    /// Locale code, e.g. `fr` or `pt_BR`.
    pub locale: String,
    /// Display name shown in the language switcher. Defaults to the code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Whether a dedicated `/<locale>/` tree is produced.
    #[serde(default = "default_true")]
    pub build: bool,
    /// Switcher link override (defaults to `./` or `./<locale>/`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Fixed external link used by the switcher instead of the contextual one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_link: Option<String>,
    /// Site name used inside this locale's tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
}

impl LanguageConfig {
    /// A language entry with every optional field unset.
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            name: None,
            build: true,
            link: None,
            fixed_link: None,
            site_name: None,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site-wide name, overridable per language.
    pub site_name: String,
    /// Absolute base URL. Required for alternate links and the sitemap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_url: Option<String>,
    /// Locale whose content populates the root tree.
    pub default_language: String,
    /// Source tree layout.
    pub docs_structure: DocsStructure,
    /// Map `page.md` to `page/index.html` instead of `page.html`.
    pub use_directory_urls: bool,
    /// Let non-default locales fall back to default and locale-agnostic documents.
    pub fallback_to_default: bool,
    /// Configured languages, in iteration order.
    pub languages: Vec<LanguageConfig>,
    /// Per-locale navigation title dictionaries (`title -> translated title`).
    pub nav_translations: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "Documentation".to_string(),
            site_url: None,
            default_language: "en".to_string(),
            docs_structure: DocsStructure::default(),
            use_directory_urls: false,
            fallback_to_default: true,
            languages: Vec::new(),
            nav_translations: BTreeMap::new(),
        }
    }
}

impl SiteConfig {
    /// Validate cross-field constraints that serde cannot express.
    ///
    /// Locale code syntax is checked by the registry, which owns that rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for lang in &self.languages {
            if !seen.insert(lang.locale.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "language '{}' is configured more than once",
                    lang.locale
                )));
            }
        }
        for locale in self.nav_translations.keys() {
            if !seen.contains(locale.as_str()) && *locale != self.default_language {
                return Err(ConfigError::Validation(format!(
                    "nav_translations.{locale} does not match any configured language"
                )));
            }
        }
        if let Some(url) = &self.site_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConfigError::Validation(format!(
                "site_url must start with http:// or https://, got '{url}'"
            )));
        }
        Ok(())
    }

    /// Title dictionary for a locale, if one is configured.
    pub fn nav_translations_for(&self, locale: &str) -> Option<&BTreeMap<String, String>> {
        self.nav_translations.get(locale)
    }
}

/// Parse and validate a config document.
pub fn parse_config(content: &str) -> Result<SiteConfig, ConfigError> {
    let config: SiteConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Returns stock defaults when the file doesn't exist.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(&config_path)?;
    parse_config(&content)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# static-i18n Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults unless noted otherwise.
# Unknown keys will cause an error.

# Site-wide name (each language may override it with `site_name`).
site_name = "Documentation"

# Absolute base URL of the published site. When set, alternate links and
# sitemap.xml are generated. No default.
# site_url = "https://docs.example.com/"

# Locale whose content is built at the root of the output directory.
# If it is not listed under [[languages]] it is added automatically.
default_language = "en"

# How translations are laid out in the docs directory:
#   "suffix" -> page.md, page.fr.md
#   "folder" -> en/page.md, fr/page.md (other top-level folders are shared)
docs_structure = "suffix"

# false: page.md -> page.html
# true:  page.md -> page/index.html
use_directory_urls = false

# When a translation is missing, use the default language (then the
# unlocalized file). Set to false to only publish translated documents in
# /<locale>/ trees; assets always fall back.
fallback_to_default = true

# ---------------------------------------------------------------------------
# Languages, in the order they should appear in the language switcher
# ---------------------------------------------------------------------------
[[languages]]
locale = "en"
name = "English"
# build = true                  # Produce a dedicated /en/ copy
# link = "./"                   # Language switcher link override
# fixed_link = "https://..."    # Always link here from the switcher
# site_name = "Documentation"   # Site name inside this language's tree

# [[languages]]
# locale = "fr"
# name = "Français"

# ---------------------------------------------------------------------------
# Navigation title translations, per locale
# ---------------------------------------------------------------------------
# Every navigation entry whose title matches a key is renamed, wherever it
# appears in the tree.
# [nav_translations.fr]
# "Getting Started" = "Premiers pas"
"##
}
