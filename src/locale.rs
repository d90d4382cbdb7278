//! Locale registry.
//!
//! Validates the configured languages and holds them in configuration order,
//! with exactly one designated default. Built once per build from a
//! [`SiteConfig`] and shared read-only by every later stage.
//!
//! ## Locale Codes
//!
//! A code is either a two-letter language (`fr`) or a region-qualified
//! five-letter form (`pt_BR`, `pt-BR`). Anything else is a configuration
//! error, since codes end up in file names (`page.pt_BR.md`) and output
//! directories (`/pt_BR/`).
//!
//! ## The Default Locale
//!
//! The default locale always participates in resolution, even with
//! `build = false`: it supplies fallback content and populates the root
//! tree. Its `build` flag only controls the extra `/<default>/` copy. If the
//! default is missing from `[[languages]]`, it is appended with its code as
//! display name.

use crate::config::{ConfigError, LanguageConfig, SiteConfig};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static LOCALE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2}(?:[_-][A-Z]{2})?$").expect("locale regex is valid"));

/// Whether `code` has the shape of a locale code.
pub fn is_valid_locale_code(code: &str) -> bool {
    LOCALE_RE.is_match(code)
}

/// A configured language with its display metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Locale {
    pub code: String,
    pub name: String,
    pub build: bool,
    pub default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
}

impl Locale {
    fn from_config(lang: &LanguageConfig, default_code: &str) -> Self {
        Self {
            code: lang.locale.clone(),
            name: lang.name.clone().unwrap_or_else(|| lang.locale.clone()),
            build: lang.build,
            default: lang.locale == default_code,
            link: lang.link.clone(),
            fixed_link: lang.fixed_link.clone(),
            site_name: lang.site_name.clone(),
        }
    }
}

/// One entry of the language switcher, consumed by theme integrations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitcherEntry {
    pub name: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_link: Option<String>,
    pub lang: String,
}

/// Ordered, validated set of locales.
#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    locales: Vec<Locale>,
    default_index: usize,
    site_name: String,
}

impl LocaleRegistry {
    /// Validate the configured languages and build the registry.
    pub fn new(config: &SiteConfig) -> Result<Self, ConfigError> {
        let default_code = config.default_language.as_str();
        if !is_valid_locale_code(default_code) {
            return Err(ConfigError::InvalidLocale(default_code.to_string()));
        }

        let mut locales = Vec::with_capacity(config.languages.len() + 1);
        for lang in &config.languages {
            if !is_valid_locale_code(&lang.locale) {
                return Err(ConfigError::InvalidLocale(lang.locale.clone()));
            }
            if locales.iter().any(|l: &Locale| l.code == lang.locale) {
                return Err(ConfigError::Validation(format!(
                    "language '{}' is configured more than once",
                    lang.locale
                )));
            }
            locales.push(Locale::from_config(lang, default_code));
        }

        let default_index = match locales.iter().position(|l| l.code == default_code) {
            Some(idx) => idx,
            None => {
                locales.push(Locale::from_config(
                    &LanguageConfig::new(default_code),
                    default_code,
                ));
                locales.len() - 1
            }
        };

        Ok(Self {
            locales,
            default_index,
            site_name: config.site_name.clone(),
        })
    }

    /// All locales in configuration order.
    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    /// The default locale.
    pub fn default_locale(&self) -> &Locale {
        &self.locales[self.default_index]
    }

    pub fn default_code(&self) -> &str {
        &self.default_locale().code
    }

    pub fn get(&self, code: &str) -> Option<&Locale> {
        self.locales.iter().find(|l| l.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn is_default(&self, code: &str) -> bool {
        self.default_code() == code
    }

    /// Whether a dedicated `/<code>/` tree is produced. Unknown codes never build.
    pub fn is_building(&self, code: &str) -> bool {
        self.get(code).is_some_and(|l| l.build)
    }

    /// Locales with `build = true`, in configuration order.
    pub fn building(&self) -> impl Iterator<Item = &Locale> {
        self.locales.iter().filter(|l| l.build)
    }

    /// Site name for a locale's tree: its override, or the site-wide name.
    pub fn site_name_for(&self, code: &str) -> &str {
        self.get(code)
            .and_then(|l| l.site_name.as_deref())
            .unwrap_or(&self.site_name)
    }

    /// Language switcher entries for every building locale.
    ///
    /// Empty unless more than one locale builds: a switcher with a single
    /// entry has nowhere to switch to.
    pub fn switcher_entries(&self, use_directory_urls: bool) -> Vec<SwitcherEntry> {
        if self.building().count() < 2 {
            return Vec::new();
        }
        let link_suffix = if use_directory_urls { "" } else { "index.html" };
        self.building()
            .map(|locale| {
                let base = match &locale.link {
                    Some(link) => link.clone(),
                    None if locale.default => "./".to_string(),
                    None => format!("./{}/", locale.code),
                };
                SwitcherEntry {
                    name: locale.name.clone(),
                    link: format!("{base}{link_suffix}"),
                    fixed_link: locale.fixed_link.clone(),
                    lang: locale.code.clone(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::site_config;

    #[test]
    fn valid_locale_codes() {
        for code in ["en", "fr", "pt_BR", "pt-BR", "zh_TW"] {
            assert!(is_valid_locale_code(code), "{code} should be valid");
        }
    }

    #[test]
    fn invalid_locale_codes() {
        for code in ["", "e", "eng", "EN", "en_us", "en-USA", "en.US", "fr/"] {
            assert!(!is_valid_locale_code(code), "{code} should be invalid");
        }
    }

    #[test]
    fn registry_preserves_configuration_order() {
        let config = site_config("fr", &[("en", true), ("fr", true), ("de", false)]);
        let registry = LocaleRegistry::new(&config).unwrap();

        let codes: Vec<&str> = registry.locales().iter().map(|l| l.code.as_str()).collect();
        assert_eq!(codes, vec!["en", "fr", "de"]);
        assert_eq!(registry.default_code(), "fr");
        assert!(registry.default_locale().default);
        assert!(!registry.get("en").unwrap().default);
    }

    #[test]
    fn missing_default_is_inserted() {
        let config = site_config("en", &[("fr", true)]);
        let registry = LocaleRegistry::new(&config).unwrap();

        let en = registry.get("en").unwrap();
        assert!(en.default);
        assert!(en.build);
        assert_eq!(en.name, "en");
        assert_eq!(registry.locales().len(), 2);
    }

    #[test]
    fn invalid_language_code_is_config_error() {
        let config = site_config("en", &[("en", true), ("french", true)]);
        let result = LocaleRegistry::new(&config);
        assert!(matches!(result, Err(ConfigError::InvalidLocale(code)) if code == "french"));
    }

    #[test]
    fn invalid_default_code_is_config_error() {
        let config = site_config("EN", &[("fr", true)]);
        let result = LocaleRegistry::new(&config);
        assert!(matches!(result, Err(ConfigError::InvalidLocale(_))));
    }

    #[test]
    fn is_building_follows_flag() {
        let config = site_config("en", &[("en", false), ("fr", true)]);
        let registry = LocaleRegistry::new(&config).unwrap();

        assert!(!registry.is_building("en"));
        assert!(registry.is_building("fr"));
        assert!(!registry.is_building("de"));
        let building: Vec<&str> = registry.building().map(|l| l.code.as_str()).collect();
        assert_eq!(building, vec!["fr"]);
    }

    #[test]
    fn site_name_override() {
        let mut config = site_config("en", &[("en", true), ("fr", true)]);
        config.site_name = "Docs".to_string();
        config.languages[1].site_name = Some("Docs FR".to_string());
        let registry = LocaleRegistry::new(&config).unwrap();

        assert_eq!(registry.site_name_for("en"), "Docs");
        assert_eq!(registry.site_name_for("fr"), "Docs FR");
    }

    #[test]
    fn switcher_entries_for_building_locales() {
        let mut config = site_config("en", &[("en", true), ("fr", true), ("de", false)]);
        config.languages[1].name = Some("Français".to_string());
        let registry = LocaleRegistry::new(&config).unwrap();

        let entries = registry.switcher_entries(true);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].lang, "en");
        assert_eq!(entries[0].link, "./");
        assert_eq!(entries[1].name, "Français");
        assert_eq!(entries[1].link, "./fr/");
    }

    #[test]
    fn switcher_links_end_with_index_without_directory_urls() {
        let config = site_config("en", &[("en", true), ("fr", true)]);
        let registry = LocaleRegistry::new(&config).unwrap();

        let links: Vec<String> = registry
            .switcher_entries(false)
            .into_iter()
            .map(|e| e.link)
            .collect();
        assert_eq!(links, vec!["./index.html", "./fr/index.html"]);
    }

    #[test]
    fn switcher_empty_with_single_building_locale() {
        let config = site_config("en", &[("en", true), ("fr", false)]);
        let registry = LocaleRegistry::new(&config).unwrap();
        assert!(registry.switcher_entries(true).is_empty());
    }
}
