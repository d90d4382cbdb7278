//! Alternate links, sitemap, and contextual language switcher.
//!
//! For a logical document, the alternate set lists every localized output
//! that actually exists:
//!
//! - the default locale, pointing at the **root tree** (never at its own
//!   `/<default>/` copy);
//! - each non-default locale with `build = true` whose tree contains the
//!   document.
//!
//! A set with fewer than two entries is empty: one language has no
//! alternates. Locales that don't build never appear.
//!
//! URLs are rooted at `site_url` when configured, and at `/` otherwise.

use crate::locale::{LocaleRegistry, SwitcherEntry};
use crate::paths::{BuildPlan, OutputTree};
use serde::Serialize;
use std::fmt::Write as _;

/// One `(locale, URL)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alternate {
    pub lang: String,
    pub href: String,
}

/// Computes alternate links over a complete build plan.
#[derive(Debug, Clone, Copy)]
pub struct AlternateEmitter<'p, 'a> {
    plan: &'p BuildPlan<'a>,
    registry: &'p LocaleRegistry,
    base_url: &'p str,
}

impl<'p, 'a> AlternateEmitter<'p, 'a> {
    /// `base_url` is the configured `site_url`, or empty for site-absolute URLs.
    pub fn new(
        plan: &'p BuildPlan<'a>,
        registry: &'p LocaleRegistry,
        base_url: &'p str,
    ) -> Self {
        Self {
            plan,
            registry,
            base_url,
        }
    }

    /// Absolute URL of a site-relative URL.
    pub fn absolute(&self, url: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), url)
    }

    /// Ordered alternates of a document, in registry order.
    pub fn alternates_for(&self, key: &str) -> Vec<Alternate> {
        let alternates: Vec<Alternate> = self
            .registry
            .locales()
            .iter()
            .filter_map(|locale| {
                let tree = if locale.default {
                    OutputTree::Root
                } else if locale.build {
                    OutputTree::Locale(locale.code.clone())
                } else {
                    return None;
                };
                let entry = self.plan.entry(&tree, key)?;
                Some(Alternate {
                    lang: locale.code.clone(),
                    href: self.absolute(&entry.url),
                })
            })
            .collect();

        if alternates.len() < 2 {
            Vec::new()
        } else {
            alternates
        }
    }

    /// Language switcher for one page: each entry links to the same document
    /// in that language, or to the language's homepage when it is missing.
    ///
    /// Entries with a `fixed_link` keep it unchanged. A configured `link`
    /// stands in for the language's homepage: it is kept on homepage pages
    /// and wherever the document has no version in that language.
    pub fn switcher_for(&self, key: &str, use_directory_urls: bool) -> Vec<SwitcherEntry> {
        self.registry
            .switcher_entries(use_directory_urls)
            .into_iter()
            .map(|mut entry| {
                if entry.fixed_link.is_some() {
                    return entry;
                }
                let tree = if self.registry.is_default(&entry.lang) {
                    OutputTree::Root
                } else {
                    OutputTree::Locale(entry.lang.clone())
                };
                let page = self.plan.entry(&tree, key);
                let homepage = self.plan.tree(&tree).and_then(|t| t.homepage());
                let on_homepage =
                    matches!((page, homepage), (Some(p), Some(h)) if p.key == h.key);
                let configured = self
                    .registry
                    .get(&entry.lang)
                    .is_some_and(|l| l.link.is_some());
                if configured && (page.is_none() || on_homepage) {
                    return entry;
                }
                let url = match page.or(homepage) {
                    Some(e) => e.url.clone(),
                    None => match tree.prefix() {
                        "" => String::new(),
                        prefix => format!("{prefix}/"),
                    },
                };
                entry.link = self.absolute(&url);
                entry
            })
            .collect()
    }

    /// Trees listed in the sitemap: the root, then non-default building locales.
    fn sitemap_trees(&self) -> impl Iterator<Item = OutputTree> + '_ {
        std::iter::once(OutputTree::Root).chain(
            self.registry
                .building()
                .filter(|l| !l.default)
                .map(|l| OutputTree::Locale(l.code.clone())),
        )
    }

    /// Render `sitemap.xml` with `xhtml:link` alternates for every document.
    pub fn render_sitemap(&self) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\" \
             xmlns:xhtml=\"http://www.w3.org/1999/xhtml\">\n",
        );
        for tree in self.sitemap_trees() {
            let Some(plan) = self.plan.tree(&tree) else {
                continue;
            };
            for entry in plan.documents() {
                let _ = writeln!(xml, "  <url>");
                let loc = xml_escape(&self.absolute(&entry.url));
                let _ = writeln!(xml, "    <loc>{loc}</loc>");
                for alt in self.alternates_for(entry.key.as_str()) {
                    let _ = writeln!(
                        xml,
                        "    <xhtml:link rel=\"alternate\" hreflang=\"{}\" href=\"{}\"/>",
                        xml_escape(&alt.lang),
                        xml_escape(&alt.href)
                    );
                }
                let _ = writeln!(xml, "  </url>");
            }
        }
        xml.push_str("</urlset>\n");
        xml
    }
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
