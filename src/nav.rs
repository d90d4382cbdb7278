//! Navigation building and translation.
//!
//! ## Translation Is Title-Based
//!
//! Each locale may carry a flat `title -> translated title` dictionary. Every
//! node whose title exactly matches a key is renamed, wherever it sits in
//! the tree. Two unrelated sections both titled `Topic1` therefore receive
//! the same translation: a dictionary entry is a broad match, not a per-node
//! override.
//!
//! Translation always reads the node's original title, so translating an
//! already translated tree again with the same dictionary changes nothing,
//! and entries never chain (`A -> B`, `B -> C` does not turn `A` into `C`).
//! The input tree is never modified; each locale gets its own copy.
//!
//! ## Derived Navigation
//!
//! [`nav_from_pages`] builds a default tree from a plan's documents:
//! directories become sections, the directory's index page comes first, and
//! titles fall back to the file stem with dashes turned into spaces.

use crate::types::NavNode;
use std::collections::BTreeMap;
use tracing::info;

/// A translated navigation tree and how many titles changed.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatedNav {
    pub nav: Vec<NavNode>,
    pub translated: usize,
}

/// Translate a navigation tree with a locale's title dictionary.
///
/// `None` is the identity transform.
pub fn translate(nav: &[NavNode], dictionary: Option<&BTreeMap<String, String>>) -> TranslatedNav {
    let mut translated = 0;
    let nav = match dictionary {
        Some(dictionary) => translate_nodes(nav, dictionary, &mut translated),
        None => nav.to_vec(),
    };
    TranslatedNav { nav, translated }
}

/// [`translate`], logging the number of renamed entries for `locale`.
pub fn translate_for_locale(
    nav: &[NavNode],
    locale: &str,
    dictionary: Option<&BTreeMap<String, String>>,
) -> TranslatedNav {
    let result = translate(nav, dictionary);
    if result.translated > 0 {
        info!(
            "Translated {} navigation element{} to '{locale}'",
            result.translated,
            if result.translated > 1 { "s" } else { "" }
        );
    }
    result
}

fn translate_nodes(
    nodes: &[NavNode],
    dictionary: &BTreeMap<String, String>,
    translated: &mut usize,
) -> Vec<NavNode> {
    nodes
        .iter()
        .map(|node| {
            let source = node.source_title();
            let (title, untranslated) = match dictionary.get(source) {
                Some(target) => {
                    *translated += 1;
                    (target.clone(), Some(source.to_string()))
                }
                None => (source.to_string(), None),
            };
            NavNode {
                title,
                url: node.url.clone(),
                children: translate_nodes(&node.children, dictionary, translated),
                untranslated,
            }
        })
        .collect()
}

/// A document to place in a derived navigation tree.
#[derive(Debug, Clone)]
pub struct PageRef<'a> {
    /// Logical key, used for grouping (`guide/start.md`).
    pub key: &'a str,
    pub title: String,
    pub url: String,
}

/// Derive a navigation tree from a tree's documents.
pub fn nav_from_pages(pages: &[PageRef<'_>]) -> Vec<NavNode> {
    let mut root = Section::default();
    for page in pages {
        let mut section = &mut root;
        let mut parts: Vec<&str> = page.key.split('/').collect();
        let file_name = parts.pop().unwrap_or_default();
        for dir in parts {
            section = section.children.entry(dir.to_string()).or_default();
        }
        let node = NavNode::page(page.title.clone(), page.url.clone());
        if is_index(file_name) {
            section.pages.insert(0, node);
        } else {
            section.pages.push(node);
        }
    }
    root.into_nodes()
}

#[derive(Default)]
struct Section {
    pages: Vec<NavNode>,
    children: BTreeMap<String, Section>,
}

impl Section {
    fn into_nodes(self) -> Vec<NavNode> {
        let mut nodes = self.pages;
        for (dir, section) in self.children {
            nodes.push(NavNode::section(display_title(&dir), section.into_nodes()));
        }
        nodes
    }
}

fn is_index(file_name: &str) -> bool {
    let stem = file_name.split('.').next().unwrap_or_default();
    stem == "index" || stem == "README"
}

/// Display title for a file stem or directory name: dashes become spaces.
///
/// - `getting-started` -> "getting started"
/// - `API` -> "API"
pub fn display_title(name: &str) -> String {
    name.replace(['-', '_'], " ")
}
