//! Shared types handed to rendering collaborators.

use serde::{Deserialize, Serialize};

/// Navigation tree node: a page, a section, or an external link.
///
/// - Page: `url` set, no children
/// - Section: `url` unset, children
/// - Link: `url` is absolute (`https://...`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavNode {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavNode>,
    /// Title before translation. Set only on translated nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub untranslated: Option<String>,
}

impl NavNode {
    pub fn page(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: Some(url.into()),
            children: Vec::new(),
            untranslated: None,
        }
    }

    pub fn section(title: impl Into<String>, children: Vec<NavNode>) -> Self {
        Self {
            title: title.into(),
            url: None,
            children,
            untranslated: None,
        }
    }

    /// The title as authored, ignoring any translation already applied.
    pub fn source_title(&self) -> &str {
        self.untranslated.as_deref().unwrap_or(&self.title)
    }

    pub fn is_external(&self) -> bool {
        self.url
            .as_deref()
            .is_some_and(|u| u.starts_with("http://") || u.starts_with("https://"))
    }
}
