//! # Static i18n
//!
//! Builds a multilingual documentation site from one docs directory. Files
//! carry their language either as a filename suffix (`page.fr.md`) or as a
//! top-level folder (`fr/page.md`); everything else is shared by all
//! languages.
//!
//! # Architecture: Plan, Then Write
//!
//! ```text
//! 1. Discover  docs/          →  DiscoveryIndex   (file → logical key + locale)
//! 2. Resolve   index × locale →  Resolution       (exact → default → agnostic)
//! 3. Plan      resolutions    →  BuildPlan        (root tree + one tree per building locale)
//! 4. Write     plan           →  site/            (render, copy, search index, sitemap)
//! ```
//!
//! Steps 1 to 3 never touch the output directory. A plan only exists when
//! every output path has exactly one source, so a conflict aborts the build
//! before anything is written.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `config.toml` loading, validation, stock config |
//! | [`locale`] | Ordered locale registry and language switcher entries |
//! | [`discover`] | Walks the docs directory, strips locale markers into logical keys |
//! | [`resolve`] | Three-tier fallback chain per `(locale, key)` |
//! | [`paths`] | Output paths, URLs, and the whole-site build plan |
//! | [`nav`] | Title-based navigation translation and derived navigation |
//! | [`dedup`] | Flags fallback copies so the search index lists content once |
//! | [`alternates`] | `hreflang` alternates, contextual switcher, sitemap |
//! | [`render`] | Markdown to HTML through Maud |
//! | [`assemble`] | Runs the pipeline and writes the site |
//! | [`types`] | Shared types handed to renderers (`NavNode`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## The Root Tree Is Always Built
//!
//! The output root always holds the default locale's site, even when the
//! default locale has `build = false`. `build` only controls whether a
//! locale gets its own `/<locale>/` tree. A site with `en` (default, not
//! building) and `fr` (building) therefore serves English at `/` and French
//! at `/fr/`, and no `/en/` directory exists.
//!
//! ## Navigation Translation Is a Dictionary
//!
//! Titles are translated by exact match on the authored title, anywhere in
//! the tree. There is no per-node addressing. See [`nav`].

pub mod alternates;
pub mod assemble;
pub mod config;
pub mod dedup;
pub mod discover;
pub mod locale;
pub mod nav;
pub mod output;
pub mod paths;
pub mod render;
pub mod resolve;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
