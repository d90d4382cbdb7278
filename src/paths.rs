//! Output path mapping and the build plan.
//!
//! Turns resolutions into concrete output paths. A build produces one
//! **root tree** plus one **locale tree** per building locale:
//!
//! ```text
//! site/
//! ├── index.html          # root tree: always built, default locale's chain
//! ├── guide/start.html
//! ├── fr/                 # locale tree: only when fr has build = true
//! │   ├── index.html
//! │   └── guide/start.html
//! └── en/                 # only when the default locale itself has build = true
//!     └── ...
//! ```
//!
//! Keys are already locale-free, so mapping only converts documents to
//! HTML names and adds the tree prefix. Assets keep their relative path in
//! every tree, untouched.
//!
//! ## Document Names
//!
//! | Key | `use_directory_urls = false` | `true` |
//! |-----|------------------------------|--------|
//! | `index.md` | `index.html` | `index.html` |
//! | `guide/page.md` | `guide/page.html` | `guide/page/index.html` |
//! | `guide/README.md` | `guide/index.html` | `guide/index.html` |
//!
//! The whole plan is computed before anything is written, and it refuses
//! to exist if two sources would write the same output path.

use crate::discover::DocKey;
use crate::locale::LocaleRegistry;
use crate::resolve::{Resolution, ResolutionConflictError, Resolver};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// One output subtree of the site.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTree {
    /// The unlocalized tree at the output root.
    Root,
    /// A dedicated `/<locale>/` tree.
    Locale(String),
}

impl OutputTree {
    /// Every tree a build produces: the root, then each building locale.
    pub fn all(registry: &LocaleRegistry) -> Vec<OutputTree> {
        std::iter::once(OutputTree::Root)
            .chain(registry.building().map(|l| OutputTree::Locale(l.code.clone())))
            .collect()
    }

    /// Locale whose fallback chain fills this tree.
    pub fn locale<'r>(&'r self, registry: &'r LocaleRegistry) -> &'r str {
        match self {
            OutputTree::Root => registry.default_code(),
            OutputTree::Locale(code) => code,
        }
    }

    /// Directory prefix inside the output directory, empty for the root.
    pub fn prefix(&self) -> &str {
        match self {
            OutputTree::Root => "",
            OutputTree::Locale(code) => code,
        }
    }
}

impl fmt::Display for OutputTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTree::Root => f.write_str("/"),
            OutputTree::Locale(code) => write!(f, "/{code}/"),
        }
    }
}

/// Converts logical keys into output paths and URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathMapper {
    pub use_directory_urls: bool,
}

impl PathMapper {
    pub fn new(use_directory_urls: bool) -> Self {
        Self { use_directory_urls }
    }

    /// Locale-free output path of a key, relative to its tree.
    pub fn relative_path(&self, key: &DocKey) -> String {
        if !key.is_document() {
            return key.as_str().to_string();
        }

        let (dir, file_name) = match key.as_str().rsplit_once('/') {
            Some((dir, name)) => (Some(dir), name),
            None => (None, key.as_str()),
        };
        let stem = file_name
            .rsplit_once('.')
            .map_or(file_name, |(stem, _)| stem);
        let stem = if stem == "README" { "index" } else { stem };

        let file = if stem == "index" || !self.use_directory_urls {
            format!("{stem}.html")
        } else {
            format!("{stem}/index.html")
        };
        match dir {
            Some(dir) => format!("{dir}/{file}"),
            None => file,
        }
    }

    /// Output path of a key inside a tree, relative to the output directory.
    pub fn map_output(&self, tree: &OutputTree, key: &DocKey) -> String {
        let relative = self.relative_path(key);
        match tree.prefix() {
            "" => relative,
            prefix => format!("{prefix}/{relative}"),
        }
    }

    /// Site-relative URL of an output path.
    ///
    /// With directory URLs, `a/index.html` is served as `a/`.
    pub fn url_for(&self, output_path: &str) -> String {
        if self.use_directory_urls {
            if output_path == "index.html" {
                return String::new();
            }
            if let Some(dir) = output_path.strip_suffix("/index.html") {
                return format!("{dir}/");
            }
        }
        output_path.to_string()
    }
}

/// A resolved document placed in one tree.
#[derive(Debug, Clone)]
pub struct OutputEntry<'a> {
    pub tree: OutputTree,
    pub key: &'a DocKey,
    /// Path relative to the output directory, `/`-separated.
    pub output_path: String,
    /// Site-relative URL (no leading `/`).
    pub url: String,
    pub resolution: Resolution<'a>,
}

/// Every entry of one output tree, in key order.
#[derive(Debug, Clone)]
pub struct TreePlan<'a> {
    pub tree: OutputTree,
    /// Locale whose chain filled the tree.
    pub locale: String,
    pub entries: Vec<OutputEntry<'a>>,
}

impl<'a> TreePlan<'a> {
    pub fn get(&self, key: &str) -> Option<&OutputEntry<'a>> {
        self.entries
            .binary_search_by(|e| e.key.as_str().cmp(key))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// The tree's `index.html`, if any.
    pub fn homepage(&self) -> Option<&OutputEntry<'a>> {
        let index = match self.tree.prefix() {
            "" => "index.html".to_string(),
            prefix => format!("{prefix}/index.html"),
        };
        self.entries.iter().find(|e| e.output_path == index)
    }

    pub fn documents(&self) -> impl Iterator<Item = &OutputEntry<'a>> {
        self.entries.iter().filter(|e| e.key.is_document())
    }
}

/// The complete `(tree, key) -> output path` mapping of a build.
#[derive(Debug, Clone)]
pub struct BuildPlan<'a> {
    mapper: PathMapper,
    trees: Vec<TreePlan<'a>>,
}

impl<'a> BuildPlan<'a> {
    /// Resolve and map every tree. Trees are planned in parallel.
    pub fn new(
        resolver: &Resolver<'a>,
        mapper: PathMapper,
    ) -> Result<Self, ResolutionConflictError> {
        let registry = resolver.registry();
        let trees = OutputTree::all(registry)
            .into_par_iter()
            .map(|tree| plan_tree(resolver, mapper, tree))
            .collect::<Result<Vec<_>, _>>()?;

        check_unique_paths(&trees)?;

        Ok(Self { mapper, trees })
    }

    pub fn mapper(&self) -> PathMapper {
        self.mapper
    }

    pub fn trees(&self) -> &[TreePlan<'a>] {
        &self.trees
    }

    pub fn tree(&self, tree: &OutputTree) -> Option<&TreePlan<'a>> {
        self.trees.iter().find(|t| t.tree == *tree)
    }

    pub fn root(&self) -> &TreePlan<'a> {
        // The root tree is always planned first.
        &self.trees[0]
    }

    pub fn entry(&self, tree: &OutputTree, key: &str) -> Option<&OutputEntry<'a>> {
        self.tree(tree)?.get(key)
    }

    /// All entries across all trees.
    pub fn entries(&self) -> impl Iterator<Item = &OutputEntry<'a>> {
        self.trees.iter().flat_map(|t| t.entries.iter())
    }

    /// Total number of output files.
    pub fn len(&self) -> usize {
        self.trees.iter().map(|t| t.entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn plan_tree<'a>(
    resolver: &Resolver<'a>,
    mapper: PathMapper,
    tree: OutputTree,
) -> Result<TreePlan<'a>, ResolutionConflictError> {
    let locale = tree.locale(resolver.registry()).to_string();
    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut entries = Vec::new();

    for (key, resolution) in resolver.resolve_all(&locale) {
        let output_path = mapper.map_output(&tree, key);
        if let Some(previous) = seen.insert(output_path.clone(), &resolution.source.src_path) {
            return Err(ResolutionConflictError::new(
                &locale,
                &output_path,
                previous,
                &resolution.source.src_path,
            ));
        }
        debug!(
            "{tree}: {output_path} <- {} ({})",
            resolution.source.src_path, resolution.tier
        );
        entries.push(OutputEntry {
            url: mapper.url_for(&output_path),
            tree: tree.clone(),
            key,
            output_path,
            resolution,
        });
    }

    let plan = TreePlan {
        tree,
        locale,
        entries,
    };
    info!(
        "Planned {} files for {} ({})",
        plan.entries.len(),
        plan.tree,
        plan.locale
    );
    if plan.documents().next().is_some() && plan.homepage().is_none() {
        warn!("Could not find a homepage for {} ({})", plan.tree, plan.locale);
    }
    Ok(plan)
}

/// Trees are disjoint by prefix, except when the root tree itself holds a
/// folder named after a building locale.
fn check_unique_paths(trees: &[TreePlan<'_>]) -> Result<(), ResolutionConflictError> {
    let mut owners: HashMap<&str, &OutputEntry<'_>> = HashMap::new();
    for entry in trees.iter().flat_map(|t| t.entries.iter()) {
        if let Some(previous) = owners.insert(&entry.output_path, entry) {
            return Err(ResolutionConflictError::new(
                entry.tree.prefix(),
                &entry.output_path,
                &previous.resolution.source.src_path,
                &entry.resolution.source.src_path,
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DocsStructure;
    use crate::discover::discover;
    use crate::resolve::Tier;
    use crate::test_helpers::{registry, write_tree};
    use std::collections::HashSet;

    fn key(s: &str) -> DocKey {
        DocKey::new(s)
    }

    #[test]
    fn document_paths_without_directory_urls() {
        let mapper = PathMapper::new(false);
        assert_eq!(mapper.relative_path(&key("index.md")), "index.html");
        assert_eq!(mapper.relative_path(&key("guide/page.md")), "guide/page.html");
        assert_eq!(mapper.relative_path(&key("guide/README.md")), "guide/index.html");
        assert_eq!(mapper.relative_path(&key("notes.markdown")), "notes.html");
    }

    #[test]
    fn document_paths_with_directory_urls() {
        let mapper = PathMapper::new(true);
        assert_eq!(mapper.relative_path(&key("index.md")), "index.html");
        assert_eq!(mapper.relative_path(&key("page.md")), "page/index.html");
        assert_eq!(mapper.relative_path(&key("a/b/page.md")), "a/b/page/index.html");
        assert_eq!(mapper.relative_path(&key("a/README.md")), "a/index.html");
    }

    #[test]
    fn assets_keep_their_path() {
        let mapper = PathMapper::new(true);
        assert_eq!(mapper.relative_path(&key("assets/logo.png")), "assets/logo.png");
        assert_eq!(
            mapper.map_output(&OutputTree::Locale("fr".into()), &key("assets/logo.png")),
            "fr/assets/logo.png"
        );
    }

    #[test]
    fn locale_tree_is_prefixed() {
        let mapper = PathMapper::new(false);
        assert_eq!(mapper.map_output(&OutputTree::Root, &key("page.md")), "page.html");
        assert_eq!(
            mapper.map_output(&OutputTree::Locale("fr".into()), &key("page.md")),
            "fr/page.html"
        );
    }

    #[test]
    fn urls_for_directory_urls() {
        let mapper = PathMapper::new(true);
        assert_eq!(mapper.url_for("index.html"), "");
        assert_eq!(mapper.url_for("fr/index.html"), "fr/");
        assert_eq!(mapper.url_for("fr/page/index.html"), "fr/page/");
        assert_eq!(mapper.url_for("logo.png"), "logo.png");

        let flat = PathMapper::new(false);
        assert_eq!(flat.url_for("fr/index.html"), "fr/index.html");
    }

    #[test]
    fn trees_include_root_even_when_default_not_building() {
        let registry = registry("en", &[("en", false), ("fr", true)]);
        assert_eq!(
            OutputTree::all(&registry),
            vec![OutputTree::Root, OutputTree::Locale("fr".into())]
        );
    }

    #[test]
    fn plan_maps_every_tree() {
        let tmp = write_tree(&[
            ("index.md", "# Home"),
            ("index.fr.md", "# Accueil"),
            ("guide.md", "# Guide"),
            ("logo.png", "png"),
        ]);
        let registry = registry("en", &[("en", true), ("fr", true)]);
        let index = discover(tmp.path(), DocsStructure::Suffix, &registry).unwrap();
        let resolver = Resolver::new(&index, &registry, true);
        let plan = BuildPlan::new(&resolver, PathMapper::new(false)).unwrap();

        assert_eq!(plan.trees().len(), 3);
        assert_eq!(plan.len(), 9);

        let fr_index = plan
            .entry(&OutputTree::Locale("fr".into()), "index.md")
            .unwrap();
        assert_eq!(fr_index.output_path, "fr/index.html");
        assert_eq!(fr_index.resolution.source.src_path, "index.fr.md");
        assert_eq!(fr_index.resolution.tier, Tier::ExactLocale);

        let root_index = plan.root().get("index.md").unwrap();
        assert_eq!(root_index.output_path, "index.html");
        assert_eq!(root_index.resolution.source.src_path, "index.md");

        let paths: HashSet<&str> = plan.entries().map(|e| e.output_path.as_str()).collect();
        assert_eq!(paths.len(), plan.len());
    }

    #[test]
    fn homepage_lookup() {
        let tmp = write_tree(&[("index.md", "# Home"), ("about.fr.md", "# A propos")]);
        let registry = registry("en", &[("en", true), ("fr", true)]);
        let index = discover(tmp.path(), DocsStructure::Suffix, &registry).unwrap();
        let resolver = Resolver::new(&index, &registry, false);
        let plan = BuildPlan::new(&resolver, PathMapper::new(false)).unwrap();

        assert_eq!(plan.root().homepage().unwrap().output_path, "index.html");
        let fr = plan.tree(&OutputTree::Locale("fr".into())).unwrap();
        assert!(fr.homepage().is_none());
    }

    #[test]
    fn readme_and_index_collide() {
        let tmp = write_tree(&[("README.md", "# Readme"), ("index.md", "# Index")]);
        let registry = registry("en", &[("en", true)]);
        let index = discover(tmp.path(), DocsStructure::Suffix, &registry).unwrap();
        let resolver = Resolver::new(&index, &registry, true);

        let err = BuildPlan::new(&resolver, PathMapper::new(false)).unwrap_err();
        assert_eq!(err.key, "index.html");
        let sources: HashSet<&str> = [err.first.as_str(), err.second.as_str()].into();
        assert_eq!(sources, HashSet::from(["README.md", "index.md"]));
    }

    #[test]
    fn root_folder_named_like_locale_collides_with_locale_tree() {
        let tmp = write_tree(&[("fr/page.md", "# Shadow"), ("page.fr.md", "# Page")]);
        let registry = registry("en", &[("en", true), ("fr", true)]);
        let index = discover(tmp.path(), DocsStructure::Suffix, &registry).unwrap();
        let resolver = Resolver::new(&index, &registry, true);

        let err = BuildPlan::new(&resolver, PathMapper::new(false)).unwrap_err();
        assert_eq!(err.key, "fr/page.html");
    }
}
