//! Site assembly.
//!
//! Runs the whole pipeline for one docs directory:
//!
//! 1. Validate config and build the locale registry
//! 2. Discover source files
//! 3. Resolve and map every output tree into a [`BuildPlan`]
//! 4. Write every tree in parallel: render documents, copy assets
//! 5. Write the shared search index, and `sitemap.xml` when `site_url` is set
//!
//! Nothing is written until step 3 succeeds, so a conflicting source tree
//! leaves the output directory untouched.
//!
//! ## Output Structure
//!
//! ```text
//! site/
//! ├── index.html                 # root tree (default locale)
//! ├── assets/logo.png
//! ├── fr/                        # one dir per building non-root locale
//! │   ├── index.html
//! │   └── assets/logo.png
//! ├── search/search_index.json   # deduplicated across trees
//! └── sitemap.xml                # only with site_url
//! ```

use crate::alternates::AlternateEmitter;
use crate::config::{ConfigError, SiteConfig};
use crate::dedup::Deduplicator;
use crate::discover::{DiscoveryError, DiscoveryIndex, discover};
use crate::locale::LocaleRegistry;
use crate::nav::{PageRef, display_title, nav_from_pages, translate_for_locale};
use crate::paths::{BuildPlan, OutputEntry, OutputTree, PathMapper, TreePlan};
use crate::render::{MarkdownRenderer, PageRenderer, RenderContext, document_title, plain_text};
use crate::resolve::{ResolutionConflictError, Resolver};
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const SEARCH_INDEX_PATH: &str = "search/search_index.json";
pub const SITEMAP_PATH: &str = "sitemap.xml";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Conflict(#[from] ResolutionConflictError),
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// What one output tree received.
#[derive(Debug, Clone, Serialize)]
pub struct TreeReport {
    pub tree: OutputTree,
    pub locale: String,
    pub site_name: String,
    pub documents: usize,
    pub assets: usize,
    pub nav_translated: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub trees: Vec<TreeReport>,
    pub search_entries: usize,
    /// Written sitemap, if `site_url` is configured.
    pub sitemap: Option<PathBuf>,
}

/// One searchable page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchEntry {
    pub location: String,
    pub title: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
struct SearchIndex<'a> {
    config: SearchConfig,
    docs: &'a [SearchEntry],
}

#[derive(Debug, Serialize)]
struct SearchConfig {
    lang: Vec<String>,
}

/// A docs directory after discovery: config, locales, and source index.
#[derive(Debug)]
pub struct Site {
    pub config: SiteConfig,
    pub registry: LocaleRegistry,
    pub index: DiscoveryIndex,
}

impl Site {
    /// Validate config and discover every source file under `docs_dir`.
    pub fn load(docs_dir: &Path, config: SiteConfig) -> Result<Self, BuildError> {
        config.validate()?;
        let registry = LocaleRegistry::new(&config)?;
        let index = discover(docs_dir, config.docs_structure, &registry)?;
        Ok(Self {
            config,
            registry,
            index,
        })
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.index, &self.registry, self.config.fallback_to_default)
    }

    /// The complete output plan. Fails on any output path conflict.
    pub fn plan(&self) -> Result<BuildPlan<'_>, ResolutionConflictError> {
        BuildPlan::new(
            &self.resolver(),
            PathMapper::new(self.config.use_directory_urls),
        )
    }

    /// Plan the site and write it to `site_dir`.
    pub fn build(
        &self,
        site_dir: &Path,
        renderer: &dyn PageRenderer,
    ) -> Result<BuildReport, BuildError> {
        let plan = self.plan()?;
        let base_url = self.config.site_url.as_deref().unwrap_or("");
        let emitter = AlternateEmitter::new(&plan, &self.registry, base_url);
        let dedup = Deduplicator::new(self.resolver());

        let writer = TreeWriter {
            site: self,
            emitter,
            dedup: &dedup,
            renderer,
            site_dir,
        };
        let written = plan
            .trees()
            .par_iter()
            .map(|tree| writer.write(tree))
            .collect::<Result<Vec<_>, BuildError>>()?;

        let mut trees = Vec::with_capacity(written.len());
        let mut search = Vec::new();
        for (report, entries) in written {
            trees.push(report);
            search.extend(entries);
        }

        let mut lang: Vec<String> = Vec::new();
        for tree in &trees {
            if !lang.contains(&tree.locale) {
                lang.push(tree.locale.clone());
            }
        }
        let search_index = SearchIndex {
            config: SearchConfig { lang },
            docs: &search,
        };
        write_file(
            &site_dir.join(SEARCH_INDEX_PATH),
            serde_json::to_string_pretty(&search_index)?,
        )?;
        info!("Indexed {} pages for search", search.len());

        let sitemap = if self.config.site_url.is_some() {
            let path = site_dir.join(SITEMAP_PATH);
            write_file(&path, emitter.render_sitemap())?;
            info!("Wrote {}", path.display());
            Some(path)
        } else {
            None
        };

        Ok(BuildReport {
            trees,
            search_entries: search.len(),
            sitemap,
        })
    }
}

/// Build `docs_dir` into `site_dir` with the stock markdown renderer.
pub fn build(
    docs_dir: &Path,
    site_dir: &Path,
    config: SiteConfig,
) -> Result<BuildReport, BuildError> {
    Site::load(docs_dir, config)?.build(site_dir, &MarkdownRenderer)
}

struct TreeWriter<'w, 'a> {
    site: &'w Site,
    emitter: AlternateEmitter<'w, 'a>,
    dedup: &'w Deduplicator<'a>,
    renderer: &'w dyn PageRenderer,
    site_dir: &'w Path,
}

/// A document read from disk, ready to render.
struct LoadedPage<'e, 'a> {
    entry: &'e OutputEntry<'a>,
    title: String,
    source: String,
}

impl TreeWriter<'_, '_> {
    fn write(&self, tree: &TreePlan<'_>) -> Result<(TreeReport, Vec<SearchEntry>), BuildError> {
        let config = &self.site.config;
        let site_name = self.site.registry.site_name_for(&tree.locale);

        let pages = tree
            .documents()
            .map(|entry| {
                let path = &entry.resolution.source.abs_path;
                let source = fs::read_to_string(path).map_err(|source| BuildError::Read {
                    path: path.clone(),
                    source,
                })?;
                let title = document_title(&source, &fallback_title(entry));
                Ok(LoadedPage {
                    entry,
                    title,
                    source,
                })
            })
            .collect::<Result<Vec<_>, BuildError>>()?;

        let refs: Vec<PageRef<'_>> = pages
            .iter()
            .map(|p| PageRef {
                key: p.entry.key.as_str(),
                title: p.title.clone(),
                url: p.entry.url.clone(),
            })
            .collect();
        let nav = translate_for_locale(
            &nav_from_pages(&refs),
            &tree.locale,
            config.nav_translations_for(&tree.locale),
        );

        let home_url = match tree.homepage() {
            Some(home) => home.url.clone(),
            None => match tree.tree.prefix() {
                "" => String::new(),
                prefix => format!("{prefix}/"),
            },
        };

        let mut search = Vec::new();
        for page in &pages {
            let key = page.entry.key.as_str();
            let switcher = self.emitter.switcher_for(key, config.use_directory_urls);
            let alternates = self.emitter.alternates_for(key);
            let ctx = RenderContext {
                tree: &tree.tree,
                locale: &tree.locale,
                site_name,
                title: &page.title,
                url: &page.entry.url,
                home_url: &home_url,
                nav: &nav.nav,
                switcher: &switcher,
                alternates: &alternates,
                source: &page.source,
            };
            let html = self.renderer.render(&ctx);
            write_file(&self.site_dir.join(&page.entry.output_path), html)?;

            if self.is_searchable(tree, key) {
                search.push(SearchEntry {
                    location: page.entry.url.clone(),
                    title: page.title.clone(),
                    text: plain_text(&page.source),
                });
            }
        }

        let mut assets = 0;
        for entry in tree.entries.iter().filter(|e| !e.key.is_document()) {
            copy_file(
                &entry.resolution.source.abs_path,
                &self.site_dir.join(&entry.output_path),
            )?;
            assets += 1;
        }

        info!(
            "Built {} ({}): {} documents, {} assets",
            tree.tree,
            tree.locale,
            pages.len(),
            assets
        );
        let report = TreeReport {
            tree: tree.tree.clone(),
            locale: tree.locale.clone(),
            site_name: site_name.to_string(),
            documents: pages.len(),
            assets,
            nav_translated: nav.translated,
        };
        Ok((report, search))
    }

    /// The root tree is always indexed; dedicated trees only add pages
    /// whose content differs from the default locale's.
    fn is_searchable(&self, tree: &TreePlan<'_>, key: &str) -> bool {
        match &tree.tree {
            OutputTree::Root => true,
            OutputTree::Locale(code) => !self.dedup.is_duplicate_of_default(code, key),
        }
    }
}

/// Title from the file name when a document has no `# heading`.
fn fallback_title(entry: &OutputEntry<'_>) -> String {
    let name = entry.key.file_name();
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    display_title(stem)
}

fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<(), BuildError> {
    ensure_parent(path)?;
    fs::write(path, contents).map_err(|source| BuildError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn copy_file(from: &Path, to: &Path) -> Result<(), BuildError> {
    ensure_parent(to)?;
    fs::copy(from, to).map_err(|source| BuildError::Write {
        path: to.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), BuildError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| BuildError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
