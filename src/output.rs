//! CLI output formatting for all commands.
//!
//! # Information-First Display
//!
//! Output is organized by **logical document**, not by file. A document is
//! shown once under its locale-free key, with the files backing it listed
//! as indented context. Plans are shown per output tree so the reader can
//! see at a glance which tier filled each page.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Documents
//! 001 guide/start.md
//!     en: guide/start.md
//!     fr: guide/start.fr.md
//!
//! Assets
//! 001 assets/logo.png
//!     none: assets/logo.png
//!
//! Discovered 1 document, 1 asset (3 files, suffix layout)
//! ```
//!
//! ## Check
//!
//! ```text
//! / (en)
//!     guide/start.md → guide/start.html [exact]
//! /fr/ (fr)
//!     guide/start.md → fr/guide/start.html [exact] ← guide/start.fr.md
//!     assets/logo.png → fr/assets/logo.png [agnostic]
//!
//! Planned 4 files in 2 trees
//! ```
//!
//! ## Build
//!
//! ```text
//! / (en) Documentation: 1 document, 1 asset
//! /fr/ (fr) Documentation: 1 document, 1 asset, 2 nav titles translated
//! Search index: 2 pages
//! Sitemap: site/sitemap.xml
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::assemble::BuildReport;
use crate::discover::{DiscoveryIndex, SourceFile};
use crate::paths::BuildPlan;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 document`, `2 documents`.
fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

fn variant_line(file: &SourceFile) -> String {
    format!("{}{}: {}", indent(1), file.locale_label(), file.src_path)
}

// ============================================================================
// Scan
// ============================================================================

pub fn format_scan_output(index: &DiscoveryIndex) -> Vec<String> {
    let mut lines = Vec::new();

    for (heading, documents) in [("Documents", true), ("Assets", false)] {
        let keys: Vec<_> = index
            .keys()
            .filter(|k| k.is_document() == documents)
            .collect();
        if keys.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(heading.to_string());
        for (pos, key) in keys.into_iter().enumerate() {
            lines.push(format!("{} {}", format_index(pos + 1), key));
            lines.extend(index.variants(key.as_str()).iter().map(variant_line));
        }
    }

    let documents = index.keys().filter(|k| k.is_document()).count();
    let assets = index.document_count() - documents;
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!(
        "Discovered {}, {} ({}, {} layout)",
        plural(documents, "document"),
        plural(assets, "asset"),
        plural(index.file_count(), "file"),
        index.structure()
    ));
    lines
}

pub fn print_scan_output(index: &DiscoveryIndex) {
    for line in format_scan_output(index) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// One block per output tree. The source path is shown only when it differs
/// from the key, i.e. when a locale marker or locale folder was stripped.
pub fn format_plan_output(plan: &BuildPlan<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    for tree in plan.trees() {
        lines.push(format!("{} ({})", tree.tree, tree.locale));
        for entry in &tree.entries {
            let source = &entry.resolution.source.src_path;
            let mut line = format!(
                "{}{} → {} [{}]",
                indent(1),
                entry.key,
                entry.output_path,
                entry.resolution.tier
            );
            if source != entry.key.as_str() {
                line.push_str(&format!(" ← {source}"));
            }
            lines.push(line);
        }
    }
    lines.push(String::new());
    lines.push(format!(
        "Planned {} in {}",
        plural(plan.len(), "file"),
        plural(plan.trees().len(), "tree")
    ));
    lines
}

pub fn print_plan_output(plan: &BuildPlan<'_>) {
    for line in format_plan_output(plan) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .trees
        .iter()
        .map(|tree| {
            let mut line = format!(
                "{} ({}) {}: {}, {}",
                tree.tree,
                tree.locale,
                tree.site_name,
                plural(tree.documents, "document"),
                plural(tree.assets, "asset")
            );
            if tree.nav_translated > 0 {
                line.push_str(&format!(
                    ", {} translated",
                    plural(tree.nav_translated, "nav title")
                ));
            }
            line
        })
        .collect();
    lines.push(format!(
        "Search index: {}",
        plural(report.search_entries, "page")
    ));
    if let Some(sitemap) = &report.sitemap {
        lines.push(format!("Sitemap: {}", sitemap.display()));
    }
    lines
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::TreeReport;
    use crate::config::DocsStructure;
    use crate::discover::discover;
    use crate::paths::{OutputTree, PathMapper};
    use crate::resolve::Resolver;
    use crate::test_helpers::{registry, write_tree};
    use std::path::PathBuf;

    // =========================================================================
    // Helpers
    // =========================================================================

    #[test]
    fn format_index_pads_to_three_digits() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn plural_forms() {
        assert_eq!(plural(0, "file"), "0 files");
        assert_eq!(plural(1, "file"), "1 file");
        assert_eq!(plural(2, "nav title"), "2 nav titles");
    }

    // =========================================================================
    // Scan
    // =========================================================================

    #[test]
    fn scan_groups_variants_under_key() {
        let tmp = write_tree(&[
            ("guide/start.md", "# Start"),
            ("guide/start.fr.md", "# Début"),
            ("assets/logo.png", "png"),
        ]);
        let registry = registry("en", &[("en", true), ("fr", true)]);
        let index = discover(tmp.path(), DocsStructure::Suffix, &registry).unwrap();

        let lines = format_scan_output(&index);
        assert_eq!(
            lines,
            vec![
                "Documents",
                "001 guide/start.md",
                "    none: guide/start.md",
                "    fr: guide/start.fr.md",
                "",
                "Assets",
                "001 assets/logo.png",
                "    none: assets/logo.png",
                "",
                "Discovered 1 document, 1 asset (3 files, suffix layout)",
            ]
        );
    }

    #[test]
    fn scan_of_empty_index() {
        let index = DiscoveryIndex::new(DocsStructure::Folder);
        assert_eq!(
            format_scan_output(&index),
            vec!["Discovered 0 documents, 0 assets (0 files, folder layout)"]
        );
    }

    // =========================================================================
    // Check
    // =========================================================================

    #[test]
    fn plan_shows_tier_and_stripped_source() {
        let tmp = write_tree(&[("index.md", "# Home"), ("index.fr.md", "# Accueil")]);
        let registry = registry("en", &[("en", false), ("fr", true)]);
        let index = discover(tmp.path(), DocsStructure::Suffix, &registry).unwrap();
        let resolver = Resolver::new(&index, &registry, true);
        let plan = BuildPlan::new(&resolver, PathMapper::new(false)).unwrap();

        let lines = format_plan_output(&plan);
        assert_eq!(
            lines,
            vec![
                "/ (en)",
                "    index.md → index.html [agnostic]",
                "/fr/ (fr)",
                "    index.md → fr/index.html [exact] ← index.fr.md",
                "",
                "Planned 2 files in 2 trees",
            ]
        );
    }

    // =========================================================================
    // Build
    // =========================================================================

    #[test]
    fn build_summary_lines() {
        let report = BuildReport {
            trees: vec![
                TreeReport {
                    tree: OutputTree::Root,
                    locale: "en".into(),
                    site_name: "Docs".into(),
                    documents: 1,
                    assets: 2,
                    nav_translated: 0,
                },
                TreeReport {
                    tree: OutputTree::Locale("fr".into()),
                    locale: "fr".into(),
                    site_name: "Docs FR".into(),
                    documents: 3,
                    assets: 0,
                    nav_translated: 1,
                },
            ],
            search_entries: 4,
            sitemap: Some(PathBuf::from("site/sitemap.xml")),
        };

        assert_eq!(
            format_build_output(&report),
            vec![
                "/ (en) Docs: 1 document, 2 assets",
                "/fr/ (fr) Docs FR: 3 documents, 0 assets, 1 nav title translated",
                "Search index: 4 pages",
                "Sitemap: site/sitemap.xml",
            ]
        );
    }
}
