//! Page rendering.
//!
//! The assembler hands each document to a [`PageRenderer`] together with a
//! [`RenderContext`]: the tree's locale, its site name, its translated
//! navigation, and the page's language switcher. Renderers only produce
//! HTML; where the result is written is the plan's business.
//!
//! [`MarkdownRenderer`] is the stock implementation: `pulldown-cmark` for
//! the body, a [maud](https://maud.lambda.xyz/) shell around it.

use crate::alternates::Alternate;
use crate::locale::SwitcherEntry;
use crate::paths::OutputTree;
use crate::types::NavNode;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Event, Options, Parser, TagEnd, html as md_html};

/// Everything a renderer may use for one page.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'r> {
    pub tree: &'r OutputTree,
    /// Locale of the tree, used for `<html lang>`.
    pub locale: &'r str,
    pub site_name: &'r str,
    pub title: &'r str,
    /// Site-relative URL of the page being rendered.
    pub url: &'r str,
    /// URL of the tree's homepage.
    pub home_url: &'r str,
    pub nav: &'r [NavNode],
    pub switcher: &'r [SwitcherEntry],
    pub alternates: &'r [Alternate],
    /// Raw document source.
    pub source: &'r str,
}

/// Turns a document into a complete HTML page.
pub trait PageRenderer: Sync {
    fn render(&self, ctx: &RenderContext<'_>) -> String;
}

/// Markdown to HTML with a minimal navigable shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl PageRenderer for MarkdownRenderer {
    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let body = markdown_to_html(ctx.source);
        let page_title = if ctx.title == ctx.site_name {
            ctx.title.to_string()
        } else {
            format!("{} - {}", ctx.title, ctx.site_name)
        };

        let content = html! {
            header.site-header {
                a.site-name href=(site_href(ctx.home_url)) { (ctx.site_name) }
                @if !ctx.switcher.is_empty() {
                    (render_switcher(ctx.switcher, ctx.locale))
                }
            }
            nav.site-nav {
                (render_nav(ctx.nav, ctx.url))
            }
            main {
                article { (PreEscaped(body)) }
            }
        };

        base_document(&page_title, ctx.locale, ctx.alternates, content).into_string()
    }
}

const CSS: &str = "\
body{margin:0 auto;max-width:60rem;padding:1rem;font-family:system-ui,sans-serif;line-height:1.5}\
.site-header{display:flex;justify-content:space-between;align-items:baseline}\
.site-name{font-weight:bold;text-decoration:none}\
.lang-switcher ul,.site-nav ul{list-style:none;padding-left:1rem}\
.lang-switcher li{display:inline;margin-left:.5rem}\
.current>a,.lang-switcher .current{font-weight:bold}";

fn base_document(title: &str, lang: &str, alternates: &[Alternate], content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @for alt in alternates {
                    link rel="alternate" hreflang=(alt.lang) href=(alt.href);
                }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Navigation list; the entry for `current_url` is marked `current`.
pub fn render_nav(nodes: &[NavNode], current_url: &str) -> Markup {
    html! {
        ul {
            @for node in nodes {
                (render_nav_node(node, current_url))
            }
        }
    }
}

fn render_nav_node(node: &NavNode, current_url: &str) -> Markup {
    let is_current = node.url.as_deref() == Some(current_url);
    html! {
        li class=[is_current.then_some("current")] {
            @if let Some(url) = &node.url {
                @if node.is_external() {
                    a href=(url) target="_blank" rel="noopener" { (node.title) }
                } @else {
                    a href=(site_href(url)) { (node.title) }
                }
            } @else {
                span.nav-group { (node.title) }
            }
            @if !node.children.is_empty() {
                ul {
                    @for child in &node.children {
                        (render_nav_node(child, current_url))
                    }
                }
            }
        }
    }
}

fn render_switcher(entries: &[SwitcherEntry], current: &str) -> Markup {
    html! {
        nav.lang-switcher {
            ul {
                @for entry in entries {
                    @let href = entry.fixed_link.as_deref().unwrap_or(&entry.link);
                    li class=[(entry.lang == current).then_some("current")] {
                        a href=(href) hreflang=(entry.lang) lang=(entry.lang) { (entry.name) }
                    }
                }
            }
        }
    }
}

/// Site-relative URLs get a leading `/`; absolute URLs pass through.
fn site_href(url: &str) -> String {
    if url.starts_with('/') || url.contains("://") {
        url.to_string()
    } else {
        format!("/{url}")
    }
}

pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

/// Title from the first `# heading`, or `fallback`.
pub fn document_title(markdown: &str, fallback: &str) -> String {
    markdown
        .lines()
        .find(|line| line.starts_with("# "))
        .map(|line| line.trim_start_matches("# ").trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Plain text of a markdown document, for the search index.
pub fn plain_text(markdown: &str) -> String {
    let mut text = String::new();
    for event in Parser::new(markdown) {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(&t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item) => {
                if !text.ends_with(' ') && !text.is_empty() {
                    text.push(' ');
                }
            }
            _ => {}
        }
    }
    text.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn switcher() -> Vec<SwitcherEntry> {
        vec![
            SwitcherEntry {
                name: "English".into(),
                link: "/page.html".into(),
                fixed_link: None,
                lang: "en".into(),
            },
            SwitcherEntry {
                name: "Français".into(),
                link: "/fr/page.html".into(),
                fixed_link: Some("https://fr.example.com/".into()),
                lang: "fr".into(),
            },
        ]
    }

    fn render(source: &str, nav: &[NavNode], switcher: &[SwitcherEntry]) -> String {
        let tree = OutputTree::Locale("fr".into());
        let alternates = vec![
            Alternate { lang: "en".into(), href: "/page.html".into() },
            Alternate { lang: "fr".into(), href: "/fr/page.html".into() },
        ];
        let ctx = RenderContext {
            tree: &tree,
            locale: "fr",
            site_name: "Mon Site",
            title: "Page",
            url: "fr/page.html",
            home_url: "fr/index.html",
            nav,
            switcher,
            alternates: &alternates,
            source,
        };
        MarkdownRenderer.render(&ctx)
    }

    #[test]
    fn page_carries_lang_and_title() {
        let html = render("# Page\n\nBonjour", &[], &[]);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="fr">"#));
        assert!(html.contains("<title>Page - Mon Site</title>"));
        assert!(html.contains("<p>Bonjour</p>"));
        assert!(html.contains(r#"href="/fr/index.html""#));
    }

    #[test]
    fn alternates_become_link_tags() {
        let html = render("", &[], &[]);
        assert!(html.contains(r#"<link rel="alternate" hreflang="en" href="/page.html">"#));
    }

    #[test]
    fn nav_marks_current_and_external() {
        let nav = vec![
            NavNode::page("Accueil", "fr/index.html"),
            NavNode::section("Guide", vec![NavNode::page("Page", "fr/page.html")]),
            NavNode::page("GitHub", "https://github.com"),
        ];
        let html = render_nav(&nav, "fr/page.html").into_string();
        assert!(html.contains(r#"<li class="current"><a href="/fr/page.html">Page</a>"#));
        assert!(html.contains(r#"<span class="nav-group">Guide</span>"#));
        assert!(html.contains(r#"href="https://github.com" target="_blank""#));
    }

    #[test]
    fn switcher_prefers_fixed_link() {
        let html = render("", &[], &switcher());
        assert!(html.contains("lang-switcher"));
        assert!(html.contains(r#"href="/page.html""#));
        assert!(html.contains(r#"href="https://fr.example.com/""#));
        assert!(!html.contains(r#"href="/fr/page.html" hreflang"#));
    }

    #[test]
    fn no_switcher_when_empty() {
        let html = render("", &[], &[]);
        assert!(!html.contains("lang-switcher"));
    }

    #[test]
    fn title_from_first_heading() {
        assert_eq!(document_title("intro\n# Getting Started\n## Sub", "x"), "Getting Started");
        assert_eq!(document_title("no heading here", "fallback"), "fallback");
        assert_eq!(document_title("#not a heading", "fallback"), "fallback");
    }

    #[test]
    fn plain_text_strips_markup() {
        let text = plain_text("# Title\n\nSome *emphasis* and `code`.\n\n- one\n- two");
        assert_eq!(text, "Title Some emphasis and code. one two");
    }

    #[test]
    fn site_href_prefixes_relative_urls() {
        assert_eq!(site_href("fr/"), "/fr/");
        assert_eq!(site_href(""), "/");
        assert_eq!(site_href("/already"), "/already");
        assert_eq!(site_href("https://x.org/a"), "https://x.org/a");
    }
}
