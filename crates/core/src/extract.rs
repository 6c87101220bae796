//! Structured content extraction.
//!
//! Walks a parsed page and builds the [`ParsedDocument`] consumed by
//! templates. Extraction is a pure function over the HTML string and never
//! fails; missing elements turn into empty values.

use std::collections::HashSet;

use crate::canonical::LinkMode;
use crate::document::{LinkEntry, Metadata, ParsedDocument};
use crate::parse::Document;

/// Anchors whose trimmed text is shorter than this are dropped.
pub const MIN_LINK_TEXT_CHARS: usize = 3;

/// Configuration for content extraction
#[derive(Debug, Clone, Default)]
pub struct ExtractConfig {
    /// How accepted hrefs are stored
    pub links: LinkMode,
    /// Keep at most this many links (after filtering)
    pub max_links: Option<usize>,
}

impl ExtractConfig {
    /// Extraction that rewrites relative links to mirror addresses under `root_origin`.
    pub fn mirror(root_origin: impl Into<String>) -> Self {
        Self { links: LinkMode::Mirror { root_origin: root_origin.into() }, ..Default::default() }
    }
}

/// Extracts a [`ParsedDocument`] with hrefs left as written.
///
/// # Example
///
/// ```rust
/// use mdmirror_core::{Metadata, extract};
///
/// let doc = extract("<title> Home </title><h1>Welcome</h1><a href='/about'>About us</a>", Metadata::new());
/// assert_eq!(doc.title, "Home");
/// assert_eq!(doc.links[0].href, "/about");
/// ```
pub fn extract(html: &str, metadata: Metadata) -> ParsedDocument {
    extract_with_config(html, metadata, &ExtractConfig::default())
}

/// Extracts a [`ParsedDocument`] using the given configuration.
pub fn extract_with_config(html: &str, metadata: Metadata, config: &ExtractConfig) -> ParsedDocument {
    let doc = Document::parse(html);

    ParsedDocument {
        title: clean(doc.title()),
        h1: primary_heading(&doc),
        headings: doc.texts("h2, h3").into_iter().map(|t| t.trim().to_string()).collect(),
        paragraphs: doc
            .texts("p")
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect(),
        links: collect_links(&doc, config),
        metadata,
    }
}

/// Trimmed text of the first `<h1>`, empty when there is none.
pub fn primary_heading(doc: &Document) -> String {
    clean(doc.first_text("h1"))
}

fn clean(text: Option<String>) -> String {
    text.map(|t| t.trim().to_string()).unwrap_or_default()
}

fn collect_links(doc: &Document, config: &ExtractConfig) -> Vec<LinkEntry> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for (raw_href, raw_text) in doc.anchors() {
        if config.max_links.is_some_and(|max| links.len() >= max) {
            break;
        }

        let href = raw_href.trim();
        if href.is_empty() || href.starts_with('#') {
            continue;
        }

        let text = raw_text.trim();
        if text.chars().count() < MIN_LINK_TEXT_CHARS {
            continue;
        }

        // dedup on the href as written, before any rewrite
        if !seen.insert(href.to_string()) {
            continue;
        }

        links.push(LinkEntry::new(text, config.links.apply(href)));
    }

    links
}
