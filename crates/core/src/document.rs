//! The structured form of a page handed to templates.
//!
//! [`ParsedDocument`] is what the extractor produces and what every template
//! receives. It is built fresh per extraction and never mutated afterwards.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{MirrorError, Result};

/// Caller-supplied context passed through extraction verbatim.
pub type Metadata = BTreeMap<String, String>;

/// One accepted anchor of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkEntry {
    /// Trimmed anchor text, at least three characters long.
    pub text: String,
    /// Trimmed href, rewritten when extracting in mirror mode.
    pub href: String,
}

impl LinkEntry {
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self { text: text.into(), href: href.into() }
    }
}

/// Canonical intermediate representation of an HTML page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedDocument {
    /// Trimmed `<title>` text, empty when missing.
    pub title: String,

    /// Trimmed text of the first `<h1>`, empty when missing.
    pub h1: String,

    /// Every `<h2>` and `<h3>` in document order.
    ///
    /// Unlike paragraphs, blank headings are kept.
    pub headings: Vec<String>,

    /// Non-empty `<p>` texts in document order.
    pub paragraphs: Vec<String>,

    /// Filtered, deduplicated links in document order.
    pub links: Vec<LinkEntry>,

    /// Extra context supplied by the caller.
    pub metadata: Metadata,
}

impl ParsedDocument {
    /// The primary heading of the page.
    pub fn primary_heading(&self) -> &str {
        &self.h1
    }

    /// Gets the document as structured JSON.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|e| MirrorError::Template(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let doc = ParsedDocument::default();
        assert_eq!(doc.title, "");
        assert_eq!(doc.primary_heading(), "");
        assert!(doc.links.is_empty());
    }

    #[test]
    fn test_to_json_keeps_field_names() {
        let mut metadata = Metadata::new();
        metadata.insert("source_url".to_string(), "https://example.com/".to_string());

        let doc = ParsedDocument {
            title: "Home".to_string(),
            h1: "Welcome".to_string(),
            links: vec![LinkEntry::new("About us", "/about")],
            metadata,
            ..Default::default()
        };

        let json = doc.to_json().unwrap();
        assert_eq!(json["title"], "Home");
        assert_eq!(json["h1"], "Welcome");
        assert_eq!(json["links"][0]["href"], "/about");
        assert_eq!(json["metadata"]["source_url"], "https://example.com/");
        assert!(json["headings"].as_array().unwrap().is_empty());
    }
}
