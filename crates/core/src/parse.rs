//! HTML parsing and DOM querying.
//!
//! This module provides the [`Document`] and [`Element`] types used by the
//! extractor and the crawler. Parsing is tolerant: any string, including
//! malformed or empty markup, produces a document.
//!
//! # Example
//!
//! ```rust
//! use mdmirror_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1>Title</h1>
//!             <p class="content">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html);
//! assert_eq!(doc.first_text("h1"), Some("Title".to_string()));
//! ```

use scraper::{Html, Selector};

use crate::{MirrorError, Result};

/// Represents a parsed HTML document.
///
/// A Document wraps an HTML page and provides methods for querying elements
/// using CSS selectors.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses HTML from a string.
    ///
    /// The underlying html5ever parser recovers from any markup error, so
    /// this never fails.
    pub fn parse(html: &str) -> Self {
        Self { html: Html::parse_document(html) }
    }

    /// Gets the raw HTML representation.
    pub fn html(&self) -> &Html {
        &self.html
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Config`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mdmirror_core::parse::Document;
    ///
    /// let html = r#"<p class="content">First</p><p class="content">Second</p>"#;
    /// let doc = Document::parse(html);
    /// let elements = doc.select("p.content").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = Selector::parse(selector).map_err(|e| MirrorError::Config(format!("Invalid selector: {}", e)))?;

        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Gets the raw text of the `<title>` element, if present.
    pub fn title(&self) -> Option<String> {
        self.first_text("title")
    }

    /// Text of the first element matching `selector`, untrimmed.
    pub fn first_text(&self, selector: &str) -> Option<String> {
        let sel = Selector::parse(selector).ok()?;
        self.html.select(&sel).next().map(|el| el.text().collect::<String>())
    }

    /// Text of every element matching `selector`, in document order.
    pub fn texts(&self, selector: &str) -> Vec<String> {
        self.select(selector)
            .map(|elements| elements.iter().map(Element::text).collect())
            .unwrap_or_default()
    }

    /// Every anchor carrying an `href` attribute, as raw `(href, text)` pairs.
    pub fn anchors(&self) -> Vec<(String, String)> {
        self.select("a[href]")
            .map(|elements| {
                elements
                    .iter()
                    .filter_map(|a| a.attr("href").map(|href| (href.to_string(), a.text())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Gets all text content from the document.
    pub fn text_content(&self) -> String {
        self.html.root_element().text().collect()
    }
}

/// A wrapper around scraper's ElementRef.
///
/// # Example
///
/// ```rust
/// use mdmirror_core::parse::Document;
///
/// let html = r#"<a href="https://example.com">Link text</a>"#;
/// let doc = Document::parse(html);
/// let link = &doc.select("a").unwrap()[0];
///
/// assert_eq!(link.text(), "Link text");
/// assert_eq!(link.attr("href"), Some("https://example.com"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: scraper::ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the text content of this element.
    ///
    /// Returns the concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the value of an attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }

    /// Gets the lowercase tag name of this element.
    pub fn tag_name(&self) -> String {
        self.element.value().name().to_lowercase()
    }
}
