//! Link canonicalization for the mirrored Markdown mode.
//!
//! Relative links found in a page are rewritten to absolute `….html.md`
//! addresses so that a crawler reading a mirror keeps following mirrors
//! instead of falling back to the HTML pages.

use serde::Serialize;
use url::Url;

/// Suffix of a mirrored page relative to its HTML route.
pub const MIRROR_SUFFIX: &str = ".html.md";

/// How hrefs are stored in a [`crate::ParsedDocument`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum LinkMode {
    /// Hrefs are kept as written (only trimmed).
    #[default]
    Plain,
    /// Relative hrefs are rewritten with [`canonicalize`] against `root_origin`.
    Mirror { root_origin: String },
}

impl LinkMode {
    /// Short tag handed to templates as the operating mode.
    pub fn tag(&self) -> &'static str {
        match self {
            LinkMode::Plain => "plain",
            LinkMode::Mirror { .. } => "mirror",
        }
    }

    /// Applies this mode to an already trimmed href.
    pub fn apply(&self, href: &str) -> String {
        match self {
            LinkMode::Plain => href.to_string(),
            LinkMode::Mirror { root_origin } => canonicalize(href, root_origin),
        }
    }
}

/// Whether `href` already carries a scheme (`https:`, `mailto:`, ...).
pub fn is_absolute(href: &str) -> bool {
    Url::parse(href).is_ok()
}

/// Rewrites a relative href into the absolute address of its Markdown mirror.
///
/// Absolute hrefs are returned unchanged. Relative ones are resolved against
/// `root_origin`, get `.html` appended unless the path already ends with it,
/// then `.md`.
///
/// # Example
///
/// ```rust
/// use mdmirror_core::canonicalize;
///
/// assert_eq!(canonicalize("about", "https://example.com"), "https://example.com/about.html.md");
/// assert_eq!(canonicalize("https://other.com/x", "https://example.com"), "https://other.com/x");
/// ```
pub fn canonicalize(href: &str, root_origin: &str) -> String {
    if is_absolute(href) {
        return href.to_string();
    }

    let mut resolved = match Url::parse(root_origin).and_then(|root| root.join(href)) {
        Ok(url) => url,
        Err(e) => {
            tracing::debug!(href, root_origin, error = %e, "leaving link unresolved");
            return href.to_string();
        }
    };

    let path = mirror_path(resolved.path());
    resolved.set_path(&path);
    resolved.to_string()
}

/// Maps an HTML route path to its mirror path.
///
/// `/about` becomes `/about.html.md` and `/about.html` becomes `/about.html.md`.
/// A directory path gets the suffix as is: `/docs/` becomes `/docs/.html.md`.
pub fn mirror_path(path: &str) -> String {
    let mut out = path.to_string();
    if !out.ends_with(".html") {
        out.push_str(".html");
    }
    out.push_str(".md");
    out
}
