//! One-hop site discovery.
//!
//! Starting from a root page, the crawler collects every directly linked page
//! that stays in scope and labels each one with its primary heading. It does
//! not follow links found on the discovered pages.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;
use url::Url;

use crate::extract::primary_heading;
use crate::fetch::{FetchConfig, FileFetcher, HttpFetcher, PageFetcher};
use crate::parse::Document;
use crate::{MirrorError, Result};

/// Label used for pages that fetched fine but have no `<h1>`.
pub const UNTITLED: &str = "Untitled";

/// File suffixes treated as pages by [`LocalScope`].
pub const PAGE_SUFFIXES: &[&str] = &["html", "htm"];

/// Discovered page address mapped to its label.
///
/// Iteration order is unspecified; use [`CrawlResult::sorted`] when a stable
/// order matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CrawlResult {
    pages: HashMap<String, String>,
}

impl CrawlResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, address: impl Into<String>, label: impl Into<String>) {
        self.pages.insert(address.into(), label.into());
    }

    pub fn get(&self, address: &str) -> Option<&str> {
        self.pages.get(address).map(String::as_str)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.pages.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pages.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `(address, label)` pairs ordered by address.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut pages: Vec<_> = self.iter().collect();
        pages.sort_unstable();
        pages
    }
}

/// Decides which links of the root page belong to the crawl.
pub trait CrawlScope {
    /// Address of the root page, in the same form as resolved links.
    fn root(&self) -> &str;

    /// Resolves `href` to a page address, or `None` when it is out of scope.
    fn resolve(&self, href: &str) -> Option<String>;
}

/// Sibling pages on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalScope {
    root: String,
    base_dir: PathBuf,
}

impl LocalScope {
    /// Anchors the scope at `root_file`.
    ///
    /// The root does not have to exist; a missing root simply yields an
    /// empty crawl.
    pub fn new(root_file: impl AsRef<Path>) -> Result<Self> {
        let given = root_file.as_ref();
        let root_file = match given.canonicalize() {
            Ok(path) => path,
            Err(_) => std::path::absolute(given)?,
        };
        let base_dir = root_file.parent().map(Path::to_path_buf).unwrap_or_default();

        Ok(Self { root: root_file.to_string_lossy().into_owned(), base_dir })
    }
}

impl CrawlScope for LocalScope {
    fn root(&self) -> &str {
        &self.root
    }

    fn resolve(&self, href: &str) -> Option<String> {
        let href = href.trim();
        let target = self.base_dir.join(href).canonicalize().ok()?;

        let is_page = target
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| PAGE_SUFFIXES.contains(&ext.to_ascii_lowercase().as_str()));

        (is_page && target.is_file()).then(|| target.to_string_lossy().into_owned())
    }
}

/// Same-origin pages of a website.
#[derive(Debug, Clone)]
pub struct RemoteScope {
    root: String,
    root_url: Url,
}

impl RemoteScope {
    pub fn new(root_url: &str) -> Result<Self> {
        let mut url = Url::parse(root_url.trim_end_matches('/'))
            .map_err(|e| MirrorError::InvalidUrl(format!("{root_url}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(MirrorError::InvalidUrl(format!("{root_url}: crawl root must be an http(s) URL")));
        }
        url.set_fragment(None);

        Ok(Self { root: url.to_string(), root_url: url })
    }

    fn same_origin(&self, url: &Url) -> bool {
        url.host_str() == self.root_url.host_str()
            && url.port_or_known_default() == self.root_url.port_or_known_default()
    }
}

impl CrawlScope for RemoteScope {
    fn root(&self) -> &str {
        &self.root
    }

    fn resolve(&self, href: &str) -> Option<String> {
        let mut url = self.root_url.join(href.trim()).ok()?;
        if !matches!(url.scheme(), "http" | "https") || !self.same_origin(&url) {
            return None;
        }
        url.set_fragment(None);
        Some(url.to_string())
    }
}

/// One-hop crawler over a fetcher and a scope.
pub struct SiteCrawler<F, S> {
    fetcher: F,
    scope: S,
}

impl SiteCrawler<FileFetcher, LocalScope> {
    /// Crawler over a local root file and its sibling pages.
    pub fn local(root_file: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(FileFetcher, LocalScope::new(root_file)?))
    }
}

impl SiteCrawler<HttpFetcher, RemoteScope> {
    /// Crawler over a website, staying on the root's host.
    pub fn remote(root_url: &str, config: &FetchConfig) -> Result<Self> {
        Ok(Self::new(HttpFetcher::new(config)?, RemoteScope::new(root_url)?))
    }
}

impl<F: PageFetcher, S: CrawlScope> SiteCrawler<F, S> {
    pub fn new(fetcher: F, scope: S) -> Self {
        Self { fetcher, scope }
    }

    /// Address of the crawl root.
    pub fn root(&self) -> &str {
        self.scope.root()
    }

    /// Fetches the root page and labels it plus every in-scope page it links to.
    ///
    /// An unavailable root yields an empty result without further fetches.
    pub async fn discover(&self) -> CrawlResult {
        self.discover_with_root().await.0
    }

    /// Same as [`discover`](Self::discover), also handing back the root HTML
    /// from the single root fetch (empty when the root is unavailable).
    pub async fn discover_with_root(&self) -> (CrawlResult, String) {
        let root = self.scope.root();
        let mut result = CrawlResult::new();

        let root_html = self.fetcher.fetch(root).await;
        if root_html.is_empty() {
            return (result, root_html);
        }

        let mut pages = HashSet::new();
        for (href, _) in Document::parse(&root_html).anchors() {
            match self.scope.resolve(&href) {
                Some(address) => {
                    tracing::debug!(%address, "subpage discovered");
                    pages.insert(address);
                }
                None => tracing::debug!(%href, "link out of scope"),
            }
        }
        pages.remove(root);

        result.insert(root, label_for(&root_html));
        for address in &pages {
            let html = self.fetcher.fetch(address).await;
            if html.is_empty() {
                continue;
            }
            result.insert(address.as_str(), label_for(&html));
        }

        tracing::info!(root, pages = result.len(), "crawl finished");
        (result, root_html)
    }

    /// Releases the fetcher's resources.
    pub fn close(self) {
        self.fetcher.close();
    }
}

fn label_for(html: &str) -> String {
    let heading = primary_heading(&Document::parse(html));
    if heading.is_empty() { UNTITLED.to_string() } else { heading }
}
