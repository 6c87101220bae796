//! Turn rendered HTML pages into structured Markdown for LLM crawlers.
//!
//! The pipeline is: [`SiteCrawler`] discovers pages, a [`PageFetcher`] loads
//! their HTML, [`extract()`] builds a [`ParsedDocument`], and a
//! [`TemplateRenderer`] turns it into Markdown. [`MirrorRegistry`] holds the
//! allow-list used by web integrations serving `.html.md` mirrors.

pub mod canonical;
pub mod crawl;
pub mod document;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod parse;
pub mod registry;
pub mod template;

pub use canonical::{LinkMode, MIRROR_SUFFIX, canonicalize, is_absolute, mirror_path};
pub use crawl::{CrawlResult, CrawlScope, LocalScope, RemoteScope, SiteCrawler, UNTITLED};
pub use document::{LinkEntry, Metadata, ParsedDocument};
pub use error::{MirrorError, Result};
pub use extract::{ExtractConfig, extract, extract_with_config};
pub use fetch::{FetchConfig, FileFetcher, HttpFetcher, PageFetcher, fetch_stdin};
pub use parse::Document;
pub use registry::{MirrorPolicy, MirrorRegistry};
pub use template::{MANIFEST_TEMPLATE, PAGE_TEMPLATE, TemplateRenderer};
