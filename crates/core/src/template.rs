//! Rendering parsed pages into Markdown through named templates.
//!
//! Templates use Jinja syntax (via `minijinja`) and receive the fields of a
//! [`ParsedDocument`] as variables: `title`, `h1`, `headings`, `paragraphs`,
//! `links`, `metadata`, plus `engine` and whatever extras the caller adds
//! (`mode` for page renders, `pages` for crawl manifests, `allowed_paths` for
//! the server manifest).
//!
//! Lookup order for a template name:
//! 1. the explicit template directory, when it holds that name;
//! 2. `<config dir>/mdmirror/templates`, when it holds that name;
//! 3. the templates built into this crate (`html_to_md.jinja`, `llms.txt.jinja`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use minijinja::{AutoEscape, Environment, Value, path_loader};
use serde::Serialize;

use crate::canonical::mirror_path;
use crate::crawl::CrawlResult;
use crate::document::{Metadata, ParsedDocument};
use crate::extract::{ExtractConfig, extract_with_config};
use crate::{MirrorError, Result};

/// Built-in template for a single page mirror.
pub const PAGE_TEMPLATE: &str = "html_to_md.jinja";

/// Built-in template for the site manifest.
pub const MANIFEST_TEMPLATE: &str = "llms.txt.jinja";

/// Value of the `engine` template variable.
pub const ENGINE: &str = "minijinja";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (PAGE_TEMPLATE, include_str!("../templates/html_to_md.jinja")),
    (MANIFEST_TEMPLATE, include_str!("../templates/llms.txt.jinja")),
];

/// A compiled template environment bound to one template name.
#[derive(Debug)]
pub struct TemplateRenderer {
    env: Environment<'static>,
    name: String,
}

#[derive(Serialize)]
struct PageRef<'a> {
    address: &'a str,
    label: &'a str,
}

impl TemplateRenderer {
    /// Loads `template_name`, failing fast when it is empty or cannot be compiled.
    pub fn new(template_dir: Option<&Path>, template_name: &str) -> Result<Self> {
        if template_name.trim().is_empty() {
            return Err(MirrorError::Config("template_name is required".to_string()));
        }

        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_filter("mirror_path", |path: String| mirror_path(&path));

        match search_dir(template_dir, template_name) {
            Some(dir) => {
                tracing::debug!(dir = %dir.display(), template = template_name, "loading template from disk");
                env.set_loader(path_loader(dir));
            }
            None => {
                for &(name, source) in BUILTIN_TEMPLATES {
                    env.add_template(name, source)?;
                }
            }
        }

        env.get_template(template_name)?;

        Ok(Self { env, name: template_name.to_string() })
    }

    /// The built-in page template.
    pub fn page() -> Result<Self> {
        Self::new(None, PAGE_TEMPLATE)
    }

    /// The built-in manifest template.
    pub fn manifest() -> Result<Self> {
        Self::new(None, MANIFEST_TEMPLATE)
    }

    /// Name of the bound template.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renders `doc` with the base variables only.
    pub fn render(&self, doc: &ParsedDocument) -> Result<String> {
        self.render_with(doc, BTreeMap::new())
    }

    /// Renders `doc`; `extra` variables are added last and win over the base ones.
    pub fn render_with(&self, doc: &ParsedDocument, extra: BTreeMap<String, Value>) -> Result<String> {
        let mut ctx: BTreeMap<String, Value> = BTreeMap::new();
        ctx.insert("title".to_string(), Value::from(doc.title.clone()));
        ctx.insert("h1".to_string(), Value::from(doc.h1.clone()));
        ctx.insert("headings".to_string(), Value::from_serialize(&doc.headings));
        ctx.insert("paragraphs".to_string(), Value::from_serialize(&doc.paragraphs));
        ctx.insert("links".to_string(), Value::from_serialize(&doc.links));
        ctx.insert("metadata".to_string(), Value::from_serialize(&doc.metadata));
        ctx.insert("engine".to_string(), Value::from(ENGINE.to_string()));
        ctx.extend(extra);

        let template = self.env.get_template(&self.name)?;
        Ok(template.render(ctx)?)
    }

    /// Extracts `html` and renders it, tagging the render with the link mode.
    pub fn render_html(&self, html: &str, metadata: Metadata, config: &ExtractConfig) -> Result<String> {
        self.render_html_with(html, metadata, config, BTreeMap::new())
    }

    /// Like [`render_html`](Self::render_html), with caller-supplied extras.
    pub fn render_html_with(
        &self, html: &str, metadata: Metadata, config: &ExtractConfig, mut extra: BTreeMap<String, Value>,
    ) -> Result<String> {
        let doc = extract_with_config(html, metadata, config);
        extra
            .entry("mode".to_string())
            .or_insert_with(|| Value::from(config.links.tag().to_string()));
        self.render_with(&doc, extra)
    }

    /// Renders a crawl manifest: the root page's document plus every discovered page.
    pub fn render_manifest(&self, root: &ParsedDocument, pages: &CrawlResult) -> Result<String> {
        let pages: Vec<PageRef<'_>> =
            pages.sorted().into_iter().map(|(address, label)| PageRef { address, label }).collect();

        let mut extra = BTreeMap::new();
        extra.insert("pages".to_string(), Value::from_serialize(&pages));
        self.render_with(root, extra)
    }
}

fn search_dir(explicit: Option<&Path>, name: &str) -> Option<PathBuf> {
    let user_dir = dirs::config_dir().map(|dir| dir.join("mdmirror").join("templates"));
    explicit
        .map(Path::to_path_buf)
        .into_iter()
        .chain(user_dir)
        .find(|dir| dir.join(name).is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use tempfile::TempDir;

    const TEST_TEMPLATE: &str = "# {{ title }}\n\
        {{ h1 }}\n\
        {% for h in headings %}## {{ h }}\n{% endfor %}\
        {% for p in paragraphs %}{{ p }}\n{% endfor %}\
        {% for l in links %}- [{{ l.text }}]({{ l.href }})\n{% endfor %}\
        -- {{ metadata.source }} | {{ metadata.lang }}\n";

    const SAMPLE_HTML: &str = r##"
        <html>
          <head><title> Sample Title </title></head>
          <body>
            <h1> Welcome Home </h1>
            <h2>Intro</h2>
            <h3>Background</h3>
            <p> First paragraph. </p>
            <p>   </p>
            <p> Second paragraph here. </p>
            <a href="#anchor">Anchor (ignored)</a>
            <a href="/about">About us</a>
            <a href="/c">c</a>
            <a href="/contact"> Contact </a>
          </body>
        </html>
    "##;

    fn template_dir(name: &str, source: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(name), source).unwrap();
        dir
    }

    fn metadata() -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), "unit-test".to_string());
        metadata.insert("lang".to_string(), "en".to_string());
        metadata
    }

    #[test]
    fn test_render_with_custom_template() {
        let dir = template_dir("custom_template.jinja", TEST_TEMPLATE);
        let renderer = TemplateRenderer::new(Some(dir.path()), "custom_template.jinja").unwrap();

        let out = renderer.render(&extract(SAMPLE_HTML, metadata())).unwrap();

        assert!(out.contains("# Sample Title"));
        assert!(out.contains("Welcome Home"));
        assert!(out.contains("## Intro"));
        assert!(out.contains("## Background"));
        assert!(out.contains("First paragraph."));
        assert!(out.contains("Second paragraph here."));
        assert!(out.contains("- [About us](/about)"));
        assert!(out.contains("- [Contact](/contact)"));
        assert!(!out.contains("#anchor"));
        assert!(!out.contains("](/c)"));
        assert!(out.contains("-- unit-test | en"));
    }

    #[test]
    fn test_render_handles_minimal_html() {
        let dir = template_dir("page.jinja", TEST_TEMPLATE);
        let renderer = TemplateRenderer::new(Some(dir.path()), "page.jinja").unwrap();

        let out = renderer.render_html("<html><head></head><body></body></html>", metadata(), &ExtractConfig::default());

        let out = out.unwrap();
        assert!(out.contains("# "));
        assert!(out.contains("-- unit-test | en"));
        assert!(!out.contains("]("));
    }

    #[test]
    fn test_mode_and_engine_variables() {
        let dir = template_dir("mode.jinja", "{{ engine }}:{{ mode }}");
        let renderer = TemplateRenderer::new(Some(dir.path()), "mode.jinja").unwrap();

        let plain = renderer.render_html("", Metadata::new(), &ExtractConfig::default()).unwrap();
        let mirror = renderer.render_html("", Metadata::new(), &ExtractConfig::mirror("https://example.com")).unwrap();

        assert_eq!(plain, "minijinja:plain");
        assert_eq!(mirror, "minijinja:mirror");
    }

    #[test]
    fn test_empty_template_name_is_config_error() {
        assert!(matches!(TemplateRenderer::new(None, ""), Err(MirrorError::Config(_))));
    }

    #[test]
    fn test_missing_template_fails_fast() {
        let dir = TempDir::new().unwrap();
        let result = TemplateRenderer::new(Some(dir.path()), "absent.jinja");
        assert!(matches!(result, Err(MirrorError::Template(_))));
    }

    #[test]
    fn test_template_dir_without_name_uses_builtin() {
        let dir = template_dir("page.jinja", TEST_TEMPLATE);
        let renderer = TemplateRenderer::new(Some(dir.path()), MANIFEST_TEMPLATE).unwrap();
        assert_eq!(renderer.name(), MANIFEST_TEMPLATE);
    }

    #[test]
    fn test_extras_win_over_mode() {
        let dir = template_dir("m.jinja", "{{ mode }}");
        let renderer = TemplateRenderer::new(Some(dir.path()), "m.jinja").unwrap();
        let mut extra = BTreeMap::new();
        extra.insert("mode".to_string(), Value::from("server"));

        let out = renderer.render_html_with("", Metadata::new(), &ExtractConfig::default(), extra);
        assert_eq!(out.unwrap(), "server");
    }

    #[test]
    fn test_builtin_page_template() {
        let renderer = TemplateRenderer::page().unwrap();
        let out = renderer.render(&extract(SAMPLE_HTML, Metadata::new())).unwrap();

        assert!(out.starts_with("# Sample Title\n"));
        assert!(out.contains("## Welcome Home"));
        assert!(out.contains("- Intro\n"));
        assert!(out.contains("First paragraph.\n"));
        assert!(out.contains("- [About us](/about)\n"));
    }

    #[test]
    fn test_builtin_manifest_lists_pages_sorted() {
        let mut pages = CrawlResult::new();
        pages.insert("https://example.com/zeta", "Zeta");
        pages.insert("https://example.com/about", "About");

        let root = extract("<title>Example</title><p>An example site.</p>", Metadata::new());
        let out = TemplateRenderer::manifest().unwrap().render_manifest(&root, &pages).unwrap();

        assert!(out.starts_with("# Example\n"));
        assert!(out.contains("> An example site."));
        let about = out.find("- [About](https://example.com/about)").unwrap();
        let zeta = out.find("- [Zeta](https://example.com/zeta)").unwrap();
        assert!(about < zeta);
    }

    #[test]
    fn test_manifest_from_allowed_paths() {
        let mut metadata = Metadata::new();
        metadata.insert("root_url".to_string(), "http://localhost".to_string());
        metadata.insert("mount_prefix".to_string(), "/.llms".to_string());
        let doc = extract("<h1>Home</h1>", metadata);

        let mut extra = BTreeMap::new();
        extra.insert("allowed_paths".to_string(), Value::from_serialize(["/about", "/pricing"]));
        let out = TemplateRenderer::manifest().unwrap().render_with(&doc, extra).unwrap();

        assert!(out.contains("- [/about](http://localhost/.llms/about.html.md)"));
        assert!(out.contains("- [/pricing](http://localhost/.llms/pricing.html.md)"));
    }
}
