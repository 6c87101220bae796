//! The router that serves `.html.md` mirrors and the manifest in front of a site.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::Response;
use axum::routing::get;
use mdmirror_core::{ExtractConfig, MIRROR_SUFFIX, Metadata, MirrorRegistry, Result, TemplateRenderer};
use minijinja::Value;
use tower::ServiceExt;

use crate::config::MirrorConfig;
use crate::response::{markdown, markdown_error, root_url};

/// Upper bound on a rendered source page body.
const MAX_PAGE_BYTES: usize = 16 * 1024 * 1024;

/// Markdown mirrors for an existing axum site.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use axum::{Router, response::Html, routing::get};
/// use mdmirror_core::{MirrorPolicy, MirrorRegistry};
/// use mdmirror_server::{Mirror, MirrorConfig};
///
/// let registry = Arc::new(MirrorRegistry::new());
/// registry.register("/pricing", MirrorPolicy::default()).unwrap();
///
/// let site = Router::new().route("/pricing", get(|| async { Html("<h1>Pricing</h1>") }));
/// let app = Mirror::new(site, registry, MirrorConfig::default()).unwrap().into_router();
/// ```
pub struct Mirror {
    state: MirrorState,
}

#[derive(Clone)]
struct MirrorState {
    site: Router,
    registry: Arc<MirrorRegistry>,
    pages: Arc<TemplateRenderer>,
    manifest: Option<Arc<TemplateRenderer>>,
    config: Arc<MirrorConfig>,
}

impl Mirror {
    /// Validates `config` and compiles both templates up front.
    pub fn new(site: Router, registry: Arc<MirrorRegistry>, config: MirrorConfig) -> Result<Self> {
        config.validate()?;

        let template_dir = config.template_dir.as_deref();
        let pages = Arc::new(TemplateRenderer::new(template_dir, &config.template_name)?);
        let manifest = config
            .manifest_template
            .as_deref()
            .map(|name| TemplateRenderer::new(template_dir, name).map(Arc::new))
            .transpose()?;

        tracing::info!(
            template = %config.template_name,
            manifest = ?config.manifest_template,
            mount_prefix = %config.mount_prefix,
            "markdown mirror ready"
        );

        Ok(Self { state: MirrorState { site, registry, pages, manifest, config: Arc::new(config) } })
    }

    /// The combined router: manifest, mirrors, and the site for everything else.
    pub fn into_router(self) -> Router {
        let mut router = Router::new();
        if self.state.manifest.is_some() {
            router = router.route(&self.state.config.manifest_path, get(serve_manifest));
        }
        router.fallback(dispatch).with_state(self.state)
    }
}

impl MirrorState {
    /// The page path a request asks a mirror of, if it is a mirror request at all.
    fn mirror_target<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.config.mount_prefix.as_str())?;
        let target = rest.strip_suffix(MIRROR_SUFFIX)?;
        target.starts_with('/').then_some(target)
    }

    /// The registered route serving `target`, with `/index` falling back to `/`.
    fn resolve_route(&self, target: &str) -> Option<String> {
        if self.registry.is_allowed(target) {
            return Some(target.to_string());
        }

        let dir = target.strip_suffix("index").filter(|dir| dir.ends_with('/'))?;
        self.registry.is_allowed(dir).then(|| dir.to_string())
    }

    fn metadata(&self, root: &str, route: &str) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("root_url".to_string(), root.to_string());
        metadata.insert("source_url".to_string(), format!("{root}{route}"));
        metadata.insert("allowed_paths".to_string(), self.registry.allowed_paths().join(","));
        metadata.insert("mount_prefix".to_string(), self.config.mount_prefix.clone());
        metadata
    }

    fn extract_config(&self, root: &str) -> ExtractConfig {
        if self.config.rewrite_links { ExtractConfig::mirror(root) } else { ExtractConfig::default() }
    }
}

async fn dispatch(State(state): State<MirrorState>, request: Request) -> Response {
    let is_read = matches!(*request.method(), Method::GET | Method::HEAD);
    if is_read && let Some(target) = state.mirror_target(request.uri().path()) {
        return serve_mirror(&state, request.headers(), target).await;
    }

    state.site.clone().oneshot(request).await.unwrap_or_else(|never| match never {})
}

async fn serve_mirror(state: &MirrorState, headers: &HeaderMap, target: &str) -> Response {
    let Some(route) = state.resolve_route(target) else {
        tracing::debug!(path = target, "mirror requested for unregistered path");
        return markdown_error(StatusCode::NOT_FOUND, "Markdown mirror not enabled for this path.");
    };

    let html = match render_source(&state.site, &route).await {
        Ok(html) => html,
        Err(status) => return markdown_error(status, &format!("Failed to render `{route}`.")),
    };

    let root = root_url(headers);
    let metadata = state.metadata(&root, &route);
    let config = state.extract_config(&root);

    match state.pages.render_html(&html, metadata, &config) {
        Ok(body) => markdown(StatusCode::OK, body),
        Err(e) => {
            tracing::error!(route = %route, error = %e, "mirror render failed");
            markdown_error(StatusCode::INTERNAL_SERVER_ERROR, &format!("Failed to render Markdown for `{route}`."))
        }
    }
}

async fn serve_manifest(State(state): State<MirrorState>, headers: HeaderMap) -> Response {
    let Some(renderer) = state.manifest.as_deref() else {
        return markdown_error(StatusCode::NOT_FOUND, "Manifest not enabled.");
    };
    let Some(route) = state.registry.manifest_source() else {
        tracing::warn!("manifest requested without a concrete source page");
        return markdown_error(StatusCode::INTERNAL_SERVER_ERROR, "Unable to resolve source page for llms.txt.");
    };

    let html = match render_source(&state.site, &route).await {
        Ok(html) => html,
        Err(status) => return markdown_error(status, &format!("Failed to render `{route}` for manifest.")),
    };

    let root = root_url(&headers);
    let metadata = state.metadata(&root, &route);
    let config = state.extract_config(&root);

    let mut extra = BTreeMap::new();
    extra.insert("allowed_paths".to_string(), Value::from_serialize(state.registry.concrete_paths()));

    match renderer.render_html_with(&html, metadata, &config, extra) {
        Ok(body) => markdown(StatusCode::OK, body),
        Err(e) => {
            tracing::error!(route = %route, error = %e, "manifest render failed");
            markdown_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to render manifest.")
        }
    }
}

/// Renders `route` through the site router and returns its HTML.
///
/// Any status of 400 or above comes back as the error.
async fn render_source(site: &Router, route: &str) -> std::result::Result<String, StatusCode> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(route)
        .header(header::ACCEPT, "text/html")
        .body(Body::empty())
        .map_err(|e| {
            tracing::warn!(route, error = %e, "could not build source request");
            StatusCode::BAD_REQUEST
        })?;

    let response = site.clone().oneshot(request).await.unwrap_or_else(|never| match never {});
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        tracing::warn!(route, status = status.as_u16(), "source page failed");
        return Err(status);
    }

    let bytes = to_bytes(response.into_body(), MAX_PAGE_BYTES).await.map_err(|e| {
        tracing::warn!(route, error = %e, "could not read source page");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdmirror_core::MirrorPolicy;

    fn state(config: MirrorConfig) -> MirrorState {
        let registry = Arc::new(MirrorRegistry::new());
        registry.register("/", MirrorPolicy::default()).unwrap();
        registry.register("/docs/", MirrorPolicy::default()).unwrap();
        registry.register("/about", MirrorPolicy::default()).unwrap();

        let Mirror { state } = Mirror::new(Router::new(), registry, config).unwrap();
        state
    }

    #[test]
    fn test_mirror_target_without_prefix() {
        let state = state(MirrorConfig::default());

        assert_eq!(state.mirror_target("/about.html.md"), Some("/about"));
        assert_eq!(state.mirror_target("/docs/guide.html.md"), Some("/docs/guide"));
        assert_eq!(state.mirror_target("/about"), None);
        assert_eq!(state.mirror_target("/about.md"), None);
    }

    #[test]
    fn test_mirror_target_with_prefix() {
        let state = state(MirrorConfig::builder().mount_prefix("/.llms").build());

        assert_eq!(state.mirror_target("/.llms/about.html.md"), Some("/about"));
        assert_eq!(state.mirror_target("/about.html.md"), None);
        assert_eq!(state.mirror_target("/.llmsx/about.html.md"), None);
    }

    #[test]
    fn test_resolve_route_index_fallback() {
        let state = state(MirrorConfig::default());

        assert_eq!(state.resolve_route("/about").as_deref(), Some("/about"));
        assert_eq!(state.resolve_route("/index").as_deref(), Some("/"));
        assert_eq!(state.resolve_route("/docs/index").as_deref(), Some("/docs/"));
        assert_eq!(state.resolve_route("/contact"), None);
        assert_eq!(state.resolve_route("/aboutindex"), None);
    }

    #[test]
    fn test_metadata_fields() {
        let state = state(MirrorConfig::default());
        let metadata = state.metadata("http://localhost", "/about");

        assert_eq!(metadata["root_url"], "http://localhost");
        assert_eq!(metadata["source_url"], "http://localhost/about");
        assert_eq!(metadata["allowed_paths"], "/,/about,/docs/");
        assert_eq!(metadata["mount_prefix"], "");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = MirrorConfig::builder().manifest_path("llms.txt").build();
        assert!(Mirror::new(Router::new(), Arc::new(MirrorRegistry::new()), config).is_err());
    }
}
