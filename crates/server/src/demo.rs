//! A small demo site with mirrors opted in next to each route.

use axum::Router;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use mdmirror_core::{MirrorPolicy, MirrorRegistry, Result};

const LAYOUT_HEAD: &str = "<!doctype html><html><head><meta charset=\"utf-8\">";

/// Builds the demo site and registers its mirror-enabled routes.
///
/// `/contact` stays undecorated and `/broken` always fails, so both mirror
/// error paths can be seen from a browser.
pub fn site(registry: &MirrorRegistry) -> Result<Router> {
    registry.set_manifest_source("/");
    registry.register("/", MirrorPolicy::default())?;
    registry.register("/about", MirrorPolicy::default())?;
    registry.register("/features", MirrorPolicy::default())?;
    registry.register("/pricing", MirrorPolicy::default())?;
    registry.register("/broken", MirrorPolicy::default())?;

    Ok(Router::new()
        .route("/", get(home))
        .route("/about", get(about))
        .route("/features", get(features))
        .route("/pricing", get(pricing))
        .route("/contact", get(contact))
        .route("/broken", get(broken)))
}

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!("{LAYOUT_HEAD}<title>{title}</title></head><body>{body}</body></html>"))
}

async fn home() -> Html<String> {
    page(
        "Acme Cloud",
        r#"<h1>Acme Cloud</h1>
        <p>Acme Cloud runs your background jobs without servers to manage.</p>
        <h2>Why Acme</h2>
        <p>Jobs retry on failure and scale with your queue.</p>
        <nav>
          <a href="/about">About Acme</a>
          <a href="/features">Features</a>
          <a href="/pricing">Pricing</a>
          <a href="/contact">Contact sales</a>
        </nav>"#,
    )
}

async fn about() -> Html<String> {
    page(
        "About | Acme Cloud",
        r#"<h1>About Acme</h1>
        <p>We started Acme to make job queues boring.</p>
        <a href="/">Back home</a>"#,
    )
}

async fn features() -> Html<String> {
    page(
        "Features | Acme Cloud",
        r#"<h1>Features</h1>
        <h2>Retries</h2>
        <p>Exponential backoff with jitter.</p>
        <h2>Schedules</h2>
        <p>Cron expressions down to the second.</p>"#,
    )
}

async fn pricing() -> Html<String> {
    page(
        "Pricing | Acme Cloud",
        r#"<h1>Pricing</h1>
        <p>Free for the first million jobs each month.</p>
        <a href="/contact">Talk to sales</a>"#,
    )
}

async fn contact() -> Html<String> {
    page("Contact | Acme Cloud", "<h1>Contact</h1><p>sales@acme.test</p>")
}

async fn broken() -> (StatusCode, Html<String>) {
    (StatusCode::INTERNAL_SERVER_ERROR, page("Error", "<h1>Something went wrong</h1>"))
}
