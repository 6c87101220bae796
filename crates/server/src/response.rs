//! Markdown response helpers.

use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};

pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

pub fn markdown(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, MARKDOWN_CONTENT_TYPE)], body).into_response()
}

/// A two-line Markdown error page: `# {status}` then `message`.
pub fn markdown_error(status: StatusCode, message: &str) -> Response {
    markdown(status, format!("# {}\n{message}\n", status.as_u16()))
}

/// `{scheme}://{host}` of the incoming request.
///
/// The scheme comes from `x-forwarded-proto` when a proxy set it.
pub fn root_url(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");

    format!("{scheme}://{host}")
}
