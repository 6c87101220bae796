//! Markdown mirrors and an `llms.txt` manifest for axum sites.
//!
//! Wrap an existing [`axum::Router`] in a [`Mirror`]: every route registered in
//! the shared [`MirrorRegistry`](mdmirror_core::MirrorRegistry) becomes
//! available as `{mount_prefix}/{path}.html.md`, and the manifest lists them.

pub mod config;
pub mod demo;
pub mod mirror;
pub mod response;

pub use config::{MirrorConfig, MirrorConfigBuilder};
pub use mirror::Mirror;
pub use response::MARKDOWN_CONTENT_TYPE;
