//! Error types for mdmirror operations.
//!
//! This module defines the main error type [`MirrorError`] which represents
//! everything that can go wrong while fetching pages, loading templates, or
//! configuring the mirror surface. Extraction itself never fails: malformed
//! HTML degrades to empty fields instead.
//!
//! # Example
//!
//! ```rust
//! use mdmirror_core::{MirrorError, Result};
//!
//! fn require_template(name: &str) -> Result<&str> {
//!     if name.is_empty() {
//!         return Err(MirrorError::Config("template_name is required".to_string()));
//!     }
//!     Ok(name)
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for mdmirror operations.
///
/// Fetch-related variants are what [`crate::PageFetcher::try_fetch`] reports;
/// [`crate::PageFetcher::fetch`] folds all of them into an empty string plus a
/// logged warning.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other transport problems.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The server answered with a non-success status.
    #[error("HTTP {status} while fetching {url}")]
    HttpStatus { status: u16, url: String },

    /// Invalid URL provided.
    ///
    /// Returned when a URL cannot be parsed or is malformed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// The file exists but is not valid UTF-8.
    #[error("Invalid character encoding")]
    InvalidEncoding,

    /// Other file I/O errors (permissions, directories, ...).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Setup-time configuration errors.
    ///
    /// Missing template names, manifest paths that do not start with `/`,
    /// and similar programmer errors surface here before anything is served.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Template lookup, compilation or rendering errors.
    #[error("Template error: {0}")]
    Template(String),
}

impl From<minijinja::Error> for MirrorError {
    fn from(err: minijinja::Error) -> Self {
        MirrorError::Template(err.to_string())
    }
}

/// Result type alias for MirrorError.
///
/// This is a convenience alias for `std::result::Result<T, MirrorError>`.
pub type Result<T> = std::result::Result<T, MirrorError>;
