//! Settings for the mirror router.

use std::path::PathBuf;

use mdmirror_core::{MANIFEST_TEMPLATE, MirrorError, PAGE_TEMPLATE, Result};
use serde::Deserialize;

/// Configuration for a [`Mirror`](crate::Mirror).
///
/// # Example
///
/// ```rust
/// use mdmirror_server::MirrorConfig;
///
/// let config = MirrorConfig::builder()
///     .mount_prefix("/.llms")
///     .manifest_path("/llms.txt")
///     .build();
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Directory searched for templates before the built-ins.
    pub template_dir: Option<PathBuf>,

    /// Template used for page mirrors (default: `html_to_md.jinja`).
    pub template_name: String,

    /// Template used for the manifest; `None` disables the manifest route.
    pub manifest_template: Option<String>,

    /// Path prefix in front of every mirror URL (default: empty).
    pub mount_prefix: String,

    /// Where the manifest is served (default: `/llms.txt`).
    pub manifest_path: String,

    /// Rewrite relative links to point at their mirrors (default: false).
    pub rewrite_links: bool,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            template_dir: None,
            template_name: PAGE_TEMPLATE.to_string(),
            manifest_template: Some(MANIFEST_TEMPLATE.to_string()),
            mount_prefix: String::new(),
            manifest_path: "/llms.txt".to_string(),
            rewrite_links: false,
        }
    }
}

impl MirrorConfig {
    pub fn builder() -> MirrorConfigBuilder {
        MirrorConfigBuilder::new()
    }

    /// Loads a config from JSON; missing fields keep their defaults.
    pub fn from_json(source: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(source).map_err(|e| MirrorError::Config(format!("invalid mirror config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the settings before any route is built.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.template_name.trim().is_empty() {
            return Err(MirrorError::Config("template_name is required".to_string()));
        }
        if self.manifest_template.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(MirrorError::Config("manifest_template must not be empty".to_string()));
        }
        if !self.manifest_path.starts_with('/') {
            return Err(MirrorError::Config(format!(
                "manifest_path must start with '/': {}",
                self.manifest_path
            )));
        }
        if !self.mount_prefix.is_empty() && (!self.mount_prefix.starts_with('/') || self.mount_prefix.ends_with('/')) {
            return Err(MirrorError::Config(format!(
                "mount_prefix must start with '/' and not end with one: {}",
                self.mount_prefix
            )));
        }
        if self.rewrite_links && !self.mount_prefix.is_empty() {
            return Err(MirrorError::Config(
                "rewrite_links cannot be combined with a mount_prefix".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`MirrorConfig`].
pub struct MirrorConfigBuilder {
    config: MirrorConfig,
}

impl MirrorConfigBuilder {
    pub fn new() -> Self {
        Self { config: MirrorConfig::default() }
    }

    pub fn template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.template_dir = Some(dir.into());
        self
    }

    pub fn template_name(mut self, name: impl Into<String>) -> Self {
        self.config.template_name = name.into();
        self
    }

    /// Sets the manifest template, or disables the manifest with `None`.
    pub fn manifest_template(mut self, name: Option<&str>) -> Self {
        self.config.manifest_template = name.map(str::to_string);
        self
    }

    pub fn mount_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.mount_prefix = prefix.into();
        self
    }

    pub fn manifest_path(mut self, path: impl Into<String>) -> Self {
        self.config.manifest_path = path.into();
        self
    }

    pub fn rewrite_links(mut self, value: bool) -> Self {
        self.config.rewrite_links = value;
        self
    }

    pub fn build(self) -> MirrorConfig {
        self.config
    }
}

impl Default for MirrorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = MirrorConfig::default();
        assert_eq!(config.template_name, PAGE_TEMPLATE);
        assert_eq!(config.manifest_template.as_deref(), Some(MANIFEST_TEMPLATE));
        assert_eq!(config.manifest_path, "/llms.txt");
        assert!(config.mount_prefix.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_sets_fields() {
        let config = MirrorConfig::builder()
            .template_dir("/tmp/templates")
            .template_name("page.jinja")
            .manifest_template(None)
            .mount_prefix("/.llms")
            .manifest_path("/ai.txt")
            .build();

        assert_eq!(config.template_dir, Some(PathBuf::from("/tmp/templates")));
        assert_eq!(config.template_name, "page.jinja");
        assert_eq!(config.manifest_template, None);
        assert_eq!(config.mount_prefix, "/.llms");
        assert_eq!(config.manifest_path, "/ai.txt");
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let cases = [
            MirrorConfig::builder().template_name("  ").build(),
            MirrorConfig::builder().manifest_template(Some("")).build(),
            MirrorConfig::builder().manifest_path("llms.txt").build(),
            MirrorConfig::builder().mount_prefix("llms").build(),
            MirrorConfig::builder().mount_prefix("/llms/").build(),
            MirrorConfig::builder().mount_prefix("/llms").rewrite_links(true).build(),
        ];

        for config in cases {
            assert!(matches!(config.validate(), Err(MirrorError::Config(_))), "{config:?}");
        }
    }

    #[test]
    fn test_from_json_keeps_defaults() {
        let config = MirrorConfig::from_json(r#"{"mount_prefix": "/.llms"}"#).unwrap();
        assert_eq!(config.mount_prefix, "/.llms");
        assert_eq!(config.template_name, PAGE_TEMPLATE);
    }

    #[test]
    fn test_from_json_validates() {
        assert!(MirrorConfig::from_json(r#"{"manifest_path": "nope"}"#).is_err());
        assert!(MirrorConfig::from_json("{").is_err());
    }
}
