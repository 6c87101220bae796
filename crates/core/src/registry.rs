//! The allow-list of routes that expose a Markdown mirror.
//!
//! Routes opt in through an explicit [`MirrorRegistry::register`] call made
//! next to the route setup. One registry belongs to one running server; share
//! it as `Arc<MirrorRegistry>`.
//!
//! Routes use axum path syntax: `{name}` matches one segment and `{*name}`
//! matches the rest of the path. Such routes are *parameterized* and are only
//! mirrored when their [`MirrorPolicy`] allows it.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use regex::Regex;

use crate::{MirrorError, Result};

/// Per-route mirroring policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorPolicy {
    /// Mirror concrete requests to a parameterized route.
    pub allow_param_routes: bool,
}

impl MirrorPolicy {
    pub fn allow_params() -> Self {
        Self { allow_param_routes: true }
    }
}

#[derive(Debug)]
struct Entry {
    policy: MirrorPolicy,
    pattern: Option<Regex>,
}

#[derive(Debug, Default)]
struct State {
    routes: BTreeMap<String, Entry>,
    manifest_source: Option<String>,
}

/// Thread-safe registry of mirror-enabled routes.
#[derive(Debug, Default)]
pub struct MirrorRegistry {
    state: RwLock<State>,
}

impl MirrorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opts `route` in to mirroring. Registering a route again replaces its policy.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Config`] when the route does not start with `/`.
    pub fn register(&self, route: &str, policy: MirrorPolicy) -> Result<()> {
        if !route.starts_with('/') {
            return Err(MirrorError::Config(format!("route must start with '/': {route}")));
        }

        let pattern = if is_parameterized(route) { Some(route_pattern(route)?) } else { None };
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.routes.insert(route.to_string(), Entry { policy, pattern });
        tracing::debug!(route, allow_param_routes = policy.allow_param_routes, "mirror registered");
        Ok(())
    }

    /// Names the page whose HTML backs the manifest.
    pub fn set_manifest_source(&self, route: &str) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.manifest_source = Some(route.to_string());
    }

    /// The manifest source route, when one was set and it is concrete.
    pub fn manifest_source(&self) -> Option<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.manifest_source.clone().filter(|route| !is_parameterized(route))
    }

    /// The live allow-list, sorted.
    pub fn allowed_paths(&self) -> Vec<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .routes
            .iter()
            .filter(|(_, entry)| entry.pattern.is_none() || entry.policy.allow_param_routes)
            .map(|(route, _)| route.clone())
            .collect()
    }

    /// The allowed routes that name one page, sorted. Route patterns are left out.
    pub fn concrete_paths(&self) -> Vec<String> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .routes
            .iter()
            .filter(|(_, entry)| entry.pattern.is_none())
            .map(|(route, _)| route.clone())
            .collect()
    }

    /// Whether a request path may be mirrored.
    pub fn is_allowed(&self, path: &str) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.routes.iter().any(|(route, entry)| match &entry.pattern {
            None => route == path,
            Some(pattern) => entry.policy.allow_param_routes && pattern.is_match(path),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().unwrap_or_else(PoisonError::into_inner).routes.is_empty()
    }
}

/// Whether `route` contains a `{param}` or `{*wildcard}` segment.
pub fn is_parameterized(route: &str) -> bool {
    route.split('/').any(|segment| segment.starts_with('{') && segment.ends_with('}'))
}

fn route_pattern(route: &str) -> Result<Regex> {
    let mut pattern = String::from("^");
    for (i, segment) in route.split('/').enumerate() {
        if i > 0 {
            pattern.push('/');
        }
        if segment.starts_with("{*") && segment.ends_with('}') {
            pattern.push_str(".+");
        } else if segment.starts_with('{') && segment.ends_with('}') {
            pattern.push_str("[^/]+");
        } else {
            pattern.push_str(&regex::escape(segment));
        }
    }
    pattern.push('$');

    Regex::new(&pattern).map_err(|e| MirrorError::Config(format!("invalid route {route}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concrete_routes_are_allowed() {
        let registry = MirrorRegistry::new();
        registry.register("/pricing", MirrorPolicy::default()).unwrap();
        registry.register("/about", MirrorPolicy::default()).unwrap();

        assert_eq!(registry.allowed_paths(), vec!["/about", "/pricing"]);
        assert!(registry.is_allowed("/about"));
        assert!(!registry.is_allowed("/plain"));
        assert!(!registry.is_allowed("/about/"));
    }

    #[test]
    fn test_param_routes_need_policy() {
        let registry = MirrorRegistry::new();
        registry.register("/item/{id}", MirrorPolicy::default()).unwrap();
        registry.register("/docs/{*rest}", MirrorPolicy::allow_params()).unwrap();

        assert_eq!(registry.allowed_paths(), vec!["/docs/{*rest}"]);
        assert!(!registry.is_allowed("/item/42"));
        assert!(registry.is_allowed("/docs/guide/install"));
        assert!(!registry.is_allowed("/docs/"));
    }

    #[test]
    fn test_concrete_paths_skip_patterns() {
        let registry = MirrorRegistry::new();
        registry.register("/pricing", MirrorPolicy::default()).unwrap();
        registry.register("/", MirrorPolicy::default()).unwrap();
        registry.register("/docs/{*rest}", MirrorPolicy::allow_params()).unwrap();
        registry.register("/item/{id}", MirrorPolicy::default()).unwrap();

        assert_eq!(registry.concrete_paths(), vec!["/", "/pricing"]);
        assert_eq!(registry.allowed_paths(), vec!["/", "/docs/{*rest}", "/pricing"]);
    }

    #[test]
    fn test_single_segment_param_match() {
        let registry = MirrorRegistry::new();
        registry.register("/item/{id}", MirrorPolicy::allow_params()).unwrap();

        assert!(registry.is_allowed("/item/42"));
        assert!(!registry.is_allowed("/item/42/edit"));
        assert!(!registry.is_allowed("/item.42"));
    }

    #[test]
    fn test_register_rejects_relative_route() {
        let registry = MirrorRegistry::new();
        assert!(matches!(
            registry.register("about", MirrorPolicy::default()),
            Err(MirrorError::Config(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_manifest_source_must_be_concrete() {
        let registry = MirrorRegistry::new();
        assert_eq!(registry.manifest_source(), None);

        registry.set_manifest_source("/item/{id}");
        assert_eq!(registry.manifest_source(), None);

        registry.set_manifest_source("/");
        assert_eq!(registry.manifest_source(), Some("/".to_string()));
    }

    #[test]
    fn test_is_parameterized() {
        assert!(is_parameterized("/item/{id}"));
        assert!(is_parameterized("/files/{*path}"));
        assert!(!is_parameterized("/pricing"));
        assert!(!is_parameterized("/"));
    }
}
