//! Candidate-based library loading.
//!
//! [`NativeModule::load`] never retries. A [`LibraryResolver`] is the
//! caller-side policy on top of it: it expands a requested name into
//! candidate names and paths and loads the first one that works.

use std::path::Path;

use crate::config::LoaderConfig;
use crate::error::{LoaderError, Result};
use crate::module::NativeModule;
use crate::platform;

/// Loads libraries by trying configured aliases and search directories.
#[derive(Debug, Clone, Default)]
pub struct LibraryResolver {
    config: LoaderConfig,
}

impl LibraryResolver {
    /// Create a resolver with an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver from a configuration.
    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Names and paths that [`load`](Self::load) will try, in order.
    ///
    /// Configured aliases replace the default names. Every bare file name is
    /// tried in each search directory before being handed to the platform
    /// search path.
    pub fn candidates(&self, name: &str) -> Vec<String> {
        let names = match self.config.aliases.get(name) {
            Some(aliases) if !aliases.is_empty() => aliases.clone(),
            _ => {
                let mapped = platform::map_library_name(name);
                if mapped == name {
                    vec![name.to_string()]
                } else {
                    vec![name.to_string(), mapped]
                }
            }
        };

        let mut candidates = Vec::new();
        for candidate in names {
            if is_bare_name(&candidate) {
                for dir in &self.config.search_paths {
                    push_unique(
                        &mut candidates,
                        dir.join(&candidate).to_string_lossy().into_owned(),
                    );
                }
            }
            push_unique(&mut candidates, candidate);
        }

        candidates
    }

    /// Load the first candidate for `name` that the platform loader accepts.
    pub fn load(&self, name: &str) -> Result<NativeModule> {
        let candidates = self.candidates(name);
        let mut attempts = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            match NativeModule::load(candidate.as_str()) {
                Ok(module) => {
                    tracing::debug!("Resolved library {} to {}", name, candidate);
                    return Ok(module);
                }
                Err(e) => {
                    tracing::debug!("Candidate {} for {} failed: {}", candidate, name, e);
                    attempts.push(e.to_string());
                }
            }
        }

        Err(LoaderError::NoCandidates {
            name: name.to_string(),
            attempts,
        })
    }
}

fn is_bare_name(candidate: &str) -> bool {
    let path = Path::new(candidate);
    !candidate.is_empty() && !path.is_absolute() && path.components().count() == 1
}

fn push_unique(list: &mut Vec<String>, item: String) {
    if !list.contains(&item) {
        list.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_candidates() {
        let resolver = LibraryResolver::new();
        let candidates = resolver.candidates("m");
        assert_eq!(candidates, vec!["m".to_string(), platform::map_library_name("m")]);
    }

    #[test]
    fn test_already_mapped_name_not_duplicated() {
        let resolver = LibraryResolver::new();
        let mapped = platform::map_library_name("z");
        assert_eq!(resolver.candidates(&mapped), vec![mapped]);
    }

    #[test]
    fn test_aliases_replace_defaults() {
        let config = LoaderConfig::new().with_alias("gl", ["libGL.so.1", "libGL.so"]);
        let resolver = LibraryResolver::with_config(config);
        assert_eq!(resolver.candidates("gl"), vec!["libGL.so.1", "libGL.so"]);
    }

    #[test]
    fn test_empty_alias_list_falls_back() {
        let config = LoaderConfig::new().with_alias("m", Vec::<String>::new());
        let resolver = LibraryResolver::with_config(config);
        assert_eq!(resolver.candidates("m")[0], "m");
    }

    #[cfg(unix)]
    #[test]
    fn test_search_paths_come_first() {
        let config = LoaderConfig::new()
            .with_search_path("/opt/a")
            .with_search_path("/opt/b")
            .with_alias("foo", ["libfoo.so.1", "/abs/libfoo.so"]);
        let resolver = LibraryResolver::with_config(config);

        assert_eq!(
            resolver.candidates("foo"),
            vec![
                "/opt/a/libfoo.so.1",
                "/opt/b/libfoo.so.1",
                "libfoo.so.1",
                "/abs/libfoo.so",
            ]
        );
    }

    #[test]
    fn test_load_reports_every_attempt() {
        let config = LoaderConfig::new().with_alias("missing", ["nope-one-xyz", "nope-two-xyz"]);
        let resolver = LibraryResolver::with_config(config);

        match resolver.load("missing") {
            Err(LoaderError::NoCandidates { name, attempts }) => {
                assert_eq!(name, "missing");
                assert_eq!(attempts.len(), 2);
                assert!(attempts[0].contains("nope-one-xyz"));
                assert!(attempts[1].contains("nope-two-xyz"));
            }
            other => panic!("Expected NoCandidates, got {:?}", other),
        }
    }

    #[test]
    fn test_load_falls_through_to_working_candidate() {
        let config = LoaderConfig::new()
            .with_alias("math", ["does-not-exist-xyz", platform::math_library()]);
        let resolver = LibraryResolver::with_config(config);

        let module = resolver.load("math").unwrap();
        assert_eq!(module.name(), platform::math_library());
        assert!(!module.resolve_symbol("cos").unwrap().is_null());
    }
}
