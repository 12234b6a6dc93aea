//! Eligibility filter
//!
//! Decides which discovered paths are worth documenting. Applied to the
//! listing before any content is fetched.

use glob::Pattern;

use crate::config::FilterConfig;
use crate::types::{DocError, Result};

/// Extension allow-list plus excluded directory names plus glob exclusions
#[derive(Debug, Clone)]
pub struct EligibilityFilter {
    extensions: Vec<String>,
    exclude_dirs: Vec<String>,
    exclude_globs: Vec<Pattern>,
}

impl Default for EligibilityFilter {
    fn default() -> Self {
        Self::from_parts(
            crate::constants::filter::DEFAULT_EXTENSIONS,
            crate::constants::filter::DEFAULT_EXCLUDED_DIRS,
        )
    }
}

impl EligibilityFilter {
    /// Build from configuration; glob patterns are compiled once here
    pub fn from_config(config: &FilterConfig) -> Result<Self> {
        let exclude_globs = config
            .exclude_globs
            .iter()
            .map(|p| {
                Pattern::new(p)
                    .map_err(|e| DocError::Config(format!("Invalid exclude glob '{}': {}", p, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            extensions: config.extensions.iter().map(|e| normalize_ext(e)).collect(),
            exclude_dirs: config.exclude_dirs.clone(),
            exclude_globs,
        })
    }

    pub fn from_parts(extensions: &[&str], exclude_dirs: &[&str]) -> Self {
        Self {
            extensions: extensions.iter().map(|e| normalize_ext(e)).collect(),
            exclude_dirs: exclude_dirs.iter().map(|d| d.to_string()).collect(),
            exclude_globs: Vec::new(),
        }
    }

    pub fn is_eligible(&self, path: &str) -> bool {
        let mut segments = path.split(['/', '\\']).filter(|s| !s.is_empty()).peekable();
        let mut file_name = None;

        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                file_name = Some(segment);
            } else if self.exclude_dirs.iter().any(|d| d == segment) {
                return false;
            }
        }

        let Some(file_name) = file_name else {
            return false;
        };

        let has_extension = file_name
            .rsplit_once('.')
            .is_some_and(|(stem, ext)| !stem.is_empty() && self.extensions.iter().any(|e| e == ext));
        if !has_extension {
            return false;
        }

        !self.exclude_globs.iter().any(|p| p.matches(path))
    }

    /// Keep eligible paths, preserving their order
    pub fn retain(&self, paths: Vec<String>) -> Vec<String> {
        paths.into_iter().filter(|p| self.is_eligible(p)).collect()
    }
}

fn normalize_ext(ext: &str) -> String {
    ext.trim_start_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_filter() {
        let filter = EligibilityFilter::default();
        assert!(filter.is_eligible("src/app.py"));
        assert!(filter.is_eligible("lib/Main.java"));
        assert!(filter.is_eligible("web/index.ts"));
        assert!(!filter.is_eligible("node_modules/lib/index.js"));
        assert!(!filter.is_eligible("README.md"));
    }

    #[test]
    fn test_excluded_segment_anywhere() {
        let filter = EligibilityFilter::default();
        assert!(!filter.is_eligible("pkg/venv/lib/site.py"));
        assert!(!filter.is_eligible("a/b/__pycache__/mod.py"));
        assert!(!filter.is_eligible(".git/hooks/pre-commit.py"));
        // Only directory segments are excluded
        assert!(filter.is_eligible("tools/env.py"));
    }

    #[test]
    fn test_extension_case_sensitive() {
        let filter = EligibilityFilter::default();
        assert!(!filter.is_eligible("src/APP.PY"));
    }

    #[test]
    fn test_dotfile_without_stem_rejected() {
        let filter = EligibilityFilter::default();
        assert!(!filter.is_eligible(".py"));
        assert!(!filter.is_eligible("src/"));
    }

    #[test]
    fn test_config_with_dots_and_globs() {
        let config = FilterConfig {
            extensions: vec![".rs".to_string(), "toml".to_string()],
            exclude_globs: vec!["**/generated/**".to_string()],
            ..Default::default()
        };
        let filter = EligibilityFilter::from_config(&config).unwrap();

        assert!(filter.is_eligible("src/main.rs"));
        assert!(filter.is_eligible("Cargo.toml"));
        assert!(!filter.is_eligible("src/generated/api.rs"));
        assert!(!filter.is_eligible("src/app.py"));
    }

    #[test]
    fn test_retain_preserves_order() {
        let filter = EligibilityFilter::default();
        let kept = filter.retain(vec![
            "b.py".to_string(),
            "README.md".to_string(),
            "a.js".to_string(),
        ]);
        assert_eq!(kept, vec!["b.py", "a.js"]);
    }

    proptest! {
        #[test]
        fn prop_node_modules_never_eligible(
            prefix in "[a-z]{1,8}",
            name in "[a-z]{1,8}",
            ext in prop::sample::select(vec!["py", "js", "ts", "java"]),
        ) {
            let filter = EligibilityFilter::default();
            let path = format!("{}/node_modules/{}.{}", prefix, name, ext);
            prop_assert!(!filter.is_eligible(&path));
        }

        #[test]
        fn prop_allowed_extension_in_plain_dir_eligible(
            dir in "[a-z]{1,8}",
            name in "[a-z]{1,8}",
            ext in prop::sample::select(vec!["py", "js", "ts", "java"]),
        ) {
            prop_assume!(!["venv", "env"].contains(&dir.as_str()));
            let filter = EligibilityFilter::default();
            let path = format!("{}/{}.{}", dir, name, ext);
            prop_assert!(filter.is_eligible(&path));
        }
    }
}
