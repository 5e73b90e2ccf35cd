//! Scan configuration types.

use derive_builder::Builder;
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::store::DEFAULT_RESORT_THRESHOLD;

/// Configuration for scanning operations.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Descend into symlinked directories.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Include hidden files (starting with .).
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub include_hidden: bool,

    /// Maximum depth to traverse (None = unlimited).
    #[builder(default)]
    #[serde(default)]
    pub max_depth: Option<u32>,

    /// Glob patterns matched against entry names. Matching directories are
    /// not descended into.
    #[builder(default)]
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Number of threads for scanning (0 = auto-detect).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Appends between two resorts of the result store.
    #[builder(default = "DEFAULT_RESORT_THRESHOLD")]
    #[serde(default = "default_interval")]
    pub resort_threshold: usize,

    /// Records between two progress notifications.
    #[builder(default = "100")]
    #[serde(default = "default_interval")]
    pub progress_interval: usize,

    /// Publish a partial snapshot after every resort.
    #[builder(default = "false")]
    #[serde(default)]
    pub publish_partial: bool,
}

fn default_true() -> bool {
    true
}

fn default_interval() -> usize {
    100
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.resort_threshold == Some(0) {
            return Err("Resort threshold must be at least 1".to_string());
        }
        if self.progress_interval == Some(0) {
            return Err("Progress interval must be at least 1".to_string());
        }
        if let Some(ref patterns) = self.ignore_patterns {
            build_glob_set(patterns).map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Compile the ignore patterns into a matcher.
    pub fn ignore_matcher(&self) -> Result<GlobSet, ScanError> {
        build_glob_set(&self.ignore_patterns)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            include_hidden: true,
            max_depth: None,
            ignore_patterns: Vec::new(),
            threads: 0,
            resort_threshold: DEFAULT_RESORT_THRESHOLD,
            progress_interval: 100,
            publish_partial: false,
        }
    }
}

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, ScanError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ScanError::InvalidConfig {
            message: format!("bad ignore pattern {pattern:?}: {e}"),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| ScanError::InvalidConfig {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = ScanConfig::builder()
            .threads(4usize)
            .follow_symlinks(true)
            .resort_threshold(500usize)
            .build()
            .unwrap();

        assert_eq!(config.threads, 4);
        assert!(config.follow_symlinks);
        assert_eq!(config.resort_threshold, 500);
        assert_eq!(config.progress_interval, 100);
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let built = ScanConfig::builder().build().unwrap();
        assert_eq!(built, ScanConfig::default());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let result = ScanConfig::builder().resort_threshold(0usize).build();
        assert!(result.is_err());

        let result = ScanConfig::builder().progress_interval(0usize).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let result = ScanConfig::builder()
            .ignore_patterns(vec!["[unclosed".to_string()])
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_ignore_matcher() {
        let config = ScanConfig::builder()
            .ignore_patterns(vec!["node_modules".to_string(), "*.log".to_string()])
            .build()
            .unwrap();
        let matcher = config.ignore_matcher().unwrap();

        assert!(matcher.is_match("node_modules"));
        assert!(matcher.is_match("test.log"));
        assert!(!matcher.is_match("src"));
        assert!(ScanConfig::default().ignore_matcher().unwrap().is_empty());
    }

    #[test]
    fn test_bad_pattern_in_deserialized_config() {
        let config: ScanConfig = serde_json::from_str(r#"{"ignore_patterns": ["[unclosed"]}"#).unwrap();
        assert!(matches!(config.ignore_matcher(), Err(ScanError::InvalidConfig { .. })));
    }
}
