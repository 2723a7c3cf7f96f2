//! Scan configuration
//!
//! Typed configuration for the analysis engine. Everything has a sensible
//! default so the engine can run with `ScanConfig::default()`; overrides are
//! loaded from a TOML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How the symbol resolver treats ambiguous references (dynamic dispatch,
/// reexports, reflection-like access).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// Link an ambiguous reference to the union of all plausible candidate
    /// declarations. Trades false positives for fewer missed flows.
    #[default]
    Permissive,
    /// Only link references that resolve within the declaring file.
    Strict,
}

/// Configuration for a single scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Languages to scan, by lowercase name (empty = all supported).
    pub include_languages: Vec<String>,
    /// Languages to skip, by lowercase name.
    pub exclude_languages: Vec<String>,
    /// Gitignore-style patterns excluded from traversal.
    pub exclude_patterns: Vec<String>,
    /// Extra rule catalog files (TOML or JSON) merged over the builtin set.
    pub rule_paths: Vec<PathBuf>,
    /// Rule ids that are disabled for this scan.
    pub skip_rules: Vec<String>,
    /// Finding/occurrence fingerprints accepted in a previous review.
    pub skip_fingerprints: Vec<String>,
    /// Maximum call chain depth for interprocedural propagation.
    pub call_depth_limit: usize,
    /// Maximum number of files analyzed before the scan stops accepting
    /// new scan units (0 = unlimited).
    pub max_files: usize,
    /// Wall-clock budget in seconds (0 = unlimited).
    pub time_budget_secs: u64,
    /// Worker threads for the parallel phases (0 = one per core).
    pub parallelism: usize,
    /// Ambiguous-reference handling.
    pub resolution_mode: ResolutionMode,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            include_languages: Vec::new(),
            exclude_languages: Vec::new(),
            exclude_patterns: vec![
                "node_modules".to_string(),
                ".git".to_string(),
                "target".to_string(),
                "__pycache__".to_string(),
                ".venv".to_string(),
                "venv".to_string(),
                "vendor".to_string(),
                "dist".to_string(),
                "build".to_string(),
            ],
            rule_paths: Vec::new(),
            skip_rules: Vec::new(),
            skip_fingerprints: Vec::new(),
            call_depth_limit: 8,
            max_files: 0,
            time_budget_secs: 0,
            parallelism: 0,
            resolution_mode: ResolutionMode::default(),
        }
    }
}

impl ScanConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the configured limits are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.call_depth_limit == 0 {
            return Err(ConfigError::Invalid {
                message: "call_depth_limit must be at least 1".to_string(),
            });
        }
        for lang in self.include_languages.iter().chain(&self.exclude_languages) {
            if lang.chars().any(|c| c.is_whitespace()) {
                return Err(ConfigError::Invalid {
                    message: format!("language name '{lang}' must not contain whitespace"),
                });
            }
        }
        Ok(())
    }

    /// Whether a language name passes the include/exclude filters.
    pub fn language_enabled(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        if self.exclude_languages.iter().any(|l| l.to_lowercase() == name) {
            return false;
        }
        self.include_languages.is_empty()
            || self.include_languages.iter().any(|l| l.to_lowercase() == name)
    }
}

/// Configuration load/validation error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ScanConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_call_depth_is_rejected() {
        let config = ScanConfig {
            call_depth_limit: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn language_filters() {
        let config = ScanConfig {
            include_languages: vec!["python".to_string()],
            ..Default::default()
        };
        assert!(config.language_enabled("Python"));
        assert!(!config.language_enabled("ruby"));

        let config = ScanConfig {
            exclude_languages: vec!["ruby".to_string()],
            ..Default::default()
        };
        assert!(config.language_enabled("python"));
        assert!(!config.language_enabled("Ruby"));
    }

    #[test]
    fn loads_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("piitrace.toml");
        std::fs::write(&path, "call_depth_limit = 3\nexclude_languages = [\"csharp\"]\n").unwrap();
        let config = ScanConfig::from_file(&path).unwrap();
        assert_eq!(config.call_depth_limit, 3);
        assert!(!config.language_enabled("csharp"));
        // Untouched fields keep their defaults.
        assert!(config.exclude_patterns.iter().any(|p| p == "node_modules"));
    }
}
