//! Rule catalog
//!
//! Loads the versioned rule set once per scan: the builtin catalog first,
//! then any user-supplied rule files layered on top. A malformed rule file
//! is a fatal configuration error, never a skipped input; silently dropping
//! a sink rule would turn into silently missing findings.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, instrument};

use piitrace_core::config::ScanConfig;

use crate::domain::rule::{Rule, RuleRole};
use crate::domain::value_objects::Language;

const BUILTIN_RULES: &str = include_str!("rules/builtin.toml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read rule file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse rule file {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("unsupported rule file extension: {path}")]
    UnsupportedFormat { path: PathBuf },
    #[error("duplicate rule id '{id}' (defined in {first} and {second})")]
    Duplicate {
        id: String,
        first: String,
        second: String,
    },
    #[error("builtin catalog is invalid: {0}")]
    Builtin(String),
}

/// On-disk rule file shape, shared by the builtin catalog and user files.
#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    rules: Vec<Rule>,
}

/// A provider of rules. Loaders are composed so builtin and file-based
/// rules flow through one code path.
pub trait RuleLoader {
    /// Human-readable origin, used in duplicate-id errors.
    fn origin(&self) -> String;
    fn load(&self) -> Result<RuleSet, CatalogError>;
}

#[derive(Debug, Default)]
pub struct RuleSet {
    pub version: Option<String>,
    pub rules: Vec<Rule>,
}

/// Rules compiled into the binary.
pub struct BuiltinRuleLoader;

impl RuleLoader for BuiltinRuleLoader {
    fn origin(&self) -> String {
        "builtin".to_string()
    }

    fn load(&self) -> Result<RuleSet, CatalogError> {
        let file: RuleFile =
            toml::from_str(BUILTIN_RULES).map_err(|e| CatalogError::Builtin(e.to_string()))?;
        Ok(RuleSet {
            version: file.version,
            rules: file.rules,
        })
    }
}

/// Rules loaded from a TOML or JSON file on disk.
pub struct FileRuleLoader {
    path: PathBuf,
}

impl FileRuleLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RuleLoader for FileRuleLoader {
    fn origin(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<RuleSet, CatalogError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| CatalogError::Io {
            path: self.path.clone(),
            source,
        })?;
        let extension = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let file: RuleFile = match extension.as_deref() {
            Some("toml") => toml::from_str(&text).map_err(|e| CatalogError::Parse {
                path: self.path.clone(),
                message: e.to_string(),
            })?,
            Some("json") => serde_json::from_str(&text).map_err(|e| CatalogError::Parse {
                path: self.path.clone(),
                message: e.to_string(),
            })?,
            _ => {
                return Err(CatalogError::UnsupportedFormat {
                    path: self.path.clone(),
                })
            }
        };
        Ok(RuleSet {
            version: file.version,
            rules: file.rules,
        })
    }
}

/// Runs loaders in order and merges their output, rejecting duplicate ids.
pub struct CompositeRuleLoader {
    loaders: Vec<Box<dyn RuleLoader>>,
}

impl CompositeRuleLoader {
    pub fn new(loaders: Vec<Box<dyn RuleLoader>>) -> Self {
        Self { loaders }
    }
}

impl RuleLoader for CompositeRuleLoader {
    fn origin(&self) -> String {
        "composite".to_string()
    }

    fn load(&self) -> Result<RuleSet, CatalogError> {
        let mut merged = RuleSet::default();
        let mut seen: std::collections::HashMap<String, String> = std::collections::HashMap::new();
        for loader in &self.loaders {
            let set = loader.load()?;
            if merged.version.is_none() {
                merged.version = set.version;
            }
            for rule in set.rules {
                if let Some(first) = seen.get(&rule.id) {
                    return Err(CatalogError::Duplicate {
                        id: rule.id,
                        first: first.clone(),
                        second: loader.origin(),
                    });
                }
                seen.insert(rule.id.clone(), loader.origin());
                merged.rules.push(rule);
            }
        }
        Ok(merged)
    }
}

/// The immutable rule catalog for one scan, pre-partitioned by role.
#[derive(Debug)]
pub struct RuleCatalog {
    version: String,
    sources: Vec<Rule>,
    sinks: Vec<Rule>,
    sanitizers: Vec<Rule>,
}

impl RuleCatalog {
    /// Load builtin rules plus the files named in `config.rule_paths`,
    /// then drop the ids listed in `config.skip_rules`.
    #[instrument(skip_all)]
    pub fn load(config: &ScanConfig) -> Result<Self, CatalogError> {
        let mut loaders: Vec<Box<dyn RuleLoader>> = vec![Box::new(BuiltinRuleLoader)];
        for path in &config.rule_paths {
            loaders.push(Box::new(FileRuleLoader::new(path)));
        }
        let set = CompositeRuleLoader::new(loaders).load()?;
        let skip: HashSet<&str> = config.skip_rules.iter().map(String::as_str).collect();
        let catalog = Self::from_rules(
            set.version.unwrap_or_else(|| "unversioned".to_string()),
            set.rules
                .into_iter()
                .filter(|r| !skip.contains(r.id.as_str()))
                .collect(),
        );
        info!(
            version = %catalog.version,
            sources = catalog.sources.len(),
            sinks = catalog.sinks.len(),
            sanitizers = catalog.sanitizers.len(),
            "rule catalog loaded"
        );
        Ok(catalog)
    }

    /// Load only a single extra rule file on top of builtins.
    pub fn load_with_file(path: &Path) -> Result<Self, CatalogError> {
        let loaders: Vec<Box<dyn RuleLoader>> = vec![
            Box::new(BuiltinRuleLoader),
            Box::new(FileRuleLoader::new(path)),
        ];
        let set = CompositeRuleLoader::new(loaders).load()?;
        Ok(Self::from_rules(
            set.version.unwrap_or_else(|| "unversioned".to_string()),
            set.rules,
        ))
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        let set = BuiltinRuleLoader.load()?;
        Ok(Self::from_rules(
            set.version.unwrap_or_else(|| "unversioned".to_string()),
            set.rules,
        ))
    }

    fn from_rules(version: String, rules: Vec<Rule>) -> Self {
        let mut sources = Vec::new();
        let mut sinks = Vec::new();
        let mut sanitizers = Vec::new();
        for rule in rules {
            match rule.role {
                RuleRole::Source => sources.push(rule),
                RuleRole::Sink => sinks.push(rule),
                RuleRole::Sanitizer => sanitizers.push(rule),
            }
        }
        debug!(sources = sources.len(), sinks = sinks.len(), "partitioned rules");
        Self {
            version,
            sources,
            sinks,
            sanitizers,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn sources_for(&self, language: Language) -> impl Iterator<Item = &Rule> {
        self.sources.iter().filter(move |r| r.applies_to(language))
    }

    pub fn sinks_for(&self, language: Language) -> impl Iterator<Item = &Rule> {
        self.sinks.iter().filter(move |r| r.applies_to(language))
    }

    pub fn sanitizers_for(&self, language: Language) -> impl Iterator<Item = &Rule> {
        self.sanitizers
            .iter()
            .filter(move |r| r.applies_to(language))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn builtin_catalog_parses_and_partitions() {
        let catalog = RuleCatalog::builtin().expect("builtin rules parse");
        assert!(catalog.sources_for(Language::Python).count() >= 10);
        assert!(catalog.sinks_for(Language::Python).count() >= 2);
        assert!(catalog.sanitizers_for(Language::Ruby).count() >= 2);
        assert_ne!(catalog.version(), "unversioned");
    }

    #[test]
    fn builtin_sinks_match_expected_paths() {
        let catalog = RuleCatalog::builtin().unwrap();
        let hit = |lang, path: &str| {
            catalog
                .sinks_for(lang)
                .any(|r| r.matches_call(path))
        };
        assert!(hit(Language::Python, "logging.info"));
        assert!(hit(Language::Python, "logger.error"));
        assert!(hit(Language::JavaScript, "console.log"));
        assert!(hit(Language::Java, "System.out.println"));
        assert!(hit(Language::Ruby, "Rails.logger.info"));
        assert!(hit(Language::CSharp, "Console.WriteLine"));
        assert!(!hit(Language::Python, "math.sqrt"));
    }

    #[test]
    fn user_file_merges_and_duplicates_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(
            f,
            r#"
[[rules]]
id = "pii.employee-id"
role = "source"
category = "employee_id"
sensitivity = "high"
name_patterns = ["employee_id"]
"#
        )
        .unwrap();
        let catalog = RuleCatalog::load_with_file(&path).unwrap();
        assert!(catalog
            .sources_for(Language::Python)
            .any(|r| r.id == "pii.employee-id"));

        let dup = dir.path().join("dup.toml");
        let mut f = std::fs::File::create(&dup).unwrap();
        writeln!(
            f,
            r#"
[[rules]]
id = "pii.ssn"
role = "source"
category = "ssn"
name_patterns = ["ssn"]
"#
        )
        .unwrap();
        let err = RuleCatalog::load_with_file(&dup).unwrap_err();
        assert!(matches!(err, CatalogError::Duplicate { .. }));
    }

    #[test]
    fn malformed_rule_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[[rules]]\nid = \"x\"\nrole = \"nonsense\"\n").unwrap();
        let err = RuleCatalog::load_with_file(&path).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }

    #[test]
    fn json_rule_files_supported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(
            &path,
            r#"{"rules":[{"id":"pii.tax-id","role":"source","category":"tax_id","sensitivity":"high","name_patterns":["tax_id"]}]}"#,
        )
        .unwrap();
        let catalog = RuleCatalog::load_with_file(&path).unwrap();
        assert!(catalog
            .sources_for(Language::Java)
            .any(|r| r.id == "pii.tax-id"));
    }

    #[test]
    fn skip_rules_filter_out_ids() {
        let config = ScanConfig {
            skip_rules: vec!["pii.email".to_string()],
            ..Default::default()
        };
        let catalog = RuleCatalog::load(&config).unwrap();
        assert!(!catalog
            .sources_for(Language::Python)
            .any(|r| r.id == "pii.email"));
        assert!(catalog
            .sources_for(Language::Python)
            .any(|r| r.id == "pii.ssn"));
    }
}
