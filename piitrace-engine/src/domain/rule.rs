//! Rule records
//!
//! Rules are immutable, versioned, data-driven definitions loaded once per
//! scan. A rule plays one of three roles: a PII *source* pattern, an unsafe
//! *sink* pattern, or a *sanitizer* that neutralizes a flow. Matching is
//! structural (compiled regexes against symbol names, type annotations, and
//! canonical call paths), never free-text search over source code.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::value_objects::{Language, Sensitivity};

/// Role a rule plays in the dataflow analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleRole {
    Source,
    Sink,
    Sanitizer,
}

/// A single catalog rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Unique id, e.g. `pii.ssn` or `sink.python.logging`.
    pub id: String,
    pub role: RuleRole,
    /// PII category for sources; finding category for sinks is taken from
    /// the label, so sinks leave this empty.
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub sensitivity: Sensitivity,
    #[serde(default)]
    pub description: String,
    /// Languages the rule applies to; empty means all.
    #[serde(default)]
    pub languages: Vec<Language>,
    /// Identifier patterns that select this rule (sources).
    #[serde(default, with = "regex_vec")]
    pub name_patterns: Vec<Regex>,
    /// Identifier patterns that veto a name match.
    #[serde(default, with = "regex_vec")]
    pub exclude_patterns: Vec<Regex>,
    /// Type-annotation patterns (sources), matched when a declaration
    /// carries a static type.
    #[serde(default, with = "regex_vec")]
    pub type_patterns: Vec<Regex>,
    /// Canonical call-path patterns (sinks, sanitizers, call-shaped sources).
    #[serde(default, with = "regex_vec")]
    pub call_patterns: Vec<Regex>,
    /// Categories a sanitizer neutralizes; empty means all categories.
    #[serde(default)]
    pub neutralizes: Vec<String>,
    /// Whether the sanitizer fully neutralizes matching categories. When
    /// false, sanitized flows are still reported, flagged for review.
    #[serde(default = "default_true")]
    pub fully_neutralizing: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Rule {
    pub fn applies_to(&self, language: Language) -> bool {
        self.languages.is_empty() || self.languages.contains(&language)
    }

    /// Structural identifier match: dotted paths are normalized with
    /// underscores so `user.ssn` matches the same patterns as `user_ssn`.
    pub fn matches_identifier(&self, name: &str) -> bool {
        let normalized = name.replace('.', "_").to_lowercase();
        self.name_patterns.iter().any(|p| p.is_match(&normalized))
            && !self.exclude_patterns.iter().any(|p| p.is_match(&normalized))
    }

    pub fn matches_type(&self, annotation: &str) -> bool {
        self.type_patterns.iter().any(|p| p.is_match(annotation))
    }

    /// Match a canonical (alias-resolved) dotted call path.
    pub fn matches_call(&self, path: &str) -> bool {
        self.call_patterns.iter().any(|p| p.is_match(path))
    }

    /// Whether a sanitizer rule clears the given category.
    pub fn neutralizes_category(&self, category: &str) -> bool {
        self.neutralizes.is_empty() || self.neutralizes.iter().any(|c| c == category)
    }
}

/// Serde support for regex vectors stored as plain strings in rule files.
mod regex_vec {
    use regex::Regex;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[Regex], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(value.iter().map(|r| r.as_str()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Regex>, D::Error> {
        let patterns: Vec<String> = Vec::deserialize(deserializer)?;
        patterns
            .into_iter()
            .map(|p| {
                Regex::new(&p).map_err(|e| D::Error::custom(format!("invalid pattern '{p}': {e}")))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_rule(include: &[&str], exclude: &[&str]) -> Rule {
        Rule {
            id: "pii.ssn".to_string(),
            role: RuleRole::Source,
            category: "ssn".to_string(),
            sensitivity: Sensitivity::Critical,
            description: String::new(),
            languages: Vec::new(),
            name_patterns: include.iter().map(|p| Regex::new(p).unwrap()).collect(),
            exclude_patterns: exclude.iter().map(|p| Regex::new(p).unwrap()).collect(),
            type_patterns: Vec::new(),
            call_patterns: Vec::new(),
            neutralizes: Vec::new(),
            fully_neutralizing: true,
            tags: Vec::new(),
        }
    }

    #[test]
    fn identifier_matching_normalizes_dots() {
        let rule = source_rule(&["(^|_)ssn($|_)"], &[]);
        assert!(rule.matches_identifier("ssn"));
        assert!(rule.matches_identifier("user.ssn"));
        assert!(rule.matches_identifier("customer_ssn_hash"));
        assert!(!rule.matches_identifier("session"));
    }

    #[test]
    fn exclude_patterns_veto() {
        let rule = source_rule(&["email"], &["email_template"]);
        assert!(rule.matches_identifier("user_email"));
        assert!(!rule.matches_identifier("email_template_id"));
    }

    #[test]
    fn rules_roundtrip_through_toml() {
        let toml_src = r#"
            id = "sink.python.logging"
            role = "sink"
            description = "logger"
            languages = ["python"]
            call_patterns = ["^logging\\.(info|warn)"]
        "#;
        let rule: Rule = toml::from_str(toml_src).unwrap();
        assert_eq!(rule.role, RuleRole::Sink);
        assert!(rule.matches_call("logging.info"));
        assert!(rule.applies_to(Language::Python));
        assert!(!rule.applies_to(Language::Ruby));
        // Serialization keeps the pattern strings.
        let out = toml::to_string(&rule).unwrap();
        assert!(out.contains("logging"));
    }
}
