//! Source loader
//!
//! Enumerates candidate files under the scan root, applies gitignore-style
//! exclusion patterns, detects the language from the file extension, and
//! reads content upfront so no I/O happens during analysis.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, instrument, trace, warn};
use walkdir::WalkDir;

use piitrace_core::config::ScanConfig;

use crate::domain::finding::{Diagnostic, ScanStats};
use crate::domain::syntax::{FileId, SourceFile};
use crate::domain::value_objects::Language;

/// Result of loading a directory tree.
pub struct LoadedSources {
    pub files: Vec<SourceFile>,
    pub stats: ScanStats,
    pub diagnostics: Vec<Diagnostic>,
}

/// Loader error. Only the root being unreadable is fatal; individual file
/// failures become diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("scan root {path} is not accessible: {source}")]
    RootInaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid exclude pattern '{pattern}': {detail}")]
    InvalidExcludePattern { pattern: String, detail: String },
}

pub struct SourceLoader {
    exclude: GlobSet,
    exclude_dir_names: Vec<String>,
    config: ScanConfig,
}

impl SourceLoader {
    pub fn new(config: &ScanConfig) -> Result<Self, LoadError> {
        let mut builder = GlobSetBuilder::new();
        let mut exclude_dir_names = Vec::new();
        for pattern in &config.exclude_patterns {
            // Bare names exclude any directory of that name at any depth;
            // patterns with glob syntax are matched against relative paths.
            if !pattern.contains(['*', '/', '?', '[']) {
                exclude_dir_names.push(pattern.clone());
                continue;
            }
            let glob = Glob::new(pattern).map_err(|e| LoadError::InvalidExcludePattern {
                pattern: pattern.clone(),
                detail: e.to_string(),
            })?;
            builder.add(glob);
        }
        let exclude = builder.build().map_err(|e| LoadError::InvalidExcludePattern {
            pattern: String::new(),
            detail: e.to_string(),
        })?;
        Ok(Self {
            exclude,
            exclude_dir_names,
            config: config.clone(),
        })
    }

    /// Walk `root` and read every supported source file.
    #[instrument(skip(self), fields(root = %root.display()))]
    pub fn load(&self, root: &Path) -> Result<LoadedSources, LoadError> {
        if !root.exists() {
            return Err(LoadError::RootInaccessible {
                path: root.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such path"),
            });
        }

        let mut files = Vec::new();
        let mut stats = ScanStats::default();
        let mut diagnostics = Vec::new();

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                if entry.file_type().is_dir() {
                    if let Some(name) = entry.file_name().to_str() {
                        if self.exclude_dir_names.iter().any(|p| p == name) {
                            trace!(directory = %name, "excluding directory");
                            return false;
                        }
                    }
                }
                true
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "unreadable entry during walk");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let relative = path.strip_prefix(root).unwrap_or(path);
            if self.exclude.is_match(relative) {
                trace!(file = %relative.display(), "excluded by pattern");
                continue;
            }
            let Some(language) = Language::from_path(path) else {
                continue;
            };
            if !self.config.language_enabled(&language.to_string()) {
                continue;
            }

            let display_path = relative.display().to_string();
            match std::fs::read_to_string(path) {
                Ok(text) => {
                    let id = FileId(files.len() as u32);
                    let file =
                        SourceFile::new(id, path.to_path_buf(), display_path, language, text);
                    stats.record(language, file.line_index.line_count());
                    files.push(file);
                }
                Err(e) => {
                    // Binary or unreadable content is skipped, not fatal.
                    diagnostics.push(Diagnostic::ReadSkipped {
                        file: display_path,
                        detail: e.to_string(),
                    });
                }
            }
        }

        debug!(
            file_count = files.len(),
            skipped = diagnostics.len(),
            "source loading complete"
        );
        Ok(LoadedSources {
            files,
            stats,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn loads_supported_files_and_skips_excluded_dirs() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "app.py", "x = 1\n");
        write(dir.path(), "lib/util.rb", "y = 2\n");
        write(dir.path(), "node_modules/dep/index.js", "z = 3\n");
        write(dir.path(), "README.md", "# readme\n");

        let loader = SourceLoader::new(&ScanConfig::default()).unwrap();
        let loaded = loader.load(dir.path()).unwrap();

        let paths: Vec<_> = loaded.files.iter().map(|f| f.display_path.as_str()).collect();
        assert!(paths.contains(&"app.py"));
        assert!(paths.iter().any(|p| p.ends_with("util.rb")));
        assert!(!paths.iter().any(|p| p.contains("node_modules")));
        assert_eq!(loaded.stats.total.file_count, 2);
    }

    #[test]
    fn glob_patterns_exclude_by_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "src/main.py", "a = 1\n");
        write(dir.path(), "tests/test_main.py", "b = 2\n");

        let config = ScanConfig {
            exclude_patterns: vec!["tests/**".to_string()],
            ..Default::default()
        };
        let loader = SourceLoader::new(&config).unwrap();
        let loaded = loader.load(dir.path()).unwrap();
        assert_eq!(loaded.files.len(), 1);
        assert!(loaded.files[0].display_path.ends_with("main.py"));
    }

    #[test]
    fn language_filter_applies() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.py", "a = 1\n");
        write(dir.path(), "b.rb", "b = 2\n");

        let config = ScanConfig {
            include_languages: vec!["ruby".to_string()],
            ..Default::default()
        };
        let loader = SourceLoader::new(&config).unwrap();
        let loaded = loader.load(dir.path()).unwrap();
        assert_eq!(loaded.files.len(), 1);
        assert_eq!(loaded.files[0].language, Language::Ruby);
    }

    #[test]
    fn missing_root_is_fatal() {
        let loader = SourceLoader::new(&ScanConfig::default()).unwrap();
        assert!(loader.load(Path::new("/nonexistent/piitrace")).is_err());
    }

    #[test]
    fn deterministic_file_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.py", "b = 1\n");
        write(dir.path(), "a.py", "a = 1\n");
        write(dir.path(), "c/d.py", "d = 1\n");

        let loader = SourceLoader::new(&ScanConfig::default()).unwrap();
        let first: Vec<_> = loader
            .load(dir.path())
            .unwrap()
            .files
            .into_iter()
            .map(|f| f.display_path)
            .collect();
        let second: Vec<_> = loader
            .load(dir.path())
            .unwrap()
            .files
            .into_iter()
            .map(|f| f.display_path)
            .collect();
        assert_eq!(first, second);
        assert_eq!(first[0], "a.py");
    }
}
