//! File filtering for module resolution.
//!
//! Filters apply to paths relative to the project root, at the moment a
//! `mod` declaration is resolved to a file. An excluded file's module is
//! omitted from the tree entirely, along with everything beneath it.

use std::path::Path;

use glob::Pattern;
use tracing::warn;

/// User-facing filter configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterConfig {
    /// Files matching any of these globs are excluded. Wins over includes.
    pub exclude_patterns: Vec<String>,
    /// When non-empty, a file must match at least one of these globs.
    pub include_patterns: Vec<String>,
    /// Exclude files whose basename ends in `_test` or `_tests`.
    pub exclude_test_files: bool,
    /// Exclude files under a top-level `tests` directory.
    pub exclude_tests_directory: bool,
    /// Omit inline modules annotated `#[cfg(test)]`.
    pub exclude_cfg_test: bool,
}

impl FilterConfig {
    /// The no-tests preset: all three test filters on, no glob lists.
    pub fn no_tests() -> Self {
        FilterConfig {
            exclude_test_files: true,
            exclude_tests_directory: true,
            exclude_cfg_test: true,
            ..FilterConfig::default()
        }
    }
}

/// A [`FilterConfig`] with its glob lists compiled once.
#[derive(Debug)]
pub(crate) struct CompiledFilter {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
    exclude_test_files: bool,
    exclude_tests_directory: bool,
    pub(crate) exclude_cfg_test: bool,
}

impl CompiledFilter {
    /// Compiles the glob lists. Invalid patterns are skipped with a warning
    /// rather than aborting the run.
    pub(crate) fn compile(config: &FilterConfig) -> Self {
        CompiledFilter {
            include: compile_patterns(&config.include_patterns),
            exclude: compile_patterns(&config.exclude_patterns),
            exclude_test_files: config.exclude_test_files,
            exclude_tests_directory: config.exclude_tests_directory,
            exclude_cfg_test: config.exclude_cfg_test,
        }
    }

    /// Whether `rel_path` (relative to the project root) survives filtering.
    pub(crate) fn allows(&self, rel_path: &Path) -> bool {
        if self.exclude_test_files && is_test_file(rel_path) {
            return false;
        }
        if self.exclude_tests_directory && in_tests_directory(rel_path) {
            return false;
        }
        if self.exclude.iter().any(|p| p.matches_path(rel_path)) {
            return false;
        }
        if !self.include.is_empty() && !self.include.iter().any(|p| p.matches_path(rel_path)) {
            return false;
        }
        true
    }
}

fn compile_patterns(patterns: &[String]) -> Vec<Pattern> {
    patterns
        .iter()
        .filter_map(|raw| match Pattern::new(raw) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                warn!(pattern = %raw, error = %e, "skipping invalid glob pattern");
                None
            }
        })
        .collect()
}

/// `foo_test.rs` / `foo_tests.rs` naming convention.
fn is_test_file(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.ends_with("_test") || stem.ends_with("_tests"))
}

/// Top-level `tests/` directory, relative to the project root.
fn in_tests_directory(path: &Path) -> bool {
    path.components()
        .next()
        .is_some_and(|c| c.as_os_str() == "tests")
}
