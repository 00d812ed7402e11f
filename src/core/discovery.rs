//! # Test Discovery Module / 测试发现模块
//!
//! Finds the tests that must run in isolation by scanning source files for the
//! isolation marker and taking the first test definition that follows each
//! marker.
//!
//! 通过扫描源文件中的隔离标记，并取每个标记之后的第一个测试定义，
//! 找到必须隔离运行的测试。

use anyhow::{Context, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::config::{DefinitionPattern, SpecialTestConfig};
use crate::core::models::{DiscoveredTest, MarkerMatch};

/// A provider of tests that need isolated processes.
/// 需要独立进程的测试的提供者。
pub trait TestSource {
    /// Returns the tests in the order they should be considered.
    fn discover(&self) -> Result<Vec<DiscoveredTest>>;
}

/// Builds a regex matching `marker` as a whole word, the way `grep --word-regexp` does.
///
/// The characters immediately before and after the match must not be word
/// characters (letters, digits, underscore).
pub fn marker_regex(marker: &str) -> Result<Regex> {
    let pattern = format!(r"(?:^|[^\w]){}(?:[^\w]|$)", regex::escape(marker));
    Regex::new(&pattern).with_context(|| format!("Invalid marker: {marker}"))
}

/// Returns the 1-based numbers of the lines in `content` that contain the marker.
pub fn marker_lines(content: &str, marker: &Regex) -> Vec<usize> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| marker.is_match(line))
        .map(|(idx, _)| idx + 1)
        .collect()
}

/// Derives `(function, name)` from a definition line.
///
/// Leading whitespace is ignored. The keyword is stripped and the rest is cut
/// at the parameter-list delimiter, giving the function identifier; the test
/// name is the identifier without the test prefix.
///
/// ```
/// use special_runner::config::DefinitionPattern;
/// use special_runner::discovery::derive_test_name;
///
/// let pattern = DefinitionPattern::default();
/// let (function, name) = derive_test_name("def test_foo(tmpdir):", &pattern).unwrap();
/// assert_eq!(function, "test_foo");
/// assert_eq!(name, "foo");
/// assert!(derive_test_name("def helper(x):", &pattern).is_none());
/// ```
pub fn derive_test_name(line: &str, pattern: &DefinitionPattern) -> Option<(String, String)> {
    let rest = line.trim_start().strip_prefix(pattern.keyword.as_str())?;
    let name = rest.strip_prefix(pattern.test_prefix.as_str())?;
    let name = match name.find(pattern.delimiter.as_str()) {
        Some(end) if !pattern.delimiter.is_empty() => &name[..end],
        _ => name,
    }
    .trim_end();
    Some((format!("{}{}", pattern.test_prefix, name), name.to_string()))
}

/// Scans `content` from the 1-based `start_line` (inclusive) to the end and
/// returns the first definition found, as `(line, function, name)`.
///
/// Only the first definition counts; a marker never yields more than one test.
pub fn find_definition(
    content: &str,
    start_line: usize,
    pattern: &DefinitionPattern,
) -> Option<(usize, String, String)> {
    content
        .lines()
        .enumerate()
        .skip(start_line.saturating_sub(1))
        .find_map(|(idx, line)| {
            derive_test_name(line, pattern).map(|(function, name)| (idx + 1, function, name))
        })
}

/// The text-scanning test source.
///
/// Walks every root in order, files sorted by name, and looks for the marker
/// line by line.
/// 按顺序遍历每个根目录（文件按名称排序），逐行查找标记。
#[derive(Debug)]
pub struct MarkerScan<'a> {
    project_root: &'a Path,
    roots: &'a [PathBuf],
    extensions: &'a [String],
    marker: Regex,
    pattern: &'a DefinitionPattern,
}

impl<'a> MarkerScan<'a> {
    pub fn new(project_root: &'a Path, config: &'a SpecialTestConfig) -> Result<Self> {
        Ok(Self {
            project_root,
            roots: &config.roots,
            extensions: &config.extensions,
            marker: marker_regex(&config.marker)?,
            pattern: &config.definition,
        })
    }

    fn wants_file(&self, path: &Path) -> bool {
        self.extensions.is_empty()
            || path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    /// Lists the files to scan, in scan order.
    pub fn candidate_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for root in self.roots {
            let root = self.project_root.join(root);
            // A missing root simply has no markers.
            if !root.exists() {
                continue;
            }
            for entry in WalkDir::new(&root).sort_by_file_name() {
                let entry = entry
                    .with_context(|| format!("Failed to walk directory: {}", root.display()))?;
                if entry.file_type().is_file() && self.wants_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        }
        Ok(files)
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(self.project_root).unwrap_or(path)
    }

    /// Finds every marker occurrence, in file-then-line order.
    pub fn marker_matches(&self) -> Result<Vec<MarkerMatch>> {
        let mut matches = Vec::new();
        for path in self.candidate_files()? {
            let content = read_lossy(&path)?;
            matches.extend(marker_lines(&content, &self.marker).into_iter().map(|line| {
                MarkerMatch {
                    file: self.relative(&path).to_path_buf(),
                    line,
                }
            }));
        }
        Ok(matches)
    }
}

impl TestSource for MarkerScan<'_> {
    fn discover(&self) -> Result<Vec<DiscoveredTest>> {
        let mut tests = Vec::new();
        for path in self.candidate_files()? {
            let content = read_lossy(&path)?;
            for marker_line in marker_lines(&content, &self.marker) {
                // A marker with no definition after it produces nothing.
                let Some((definition_line, function, name)) =
                    find_definition(&content, marker_line, self.pattern)
                else {
                    continue;
                };
                tests.push(DiscoveredTest {
                    file: self.relative(&path).to_path_buf(),
                    marker_line: Some(marker_line),
                    definition_line: Some(definition_line),
                    function,
                    name,
                });
            }
        }
        Ok(tests)
    }
}

/// Reads a file as text, replacing invalid UTF-8.
fn read_lossy(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
