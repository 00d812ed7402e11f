//! # Configuration Module / 配置模块
//!
//! Defines the `SpecialTests.toml` configuration: where to look for tests,
//! how to recognize them, which ones to skip and how to run them.
//!
//! 定义 `SpecialTests.toml` 配置：在哪里查找测试、如何识别测试、
//! 跳过哪些测试以及如何运行它们。

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Name of the configuration file looked up by default.
pub const DEFAULT_CONFIG_FILE: &str = "SpecialTests.toml";

/// Environment variable that enables special tests inside the test framework.
pub const SPECIAL_TESTS_ENV: &str = "PL_RUNNING_SPECIAL_TESTS";

/// Where the list of special tests comes from.
/// 特殊测试列表的来源。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Scan source files for the isolation marker.
    /// 扫描源文件中的隔离标记。
    #[default]
    Scan,
    /// Use the `[[registry]]` entries tagged with the isolation tag.
    /// 使用带有隔离标签的 `[[registry]]` 条目。
    Registry,
}

/// The textual shape of a test definition line.
///
/// With the defaults, `def test_foo(tmpdir):` defines the function `test_foo`
/// whose test name is `foo`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DefinitionPattern {
    /// Keyword that opens a definition, including its trailing space.
    /// 开始定义的关键字，包括其后的空格。
    #[serde(default = "default_keyword")]
    pub keyword: String,
    /// Prefix that marks a function as a test.
    /// 将函数标记为测试的前缀。
    #[serde(default = "default_test_prefix")]
    pub test_prefix: String,
    /// Delimiter that opens the parameter list.
    /// 开始参数列表的分隔符。
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for DefinitionPattern {
    fn default() -> Self {
        Self {
            keyword: default_keyword(),
            test_prefix: default_test_prefix(),
            delimiter: default_delimiter(),
        }
    }
}

/// A set of test names that are never run.
///
/// Accepts either a space-separated string (`"test_a test_b"`) or a list.
/// 接受以空格分隔的字符串或列表。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Blocklist(BTreeSet<String>);

impl Blocklist {
    /// Builds a blocklist from whitespace-separated names.
    pub fn from_words(words: &str) -> Self {
        Self(words.split_whitespace().map(str::to_string).collect())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Blocklist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'de> Deserialize<'de> for Blocklist {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Words(String),
            List(Vec<String>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Words(words) => Blocklist::from_words(&words),
            Raw::List(list) => list
                .iter()
                .flat_map(|entry| entry.split_whitespace())
                .collect(),
        })
    }
}

/// The trailing profiling run.
/// 末尾的性能分析运行。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProfileConfig {
    /// Command placed in front of the runner, e.g. `nvprof -o trace_name.prof --`.
    /// 放在运行器前面的命令。
    pub wrapper: String,
    /// Fixed node id handed to the runner under the profiler.
    /// 在性能分析器下交给运行器的固定节点 ID。
    pub target: String,
}

/// A test declared explicitly instead of being found by scanning.
/// 显式声明的测试，而不是通过扫描找到的。
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegisteredTest {
    /// Source file, relative to the project directory.
    pub file: PathBuf,
    /// Function identifier, e.g. `test_foo`.
    pub name: String,
    /// Capability tags such as `special`.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The entire configuration, loaded from a TOML file.
/// 从 TOML 文件加载的完整配置。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SpecialTestConfig {
    /// The language for the runner's output messages (e.g., "en", "zh-CN").
    /// When absent, `--lang` or the system locale decides.
    ///
    /// 运行器输出消息的语言（例如 "en", "zh-CN"）。
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Where the tests come from.
    #[serde(default)]
    pub source: SourceKind,

    /// Directories scanned for the marker, relative to the project directory.
    /// 扫描标记的目录，相对于项目目录。
    #[serde(default = "default_roots")]
    pub roots: Vec<PathBuf>,

    /// The isolation marker. Matched as a whole word.
    /// 隔离标记，按整词匹配。
    #[serde(default = "default_marker")]
    pub marker: String,

    /// File extensions to scan (without the dot). Defaults to `["py"]`; an
    /// explicit empty list scans every file.
    /// 要扫描的文件扩展名（不含点）。默认为 `["py"]`；显式的空列表会扫描所有文件。
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Names that are never run.
    #[serde(default)]
    pub blocklist: Blocklist,

    /// Command prefix for a single test. The node id `<file>::<function>`
    /// is appended as the last argument.
    ///
    /// 单个测试的命令前缀。节点 ID `<file>::<function>` 作为最后一个参数追加。
    pub runner: String,

    /// Tag that marks a registry entry as needing isolation.
    #[serde(default = "default_isolation_tag")]
    pub isolation_tag: String,

    /// Environment variables set on every child process.
    /// 为每个子进程设置的环境变量。
    #[serde(default = "default_env")]
    pub env: BTreeMap<String, String>,

    #[serde(default)]
    pub definition: DefinitionPattern,

    /// Optional trailing profiling run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileConfig>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registry: Vec<RegisteredTest>,
}

impl Default for SpecialTestConfig {
    fn default() -> Self {
        Self {
            language: None,
            source: SourceKind::default(),
            roots: default_roots(),
            marker: default_marker(),
            extensions: default_extensions(),
            blocklist: Blocklist::from_words("test_pytorch_profiler_nested_emit_nvtx"),
            runner: "python -m coverage run --source pytorch_lightning --append -m pytest --verbose --capture=no".to_string(),
            env: default_env(),
            definition: DefinitionPattern::default(),
            profile: Some(ProfileConfig {
                wrapper: "nvprof --profile-from-start off -o trace_name.prof --".to_string(),
                target: "tests/test_profiler.py::test_pytorch_profiler_nested_emit_nvtx"
                    .to_string(),
            }),
            isolation_tag: default_isolation_tag(),
            registry: vec![],
        }
    }
}

fn default_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("tests")]
}

fn default_extensions() -> Vec<String> {
    vec!["py".to_string()]
}

fn default_marker() -> String {
    "special=True".to_string()
}

fn default_env() -> BTreeMap<String, String> {
    BTreeMap::from([(SPECIAL_TESTS_ENV.to_string(), "1".to_string())])
}

fn default_keyword() -> String {
    "def ".to_string()
}

fn default_test_prefix() -> String {
    "test_".to_string()
}

fn default_delimiter() -> String {
    "(".to_string()
}

fn default_isolation_tag() -> String {
    "special".to_string()
}
