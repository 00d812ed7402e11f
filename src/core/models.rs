//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the runner:
//! marker matches, discovered tests, per-test results and the run report.
//!
//! 此模块定义了整个运行器中使用的核心数据结构：
//! 标记匹配、发现的测试、单个测试结果以及运行报告。

use crate::infra::t;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// A line where the isolation marker occurs.
/// 出现隔离标记的行。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerMatch {
    /// Path relative to the project directory.
    /// 相对于项目目录的路径。
    pub file: PathBuf,
    /// 1-based line number.
    /// 从 1 开始的行号。
    pub line: usize,
}

/// A test selected for isolated execution.
/// 被选中进行隔离执行的测试。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredTest {
    /// Path relative to the project directory.
    pub file: PathBuf,
    /// Line of the marker this test was found from, if it was scanned.
    /// 找到此测试的标记所在行（如果是扫描得到的）。
    pub marker_line: Option<usize>,
    /// Line of the definition, if it was scanned.
    pub definition_line: Option<usize>,
    /// Function identifier handed to the runner, e.g. `test_foo`.
    /// 交给运行器的函数标识符，例如 `test_foo`。
    pub function: String,
    /// Test name with the test prefix stripped, e.g. `foo`.
    /// 去掉测试前缀后的测试名称，例如 `foo`。
    pub name: String,
}

impl DiscoveredTest {
    /// The `<file>::<function>` id understood by the test runner.
    pub fn node_id(&self) -> String {
        format!("{}::{}", self.file.display(), self.function)
    }

    /// Where the test was found, `<file>:<line>` for scanned tests.
    pub fn location(&self) -> String {
        match self.marker_line {
            Some(line) => format!("{}:{}", self.file.display(), line),
            None => self.file.display().to_string(),
        }
    }
}

/// Why a discovered test was not run.
/// 发现的测试未运行的原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The name is on the blocklist.
    /// 名称在阻止列表中。
    Blocklisted,
    /// The name does not match the `--filter` pattern.
    /// 名称不匹配 `--filter` 模式。
    Filtered,
    /// An earlier command failed or the run was interrupted.
    /// 之前的命令失败或运行被中断。
    NotReached,
}

/// Enumerates the possible reasons for a failed command.
/// 枚举命令失败的可能原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// The command exited with a non-zero status.
    /// 命令以非零状态退出。
    TestFailed,
    /// The command was terminated without an exit code (e.g. by a signal).
    /// 命令在没有退出码的情况下终止（例如被信号终止）。
    Terminated,
    /// The run was cancelled with Ctrl-C while the command was running.
    /// 命令运行期间使用 Ctrl-C 取消了运行。
    Interrupted,
}

/// Represents the final result of a single discovered test.
/// 表示单个已发现测试的最终结果。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TestResult {
    /// The command exited successfully.
    /// 命令成功退出。
    Passed {
        test: DiscoveredTest,
        /// The complete output of the command / 命令的完整输出
        output: String,
        duration: Duration,
    },
    /// The command failed and stopped the run.
    /// 命令失败并停止了运行。
    Failed {
        test: DiscoveredTest,
        output: String,
        reason: FailureReason,
        exit_code: Option<i32>,
        duration: Duration,
    },
    /// The test was not run.
    /// 测试未运行。
    Skipped {
        test: DiscoveredTest,
        reason: SkipReason,
    },
}

impl TestResult {
    pub fn test(&self) -> &DiscoveredTest {
        match self {
            TestResult::Passed { test, .. }
            | TestResult::Failed { test, .. }
            | TestResult::Skipped { test, .. } => test,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TestResult::Failed { .. })
    }

    pub fn was_run(&self) -> bool {
        !matches!(self, TestResult::Skipped { .. })
    }

    /// Gets the duration of the command. Returns None for skipped tests.
    /// 获取命令的持续时间。对于跳过的测试返回 None。
    pub fn get_duration(&self) -> Option<Duration> {
        match self {
            TestResult::Passed { duration, .. } | TestResult::Failed { duration, .. } => {
                Some(*duration)
            }
            TestResult::Skipped { .. } => None,
        }
    }

    /// Gets the captured output. Returns an empty string for skipped tests.
    /// 获取捕获的输出。对于跳过的测试返回空字符串。
    pub fn get_output(&self) -> &str {
        match self {
            TestResult::Passed { output, .. } | TestResult::Failed { output, .. } => output,
            TestResult::Skipped { .. } => "",
        }
    }

    /// Gets the status of the test result as a localized string for display.
    /// 以本地化字符串形式获取测试结果的状态以供显示。
    pub fn get_status_str(&self, locale: &str) -> String {
        match self {
            TestResult::Passed { .. } => t!("report.status_passed", locale = locale).to_string(),
            TestResult::Failed { reason, .. } => match reason {
                FailureReason::Interrupted => {
                    t!("report.status_interrupted", locale = locale).to_string()
                }
                _ => t!("report.status_failed", locale = locale).to_string(),
            },
            TestResult::Skipped { reason, .. } => match reason {
                SkipReason::Blocklisted => {
                    t!("report.status_blocklisted", locale = locale).to_string()
                }
                SkipReason::Filtered => t!("report.status_filtered", locale = locale).to_string(),
                SkipReason::NotReached => {
                    t!("report.status_not_reached", locale = locale).to_string()
                }
            },
        }
    }

    /// Gets the CSS class used by the HTML report.
    pub fn get_status_class(&self) -> &'static str {
        match self {
            TestResult::Passed { .. } => "status-Passed",
            TestResult::Failed { .. } => "status-Failed",
            TestResult::Skipped { .. } => "status-Skipped",
        }
    }
}

/// Outcome of the trailing profiling run.
/// 末尾性能分析运行的结果。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResult {
    /// The full command line that was executed.
    pub command: String,
    pub output: String,
    pub exit_code: Option<i32>,
    pub success: bool,
    pub duration: Duration,
}

/// Everything that happened during one invocation of `run`.
/// 一次 `run` 调用期间发生的所有事情。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    /// Results in discovery order.
    /// 按发现顺序排列的结果。
    pub results: Vec<TestResult>,
    pub profile: Option<ProfileResult>,
    pub interrupted: bool,
}

impl RunReport {
    pub fn executed_count(&self) -> usize {
        self.results.iter().filter(|r| r.was_run()).count()
    }

    pub fn passed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r, TestResult::Passed { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.results.len() - self.executed_count()
    }

    pub fn first_failure(&self) -> Option<&TestResult> {
        self.results.iter().find(|r| r.is_failure())
    }

    /// The error that decides the process exit status, if the run did not succeed.
    /// 如果运行未成功，则返回决定进程退出状态的错误。
    pub fn failure(&self) -> Option<CommandFailed> {
        if self.interrupted {
            return Some(CommandFailed::Interrupted);
        }
        if let Some(TestResult::Failed {
            test, exit_code, ..
        }) = self.first_failure()
        {
            return Some(CommandFailed::Test {
                node_id: test.node_id(),
                exit_code: *exit_code,
            });
        }
        match &self.profile {
            Some(profile) if !profile.success => Some(CommandFailed::Profile {
                command: profile.command.clone(),
                exit_code: profile.exit_code,
            }),
            _ => None,
        }
    }
}

/// A child command failed and stopped the run.
///
/// `main` downcasts to this type to exit with the child's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandFailed {
    Test {
        node_id: String,
        exit_code: Option<i32>,
    },
    Profile {
        command: String,
        exit_code: Option<i32>,
    },
    Interrupted,
}

impl CommandFailed {
    /// Process exit status for this failure.
    ///
    /// The child's own code when it fits in a `u8` and is non-zero, 130 for
    /// Ctrl-C, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        let code = match self {
            CommandFailed::Test { exit_code, .. } | CommandFailed::Profile { exit_code, .. } => {
                *exit_code
            }
            CommandFailed::Interrupted => return 130,
        };
        code.and_then(|c| u8::try_from(c).ok())
            .filter(|c| *c != 0)
            .unwrap_or(1)
    }
}

impl fmt::Display for CommandFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandFailed::Test { node_id, exit_code } => match exit_code {
                Some(code) => write!(f, "test '{}' failed with exit code {}", node_id, code),
                None => write!(f, "test '{}' was terminated", node_id),
            },
            CommandFailed::Profile { command, exit_code } => match exit_code {
                Some(code) => write!(f, "profiling run '{}' failed with exit code {}", command, code),
                None => write!(f, "profiling run '{}' was terminated", command),
            },
            CommandFailed::Interrupted => write!(f, "run interrupted"),
        }
    }
}

impl std::error::Error for CommandFailed {}
