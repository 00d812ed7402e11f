//! # Test Execution Engine Module / 测试执行引擎模块
//!
//! Runs the planned tests one at a time, each in its own process, and stops at
//! the first failure. When every test passes, the trailing profiling command
//! runs exactly once.
//!
//! 逐个运行计划中的测试，每个测试在自己的进程中运行，并在第一次失败时停止。
//! 当所有测试都通过时，末尾的性能分析命令恰好运行一次。

use anyhow::{Context, Result};
use chrono::Local;
use colored::*;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitStatus;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::core::config::SpecialTestConfig;
use crate::core::models::{
    DiscoveredTest, FailureReason, ProfileResult, RunReport, SkipReason, TestResult,
};
use crate::core::planner::{ExecutionPlan, PlannedAction};
use crate::infra::command::{self, CommandLine};
use crate::infra::t;

/// The trailing profiling invocation, already parsed.
#[derive(Debug, Clone)]
pub struct ProfileRun {
    pub wrapper: CommandLine,
    pub target: String,
}

/// Everything needed to launch the test commands.
/// 启动测试命令所需的一切。
#[derive(Debug)]
pub struct ExecutionContext<'a> {
    pub project_root: &'a Path,
    pub runner: CommandLine,
    pub env: &'a BTreeMap<String, String>,
    pub profile: Option<ProfileRun>,
    pub stop_token: CancellationToken,
    pub locale: &'a str,
}

impl<'a> ExecutionContext<'a> {
    /// Parses the runner and profile commands from the configuration.
    ///
    /// `with_profile = false` leaves the profiling run out.
    pub fn from_config(
        config: &'a SpecialTestConfig,
        project_root: &'a Path,
        with_profile: bool,
        stop_token: CancellationToken,
        locale: &'a str,
    ) -> Result<Self> {
        let runner = CommandLine::parse(&config.runner).context("Invalid `runner` command")?;
        let profile = match (&config.profile, with_profile) {
            (Some(profile), true) => Some(ProfileRun {
                wrapper: CommandLine::parse(&profile.wrapper)
                    .context("Invalid `profile.wrapper` command")?,
                target: profile.target.clone(),
            }),
            _ => None,
        };
        Ok(Self {
            project_root,
            runner,
            env: &config.env,
            profile,
            stop_token,
            locale,
        })
    }

    /// The command line for a single test.
    pub fn test_command(&self, test: &DiscoveredTest) -> CommandLine {
        self.runner.with_arg(test.node_id())
    }

    /// The command line for the profiling run, if one is configured.
    pub fn profile_command(&self) -> Option<CommandLine> {
        self.profile
            .as_ref()
            .map(|p| self.runner.with_arg(p.target.clone()).wrapped_by(&p.wrapper))
    }
}

/// How a single child process ended.
enum Completion {
    Exited {
        status: ExitStatus,
        output: String,
        duration: Duration,
    },
    Interrupted {
        duration: Duration,
    },
}

/// Runs every planned test in order, then the profiling command.
///
/// Fail-fast: after the first failure the remaining tests are reported as
/// not reached and the profiling command does not run. A failing command is
/// not an `Err`; the caller inspects [`RunReport::failure`]. `Err` is kept for
/// problems launching a command at all.
///
/// 快速失败：第一次失败后，其余测试被报告为未到达，性能分析命令不会运行。
pub async fn run_plan(plan: ExecutionPlan, ctx: &ExecutionContext<'_>) -> Result<RunReport> {
    let started_at = Local::now();
    let mut results = Vec::with_capacity(plan.entries.len());
    let mut halted = false;
    let mut interrupted = false;

    for entry in plan.entries {
        let result = match entry.action {
            PlannedAction::Skip(reason) => {
                if reason == SkipReason::Blocklisted {
                    println!(
                        "{}",
                        t!("run.test_blocklisted", locale = ctx.locale, name = entry.test.node_id())
                            .dimmed()
                    );
                }
                TestResult::Skipped {
                    test: entry.test,
                    reason,
                }
            }
            PlannedAction::Run if halted => TestResult::Skipped {
                test: entry.test,
                reason: SkipReason::NotReached,
            },
            PlannedAction::Run => {
                let result = run_single_test(entry.test, ctx).await?;
                if let TestResult::Failed { reason, .. } = &result {
                    halted = true;
                    interrupted = *reason == FailureReason::Interrupted;
                }
                result
            }
        };
        results.push(result);
    }

    let profile = match ctx.profile_command() {
        Some(line) if !halted => run_profile(line, ctx).await?,
        _ => None,
    };
    // The profile only goes missing after a clean run when Ctrl-C cut it off.
    let interrupted = interrupted || (!halted && ctx.profile.is_some() && profile.is_none());

    Ok(RunReport {
        started_at,
        finished_at: Local::now(),
        results,
        profile,
        interrupted,
    })
}

/// Runs one test scoped to its node id.
pub async fn run_single_test(test: DiscoveredTest, ctx: &ExecutionContext<'_>) -> Result<TestResult> {
    let line = ctx.test_command(&test);
    println!(
        "{}",
        t!("run.running_test", locale = ctx.locale, name = test.node_id()).blue()
    );

    let result = match execute(&line, ctx).await? {
        Completion::Interrupted { duration } => {
            println!(
                "{}",
                t!("run.test_interrupted", locale = ctx.locale, name = test.node_id()).yellow()
            );
            TestResult::Failed {
                test,
                output: String::new(),
                reason: FailureReason::Interrupted,
                exit_code: None,
                duration,
            }
        }
        Completion::Exited {
            status,
            output,
            duration,
        } if status.success() => {
            println!(
                "{}",
                t!(
                    "run.test_passed",
                    locale = ctx.locale,
                    name = test.node_id(),
                    duration = format!("{:.2}", duration.as_secs_f64())
                )
                .green()
            );
            TestResult::Passed {
                test,
                output,
                duration,
            }
        }
        Completion::Exited {
            status,
            output,
            duration,
        } => {
            let exit_code = status.code();
            println!(
                "{}",
                t!(
                    "run.test_failed",
                    locale = ctx.locale,
                    name = test.node_id(),
                    code = describe_exit(exit_code)
                )
                .red()
            );
            TestResult::Failed {
                test,
                output,
                reason: match exit_code {
                    Some(_) => FailureReason::TestFailed,
                    None => FailureReason::Terminated,
                },
                exit_code,
                duration,
            }
        }
    };
    Ok(result)
}

/// Runs the profiling command. Returns `None` if the run was interrupted first.
async fn run_profile(line: CommandLine, ctx: &ExecutionContext<'_>) -> Result<Option<ProfileResult>> {
    if ctx.stop_token.is_cancelled() {
        return Ok(None);
    }
    println!("{}", t!("run.running_profile", locale = ctx.locale).blue());

    match execute(&line, ctx).await? {
        Completion::Interrupted { .. } => Ok(None),
        Completion::Exited {
            status,
            output,
            duration,
        } => {
            let success = status.success();
            if success {
                println!("{}", t!("run.profile_done", locale = ctx.locale).green());
            } else {
                println!(
                    "{}",
                    t!("run.profile_failed", locale = ctx.locale, code = describe_exit(status.code()))
                        .red()
                );
            }
            Ok(Some(ProfileResult {
                command: line.to_string(),
                output,
                exit_code: status.code(),
                success,
                duration,
            }))
        }
    }
}

/// Spawns `line` and waits for it, unless Ctrl-C arrives first.
async fn execute(line: &CommandLine, ctx: &ExecutionContext<'_>) -> Result<Completion> {
    println!("{} {}", t!("run.command_prefix", locale = ctx.locale).blue(), line);

    let cmd = line.to_command(ctx.project_root, ctx.env);
    let start_time = Instant::now();

    // Dropping the spawn future drops the child, and `kill_on_drop` stops it.
    let finished = tokio::select! {
        biased;
        _ = ctx.stop_token.cancelled() => None,
        res = command::spawn_and_stream(cmd) => Some(res),
    };
    let duration = start_time.elapsed();

    let Some((status_res, output)) = finished else {
        return Ok(Completion::Interrupted { duration });
    };
    let status = status_res.with_context(|| format!("Failed to run command: {line}"))?;

    Ok(Completion::Exited {
        status,
        output,
        duration,
    })
}

fn describe_exit(code: Option<i32>) -> String {
    code.map(|c| c.to_string())
        .unwrap_or_else(|| "signal".to_string())
}
