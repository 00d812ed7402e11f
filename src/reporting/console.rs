//! # Console Reporting Module / 控制台报告模块
//!
//! Prints the execution plan, the end-of-run summary and the output of the
//! command that stopped the run.
//!
//! 打印执行计划、运行结束摘要以及停止运行的命令的输出。

use colored::*;

use crate::core::models::{RunReport, SkipReason, TestResult};
use crate::core::planner::{ExecutionPlan, PlannedAction};
use crate::infra::t;

/// Prints what a run would do, without running anything.
///
/// ```text
/// --- Special Tests ---
///   - Run          | tests/test_ddp.py:41               | tests/test_ddp.py::test_ddp_spawn
///   - Blocklisted  | tests/test_profiler.py:12          | tests/test_profiler.py::test_nvtx
/// ```
pub fn print_plan(plan: &ExecutionPlan, locale: &str) {
    println!("\n{}", t!("plan_banner", locale = locale).bold());

    for entry in &plan.entries {
        let status = match entry.action {
            PlannedAction::Run => t!("report.status_run", locale = locale).green(),
            PlannedAction::Skip(SkipReason::Blocklisted) => {
                t!("report.status_blocklisted", locale = locale).yellow()
            }
            PlannedAction::Skip(SkipReason::Filtered) => {
                t!("report.status_filtered", locale = locale).dimmed()
            }
            PlannedAction::Skip(SkipReason::NotReached) => {
                t!("report.status_not_reached", locale = locale).dimmed()
            }
        };
        println!(
            "  - {:<14} | {:<40} | {}",
            status,
            entry.test.location(),
            entry.test.node_id()
        );
    }

    println!(
        "\n{}",
        t!(
            "plan_counts",
            locale = locale,
            run = plan.run_count(),
            blocklisted = plan.skipped_count(SkipReason::Blocklisted),
            filtered = plan.skipped_count(SkipReason::Filtered)
        )
    );
}

/// Prints a formatted summary of the run to the console.
///
/// ```text
/// --- Special Test Summary ---
///   - Passed        | tests/test_ddp.py::test_ddp_spawn            |      3.21s
///   - Failed        | tests/test_ddp.py::test_ddp_sharded          |      0.45s
///   - Not Reached   | tests/test_amp.py::test_amp_gpus             |        N/A
/// ```
pub fn print_summary(report: &RunReport, locale: &str) {
    println!("\n{}", t!("test_summary_banner", locale = locale).bold());

    for result in &report.results {
        let status_str = result.get_status_str(locale);
        let duration_str = result
            .get_duration()
            .map(|d| format!("{:.2?}", d))
            .unwrap_or_else(|| "N/A".to_string());

        let status_colored = match result {
            TestResult::Passed { .. } => status_str.green(),
            TestResult::Failed { .. } => status_str.red(),
            TestResult::Skipped {
                reason: SkipReason::Blocklisted,
                ..
            } => status_str.yellow(),
            TestResult::Skipped { .. } => status_str.dimmed(),
        };

        println!(
            "  - {:<14} | {:<50} | {:>10}",
            status_colored,
            result.test().node_id(),
            duration_str
        );
    }

    if let Some(profile) = &report.profile {
        let status = if profile.success {
            t!("report.status_passed", locale = locale).green()
        } else {
            t!("report.status_failed", locale = locale).red()
        };
        println!(
            "  - {:<14} | {:<50} | {:>10}",
            status,
            t!("report.profile_row", locale = locale),
            format!("{:.2?}", profile.duration)
        );
    }

    println!(
        "\n{}",
        t!(
            "summary_counts",
            locale = locale,
            executed = report.executed_count(),
            passed = report.passed_count(),
            skipped = report.skipped_count()
        )
    );
}

/// Prints the captured output of the command that stopped the run.
pub fn print_failure_details(report: &RunReport, locale: &str) {
    let Some(TestResult::Failed { test, output, .. }) = report.first_failure() else {
        if let Some(profile) = report.profile.as_ref().filter(|p| !p.success) {
            println!("\n{}", t!("failure_banner", locale = locale).red().bold());
            println!("{}", "-".repeat(80));
            println!("{} '{}'", t!("report_header_profile", locale = locale).red(), profile.command.cyan());
            println!("\n--- {} ---\n", t!("test_log", locale = locale).yellow());
            println!("{}", profile.output);
            println!("{}", "-".repeat(80));
        }
        return;
    };

    println!("\n{}", t!("failure_banner", locale = locale).red().bold());
    println!("{}", "-".repeat(80));
    println!(
        "{} '{}'",
        t!("report_header_failure", locale = locale).red(),
        test.node_id().cyan()
    );
    println!("\n--- {} ---\n", t!("test_log", locale = locale).yellow());
    if output.trim().is_empty() {
        println!("{}", t!("no_error_output", locale = locale).dimmed());
    } else {
        println!("{}", output);
    }
    println!("{}", "-".repeat(80));
}
