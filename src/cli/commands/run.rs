//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command: discover the special tests,
//! run each one in its own process until the first failure, run the profiling
//! command, then report.
//!
//! 此模块实现了 `run` 命令：发现特殊测试，在第一次失败之前逐个在独立进程中运行，
//! 运行性能分析命令，然后生成报告。

use anyhow::Result;
use colored::*;
use std::path::PathBuf;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use super::Session;
use crate::{
    core::{
        execution::{ExecutionContext, run_plan},
        models::SkipReason,
        planner,
    },
    infra::t,
    reporting::{generate_html_report, print_failure_details, print_summary, write_json_report},
};

/// Arguments of the `run` command.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub config: PathBuf,
    pub project_dir: PathBuf,
    pub filter: Option<String>,
    pub no_profile: bool,
    pub html: Option<PathBuf>,
    pub json: Option<PathBuf>,
    pub lang: Option<String>,
}

/// Executes the run command with the provided arguments.
///
/// # Returns
/// `Ok` when every command succeeded. A failing command is returned as a
/// [`CommandFailed`](crate::core::models::CommandFailed) error after the
/// summary has been printed.
pub async fn execute(options: RunOptions) -> Result<()> {
    let session = Session::open(&options.config, &options.project_dir, options.lang.clone())?;
    let locale = session.locale.as_str();

    println!(
        "{}",
        t!("project_root_detected", locale = locale, path = session.project_root.display())
    );
    println!(
        "{}",
        t!("loading_config", locale = locale, path = session.config_path.display())
    );

    let tests = session.discover()?;
    println!(
        "{}",
        t!("discovered_tests", locale = locale, count = tests.len()).cyan()
    );

    let plan = planner::plan_execution(tests, &session.config.blocklist, options.filter.as_deref());
    let blocklisted = plan.skipped_count(SkipReason::Blocklisted);
    if blocklisted > 0 {
        println!(
            "{}",
            t!("blocklisted_tests", locale = locale, count = blocklisted).yellow()
        );
    }
    let filtered = plan.skipped_count(SkipReason::Filtered);
    if filtered > 0 {
        println!(
            "{}",
            t!("filtered_tests", locale = locale, count = filtered).cyan()
        );
    }
    if plan.run_count() == 0 {
        println!("{}", t!("no_tests_to_run", locale = locale).green());
    }

    let stop_token = setup_signal_handler(locale);
    let ctx = ExecutionContext::from_config(
        &session.config,
        &session.project_root,
        !options.no_profile,
        stop_token,
        locale,
    )?;

    let report = run_plan(plan, &ctx).await?;

    print_summary(&report, locale);

    if let Some(report_path) = &options.html {
        println!(
            "\n{}",
            t!("generating_html_report", locale = locale, path = report_path.display())
        );
        if let Err(e) = generate_html_report(&report, report_path, locale) {
            eprintln!("{} {:#}", t!("html_report_failed", locale = locale).red(), e);
        }
    }
    if let Some(report_path) = &options.json {
        if let Err(e) = write_json_report(&report, report_path) {
            eprintln!("{} {:#}", t!("json_report_failed", locale = locale).red(), e);
        }
    }

    match report.failure() {
        Some(failure) => {
            print_failure_details(&report, locale);
            println!("\n{}", t!("run_failed", locale = locale, reason = &failure).red().bold());
            Err(failure.into())
        }
        None => {
            println!("\n{}", t!("all_tests_passed", locale = locale).green().bold());
            Ok(())
        }
    }
}

fn setup_signal_handler(locale: &str) -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();
    let locale = locale.to_string();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("shutdown_signal", locale = &locale).yellow());
            token_clone.cancel();
        }
    });

    token
}
