//! # HTML Reporting Module / HTML 报告模块
//!
//! Renders a run report to a standalone HTML page with `maud`.
//!
//! 使用 `maud` 将运行报告渲染为独立的 HTML 页面。

use anyhow::Result;
use maud::{DOCTYPE, Markup, html};
use std::path::Path;

use crate::core::models::{RunReport, TestResult};
use crate::infra::{fs::write_file, t};

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif; margin: 2em; color: #222; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #ddd; padding: 6px 10px; text-align: left; vertical-align: top; }
th { background: #f4f4f4; }
.status-Passed { color: #1a7f37; font-weight: bold; }
.status-Failed { color: #cf222e; font-weight: bold; }
.status-Skipped { color: #6e7781; }
pre { background: #f6f8fa; padding: 8px; overflow-x: auto; max-height: 30em; }
"#;

/// Renders the report as an HTML document.
pub fn render_html_report(report: &RunReport, locale: &str) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (t!("html_report.title", locale = locale)) }
                style { (HTML_STYLE) }
            }
            body {
                h1 { (t!("html_report.title", locale = locale)) }
                p {
                    (t!(
                        "html_report.generated",
                        locale = locale,
                        started = report.started_at.format("%Y-%m-%d %H:%M:%S"),
                        finished = report.finished_at.format("%Y-%m-%d %H:%M:%S")
                    ))
                }
                p {
                    (t!(
                        "summary_counts",
                        locale = locale,
                        executed = report.executed_count(),
                        passed = report.passed_count(),
                        skipped = report.skipped_count()
                    ))
                }
                table {
                    thead {
                        tr {
                            th { (t!("html_report.status", locale = locale)) }
                            th { (t!("html_report.test", locale = locale)) }
                            th { (t!("html_report.location", locale = locale)) }
                            th { (t!("html_report.duration", locale = locale)) }
                            th { (t!("html_report.output", locale = locale)) }
                        }
                    }
                    tbody {
                        @for result in &report.results {
                            (render_row(result, locale))
                        }
                    }
                }
                @if let Some(profile) = &report.profile {
                    h2 { (t!("report.profile_row", locale = locale)) }
                    p class=(if profile.success { "status-Passed" } else { "status-Failed" }) {
                        code { (profile.command) }
                    }
                    @if !profile.output.is_empty() {
                        pre { (profile.output) }
                    }
                }
            }
        }
    }
}

fn render_row(result: &TestResult, locale: &str) -> Markup {
    let test = result.test();
    html! {
        tr {
            td class=(result.get_status_class()) { (result.get_status_str(locale)) }
            td { code { (test.node_id()) } }
            td { (test.location()) }
            td {
                @if let Some(duration) = result.get_duration() {
                    (format!("{:.2?}", duration))
                } @else {
                    "N/A"
                }
            }
            td {
                @if !result.get_output().is_empty() {
                    details {
                        summary { (t!("html_report.show_output", locale = locale)) }
                        pre { (result.get_output()) }
                    }
                }
            }
        }
    }
}

/// Generates an HTML report file from the run report.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn generate_html_report(report: &RunReport, output_path: &Path, locale: &str) -> Result<()> {
    let markup = render_html_report(report, locale);
    write_file(output_path, &markup.into_string())
}
