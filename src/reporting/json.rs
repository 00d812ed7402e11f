//! # JSON Reporting Module / JSON 报告模块
//!
//! Serializes the run report for CI tooling.

use anyhow::{Context, Result};
use std::path::Path;

use crate::core::models::RunReport;
use crate::infra::fs::write_file;

/// Writes the report as pretty-printed JSON.
pub fn write_json_report(report: &RunReport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize run report")?;
    write_file(output_path, &json)
}
