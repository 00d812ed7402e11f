//! # Special Runner Library / Special Runner 库
//!
//! This library provides the core functionality for the Special Runner tool,
//! which discovers tests that must run in isolated processes and executes
//! them one at a time through an external test runner.
//!
//! 此库为 Special Runner 工具提供核心功能，
//! 它发现需要在独立进程中运行的测试，并通过外部测试运行器逐个执行它们。
//!
//! ## Modules / 模块
//!
//! - `core` - Data models, configuration, discovery, planning and execution
//! - `infra` - Infrastructure services like command execution and file system operations
//! - `reporting` - Console, HTML and JSON reports
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 数据模型、配置、发现、计划和执行
//! - `infra` - 基础设施服务，如命令执行和文件系统操作
//! - `reporting` - 控制台、HTML 和 JSON 报告
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::discovery;
pub use crate::core::execution;
pub use crate::core::models;

/// Detects the language to use from the system locale.
///
/// Tries the full locale first (e.g., "zh-CN"), then just the language code
/// (e.g., "en"), and finally falls back to "en".
pub fn detect_locale() -> String {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    if available_locales.contains(&locale.as_str()) {
        return locale;
    }
    locale
        .split('-')
        .next()
        .filter(|lang_code| available_locales.contains(lang_code))
        .unwrap_or("en")
        .to_string()
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
