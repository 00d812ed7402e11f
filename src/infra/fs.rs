//! # File System Operations Module / 文件系统操作模块
//!
//! Loading the configuration, resolving the project directory and writing
//! report files.
//!
//! 加载配置、解析项目目录以及写入报告文件。

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::config::SpecialTestConfig;
use crate::infra::t;

/// Reads and parses a configuration file.
///
/// # Returns
/// The parsed configuration and its canonical path.
pub fn load_config(config_path: &Path, locale: &str) -> Result<(SpecialTestConfig, PathBuf)> {
    let config_path = absolute_path(config_path)
        .with_context(|| t!("config_read_failed_path", locale = locale, path = config_path.display()).to_string())?;

    let content = fs::read_to_string(&config_path)
        .with_context(|| t!("config_read_failed_path", locale = locale, path = config_path.display()).to_string())?;

    let config: SpecialTestConfig = toml::from_str(&content)
        .with_context(|| t!("config_parse_failed", locale = locale, path = config_path.display()).to_string())?;

    Ok((config, config_path))
}

/// Resolves the project directory to an absolute path.
pub fn resolve_project_dir(project_dir: &Path, locale: &str) -> Result<PathBuf> {
    let root = absolute_path(project_dir)
        .with_context(|| t!("project_dir_not_found", locale = locale, path = project_dir.display()).to_string())?;
    if !root.is_dir() {
        anyhow::bail!(t!("project_dir_not_found", locale = locale, path = root.display()).to_string());
    }
    Ok(root)
}

/// Writes `content` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write file: {}", path.display()))
}

/// Gets the absolute path from a potentially relative path.
///
/// # Returns
/// Canonicalized absolute path, or an error if the path doesn't exist
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {}", path.display()))
}
