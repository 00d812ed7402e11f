//! # CLI Commands / CLI 命令
//!
//! - `run` - Discover special tests and run them one by one
//! - `list` - Show what `run` would do
//! - `init` - Create a configuration file

pub mod init;
pub mod list;
pub mod run;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::core::config::{SourceKind, SpecialTestConfig};
use crate::core::discovery::{MarkerScan, TestSource};
use crate::core::models::DiscoveredTest;
use crate::core::registry::TaggedRegistry;
use crate::infra::fs;

/// Configuration, project root and locale shared by `run` and `list`.
pub(crate) struct Session {
    pub config: SpecialTestConfig,
    pub config_path: PathBuf,
    pub project_root: PathBuf,
    pub locale: String,
}

impl Session {
    /// Loads the configuration and picks the locale: `--lang`, then the
    /// config's `language`, then whatever was detected at startup.
    pub fn open(config: &Path, project_dir: &Path, lang: Option<String>) -> Result<Self> {
        let startup_locale = rust_i18n::locale().to_string();
        let (config, config_path) = fs::load_config(config, &startup_locale)?;
        let locale = lang
            .or_else(|| config.language.clone())
            .unwrap_or(startup_locale);
        rust_i18n::set_locale(&locale);

        let project_root = fs::resolve_project_dir(project_dir, &locale)?;
        Ok(Self {
            config,
            config_path,
            project_root,
            locale,
        })
    }

    /// Discovers tests from the configured source.
    pub fn discover(&self) -> Result<Vec<DiscoveredTest>> {
        match self.config.source {
            SourceKind::Scan => MarkerScan::new(&self.project_root, &self.config)?.discover(),
            SourceKind::Registry => TaggedRegistry::new(&self.config).discover(),
        }
    }
}
