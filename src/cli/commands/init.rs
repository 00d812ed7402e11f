//! # Configuration Initialization Module / 配置初始化模块
//!
//! Creates a `SpecialTests.toml` file, either with defaults or through an
//! interactive wizard.
//!
//! 创建 `SpecialTests.toml` 文件，可以使用默认值，也可以通过交互式向导。

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{Confirm, Input, theme::ColorfulTheme};
use std::path::{Path, PathBuf};

use crate::core::config::{Blocklist, ProfileConfig, SpecialTestConfig};
use crate::infra::{fs::write_file, t};

/// Runs the wizard (or writes defaults) and saves the configuration to `config_path`.
///
/// An existing file is only overwritten with `force` or after confirmation.
pub fn run_init_wizard(
    config_path: &Path,
    force: bool,
    non_interactive: bool,
    language: &str,
) -> Result<()> {
    let theme = ColorfulTheme::default();

    if !non_interactive {
        println!("\n{}", t!("init_wizard_welcome", locale = language).cyan().bold());
        println!("{}", t!("init_wizard_description", locale = language));
    }

    if config_path.exists() && !force {
        if non_interactive {
            println!(
                "{}",
                t!("init_file_exists", locale = language, path = config_path.display()).red()
            );
            println!("{}", t!("init_use_force", locale = language).yellow());
            return Ok(());
        }
        let confirmation = Confirm::with_theme(&theme)
            .with_prompt(t!("init_overwrite_prompt", locale = language, path = config_path.display()))
            .default(false)
            .interact()
            .context(t!("init_user_confirmation_failed", locale = language).to_string())?;
        if !confirmation {
            println!("{}", t!("init_aborted", locale = language));
            return Ok(());
        }
    }

    let config = if non_interactive {
        SpecialTestConfig::default()
    } else {
        prompt_config(&theme, language)?
    };

    write_config(config_path, &config, language)
}

fn prompt_config(theme: &ColorfulTheme, language: &str) -> Result<SpecialTestConfig> {
    let defaults = SpecialTestConfig::default();
    let failed = || t!("init_user_confirmation_failed", locale = language).to_string();

    let roots: String = Input::with_theme(theme)
        .with_prompt(t!("init_roots_prompt", locale = language))
        .default("tests".to_string())
        .interact_text()
        .with_context(failed)?;

    let marker: String = Input::with_theme(theme)
        .with_prompt(t!("init_marker_prompt", locale = language))
        .default(defaults.marker.clone())
        .interact_text()
        .with_context(failed)?;

    let runner: String = Input::with_theme(theme)
        .with_prompt(t!("init_runner_prompt", locale = language))
        .default(defaults.runner.clone())
        .interact_text()
        .with_context(failed)?;

    let blocklist: String = Input::with_theme(theme)
        .with_prompt(t!("init_blocklist_prompt", locale = language))
        .default(defaults.blocklist.iter().collect::<Vec<_>>().join(" "))
        .allow_empty(true)
        .interact_text()
        .with_context(failed)?;

    let with_profile = Confirm::with_theme(theme)
        .with_prompt(t!("init_profile_prompt", locale = language))
        .default(true)
        .interact()
        .with_context(failed)?;

    let profile = match (with_profile, defaults.profile.clone()) {
        (true, Some(default_profile)) => {
            let wrapper: String = Input::with_theme(theme)
                .with_prompt(t!("init_profile_wrapper_prompt", locale = language))
                .default(default_profile.wrapper)
                .interact_text()
                .with_context(failed)?;
            let target: String = Input::with_theme(theme)
                .with_prompt(t!("init_profile_target_prompt", locale = language))
                .default(default_profile.target)
                .interact_text()
                .with_context(failed)?;
            Some(ProfileConfig { wrapper, target })
        }
        _ => None,
    };

    Ok(SpecialTestConfig {
        language: Some(language.to_string()),
        roots: roots
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(PathBuf::from)
            .collect(),
        marker,
        runner,
        blocklist: Blocklist::from_words(&blocklist),
        profile,
        ..defaults
    })
}

/// Serializes the configuration and writes it to `path`.
pub fn write_config(path: &Path, config: &SpecialTestConfig, language: &str) -> Result<()> {
    let toml_string = toml::to_string_pretty(config)
        .context(t!("init_serialize_failed", locale = language).to_string())?;

    write_file(path, &toml_string)
        .with_context(|| t!("init_write_failed", locale = language, path = path.display()).to_string())?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init_success_created", locale = language, path = path.display()).bold()
    );
    println!("{}", t!("init_usage_hint", locale = language));

    Ok(())
}
