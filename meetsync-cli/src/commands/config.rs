use std::path::Path;

use anyhow::{Context, Result};
use meetsync_core::Settings;
use owo_colors::OwoColorize;

pub fn run(settings: &Settings, config_override: Option<&Path>) -> Result<()> {
    let config_path = match config_override {
        Some(path) => path.to_path_buf(),
        None => Settings::config_path()?,
    };

    println!("{}", "Paths".bold());
    println!("  Config:  {}", config_path.display());
    println!("  Ledger:  {}", settings.ledger_path()?.display());
    match settings.log_file() {
        Some(log_file) => println!("  Log:     {}", log_file.display()),
        None => println!("  Log:     {}", "(terminal only)".dimmed()),
    }

    let rendered = toml::to_string_pretty(settings).context("failed to render settings")?;
    println!();
    println!("{}", "Settings".bold());
    for line in rendered.lines() {
        println!("  {line}");
    }

    if settings.source.is_none() {
        println!();
        println!(
            "{}",
            format!("No [source] configured. Add one to {}", config_path.display()).yellow()
        );
    }

    Ok(())
}

/// Shown on the first run, when `Settings::load` wrote the default file.
pub fn created_notice(path: &Path) -> String {
    format!(
        "{} {}\n   {}",
        "Created default config at".green(),
        path.display(),
        "Add a [source] section to start syncing.".dimmed()
    )
}
