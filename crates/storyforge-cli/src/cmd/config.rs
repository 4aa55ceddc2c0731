use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use storyforge_core::config::Settings;

use crate::output::print_json;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current settings with secrets redacted
    Show,

    /// Set one settings field by dotted key
    Set {
        /// Key, e.g. tracker.organization_url or copilot.token
        key: String,
        value: String,
    },

    /// Print the settings file location
    Path,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(config: Option<&Path>, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(config, json),
        ConfigSubcommand::Set { key, value } => set(config, &key, &value),
        ConfigSubcommand::Path => path(config),
    }
}

fn resolve_path(config: Option<&Path>) -> anyhow::Result<PathBuf> {
    match config {
        Some(p) => Ok(p.to_path_buf()),
        None => Settings::config_path().context("failed to locate the settings file"),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(config: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let path = resolve_path(config)?;
    let settings = Settings::load_from(&path).context("failed to load settings")?;
    let redacted = settings.redacted();

    if json {
        return print_json(&redacted);
    }
    print!("{}", serde_yaml::to_string(&redacted)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// set
// ---------------------------------------------------------------------------

fn set(config: Option<&Path>, key: &str, value: &str) -> anyhow::Result<()> {
    let path = resolve_path(config)?;
    let mut settings = Settings::load_from(&path).context("failed to load settings")?;
    settings.set(key, value)?;
    settings.save_to(&path).context("failed to save settings")?;
    println!("Set {key}.");
    Ok(())
}

// ---------------------------------------------------------------------------
// path
// ---------------------------------------------------------------------------

fn path(config: Option<&Path>) -> anyhow::Result<()> {
    println!("{}", resolve_path(config)?.display());
    Ok(())
}
