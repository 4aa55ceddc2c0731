pub mod auth;
pub mod config;
pub mod push;
pub mod stories;
pub mod testcases;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use storyforge_core::adapters::{AzureDevOpsTracker, ConfluenceWiki};
use storyforge_core::config::Settings;
use storyforge_core::pipeline::Pipeline;

use crate::assistant::CopilotBackend;

pub fn load_settings(config: Option<&Path>) -> anyhow::Result<Settings> {
    match config {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("failed to load settings from {}", path.display())),
        None => Settings::load().context("failed to load settings"),
    }
}

pub fn build_pipeline(settings: &Settings) -> anyhow::Result<Pipeline> {
    let tracker = Arc::new(AzureDevOpsTracker::new(&settings.tracker));
    let wiki = Arc::new(ConfluenceWiki::new(&settings.wiki));
    let assistant = Arc::new(CopilotBackend::new(&settings.copilot)?);
    Ok(Pipeline::new(tracker, wiki, assistant))
}

pub fn require_tracker(settings: &Settings) -> anyhow::Result<()> {
    if settings.tracker.organization_url.trim().is_empty()
        || settings.tracker.pat.trim().is_empty()
    {
        anyhow::bail!(
            "tracker settings are incomplete; set tracker.organization_url and tracker.pat with 'storyforge config set'"
        );
    }
    Ok(())
}

pub fn require_wiki(settings: &Settings) -> anyhow::Result<()> {
    if settings.wiki.base_url.trim().is_empty() || settings.wiki.token.trim().is_empty() {
        anyhow::bail!(
            "wiki settings are incomplete; set wiki.base_url and wiki.token with 'storyforge config set'"
        );
    }
    Ok(())
}
