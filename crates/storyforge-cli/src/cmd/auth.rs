use std::path::Path;

use anyhow::Context;
use storyforge_core::pipeline::Pipeline;

use crate::output::print_json;

pub async fn run(config: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let settings = super::load_settings(config)?;
    let pipeline = super::build_pipeline(&settings)?;

    let result = probe(&pipeline, json).await;
    pipeline.reset_assistant().await;
    result
}

async fn probe(pipeline: &Pipeline, json: bool) -> anyhow::Result<()> {
    let probe = pipeline
        .check_assistant_auth()
        .await
        .context("failed to reach the Copilot CLI")?;

    if json {
        return print_json(&probe);
    }

    if probe.authenticated {
        println!(
            "Authenticated as {}",
            probe.login.as_deref().unwrap_or("(unknown)")
        );
    } else {
        println!("Not authenticated.");
        if let Some(msg) = &probe.status_message {
            println!("{msg}");
        }
    }
    if let Some(auth_type) = &probe.auth_type {
        println!("Auth type:        {auth_type}");
    }
    println!("Client version:   {}", probe.client_version);
    println!("Protocol version: {}", probe.protocol_version);
    Ok(())
}
