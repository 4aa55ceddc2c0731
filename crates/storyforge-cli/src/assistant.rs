//! Bridges the Copilot CLI driver into the core pipeline.
//!
//! `copilot-agent` keeps its own error taxonomy; this adapter folds it
//! into core's so the pipeline never learns about transport details.

use async_trait::async_trait;
use copilot_agent::{CopilotError, LaunchOptions, SessionManager};
use storyforge_core::config::CopilotSettings;
use storyforge_core::pipeline::{AssistantBackend, AssistantProbe};
use storyforge_core::{CoreError, Result};

pub struct CopilotBackend {
    manager: SessionManager,
}

impl CopilotBackend {
    /// Fails with `ConfigurationError` when the platform needs launch
    /// environment the user has not supplied.
    pub fn new(settings: &CopilotSettings) -> Result<Self> {
        let manager = SessionManager::new(LaunchOptions {
            cli_path: settings.cli_path.clone(),
            token: settings.token.clone(),
        })
        .map_err(map_err)?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl AssistantBackend for CopilotBackend {
    async fn send_prompt(&self, prompt: &str) -> Result<String> {
        self.manager.send_prompt(prompt).await.map_err(map_err)
    }

    async fn probe_auth_status(&self) -> Result<AssistantProbe> {
        let status = self.manager.probe_auth_status().await.map_err(map_err)?;
        Ok(AssistantProbe {
            authenticated: status.auth.is_authenticated,
            login: status.auth.login,
            auth_type: status.auth.auth_type,
            status_message: status.auth.status_message,
            client_version: status.client.version,
            protocol_version: status.client.protocol_version,
        })
    }

    async fn reset(&self) {
        self.manager.reset().await;
    }
}

fn map_err(e: CopilotError) -> CoreError {
    match e {
        CopilotError::Config(m) => CoreError::ConfigurationError(m),
        CopilotError::Unavailable(m) => CoreError::AssistantUnavailable(m),
        CopilotError::Exchange(m) => CoreError::GenerationFailure(m),
        other => CoreError::AssistantUnavailable(other.to_string()),
    }
}
