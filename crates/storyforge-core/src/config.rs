use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// TrackerSettings
// ---------------------------------------------------------------------------

/// Azure DevOps connection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerSettings {
    /// Organization URL, e.g. `https://dev.azure.com/acme`.
    #[serde(default)]
    pub organization_url: String,
    /// Default project; creates resolve the actual project from the parent
    /// work item, this is informational.
    #[serde(default)]
    pub project: String,
    /// Personal access token.
    #[serde(default)]
    pub pat: String,
}

// ---------------------------------------------------------------------------
// WikiSettings
// ---------------------------------------------------------------------------

/// Confluence connection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WikiSettings {
    /// Site base URL; `/wiki` is appended automatically when missing.
    #[serde(default)]
    pub base_url: String,
    /// Account email for Basic auth. When empty, `token` is sent as a
    /// Bearer token instead.
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub token: String,
}

// ---------------------------------------------------------------------------
// CopilotSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CopilotSettings {
    /// Custom path to the Copilot CLI executable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_path: Option<String>,
    /// Token exported to the CLI subprocess.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

// ---------------------------------------------------------------------------
// Settings (top-level)
// ---------------------------------------------------------------------------

/// The settings blob, stored as YAML at `~/.storyforge/config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub tracker: TrackerSettings,
    #[serde(default)]
    pub wiki: WikiSettings,
    #[serde(default)]
    pub copilot: CopilotSettings,
}

impl Settings {
    pub fn config_path() -> Result<PathBuf> {
        let h = home::home_dir().ok_or(CoreError::HomeNotFound)?;
        Ok(h.join(".storyforge").join("config.yaml"))
    }

    /// Load from the default location; a missing file yields defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&data)?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }

    /// Assign one field by its dotted key, as used by `config set`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "tracker.organization_url" => self.tracker.organization_url = value.into(),
            "tracker.project" => self.tracker.project = value.into(),
            "tracker.pat" => self.tracker.pat = value.into(),
            "wiki.base_url" => self.wiki.base_url = value.into(),
            "wiki.user" => self.wiki.user = value.into(),
            "wiki.token" => self.wiki.token = value.into(),
            "copilot.cli_path" => self.copilot.cli_path = Some(value.into()),
            "copilot.token" => self.copilot.token = Some(value.into()),
            _ => {
                return Err(CoreError::ConfigurationError(format!(
                    "unknown settings key '{key}'"
                )))
            }
        }
        Ok(())
    }

    /// A copy with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mut s = self.clone();
        if !s.tracker.pat.is_empty() {
            s.tracker.pat = REDACTED.into();
        }
        if !s.wiki.token.is_empty() {
            s.wiki.token = REDACTED.into();
        }
        if s.copilot.token.is_some() {
            s.copilot.token = Some(REDACTED.into());
        }
        s
    }
}

const REDACTED: &str = "********";

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
