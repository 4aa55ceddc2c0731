use std::path::PathBuf;

use tokio::process::Command;

use crate::{CopilotError, Result};

// ─── Environment keys ─────────────────────────────────────────────────────

/// Interpreter used to run the CLI entry script on Windows (node.exe).
pub const NODE_PATH_VAR: &str = "COPILOT_NODE_PATH";
/// The CLI's JS entry script on Windows.
pub const SCRIPT_PATH_VAR: &str = "COPILOT_SCRIPT_PATH";

const SERVER_ARGS: &[&str] = &["--server", "--stdio"];

// ─── LaunchOptions / LaunchPlan ───────────────────────────────────────────

/// Caller-supplied knobs for locating the Copilot CLI.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Custom path to the `copilot` executable (default: `"copilot"` on PATH).
    /// Ignored on Windows, where the interpreter/script pair is used instead.
    pub cli_path: Option<String>,
    /// Token exported to the subprocess as `COPILOT_TOKEN` when set.
    pub token: Option<String>,
}

/// A validated description of how to start the Copilot CLI server.
///
/// Resolved exactly once, at session-manager construction. The Windows
/// family cannot exec the CLI's shim directly, so there the plan requires
/// an interpreter path and a script path from the environment; if either
/// is missing we fail with [`CopilotError::Config`] up front instead of
/// attempting a degraded start. Other platforms spawn the executable as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchPlan {
    Direct {
        program: PathBuf,
    },
    Interpreted {
        interpreter: PathBuf,
        script: PathBuf,
    },
}

impl LaunchPlan {
    /// Resolve the plan for the current platform and process environment.
    pub fn resolve(opts: &LaunchOptions) -> Result<Self> {
        Self::resolve_for(cfg!(windows), opts, |key| std::env::var(key).ok())
    }

    /// Platform- and environment-injectable resolution, split out so tests
    /// can exercise the Windows branch from any host.
    fn resolve_for(
        windows: bool,
        opts: &LaunchOptions,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        if !windows {
            let program = opts.cli_path.clone().unwrap_or_else(|| "copilot".into());
            return Ok(LaunchPlan::Direct {
                program: PathBuf::from(program),
            });
        }

        let interpreter = env(NODE_PATH_VAR).filter(|v| !v.trim().is_empty()).ok_or(
            CopilotError::Config(format!("{NODE_PATH_VAR} must be set on Windows")),
        )?;
        let script = env(SCRIPT_PATH_VAR).filter(|v| !v.trim().is_empty()).ok_or(
            CopilotError::Config(format!("{SCRIPT_PATH_VAR} must be set on Windows")),
        )?;

        Ok(LaunchPlan::Interpreted {
            interpreter: PathBuf::from(interpreter),
            script: PathBuf::from(script),
        })
    }

    /// Build the server-mode command for this plan.
    pub(crate) fn command(&self, token: Option<&str>) -> Command {
        let mut cmd = match self {
            LaunchPlan::Direct { program } => Command::new(program),
            LaunchPlan::Interpreted {
                interpreter,
                script,
            } => {
                let mut cmd = Command::new(interpreter);
                cmd.arg(script);
                cmd
            }
        };
        cmd.args(SERVER_ARGS);
        if let Some(token) = token {
            cmd.env("COPILOT_TOKEN", token);
        }
        cmd
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
