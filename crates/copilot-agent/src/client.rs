use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::Mutex;

use crate::launch::{LaunchOptions, LaunchPlan};
use crate::process::CopilotProcess;
use crate::types::{AuthStatus, ClientStatus, PromptReply, RpcRequest, SessionCreated};
use crate::{CopilotError, Result};

// ─── CopilotClient ────────────────────────────────────────────────────────

/// Low-level client for the Copilot CLI server.
///
/// Owns at most one server subprocess and drives it with sequential
/// JSON-RPC exchanges: requests are sent one at a time under the internal
/// mutex, and each waits for the response frame bearing its id. There is
/// no concurrent-request router; callers that need interleaving serialize
/// above this layer (see [`crate::SessionManager`]).
pub struct CopilotClient {
    plan: LaunchPlan,
    token: Option<String>,
    inner: Mutex<Inner>,
}

struct Inner {
    proc: Option<CopilotProcess>,
    next_id: u64,
}

impl CopilotClient {
    /// Create a client for the current platform.
    ///
    /// The launch plan is resolved here, once: a missing interpreter or
    /// script path on Windows fails construction with
    /// [`CopilotError::Config`] rather than at first use.
    pub fn new(opts: LaunchOptions) -> Result<Self> {
        let plan = LaunchPlan::resolve(&opts)?;
        Ok(Self {
            plan,
            token: opts.token,
            inner: Mutex::new(Inner {
                proc: None,
                next_id: 0,
            }),
        })
    }

    /// Wrap an already-spawned process, bypassing plan resolution.
    /// Lets tests drive the client against a scripted mock server.
    #[cfg(test)]
    pub(crate) fn from_process(proc: CopilotProcess) -> Self {
        Self {
            plan: LaunchPlan::Direct {
                program: "copilot".into(),
            },
            token: None,
            inner: Mutex::new(Inner {
                proc: Some(proc),
                next_id: 0,
            }),
        }
    }

    /// Start the server subprocess if it is not already running.
    ///
    /// A `ping` round-trip confirms the server is actually speaking the
    /// protocol before this returns; a binary that starts but prints
    /// something else is reported as an error, not a half-open client.
    pub async fn start(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.proc.is_some() {
            return Ok(());
        }

        tracing::info!("starting Copilot CLI server");
        inner.proc = Some(CopilotProcess::spawn(&self.plan, self.token.as_deref())?);
        inner.request("ping", json!({})).await?;
        Ok(())
    }

    /// Stop the server subprocess. Idempotent and infallible: a client
    /// that is not running is left as-is, and kill errors are swallowed.
    pub async fn stop(&self) {
        let mut inner = self.inner.lock().await;
        if inner.proc.is_some() {
            tracing::info!("stopping Copilot CLI server");
        }
        inner.teardown().await;
    }

    /// Whether the server subprocess is currently running.
    pub async fn is_running(&self) -> bool {
        self.inner.lock().await.proc.is_some()
    }

    /// Query the CLI's GitHub authentication state.
    pub async fn auth_status(&self) -> Result<AuthStatus> {
        let value = self.request("auth/status", json!({})).await?;
        parse_result(value)
    }

    /// Query the CLI build and protocol version.
    pub async fn client_status(&self) -> Result<ClientStatus> {
        let value = self.request("client/status", json!({})).await?;
        parse_result(value)
    }

    /// Create a conversation session and return its id.
    pub async fn create_session(&self) -> Result<String> {
        let value = self.request("session/create", json!({})).await?;
        let created: SessionCreated = parse_result(value)?;
        tracing::debug!(session_id = %created.session_id, "session created");
        Ok(created.session_id)
    }

    /// Send one prompt to a session and wait for the complete reply.
    ///
    /// Returns `None` when the server reports an empty reply; the caller
    /// decides what an absent answer means.
    pub async fn send(&self, session_id: &str, prompt: &str) -> Result<Option<String>> {
        let value = self
            .request(
                "session/prompt",
                json!({ "sessionId": session_id, "prompt": prompt }),
            )
            .await?;
        let reply: PromptReply = parse_result(value)?;
        Ok(reply.content.filter(|c| !c.trim().is_empty()))
    }

    /// Destroy a session on the server side.
    pub async fn destroy_session(&self, session_id: &str) -> Result<()> {
        self.request("session/destroy", json!({ "sessionId": session_id }))
            .await?;
        Ok(())
    }

    async fn request(&self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        self.inner.lock().await.request(method, params).await
    }
}

impl Inner {
    async fn request(&mut self, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
        self.next_id += 1;
        let id = self.next_id;
        let req = RpcRequest::new(id, method, params);
        tracing::debug!(method, id, "sending request");

        let proc = self
            .proc
            .as_mut()
            .ok_or_else(|| CopilotError::Process("Copilot server is not running".into()))?;

        match exchange(proc, &req).await {
            Ok(value) => Ok(value),
            // An error response is a clean exchange; the stream is intact.
            Err(e @ CopilotError::Rpc { .. }) => Err(e),
            Err(e) => {
                // The stream may be desynchronized after a failed
                // exchange; drop the server so the next start() spawns
                // a fresh one.
                self.teardown().await;
                Err(e)
            }
        }
    }

    async fn teardown(&mut self) {
        if let Some(mut proc) = self.proc.take() {
            proc.kill().await;
        }
    }
}

/// Send one frame and read frames until the response with the matching id
/// arrives. Server-initiated notifications and stale responses from an
/// abandoned earlier exchange are skipped.
async fn exchange(proc: &mut CopilotProcess, req: &RpcRequest<'_>) -> Result<serde_json::Value> {
    proc.send_frame(req).await?;

    loop {
        match proc.next_frame().await? {
            None => {
                return Err(proc.wait_exit_error().await.unwrap_or_else(|| {
                    CopilotError::Process("Copilot server closed its stdout".into())
                }));
            }
            Some(frame) if frame.is_notification() => {
                tracing::trace!(
                    method = frame.method.as_deref().unwrap_or(""),
                    "skipping notification"
                );
            }
            Some(frame) if frame.id != Some(req.id) => {
                tracing::debug!(got = ?frame.id, want = req.id, "skipping stale response");
            }
            Some(frame) => {
                if let Some(err) = frame.error {
                    return Err(CopilotError::Rpc {
                        code: err.code,
                        message: err.message,
                    });
                }
                return Ok(frame.result.unwrap_or(serde_json::Value::Null));
            }
        }
    }
}

fn parse_result<T: DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value.clone()).map_err(|e| CopilotError::Parse {
        line: value.to_string(),
        source: e,
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────
