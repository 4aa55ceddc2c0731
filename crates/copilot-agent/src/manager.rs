use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::client::CopilotClient;
use crate::launch::LaunchOptions;
use crate::types::{AssistantStatus, AuthStatus, ClientStatus};
use crate::{CopilotError, Result};

/// Reply substituted when the model produces an empty answer, so callers
/// downstream never see a blank string where text was promised.
pub const NO_CONTENT_REPLY: &str = "No content returned from Copilot.";

// ─── CopilotApi ───────────────────────────────────────────────────────────

/// The slice of [`CopilotClient`] the session manager drives.
///
/// Split out as a trait so manager behaviour (lazy start, session reuse,
/// reset) can be tested against a stub without spawning a subprocess.
#[async_trait]
pub trait CopilotApi: Send + Sync {
    async fn start(&self) -> Result<()>;
    async fn stop(&self);
    async fn auth_status(&self) -> Result<AuthStatus>;
    async fn client_status(&self) -> Result<ClientStatus>;
    async fn create_session(&self) -> Result<String>;
    async fn send(&self, session_id: &str, prompt: &str) -> Result<Option<String>>;
    async fn destroy_session(&self, session_id: &str) -> Result<()>;
}

#[async_trait]
impl CopilotApi for CopilotClient {
    async fn start(&self) -> Result<()> {
        CopilotClient::start(self).await
    }

    async fn stop(&self) {
        CopilotClient::stop(self).await;
    }

    async fn auth_status(&self) -> Result<AuthStatus> {
        CopilotClient::auth_status(self).await
    }

    async fn client_status(&self) -> Result<ClientStatus> {
        CopilotClient::client_status(self).await
    }

    async fn create_session(&self) -> Result<String> {
        CopilotClient::create_session(self).await
    }

    async fn send(&self, session_id: &str, prompt: &str) -> Result<Option<String>> {
        CopilotClient::send(self, session_id, prompt).await
    }

    async fn destroy_session(&self, session_id: &str) -> Result<()> {
        CopilotClient::destroy_session(self, session_id).await
    }
}

// ─── SessionManager ───────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionState {
    /// No server process, no session.
    Unstarted,
    /// Server running, no conversation session yet.
    Started,
    /// Server running with one live session.
    InSession(String),
}

/// Owns the process-wide Copilot conversation.
///
/// At most one session is live at a time. The first prompt lazily starts
/// the server and creates the session; later prompts reuse it so the
/// conversation keeps its context. All transitions happen under one async
/// mutex, which also gives single-flight session creation: concurrent
/// first prompts serialize, and the second sees the session the first
/// created instead of making its own.
pub struct SessionManager {
    api: Arc<dyn CopilotApi>,
    state: Mutex<SessionState>,
}

impl SessionManager {
    /// Build a manager over a real CLI client.
    ///
    /// Launch configuration is validated here; on Windows a missing
    /// interpreter or script path surfaces as [`CopilotError::Config`]
    /// before anything is spawned.
    pub fn new(opts: LaunchOptions) -> Result<Self> {
        let client = CopilotClient::new(opts)?;
        Ok(Self::with_api(Arc::new(client)))
    }

    fn with_api(api: Arc<dyn CopilotApi>) -> Self {
        Self {
            api,
            state: Mutex::new(SessionState::Unstarted),
        }
    }

    /// Build a manager over a stub API. Test seam.
    #[cfg(test)]
    pub(crate) fn with_stub(api: Arc<dyn CopilotApi>) -> Self {
        Self::with_api(api)
    }

    /// Start the server if needed and report auth plus client status.
    ///
    /// Leaves a live session untouched; probing never costs the caller
    /// their conversation context. Failures come back as
    /// [`CopilotError::Unavailable`] (or `Config`, passed through).
    pub async fn probe_auth_status(&self) -> Result<AssistantStatus> {
        let mut state = self.state.lock().await;

        self.api
            .start()
            .await
            .map_err(CopilotError::into_unavailable)?;
        if *state == SessionState::Unstarted {
            *state = SessionState::Started;
        }

        let auth = self
            .api
            .auth_status()
            .await
            .map_err(CopilotError::into_unavailable)?;
        let client = self
            .api
            .client_status()
            .await
            .map_err(CopilotError::into_unavailable)?;

        Ok(AssistantStatus { auth, client })
    }

    /// Send one prompt and return the complete reply text.
    ///
    /// Establishment failures (spawn, session creation) are reported as
    /// [`CopilotError::Unavailable`]; failures of the exchange itself as
    /// [`CopilotError::Exchange`]. An empty reply becomes
    /// [`NO_CONTENT_REPLY`] rather than an empty string.
    pub async fn send_prompt(&self, prompt: &str) -> Result<String> {
        let mut state = self.state.lock().await;

        self.api
            .start()
            .await
            .map_err(CopilotError::into_unavailable)?;
        // Server is live from here on, even if session creation fails below.
        if *state == SessionState::Unstarted {
            *state = SessionState::Started;
        }

        let session_id = match &*state {
            SessionState::InSession(id) => id.clone(),
            _ => {
                let id = self
                    .api
                    .create_session()
                    .await
                    .map_err(CopilotError::into_unavailable)?;
                tracing::debug!(session_id = %id, "conversation session established");
                *state = SessionState::InSession(id.clone());
                id
            }
        };

        let reply = match self.api.send(&session_id, prompt).await {
            Ok(reply) => reply,
            // The server answered with an error frame; the session is
            // still usable for the next prompt.
            Err(e @ CopilotError::Rpc { .. }) => return Err(e.into_exchange()),
            Err(e) => {
                // Transport-level failure: the client has dropped the
                // process, so the session id no longer refers to anything.
                *state = SessionState::Unstarted;
                return Err(e.into_exchange());
            }
        };

        Ok(reply.unwrap_or_else(|| NO_CONTENT_REPLY.to_string()))
    }

    /// Tear down the session and the server process.
    ///
    /// Always succeeds and always leaves the manager in the unstarted
    /// state, even if the server already died: the remote destroy is
    /// best-effort and stop swallows kill errors.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;

        if let SessionState::InSession(id) = &*state {
            if let Err(e) = self.api.destroy_session(id).await {
                tracing::debug!(error = %e, "session destroy failed during reset");
            }
        }
        if *state != SessionState::Unstarted {
            self.api.stop().await;
        }

        *state = SessionState::Unstarted;
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
