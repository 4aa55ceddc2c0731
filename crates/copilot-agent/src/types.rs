use serde::{Deserialize, Serialize};

// ─── Wire frames ──────────────────────────────────────────────────────────

/// A JSON-RPC 2.0 request frame sent to the Copilot CLI server on stdin.
///
/// The server speaks newline-delimited JSON-RPC over stdio when launched
/// with `--server --stdio`, mirroring the protocol the official
/// `@github/copilot-sdk` client drives.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RpcRequest<'a> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'a str,
    pub params: serde_json::Value,
}

impl<'a> RpcRequest<'a> {
    pub(crate) fn new(id: u64, method: &'a str, params: serde_json::Value) -> Self {
        RpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// Any frame the server emits on stdout.
///
/// Responses carry the `id` of the request they answer plus either
/// `result` or `error`. Frames without an `id` are server-initiated
/// notifications (progress, telemetry); we skip those — matching the
/// official client, which only correlates request/response pairs.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RpcFrame {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<RpcErrorBody>,
    #[serde(default)]
    pub method: Option<String>,
}

impl RpcFrame {
    pub(crate) fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RpcErrorBody {
    pub code: i64,
    pub message: String,
}

// ─── Method payloads ──────────────────────────────────────────────────────

/// `auth/status` result — whether the CLI holds valid GitHub credentials.
///
/// Only `isAuthenticated` is always present; the rest is filled in once
/// the user has completed `copilot auth login`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub is_authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

/// `client/status` result — CLI build and protocol version info.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStatus {
    pub version: String,
    pub protocol_version: String,
}

/// Combined status returned by a session-manager auth probe.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssistantStatus {
    pub auth: AuthStatus,
    pub client: ClientStatus,
}

/// `session/create` result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SessionCreated {
    pub session_id: String,
}

/// `session/prompt` result. `content` is absent when the model produced
/// nothing usable; the session manager substitutes [`crate::NO_CONTENT_REPLY`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PromptReply {
    #[serde(default)]
    pub content: Option<String>,
}
