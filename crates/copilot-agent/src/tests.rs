/// Round-trip tests for the JSON-RPC frames using representative payloads
/// from the Copilot CLI's `--server --stdio` protocol.
#[cfg(test)]
mod unit {
    use crate::types::{AuthStatus, ClientStatus, PromptReply, RpcFrame, RpcRequest, SessionCreated};

    fn parse_frame(json: &str) -> RpcFrame {
        serde_json::from_str(json).expect("failed to parse frame")
    }

    #[test]
    fn serialize_request() {
        let req = RpcRequest::new(7, "session/prompt", serde_json::json!({"sessionId": "s1"}));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["id"], 7);
        assert_eq!(json["method"], "session/prompt");
        assert_eq!(json["params"]["sessionId"], "s1");
    }

    #[test]
    fn parse_result_frame() {
        let frame = parse_frame(r#"{"jsonrpc":"2.0","id":3,"result":{"sessionId":"abc"}}"#);
        assert_eq!(frame.id, Some(3));
        assert!(frame.error.is_none());
        assert!(!frame.is_notification());

        let created: SessionCreated = serde_json::from_value(frame.result.unwrap()).unwrap();
        assert_eq!(created.session_id, "abc");
    }

    #[test]
    fn parse_error_frame() {
        let frame = parse_frame(
            r#"{"jsonrpc":"2.0","id":4,"error":{"code":-32601,"message":"method not found"}}"#,
        );
        assert_eq!(frame.id, Some(4));
        let err = frame.error.unwrap();
        assert_eq!(err.code, -32601);
        assert_eq!(err.message, "method not found");
    }

    #[test]
    fn parse_notification_frame() {
        let frame = parse_frame(
            r#"{"jsonrpc":"2.0","method":"session/progress","params":{"elapsed":1.5}}"#,
        );
        assert!(frame.is_notification());
        assert_eq!(frame.method.as_deref(), Some("session/progress"));
    }

    #[test]
    fn parse_auth_status() {
        let auth: AuthStatus = serde_json::from_str(
            r#"{"isAuthenticated":true,"login":"octocat","authType":"oauth","statusMessage":"ok"}"#,
        )
        .unwrap();
        assert!(auth.is_authenticated);
        assert_eq!(auth.login.as_deref(), Some("octocat"));
        assert_eq!(auth.auth_type.as_deref(), Some("oauth"));
    }

    #[test]
    fn parse_auth_status_minimal() {
        // Before `copilot auth login`, only the flag is present.
        let auth: AuthStatus = serde_json::from_str(r#"{"isAuthenticated":false}"#).unwrap();
        assert!(!auth.is_authenticated);
        assert!(auth.login.is_none());
        assert!(auth.status_message.is_none());
    }

    #[test]
    fn parse_client_status() {
        let status: ClientStatus =
            serde_json::from_str(r#"{"version":"1.4.0","protocolVersion":"2024-11"}"#).unwrap();
        assert_eq!(status.version, "1.4.0");
        assert_eq!(status.protocol_version, "2024-11");
    }

    #[test]
    fn parse_prompt_reply_without_content() {
        let reply: PromptReply = serde_json::from_str(r#"{}"#).unwrap();
        assert!(reply.content.is_none());
    }

    #[test]
    fn parse_prompt_reply_with_content() {
        let reply: PromptReply =
            serde_json::from_str(r#"{"content":"| Test Case ID | ... |"}"#).unwrap();
        assert_eq!(reply.content.as_deref(), Some("| Test Case ID | ... |"));
    }
}
