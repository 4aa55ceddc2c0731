use thiserror::Error;

#[derive(Debug, Error)]
pub enum CopilotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse server frame: {source}\n  line: {line}")]
    Parse {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Copilot server error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Process error: {0}")]
    Process(String),

    #[error("Missing launch configuration: {0}")]
    Config(String),

    #[error("Copilot unavailable: {0}")]
    Unavailable(String),

    #[error("Prompt exchange failed: {0}")]
    Exchange(String),
}

impl CopilotError {
    /// Wrap an establishment-phase failure (startup or session creation).
    /// `Config` passes through untouched so callers can distinguish a
    /// missing launch descriptor from a server that failed to come up.
    pub(crate) fn into_unavailable(self) -> CopilotError {
        match self {
            CopilotError::Config(_) | CopilotError::Unavailable(_) => self,
            other => CopilotError::Unavailable(other.to_string()),
        }
    }

    /// Wrap an exchange-phase failure (the prompt round-trip itself).
    pub(crate) fn into_exchange(self) -> CopilotError {
        match self {
            CopilotError::Exchange(_) => self,
            other => CopilotError::Exchange(other.to_string()),
        }
    }
}
