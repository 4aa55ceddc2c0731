//! `copilot-agent` — native Rust driver for the GitHub Copilot CLI.
//!
//! This crate speaks the newline-delimited JSON-RPC protocol the CLI
//! exposes in `--server --stdio` mode, as a first-class Rust library so
//! the `storyforge` workspace can call Copilot without a Node.js runtime
//! of its own.
//!
//! # Architecture
//!
//! ```text
//! LaunchOptions
//!     │
//!     ▼
//! LaunchPlan       ← resolved once per platform; Windows needs the
//!     │              interpreter/script pair from the environment
//!     ▼
//! CopilotProcess   ← spawns `copilot --server --stdio`,
//!     │              reads JSONL frames from stdout
//!     ▼
//! CopilotClient    ← sequential JSON-RPC request/response exchanges
//!     │
//!     ▼
//! SessionManager   ← one live conversation session per process;
//!                    lazy start, session reuse, reset
//! ```
//!
//! # Quick start
//!
//! ```rust,ignore
//! use copilot_agent::{LaunchOptions, SessionManager};
//!
//! let manager = SessionManager::new(LaunchOptions::default())?;
//! let reply = manager.send_prompt("Summarise this work item: ...").await?;
//! println!("{reply}");
//! manager.reset().await;
//! ```

pub mod error;
pub mod launch;
pub mod manager;
pub mod types;

pub(crate) mod client;
pub(crate) mod process;

#[cfg(test)]
mod tests;

pub use client::CopilotClient;
pub use error::CopilotError;
pub use launch::{LaunchOptions, LaunchPlan};
pub use manager::{CopilotApi, SessionManager, NO_CONTENT_REPLY};
pub use types::{AssistantStatus, AuthStatus, ClientStatus};

/// Convenience `Result` alias for this crate.
pub type Result<T> = std::result::Result<T, CopilotError>;
