//! Source adapters.
//!
//! Each backend gets one adapter that speaks its REST dialect and
//! normalizes its payloads into [`Document`]. Backend field names stay
//! inside the adapter; error classification is shared: 404 is `NotFound`,
//! 401/403 `AuthFailure`, 400 `ValidationFailure`, anything else
//! (including network failures) `TransportFailure`.

pub mod tracker;
pub mod wiki;

pub use tracker::AzureDevOpsTracker;
pub use wiki::ConfluenceWiki;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{CoreError, Result};

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// A work-item tracker: fetch plus the write-back operations.
#[async_trait]
pub trait WorkTracker: Send + Sync {
    async fn fetch_ticket(&self, id: &str) -> Result<Document>;
    async fn add_comment(&self, id: &str, text: &str) -> Result<WorkItemReceipt>;
    async fn create_child_task(
        &self,
        parent_id: &str,
        title: &str,
        body: &str,
    ) -> Result<WorkItemReceipt>;
    async fn create_backlog_item(
        &self,
        parent_id: &str,
        title: &str,
        body: &str,
        acceptance_criteria: &str,
    ) -> Result<WorkItemReceipt>;
}

/// A documentation source: fetch only.
#[async_trait]
pub trait Wiki: Send + Sync {
    async fn fetch_page(&self, id: &str) -> Result<Document>;
}

// ---------------------------------------------------------------------------
// WorkItemReceipt
// ---------------------------------------------------------------------------

/// Identity of a work item created or updated by a mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItemReceipt {
    pub id: u64,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Shared error mapping
// ---------------------------------------------------------------------------

pub(crate) fn classify_response(
    status: reqwest::StatusCode,
    what: &str,
    body: &str,
) -> CoreError {
    let detail = if body.trim().is_empty() {
        format!("{what}: {status}")
    } else {
        format!("{what}: {status}: {}", body.trim())
    };
    match status.as_u16() {
        404 => CoreError::NotFound(what.to_string()),
        401 | 403 => CoreError::AuthFailure(detail),
        400 => CoreError::ValidationFailure(detail),
        _ => CoreError::TransportFailure(detail),
    }
}

pub(crate) fn transport_error(what: &str, err: reqwest::Error) -> CoreError {
    CoreError::TransportFailure(format!("{what}: {err}"))
}
