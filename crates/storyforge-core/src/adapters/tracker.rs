//! Azure DevOps work-item adapter.
//!
//! Speaks the `_apis/wit` REST surface directly: GET for fetch, PATCH with
//! `application/json-patch+json` for updates, POST against the `$`-prefixed
//! type route for creates. Mutations that link a parent re-fetch it first to
//! resolve the project and the canonical work-item URL.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{classify_response, transport_error, WorkItemReceipt, WorkTracker};
use crate::config::TrackerSettings;
use crate::document::{Document, DocumentField};
use crate::error::{CoreError, Result};

const API_VERSION: &str = "7.1";
const PATCH_CONTENT_TYPE: &str = "application/json-patch+json";

const TITLE_FIELD: &str = "System.Title";
const DESCRIPTION_FIELD: &str = "System.Description";
const ACCEPTANCE_FIELD: &str = "Microsoft.VSTS.Common.AcceptanceCriteria";
const PROJECT_FIELD: &str = "System.TeamProject";

const CHILD_LINK: &str = "System.LinkTypes.Hierarchy-Reverse";
const TASK_LINK_COMMENT: &str = "Added via Copilot test case generation";
const STORY_LINK_COMMENT: &str = "Added via Copilot story generation";

// ---------------------------------------------------------------------------
// AzureDevOpsTracker
// ---------------------------------------------------------------------------

pub struct AzureDevOpsTracker {
    http: reqwest::Client,
    organization_url: String,
    pat: String,
}

impl AzureDevOpsTracker {
    pub fn new(settings: &TrackerSettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            organization_url: settings.organization_url.trim_end_matches('/').to_string(),
            pat: settings.pat.clone(),
        }
    }

    async fn get_work_item(&self, id: &str) -> Result<WorkItem> {
        let what = format!("work item {id}");
        let url = format!("{}/_apis/wit/workitems/{id}", self.organization_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("api-version", API_VERSION)])
            .basic_auth("", Some(&self.pat))
            .send()
            .await
            .map_err(|e| transport_error(&what, e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| transport_error(&what, e))?;
        if !status.is_success() {
            return Err(classify_response(status, &what, &body));
        }
        let item: WorkItem = serde_json::from_str(&body)
            .map_err(|e| CoreError::TransportFailure(format!("{what}: unexpected payload: {e}")))?;
        if item.fields.is_none() {
            return Err(CoreError::NotFound(what));
        }
        Ok(item)
    }

    /// PATCH or POST a json-patch document and read back the resulting item.
    async fn submit(
        &self,
        method: Method,
        url: &str,
        what: &str,
        patch: &Value,
    ) -> Result<WorkItemReceipt> {
        let resp = self
            .http
            .request(method, url)
            .query(&[("api-version", API_VERSION)])
            .basic_auth("", Some(&self.pat))
            .header(CONTENT_TYPE, PATCH_CONTENT_TYPE)
            .body(serde_json::to_string(patch)?)
            .send()
            .await
            .map_err(|e| transport_error(what, e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| transport_error(what, e))?;
        if !status.is_success() {
            return Err(classify_response(status, what, &body));
        }
        let item: WorkItem = serde_json::from_str(&body)
            .map_err(|e| CoreError::TransportFailure(format!("{what}: unexpected payload: {e}")))?;
        debug!(id = item.id, "work item written");
        Ok(WorkItemReceipt {
            id: item.id,
            url: item.url,
        })
    }

    /// Resolve the project and canonical URL a child must link against.
    async fn parent_context(&self, parent_id: &str) -> Result<(String, String)> {
        let parent = self.get_work_item(parent_id).await?;
        let project = parent
            .text_field(PROJECT_FIELD)
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| {
                CoreError::ValidationFailure(format!(
                    "work item {parent_id} carries no project; cannot create a child"
                ))
            })?
            .to_string();
        Ok((project, parent.url))
    }

    async fn create_work_item(
        &self,
        project: &str,
        work_item_type: &str,
        what: &str,
        patch: &Value,
    ) -> Result<WorkItemReceipt> {
        let url = format!(
            "{}/{}/_apis/wit/workitems/${}",
            self.organization_url,
            encode_segment(project),
            encode_segment(work_item_type),
        );
        self.submit(Method::POST, &url, what, patch).await
    }
}

#[async_trait]
impl WorkTracker for AzureDevOpsTracker {
    async fn fetch_ticket(&self, id: &str) -> Result<Document> {
        let item = self.get_work_item(id).await?;
        debug!(id = item.id, "fetched work item");
        Ok(normalize(&item))
    }

    async fn add_comment(&self, id: &str, text: &str) -> Result<WorkItemReceipt> {
        let patch = json!([
            { "op": "add", "path": "/fields/System.History", "value": text },
            { "op": "add", "path": "/multilineFieldsFormat/System.History", "value": "Markdown" },
        ]);
        let url = format!("{}/_apis/wit/workitems/{id}", self.organization_url);
        self.submit(
            Method::PATCH,
            &url,
            &format!("comment on work item {id}"),
            &patch,
        )
        .await
    }

    async fn create_child_task(
        &self,
        parent_id: &str,
        title: &str,
        body: &str,
    ) -> Result<WorkItemReceipt> {
        let (project, parent_url) = self.parent_context(parent_id).await?;
        let patch = json!([
            { "op": "add", "path": "/fields/System.Title", "value": title },
            { "op": "add", "path": "/fields/System.Description", "value": body },
            { "op": "add", "path": "/multilineFieldsFormat/System.Description", "value": "Markdown" },
            {
                "op": "add",
                "path": "/relations/-",
                "value": {
                    "rel": CHILD_LINK,
                    "url": parent_url,
                    "attributes": { "comment": TASK_LINK_COMMENT },
                },
            },
        ]);
        self.create_work_item(
            &project,
            "Task",
            &format!("create task under work item {parent_id}"),
            &patch,
        )
        .await
    }

    async fn create_backlog_item(
        &self,
        parent_id: &str,
        title: &str,
        body: &str,
        acceptance_criteria: &str,
    ) -> Result<WorkItemReceipt> {
        let (project, parent_url) = self.parent_context(parent_id).await?;
        let patch = json!([
            { "op": "add", "path": "/fields/System.Title", "value": title },
            { "op": "add", "path": "/fields/System.Description", "value": body },
            { "op": "add", "path": "/multilineFieldsFormat/System.Description", "value": "Markdown" },
            { "op": "add", "path": "/fields/Microsoft.VSTS.Common.AcceptanceCriteria", "value": acceptance_criteria },
            { "op": "add", "path": "/multilineFieldsFormat/Microsoft.VSTS.Common.AcceptanceCriteria", "value": "Markdown" },
            {
                "op": "add",
                "path": "/relations/-",
                "value": {
                    "rel": CHILD_LINK,
                    "url": parent_url,
                    "attributes": { "comment": STORY_LINK_COMMENT },
                },
            },
        ]);
        self.create_work_item(
            &project,
            "Product Backlog Item",
            &format!("create backlog item under work item {parent_id}"),
            &patch,
        )
        .await
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WorkItem {
    id: u64,
    #[serde(default)]
    url: String,
    fields: Option<serde_json::Map<String, Value>>,
}

impl WorkItem {
    fn text_field(&self, name: &str) -> Option<&str> {
        self.fields.as_ref()?.get(name)?.as_str()
    }
}

fn normalize(item: &WorkItem) -> Document {
    let title = item.text_field(TITLE_FIELD).unwrap_or_default();
    let body = item.text_field(DESCRIPTION_FIELD).unwrap_or_default();
    let mut doc = Document::new(item.id.to_string(), title, body);
    for (name, key) in [
        (ACCEPTANCE_FIELD, DocumentField::AcceptanceCriteria),
        (PROJECT_FIELD, DocumentField::Project),
    ] {
        if let Some(value) = item.text_field(name) {
            if !value.trim().is_empty() {
                doc = doc.with_field(key, value);
            }
        }
    }
    doc
}

/// Project and work-item-type path segments may contain spaces.
fn encode_segment(segment: &str) -> String {
    segment.replace(' ', "%20")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
