//! Pipeline orchestration.
//!
//! Wires the source adapters, prompt composer, assistant, and response
//! interpreter into the two generation flows and the tracker write-backs.
//! The pipeline owns no state of its own; everything it touches sits
//! behind a trait so flows are testable with in-memory fakes.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::adapters::{Wiki, WorkItemReceipt, WorkTracker};
use crate::artifact::{PersistenceResult, Story, TestCaseReport};
use crate::compose;
use crate::document::Document;
use crate::error::{CoreError, Result};
use crate::interpret;

/// Appended to everything written back to the tracker.
pub const DISCLAIMER: &str = "Generated with StoryForge and GitHub Copilot.\nLike any AI generated content, mistakes and hallucinations can occur. Please review before relying on it.";

// ---------------------------------------------------------------------------
// AssistantBackend
// ---------------------------------------------------------------------------

/// The assistant seam the pipeline drives.
///
/// Implementations manage their own process and session lifecycle;
/// `send_prompt` is expected to establish whatever it needs on first use.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    async fn send_prompt(&self, prompt: &str) -> Result<String>;
    async fn probe_auth_status(&self) -> Result<AssistantProbe>;
    async fn reset(&self);
}

/// Flattened assistant health snapshot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssistantProbe {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    pub client_version: String,
    pub protocol_version: String,
}

// ---------------------------------------------------------------------------
// GenerateError
// ---------------------------------------------------------------------------

/// A generation failure that keeps hold of the source document once the
/// fetch has succeeded, so callers can still render what was retrieved.
#[derive(Debug, Error)]
#[error("{source}")]
pub struct GenerateError {
    pub document: Option<Document>,
    #[source]
    pub source: CoreError,
}

impl GenerateError {
    fn bare(source: CoreError) -> Self {
        Self {
            document: None,
            source,
        }
    }

    fn with_document(doc: Document) -> impl FnOnce(CoreError) -> Self {
        move |source| Self {
            document: Some(doc),
            source,
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct Pipeline {
    tracker: Arc<dyn WorkTracker>,
    wiki: Arc<dyn Wiki>,
    assistant: Arc<dyn AssistantBackend>,
}

impl Pipeline {
    pub fn new(
        tracker: Arc<dyn WorkTracker>,
        wiki: Arc<dyn Wiki>,
        assistant: Arc<dyn AssistantBackend>,
    ) -> Self {
        Self {
            tracker,
            wiki,
            assistant,
        }
    }

    /// Fetch a ticket, compose the test-case prompt, interpret the reply.
    pub async fn generate_test_cases(
        &self,
        ticket_id: &str,
        extra_context: &str,
    ) -> std::result::Result<(Document, TestCaseReport), GenerateError> {
        let doc = self
            .tracker
            .fetch_ticket(ticket_id)
            .await
            .map_err(GenerateError::bare)?;
        let prompt = compose::test_case_prompt(&doc, extra_context);
        let reply = self
            .assistant
            .send_prompt(&prompt)
            .await
            .map_err(GenerateError::with_document(doc.clone()))?;
        let report = TestCaseReport(interpret::narrative_reply(&reply));
        info!(ticket = ticket_id, "test case report generated");
        Ok((doc, report))
    }

    /// Fetch a wiki page, compose the story prompt, parse the reply.
    pub async fn generate_stories(
        &self,
        page_id: &str,
        extra_context: &str,
    ) -> std::result::Result<(Document, Vec<Story>), GenerateError> {
        let doc = self
            .wiki
            .fetch_page(page_id)
            .await
            .map_err(GenerateError::bare)?;
        let prompt = compose::story_prompt(&doc, extra_context);
        let reply = self
            .assistant
            .send_prompt(&prompt)
            .await
            .map_err(GenerateError::with_document(doc.clone()))?;
        let stories =
            interpret::parse_stories(&reply).map_err(GenerateError::with_document(doc.clone()))?;
        info!(page = page_id, count = stories.len(), "stories generated");
        Ok((doc, stories))
    }

    /// Write accepted stories under a feature, one at a time.
    ///
    /// A failed write never aborts the batch: each accepted story yields
    /// one [`PersistenceResult`] at its input index, unaccepted stories
    /// yield none, and the caller decides what a partial batch means.
    pub async fn persist_stories(
        &self,
        feature_id: &str,
        stories: &[Story],
    ) -> Vec<PersistenceResult> {
        let mut results = Vec::new();
        for (index, story) in stories.iter().enumerate() {
            if !story.accepted {
                continue;
            }
            let description = with_disclaimer(&story.description);
            match self
                .tracker
                .create_backlog_item(
                    feature_id,
                    &story.title,
                    &description,
                    &story.acceptance_criteria,
                )
                .await
            {
                Ok(receipt) => {
                    info!(index, id = receipt.id, "story persisted");
                    results.push(PersistenceResult {
                        index,
                        succeeded: true,
                        error: None,
                    });
                }
                Err(e) => {
                    warn!(index, error = %e, "story persistence failed");
                    results.push(PersistenceResult {
                        index,
                        succeeded: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }
        results
    }

    /// Append a test-case report to its ticket as a comment.
    pub async fn append_report_comment(
        &self,
        ticket_id: &str,
        report: &TestCaseReport,
    ) -> Result<WorkItemReceipt> {
        self.tracker
            .add_comment(ticket_id, &with_disclaimer(report.as_str()))
            .await
    }

    /// File a test-case report as a child task under its ticket.
    pub async fn create_task_from_report(
        &self,
        ticket_id: &str,
        title: &str,
        report: &TestCaseReport,
    ) -> Result<WorkItemReceipt> {
        self.tracker
            .create_child_task(ticket_id, title, &with_disclaimer(report.as_str()))
            .await
    }

    pub async fn check_assistant_auth(&self) -> Result<AssistantProbe> {
        self.assistant.probe_auth_status().await
    }

    pub async fn reset_assistant(&self) {
        self.assistant.reset().await;
    }
}

fn with_disclaimer(text: &str) -> String {
    format!("{text}\n\n{DISCLAIMER}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentField;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    fn receipt(id: u64) -> WorkItemReceipt {
        WorkItemReceipt {
            id,
            url: format!("http://ado.example/{id}"),
        }
    }

    #[derive(Default)]
    struct FakeTracker {
        fail_title: Option<String>,
        comments: StdMutex<Vec<(String, String)>>,
        tasks: StdMutex<Vec<(String, String, String)>>,
        backlog: StdMutex<Vec<(String, String, String, String)>>,
    }

    #[async_trait]
    impl WorkTracker for FakeTracker {
        async fn fetch_ticket(&self, id: &str) -> Result<Document> {
            if id == "missing" {
                return Err(CoreError::NotFound(format!("work item {id}")));
            }
            Ok(Document::new(id, "Checkout flow", "As a shopper...")
                .with_field(DocumentField::AcceptanceCriteria, "Totals update"))
        }

        async fn add_comment(&self, id: &str, text: &str) -> Result<WorkItemReceipt> {
            self.comments.lock().unwrap().push((id.into(), text.into()));
            Ok(receipt(1))
        }

        async fn create_child_task(
            &self,
            parent_id: &str,
            title: &str,
            body: &str,
        ) -> Result<WorkItemReceipt> {
            self.tasks
                .lock()
                .unwrap()
                .push((parent_id.into(), title.into(), body.into()));
            Ok(receipt(2))
        }

        async fn create_backlog_item(
            &self,
            parent_id: &str,
            title: &str,
            body: &str,
            acceptance_criteria: &str,
        ) -> Result<WorkItemReceipt> {
            if self.fail_title.as_deref() == Some(title) {
                return Err(CoreError::TransportFailure("boom".into()));
            }
            let mut items = self.backlog.lock().unwrap();
            items.push((
                parent_id.into(),
                title.into(),
                body.into(),
                acceptance_criteria.into(),
            ));
            Ok(receipt(100 + items.len() as u64))
        }
    }

    struct FakeWiki;

    #[async_trait]
    impl Wiki for FakeWiki {
        async fn fetch_page(&self, id: &str) -> Result<Document> {
            Ok(Document::new(id, "Feature brief", "The system shall..."))
        }
    }

    struct FakeAssistant {
        prompts: StdMutex<Vec<String>>,
        reply: String,
        fail: bool,
        resets: AtomicUsize,
    }

    impl FakeAssistant {
        fn replying(reply: &str) -> Self {
            Self {
                prompts: StdMutex::new(Vec::new()),
                reply: reply.into(),
                fail: false,
                resets: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            let mut a = Self::replying("");
            a.fail = true;
            a
        }
    }

    #[async_trait]
    impl AssistantBackend for FakeAssistant {
        async fn send_prompt(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail {
                return Err(CoreError::AssistantUnavailable("copilot exploded".into()));
            }
            Ok(self.reply.clone())
        }

        async fn probe_auth_status(&self) -> Result<AssistantProbe> {
            Ok(AssistantProbe {
                authenticated: true,
                login: Some("octocat".into()),
                ..Default::default()
            })
        }

        async fn reset(&self) {
            self.resets.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn harness(assistant: FakeAssistant) -> (Arc<FakeTracker>, Arc<FakeAssistant>, Pipeline) {
        let tracker = Arc::new(FakeTracker::default());
        let assistant = Arc::new(assistant);
        let pipeline = Pipeline::new(tracker.clone(), Arc::new(FakeWiki), assistant.clone());
        (tracker, assistant, pipeline)
    }

    fn story(title: &str) -> Story {
        Story {
            title: title.into(),
            description: format!("{title} description"),
            acceptance_criteria: "- done".into(),
            notes: String::new(),
            accepted: true,
        }
    }

    #[tokio::test]
    async fn test_case_flow_feeds_the_ticket_into_the_prompt() {
        let (_, assistant, pipeline) = harness(FakeAssistant::replying("| TC-1 | Happy path |"));
        let (doc, report) = pipeline
            .generate_test_cases("42", "focus on mobile")
            .await
            .unwrap();
        assert_eq!(doc.id, "42");
        assert_eq!(report.as_str(), "| TC-1 | Happy path |");
        let prompts = assistant.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Ticket ID: 42"));
        assert!(prompts[0].contains("Acceptance Criteria: Totals update"));
        assert!(prompts[0].contains("Additional Context: focus on mobile"));
    }

    #[tokio::test]
    async fn empty_assistant_reply_yields_the_sentinel_report() {
        let (_, _, pipeline) = harness(FakeAssistant::replying("  \n"));
        let (_, report) = pipeline.generate_test_cases("42", "").await.unwrap();
        assert_eq!(report.as_str(), interpret::NO_CONTENT_REPLY);
    }

    #[tokio::test]
    async fn story_flow_parses_a_fenced_reply() {
        let reply = "```json\n[{\"title\":\"A\",\"description\":\"As a user...\",\"acceptanceCriteria\":\"- ok\",\"notes\":\"\"}]\n```";
        let (_, assistant, pipeline) = harness(FakeAssistant::replying(reply));
        let (doc, stories) = pipeline.generate_stories("99", "").await.unwrap();
        assert_eq!(doc.title, "Feature brief");
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].title, "A");
        assert!(stories[0].accepted);
        let prompts = assistant.prompts.lock().unwrap();
        assert!(prompts[0].contains("Page Title: Feature brief"));
    }

    #[tokio::test]
    async fn fetch_failure_carries_no_document() {
        let (_, _, pipeline) = harness(FakeAssistant::replying("x"));
        let err = pipeline.generate_test_cases("missing", "").await.unwrap_err();
        assert!(err.document.is_none());
        assert!(matches!(err.source, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn assistant_failure_still_hands_back_the_document() {
        let (_, _, pipeline) = harness(FakeAssistant::failing());
        let err = pipeline.generate_test_cases("42", "").await.unwrap_err();
        let doc = err.document.expect("document fetched before the failure");
        assert_eq!(doc.id, "42");
        assert!(matches!(err.source, CoreError::AssistantUnavailable(_)));
    }

    #[tokio::test]
    async fn malformed_story_reply_fails_but_keeps_the_document() {
        let (_, _, pipeline) = harness(FakeAssistant::replying("Sure! Here you go."));
        let err = pipeline.generate_stories("99", "").await.unwrap_err();
        assert!(err.document.is_some());
        assert!(matches!(err.source, CoreError::GenerationFailure(_)));
    }

    #[tokio::test]
    async fn persist_skips_unaccepted_stories() {
        let (tracker, _, pipeline) = harness(FakeAssistant::replying(""));
        let mut stories = vec![story("A"), story("B")];
        stories[1].accepted = false;
        let results = pipeline.persist_stories("7", &stories).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].index, 0);
        assert!(results[0].succeeded);
        let created = tracker.backlog.lock().unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].1, "A");
    }

    #[tokio::test]
    async fn persist_isolates_failures_and_continues() {
        let tracker = Arc::new(FakeTracker {
            fail_title: Some("B".into()),
            ..Default::default()
        });
        let pipeline = Pipeline::new(
            tracker.clone(),
            Arc::new(FakeWiki),
            Arc::new(FakeAssistant::replying("")),
        );
        let results = pipeline
            .persist_stories("7", &[story("A"), story("B"), story("C")])
            .await;
        assert_eq!(results.len(), 3);
        assert!(results[0].succeeded);
        assert!(!results[1].succeeded);
        assert!(results[1].error.as_deref().unwrap_or_default().contains("boom"));
        assert!(results[2].succeeded);
        assert_eq!(results[2].index, 2);
        let created = tracker.backlog.lock().unwrap();
        assert_eq!(created.len(), 2);
    }

    #[tokio::test]
    async fn persisted_descriptions_carry_the_disclaimer() {
        let (tracker, _, pipeline) = harness(FakeAssistant::replying(""));
        pipeline.persist_stories("7", &[story("A")]).await;
        let created = tracker.backlog.lock().unwrap();
        let description = &created[0].2;
        assert!(description.starts_with("A description\n\n"));
        assert!(description.ends_with(DISCLAIMER));
        assert!(description.contains("Generated with StoryForge and GitHub Copilot."));
        assert_eq!(created[0].3, "- done");
    }

    #[tokio::test]
    async fn report_comment_carries_the_disclaimer() {
        let (tracker, _, pipeline) = harness(FakeAssistant::replying(""));
        let report = TestCaseReport("| TC-1 |".into());
        pipeline.append_report_comment("42", &report).await.unwrap();
        let comments = tracker.comments.lock().unwrap();
        assert_eq!(comments[0].0, "42");
        assert!(comments[0].1.starts_with("| TC-1 |\n\n"));
        assert!(comments[0].1.ends_with(DISCLAIMER));
    }

    #[tokio::test]
    async fn report_task_uses_the_given_title() {
        let (tracker, _, pipeline) = harness(FakeAssistant::replying(""));
        let report = TestCaseReport("| TC-1 |".into());
        pipeline
            .create_task_from_report("42", "Test cases: checkout", &report)
            .await
            .unwrap();
        let tasks = tracker.tasks.lock().unwrap();
        assert_eq!(
            tasks[0],
            (
                "42".into(),
                "Test cases: checkout".into(),
                format!("| TC-1 |\n\n{DISCLAIMER}")
            )
        );
    }

    #[tokio::test]
    async fn probe_and_reset_delegate_to_the_assistant() {
        let (_, assistant, pipeline) = harness(FakeAssistant::replying(""));
        let probe = pipeline.check_assistant_auth().await.unwrap();
        assert!(probe.authenticated);
        assert_eq!(probe.login.as_deref(), Some("octocat"));
        pipeline.reset_assistant().await;
        assert_eq!(assistant.resets.load(Ordering::SeqCst), 1);
    }
}
