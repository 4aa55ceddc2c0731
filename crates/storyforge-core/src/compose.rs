//! Prompt composition.
//!
//! Pure functions from a [`Document`] plus optional extra context to the
//! prompt text sent to the assistant. Each prompt embeds a fixed
//! output-format contract; the response interpreter depends on these
//! contracts, so changing one means revisiting `interpret`.

use crate::document::{Document, DocumentField};

/// Placeholder rendered when the caller supplies no additional context.
pub const NO_CONTEXT_PLACEHOLDER: &str = "None provided";

/// Prompt for the narrative artifact: a Markdown table of test cases.
pub fn test_case_prompt(doc: &Document, extra_context: &str) -> String {
    let acceptance = doc
        .field(DocumentField::AcceptanceCriteria)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or("N/A");

    format!(
        r#"Generate a set of comprehensive test cases for the following user story/ticket.

Ticket ID: {id}
Title: {title}
Description: {description}
Acceptance Criteria: {acceptance}

Additional Context: {context}

Please format the output in a Markdown table, including:
- Test Case ID
- Description
- Pre-conditions
- Steps
- Expected Result
- Priority"#,
        id = doc.id,
        title = doc.title,
        description = doc.body,
        acceptance = acceptance,
        context = context_or_placeholder(extra_context),
    )
}

/// Prompt for the structured artifact: a bare JSON array of user stories.
pub fn story_prompt(doc: &Document, extra_context: &str) -> String {
    format!(
        r#"Generate a set of user stories based on the following functional requirements from a Confluence page.

Page Title: {title}
Page Content: {body}

Additional Context: {context}

Please output ONLY a valid JSON array of objects, with no markdown formatting or other text.
Each object should have the following properties:
- "title": (string) The title of the story
- "description": (string) Description. This should contain a statement in the format "As a... I want to... So that..." followed by 2 blank lines and then a longer description of the changes required for story.
- "acceptanceCriteria": (string) Formatted as a list. Use markdown within the string with \n for newlines.
- "notes": (string) Any additional notes or assumptions (Optional, can be empty)"#,
        title = doc.title,
        body = doc.body,
        context = context_or_placeholder(extra_context),
    )
}

fn context_or_placeholder(extra_context: &str) -> &str {
    if extra_context.trim().is_empty() {
        NO_CONTEXT_PLACEHOLDER
    } else {
        extra_context
    }
}
