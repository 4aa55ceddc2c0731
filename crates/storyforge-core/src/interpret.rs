//! Response interpretation.
//!
//! The assistant's replies come back as free text. The narrative path
//! passes that text through untouched; the structured path recovers a
//! `Vec<Story>` from it, tolerating the one deviation models make in
//! practice (wrapping the JSON in a ```json fence despite the prompt)
//! and treating everything else as a hard failure.

use std::sync::OnceLock;

use regex::Regex;

use crate::artifact::Story;
use crate::error::{CoreError, Result};

/// Fixed reply substituted when the assistant returns nothing.
pub const NO_CONTENT_REPLY: &str = "No content returned from Copilot.";

static FENCE_RE: OnceLock<Regex> = OnceLock::new();

fn fence_re() -> &'static Regex {
    FENCE_RE.get_or_init(|| Regex::new(r"```json\s*([\s\S]*?)\s*```").unwrap())
}

/// Narrative pass-through: the reply is the artifact.
///
/// An empty or whitespace-only reply becomes [`NO_CONTENT_REPLY`] so
/// downstream display never renders a blank where text was promised.
pub fn narrative_reply(raw: &str) -> String {
    if raw.trim().is_empty() {
        NO_CONTENT_REPLY.to_string()
    } else {
        raw.to_string()
    }
}

/// Structured path: extract and parse the story array from a reply.
///
/// Stage one locates ```json fences. Exactly one fence: its interior is
/// the parse candidate. No fence: the trimmed whole reply is. More than
/// one fence is ambiguous and rejected outright rather than guessing
/// which block the model meant. Stage two is a strict serde parse; any
/// failure is a [`CoreError::GenerationFailure`] carrying the raw reply,
/// never a silently empty list.
pub fn parse_stories(raw: &str) -> Result<Vec<Story>> {
    let mut fences = fence_re().captures_iter(raw);
    let candidate = match (fences.next(), fences.next()) {
        (Some(only), None) => only.get(1).map(|m| m.as_str()).unwrap_or(""),
        (Some(_), Some(_)) => {
            return Err(CoreError::GenerationFailure(format!(
                "reply contains multiple fenced json blocks; refusing to guess which to use\n  reply: {raw}"
            )));
        }
        (None, _) => raw.trim(),
    };

    serde_json::from_str(candidate).map_err(|e| {
        CoreError::GenerationFailure(format!(
            "reply was not a valid JSON story array: {e}\n  reply: {raw}"
        ))
    })
}
