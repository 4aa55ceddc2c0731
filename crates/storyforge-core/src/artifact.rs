use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

// ---------------------------------------------------------------------------
// TestCaseReport
// ---------------------------------------------------------------------------

/// The narrative artifact: an opaque Markdown blob (normally a table of
/// test cases). Never parsed, only displayed or written back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestCaseReport(pub String);

impl TestCaseReport {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TestCaseReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Story
// ---------------------------------------------------------------------------

/// One structured user story as produced by the assistant.
///
/// Field names follow the wire contract the story prompt mandates
/// (`acceptanceCriteria`). `accepted` is a local selection flag: it defaults
/// to true for every parsed story and never crosses a process boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub title: String,
    pub description: String,
    pub acceptance_criteria: String,
    #[serde(default)]
    pub notes: String,
    #[serde(skip, default = "default_accepted")]
    pub accepted: bool,
}

fn default_accepted() -> bool {
    true
}

// ---------------------------------------------------------------------------
// PersistenceResult
// ---------------------------------------------------------------------------

/// Outcome of one write in a persist loop. `index` refers to the story's
/// position in the input list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceResult {
    pub index: usize,
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

/// Load a story set from a JSON file (the `stories -o` output format).
pub fn load_stories(path: &Path) -> Result<Vec<Story>> {
    let data = std::fs::read_to_string(path)?;
    let stories: Vec<Story> = serde_json::from_str(&data)?;
    Ok(stories)
}

/// Save a story set as pretty-printed JSON, atomically.
pub fn save_stories(path: &Path, stories: &[Story]) -> Result<()> {
    let data = serde_json::to_string_pretty(stories)?;
    crate::io::atomic_write(path, data.as_bytes())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn story_uses_wire_field_names() {
        let story = Story {
            title: "A".into(),
            description: "As a user...".into(),
            acceptance_criteria: "- works".into(),
            notes: String::new(),
            accepted: true,
        };
        let json = serde_json::to_string(&story).unwrap();
        assert!(json.contains("\"acceptanceCriteria\""));
        assert!(!json.contains("accepted"));
    }

    #[test]
    fn parsed_story_is_accepted_by_default() {
        let story: Story = serde_json::from_str(
            r#"{"title":"A","description":"d","acceptanceCriteria":"- x","notes":""}"#,
        )
        .unwrap();
        assert!(story.accepted);
    }

    #[test]
    fn missing_notes_tolerated() {
        let story: Story = serde_json::from_str(
            r#"{"title":"A","description":"d","acceptanceCriteria":"- x"}"#,
        )
        .unwrap();
        assert_eq!(story.notes, "");
    }

    #[test]
    fn stories_file_roundtrip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("stories.json");
        let stories = vec![
            Story {
                title: "Login".into(),
                description: "As a user I want to sign in".into(),
                acceptance_criteria: "- form validates input\n- session persists".into(),
                notes: "reuses the existing auth flow".into(),
                accepted: false,
            },
            Story {
                title: "Logout".into(),
                description: "As a user I want to sign out".into(),
                acceptance_criteria: "- session is cleared".into(),
                notes: String::new(),
                accepted: true,
            },
        ];
        save_stories(&path, &stories).unwrap();
        let loaded = load_stories(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        for (reloaded, saved) in loaded.iter().zip(&stories) {
            assert_eq!(reloaded.title, saved.title);
            assert_eq!(reloaded.description, saved.description);
            assert_eq!(reloaded.acceptance_criteria, saved.acceptance_criteria);
            assert_eq!(reloaded.notes, saved.notes);
            // The selection flag is transient: reloading yields accepted=true.
            assert!(reloaded.accepted);
        }
    }
}
