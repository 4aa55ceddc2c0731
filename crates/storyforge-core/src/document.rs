use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// DocumentField
// ---------------------------------------------------------------------------

/// Auxiliary fields a source adapter may attach beyond title and body.
///
/// Backend-specific field names (`Microsoft.VSTS.Common.AcceptanceCriteria`,
/// `System.TeamProject`, …) are normalized into these keys inside the
/// adapter; nothing outside an adapter ever sees a backend key.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DocumentField {
    AcceptanceCriteria,
    Project,
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// A normalized source document: a tracker work item or a wiki page.
///
/// Immutable once fetched; fetched fresh for every operation, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<DocumentField, String>,
}

impl Document {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            body: body.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, field: DocumentField, value: impl Into<String>) -> Self {
        self.fields.insert(field, value.into());
        self
    }

    pub fn field(&self, field: DocumentField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
