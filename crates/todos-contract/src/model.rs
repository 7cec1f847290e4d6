// crates/todos-contract/src/model.rs
// ============================================================================
// Module: Todo Model
// Description: Wire types for the todos resource.
// Purpose: Represent server-owned todos and the request fields that mutate them.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A todo is owned entirely by the remote service. The harness only holds the
//! identifiers it needs for teardown and the field values it expects back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifiers
// ============================================================================

/// Server-assigned todo identifier.
///
/// # Invariants
/// - Never constructed by the harness for a live todo; always read back from a
///   create response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TodoId {
    /// Numeric identifier.
    Number(u64),
    /// Textual identifier.
    Text(String),
}

impl TodoId {
    /// Extracts an identifier from a JSON value, accepting numbers and strings.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(number) => number.as_u64().map(Self::Number),
            serde_json::Value::String(text) if !text.trim().is_empty() => {
                Some(Self::Text(text.clone()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

// ============================================================================
// SECTION: Resource
// ============================================================================

/// A todo as returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Server-assigned identifier.
    pub id: TodoId,
    /// Todo title.
    pub title: String,
    /// Due date text; the service does not validate its format.
    pub due: String,
}

/// Named todo attributes addressable in expectations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoField {
    /// The `id` attribute.
    Id,
    /// The `title` attribute.
    Title,
    /// The `due` attribute.
    Due,
}

impl TodoField {
    /// Returns the JSON key for the field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Due => "due",
        }
    }
}

// ============================================================================
// SECTION: Request Fields
// ============================================================================

/// Request parameters for create, replace, and update calls.
///
/// Only fields that are `Some` are sent, which is what makes PATCH partial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TodoFields {
    /// Title parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Due date parameter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

impl TodoFields {
    /// Builds a field set with both title and due.
    #[must_use]
    pub fn full(title: impl Into<String>, due: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            due: Some(due.into()),
        }
    }

    /// Builds a field set carrying only a title.
    #[must_use]
    pub fn title_only(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            due: None,
        }
    }

    /// Returns an empty field set.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            title: None,
            due: None,
        }
    }

    /// Returns true when no parameter will be sent.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.due.is_none()
    }

    /// Returns the parameters as ordered `(name, value)` pairs.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(title) = &self.title {
            pairs.push((TodoField::Title.as_str(), title.as_str()));
        }
        if let Some(due) = &self.due {
            pairs.push((TodoField::Due.as_str(), due.as_str()));
        }
        pairs
    }

    /// Returns a copy with the title rewritten by `label`.
    #[must_use]
    pub fn map_title(&self, label: impl FnOnce(&str) -> String) -> Self {
        Self {
            title: self.title.as_deref().map(label),
            due: self.due.clone(),
        }
    }
}
