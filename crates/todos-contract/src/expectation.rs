// crates/todos-contract/src/expectation.rs
// ============================================================================
// Module: Response Expectations
// Description: Expected status, reason phrase, and body checks.
// Purpose: Compare observed responses with the todos API contract.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ResponseExpectation`] is pure data. Checking it against an
//! [`ApiResponse`] never fails; it returns every mismatch as a
//! [`ContractViolation`] so reports can show all of them at once.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::http::ApiResponse;
use crate::model::TodoField;

/// Longest body excerpt quoted in a violation.
const MAX_EXCERPT_CHARS: usize = 200;

// ============================================================================
// SECTION: Expectations
// ============================================================================

/// A single check on the response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "check", content = "value", rename_all = "snake_case")]
pub enum BodyExpectation {
    /// No constraint.
    Any,
    /// Body is empty or whitespace only.
    Empty,
    /// Body equals the text once leading and trailing whitespace is
    /// trimmed from both sides; interior bytes must match exactly, so a
    /// trailing newline passes but a changed word or inner space does not.
    Exact(String),
    /// Body contains the text.
    Contains(String),
    /// Body is a JSON object whose field renders to the value.
    FieldEquals {
        /// Field to inspect.
        field: TodoField,
        /// Expected text rendering.
        value: String,
    },
    /// Body is a JSON object carrying a non-null field.
    FieldPresent(TodoField),
    /// Body is a JSON array.
    Collection,
}

impl BodyExpectation {
    /// Shorthand for a field equality check.
    #[must_use]
    pub fn field(field: TodoField, value: impl Into<String>) -> Self {
        Self::FieldEquals {
            field,
            value: value.into(),
        }
    }

    /// Checks the body, returning the mismatch description on failure.
    fn check(&self, response: &ApiResponse) -> Option<ContractViolation> {
        let passed = match self {
            Self::Any => true,
            Self::Empty => response.body_is_empty(),
            Self::Exact(text) => response.body.trim() == text.trim(),
            Self::Contains(text) => response.body.contains(text.as_str()),
            Self::FieldEquals {
                field,
                value,
            } => response.field_text(*field).as_deref() == Some(value.as_str()),
            Self::FieldPresent(field) => {
                response.field(*field).is_some_and(|value| !value.is_null())
            }
            Self::Collection => response.is_collection(),
        };
        if passed {
            return None;
        }
        let actual = match self {
            Self::FieldEquals {
                field, ..
            }
            | Self::FieldPresent(field) => match response.field(*field) {
                Some(value) => format!("{}={}", field.as_str(), value),
                None => format!("no `{}` field in {}", field.as_str(), excerpt(&response.body)),
            },
            Self::Collection => match response.json() {
                Some(value) => format!("json {}", json_kind(&value)),
                None => format!("non-json body {}", excerpt(&response.body)),
            },
            _ => excerpt(&response.body),
        };
        Some(ContractViolation {
            kind: ViolationKind::Body,
            expected: self.to_string(),
            actual,
        })
    }
}

impl fmt::Display for BodyExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any body"),
            Self::Empty => f.write_str("empty body"),
            Self::Exact(text) => write!(f, "body == \"{text}\""),
            Self::Contains(text) => write!(f, "body contains \"{text}\""),
            Self::FieldEquals {
                field,
                value,
            } => write!(f, "{} == \"{value}\"", field.as_str()),
            Self::FieldPresent(field) => write!(f, "{} present", field.as_str()),
            Self::Collection => f.write_str("json array body"),
        }
    }
}

/// Expected outcome of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseExpectation {
    /// Expected status code.
    pub status: u16,
    /// Expected reason phrase; `None` leaves it unchecked.
    pub reason: Option<String>,
    /// Body checks, all of which must hold.
    pub body: Vec<BodyExpectation>,
}

impl ResponseExpectation {
    /// Expects a status code and reason phrase with no body constraint.
    #[must_use]
    pub fn status(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: Some(reason.into()),
            body: Vec::new(),
        }
    }

    /// Expects a status code only.
    #[must_use]
    pub const fn code(status: u16) -> Self {
        Self {
            status,
            reason: None,
            body: Vec::new(),
        }
    }

    /// `200 OK`.
    #[must_use]
    pub fn ok() -> Self {
        Self::status(200, "OK")
    }

    /// `201 Created`.
    #[must_use]
    pub fn created() -> Self {
        Self::status(201, "Created")
    }

    /// `204 No Content` with an empty body.
    #[must_use]
    pub fn no_content() -> Self {
        Self::status(204, "No Content").with_body(BodyExpectation::Empty)
    }

    /// `404 Not Found` with an empty body.
    #[must_use]
    pub fn not_found() -> Self {
        Self::status(404, "Not Found").with_body(BodyExpectation::Empty)
    }

    /// `405 Method Not Allowed`.
    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::status(405, "Method Not Allowed")
    }

    /// `422`, reason phrase unchecked.
    #[must_use]
    pub const fn unprocessable() -> Self {
        Self::code(422)
    }

    /// Adds a body check.
    #[must_use]
    pub fn with_body(mut self, check: BodyExpectation) -> Self {
        self.body.push(check);
        self
    }

    /// Returns a copy with every title value rewritten by `label`.
    #[must_use]
    pub fn map_titles(&self, label: impl Fn(&str) -> String) -> Self {
        let body = self
            .body
            .iter()
            .map(|check| match check {
                BodyExpectation::FieldEquals {
                    field: TodoField::Title,
                    value,
                } => BodyExpectation::field(TodoField::Title, label(value)),
                other => other.clone(),
            })
            .collect();
        Self {
            status: self.status,
            reason: self.reason.clone(),
            body,
        }
    }

    /// Checks a response, returning every mismatch.
    ///
    /// A status mismatch is reported alone; reason and body checks run only
    /// when the status matches.
    #[must_use]
    pub fn check(&self, response: &ApiResponse) -> Vec<ContractViolation> {
        if response.status != self.status {
            return vec![ContractViolation {
                kind: ViolationKind::Status,
                expected: self.status.to_string(),
                actual: format!("{} ({})", response.status, excerpt(&response.body)),
            }];
        }
        let mut violations = Vec::new();
        if let Some(reason) = &self.reason
            && response.reason != *reason
        {
            violations.push(ContractViolation {
                kind: ViolationKind::Reason,
                expected: reason.clone(),
                actual: response.reason.clone(),
            });
        }
        violations.extend(self.body.iter().filter_map(|check| check.check(response)));
        violations
    }
}

// ============================================================================
// SECTION: Violations
// ============================================================================

/// Which part of a response diverged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Status code mismatch.
    Status,
    /// Reason phrase mismatch.
    Reason,
    /// Body mismatch.
    Body,
}

impl ViolationKind {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Reason => "reason",
            Self::Body => "body",
        }
    }
}

/// An observed divergence from the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractViolation {
    /// Divergent response part.
    pub kind: ViolationKind,
    /// Expected value description.
    pub expected: String,
    /// Observed value description.
    pub actual: String,
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: expected {}, got {}", self.kind.as_str(), self.expected, self.actual)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Quotes a bounded prefix of a body.
fn excerpt(body: &str) -> String {
    if body.trim().is_empty() {
        return "empty body".to_string();
    }
    let mut text: String = body.chars().take(MAX_EXCERPT_CHARS).collect();
    if body.chars().count() > MAX_EXCERPT_CHARS {
        text.push_str("...");
    }
    format!("\"{text}\"")
}

/// Names the JSON value kind.
const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
