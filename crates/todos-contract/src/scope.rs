// crates/todos-contract/src/scope.rs
// ============================================================================
// Module: Run Scope
// Description: Run identifiers and run-scoped todo titles.
// Purpose: Let concurrent runs against a shared endpoint tell their todos apart.
// Dependencies: rand
// ============================================================================

//! ## Overview
//! Every run carries an identifier. When title tagging is on, each title the
//! harness sends, and each title it expects back, gets ` [<run id>]` appended.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Length of the random run id suffix.
const RUN_SUFFIX_LEN: usize = 8;

// ============================================================================
// SECTION: Run Scope
// ============================================================================

/// Identity of one harness run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunScope {
    /// Run identifier.
    run_id: String,
    /// Whether titles are tagged with the run id.
    tag_titles: bool,
}

impl RunScope {
    /// Creates a scope with an explicit run id.
    #[must_use]
    pub fn new(run_id: impl Into<String>, tag_titles: bool) -> Self {
        Self {
            run_id: run_id.into(),
            tag_titles,
        }
    }

    /// Creates a scope with a generated run id.
    #[must_use]
    pub fn generated(tag_titles: bool) -> Self {
        Self::new(generate_run_id(), tag_titles)
    }

    /// Returns the run id.
    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Applies the run tag to a title.
    #[must_use]
    pub fn label(&self, title: &str) -> String {
        if self.tag_titles { format!("{title} [{}]", self.run_id) } else { title.to_string() }
    }
}

/// Generates `run-<millis>-<suffix>` with a lowercase alphanumeric suffix.
#[must_use]
pub fn generate_run_id() -> String {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RUN_SUFFIX_LEN)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect();
    format!("run-{millis}-{suffix}")
}
