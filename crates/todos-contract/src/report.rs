// crates/todos-contract/src/report.rs
// ============================================================================
// Module: Contract Reports
// Description: Per-scenario and per-run outcome records.
// Purpose: Attribute failures to the transport or to the contract.
// Dependencies: serde, serde_jcs
// ============================================================================

//! ## Overview
//! Outcomes are data. A scenario is `Passed`, `Violated` (the service answered
//! but broke the contract), or `Unreachable` (no response was obtained).
//! Teardown problems are notes and never change a status.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use serde::Serialize;

use crate::expectation::ContractViolation;
use crate::http::ExchangeRecord;
use crate::scenario::ScenarioGroup;

// ============================================================================
// SECTION: Scenario Outcomes
// ============================================================================

/// Final status of a scenario.
///
/// # Invariants
/// - Ordered by severity: `Passed < Violated < Unreachable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    /// Every expectation held.
    Passed,
    /// The service responded but diverged from the contract.
    Violated,
    /// The service could not be reached.
    Unreachable,
}

impl ScenarioStatus {
    /// Returns a stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Violated => "violated",
            Self::Unreachable => "unreachable",
        }
    }
}

/// Scenario phase a violation was observed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPhase {
    /// Fixture creation or deletion.
    Setup,
    /// A table step.
    Step,
}

/// A violation attributed to a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepViolation {
    /// Phase of the failing call.
    pub phase: StepPhase,
    /// Step label (or setup action).
    pub step: String,
    /// The mismatch.
    pub violation: ContractViolation,
}

/// Outcome of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: String,
    /// Verb group.
    pub group: ScenarioGroup,
    /// Final status.
    pub status: ScenarioStatus,
    /// Contract violations, in observation order.
    pub violations: Vec<StepViolation>,
    /// Transport failure text for unreachable scenarios.
    pub transport_error: Option<String>,
    /// Best-effort teardown notes.
    pub teardown_notes: Vec<String>,
    /// Number of HTTP exchanges attempted, teardown included.
    pub exchanges: u32,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl ScenarioReport {
    /// Returns true when the scenario passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }
}

// ============================================================================
// SECTION: Run Report
// ============================================================================

/// Outcome of a full run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Run identifier.
    pub run_id: String,
    /// Collection URL exercised.
    pub collection_url: String,
    /// Run start (milliseconds since epoch).
    pub started_at_ms: u128,
    /// Run end (milliseconds since epoch).
    pub ended_at_ms: u128,
    /// Scenario outcomes in execution order.
    pub scenarios: Vec<ScenarioReport>,
    /// Client transcript, when captured.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub transcript: Vec<ExchangeRecord>,
}

impl RunReport {
    /// Returns the most severe scenario status (`Passed` for an empty run).
    #[must_use]
    pub fn worst_status(&self) -> ScenarioStatus {
        self.scenarios
            .iter()
            .map(|scenario| scenario.status)
            .max()
            .unwrap_or(ScenarioStatus::Passed)
    }

    /// Returns true when every scenario passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.worst_status() == ScenarioStatus::Passed
    }

    /// Counts scenarios with a status.
    #[must_use]
    pub fn count(&self, status: ScenarioStatus) -> usize {
        self.scenarios.iter().filter(|scenario| scenario.status == status).count()
    }

    /// Serializes the report as canonical JSON.
    ///
    /// # Errors
    ///
    /// Returns the serialization error text.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>, String> {
        serde_jcs::to_vec(self).map_err(|err| err.to_string())
    }

    /// Renders a Markdown summary.
    #[must_use]
    pub fn summary_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Todos Contract Summary\n\n");
        let _ = writeln!(out, "- Run: {}", self.run_id);
        let _ = writeln!(out, "- Endpoint: {}", self.collection_url);
        let _ = writeln!(
            out,
            "- Passed: {} / Violated: {} / Unreachable: {}",
            self.count(ScenarioStatus::Passed),
            self.count(ScenarioStatus::Violated),
            self.count(ScenarioStatus::Unreachable)
        );
        out.push_str("\n## Scenarios\n\n");
        if self.scenarios.is_empty() {
            out.push_str("- None\n");
        }
        for scenario in &self.scenarios {
            let _ = writeln!(
                out,
                "- {} ({}): {}",
                scenario.name,
                scenario.group,
                scenario.status.as_str()
            );
            for entry in &scenario.violations {
                let _ = writeln!(out, "  - {}: {}", entry.step, entry.violation);
            }
            if let Some(error) = &scenario.transport_error {
                let _ = writeln!(out, "  - transport: {error}");
            }
            for note in &scenario.teardown_notes {
                let _ = writeln!(out, "  - teardown: {note}");
            }
        }
        out
    }

    /// Renders one line per scenario for terminal output.
    #[must_use]
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.scenarios.len().saturating_add(1));
        for scenario in &self.scenarios {
            let mut line = format!(
                "{:<12} {:<28} {}ms",
                scenario.status.as_str(),
                scenario.name,
                scenario.duration_ms
            );
            if let Some(first) = scenario.violations.first() {
                let _ = write!(line, "  [{}] {}", first.step, first.violation);
            } else if let Some(error) = &scenario.transport_error {
                let _ = write!(line, "  {error}");
            }
            lines.push(line);
        }
        lines.push(format!(
            "{} passed, {} violated, {} unreachable",
            self.count(ScenarioStatus::Passed),
            self.count(ScenarioStatus::Violated),
            self.count(ScenarioStatus::Unreachable)
        ));
        lines
    }
}
