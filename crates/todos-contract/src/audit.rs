// crates/todos-contract/src/audit.rs
// ============================================================================
// Module: Contract Audit Logging
// Description: Structured audit events for HTTP exchanges and scenario results.
// Purpose: Emit JSON-line logs without hard dependencies on a logging stack.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The runner reports every HTTP exchange and every finished scenario to a
//! [`ContractAuditSink`]. Sinks write one JSON object per line so output can
//! be routed to any log pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::http::ApiMethod;
use crate::report::ScenarioStatus;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome label for an exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExchangeOutcome {
    /// A response was received.
    Response,
    /// No response was received.
    TransportError,
}

/// HTTP exchange audit event.
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Run identifier.
    pub run_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Scenario phase (`setup`, `step`, `teardown`).
    pub phase: &'static str,
    /// HTTP method.
    pub method: ApiMethod,
    /// Endpoint label (`collection` or `item/<id>`).
    pub target: String,
    /// Status code when a response was received.
    pub status: Option<u16>,
    /// Outcome classification.
    pub outcome: ExchangeOutcome,
    /// Transport error text.
    pub error: Option<String>,
    /// Round-trip time in milliseconds.
    pub elapsed_ms: u64,
}

/// Inputs required to construct an exchange audit event.
pub struct ExchangeAuditEventParams {
    /// Run identifier.
    pub run_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Scenario phase.
    pub phase: &'static str,
    /// HTTP method.
    pub method: ApiMethod,
    /// Endpoint label.
    pub target: String,
    /// Status code when a response was received.
    pub status: Option<u16>,
    /// Transport error text.
    pub error: Option<String>,
    /// Round-trip time in milliseconds.
    pub elapsed_ms: u64,
}

/// Scenario completion audit event.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Run identifier.
    pub run_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Final status.
    pub status: ScenarioStatus,
    /// Number of contract violations.
    pub violations: usize,
    /// Number of teardown notes.
    pub teardown_notes: usize,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl ExchangeAuditEvent {
    /// Creates a new exchange event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ExchangeAuditEventParams) -> Self {
        let outcome = if params.error.is_some() {
            ExchangeOutcome::TransportError
        } else {
            ExchangeOutcome::Response
        };
        Self {
            event: "http_exchange",
            timestamp_ms: now_millis(),
            run_id: params.run_id,
            scenario: params.scenario,
            phase: params.phase,
            method: params.method,
            target: params.target,
            status: params.status,
            outcome,
            error: params.error,
            elapsed_ms: params.elapsed_ms,
        }
    }
}

impl ScenarioAuditEvent {
    /// Creates a new scenario event with a consistent timestamp.
    #[must_use]
    pub fn new(
        run_id: &str,
        scenario: &str,
        status: ScenarioStatus,
        violations: usize,
        teardown_notes: usize,
        duration_ms: u64,
    ) -> Self {
        Self {
            event: "scenario_finished",
            timestamp_ms: now_millis(),
            run_id: run_id.to_string(),
            scenario: scenario.to_string(),
            status,
            violations,
            teardown_notes,
            duration_ms,
        }
    }
}

/// Milliseconds since the epoch.
pub(crate) fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for harness events.
pub trait ContractAuditSink: Send + Sync {
    /// Record an HTTP exchange.
    fn record_exchange(&self, event: &ExchangeAuditEvent);

    /// Record a finished scenario.
    fn record_scenario(&self, _event: &ScenarioAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl ContractAuditSink for StderrAuditSink {
    fn record_exchange(&self, event: &ExchangeAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_scenario(&self, event: &ScenarioAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends a serialized event line.
    fn write_line<T: Serialize>(&self, event: &T) {
        let Ok(payload) = serde_json::to_string(event) else {
            return;
        };
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{payload}");
        }
    }
}

impl ContractAuditSink for FileAuditSink {
    fn record_exchange(&self, event: &ExchangeAuditEvent) {
        self.write_line(event);
    }

    fn record_scenario(&self, event: &ScenarioAuditEvent) {
        self.write_line(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl ContractAuditSink for NoopAuditSink {
    fn record_exchange(&self, _event: &ExchangeAuditEvent) {}
}
