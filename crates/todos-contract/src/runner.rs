// crates/todos-contract/src/runner.rs
// ============================================================================
// Module: Contract Runner
// Description: Executes contract scenarios against a todos transport.
// Purpose: Drive setup, steps, and teardown while attributing every failure.
// Dependencies: async-trait (via TodoTransport)
// ============================================================================

//! ## Overview
//! [`ContractRunner`] executes one [`ContractScenario`] at a time:
//!
//! 1. Setup creates (and for [`Fixture::Deleted`], deletes) the fixture.
//! 2. Steps run in order; the first step with violations ends the scenario.
//! 3. Teardown deletes every identifier the scenario still owns.
//!
//! Security posture: response bodies are untrusted input and are only ever
//! compared, never executed or followed.
//!
//! ## Ownership
//! The fixture id and any id returned by a `201` from a collection `POST` are
//! owned by the scenario. A `204` from a `DELETE` releases the id, so the
//! double-delete scenario never triggers a third delete in teardown.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use crate::audit::ContractAuditSink;
use crate::audit::ExchangeAuditEvent;
use crate::audit::ExchangeAuditEventParams;
use crate::audit::NoopAuditSink;
use crate::audit::ScenarioAuditEvent;
use crate::audit::now_millis;
use crate::expectation::BodyExpectation;
use crate::expectation::ContractViolation;
use crate::expectation::ResponseExpectation;
use crate::expectation::ViolationKind;
use crate::http::ApiMethod;
use crate::http::ApiRequest;
use crate::http::ApiResponse;
use crate::http::Endpoint;
use crate::http::TodoTransport;
use crate::http::TransportError;
use crate::http::elapsed_millis;
use crate::model::TodoField;
use crate::model::TodoId;
use crate::report::RunReport;
use crate::report::ScenarioReport;
use crate::report::ScenarioStatus;
use crate::report::StepPhase;
use crate::report::StepViolation;
use crate::scenario::ContractScenario;
use crate::scenario::ContractStep;
use crate::scenario::Fixture;
use crate::scenario::Target;
use crate::scope::RunScope;

// ============================================================================
// SECTION: Phase Labels
// ============================================================================

/// Audit label for fixture calls.
const PHASE_SETUP: &str = "setup";
/// Audit label for table steps.
const PHASE_STEP: &str = "step";
/// Audit label for cleanup calls.
const PHASE_TEARDOWN: &str = "teardown";

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Executes contract scenarios through a [`TodoTransport`].
pub struct ContractRunner<T: TodoTransport> {
    /// Transport used for every request.
    transport: T,
    /// Run identity and title tagging.
    scope: RunScope,
    /// Audit sink for exchanges and scenario results.
    sink: Arc<dyn ContractAuditSink>,
}

impl<T: TodoTransport> ContractRunner<T> {
    /// Creates a runner that discards audit events.
    #[must_use]
    pub fn new(transport: T, scope: RunScope) -> Self {
        Self {
            transport,
            scope,
            sink: Arc::new(NoopAuditSink),
        }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, sink: Arc<dyn ContractAuditSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the run scope.
    #[must_use]
    pub const fn scope(&self) -> &RunScope {
        &self.scope
    }

    /// Runs scenarios strictly in order and collects a run report.
    pub async fn run_all(&self, scenarios: &[ContractScenario], collection_url: &str) -> RunReport {
        let started_at_ms = now_millis();
        let mut reports = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            reports.push(self.run_scenario(scenario).await);
        }
        RunReport {
            run_id: self.scope.run_id().to_string(),
            collection_url: collection_url.to_string(),
            started_at_ms,
            ended_at_ms: now_millis(),
            scenarios: reports,
            transcript: Vec::new(),
        }
    }

    /// Runs one scenario, teardown included.
    pub async fn run_scenario(&self, scenario: &ContractScenario) -> ScenarioReport {
        let started = Instant::now();
        let mut state = ScenarioState::new(scenario.name);

        if let Some(fixture_id) = self.setup(scenario, &mut state).await {
            for step in &scenario.steps {
                let keep_going = self.run_step(step, fixture_id.as_ref(), &mut state).await;
                if !keep_going {
                    break;
                }
            }
        }
        self.teardown(&mut state).await;

        let status = state.status();
        let report = ScenarioReport {
            name: scenario.name.to_string(),
            group: scenario.group,
            status,
            violations: state.violations,
            transport_error: state.transport_error,
            teardown_notes: state.teardown_notes,
            exchanges: state.exchanges,
            duration_ms: elapsed_millis(started),
        };
        self.sink.record_scenario(&ScenarioAuditEvent::new(
            self.scope.run_id(),
            &report.name,
            report.status,
            report.violations.len(),
            report.teardown_notes.len(),
            report.duration_ms,
        ));
        report
    }

    /// Prepares the fixture.
    ///
    /// Returns `None` when setup failed and the steps must be skipped, and
    /// `Some(None)` for scenarios without a fixture.
    async fn setup(
        &self,
        scenario: &ContractScenario,
        state: &mut ScenarioState,
    ) -> Option<Option<TodoId>> {
        if scenario.fixture == Fixture::None {
            return Some(None);
        }
        let seed = scenario.seed.map_title(|title| self.scope.label(title));
        let request = ApiRequest::new(ApiMethod::Post, Endpoint::Collection).with_params(seed);
        let response = self.dispatch(PHASE_SETUP, &request, state).await?;
        let expected = ResponseExpectation::created()
            .with_body(BodyExpectation::FieldPresent(TodoField::Id));
        let violations = expected.check(&response);
        if !violations.is_empty() {
            state.record(StepPhase::Setup, "create fixture", violations);
            return None;
        }
        let Some(id) = response.todo_id() else {
            state.record(StepPhase::Setup, "create fixture", vec![unusable_id(&response)]);
            return None;
        };
        state.owned.push(id.clone());

        if scenario.fixture == Fixture::Deleted {
            let request = ApiRequest::new(ApiMethod::Delete, Endpoint::Item(id.clone()));
            let response = self.dispatch(PHASE_SETUP, &request, state).await?;
            state.observe(&request, &response);
            let violations = ResponseExpectation::no_content().check(&response);
            if !violations.is_empty() {
                state.record(StepPhase::Setup, "delete fixture", violations);
                return None;
            }
        }
        Some(Some(id))
    }

    /// Runs one step; returns false when the scenario must stop.
    async fn run_step(
        &self,
        step: &ContractStep,
        fixture_id: Option<&TodoId>,
        state: &mut ScenarioState,
    ) -> bool {
        let endpoint = match (step.target, fixture_id) {
            (Target::Collection, _) => Endpoint::Collection,
            (Target::Fixture, Some(id)) => Endpoint::Item(id.clone()),
            (Target::Fixture, None) => {
                state.record(StepPhase::Setup, step.label, vec![missing_fixture()]);
                return false;
            }
        };
        let params = step.params.map_title(|title| self.scope.label(title));
        let request = ApiRequest::new(step.method, endpoint).with_params(params);
        let Some(response) = self.dispatch(PHASE_STEP, &request, state).await else {
            return false;
        };
        state.observe(&request, &response);
        let violations = step.expect.map_titles(|title| self.scope.label(title)).check(&response);
        if violations.is_empty() {
            return true;
        }
        state.record(StepPhase::Step, step.label, violations);
        false
    }

    /// Deletes every identifier still owned, best-effort.
    async fn teardown(&self, state: &mut ScenarioState) {
        let owned = std::mem::take(&mut state.owned);
        for id in owned {
            let request = ApiRequest::new(ApiMethod::Delete, Endpoint::Item(id.clone()));
            state.exchanges = state.exchanges.saturating_add(1);
            let result = self.transport.send(&request).await;
            self.audit(PHASE_TEARDOWN, &request, &result, state.scenario);
            match result {
                Ok(response) if response.status == 204 => {}
                Ok(response) => state.teardown_notes.push(format!(
                    "delete item/{id} returned {} {}",
                    response.status, response.reason
                )),
                Err(err) => state.teardown_notes.push(format!("delete item/{id} failed: {err}")),
            }
        }
    }

    /// Sends a request, audits it, and records transport failures.
    ///
    /// Returns `None` when no response was obtained.
    async fn dispatch(
        &self,
        phase: &'static str,
        request: &ApiRequest,
        state: &mut ScenarioState,
    ) -> Option<ApiResponse> {
        state.exchanges = state.exchanges.saturating_add(1);
        let result = self.transport.send(request).await;
        self.audit(phase, request, &result, state.scenario);
        match result {
            Ok(response) => Some(response),
            Err(err) => {
                state.transport_error = Some(err.to_string());
                None
            }
        }
    }

    /// Emits an exchange audit event.
    fn audit(
        &self,
        phase: &'static str,
        request: &ApiRequest,
        result: &Result<ApiResponse, TransportError>,
        scenario: &str,
    ) {
        let (status, error, elapsed_ms) = match result {
            Ok(response) => (Some(response.status), None, response.elapsed_ms),
            Err(err) => (None, Some(err.to_string()), 0),
        };
        self.sink.record_exchange(&ExchangeAuditEvent::new(ExchangeAuditEventParams {
            run_id: self.scope.run_id().to_string(),
            scenario: scenario.to_string(),
            phase,
            method: request.method,
            target: request.endpoint.to_string(),
            status,
            error,
            elapsed_ms,
        }));
    }
}

// ============================================================================
// SECTION: Scenario State
// ============================================================================

/// Mutable bookkeeping for one scenario execution.
struct ScenarioState {
    /// Scenario name for audit events.
    scenario: &'static str,
    /// Identifiers to delete in teardown.
    owned: Vec<TodoId>,
    /// Violations observed so far.
    violations: Vec<StepViolation>,
    /// First transport failure, if any.
    transport_error: Option<String>,
    /// Teardown problems.
    teardown_notes: Vec<String>,
    /// Exchanges attempted.
    exchanges: u32,
}

impl ScenarioState {
    /// Creates empty state.
    const fn new(scenario: &'static str) -> Self {
        Self {
            scenario,
            owned: Vec::new(),
            violations: Vec::new(),
            transport_error: None,
            teardown_notes: Vec::new(),
            exchanges: 0,
        }
    }

    /// Applies ownership rules to an observed exchange.
    fn observe(&mut self, request: &ApiRequest, response: &ApiResponse) {
        match (request.method, &request.endpoint, response.status) {
            (ApiMethod::Post, Endpoint::Collection, 201) => {
                if let Some(id) = response.todo_id()
                    && !self.owned.contains(&id)
                {
                    self.owned.push(id);
                }
            }
            (ApiMethod::Delete, Endpoint::Item(id), 204) => {
                self.owned.retain(|owned| owned != id);
            }
            _ => {}
        }
    }

    /// Attributes violations to a step.
    fn record(&mut self, phase: StepPhase, step: &str, violations: Vec<ContractViolation>) {
        self.violations.extend(violations.into_iter().map(|violation| StepViolation {
            phase,
            step: step.to_string(),
            violation,
        }));
    }

    /// Final status; transport failures outrank violations.
    fn status(&self) -> ScenarioStatus {
        if self.transport_error.is_some() {
            ScenarioStatus::Unreachable
        } else if self.violations.is_empty() {
            ScenarioStatus::Passed
        } else {
            ScenarioStatus::Violated
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Violation for a created todo whose id is neither a string nor an integer.
fn unusable_id(response: &ApiResponse) -> ContractViolation {
    let actual = response
        .field(TodoField::Id)
        .map_or_else(|| "no id".to_string(), |value| value.to_string());
    ContractViolation {
        kind: ViolationKind::Body,
        expected: "id as string or non-negative integer".to_string(),
        actual,
    }
}

/// Violation for a step that targets a fixture the scenario never creates.
fn missing_fixture() -> ContractViolation {
    ContractViolation {
        kind: ViolationKind::Body,
        expected: "fixture id".to_string(),
        actual: "scenario has no fixture".to_string(),
    }
}
