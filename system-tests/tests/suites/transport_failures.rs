// system-tests/tests/suites/transport_failures.rs
// ============================================================================
// Module: Transport Failure Tests
// Description: Unreachable, slow, and oversized responses.
// Purpose: Ensure transport failures surface as unreachable, never as violations.
// Dependencies: system-tests helpers, todos-contract
// ============================================================================

//! ## Overview
//! Transport failures must never be reported as contract violations.
//! Invariants:
//! - A closed port marks every scenario unreachable.
//! - Timeouts and body limits are classified by [`TransportError`] variant.

use std::time::Duration;

use helpers::artifacts::TestReporter;
use helpers::todos_stub::StubFaults;
use helpers::todos_stub::closed_collection_url;
use helpers::todos_stub::spawn_todos_stub_with_faults;
use todos_contract::ContractRunner;
use todos_contract::RunScope;
use todos_contract::ScenarioStatus;
use todos_contract::TodoTransport;
use todos_contract::TodosHttpClient;
use todos_contract::TransportError;
use todos_contract::scenario::contract_scenarios;
use todos_contract::scenario::find;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn closed_port_marks_every_scenario_unreachable() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("closed_port_marks_every_scenario_unreachable")?;
    let collection_url = closed_collection_url()?;
    let client = TodosHttpClient::new(&collection_url, Duration::from_secs(2))?;
    let runner = ContractRunner::new(client, RunScope::new("closed-run", true));

    let mut report = runner.run_all(&contract_scenarios(), &collection_url).await;
    report.transcript = runner.transport().transcript();
    let artifacts = reporter.artifacts().write_run_report(&report)?;

    for scenario in &report.scenarios {
        if scenario.status != ScenarioStatus::Unreachable {
            return Err(format!("{} finished {}", scenario.name, scenario.status.as_str()).into());
        }
        if scenario.transport_error.is_none() || !scenario.violations.is_empty() {
            return Err(format!("{} misattributed its failure", scenario.name).into());
        }
    }
    if report.transcript.iter().any(|record| record.status.is_some()) {
        return Err("transcript recorded a status from a closed port".into());
    }

    reporter.finish(
        "pass",
        vec!["closed port yielded unreachable scenarios only".to_string()],
        artifacts,
    )?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_service_times_out() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("slow_service_times_out")?;
    let stub = spawn_todos_stub_with_faults(StubFaults {
        delay: Some(Duration::from_secs(2)),
        ..StubFaults::default()
    })?;
    let client = TodosHttpClient::new(stub.collection_url(), Duration::from_millis(200))?;

    match client.list().await {
        Err(TransportError::Timeout(_)) => {}
        Err(other) => return Err(format!("expected timeout, got {other}").into()),
        Ok(response) => return Err(format!("expected timeout, got {}", response.status).into()),
    }

    let runner = ContractRunner::new(client, RunScope::new("slow-run", true));
    let scenario = find("read_collection").ok_or("read_collection missing")?;
    let outcome = runner.run_scenario(&scenario).await;
    if outcome.status != ScenarioStatus::Unreachable {
        return Err(format!("slow scenario finished {}", outcome.status.as_str()).into());
    }
    let error = outcome.transport_error.unwrap_or_default();
    if !error.contains("timed out") {
        return Err(format!("unexpected transport error {error}").into());
    }

    reporter.finish("pass", vec!["timeouts reported as unreachable".to_string()], Vec::new())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_body_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("oversized_body_is_rejected")?;
    let stub = spawn_todos_stub_with_faults(StubFaults {
        oversized_list: true,
        ..StubFaults::default()
    })?;
    let client =
        TodosHttpClient::new(stub.collection_url(), Duration::from_secs(5))?.with_max_body_bytes(1024);

    match client.list().await {
        Err(TransportError::ResponseTooLarge {
            actual,
            limit,
        }) if limit == 1024 && actual > limit => {}
        Err(other) => return Err(format!("expected size limit error, got {other}").into()),
        Ok(response) => {
            return Err(format!("expected size limit error, got {}", response.status).into());
        }
    }
    let transcript = client.transcript();
    let record = transcript.first().ok_or("empty transcript")?;
    if record.status.is_some() || record.error.is_none() {
        return Err("oversized exchange was not recorded as an error".into());
    }

    reporter.finish("pass", vec!["body limit enforced".to_string()], Vec::new())?;
    Ok(())
}
