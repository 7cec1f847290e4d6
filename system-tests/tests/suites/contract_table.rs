// system-tests/tests/suites/contract_table.rs
// ============================================================================
// Module: Contract Table Tests
// Description: Full scenario table against the loopback todos stub.
// Purpose: Validate pass outcomes, title tagging, and fixture cleanup.
// Dependencies: system-tests helpers, todos-contract
// ============================================================================

//! ## Overview
//! Runs the contract table against a conforming in-memory service.
//! Invariants:
//! - A conforming service yields a passing report for every scenario.
//! - Every todo created by a run is gone once the run finishes.
//! - Concurrent runs with distinct run ids do not disturb each other.

use std::time::Duration;

use helpers::artifacts::TestReporter;
use helpers::timeouts::resolve_timeout;
use helpers::todos_stub::TodosStubHandle;
use helpers::todos_stub::spawn_todos_stub;
use todos_contract::ApiMethod;
use todos_contract::ContractRunner;
use todos_contract::RunScope;
use todos_contract::ScenarioGroup;
use todos_contract::ScenarioStatus;
use todos_contract::TodosHttpClient;
use todos_contract::scenario::by_group;
use todos_contract::scenario::contract_scenarios;
use todos_contract::scenario::find;

use crate::helpers;

fn runner_for(
    stub: &TodosStubHandle,
    run_id: &str,
) -> Result<ContractRunner<TodosHttpClient>, Box<dyn std::error::Error>> {
    let client =
        TodosHttpClient::new(stub.collection_url(), resolve_timeout(Duration::from_secs(5)))?;
    Ok(ContractRunner::new(client, RunScope::new(run_id, true)))
}

fn request_line(method: &str, path: &str) -> String {
    format!("{method} {path}")
}

#[tokio::test(flavor = "multi_thread")]
async fn full_table_passes_against_conforming_service() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("full_table_passes_against_conforming_service")?;
    let stub = spawn_todos_stub()?;
    let runner = runner_for(&stub, "table-run")?;

    let mut report = runner.run_all(&contract_scenarios(), stub.collection_url()).await;
    report.transcript = runner.transport().transcript();
    let artifacts = reporter.artifacts().write_run_report(&report)?;

    if report.scenarios.len() != 15 {
        return Err(format!("expected 15 scenarios, got {}", report.scenarios.len()).into());
    }
    if let Some(failed) = report.scenarios.iter().find(|scenario| !scenario.passed()) {
        return Err(format!("{} finished {}", failed.name, failed.status.as_str()).into());
    }
    if report.run_id != "table-run" {
        return Err(format!("unexpected run id {}", report.run_id).into());
    }
    if stub.todo_count() != 0 {
        return Err(format!("run left todos behind: {}", stub.titles().join(", ")).into());
    }
    let attempted: u32 = report.scenarios.iter().map(|scenario| scenario.exchanges).sum();
    if usize::try_from(attempted)? != report.transcript.len() {
        return Err(format!(
            "exchange count {attempted} does not match transcript length {}",
            report.transcript.len()
        )
        .into());
    }

    reporter.finish(
        "pass",
        vec!["all contract scenarios passed and the collection is empty".to_string()],
        artifacts,
    )?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn created_titles_carry_the_run_id() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("created_titles_carry_the_run_id")?;
    let stub = spawn_todos_stub()?;
    let runner = runner_for(&stub, "tag-run")?;
    let scenario = find("create_in_collection").ok_or("create_in_collection missing")?;

    let outcome = runner.run_scenario(&scenario).await;
    if !outcome.passed() {
        return Err(format!("create_in_collection finished {}", outcome.status.as_str()).into());
    }
    let transcript = runner.transport().transcript();
    let create = transcript
        .iter()
        .find(|record| record.method == ApiMethod::Post)
        .ok_or("no POST in transcript")?;
    if !create.url.contains("%5Btag-run%5D") {
        return Err(format!("create url lacks run tag: {}", create.url).into());
    }
    let cleanup = transcript.last().ok_or("empty transcript")?;
    if cleanup.method != ApiMethod::Delete || cleanup.status != Some(204) {
        return Err("created todo was not torn down".into());
    }

    reporter.finish(
        "pass",
        vec!["created todo title was tagged and torn down".to_string()],
        Vec::new(),
    )?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_group_issues_expected_requests() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("delete_group_issues_expected_requests")?;
    let stub = spawn_todos_stub()?;
    let runner = runner_for(&stub, "delete-run")?;

    let report = runner.run_all(&by_group(ScenarioGroup::Delete), stub.collection_url()).await;
    if !report.all_passed() {
        return Err("delete group did not pass".into());
    }
    let seen: Vec<String> = stub
        .requests()
        .iter()
        .map(|request| request_line(&request.method, &request.path))
        .collect();
    let expected = vec![
        request_line("POST", "/todos"),
        request_line("DELETE", "/todos/1"),
        request_line("POST", "/todos"),
        request_line("DELETE", "/todos/2"),
        request_line("DELETE", "/todos/2"),
        request_line("DELETE", "/todos"),
    ];
    if seen != expected {
        return Err(format!("unexpected request sequence: {}", seen.join(", ")).into());
    }

    reporter.finish(
        "pass",
        vec!["double delete issued exactly two item deletes".to_string()],
        Vec::new(),
    )?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_item_scenarios_target_a_deleted_fixture() -> Result<(), Box<dyn std::error::Error>>
{
    let mut reporter = TestReporter::new("missing_item_scenarios_target_a_deleted_fixture")?;
    let stub = spawn_todos_stub()?;
    let runner = runner_for(&stub, "missing-run")?;
    let scenario = find("read_missing_item").ok_or("read_missing_item missing")?;

    let outcome = runner.run_scenario(&scenario).await;
    if !outcome.passed() {
        return Err(format!("read_missing_item finished {}", outcome.status.as_str()).into());
    }
    let seen: Vec<String> = stub
        .requests()
        .iter()
        .map(|request| request_line(&request.method, &request.path))
        .collect();
    let expected = vec![
        request_line("POST", "/todos"),
        request_line("DELETE", "/todos/1"),
        request_line("GET", "/todos/1"),
    ];
    if seen != expected {
        return Err(format!("unexpected request sequence: {}", seen.join(", ")).into());
    }

    reporter.finish(
        "pass",
        vec!["missing-item read targeted an id the run created and deleted".to_string()],
        Vec::new(),
    )?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_runs_stay_isolated() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("concurrent_runs_stay_isolated")?;
    let stub = spawn_todos_stub()?;
    let first = runner_for(&stub, "run-a")?;
    let second = runner_for(&stub, "run-b")?;
    let scenarios = contract_scenarios();

    let (left, right) = tokio::join!(
        first.run_all(&scenarios, stub.collection_url()),
        second.run_all(&scenarios, stub.collection_url())
    );
    for report in [&left, &right] {
        if report.worst_status() != ScenarioStatus::Passed {
            return Err(format!("run {} did not pass", report.run_id).into());
        }
    }
    if stub.todo_count() != 0 {
        return Err(format!("runs left todos behind: {}", stub.titles().join(", ")).into());
    }

    reporter.finish(
        "pass",
        vec!["two concurrent runs passed and cleaned up".to_string()],
        Vec::new(),
    )?;
    Ok(())
}
