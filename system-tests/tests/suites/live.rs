// system-tests/tests/suites/live.rs
// ============================================================================
// Module: Live Service Tests
// Description: Contract table against a real todos deployment.
// Purpose: Certify a deployment when `TODOS_SYSTEM_TEST_LIVE_URL` is set.
// Dependencies: system-tests, todos-contract
// ============================================================================

//! ## Overview
//! Runs the contract table against a remote collection URL. The test records
//! a skip summary and returns early when no live URL is configured.
//! Security posture: the remote service is untrusted; only status codes and
//! bodies are inspected.

use std::time::Duration;

use helpers::artifacts::TestReporter;
use helpers::timeouts::resolve_timeout;
use system_tests::config::SystemTestConfig;
use todos_contract::ContractRunner;
use todos_contract::RunScope;
use todos_contract::TodosHttpClient;
use todos_contract::scenario::contract_scenarios;

use crate::helpers;

#[tokio::test(flavor = "multi_thread")]
async fn live_service_honors_contract() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("live_service_honors_contract")?;
    let config = SystemTestConfig::load()?;
    let Some(collection_url) = config.live_url else {
        reporter.finish(
            "skip",
            vec!["TODOS_SYSTEM_TEST_LIVE_URL not set".to_string()],
            Vec::new(),
        )?;
        return Ok(());
    };

    let client = TodosHttpClient::new(&collection_url, resolve_timeout(Duration::from_secs(30)))?;
    let runner = ContractRunner::new(client, RunScope::generated(true));
    let mut report = runner.run_all(&contract_scenarios(), &collection_url).await;
    report.transcript = runner.transport().transcript();
    let artifacts = reporter.artifacts().write_run_report(&report)?;

    if !report.all_passed() {
        let failing: Vec<String> = report
            .scenarios
            .iter()
            .filter(|scenario| !scenario.passed())
            .map(|scenario| format!("{} ({})", scenario.name, scenario.status.as_str()))
            .collect();
        reporter.finish("fail", failing.clone(), artifacts)?;
        return Err(format!("live run {} failed: {}", report.run_id, failing.join(", ")).into());
    }

    reporter.finish("pass", report.summary_lines(), artifacts)?;
    Ok(())
}
