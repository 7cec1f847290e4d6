// system-tests/tests/suites/client_operations.rs
// ============================================================================
// Module: Client Operation Tests
// Description: Each todos operation through the reqwest transport.
// Purpose: Validate status codes, bodies, and transcript capture over HTTP.
// Dependencies: system-tests helpers, todos-contract
// ============================================================================

//! ## Overview
//! Drives [`TodoTransport`] operations one at a time against the loopback
//! stub and checks what the client observed.

use std::time::Duration;

use helpers::artifacts::TestReporter;
use helpers::timeouts::resolve_timeout;
use helpers::todos_stub::spawn_todos_stub;
use todos_contract::ApiMethod;
use todos_contract::TodoFields;
use todos_contract::TodoTransport;
use todos_contract::TodosHttpClient;
use todos_contract::scenario::MISSING_PARAMETERS_MESSAGE;

use crate::helpers;

fn expect_status(operation: &str, actual: u16, expected: u16) -> Result<(), String> {
    if actual == expected {
        Ok(())
    } else {
        Err(format!("{operation} returned {actual}, expected {expected}"))
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn todo_lifecycle_over_http() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("todo_lifecycle_over_http")?;
    let stub = spawn_todos_stub()?;
    let client =
        TodosHttpClient::new(stub.collection_url(), resolve_timeout(Duration::from_secs(5)))?;

    let created = client.create(&TodoFields::full("Buy milk", "2016-01-01")).await?;
    expect_status("create", created.status, 201)?;
    let todo = created.todo()?;
    if todo.title != "Buy milk" || todo.due != "2016-01-01" {
        return Err("created todo does not echo its fields".into());
    }
    let id = created.todo_id().ok_or("create response carried no id")?;

    let read = client.read(&id).await?;
    expect_status("read", read.status, 200)?;
    if read.reason != "OK" {
        return Err(format!("unexpected reason phrase {}", read.reason).into());
    }
    let fetched = read.todo()?;
    if fetched.id != todo.id || fetched.title != "Buy milk" || fetched.due != "2016-01-01" {
        return Err("read does not return the created todo".into());
    }

    let listed = client.list().await?;
    expect_status("list", listed.status, 200)?;
    if !listed.is_collection() || !listed.body.contains("Buy milk") {
        return Err("list does not include the created todo".into());
    }

    let replaced = client.replace(&id, &TodoFields::full("Buy bread", "2016-02-02")).await?;
    expect_status("replace", replaced.status, 200)?;

    let updated = client.update(&id, &TodoFields::title_only("Buy butter")).await?;
    expect_status("update", updated.status, 200)?;
    let after_update = client.read(&id).await?.todo()?;
    if after_update.title != "Buy butter" || after_update.due != "2016-02-02" {
        return Err("partial update changed fields that were not sent".into());
    }

    let deleted = client.delete(&id).await?;
    expect_status("delete", deleted.status, 204)?;
    if !deleted.body_is_empty() {
        return Err("delete returned a body".into());
    }
    let gone = client.read(&id).await?;
    expect_status("read after delete", gone.status, 404)?;
    let again = client.delete(&id).await?;
    expect_status("second delete", again.status, 404)?;

    let transcript = client.transcript();
    let statuses: Vec<Option<u16>> = transcript.iter().map(|record| record.status).collect();
    let expected = [201, 200, 200, 200, 200, 200, 204, 404, 404].map(Some).to_vec();
    if statuses != expected {
        return Err("transcript statuses do not match the exchanges".into());
    }
    let in_order =
        transcript.iter().enumerate().all(|(index, record)| record.sequence == index as u64 + 1);
    if !in_order {
        return Err("transcript sequence numbers are not contiguous".into());
    }
    if stub.todo_count() != 0 {
        return Err("lifecycle left the todo behind".into());
    }

    let transcript_path = reporter.artifacts().write_json("transcript.json", &transcript)?;
    reporter.finish(
        "pass",
        vec!["create, read, list, replace, update, delete behaved as documented".to_string()],
        vec![transcript_path.display().to_string()],
    )?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn create_without_parameters_is_unprocessable() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("create_without_parameters_is_unprocessable")?;
    let stub = spawn_todos_stub()?;
    let client =
        TodosHttpClient::new(stub.collection_url(), resolve_timeout(Duration::from_secs(5)))?;

    let response = client.create(&TodoFields::none()).await?;
    expect_status("create without parameters", response.status, 422)?;
    if !response.body.contains(MISSING_PARAMETERS_MESSAGE) {
        return Err("422 body lacks the missing-parameters message".into());
    }
    if stub.todo_count() != 0 {
        return Err("rejected create still stored a todo".into());
    }
    let transcript = client.transcript();
    let record = transcript.first().ok_or("empty transcript")?;
    if record.method != ApiMethod::Post || !record.url.ends_with("/todos") {
        return Err(format!("unexpected transcript entry {}", record.url).into());
    }

    reporter.finish(
        "pass",
        vec!["parameterless create was rejected without side effects".to_string()],
        Vec::new(),
    )?;
    Ok(())
}
