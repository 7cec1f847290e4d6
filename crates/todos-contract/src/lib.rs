// crates/todos-contract/src/lib.rs
// ============================================================================
// Module: Todos Contract Library
// Description: Contract-test harness for the remote todos REST API.
// Purpose: Drive scripted HTTP scenarios and report contract conformance.
// Dependencies: reqwest, serde, serde_json, thiserror, toml, url
// ============================================================================

//! ## Overview
//! The todos contract harness issues HTTP requests against a todos collection
//! endpoint, checks each response against a [`ResponseExpectation`], and
//! reports per-scenario outcomes. Scenarios live in a single data table
//! ([`scenario::contract_scenarios`]) driven by a generic [`ContractRunner`].
//!
//! Transport failures ([`TransportError`]) and contract violations
//! ([`ContractViolation`]) are kept apart so a report can say "could not reach
//! the service" separately from "the service broke its contract".

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod config;
pub mod expectation;
pub mod http;
pub mod model;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod scope;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::ContractAuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use config::AuditSinkKind;
pub use config::ConfigError;
pub use config::HarnessConfig;
pub use expectation::BodyExpectation;
pub use expectation::ContractViolation;
pub use expectation::ResponseExpectation;
pub use expectation::ViolationKind;
pub use http::ApiMethod;
pub use http::ApiRequest;
pub use http::ApiResponse;
pub use http::Endpoint;
pub use http::ExchangeRecord;
pub use http::TodoTransport;
pub use http::TodosHttpClient;
pub use http::TransportError;
pub use model::Todo;
pub use model::TodoField;
pub use model::TodoFields;
pub use model::TodoId;
pub use report::RunReport;
pub use report::ScenarioReport;
pub use report::ScenarioStatus;
pub use report::StepPhase;
pub use report::StepViolation;
pub use runner::ContractRunner;
pub use scenario::ContractScenario;
pub use scenario::ContractStep;
pub use scenario::Fixture;
pub use scenario::ScenarioGroup;
pub use scenario::Target;
pub use scope::RunScope;
