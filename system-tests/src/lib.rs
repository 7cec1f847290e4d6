// system-tests/src/lib.rs
// ============================================================================
// Module: Todos Contract System Tests Library
// Description: Shared configuration for system test suites.
// Purpose: Provide common settings for the todos contract system-test binaries.
// Dependencies: todos-contract, url
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the system-test binaries in
//! `system-tests/tests`. Suites run against a loopback todos stub by default;
//! the live suite targets a real endpoint only when one is configured.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
