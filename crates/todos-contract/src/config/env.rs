// crates/todos-contract/src/config/env.rs
// ============================================================================
// Module: Harness Environment
// Description: Environment-backed overrides for harness configuration.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 and empty values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use super::ConfigError;
use super::HarnessConfig;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Optional TOML config path.
    ConfigPath,
    /// Optional collection URL override.
    CollectionUrl,
    /// Optional timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Optional fixed run id.
    RunId,
    /// Title tagging toggle (`true`/`false` or `1`/`0`).
    TagTitles,
}

impl HarnessEnv {
    /// All keys, in documentation order.
    pub const ALL: [Self; 5] =
        [Self::ConfigPath, Self::CollectionUrl, Self::TimeoutSeconds, Self::RunId, Self::TagTitles];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigPath => "TODOS_CONTRACT_CONFIG",
            Self::CollectionUrl => "TODOS_CONTRACT_COLLECTION_URL",
            Self::TimeoutSeconds => "TODOS_CONTRACT_TIMEOUT_SEC",
            Self::RunId => "TODOS_CONTRACT_RUN_ID",
            Self::TagTitles => "TODOS_CONTRACT_TAG_TITLES",
        }
    }
}

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Applies every set environment override to `config`.
pub(super) fn apply_overrides(config: &mut HarnessConfig) -> Result<(), ConfigError> {
    if let Some(url) = read_env_nonempty(HarnessEnv::CollectionUrl.as_str())? {
        config.collection_url = url.trim().to_string();
    }
    if let Some(raw) = read_env_nonempty(HarnessEnv::TimeoutSeconds.as_str())? {
        config.timeout_secs = parse_timeout_seconds(HarnessEnv::TimeoutSeconds.as_str(), &raw)?;
    }
    if let Some(run_id) = read_env_nonempty(HarnessEnv::RunId.as_str())? {
        config.run_id = Some(run_id.trim().to_string());
    }
    if let Some(raw) = read_env_nonempty(HarnessEnv::TagTitles.as_str())? {
        config.tag_titles = parse_bool(HarnessEnv::TagTitles.as_str(), &raw)?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| ConfigError::Env(format!("{name} must be valid UTF-8")))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns [`ConfigError::Env`] when the value is not UTF-8 or is blank.
pub fn read_env_nonempty(name: &str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::Env(format!("{name} must not be empty")))
        }
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive number of seconds.
///
/// # Errors
///
/// Returns [`ConfigError::Env`] when the value is not a positive integer.
pub fn parse_timeout_seconds(name: &str, raw: &str) -> Result<u64, ConfigError> {
    let secs: u64 = raw.trim().parse().map_err(|_| {
        ConfigError::Env(format!("{name} must be a positive integer number of seconds"))
    })?;
    if secs == 0 {
        return Err(ConfigError::Env(format!("{name} must be greater than zero")));
    }
    Ok(secs)
}

/// Parses a boolean literal.
fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(ConfigError::Env(format!("{name} must be 1, 0, true, or false")))
}
