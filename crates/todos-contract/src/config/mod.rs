// crates/todos-contract/src/config/mod.rs
// ============================================================================
// Module: Harness Configuration
// Description: Configuration loading and validation for the contract harness.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! Configuration resolves in three layers: built-in defaults, an optional TOML
//! file, then environment overrides. Callers such as the CLI apply their own
//! flags last and call [`HarnessConfig::validate`] again.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

pub use env::HarnessEnv;
pub use env::parse_timeout_seconds;
pub use env::read_env_nonempty;
pub use env::read_env_strict;

use crate::audit::ContractAuditSink;
use crate::audit::FileAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::StderrAuditSink;
use crate::scope::RunScope;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default collection endpoint.
pub const DEFAULT_COLLECTION_URL: &str = "http://lacedeamon.spartaglobal.com/todos";
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Maximum request timeout in seconds.
pub const MAX_TIMEOUT_SECS: u64 = 300;
/// Maximum configurable response body limit.
pub const MAX_BODY_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Maximum run id length.
pub const MAX_RUN_ID_LENGTH: usize = 64;
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Audit sink selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard audit events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to a file.
    File,
}

/// Audit configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Selected sink.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log path for the file sink.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Contract harness configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    /// Collection endpoint URL.
    #[serde(default = "default_collection_url")]
    pub collection_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Maximum accepted response body size.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// Fixed run id; generated when absent.
    #[serde(default)]
    pub run_id: Option<String>,
    /// Whether titles are tagged with the run id.
    #[serde(default = "default_tag_titles")]
    pub tag_titles: bool,
    /// Audit logging.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            collection_url: default_collection_url(),
            timeout_secs: default_timeout_secs(),
            max_body_bytes: default_max_body_bytes(),
            run_id: None,
            tag_titles: default_tag_titles(),
            audit: AuditConfig::default(),
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from an explicit path, the config env var, or
    /// defaults, then applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading, overriding, or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = match path {
            Some(path) => Some(path.to_path_buf()),
            None => read_env_nonempty(HarnessEnv::ConfigPath.as_str())?.map(PathBuf::from),
        };
        let mut config = match resolved {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a TOML file without applying environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file is unreadable, too large, not
    /// UTF-8, or not valid TOML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown keys.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies environment overrides in place.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when an override is malformed.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        env::apply_overrides(self)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_collection_url(&self.collection_url)?;
        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Invalid(format!(
                "timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}"
            )));
        }
        if self.max_body_bytes == 0 || self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "max_body_bytes must be between 1 and {MAX_BODY_BYTES_LIMIT}"
            )));
        }
        if let Some(run_id) = &self.run_id {
            validate_run_id(run_id)?;
        }
        if self.audit.sink == AuditSinkKind::File && self.audit.path.is_none() {
            return Err(ConfigError::Invalid("audit.path is required for the file sink".to_string()));
        }
        Ok(())
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the run scope, generating a run id when none is configured.
    #[must_use]
    pub fn run_scope(&self) -> RunScope {
        match &self.run_id {
            Some(run_id) => RunScope::new(run_id.clone(), self.tag_titles),
            None => RunScope::generated(self.tag_titles),
        }
    }

    /// Builds the configured audit sink.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the audit file cannot be opened.
    pub fn audit_sink(&self) -> Result<Box<dyn ContractAuditSink>, ConfigError> {
        match self.audit.sink {
            AuditSinkKind::None => Ok(Box::new(NoopAuditSink)),
            AuditSinkKind::Stderr => Ok(Box::new(StderrAuditSink)),
            AuditSinkKind::File => {
                let path = self.audit.path.as_deref().ok_or_else(|| {
                    ConfigError::Invalid("audit.path is required for the file sink".to_string())
                })?;
                let sink = FileAuditSink::new(path).map_err(|err| ConfigError::Io(err.to_string()))?;
                Ok(Box::new(sink))
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Invalid environment override.
    #[error("invalid environment: {0}")]
    Env(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Default collection URL.
fn default_collection_url() -> String {
    DEFAULT_COLLECTION_URL.to_string()
}

/// Default timeout.
const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Default body limit.
const fn default_max_body_bytes() -> usize {
    crate::http::DEFAULT_MAX_BODY_BYTES
}

/// Title tagging is on unless disabled.
const fn default_tag_titles() -> bool {
    true
}

/// Checks scheme, host, and absence of query and fragment.
fn validate_collection_url(raw: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|err| ConfigError::Invalid(format!("collection_url is invalid: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid("collection_url must use http or https".to_string()));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::Invalid("collection_url must include a host".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::Invalid(
            "collection_url must not carry a query or fragment".to_string(),
        ));
    }
    Ok(())
}

/// Checks run id length and charset.
fn validate_run_id(run_id: &str) -> Result<(), ConfigError> {
    if run_id.is_empty() || run_id.len() > MAX_RUN_ID_LENGTH {
        return Err(ConfigError::Invalid(format!(
            "run_id must be 1 to {MAX_RUN_ID_LENGTH} characters"
        )));
    }
    if !run_id.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_') {
        return Err(ConfigError::Invalid(
            "run_id may only contain ASCII letters, digits, '-' and '_'".to_string(),
        ));
    }
    Ok(())
}
