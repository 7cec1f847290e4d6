// system-tests/src/config.rs
// ============================================================================
// Module: System Test Configuration
// Description: Environment switches for the system-test suites.
// Purpose: Locate artifacts, stretch timeouts, and opt into the live suite.
// Dependencies: todos-contract, url
// ============================================================================

//! ## Overview
//! Three `TODOS_SYSTEM_TEST_*` variables steer the suites. Values are read
//! through the harness's strict env helpers, so blank or non-UTF-8 values are
//! rejected the same way the CLI rejects them.

use std::path::PathBuf;
use std::time::Duration;

use todos_contract::config::parse_timeout_seconds;
use todos_contract::config::read_env_nonempty;
use url::Url;


/// Environment keys read by the suites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Directory receiving per-test artifacts.
    RunRoot,
    /// Collection URL of a live todos service.
    LiveUrl,
    /// Minimum per-request timeout in seconds.
    TimeoutSeconds,
}

impl SystemTestEnv {
    /// Every key, in documentation order.
    pub const ALL: [Self; 3] = [Self::RunRoot, Self::LiveUrl, Self::TimeoutSeconds];

    /// Returns the variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "TODOS_SYSTEM_TEST_RUN_ROOT",
            Self::LiveUrl => "TODOS_SYSTEM_TEST_LIVE_URL",
            Self::TimeoutSeconds => "TODOS_SYSTEM_TEST_TIMEOUT_SEC",
        }
    }
}

/// Suite settings; every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Artifact root; defaults to `target/system-tests/run_<millis>`.
    pub run_root: Option<PathBuf>,
    /// Live collection URL; the live suite skips when unset.
    pub live_url: Option<String>,
    /// Timeout floor applied to suite clients.
    pub timeout: Option<Duration>,
}

impl SystemTestConfig {
    /// Reads the `TODOS_SYSTEM_TEST_*` variables.
    ///
    /// # Errors
    ///
    /// Returns the offending variable and reason when a value is blank, not
    /// UTF-8, or malformed.
    pub fn load() -> Result<Self, String> {
        let read =
            |key: SystemTestEnv| read_env_nonempty(key.as_str()).map_err(|err| err.to_string());
        let timeout = read(SystemTestEnv::TimeoutSeconds)?
            .map(|raw| {
                parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &raw)
                    .map(Duration::from_secs)
                    .map_err(|err| err.to_string())
            })
            .transpose()?;
        Ok(Self {
            run_root: read(SystemTestEnv::RunRoot)?.map(PathBuf::from),
            live_url: read(SystemTestEnv::LiveUrl)?.as_deref().map(parse_live_url).transpose()?,
            timeout,
        })
    }
}

/// Parses a live collection URL, requiring `http` or `https`.
///
/// # Errors
///
/// Returns a message naming [`SystemTestEnv::LiveUrl`] when the value does
/// not parse or uses another scheme.
pub fn parse_live_url(raw: &str) -> Result<String, String> {
    let name = SystemTestEnv::LiveUrl.as_str();
    let url = Url::parse(raw.trim()).map_err(|err| format!("{name} is not a URL: {err}"))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url.to_string()),
        "http" | "https" => Err(format!("{name} has no host")),
        scheme => Err(format!("{name} must use http or https, not {scheme}")),
    }
}
