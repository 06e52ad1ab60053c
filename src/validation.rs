//! Request validation and normalization

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::config::Config;
use crate::errors::{Result, ServiceError};

/// Raw body of a `POST /execute` request
#[derive(Debug, Clone, Deserialize)]
pub struct ExecRequest {
    /// Shell command line to run
    pub command: String,
    /// Directory to run in; defaults to the service's own working directory
    pub working_dir: Option<String>,
    /// Timeout in seconds
    pub timeout: Option<f64>,
}

/// A request that passed validation; immutable from here on
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub command: String,
    pub working_dir: PathBuf,
    pub timeout: Duration,
}

/// Turn a raw request body into a well-formed [`ExecutionRequest`].
///
/// Pure function of the input and the configuration: the working directory
/// must already exist, the command must be non-empty after trimming, and an
/// oversized timeout is clamped to the configured maximum rather than
/// rejected.
pub fn validate(raw: &ExecRequest, config: &Config) -> Result<ExecutionRequest> {
    let command = raw.command.trim();
    if command.is_empty() {
        return Err(ServiceError::Validation {
            field: "command",
            reason: "must not be empty".to_string(),
        });
    }

    let working_dir = match raw.working_dir.as_deref() {
        Some(dir) => {
            let expanded = expand_home(dir, config);
            if !expanded.is_dir() {
                return Err(ServiceError::Validation {
                    field: "working_dir",
                    reason: format!("directory not found: {}", expanded.display()),
                });
            }
            expanded
        }
        None => config.service_dir.clone(),
    };

    let timeout = match raw.timeout {
        Some(secs) => {
            if !secs.is_finite() || secs <= 0.0 {
                return Err(ServiceError::Validation {
                    field: "timeout",
                    reason: "must be a positive number of seconds".to_string(),
                });
            }
            Duration::from_secs_f64(secs).min(config.max_timeout)
        }
        None => config.default_timeout,
    };

    Ok(ExecutionRequest {
        command: command.to_string(),
        working_dir,
        timeout,
    })
}

/// Expand a leading `~` against the home directory captured at startup.
fn expand_home(dir: &str, config: &Config) -> PathBuf {
    if let (Some(stripped), Some(home)) = (dir.strip_prefix('~'), config.home_dir.as_ref()) {
        if stripped.is_empty() {
            return home.clone();
        }
        if let Some(relative) = stripped.strip_prefix('/') {
            return home.join(relative);
        }
    }
    PathBuf::from(dir)
}
