//! Service configuration, read once at startup
//!
//! Every tunable lives here. The server binary builds one [`Config`] from the
//! environment before binding the listener and passes it into each component;
//! nothing reads the process environment after startup.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use log::warn;

use crate::errors::{Result, ServiceError};

/// Development fallback secret, matching the original deployment default.
pub const DEFAULT_API_KEY: &str = "default_key";

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Listening port
    pub port: u16,
    /// Shared secret callers must present in the credential header
    pub api_key: String,
    /// Timeout applied when a request does not name one
    pub default_timeout: Duration,
    /// Upper bound; larger caller-supplied timeouts are clamped to this
    pub max_timeout: Duration,
    /// Maximum number of simultaneously running child processes
    pub max_concurrency: usize,
    /// Whether requests wait for an execution slot or are rejected when the
    /// gate is saturated
    pub queue_when_busy: bool,
    /// Per-stream output capture cap in bytes
    pub max_output_bytes: usize,
    /// Interval between the graceful signal and the forceful kill on timeout
    pub kill_grace: Duration,
    /// Directory commands run in when the request names none
    pub service_dir: PathBuf,
    /// Home directory used for `~` expansion in working_dir
    pub home_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            api_key: DEFAULT_API_KEY.to_string(),
            default_timeout: Duration::from_secs(30),
            max_timeout: Duration::from_secs(300),
            max_concurrency: 16,
            queue_when_busy: true,
            max_output_bytes: 1024 * 1024,
            kill_grace: Duration::from_millis(500),
            service_dir: PathBuf::from("."),
            home_dir: None,
        }
    }
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// Unset variables fall back to defaults; unparsable values are logged
    /// and ignored rather than aborting startup.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let config = Self {
            port: env_parsed("PORT", defaults.port),
            api_key: env::var("API_KEY").unwrap_or(defaults.api_key),
            default_timeout: Duration::from_secs(env_parsed(
                "DEFAULT_TIMEOUT_SECS",
                defaults.default_timeout.as_secs(),
            )),
            max_timeout: Duration::from_secs(env_parsed(
                "MAX_TIMEOUT_SECS",
                defaults.max_timeout.as_secs(),
            )),
            max_concurrency: env_parsed("MAX_CONCURRENT_EXECUTIONS", defaults.max_concurrency),
            queue_when_busy: env_parsed("QUEUE_WHEN_BUSY", defaults.queue_when_busy),
            max_output_bytes: env_parsed("MAX_OUTPUT_BYTES", defaults.max_output_bytes),
            kill_grace: Duration::from_millis(env_parsed("KILL_GRACE_MS", 500)),
            service_dir: env::current_dir().unwrap_or(defaults.service_dir),
            home_dir: env::var_os("HOME").map(PathBuf::from),
        };

        if config.api_key == DEFAULT_API_KEY {
            warn!("API_KEY is not set; falling back to the built-in development key");
        }

        config
    }

    /// Validate configuration invariants
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(ServiceError::InvalidConfig(
                "API_KEY cannot be empty".to_string(),
            ));
        }

        if self.max_concurrency == 0 {
            return Err(ServiceError::InvalidConfig(
                "MAX_CONCURRENT_EXECUTIONS must be at least 1".to_string(),
            ));
        }

        if self.max_output_bytes == 0 {
            return Err(ServiceError::InvalidConfig(
                "MAX_OUTPUT_BYTES must be at least 1".to_string(),
            ));
        }

        if self.default_timeout.is_zero() {
            return Err(ServiceError::InvalidConfig(
                "DEFAULT_TIMEOUT_SECS must be positive".to_string(),
            ));
        }

        if self.default_timeout > self.max_timeout {
            return Err(ServiceError::InvalidConfig(
                "DEFAULT_TIMEOUT_SECS cannot exceed MAX_TIMEOUT_SECS".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parse an environment variable, keeping `default` when unset or malformed.
fn env_parsed<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring unparsable value for {}: {:?}", name, raw);
                default
            }
        },
        Err(_) => default,
    }
}
