//! terminal-api: authenticated remote command execution over HTTP
//!
//! A small service that accepts a shell command line over HTTP, runs it as a
//! child process on the host, and returns captured output and exit status.
//! Intended for trusted or semi-trusted automation contexts, e.g. agent
//! tooling driving shell operations on a managed host.
//!
//! # Modules
//!
//! - **config**: Read-once settings loaded from the environment at startup
//! - **auth**: Shared-secret gate with a constant-time comparison
//! - **validation**: Request parsing and normalization
//! - **execution**: Process lifecycle, output capture, deadline enforcement
//! - **errors**: Error taxonomy for the whole service
//!
//! The HTTP front door lives in the server binary (`src/bin/server.rs`);
//! every request flows authenticate → validate → execute there.
//!
//! # Example
//!
//! ```ignore
//! use terminal_api::{validate, Config, ExecRequest, ProcessExecutor};
//!
//! let config = Config::from_env();
//! let request = validate(&body, &config)?;
//! let result = ProcessExecutor::execute(&request, &config).await?;
//! println!("exit code: {:?}", result.exit_code);
//! ```

pub mod auth;
pub mod config;
pub mod errors;
pub mod execution;
pub mod validation;

// Public API
pub use auth::{authenticate, API_KEY_HEADER};
pub use config::Config;
pub use errors::{Result, ServiceError};
pub use execution::{ExecutionResult, ProcessExecutor};
pub use validation::{validate, ExecRequest, ExecutionRequest};
