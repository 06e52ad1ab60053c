//! Execution layer: child process lifecycle and output capture
//!
//! This module runs validated requests as operating-system processes:
//! spawning through the shell, draining output into bounded buffers,
//! enforcing the deadline, and terminating the whole process group when it
//! fires.

pub mod capture;
pub mod process;

pub use capture::CapturedStream;
pub use process::{ExecutionResult, ProcessExecutor};
