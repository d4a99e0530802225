//! Spawn a child process, capture what it writes to stdout, wait for it and
//! report how it exited.
//!
//! The library side is [`RunningChild`]: it owns the child, drains its pipes to
//! end-of-stream and only then waits on it. [`run`] does all three in one call;
//! [`run_and_report`] prints the output between the drain and the wait. The
//! `child_capture` binary wraps that with argument parsing and the optional run
//! record.
mod utils;

pub mod args;
mod command;
mod error;
mod record;
mod report;
mod runner;
mod status;

pub use command::{parse_env_pair, ProcessSpec, StderrMode};
pub use error::RunError;
pub use record::RunRecord;
pub use report::{exit_line, run_and_report, write_captured, write_exit_line};
pub use runner::{run, run_command, RunOutput, RunningChild};
pub use status::ExitStatus;
