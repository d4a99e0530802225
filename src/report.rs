use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::command::ProcessSpec;
use crate::context;
use crate::runner::{RunOutput, RunningChild};
use crate::status::ExitStatus;

pub fn exit_line(status: ExitStatus) -> String {
    format!("Child process exited with code: {}", status.code())
}

/// Writes captured bytes exactly as received.
pub fn write_captured<W: Write>(out: &mut W, bytes: &[u8]) -> io::Result<()> {
    out.write_all(bytes)?;
    out.flush()
}

pub fn write_exit_line<W: Write>(out: &mut W, status: ExitStatus) -> io::Result<()> {
    writeln!(out, "{}", exit_line(status))?;
    out.flush()
}

/// Runs the child, writing its stdout to `out` as soon as the pipe closes and
/// the exit line once the child is reaped. Child errors come back as
/// `RunError` inside the anyhow error.
pub fn run_and_report<W: Write>(spec: &ProcessSpec, out: &mut W) -> Result<RunOutput> {
    let mut running = RunningChild::spawn(spec)?;
    let (stdout, stderr) = running.drain()?;
    write_captured(out, &stdout).with_context(|| context!("Cannot write captured output."))?;

    let status = running.wait()?;
    write_exit_line(out, status).with_context(|| context!("Cannot write exit line."))?;

    Ok(RunOutput::new(stdout, stderr, status))
}
