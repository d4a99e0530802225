use std::io::{self, Read};
use std::process::Child;

use nix::unistd::Pid;
use tracing::{debug, info, span, warn, Level, Span};

use crate::command::{ProcessSpec, StderrMode};
use crate::error::RunError;
use crate::status::ExitStatus;

/// Everything we learned from one finished child.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOutput {
    stdout: Vec<u8>,
    // Empty unless the spec asked for `StderrMode::Capture`.
    stderr: Vec<u8>,
    status: ExitStatus,
}

impl RunOutput {
    pub fn new(stdout: Vec<u8>, stderr: Vec<u8>, status: ExitStatus) -> RunOutput {
        RunOutput {
            stdout,
            stderr,
            status,
        }
    }

    pub fn stdout(&self) -> &[u8] {
        &self.stdout
    }

    pub fn stderr(&self) -> &[u8] {
        &self.stderr
    }

    /// Lossy text view of stdout. The raw bytes are what gets printed.
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn status(&self) -> ExitStatus {
        self.status
    }

    pub fn exit_code(&self) -> i32 {
        self.status.code()
    }

    pub fn into_parts(self) -> (Vec<u8>, Vec<u8>, ExitStatus) {
        (self.stdout, self.stderr, self.status)
    }
}

/// Shorthand for running `exe args...` with default settings.
pub fn run_command(exe: &str, args: &[&str]) -> Result<RunOutput, RunError> {
    let args = args.iter().map(|s| s.to_string()).collect();
    run(&ProcessSpec::new(exe, args))
}

/// Spawns the child, drains stdout (and stderr when captured) to end-of-stream,
/// then waits for it. Callers that want to act on the output before the child
/// has exited should drive a [`RunningChild`] themselves.
pub fn run(spec: &ProcessSpec) -> Result<RunOutput, RunError> {
    let mut running = RunningChild::spawn(spec)?;
    let (stdout, stderr) = running.drain()?;
    let status = running.wait()?;
    Ok(RunOutput::new(stdout, stderr, status))
}

/// A spawned child we have not reaped yet. Call `drain` before `wait`:
/// waiting on a child whose pipes are still full never returns.
pub struct RunningChild {
    child: Child,
    pid: Pid,
    command_line: String,
    stderr_mode: StderrMode,
    span: Span,
}

impl RunningChild {
    pub fn spawn(spec: &ProcessSpec) -> Result<RunningChild, RunError> {
        let command_line = spec.to_string();
        let span = span!(Level::INFO, "run", command = %command_line);
        let (child, pid) = {
            let _e = span.enter();
            let child = spec.to_command().spawn().map_err(|source| RunError::Spawn {
                command: command_line.clone(),
                source,
            })?;
            let pid = Pid::from_raw(child.id() as i32);
            info!("Spawned child {}", pid);
            (child, pid)
        };

        Ok(RunningChild {
            child,
            pid,
            command_line,
            stderr_mode: spec.stderr_mode(),
            span,
        })
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Reads stdout, and stderr when captured, until the child closes them.
    /// Returns `(stdout, stderr)`; stderr is empty unless captured.
    pub fn drain(&mut self) -> Result<(Vec<u8>, Vec<u8>), RunError> {
        let stdout = self.child.stdout.take();
        let stderr = match self.stderr_mode {
            StderrMode::Capture => match self.child.stderr.take() {
                Some(stderr) => Some(stderr),
                None => return Err(self.read_failed(not_piped("stderr"))),
            },
            StderrMode::Inherit | StderrMode::Discard => None,
        };

        match stdout {
            Some(stdout) => self.collect_output(stdout, stderr),
            None => Err(self.read_failed(not_piped("stdout"))),
        }
    }

    fn collect_output<O, E>(
        &mut self,
        stdout: O,
        stderr: Option<E>,
    ) -> Result<(Vec<u8>, Vec<u8>), RunError>
    where
        O: Read,
        E: Read + Send,
    {
        match drain_streams(stdout, stderr) {
            Ok((stdout, stderr)) => {
                let _e = self.span.enter();
                debug!(
                    "Drained {} stdout bytes, {} stderr bytes",
                    stdout.len(),
                    stderr.len()
                );
                Ok((stdout, stderr))
            }
            Err(source) => Err(self.read_failed(source)),
        }
    }

    // Still reap the child so we don't leave a zombie behind.
    fn read_failed(&mut self, source: io::Error) -> RunError {
        let _e = self.span.enter();
        if let Err(e) = self.child.wait() {
            warn!("Could not reap child {} after read failure: {}", self.pid, e);
        }
        RunError::Io {
            command: self.command_line.clone(),
            source,
        }
    }

    pub fn wait(mut self) -> Result<ExitStatus, RunError> {
        let _e = self.span.enter();
        let status = self.child.wait().map_err(|source| RunError::Wait {
            command: self.command_line.clone(),
            source,
        })?;

        let status = ExitStatus::from(status);
        match status {
            ExitStatus::Exited(code) => info!("Child {} exited with code {}", self.pid, code),
            ExitStatus::Signaled(_) => warn!("Child {} {}", self.pid, status),
        }
        Ok(status)
    }
}

fn not_piped(stream: &str) -> io::Error {
    io::Error::new(io::ErrorKind::Other, format!("child {} was not piped", stream))
}

/// Reads `stdout` to end-of-stream. When given, `stderr` is read on a scoped
/// thread at the same time so neither pipe can fill while we sit on the other.
fn drain_streams<O, E>(stdout: O, stderr: Option<E>) -> io::Result<(Vec<u8>, Vec<u8>)>
where
    O: Read,
    E: Read + Send,
{
    let stderr = match stderr {
        None => return Ok((read_to_eof(stdout)?, Vec::new())),
        Some(stderr) => stderr,
    };

    crossbeam::scope(|scope| -> io::Result<(Vec<u8>, Vec<u8>)> {
        let stderr_reader = scope.spawn(move |_| read_to_eof(stderr));
        let stdout_bytes = read_to_eof(stdout);
        let stderr_bytes = stderr_reader
            .join()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "stderr reader panicked"))?;
        Ok((stdout_bytes?, stderr_bytes?))
    })
    .map_err(|_| io::Error::new(io::ErrorKind::Other, "pipe reader thread panicked"))?
}

fn read_to_eof<R: Read>(mut pipe: R) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    pipe.read_to_end(&mut bytes)?;
    Ok(bytes)
}
