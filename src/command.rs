use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    str::FromStr,
};

/// What to do with the child's stderr. Stdout is always piped back to us.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum StderrMode {
    Inherit,
    Capture,
    Discard,
}

impl Default for StderrMode {
    fn default() -> Self {
        StderrMode::Inherit
    }
}

impl StderrMode {
    pub(crate) fn stdio(self) -> Stdio {
        match self {
            StderrMode::Inherit => Stdio::inherit(),
            StderrMode::Capture => Stdio::piped(),
            StderrMode::Discard => Stdio::null(),
        }
    }
}

impl FromStr for StderrMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inherit" => Ok(StderrMode::Inherit),
            "capture" => Ok(StderrMode::Capture),
            "discard" => Ok(StderrMode::Discard),
            other => Err(format!(
                "Invalid stderr mode: {} (expected inherit, capture or discard)",
                other
            )),
        }
    }
}

/// Executable plus arguments, along with the bits of environment we let the
/// caller tweak. Never changes once built: the `with_*` methods consume the
/// spec and hand back a new one.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ProcessSpec {
    exe: String,
    args: Vec<String>,
    // Applied on top of our own environment.
    env_vars: Vec<(String, String)>,
    cwd: Option<PathBuf>,
    stderr: StderrMode,
}

impl ProcessSpec {
    pub fn new<S: Into<String>>(exe: S, args: Vec<String>) -> ProcessSpec {
        ProcessSpec {
            exe: exe.into(),
            args,
            env_vars: Vec::new(),
            cwd: None,
            stderr: StderrMode::default(),
        }
    }

    pub fn with_env<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.env_vars.push((key.into(), value.into()));
        self
    }

    pub fn with_cwd<P: Into<PathBuf>>(mut self, cwd: P) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_stderr(mut self, mode: StderrMode) -> Self {
        self.stderr = mode;
        self
    }

    pub fn exe(&self) -> &str {
        &self.exe
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn env_vars(&self) -> &[(String, String)] {
        &self.env_vars
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn stderr_mode(&self) -> StderrMode {
        self.stderr
    }

    /// Builds the std `Command` for this spec with stdout piped.
    pub(crate) fn to_command(&self) -> Command {
        let mut command = Command::new(&self.exe);
        command
            .args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(self.stderr.stdio());

        for (key, value) in &self.env_vars {
            command.env(key, value);
        }
        if let Some(cwd) = &self.cwd {
            command.current_dir(cwd);
        }
        command
    }
}

impl fmt::Display for ProcessSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut line = self.exe.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        write!(f, "{}", line)
    }
}

/// Splits a `KEY=VALUE` pair. Only the first `=` separates, so values may
/// contain `=` themselves.
pub fn parse_env_pair(pair: &str) -> Result<(String, String), String> {
    match pair.find('=') {
        Some(0) => Err(format!("Empty variable name in: {}", pair)),
        Some(pos) => Ok((pair[..pos].to_string(), pair[pos + 1..].to_string())),
        None => Err(format!("Expected KEY=VALUE, got: {}", pair)),
    }
}
