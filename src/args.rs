use std::path::PathBuf;

use structopt::StructOpt;

use crate::command::{parse_env_pair, ProcessSpec, StderrMode};

#[derive(StructOpt, Debug)]
#[structopt(
    name = "child_capture",
    about = "Runs a child process, prints what it wrote to stdout and how it exited",
    raw(setting = "structopt::clap::AppSettings::TrailingVarArg")
)]
pub struct Opt {
    /// Extra environment variable for the child, as KEY=VALUE. Repeatable.
    #[structopt(
        short = "e",
        long = "env",
        parse(try_from_str = "parse_env_pair"),
        raw(number_of_values = "1")
    )]
    pub env: Vec<(String, String)>,

    /// Working directory for the child.
    #[structopt(short = "C", long = "cwd", parse(from_os_str))]
    pub cwd: Option<PathBuf>,

    /// What to do with the child's stderr: inherit, capture or discard.
    #[structopt(long = "stderr", default_value = "inherit")]
    pub stderr: StderrMode,

    /// Save a summary of the run (MessagePack) to this path.
    #[structopt(short = "r", long = "record", parse(from_os_str))]
    pub record: Option<PathBuf>,

    /// Exit with the child's exit code instead of 0.
    #[structopt(short = "p", long = "propagate-exit-code")]
    pub propagate_exit_code: bool,

    /// Program to run followed by its arguments. Runs `date` when empty.
    #[structopt(raw(allow_hyphen_values = "true"))]
    pub command: Vec<String>,
}

impl Opt {
    pub fn exe(&self) -> &str {
        self.command.first().map(String::as_str).unwrap_or("date")
    }

    pub fn args(&self) -> &[String] {
        self.command.get(1..).unwrap_or(&[])
    }

    pub fn to_spec(&self) -> ProcessSpec {
        let mut spec = ProcessSpec::new(self.exe(), self.args().to_vec()).with_stderr(self.stderr);
        for (key, value) in &self.env {
            spec = spec.with_env(key.clone(), value.clone());
        }
        if let Some(cwd) = &self.cwd {
            spec = spec.with_cwd(cwd.clone());
        }
        spec
    }
}
