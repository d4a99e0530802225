use nix::sys::signal::Signal;
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt, os::unix::process::ExitStatusExt, process};

/// How the child terminated. Only exists once the child has been waited on.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ExitStatus {
    Exited(i32),
    Signaled(i32),
}

impl ExitStatus {
    /// Integer exit code. Signal deaths follow the shell convention of
    /// 128 + signal number.
    pub fn code(&self) -> i32 {
        match *self {
            ExitStatus::Exited(code) => code,
            ExitStatus::Signaled(signo) => 128 + signo,
        }
    }

    pub fn signal(&self) -> Option<i32> {
        match *self {
            ExitStatus::Exited(_) => None,
            ExitStatus::Signaled(signo) => Some(signo),
        }
    }

    pub fn success(&self) -> bool {
        *self == ExitStatus::Exited(0)
    }
}

impl From<process::ExitStatus> for ExitStatus {
    fn from(status: process::ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => ExitStatus::Exited(code),
            (None, Some(signo)) => ExitStatus::Signaled(signo),
            // std guarantees one of the two on unix.
            (None, None) => ExitStatus::Exited(-1),
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ExitStatus::Exited(code) => write!(f, "exit code {}", code),
            ExitStatus::Signaled(signo) => match Signal::try_from(signo) {
                Ok(signal) => write!(f, "killed by {:?} ({})", signal, signo),
                Err(_) => write!(f, "killed by signal {}", signo),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exited_code_is_verbatim() {
        for code in 0..=255 {
            let status = ExitStatus::Exited(code);
            assert_eq!(status.code(), code);
            assert_eq!(status.signal(), None);
        }
        assert!(ExitStatus::Exited(0).success());
        assert!(!ExitStatus::Exited(1).success());
    }

    #[test]
    fn signaled_uses_shell_convention() {
        let status = ExitStatus::Signaled(9);
        assert_eq!(status.code(), 137);
        assert_eq!(status.signal(), Some(9));
        assert!(!status.success());
    }

    #[test]
    fn from_std_status() {
        // Raw wait statuses: exit code lives in the high byte, signal in the low bits.
        let exited = process::ExitStatus::from_raw(3 << 8);
        assert_eq!(ExitStatus::from(exited), ExitStatus::Exited(3));

        let killed = process::ExitStatus::from_raw(15);
        assert_eq!(ExitStatus::from(killed), ExitStatus::Signaled(15));
    }

    #[test]
    fn display_names_signal() {
        assert_eq!(ExitStatus::Exited(2).to_string(), "exit code 2");
        assert_eq!(ExitStatus::Signaled(9).to_string(), "killed by SIGKILL (9)");
    }
}
