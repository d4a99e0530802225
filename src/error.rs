use std::{error::Error, fmt, io};

/// Failures of a single run. Each variant keeps the command line it was
/// running so the message stands on its own.
#[derive(Debug)]
pub enum RunError {
    /// The child never started: not found, not executable, or the OS said no.
    Spawn { command: String, source: io::Error },
    /// Reading one of the child's output pipes failed.
    Io { command: String, source: io::Error },
    /// Waiting on the child failed.
    Wait { command: String, source: io::Error },
}

impl RunError {
    pub fn is_spawn(&self) -> bool {
        matches!(self, RunError::Spawn { .. })
    }

    /// Read and wait failures are both I/O on an already running child.
    pub fn is_io(&self) -> bool {
        !self.is_spawn()
    }

    pub fn command(&self) -> &str {
        match self {
            RunError::Spawn { command, .. }
            | RunError::Io { command, .. }
            | RunError::Wait { command, .. } => command,
        }
    }

    pub fn io_error(&self) -> &io::Error {
        match self {
            RunError::Spawn { source, .. }
            | RunError::Io { source, .. }
            | RunError::Wait { source, .. } => source,
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            // The io::Error is reported through source().
            RunError::Spawn { command, .. } => write!(f, "Failed to spawn `{}`", command),
            RunError::Io { command, .. } => write!(f, "Failed reading output of `{}`", command),
            RunError::Wait { command, .. } => write!(f, "Failed waiting on `{}`", command),
        }
    }
}

impl Error for RunError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.io_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_messages() {
        let err = RunError::Spawn {
            command: "nope --flag".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.is_spawn());
        assert!(!err.is_io());
        assert_eq!(err.command(), "nope --flag");
        assert_eq!(err.io_error().kind(), io::ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Failed to spawn `nope --flag`");
        assert_eq!(
            err.source().map(|e| e.to_string()),
            Some(io::Error::from(io::ErrorKind::NotFound).to_string())
        );

        let err = RunError::Wait {
            command: "date".to_string(),
            source: io::Error::new(io::ErrorKind::Other, "gone"),
        };
        assert!(err.is_io());
        assert_eq!(err.to_string(), "Failed waiting on `date`");
    }

    #[test]
    fn cause_is_printed_once_in_chain() {
        let err = RunError::Io {
            command: "cat".to_string(),
            source: io::Error::new(io::ErrorKind::Other, "pipe exploded"),
        };
        let chain = format!("{:?}", anyhow::Error::new(err));
        assert_eq!(chain.matches("pipe exploded").count(), 1, "{}", chain);
        assert!(chain.starts_with("Failed reading output of `cat`"));
    }
}
