use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::command::ProcessSpec;
use crate::context;
use crate::runner::RunOutput;

// Summary of a finished run, persisted with --record.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RunRecord {
    command_line: String,
    exe: String,
    args: Vec<String>,
    exit_code: i32,
    // Set only when the child was killed by a signal.
    signal: Option<i32>,
    stdout_len: u64,
    stdout_hash: Vec<u8>,
}

impl RunRecord {
    pub fn new(spec: &ProcessSpec, output: &RunOutput) -> RunRecord {
        RunRecord {
            command_line: spec.to_string(),
            exe: spec.exe().to_string(),
            args: spec.args().to_vec(),
            exit_code: output.exit_code(),
            signal: output.status().signal(),
            stdout_len: output.stdout().len() as u64,
            stdout_hash: Sha256::digest(output.stdout()).to_vec(),
        }
    }

    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn signal(&self) -> Option<i32> {
        self.signal
    }

    pub fn stdout_len(&self) -> u64 {
        self.stdout_len
    }

    pub fn stdout_hash(&self) -> &[u8] {
        &self.stdout_hash
    }

    pub fn stdout_digest_hex(&self) -> String {
        self.stdout_hash
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = rmp_serde::to_vec_named(self)
            .with_context(|| context!("Cannot serialize record for {}", self.command_line))?;
        let file =
            File::create(path).with_context(|| context!("Cannot create record {:?}", path))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(&bytes)
            .and_then(|_| writer.flush())
            .with_context(|| context!("Cannot write record {:?}", path))?;

        debug!("Wrote {} byte record to {:?}", bytes.len(), path);
        Ok(())
    }

    pub fn load(path: &Path) -> Result<RunRecord> {
        let file = File::open(path).with_context(|| context!("Cannot open record {:?}", path))?;
        let mut bytes = Vec::new();
        BufReader::new(file)
            .read_to_end(&mut bytes)
            .with_context(|| context!("Cannot read record {:?}", path))?;

        rmp_serde::from_read_ref(&bytes)
            .with_context(|| context!("Malformed record {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::ExitStatus;
    use std::{env, process};

    fn temp_record_path(name: &str) -> std::path::PathBuf {
        env::temp_dir().join(format!("child_capture_{}_{}.rec", name, process::id()))
    }

    #[test]
    fn digest_of_known_input() {
        // sha256("hello\n")
        let spec = ProcessSpec::new("echo", vec!["hello".to_string()]);
        let output = RunOutput::new(b"hello\n".to_vec(), Vec::new(), ExitStatus::Exited(0));
        let record = RunRecord::new(&spec, &output);
        assert_eq!(
            record.stdout_digest_hex(),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
        assert_eq!(record.stdout_len(), 6);
        assert_eq!(record.command_line(), "echo hello");
        assert_eq!(record.signal(), None);
    }

    #[test]
    fn digest_covers_all_output() {
        // One trailing byte must change the digest.
        let mut big = vec![7u8; 20000];
        big.push(1);
        let spec = ProcessSpec::new("big", Vec::new());
        let output = RunOutput::new(big.clone(), Vec::new(), ExitStatus::Exited(0));
        let record = RunRecord::new(&spec, &output);
        assert_eq!(record.stdout_len(), 20001);
        assert_eq!(record.stdout_hash(), Sha256::digest(&big).as_slice());

        big.pop();
        assert_ne!(record.stdout_hash(), Sha256::digest(&big).as_slice());
    }

    #[test]
    fn save_then_load() {
        let spec = ProcessSpec::new("sh", vec!["-c".to_string(), "kill -9 $$".to_string()]);
        let output = RunOutput::new(Vec::new(), Vec::new(), ExitStatus::Signaled(9));
        let record = RunRecord::new(&spec, &output);
        assert_eq!(record.exit_code(), 137);
        assert_eq!(record.signal(), Some(9));

        let path = temp_record_path("roundtrip");
        record.save(&path).unwrap();
        let loaded = RunRecord::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded, record);
    }

    #[test]
    fn load_garbage_fails() {
        let path = temp_record_path("garbage");
        std::fs::write(&path, b"\xc1 not msgpack").unwrap();
        let err = RunRecord::load(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(format!("{:?}", err).contains("Malformed record"));
    }
}
