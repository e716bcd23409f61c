use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use fnbatch_core::errors::{BatchError, ErrorInfo};
use fnbatch_core::Execution;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::info;

use crate::serde::{from_json_slice, to_json_bytes};

/// Destination for a completed batch. Only called once generation succeeded.
pub trait ExecutionSink {
    fn accept(&mut self, executions: &[Execution]) -> Result<(), BatchError>;
}

impl ExecutionSink for Vec<Execution> {
    fn accept(&mut self, executions: &[Execution]) -> Result<(), BatchError> {
        self.extend_from_slice(executions);
        Ok(())
    }
}

/// Writes the batch as a JSON array, replacing the target atomically.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
    pretty: bool,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: false,
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ExecutionSink for JsonFileSink {
    fn accept(&mut self, executions: &[Execution]) -> Result<(), BatchError> {
        let bytes = to_json_bytes(&executions, self.pretty)?;
        write_atomic(&self.path, &bytes)?;
        info!(
            path = %self.path.display(),
            executions = executions.len(),
            "batch written"
        );
        Ok(())
    }
}

fn io_error(code: &str, path: &Path, err: impl ToString) -> BatchError {
    BatchError::Io(ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()))
}

/// Writes through a temporary sibling and renames it into place, so readers
/// never observe a partial file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), BatchError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|err| io_error("io.create_dir", &dir, err))?;
    let mut tmp = NamedTempFile::new_in(&dir).map_err(|err| io_error("io.temp_file", &dir, err))?;
    tmp.write_all(bytes)
        .map_err(|err| io_error("io.write", path, err))?;
    tmp.as_file()
        .sync_all()
        .map_err(|err| io_error("io.sync", path, err))?;
    tmp.persist(path)
        .map_err(|err| io_error("io.persist", path, err.error))?;
    Ok(())
}

/// Reads a schema document fully into memory.
pub fn read_schema(path: &Path) -> Result<Value, BatchError> {
    let bytes = fs::read(path).map_err(|err| io_error("io.read_schema", path, err))?;
    from_json_slice(&bytes)
}
