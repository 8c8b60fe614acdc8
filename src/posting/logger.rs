//! Message log file
//!
//! When enabled, every posted message is recorded as one line in a dedicated
//! log file, separate from the application log. The format is stable enough
//! to grep: timestamp, verb, queue URI, sequence, sizes.

use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Appends one line per posted message to a file.
#[derive(Debug)]
pub struct FileLogger {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl FileLogger {
    /// Create (or truncate) the log file at `path`.
    pub fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;

        Ok(Self {
            path,
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record one posted message.
    pub fn log_posted(
        &self,
        queue_uri: &str,
        sequence: u64,
        payload_bytes: usize,
        property_count: usize,
    ) -> std::io::Result<()> {
        let mut writer = self.writer.lock().unwrap();
        writeln!(
            writer,
            "{} POST queue={} seq={} payload_bytes={} properties={}",
            Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ"),
            queue_uri,
            sequence,
            payload_bytes,
            property_count,
        )
    }

    /// Flush buffered lines to disk.
    pub fn flush(&self) -> std::io::Result<()> {
        self.writer.lock().unwrap().flush()
    }
}
