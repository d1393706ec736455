//! JSONL writer for search results.
//!
//! Each line holds one [`ResultRecord`]: the run's result plus the subject and the
//! time it was written, so several batches can append to the same file.

use crate::mcts::mcts_result::MCTSResult;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// One line of the results file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub timestamp: String,
    pub subject: String,
    #[serde(flatten)]
    pub result: MCTSResult,
}

/// Appends results to a JSONL file
pub struct ResultWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl ResultWriter {
    /// Opens `path` for appending, creating parent directories as needed.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    /// Records written through this writer
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn write_result(&mut self, subject: &str, result: &MCTSResult) -> io::Result<()> {
        let record = ResultRecord {
            timestamp: Utc::now().to_rfc3339(),
            subject: subject.to_string(),
            result: result.clone(),
        };
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Flushes and closes the file
    pub fn close(mut self) -> io::Result<()> {
        self.writer.flush()?;
        log::info!("Wrote {} results to '{}'", self.written, self.path.display());
        Ok(())
    }
}

/// Reads back a results file written by [`ResultWriter`].
pub fn load_results<P: AsRef<Path>>(path: P) -> io::Result<Vec<ResultRecord>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }

    Ok(records)
}
