//! Chunked CSV writer: rows are buffered up to the chunk size, then written in one batch.
//!
//! Output goes to a staging file next to the destination and is renamed into place by
//! `finish()`, so a failed member never leaves a file under its final name.

use crate::extract::{OutputRow, HEADER};
use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

/// Upper bound on the buffer's up-front allocation; it still grows to the chunk size.
const MAX_PREALLOC_ROWS: usize = 64 * 1024;

/// Staging path for `dest`: `<dest>.inprogress`, or `<dest>.<tag>.inprogress` when several
/// writers may target the same destination.
pub fn staging_path(dest: &Path, tag: Option<usize>) -> PathBuf {
    let mut s: OsString = dest.as_os_str().to_owned();
    if let Some(t) = tag {
        s.push(format!(".{}", t));
    }
    s.push(".inprogress");
    PathBuf::from(s)
}

pub struct ChunkedCsvWriter {
    dest: PathBuf,
    staging: PathBuf,
    csv: csv::Writer<BufWriter<File>>,
    buf: Vec<OutputRow>,
    chunk_size: usize,
    rows: u64,
}

impl ChunkedCsvWriter {
    /// Create the staging file at `staging` and write the header row.
    pub fn create(
        dest: &Path,
        staging: &Path,
        chunk_size: usize,
        write_buf: usize,
        crlf: bool,
    ) -> Result<Self> {
        let f = File::create(staging).with_context(|| format!("create {}", staging.display()))?;
        let terminator = if crlf { csv::Terminator::CRLF } else { csv::Terminator::Any(b'\n') };
        let mut csv = csv::WriterBuilder::new()
            .terminator(terminator)
            .from_writer(BufWriter::with_capacity(write_buf, f));
        csv.write_record(HEADER)
            .with_context(|| format!("write header {}", staging.display()))?;

        let chunk_size = chunk_size.max(1);
        Ok(Self {
            dest: dest.to_path_buf(),
            staging: staging.to_path_buf(),
            csv,
            buf: Vec::with_capacity(chunk_size.min(MAX_PREALLOC_ROWS)),
            chunk_size,
            rows: 0,
        })
    }

    pub fn append(&mut self, row: OutputRow) -> Result<()> {
        self.buf.push(row);
        if self.buf.len() >= self.chunk_size {
            self.flush_chunk()?;
        }
        Ok(())
    }

    /// Write all buffered rows, then clear the buffer.
    fn flush_chunk(&mut self) -> Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        for row in &self.buf {
            row.write_to(&mut self.csv)
                .with_context(|| format!("write {}", self.staging.display()))?;
        }
        self.rows += self.buf.len() as u64;
        tracing::trace!("flushed {} rows to {}", self.buf.len(), self.staging.display());
        self.buf.clear();
        Ok(())
    }

    /// Flush the remaining rows, close the file and move it to its destination.
    /// Returns the number of data rows written.
    pub fn finish(mut self) -> Result<u64> {
        self.flush_chunk()?;
        let Self { dest, staging, mut csv, rows, .. } = self;

        csv.flush().with_context(|| format!("flush {}", staging.display()))?;
        drop(csv);

        match fs::remove_file(&dest) {
            Ok(()) => tracing::debug!("replacing existing {}", dest.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).with_context(|| format!("remove {}", dest.display())),
        }
        fs::rename(&staging, &dest)
            .with_context(|| format!("rename {} -> {}", staging.display(), dest.display()))?;
        Ok(rows)
    }
}
