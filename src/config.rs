use std::path::{Path, PathBuf};

/// What to do when an archive cannot be opened or a member cannot be parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Stop the run on the first malformed archive or member.
    #[default]
    Abort,
    /// Log a warning, record the failure in the summary, and continue with the next unit.
    Skip,
}

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub chunk_size: usize,            // rows buffered per flush; 0 behaves as 1
    pub archive_ext: String,          // case-sensitive suffix of archives in input_dir
    pub record_ext: String,           // case-sensitive suffix of GEDCOM members
    pub output_ext: String,           // replaces record_ext in output names
    pub error_policy: ErrorPolicy,
    pub file_concurrency: usize,      // archives processed in parallel
    pub progress: bool,               // show progress bar
    pub progress_label: Option<String>,

    // IO tuning
    pub read_buffer_bytes: usize,     // BufReader capacity over member streams
    pub write_buffer_bytes: usize,    // BufWriter capacity under the CSV writer

    // output formatting
    pub crlf: bool,                   // `\r\n` row terminator, else `\n`
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            chunk_size: 10_000,
            archive_ext: ".zip".to_string(),
            record_ext: ".ged".to_string(),
            output_ext: ".csv".to_string(),
            error_policy: ErrorPolicy::Abort,
            file_concurrency: 1,
            progress: true,
            progress_label: None,

            read_buffer_bytes: 256 * 1024,
            write_buffer_bytes: 256 * 1024,

            crlf: true,
        }
    }
}

impl ConvertOptions {
    pub fn with_input_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.input_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }
    pub fn with_chunk_size(mut self, rows: usize) -> Self {
        self.chunk_size = rows;
        self
    }
    pub fn with_archive_ext(mut self, ext: impl Into<String>) -> Self {
        self.archive_ext = ext.into();
        self
    }
    pub fn with_record_ext(mut self, ext: impl Into<String>) -> Self {
        self.record_ext = ext.into();
        self
    }
    pub fn with_output_ext(mut self, ext: impl Into<String>) -> Self {
        self.output_ext = ext.into();
        self
    }
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }
    pub fn with_file_concurrency(mut self, n: usize) -> Self {
        self.file_concurrency = n.max(1);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }

    // IO buffers tuning
    pub fn with_io_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_io_write_buffer(mut self, bytes: usize) -> Self {
        self.write_buffer_bytes = bytes.max(8 * 1024);
        self
    }

    pub fn with_crlf(mut self, yes: bool) -> Self {
        self.crlf = yes;
        self
    }
}
