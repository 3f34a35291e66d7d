mod config;
mod paths;
mod archive;
mod concurrency;
mod progress;
mod util;
mod pipeline;

mod gedcom;
mod person;
mod lineage;
mod extract;
mod writer;

pub use crate::config::{ConvertOptions, ErrorPolicy};
pub use crate::pipeline::{ConversionSummary, Failure, GedcomCsv};

// Building blocks, for callers that drive their own loop.
pub use crate::archive::{Archive, MemberEntry};
pub use crate::paths::{discover_archives, output_path_for, ArchiveJob};
pub use crate::gedcom::{parse_line, Line, Record, RecordReader, Records};
pub use crate::person::{format_name, Person};
pub use crate::lineage::Lineage;
pub use crate::extract::{birth_place, birth_year, extract_row, OutputRow, HEADER};
pub use crate::writer::{staging_path, ChunkedCsvWriter};

pub use crate::util::init_tracing_once;
