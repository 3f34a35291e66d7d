use crate::archive::{Archive, MemberEntry};
use crate::concurrency::for_each_archive_limited;
use crate::config::{ConvertOptions, ErrorPolicy};
use crate::extract::extract_row;
use crate::gedcom::RecordReader;
use crate::lineage::Lineage;
use crate::paths::{discover_archives, output_path_for, ArchiveJob};
use crate::person::Person;
use crate::progress::make_archive_progress;
use crate::util::init_tracing_once;
use crate::writer::{staging_path, ChunkedCsvWriter};
use ahash::AHashSet;
use anyhow::{bail, Context, Result};
use parking_lot::Mutex;
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Zipped GEDCOM to CSV converter. Configure with the builder methods, then call `convert()`.
#[derive(Clone, Default)]
pub struct GedcomCsv {
    pub(crate) opts: ConvertOptions,
}

/// A unit of work (archive or member) skipped under `ErrorPolicy::Skip`.
#[derive(Clone, Debug)]
pub struct Failure {
    pub archive: PathBuf,
    pub member: Option<String>,
    pub error: String,
}

/// Outcome of one run.
#[derive(Clone, Debug, Default)]
pub struct ConversionSummary {
    pub archives: usize,
    pub members: usize,
    pub rows: u64,
    /// Distinct CSV files produced, sorted. Members sharing an output name count once here.
    pub outputs: Vec<PathBuf>,
    pub failures: Vec<Failure>,
    pub elapsed: Duration,
}

/// Where a member failed. Output-side failures are fatal whatever the policy.
enum UnitError {
    Input(anyhow::Error),
    Output(anyhow::Error),
}

#[derive(Default)]
struct Tally {
    members: usize,
    rows: u64,
    outputs: AHashSet<PathBuf>,
    failures: Vec<Failure>,
}

struct RunState {
    tally: Mutex<Tally>,
    next_unit: AtomicUsize,
}

impl GedcomCsv {
    pub fn new() -> Self {
        Self { opts: ConvertOptions::default() }
    }

    pub fn with_options(opts: ConvertOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.opts
    }

    // -------- Builder methods --------
    pub fn input_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_input_dir(dir); self }
    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self { self.opts = self.opts.with_output_dir(dir); self }
    pub fn chunk_size(mut self, rows: usize) -> Self { self.opts = self.opts.with_chunk_size(rows); self }
    pub fn archive_ext(mut self, ext: impl Into<String>) -> Self { self.opts = self.opts.with_archive_ext(ext); self }
    pub fn record_ext(mut self, ext: impl Into<String>) -> Self { self.opts = self.opts.with_record_ext(ext); self }
    pub fn output_ext(mut self, ext: impl Into<String>) -> Self { self.opts = self.opts.with_output_ext(ext); self }
    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self { self.opts = self.opts.with_error_policy(policy); self }
    pub fn file_concurrency(mut self, n: usize) -> Self { self.opts = self.opts.with_file_concurrency(n); self }
    pub fn progress(mut self, yes: bool) -> Self { self.opts = self.opts.with_progress(yes); self }
    pub fn progress_label(mut self, label: impl Into<String>) -> Self { self.opts = self.opts.with_progress_label(label); self }
    pub fn io_read_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_read_buffer(bytes); self }
    pub fn io_write_buffer(mut self, bytes: usize) -> Self { self.opts = self.opts.with_io_write_buffer(bytes); self }
    pub fn crlf(mut self, yes: bool) -> Self { self.opts = self.opts.with_crlf(yes); self }

    /// Convert every qualifying member of every archive in the input directory into one CSV
    /// file in the output directory.
    pub fn convert(self) -> Result<ConversionSummary> {
        init_tracing_once();
        let started = Instant::now();

        let out_dir = &self.opts.output_dir;
        if !out_dir.is_dir() {
            bail!("output directory {} does not exist or is not a directory", out_dir.display());
        }
        let archives = discover_archives(&self.opts.input_dir, &self.opts.archive_ext)?;
        if archives.is_empty() {
            tracing::warn!(
                "No {} archives found in {}.",
                self.opts.archive_ext,
                self.opts.input_dir.display()
            );
        } else {
            tracing::info!("Planned {} archives for conversion.", archives.len());
        }

        let pb = if self.opts.progress {
            let label = self.opts.progress_label.as_deref().unwrap_or("Converting");
            Some(make_archive_progress(archives.len() as u64, label))
        } else {
            None
        };

        let state = RunState { tally: Mutex::new(Tally::default()), next_unit: AtomicUsize::new(0) };
        let res = for_each_archive_limited(&archives, self.opts.file_concurrency, |job| {
            if let Some(pb) = &pb { pb.set_message(job.path.display().to_string()); }
            let r = self.convert_archive(job, &state);
            if let Some(pb) = &pb { pb.inc(1); }
            r
        });
        if let Some(pb) = pb {
            pb.finish_with_message("done");
        }
        res?;

        let tally = state.tally.into_inner();
        let mut outputs: Vec<PathBuf> = tally.outputs.into_iter().collect();
        outputs.sort();
        let summary = ConversionSummary {
            archives: archives.len(),
            members: tally.members,
            rows: tally.rows,
            outputs,
            failures: tally.failures,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            "Converted {} members ({} rows) from {} archives in {:.2}s; {} skipped.",
            summary.members,
            summary.rows,
            summary.archives,
            summary.elapsed.as_secs_f64(),
            summary.failures.len()
        );
        Ok(summary)
    }

    fn convert_archive(&self, job: &ArchiveJob, state: &RunState) -> Result<()> {
        let opened = Archive::open(&job.path).and_then(|mut a| {
            let members = a.members(&self.opts.record_ext)?;
            Ok((a, members))
        });
        let (mut archive, members) = match opened {
            Ok(v) => v,
            Err(e) => return self.on_unit_error(UnitError::Input(e), &job.path, None, state),
        };
        tracing::debug!("{}: {} members to convert", job.path.display(), members.len());

        for member in &members {
            let unit = state.next_unit.fetch_add(1, Ordering::Relaxed);
            match self.convert_member(&mut archive, member, unit) {
                Ok((dest, rows)) => {
                    tracing::debug!("{} -> {} ({} rows)", member.name, dest.display(), rows);
                    let mut t = state.tally.lock();
                    t.members += 1;
                    t.rows += rows;
                    if !t.outputs.insert(dest.clone()) {
                        // Same member name in another archive; the last rename wins.
                        tracing::warn!(
                            "{} was already written in this run; replaced by member {} of archive {}",
                            dest.display(),
                            member.name,
                            job.path.display()
                        );
                    }
                }
                Err(e) => self.on_unit_error(e, &job.path, Some(&member.name), state)?,
            }
        }
        Ok(())
    }

    /// Two streaming passes over the member: the first indexes names and families, the
    /// second writes one row per individual.
    fn convert_member(
        &self,
        archive: &mut Archive,
        member: &MemberEntry,
        unit: usize,
    ) -> std::result::Result<(PathBuf, u64), UnitError> {
        let opts = &self.opts;
        let _span = tracing::info_span!(
            "member",
            archive = %archive.path().display(),
            name = %member.name
        )
        .entered();
        let dest = output_path_for(&opts.output_dir, &member.name, &opts.record_ext, &opts.output_ext)
            .map_err(UnitError::Input)?;

        let lineage = {
            let stream = archive.open_member(member.index).map_err(UnitError::Input)?;
            let reader = RecordReader::new(BufReader::with_capacity(opts.read_buffer_bytes, stream));
            Lineage::build(reader)
                .context("index individuals and families")
                .map_err(UnitError::Input)?
        };

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))
                .map_err(UnitError::Output)?;
        }
        let staging = staging_path(&dest, Some(unit));
        let mut writer = ChunkedCsvWriter::create(
            &dest,
            &staging,
            opts.chunk_size,
            opts.write_buffer_bytes,
            opts.crlf,
        )
        .map_err(UnitError::Output)?;

        let stream = archive.open_member(member.index).map_err(UnitError::Input)?;
        let reader = RecordReader::new(BufReader::with_capacity(opts.read_buffer_bytes, stream));
        for (i, rec) in reader.records0("INDI").enumerate() {
            let rec = rec.context("read individual records").map_err(UnitError::Input)?;
            let row = extract_row(i as u64 + 1, &Person::new(&rec), &lineage);
            writer.append(row).map_err(UnitError::Output)?;
        }
        let rows = writer.finish().map_err(UnitError::Output)?;
        Ok((dest, rows))
    }

    /// Fatal errors are returned with the archive/member attached; skippable ones are logged
    /// and recorded.
    fn on_unit_error(
        &self,
        err: UnitError,
        archive: &Path,
        member: Option<&str>,
        state: &RunState,
    ) -> Result<()> {
        let (err, fatal) = match err {
            UnitError::Output(e) => (e, true),
            UnitError::Input(e) => (e, self.opts.error_policy == ErrorPolicy::Abort),
        };
        let label = match member {
            Some(m) => format!("converting member {} of archive {}", m, archive.display()),
            None => format!("opening archive {}", archive.display()),
        };
        if fatal {
            return Err(err.context(label));
        }
        tracing::warn!("Skipping after error while {}: {:#}", label, err);
        state.tally.lock().failures.push(Failure {
            archive: archive.to_path_buf(),
            member: member.map(str::to_string),
            error: format!("{:#}", err),
        });
        Ok(())
    }
}
