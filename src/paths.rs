use anyhow::{bail, Context, Result};
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// One archive found in the input directory.
#[derive(Clone, Debug)]
pub struct ArchiveJob {
    pub path: PathBuf,
}

/// List archives directly inside `dir` whose file name ends with `ext` (case-sensitive),
/// sorted by file name. Anything else is skipped.
pub fn discover_archives(dir: &Path, ext: &str) -> Result<Vec<ArchiveJob>> {
    if !dir.is_dir() {
        bail!("input directory {} does not exist or is not a directory", dir.display());
    }
    let mut jobs = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let ent = entry.with_context(|| format!("list {}", dir.display()))?;
        let matches = ent.file_name().to_str().map_or(false, |n| n.ends_with(ext));
        if matches && ent.path().is_file() {
            jobs.push(ArchiveJob { path: ent.path().to_path_buf() });
        } else {
            tracing::debug!("skipping {}", ent.path().display());
        }
    }
    Ok(jobs)
}

/// Output path for an archive member: the trailing `record_ext` of `member` is replaced by
/// `output_ext`, and the result is placed under `out_dir`. Directory parts of the member name
/// are kept; names that are absolute or climb out with `..` are rejected.
pub fn output_path_for(out_dir: &Path, member: &str, record_ext: &str, output_ext: &str) -> Result<PathBuf> {
    let stem = member.strip_suffix(record_ext).unwrap_or(member);
    let rel = PathBuf::from(format!("{}{}", stem, output_ext));
    let safe = rel.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !safe {
        bail!("member name {:?} escapes the output directory", member);
    }
    Ok(out_dir.join(rel))
}
