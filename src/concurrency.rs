//! Archive-level parallelism on a bounded rayon pool.

use crate::paths::ArchiveJob;
use anyhow::{Context, Result};
use rayon::prelude::*;

/// Run `f` over every archive with at most `limit` in flight. `limit <= 1` runs them in
/// order on the calling thread. Members inside one archive are always sequential, since `f`
/// handles a whole archive.
pub fn for_each_archive_limited<F>(archives: &[ArchiveJob], limit: usize, f: F) -> Result<()>
where
    F: Sync + Fn(&ArchiveJob) -> Result<()>,
{
    if limit <= 1 || archives.len() <= 1 {
        return archives.iter().try_for_each(&f);
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(limit.min(archives.len()))
        .thread_name(|i| format!("gedcsv-archive-{i}"))
        .build()
        .context("build archive thread pool")?;
    pool.install(|| archives.par_iter().try_for_each(&f))
}
