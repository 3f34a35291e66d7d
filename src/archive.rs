//! Zip container access: member listing and per-member decompressed streams.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// A qualifying archive member, addressed by its central-directory index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberEntry {
    pub index: usize,
    pub name: String,
}

/// An open zip archive. The underlying file is closed when this is dropped.
pub struct Archive {
    path: PathBuf,
    zip: ZipArchive<BufReader<File>>,
}

impl Archive {
    pub fn open(path: &Path) -> Result<Self> {
        let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let zip = ZipArchive::new(BufReader::new(f))
            .with_context(|| format!("read zip directory of {}", path.display()))?;
        Ok(Self { path: path.to_path_buf(), zip })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File members whose name ends with `ext`, in archive order. Directories and other
    /// members are skipped.
    pub fn members(&mut self, ext: &str) -> Result<Vec<MemberEntry>> {
        let mut out = Vec::new();
        for index in 0..self.zip.len() {
            let entry = self
                .zip
                .by_index_raw(index)
                .with_context(|| format!("read entry #{} of {}", index, self.path.display()))?;
            if entry.is_file() && entry.name().ends_with(ext) {
                out.push(MemberEntry { index, name: entry.name().to_string() });
            } else {
                tracing::debug!("skipping member {} of {}", entry.name(), self.path.display());
            }
        }
        Ok(out)
    }

    /// Decompressed byte stream of one member. Each call starts from the member's beginning.
    pub fn open_member(&mut self, index: usize) -> Result<impl Read + '_> {
        self.zip
            .by_index(index)
            .with_context(|| format!("open entry #{} of {}", index, self.path.display()))
    }
}
