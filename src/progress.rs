//! Progress reporting: one count-style bar ticking once per archive.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const ARCHIVE_TEMPLATE: &str = "{spinner:.green} {prefix} {pos}/{len} archives [{bar:.cyan/blue}] {percent:>3}%  \
     elapsed: {elapsed_precise}  eta: {eta_precise}  {wide_msg}";

/// Bar over `total` archives. `label` is shown as the prefix; the message slot shows the
/// archive currently being converted.
pub fn make_archive_progress(total: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template(ARCHIVE_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");
    pb.set_style(style);
    pb.set_prefix(label.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}
