use anyhow::Result;
use clap::Parser;
use gedcsv::{ErrorPolicy, GedcomCsv};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gedcsv")]
#[command(version)]
#[command(about = "Convert zipped GEDCOM files into one CSV of individuals per file", long_about = None)]
struct Cli {
    /// Directory holding the .zip archives
    #[arg(value_name = "INPUT_DIR")]
    input: PathBuf,

    /// Existing directory that receives the .csv files
    #[arg(value_name = "OUTPUT_DIR")]
    output: PathBuf,

    /// Rows buffered in memory before each write
    #[arg(short = 'c', long, default_value_t = 10_000)]
    chunk_size: usize,

    /// Skip malformed archives or members instead of stopping
    #[arg(long)]
    skip_errors: bool,

    /// Archives converted in parallel
    #[arg(short = 'j', long, default_value_t = 1)]
    jobs: usize,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Terminate rows with \n instead of \r\n
    #[arg(long)]
    lf: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let policy = if cli.skip_errors { ErrorPolicy::Skip } else { ErrorPolicy::Abort };
    let summary = GedcomCsv::new()
        .input_dir(&cli.input)
        .output_dir(&cli.output)
        .chunk_size(cli.chunk_size)
        .error_policy(policy)
        .file_concurrency(cli.jobs)
        .progress(!cli.no_progress)
        .crlf(!cli.lf)
        .convert()?;

    for f in &summary.failures {
        match &f.member {
            Some(m) => eprintln!("skipped {} in {}: {}", m, f.archive.display(), f.error),
            None => eprintln!("skipped {}: {}", f.archive.display(), f.error),
        }
    }
    println!(
        "Wrote {} CSV files ({} rows) from {} archives",
        summary.outputs.len(),
        summary.rows,
        summary.archives
    );
    println!("Time of process: {:.2} seconds", summary.elapsed.as_secs_f64());
    Ok(())
}
