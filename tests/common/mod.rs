#![allow(dead_code)]

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;

/// Input and output directories under one temp dir (kept alive by the returned guard).
pub fn make_dirs() -> (tempfile::TempDir, PathBuf, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("zipped");
    let output = dir.path().join("csvs");
    fs::create_dir_all(&input).unwrap();
    fs::create_dir_all(&output).unwrap();
    (dir, input, output)
}

/// Write a zip archive with the given members. Names ending in `/` become directories.
pub fn write_zip(path: &Path, members: &[(&str, &[u8])]) {
    let f = File::create(path).unwrap();
    let mut zw = zip::ZipWriter::new(f);
    let opts = SimpleFileOptions::default();
    for (name, body) in members {
        if name.ends_with('/') {
            zw.add_directory(*name, opts).unwrap();
        } else {
            zw.start_file(*name, opts).unwrap();
            zw.write_all(body).unwrap();
        }
    }
    zw.finish().unwrap();
}

/// All CSV records of a file, header included.
pub fn read_csv_rows(path: &Path) -> Vec<Vec<String>> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(false).from_path(path).unwrap();
    rdr.records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect()
}

pub fn header_row() -> Vec<String> {
    gedcsv::HEADER.iter().map(|s| s.to_string()).collect()
}

/// The two-person example: John with a birth in Paris, Jane whose father is John.
pub const SCENARIO_GED: &str = "\
0 HEAD
1 SOUR TEST
1 CHAR UTF-8
0 @I1@ INDI
1 NAME John /Smith/
1 SEX M
1 BIRT
2 DATE 12 JUN 1900
2 PLAC Paris
1 FAMS @F1@
0 @I2@ INDI
1 NAME Jane /Smith/
1 SEX F
1 FAMC @F1@
0 @F1@ FAM
1 HUSB @I1@
1 CHIL @I2@
0 TRLR
";

/// `n` individuals in generations of pairs: every person after the first two is the child of
/// the couple two and three places earlier. Some people lack names, births, dates or places.
pub fn generated_ged(n: usize) -> String {
    let mut s = String::from("0 HEAD\n1 CHAR UTF-8\n");
    for i in 1..=n {
        s.push_str(&format!("0 @I{i}@ INDI\n"));
        if i % 7 != 0 {
            s.push_str(&format!("1 NAME Given{i} /Family{}/\n", i % 5));
        }
        s.push_str(if i % 2 == 0 { "1 SEX F\n" } else { "1 SEX M\n" });
        if i % 3 != 0 {
            s.push_str("1 BIRT\n");
            if i % 4 != 0 {
                s.push_str(&format!("2 DATE {} MAR {}\n", i % 28 + 1, 1700 + i));
            }
            if i % 5 != 0 {
                s.push_str(&format!("2 PLAC Town {i}, County\n"));
            }
        }
        if i > 3 {
            s.push_str(&format!("1 FAMC @F{i}@\n"));
        }
    }
    for i in 4..=n {
        s.push_str(&format!("0 @F{i}@ FAM\n1 HUSB @I{}@\n1 WIFE @I{}@\n1 CHIL @I{i}@\n", i - 3, i - 2));
    }
    s.push_str("0 TRLR\n");
    s
}
