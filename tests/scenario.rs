#[path = "common/mod.rs"]
mod common;

use common::*;
use gedcsv::GedcomCsv;
use std::fs;

/// The worked example: `a.zip` holds `f.ged` with John (born Paris 1900) and Jane, whose
/// father is John. Expect `f.csv` with exactly these bytes (CRLF rows by default).
#[test]
fn two_person_archive_converts_to_expected_csv() {
    let (_guard, input, output) = make_dirs();
    write_zip(&input.join("a.zip"), &[("f.ged", SCENARIO_GED.as_bytes())]);

    let summary = GedcomCsv::new()
        .input_dir(&input)
        .output_dir(&output)
        .chunk_size(10_000)
        .progress(false)
        .convert()
        .unwrap();

    let csv_path = output.join("f.csv");
    assert_eq!(summary.outputs, vec![csv_path.clone()]);
    assert_eq!(summary.archives, 1);
    assert_eq!(summary.members, 1);
    assert_eq!(summary.rows, 2);
    assert!(summary.failures.is_empty());

    let expected = "Index,GEDid,Name,Gender,Father_name,Mother_name,Birth Year,Birth Place\r\n\
                    1,I1,John Smith,M,,,1900,Paris\r\n\
                    2,I2,Jane Smith,F,John Smith,,,\r\n";
    assert_eq!(fs::read_to_string(&csv_path).unwrap(), expected);
}

/// Same example with `\n` terminators and a chunk size of one row.
#[test]
fn lf_rows_and_single_row_chunks() {
    let (_guard, input, output) = make_dirs();
    write_zip(&input.join("a.zip"), &[("f.ged", SCENARIO_GED.as_bytes())]);

    GedcomCsv::new()
        .input_dir(&input)
        .output_dir(&output)
        .chunk_size(1)
        .crlf(false)
        .progress(false)
        .convert()
        .unwrap();

    let out = fs::read_to_string(output.join("f.csv")).unwrap();
    assert_eq!(
        out,
        "Index,GEDid,Name,Gender,Father_name,Mother_name,Birth Year,Birth Place\n\
         1,I1,John Smith,M,,,1900,Paris\n\
         2,I2,Jane Smith,F,John Smith,,,\n"
    );
}

/// Parents defined after the child, places containing commas, and a mother link:
/// values are quoted where needed and references resolve in either direction.
#[test]
fn forward_references_and_quoting() {
    let ged = "\
0 @C1@ INDI
1 NAME Child /Doe/
1 FAMC @F1@
1 BIRT
2 DATE ABT 1931
2 PLAC Springfield, Illinois
0 @F1@ FAM
1 HUSB @P1@
1 WIFE @P2@
0 @P1@ INDI
1 NAME Pat /Doe/
0 @P2@ INDI
1 NAME Sam /Roe/ Jr.
0 TRLR
";
    let (_guard, input, output) = make_dirs();
    write_zip(&input.join("doe.zip"), &[("doe.ged", ged.as_bytes())]);

    GedcomCsv::new().input_dir(&input).output_dir(&output).progress(false).convert().unwrap();

    let rows = read_csv_rows(&output.join("doe.csv"));
    assert_eq!(rows[0], header_row());
    assert_eq!(
        rows[1],
        vec!["1", "C1", "Child Doe", "", "Pat Doe", "Sam Roe Jr.", "1931", "Springfield, Illinois"]
    );
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[2][1], "P1");
    assert_eq!(rows[3][1], "P2");
}

/// A member declaring `CHAR ANSI` is read as Windows-1252, so accented names and places come
/// through intact instead of as replacement characters.
#[test]
fn ansi_member_keeps_accented_text() {
    let (_guard, input, output) = make_dirs();
    let ged: &[u8] = b"0 HEAD\r\n1 CHAR ANSI\r\n0 @I1@ INDI\r\n1 NAME Jos\xE9 /Garc\xEDa/\r\n1 SEX M\r\n\
1 BIRT\r\n2 DATE 1901\r\n2 PLAC M\xE1laga\r\n0 TRLR\r\n";
    write_zip(&input.join("a.zip"), &[("f.ged", ged)]);

    let summary = GedcomCsv::new().input_dir(&input).output_dir(&output).progress(false).convert().unwrap();
    assert!(summary.failures.is_empty());

    let rows = read_csv_rows(&output.join("f.csv"));
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1], vec!["1", "I1", "Jos\u{e9} Garc\u{ed}a", "M", "", "", "1901", "M\u{e1}laga"]);
}
