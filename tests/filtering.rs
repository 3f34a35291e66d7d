#[path = "common/mod.rs"]
mod common;

use common::*;
use gedcsv::GedcomCsv;
use std::fs;

/// Non-archive files in the input directory and non-GEDCOM members inside archives are
/// ignored without error; nested member paths land in matching sub-directories.
#[test]
fn only_ged_members_of_zip_files_produce_output() {
    let (_guard, input, output) = make_dirs();
    fs::write(input.join("notes.txt"), "not an archive").unwrap();
    fs::write(input.join("upper.ZIP"), "suffix match is case-sensitive").unwrap();
    fs::create_dir(input.join("folder.zip")).unwrap();
    write_zip(
        &input.join("mixed.zip"),
        &[
            ("readme.txt", b"hello".as_slice()),
            ("trees/", b"".as_slice()),
            ("trees/nested.ged", SCENARIO_GED.as_bytes()),
            ("photo.ged.jpg", b"\xff\xd8".as_slice()),
            ("top.ged", SCENARIO_GED.as_bytes()),
            ("TOP.GED", SCENARIO_GED.as_bytes()),
        ],
    );

    let summary = GedcomCsv::new().input_dir(&input).output_dir(&output).progress(false).convert().unwrap();

    assert_eq!(summary.archives, 1);
    assert_eq!(summary.members, 2);
    assert_eq!(summary.outputs, vec![output.join("top.csv"), output.join("trees").join("nested.csv")]);
    assert!(summary.failures.is_empty());

    let mut top_level: Vec<String> = fs::read_dir(&output)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    top_level.sort();
    assert_eq!(top_level, vec!["top.csv", "trees"]);
    assert_eq!(read_csv_rows(&output.join("trees").join("nested.csv")).len(), 3);
}

/// An input directory without archives is a successful no-op.
#[test]
fn empty_input_directory_writes_nothing() {
    let (_guard, input, output) = make_dirs();
    let summary = GedcomCsv::new().input_dir(&input).output_dir(&output).progress(false).convert().unwrap();
    assert_eq!(summary.archives, 0);
    assert!(summary.outputs.is_empty());
    assert_eq!(fs::read_dir(&output).unwrap().count(), 0);
}

/// Archives and members without any individual still get a header-only CSV; custom
/// suffixes are honoured.
#[test]
fn header_only_output_and_custom_suffixes() {
    let (_guard, input, output) = make_dirs();
    let ged = "0 HEAD\n0 @F1@ FAM\n0 TRLR\n";
    write_zip(&input.join("families.arc"), &[("fam.gedcom", ged.as_bytes())]);
    write_zip(&input.join("ignored.zip"), &[("fam.gedcom", ged.as_bytes())]);

    let summary = GedcomCsv::new()
        .input_dir(&input)
        .output_dir(&output)
        .archive_ext(".arc")
        .record_ext(".gedcom")
        .output_ext(".tsv.csv")
        .crlf(false)
        .progress(false)
        .convert()
        .unwrap();

    assert_eq!(summary.outputs, vec![output.join("fam.tsv.csv")]);
    assert_eq!(summary.rows, 0);
    assert_eq!(
        fs::read_to_string(output.join("fam.tsv.csv")).unwrap(),
        "Index,GEDid,Name,Gender,Father_name,Mother_name,Birth Year,Birth Place\n"
    );
}

/// Members with the same name in different archives share one output file; the summary lists
/// it once while still counting every converted member.
#[test]
fn same_member_name_in_two_archives_is_one_output() {
    let (_guard, input, output) = make_dirs();
    write_zip(&input.join("a.zip"), &[("f.ged", SCENARIO_GED.as_bytes())]);
    write_zip(&input.join("b.zip"), &[("f.ged", SCENARIO_GED.as_bytes())]);

    let summary = GedcomCsv::new().input_dir(&input).output_dir(&output).progress(false).convert().unwrap();

    assert_eq!(summary.archives, 2);
    assert_eq!(summary.members, 2);
    assert_eq!(summary.outputs, vec![output.join("f.csv")]);
    assert_eq!(fs::read_dir(&output).unwrap().count(), 1);
    assert_eq!(read_csv_rows(&output.join("f.csv")).len(), 3);
}
