use assaylab_core::ingest::{parse_samples_csv, read_samples_csv};
use assaylab_core::AssayLabError;
use assaylab_schemas::{assay::AssayKind, sample::RawReading};
use std::fs;
use tempfile::TempDir;

fn reading(value: f64) -> RawReading {
    RawReading::Number(value)
}

#[test]
fn comma_separated_upload() {
    let text = "treatment_name,sample_name,765\nControl,Rep1,0.123\nControl,Rep2,0.145\n";
    let drafts = parse_samples_csv(text, AssayKind::TotalPhenol, "upload.csv").unwrap();
    assert_eq!(drafts.len(), 2);
    assert_eq!(drafts[0].treatment_name, "Control");
    assert_eq!(drafts[1].sample_name, "Rep2");
    assert_eq!(drafts[0].absorbance_values["765"], reading(0.123));
}

#[test]
fn semicolon_upload_with_comma_decimals() {
    let text = "treatment_name;sample_name;530;600\r\nHeat;R1;0,512;0,101\r\n";
    let drafts = parse_samples_csv(text, AssayKind::Anthocyanin, "upload.csv").unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].absorbance_values["530"], reading(0.512));
    assert_eq!(drafts[0].absorbance_values["600"], reading(0.101));
}

#[test]
fn tab_upload_with_korean_headers_and_bom() {
    let text = "\u{feff}처리구명\t샘플명\t517\n대조구\t반복1\t0.4\n";
    let drafts = parse_samples_csv(text, AssayKind::DpphScavenging, "upload.tsv").unwrap();
    assert_eq!(drafts[0].treatment_name, "대조구");
    assert_eq!(drafts[0].sample_name, "반복1");
    assert_eq!(drafts[0].absorbance_values["517"], reading(0.4));
}

#[test]
fn quotes_blank_lines_and_whitespace_are_tolerated() {
    let text = "\"treatment_name\", \"sample_name\" ,\"425\"\n\n  \n\"Control\", \"Rep1\" , \"0.2\"\n";
    let drafts = parse_samples_csv(text, AssayKind::Glucosinolate, "upload.csv").unwrap();
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].treatment_name, "Control");
    assert_eq!(drafts[0].absorbance_values["425"], reading(0.2));
}

#[test]
fn rows_with_wrong_field_count_are_skipped() {
    let text = "treatment_name,sample_name,560\nControl,R1,0.4\nControl,R2\nControl,R3,0.5,extra\nHeat,R1,0.3\n";
    let drafts = parse_samples_csv(text, AssayKind::Sod, "upload.csv").unwrap();
    let names: Vec<_> = drafts
        .iter()
        .map(|d| format!("{}/{}", d.treatment_name, d.sample_name))
        .collect();
    assert_eq!(names, vec!["Control/R1", "Heat/R1"]);
}

#[test]
fn unbalanced_quote_stays_on_its_line() {
    let text = "treatment_name,sample_name,560\n\"Control,R1,0.4\nHeat,R1,0.3\nHeat,R2,0.2\n";
    let drafts = parse_samples_csv(text, AssayKind::Sod, "upload.csv").unwrap();
    let names: Vec<_> = drafts
        .iter()
        .map(|d| format!("{}/{}", d.treatment_name, d.sample_name))
        .collect();
    assert_eq!(names, vec!["Control/R1", "Heat/R1", "Heat/R2"]);
    assert_eq!(drafts[0].absorbance_values["560"], reading(0.4));
    assert_eq!(drafts[2].absorbance_values["560"], reading(0.2));
}

#[test]
fn missing_columns_fall_back() {
    let text = "sample_name,665.2\nR1,0.5\n,0.6\n";
    let drafts = parse_samples_csv(text, AssayKind::ChlorophyllAB, "upload.csv").unwrap();
    assert_eq!(drafts[0].treatment_name, "N/A");
    assert_eq!(drafts[1].sample_name, "N/A");
    assert_eq!(drafts[0].absorbance_values["665.2"], reading(0.5));
    assert_eq!(drafts[0].absorbance_values["652.4"], reading(0.0));
    assert_eq!(drafts[0].absorbance_values["470"], reading(0.0));
    assert_eq!(drafts[0].absorbance_values.len(), 3);
}

#[test]
fn unreadable_values_become_zero() {
    let text = "treatment_name,sample_name,240\nControl,R1,n.d.\n";
    let drafts = parse_samples_csv(text, AssayKind::Cat, "upload.csv").unwrap();
    assert_eq!(drafts[0].absorbance_values["240"], reading(0.0));
}

#[test]
fn header_only_and_empty_uploads_are_errors() {
    assert!(matches!(
        parse_samples_csv("treatment_name,sample_name,765\n", AssayKind::TotalPhenol, "a.csv"),
        Err(AssayLabError::MissingHeader(_))
    ));
    assert!(matches!(
        parse_samples_csv("", AssayKind::TotalPhenol, "a.csv"),
        Err(AssayLabError::MissingHeader(_))
    ));
    assert!(matches!(
        parse_samples_csv("a,b,c\n1,2\n", AssayKind::TotalPhenol, "a.csv"),
        Err(AssayLabError::NoRows(_))
    ));
}

#[test]
fn uploads_are_read_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("samples.csv");
    fs::write(&path, "treatment_name,sample_name,390\nControl,R1,0.31\n").unwrap();
    let drafts = read_samples_csv(&path, AssayKind::H2o2).unwrap();
    assert_eq!(drafts[0].absorbance_values["390"], reading(0.31));

    assert!(matches!(
        read_samples_csv(dir.path().join("nope.csv"), AssayKind::H2o2),
        Err(AssayLabError::FileIO(_, _))
    ));
}
