use assaylab_core::hplc::{
    concentration, match_standards, normalize_peaks, parse_file_name, parse_hplc_kind,
    process_chromatogram, read_extraction_file, recalculate,
};
use assaylab_core::AssayLabError;
use assaylab_schemas::{
    hplc::{CompoundCurve, HplcAnalysisType, HplcCalibration, HplcPeak, RawPeak, RtStandard},
    sample::RawReading,
};
use std::collections::BTreeMap;
use std::fs;
use tempfile::TempDir;

fn peak(retention_time: f64, area: f64) -> HplcPeak {
    HplcPeak {
        retention_time,
        area,
    }
}

fn standard(compound: &str, rt: f64) -> RtStandard {
    RtStandard {
        compound: compound.to_string(),
        rt,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn generic_calibration() -> HplcCalibration {
    HplcCalibration {
        sample_weight: Some(0.1),
        standard_area: Some(100.0),
        molecular_weight: Some(500.0),
        ..Default::default()
    }
}

#[test]
fn matches_peak_inside_integer_window() {
    let results = match_standards(&[peak(5.1, 100.0), peak(6.0, 50.0)], &[standard("X", 5.2)]);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].compound, "X");
    assert_eq!(results[0].standard_rt, 5.2);
    assert_eq!(results[0].matched_rt, Some(5.1));
    assert_eq!(results[0].area, Some(100.0));
}

#[test]
fn unmatched_standard_is_reported_with_nulls() {
    let results = match_standards(&[peak(6.0, 50.0)], &[standard("X", 5.2)]);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].matched_rt, None);
    assert_eq!(results[0].area, None);
}

#[test]
fn window_is_half_open() {
    let results = match_standards(&[peak(6.0, 1.0), peak(5.0, 2.0)], &[standard("Y", 5.9)]);
    assert_eq!(results[0].matched_rt, Some(5.0));
}

#[test]
fn closest_candidate_wins_and_ties_keep_first() {
    let closest = match_standards(
        &[peak(5.0, 1.0), peak(5.25, 2.0), peak(5.9, 3.0)],
        &[standard("Z", 5.2)],
    );
    assert_eq!(closest[0].matched_rt, Some(5.25));

    let tie = match_standards(&[peak(5.25, 1.0), peak(5.75, 2.0)], &[standard("T", 5.5)]);
    assert_eq!(tie[0].matched_rt, Some(5.25));
    assert_eq!(tie[0].area, Some(1.0));
}

#[test]
fn results_follow_standard_order() {
    let standards = vec![standard("B", 7.1), standard("A", 3.4), standard("C", 9.9)];
    let results = match_standards(&[peak(3.5, 10.0), peak(7.2, 20.0)], &standards);
    let compounds: Vec<_> = results.iter().map(|r| r.compound.as_str()).collect();
    assert_eq!(compounds, vec!["B", "A", "C"]);
    assert_eq!(results[2].matched_rt, None);
}

#[test]
fn same_peak_may_serve_several_standards() {
    let results = match_standards(
        &[peak(4.5, 10.0)],
        &[standard("P", 4.4), standard("Q", 4.6)],
    );
    assert_eq!(results[0].area, Some(10.0));
    assert_eq!(results[1].area, Some(10.0));
}

#[test]
fn peaks_are_normalized_from_aliases() {
    let raw = vec![
        RawPeak {
            ret_time: Some(RawReading::Text("5.1".into())),
            area_title: Some(RawReading::Text("1.2e 3".into())),
            ..Default::default()
        },
        RawPeak {
            retention_time: Some(RawReading::Number(6.2)),
            peak_area: Some(RawReading::Number(40.0)),
            ..Default::default()
        },
        RawPeak {
            rt: Some(RawReading::Number(7.0)),
            area: Some(RawReading::Number(0.0)),
            ..Default::default()
        },
        RawPeak {
            rt: Some(RawReading::Text("-1".into())),
            area: Some(RawReading::Number(5.0)),
            ..Default::default()
        },
    ];
    let peaks = normalize_peaks(&raw);
    assert_eq!(peaks.len(), 2);
    assert!(close(peaks[0].area, 1200.0));
    assert_eq!(peaks[1], peak(6.2, 40.0));
}

#[test]
fn file_names_carry_sample_metadata() {
    let info = parse_file_name("Leaf_Control_2.pdf");
    assert_eq!(info.factor, "Leaf");
    assert_eq!(info.treatment, "Control");
    assert_eq!(info.replicate, "2");

    let bare = parse_file_name("Root.PDF");
    assert_eq!(bare.factor, "Root");
    assert_eq!(bare.treatment, "N/A");
    assert_eq!(bare.replicate, "1");

    let gap = parse_file_name("Stem__3.pdf");
    assert_eq!(gap.treatment, "N/A");
    assert_eq!(gap.replicate, "3");
}

#[test]
fn phenol_concentration_uses_compound_curve() {
    let mut curves = BTreeMap::new();
    curves.insert(
        "Rutin".to_string(),
        CompoundCurve {
            a: Some(2.0),
            b: Some(10.0),
        },
    );
    let calibration = HplcCalibration {
        sample_weight: Some(0.5),
        curves,
        ..Default::default()
    };

    let value = concentration(Some(100.0), "Rutin", HplcAnalysisType::Phenol, &calibration);
    assert!(close(value.unwrap(), 220.0));
    assert_eq!(
        concentration(Some(100.0), "Quercetin", HplcAnalysisType::Phenol, &calibration),
        None
    );
}

#[test]
fn phenol_curve_needs_both_coefficients() {
    let mut curves = BTreeMap::new();
    curves.insert(
        "Rutin".to_string(),
        CompoundCurve {
            a: Some(2.0),
            b: None,
        },
    );
    let calibration = HplcCalibration {
        sample_weight: Some(0.5),
        curves,
        ..Default::default()
    };
    assert_eq!(
        concentration(Some(100.0), "Rutin", HplcAnalysisType::Phenol, &calibration),
        None
    );
}

#[test]
fn generic_concentration_with_conversion_factor() {
    let mut calibration = generic_calibration();
    let base = concentration(
        Some(200.0),
        "Sinigrin",
        HplcAnalysisType::Glucosinolate,
        &calibration,
    );
    assert!(close(base.unwrap(), 20.0));

    calibration.conversion_factor = Some(2.0);
    let converted =
        concentration(Some(200.0), "Sinigrin", HplcAnalysisType::Glucosinolate, &calibration);
    assert!(close(converted.unwrap(), 40.0));
}

#[test]
fn missing_inputs_give_null_concentration() {
    let calibration = generic_calibration();
    assert_eq!(
        concentration(None, "X", HplcAnalysisType::Tilianin, &calibration),
        None
    );
    let no_weight = HplcCalibration {
        sample_weight: None,
        ..generic_calibration()
    };
    assert_eq!(
        concentration(Some(10.0), "X", HplcAnalysisType::Tilianin, &no_weight),
        None
    );
    assert_eq!(
        concentration(Some(10.0), "X", HplcAnalysisType::Acacetin, &HplcCalibration::default()),
        None
    );
}

#[test]
fn negative_area_gives_null_concentration() {
    let calibration = generic_calibration();
    assert_eq!(
        concentration(Some(-50.0), "X", HplcAnalysisType::Tilianin, &calibration),
        None
    );
    assert!(concentration(Some(50.0), "X", HplcAnalysisType::Tilianin, &calibration).is_some());
}

#[test]
fn chromatogram_is_processed_end_to_end() {
    let raw = vec![
        RawPeak {
            rt: Some(RawReading::Number(5.1)),
            area: Some(RawReading::Number(200.0)),
            ..Default::default()
        },
        RawPeak {
            rt: Some(RawReading::Number(8.3)),
            area: Some(RawReading::Number(50.0)),
            ..Default::default()
        },
    ];
    let standards = vec![standard("Sinigrin", 5.2), standard("Gluconapin", 12.0)];
    let results = process_chromatogram(
        "Leaf_Drought_1.pdf",
        &raw,
        &standards,
        HplcAnalysisType::Glucosinolate,
        &generic_calibration(),
    );

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].sample_name, "Leaf_Drought_1.pdf");
    assert_eq!(results[0].factor, "Leaf");
    assert_eq!(results[0].treatment, "Drought");
    assert_eq!(results[0].replicate, "1");
    assert!(close(results[0].concentration.unwrap(), 20.0));
    assert_eq!(results[1].matched_rt, None);
    assert_eq!(results[1].concentration, None);
}

#[test]
fn recalculation_is_pure_and_idempotent() {
    let raw = vec![RawPeak {
        rt: Some(RawReading::Number(5.1)),
        area: Some(RawReading::Number(200.0)),
        ..Default::default()
    }];
    let standards = vec![standard("Sinigrin", 5.2)];
    let original = process_chromatogram(
        "Leaf_A_1.pdf",
        &raw,
        &standards,
        HplcAnalysisType::Glucosinolate,
        &HplcCalibration::default(),
    );
    assert_eq!(original[0].concentration, None);

    let calibration = generic_calibration();
    let first = recalculate(&original, HplcAnalysisType::Glucosinolate, &calibration);
    let second = recalculate(&first, HplcAnalysisType::Glucosinolate, &calibration);
    assert_eq!(first, second);
    assert!(close(first[0].concentration.unwrap(), 20.0));
    assert_eq!(original[0].concentration, None);
}

#[test]
fn extraction_files_are_read_from_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Leaf_A_1.json");
    fs::write(
        &path,
        r#"{"peaks": [{"Ret. Time": "5.1", "Area": "1.0e2"}, {"rt": 6.4, "peak_area": 30}]}"#,
    )
    .unwrap();

    let file = read_extraction_file(&path).unwrap();
    assert_eq!(file.file_name.as_deref(), Some("Leaf_A_1.pdf"));
    let peaks = normalize_peaks(&file.peaks);
    assert_eq!(peaks, vec![peak(5.1, 100.0), peak(6.4, 30.0)]);
}

#[test]
fn broken_extraction_files_are_errors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        read_extraction_file(&path),
        Err(AssayLabError::JsonParsing(_, _))
    ));
    assert!(matches!(
        read_extraction_file(dir.path().join("missing.json")),
        Err(AssayLabError::FileIO(_, _))
    ));
}

#[test]
fn hplc_kinds_are_parsed_strictly() {
    assert_eq!(parse_hplc_kind("tilianin").unwrap(), HplcAnalysisType::Tilianin);
    assert!(matches!(
        parse_hplc_kind("lipids"),
        Err(AssayLabError::UnknownHplcAnalysis(_))
    ));
}
