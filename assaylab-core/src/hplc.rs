//! HPLC chromatogram handling: peak normalization, retention-time matching
//! against user standards, and concentration from matched peak areas.

use crate::error::AssayLabError;
use crate::numeric::parse_reading;
use assaylab_schemas::{
    file_formats::ExtractionFile,
    hplc::{
        HplcAnalysisType, HplcCalibration, HplcFileInfo, HplcMatchResult, HplcPeak,
        HplcSampleResult, RawPeak, RtStandard,
    },
    sample::RawReading,
};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Injection volume factor shared by both concentration formulas.
const EXTRACT_VOLUME_ML: f64 = 0.5;
/// µg/mL to mg/g factor of the phenol formula.
const PHENOL_DILUTION: f64 = 2.0;

fn first_nonzero(candidates: [Option<&RawReading>; 3]) -> f64 {
    candidates
        .into_iter()
        .map(parse_reading)
        .find(|value| *value != 0.0)
        .unwrap_or(0.0)
}

/// Turns extraction output into peaks, dropping any peak without a positive
/// retention time and area.
pub fn normalize_peaks(raw_peaks: &[RawPeak]) -> Vec<HplcPeak> {
    raw_peaks
        .iter()
        .map(|peak| HplcPeak {
            retention_time: first_nonzero([
                peak.ret_time.as_ref(),
                peak.retention_time.as_ref(),
                peak.rt.as_ref(),
            ]),
            area: first_nonzero([
                peak.area_title.as_ref(),
                peak.area.as_ref(),
                peak.peak_area.as_ref(),
            ]),
        })
        .filter(|peak| peak.retention_time > 0.0 && peak.area > 0.0)
        .collect()
}

/// Matches every standard to the closest peak inside `[floor(rt), floor(rt) + 1)`.
///
/// Exactly one result per standard, in standard order. A standard with no
/// peak in its window is reported with empty `matched_rt` and `area`. On
/// equal distance the earlier peak wins.
pub fn match_standards(peaks: &[HplcPeak], standards: &[RtStandard]) -> Vec<HplcMatchResult> {
    standards
        .iter()
        .map(|standard| {
            let window_start = standard.rt.floor();
            let window_end = window_start + 1.0;

            let closest = peaks
                .iter()
                .filter(|p| p.retention_time >= window_start && p.retention_time < window_end)
                .fold(None::<&HplcPeak>, |best, candidate| match best {
                    Some(best)
                        if (candidate.retention_time - standard.rt).abs()
                            >= (best.retention_time - standard.rt).abs() =>
                    {
                        Some(best)
                    }
                    _ => Some(candidate),
                });

            HplcMatchResult {
                compound: standard.compound.clone(),
                standard_rt: standard.rt,
                matched_rt: closest.map(|p| p.retention_time),
                area: closest.map(|p| p.area),
            }
        })
        .collect()
}

/// Splits `Factor_Treatment_Replicate.pdf` into its parts. Missing parts
/// fall back to the whole name, `"N/A"` and `"1"` respectively.
pub fn parse_file_name(file_name: &str) -> HplcFileInfo {
    let stem = strip_pdf_extension(file_name);
    let mut parts = stem.split('_');
    let mut next_part = || parts.next().filter(|p| !p.is_empty()).map(str::to_string);

    HplcFileInfo {
        factor: next_part().unwrap_or_else(|| stem.to_string()),
        treatment: next_part().unwrap_or_else(|| "N/A".to_string()),
        replicate: next_part().unwrap_or_else(|| "1".to_string()),
    }
}

fn strip_pdf_extension(file_name: &str) -> &str {
    let split = file_name.len().saturating_sub(4);
    match (file_name.get(..split), file_name.get(split..)) {
        (Some(stem), Some(ext)) if ext.eq_ignore_ascii_case(".pdf") => stem,
        _ => file_name,
    }
}

fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}

/// Concentration of `compound` from its peak area.
///
/// Phenol analyses use the compound's own curve:
/// `(area + b) / a * 2 / sample_weight` (mg/g). All other analyses use
/// `(area / standard_area) * 0.5 / molecular_weight * 1000 / sample_weight
/// * conversion_factor` (µmol/g dry wt.), with the conversion factor
/// defaulting to 1. Any missing or zero parameter, or a missing or
/// non-positive area, yields `None`.
pub fn concentration(
    area: Option<f64>,
    compound: &str,
    analysis_type: HplcAnalysisType,
    calibration: &HplcCalibration,
) -> Option<f64> {
    let area = present(area).filter(|a| *a > 0.0)?;
    let sample_weight = present(calibration.sample_weight)?;

    let value = if analysis_type.uses_compound_curves() {
        let curve = calibration.curves.get(compound)?;
        let a = present(curve.a)?;
        let b = present(curve.b)?;
        (area + b) / a * PHENOL_DILUTION / sample_weight
    } else {
        let standard_area = present(calibration.standard_area)?;
        let molecular_weight = present(calibration.molecular_weight)?;
        let conversion = present(calibration.conversion_factor).unwrap_or(1.0);
        (area / standard_area) * EXTRACT_VOLUME_ML / molecular_weight * 1000.0 / sample_weight
            * conversion
    };

    Some(value).filter(|v| v.is_finite())
}

/// Runs one chromatogram through normalization, matching and quantitation.
pub fn process_chromatogram(
    file_name: &str,
    raw_peaks: &[RawPeak],
    standards: &[RtStandard],
    analysis_type: HplcAnalysisType,
    calibration: &HplcCalibration,
) -> Vec<HplcSampleResult> {
    let info = parse_file_name(file_name);
    let peaks = normalize_peaks(raw_peaks);
    let matches = match_standards(&peaks, standards);

    let matched = matches.iter().filter(|m| m.matched_rt.is_some()).count();
    debug!(
        file = file_name,
        peaks = peaks.len(),
        standards = standards.len(),
        matched,
        "chromatogram processed"
    );

    matches
        .into_iter()
        .map(|m| HplcSampleResult {
            sample_name: file_name.to_string(),
            factor: info.factor.clone(),
            treatment: info.treatment.clone(),
            replicate: info.replicate.clone(),
            concentration: concentration(m.area, &m.compound, analysis_type, calibration),
            compound: m.compound,
            standard_rt: m.standard_rt,
            matched_rt: m.matched_rt,
            area: m.area,
        })
        .collect()
}

/// Returns copies of `results` with concentrations recomputed from
/// `calibration`. The input is left untouched.
pub fn recalculate(
    results: &[HplcSampleResult],
    analysis_type: HplcAnalysisType,
    calibration: &HplcCalibration,
) -> Vec<HplcSampleResult> {
    results
        .iter()
        .map(|r| HplcSampleResult {
            concentration: concentration(r.area, &r.compound, analysis_type, calibration),
            ..r.clone()
        })
        .collect()
}

pub fn parse_hplc_kind(key: &str) -> Result<HplcAnalysisType, AssayLabError> {
    HplcAnalysisType::from_key(key)
        .ok_or_else(|| AssayLabError::UnknownHplcAnalysis(key.to_string()))
}

/// Reads one extraction-service JSON output. A missing `file_name` falls
/// back to the file's own name with a `.pdf` suffix.
pub fn read_extraction_file<P: AsRef<Path>>(path: P) -> Result<ExtractionFile, AssayLabError> {
    let path_ref = path.as_ref();
    let path_str = path_ref.to_string_lossy().to_string();

    let content = fs::read_to_string(path_ref)
        .map_err(|e| AssayLabError::FileIO(path_str.clone(), e))?;
    let mut file: ExtractionFile = serde_json::from_str(&content)
        .map_err(|e| AssayLabError::JsonParsing(path_str.clone(), e))?;

    if file.file_name.is_none() {
        let stem = path_ref
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| path_str.clone());
        file.file_name = Some(format!("{}.pdf", stem));
    }
    if file.peaks.is_empty() {
        warn!(file = %path_str, "extraction output has no peaks");
    }
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_extension_is_case_insensitive() {
        assert_eq!(strip_pdf_extension("Leaf_A_1.PDF"), "Leaf_A_1");
        assert_eq!(strip_pdf_extension("pdf"), "pdf");
        assert_eq!(strip_pdf_extension("Leaf.pdfx"), "Leaf.pdfx");
    }

    #[test]
    fn first_nonzero_alias_wins() {
        let peak = RawPeak {
            ret_time: Some(RawReading::Number(0.0)),
            rt: Some(RawReading::Text("4.2".into())),
            area: Some(RawReading::Number(10.0)),
            ..RawPeak::default()
        };
        let peaks = normalize_peaks(&[peak]);
        assert_eq!(
            peaks,
            vec![HplcPeak {
                retention_time: 4.2,
                area: 10.0
            }]
        );
    }
}
