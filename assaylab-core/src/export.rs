//! CSV reports, upload templates and stat-card formatting.

use crate::error::AssayLabError;
use crate::grouping::GroupSummary;
use crate::samples::EvaluatedSample;
use assaylab_schemas::{
    assay::AssayKind,
    hplc::{HplcAnalysisType, HplcSampleResult},
};
use csv::{QuoteStyle, Writer, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

pub const DEFAULT_DECIMALS: usize = 4;
const UTF8_BOM: &str = "\u{feff}";

/// Language of exported column headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HeaderLocale {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "ko")]
    Korean,
}

impl HeaderLocale {
    fn sample_headers(&self) -> [&'static str; 4] {
        match self {
            HeaderLocale::English => ["Treatment", "Sample", "Result", "Unit"],
            HeaderLocale::Korean => ["처리구명", "샘플명", "분석결과", "단위"],
        }
    }

    fn pigment_headers(&self) -> [&'static str; 6] {
        match self {
            HeaderLocale::English => [
                "Treatment",
                "Sample",
                "Chl a",
                "Chl b",
                "Carotenoid",
                "Unit",
            ],
            HeaderLocale::Korean => [
                "처리구명",
                "샘플명",
                "Chl a",
                "Chl b",
                "Carotenoid",
                "단위",
            ],
        }
    }
}

fn fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

fn optional_fixed(value: Option<f64>, decimals: usize) -> String {
    value.map(|v| fixed(v, decimals)).unwrap_or_default()
}

fn new_writer() -> Writer<Vec<u8>> {
    WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new())
}

fn finish(writer: Writer<Vec<u8>>, label: &str) -> Result<String, AssayLabError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| AssayLabError::FileIO(label.to_string(), e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn csv_err(label: &str) -> impl Fn(csv::Error) -> AssayLabError + '_ {
    move |e| AssayLabError::CsvError(label.to_string(), e)
}

/// One row per sample with the result at `decimals` places. Chlorophyll
/// samples get one column per pigment instead of a single result.
pub fn sample_results_csv(
    evaluated: &[EvaluatedSample],
    kind: AssayKind,
    locale: HeaderLocale,
    decimals: usize,
) -> Result<String, AssayLabError> {
    let label = "sample results";
    let mut writer = new_writer();

    if kind == AssayKind::ChlorophyllAB {
        writer
            .write_record(locale.pigment_headers())
            .map_err(csv_err(label))?;
        for e in evaluated {
            let pigments = e.outcome.pigments;
            writer
                .write_record([
                    e.sample.treatment_name.clone(),
                    e.sample.sample_name.clone(),
                    fixed(pigments.map_or(0.0, |p| p.chl_a), decimals),
                    fixed(pigments.map_or(0.0, |p| p.chl_b), decimals),
                    fixed(pigments.map_or(0.0, |p| p.carotenoid), decimals),
                    e.outcome.unit.to_string(),
                ])
                .map_err(csv_err(label))?;
        }
    } else {
        writer
            .write_record(locale.sample_headers())
            .map_err(csv_err(label))?;
        for e in evaluated {
            writer
                .write_record([
                    e.sample.treatment_name.clone(),
                    e.sample.sample_name.clone(),
                    fixed(e.outcome.result, decimals),
                    e.outcome.unit.to_string(),
                ])
                .map_err(csv_err(label))?;
        }
    }

    finish(writer, label)
}

/// HPLC matches with RTs at 2 places and concentrations at 6. Empty cells
/// stand for unmatched peaks and unavailable concentrations. Starts with a
/// UTF-8 byte order mark so spreadsheets pick up the `µ` in the unit.
pub fn hplc_results_csv(
    results: &[HplcSampleResult],
    analysis_type: HplcAnalysisType,
) -> Result<String, AssayLabError> {
    let label = "hplc results";
    let mut writer = new_writer();
    writer
        .write_record([
            "Sample Name",
            "Factor",
            "Treatment",
            "Replicate",
            "Compound",
            "Standard_RT",
            "Matched_RT",
            "Area",
            analysis_type.unit(),
        ])
        .map_err(csv_err(label))?;

    for r in results {
        writer
            .write_record([
                r.sample_name.clone(),
                r.factor.clone(),
                r.treatment.clone(),
                r.replicate.clone(),
                r.compound.clone(),
                fixed(r.standard_rt, 2),
                optional_fixed(r.matched_rt, 2),
                r.area.map(|a| a.to_string()).unwrap_or_default(),
                optional_fixed(r.concentration, 6),
            ])
            .map_err(csv_err(label))?;
    }

    Ok(format!("{}{}", UTF8_BOM, finish(writer, label)?))
}

/// Descriptive statistics table, one row per group.
pub fn statistics_csv(groups: &[GroupSummary], decimals: usize) -> Result<String, AssayLabError> {
    let label = "statistics";
    let mut writer = new_writer();
    writer
        .write_record([
            "Group", "N", "Mean", "SE", "SD", "Variance", "CV (%)", "Min", "Max", "Median",
        ])
        .map_err(csv_err(label))?;

    for g in groups {
        let s = &g.summary;
        writer
            .write_record([
                g.name.clone(),
                s.n.to_string(),
                fixed(s.mean, decimals),
                fixed(s.std_err, decimals),
                fixed(s.std_dev, decimals),
                fixed(s.variance, decimals),
                fixed(s.cv, decimals),
                fixed(s.min, decimals),
                fixed(s.max, decimals),
                fixed(s.median, decimals),
            ])
            .map_err(csv_err(label))?;
    }

    finish(writer, label)
}

/// Upload template for `kind`: the expected header and three example rows.
pub fn sample_template(kind: AssayKind) -> String {
    let wavelengths = kind.required_wavelengths();
    let mut lines = Vec::with_capacity(4);
    let mut header = vec!["treatment_name", "sample_name"];
    header.extend_from_slice(wavelengths);
    lines.push(header.join(","));

    for (treatment, sample, value) in [
        ("Control", "Rep1", "0.123"),
        ("Control", "Rep2", "0.145"),
        ("Treatment", "Rep1", "0.098"),
    ] {
        let mut row = vec![treatment, sample];
        row.extend(wavelengths.iter().map(|_| value));
        lines.push(row.join(","));
    }
    lines.join("\n")
}

/// Figure as shown on a summary card.
pub fn format_stat_card(value: f64) -> String {
    fixed(value, 3)
}

pub fn format_cv(cv: f64) -> String {
    format!("{:.2}%", cv)
}

/// Writes `content` to `path`, replacing any existing file.
pub fn write_report<P: AsRef<Path>>(path: P, content: &str) -> Result<(), AssayLabError> {
    let path_ref = path.as_ref();
    fs::write(path_ref, content)
        .map_err(|e| AssayLabError::FileIO(path_ref.to_string_lossy().to_string(), e))?;
    info!(path = %path_ref.display(), bytes = content.len(), "report written");
    Ok(())
}
