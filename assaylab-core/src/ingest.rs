//! Tabular upload of spectrophotometric readings.
//!
//! Accepts comma, semicolon or tab separated text with a header row. The
//! separator is guessed from the header. Quotes never span lines: each
//! cell is split on the separator and then stripped of surrounding quotes.
//! Rows with a different field count than the header are skipped.

use crate::error::AssayLabError;
use crate::numeric::parse_decimal_comma;
use assaylab_schemas::{
    assay::AssayKind,
    sample::{RawReading, SampleDraft},
};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const DELIMITERS: [u8; 3] = [b',', b';', b'\t'];
const TREATMENT_COLUMNS: [&str; 2] = ["treatment_name", "처리구명"];
const SAMPLE_COLUMNS: [&str; 2] = ["sample_name", "샘플명"];
const MISSING_LABEL: &str = "N/A";

/// Picks the separator that splits `header` into the most fields. Ties go
/// to the earlier candidate (comma, then semicolon, then tab).
pub fn detect_delimiter(header: &str) -> u8 {
    let mut best = DELIMITERS[0];
    let mut best_count = 0;
    for delimiter in DELIMITERS {
        let count = header.split(delimiter as char).count();
        if count > best_count {
            best = delimiter;
            best_count = count;
        }
    }
    best
}

/// Trims a cell and drops one pair of surrounding quotes left over from
/// loosely quoted input (`  "Control" `).
fn clean(field: &str) -> &str {
    let field = field.trim();
    let field = field.strip_prefix('"').unwrap_or(field);
    field.strip_suffix('"').unwrap_or(field)
}

fn column_index(headers: &[&str], aliases: &[&str]) -> Vec<usize> {
    aliases
        .iter()
        .filter_map(|alias| headers.iter().position(|h| h == alias))
        .collect()
}

fn first_filled<'r>(record: &'r StringRecord, columns: &[usize]) -> Option<&'r str> {
    columns
        .iter()
        .filter_map(|&i| record.get(i).map(clean))
        .find(|v| !v.is_empty())
}

/// Parses uploaded CSV text into drafts for `kind`. `source` names the
/// input in errors and logs.
///
/// Only the wavelengths `kind` reads are taken; an absent or unreadable
/// column yields 0. Missing names become `"N/A"`.
pub fn parse_samples_csv(
    text: &str,
    kind: AssayKind,
    source: &str,
) -> Result<Vec<SampleDraft>, AssayLabError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let lines: Vec<&str> = text
        .lines()
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .filter(|l| !l.trim().is_empty())
        .collect();
    if lines.len() < 2 {
        return Err(AssayLabError::MissingHeader(source.to_string()));
    }

    let delimiter = detect_delimiter(lines[0]);
    let joined = lines.join("\n");
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(joined.as_bytes());

    let header_record = reader
        .headers()
        .map_err(|e| AssayLabError::CsvError(source.to_string(), e))?
        .clone();
    let headers: Vec<&str> = header_record.iter().map(clean).collect();
    let treatment_columns = column_index(&headers, &TREATMENT_COLUMNS);
    let sample_columns = column_index(&headers, &SAMPLE_COLUMNS);
    let wavelength_columns: Vec<(&str, Option<usize>)> = kind
        .required_wavelengths()
        .iter()
        .map(|wl| (*wl, headers.iter().position(|h| h == wl)))
        .collect();

    let mut drafts = Vec::new();
    let mut skipped = 0usize;
    for (line, record) in reader.records().enumerate() {
        let record = record.map_err(|e| AssayLabError::CsvError(source.to_string(), e))?;
        if record.len() != headers.len() {
            warn!(
                source,
                line = line + 2,
                fields = record.len(),
                expected = headers.len(),
                "skipping row with mismatched field count"
            );
            skipped += 1;
            continue;
        }

        let absorbance_values = wavelength_columns
            .iter()
            .map(|(wl, column)| {
                let value = column
                    .and_then(|i| record.get(i))
                    .map(|v| parse_decimal_comma(clean(v)))
                    .unwrap_or(0.0);
                (wl.to_string(), RawReading::Number(value))
            })
            .collect();

        drafts.push(SampleDraft {
            treatment_name: first_filled(&record, &treatment_columns)
                .unwrap_or(MISSING_LABEL)
                .to_string(),
            sample_name: first_filled(&record, &sample_columns)
                .unwrap_or(MISSING_LABEL)
                .to_string(),
            absorbance_values,
        });
    }

    if drafts.is_empty() {
        return Err(AssayLabError::NoRows(source.to_string()));
    }
    debug!(source, rows = drafts.len(), skipped, assay = %kind, "csv parsed");
    Ok(drafts)
}

pub fn read_samples_csv<P: AsRef<Path>>(
    path: P,
    kind: AssayKind,
) -> Result<Vec<SampleDraft>, AssayLabError> {
    let path_str = path.as_ref().to_string_lossy().to_string();
    let text = fs::read_to_string(path.as_ref())
        .map_err(|e| AssayLabError::FileIO(path_str.clone(), e))?;
    parse_samples_csv(&text, kind, &path_str)
}
