//! In-memory sample collection for one spectrophotometric assay.

use crate::assay::{compute_result, Assay, AssayOutcome};
use crate::error::AssayLabError;
use crate::numeric::{is_numeric_reading, parse_reading};
use assaylab_schemas::{
    assay::AssayKind,
    calibration::CalibrationParameters,
    sample::{Sample, SampleDraft},
};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use uuid::Uuid;

/// A sample paired with the outcome computed from the current calibration.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedSample {
    pub sample: Sample,
    pub outcome: AssayOutcome,
}

/// Checks a manually entered draft: both names are required and every
/// wavelength the assay reads must hold a number.
pub fn validate_draft(kind: AssayKind, draft: &SampleDraft) -> Result<(), AssayLabError> {
    if draft.treatment_name.trim().is_empty() {
        return Err(AssayLabError::InvalidSample(
            "treatment name is required".to_string(),
        ));
    }
    if draft.sample_name.trim().is_empty() {
        return Err(AssayLabError::InvalidSample(
            "sample name is required".to_string(),
        ));
    }
    for wavelength in kind.required_wavelengths() {
        if !is_numeric_reading(draft.absorbance_values.get(*wavelength)) {
            return Err(AssayLabError::InvalidSample(format!(
                "absorbance at {} nm is missing or not a number",
                wavelength
            )));
        }
    }
    Ok(())
}

fn normalize_readings(kind: AssayKind, draft: &SampleDraft) -> BTreeMap<String, f64> {
    let mut readings: BTreeMap<String, f64> = draft
        .absorbance_values
        .iter()
        .map(|(wavelength, raw)| (wavelength.trim().to_string(), parse_reading(Some(raw))))
        .collect();
    for wavelength in kind.required_wavelengths() {
        readings.entry(wavelength.to_string()).or_insert(0.0);
    }
    readings
}

/// Computes the outcome for `sample` without touching it.
pub fn evaluate(sample: &Sample, params: &CalibrationParameters) -> EvaluatedSample {
    EvaluatedSample {
        outcome: compute_result(sample.analysis_type, &sample.absorbance_values, params),
        sample: sample.clone(),
    }
}

/// Samples of a single assay kind, in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBook {
    kind: AssayKind,
    samples: Vec<Sample>,
}

impl SampleBook {
    pub fn new(kind: AssayKind) -> Self {
        Self {
            kind,
            samples: Vec::new(),
        }
    }

    pub fn kind(&self) -> AssayKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn admit(&self, draft: &SampleDraft) -> Sample {
        Sample {
            id: Uuid::new_v4().to_string(),
            treatment_name: draft.treatment_name.trim().to_string(),
            sample_name: draft.sample_name.trim().to_string(),
            analysis_type: self.kind,
            absorbance_values: normalize_readings(self.kind, draft),
        }
    }

    /// Validates and stores one manually entered sample.
    pub fn create(&mut self, draft: &SampleDraft) -> Result<&Sample, AssayLabError> {
        validate_draft(self.kind, draft)?;
        let sample = self.admit(draft);
        debug!(id = %sample.id, assay = %self.kind, "sample created");
        self.samples.push(sample);
        Ok(&self.samples[self.samples.len() - 1])
    }

    /// Stores uploaded rows as-is. Uploads are not validated; unreadable
    /// values have already been coerced to 0.
    pub fn create_many<I>(&mut self, drafts: I) -> usize
    where
        I: IntoIterator<Item = SampleDraft>,
    {
        let before = self.samples.len();
        for draft in drafts {
            let sample = self.admit(&draft);
            self.samples.push(sample);
        }
        let added = self.samples.len() - before;
        debug!(added, assay = %self.kind, "bulk samples created");
        added
    }

    /// Replaces names and readings of an existing sample. The id and assay
    /// kind stay the same.
    pub fn update(&mut self, id: &str, draft: &SampleDraft) -> Result<&Sample, AssayLabError> {
        validate_draft(self.kind, draft)?;
        let readings = normalize_readings(self.kind, draft);
        let sample = self
            .samples
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AssayLabError::SampleNotFound(id.to_string()))?;
        sample.treatment_name = draft.treatment_name.trim().to_string();
        sample.sample_name = draft.sample_name.trim().to_string();
        sample.absorbance_values = readings;
        Ok(&*sample)
    }

    pub fn remove(&mut self, id: &str) -> Result<Sample, AssayLabError> {
        let index = self
            .samples
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| AssayLabError::SampleNotFound(id.to_string()))?;
        Ok(self.samples.remove(index))
    }

    /// Removes every sample whose id is listed; unknown ids are ignored.
    /// Returns how many samples were removed.
    pub fn remove_many(&mut self, ids: &[&str]) -> usize {
        let before = self.samples.len();
        self.samples.retain(|s| !ids.contains(&s.id.as_str()));
        before - self.samples.len()
    }

    pub fn get(&self, id: &str) -> Option<&Sample> {
        self.samples.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// The listed samples, in book order.
    pub fn selected(&self, ids: &[&str]) -> Vec<&Sample> {
        self.samples
            .iter()
            .filter(|s| ids.contains(&s.id.as_str()))
            .collect()
    }

    /// Evaluates every sample against `params`.
    pub fn evaluate_all(&self, params: &CalibrationParameters) -> Vec<EvaluatedSample> {
        if !self.samples.is_empty() && Assay::resolve(self.kind, params).is_none() {
            warn!(
                assay = %self.kind,
                samples = self.samples.len(),
                "calibration incomplete, results will be reported as N/A"
            );
        }
        self.samples.iter().map(|s| evaluate(s, params)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assaylab_schemas::sample::RawReading;

    fn draft(treatment: &str, sample: &str, readings: &[(&str, RawReading)]) -> SampleDraft {
        SampleDraft {
            treatment_name: treatment.to_string(),
            sample_name: sample.to_string(),
            absorbance_values: readings
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn textual_readings_are_normalized() {
        let mut book = SampleBook::new(AssayKind::TotalPhenol);
        let sample = book
            .create(&draft("Control", "Rep1", &[("765", "1.2e-1".into())]))
            .unwrap();
        assert!((sample.reading("765") - 0.12).abs() < 1e-12);
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut book = SampleBook::new(AssayKind::Sod);
        let err = book
            .create(&draft("  ", "Rep1", &[("560", 0.4.into())]))
            .unwrap_err();
        assert!(matches!(err, AssayLabError::InvalidSample(_)));
        assert!(book.is_empty());
    }
}
