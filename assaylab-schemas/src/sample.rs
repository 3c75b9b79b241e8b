use crate::assay::AssayKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A reading as it arrives from manual entry or an upload: either already
/// numeric or still textual (scientific notation, comma decimals, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawReading {
    Number(f64),
    Text(String),
}

impl From<f64> for RawReading {
    fn from(value: f64) -> Self {
        RawReading::Number(value)
    }
}

impl From<&str> for RawReading {
    fn from(value: &str) -> Self {
        RawReading::Text(value.to_string())
    }
}

/// An input record before it has been admitted into a sample collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleDraft {
    pub treatment_name: String,
    pub sample_name: String,
    #[serde(default)]
    pub absorbance_values: BTreeMap<String, RawReading>,
}

/// A stored spectrophotometric sample. Readings are already normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: String,
    pub treatment_name: String,
    pub sample_name: String,
    pub analysis_type: AssayKind,
    pub absorbance_values: BTreeMap<String, f64>,
}

impl Sample {
    /// Reading at `wavelength`, or 0 when the record has none.
    pub fn reading(&self, wavelength: &str) -> f64 {
        self.absorbance_values.get(wavelength).copied().unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_reading_accepts_numbers_and_strings() {
        let values: BTreeMap<String, RawReading> =
            serde_json::from_str(r#"{"665.2": 0.5, "652.4": "3,1e-1"}"#).unwrap();
        assert_eq!(values["665.2"], RawReading::Number(0.5));
        assert_eq!(values["652.4"], RawReading::Text("3,1e-1".to_string()));
    }
}
