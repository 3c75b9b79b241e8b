use anyhow::{Context, Result};
use assaylab_core::export::{HeaderLocale, DEFAULT_DECIMALS};
use assaylab_schemas::{
    calibration::CalibrationParameters,
    hplc::{HplcAnalysisType, HplcCalibration, RtStandard},
};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Everything a run needs besides its input data. Every block may be
/// omitted from the YAML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub calibration: CalibrationParameters,
    pub hplc: HplcSettings,
    pub export: ExportSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HplcSettings {
    pub analysis_type: HplcAnalysisType,
    /// Matched in this order; results follow it.
    pub standards: Vec<RtStandard>,
    pub calibration: HplcCalibration,
}

impl Default for HplcSettings {
    fn default() -> Self {
        Self {
            analysis_type: HplcAnalysisType::Phenol,
            standards: Vec::new(),
            calibration: HplcCalibration::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub locale: HeaderLocale,
    pub decimals: usize,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            locale: HeaderLocale::English,
            decimals: DEFAULT_DECIMALS,
            chart_width: 1024,
            chart_height: 768,
        }
    }
}

impl LabConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse YAML from {:?}", path))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Loads `path` when given, otherwise the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = LabConfig::from_yaml("").unwrap();
        assert_eq!(config, LabConfig::default());
        assert_eq!(config.export.decimals, 4);
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let yaml = r#"
calibration:
  std_a: 0.5
  std_b: 0.01
hplc:
  analysis_type: glucosinolate
  standards:
    - compound: Sinigrin
      rt: 5.3
    - compound: Progoitrin
      rt: 4.1
  calibration:
    sample_weight: 0.1
    standard_area: 1000
    molecular_weight: 397.5
export:
  locale: ko
"#;
        let config = LabConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.calibration.std_a, Some(0.5));
        assert_eq!(config.hplc.analysis_type, HplcAnalysisType::Glucosinolate);
        assert_eq!(config.hplc.standards[0].compound, "Sinigrin");
        assert_eq!(config.hplc.standards[1].rt, 4.1);
        assert_eq!(config.export.locale, HeaderLocale::Korean);
        assert_eq!(config.export.chart_width, 1024);
    }

    #[test]
    fn loads_from_file_or_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("lab.yaml");
        fs::write(&path, "calibration:\n  dpph_control: 0.9\n").unwrap();

        let config = LabConfig::load_or_default(Some(path.as_path())).unwrap();
        assert_eq!(config.calibration.dpph_control, Some(0.9));
        assert_eq!(LabConfig::load_or_default(None).unwrap(), LabConfig::default());
        assert!(LabConfig::load(dir.path().join("missing.yaml")).is_err());
    }
}
