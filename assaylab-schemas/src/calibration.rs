use serde::{Deserialize, Serialize};

/// User-supplied calibration for the spectrophotometric assays.
///
/// Every field is optional: partial entry is normal while a user is still
/// filling in the form, and the formula engine degrades instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationParameters {
    /// Standard-curve slope for total phenol, total flavonoid and H2O2.
    pub std_a: Option<f64>,
    /// Standard-curve intercept for total phenol, total flavonoid and H2O2.
    pub std_b: Option<f64>,
    pub dpph_control: Option<f64>,
    pub anthocyanin: AnthocyaninParams,
    pub cat: EnzymeRateParams,
    pub pod: EnzymeRateParams,
    pub sod: SodParams,
}

/// Overrides for the anthocyanin constants; unset fields fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthocyaninParams {
    /// Extraction volume (mL).
    #[serde(rename = "V")]
    pub volume: Option<f64>,
    /// Dilution factor.
    #[serde(rename = "n")]
    pub dilution: Option<f64>,
    #[serde(rename = "Mw")]
    pub molecular_weight: Option<f64>,
    /// Molar absorptivity.
    pub epsilon: Option<f64>,
    /// Sample mass (g).
    #[serde(rename = "m")]
    pub mass: Option<f64>,
}

/// Kinetic parameters shared by the catalase and peroxidase assays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnzymeRateParams {
    #[serde(rename = "delta_A")]
    pub delta_a: Option<f64>,
    pub total_vol: Option<f64>,
    pub enzyme_vol: Option<f64>,
    pub enzyme_conc: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SodParams {
    pub control_abs: Option<f64>,
    pub total_vol: Option<f64>,
    pub enzyme_vol: Option<f64>,
    pub enzyme_conc: Option<f64>,
}
