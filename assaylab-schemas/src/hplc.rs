use crate::sample::RawReading;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HplcAnalysisType {
    Phenol,
    Glucosinolate,
    Acacetin,
    RosmarinicAcid,
    Tilianin,
}

impl HplcAnalysisType {
    pub const ALL: [HplcAnalysisType; 5] = [
        HplcAnalysisType::Phenol,
        HplcAnalysisType::Glucosinolate,
        HplcAnalysisType::Acacetin,
        HplcAnalysisType::RosmarinicAcid,
        HplcAnalysisType::Tilianin,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            HplcAnalysisType::Phenol => "phenol",
            HplcAnalysisType::Glucosinolate => "glucosinolate",
            HplcAnalysisType::Acacetin => "acacetin",
            HplcAnalysisType::RosmarinicAcid => "rosmarinic_acid",
            HplcAnalysisType::Tilianin => "tilianin",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.key() == key.trim())
    }

    /// Phenol uses per-compound standard curves; everything else goes
    /// through the generic standard-area formula.
    pub fn uses_compound_curves(&self) -> bool {
        matches!(self, HplcAnalysisType::Phenol)
    }

    pub fn unit(&self) -> &'static str {
        if self.uses_compound_curves() {
            "mg/g"
        } else {
            "µmol/g dry wt."
        }
    }

    pub fn default_compounds(&self) -> &'static [&'static str] {
        match self {
            HplcAnalysisType::Phenol => &[
                "Arbutin",
                "Gallic acid",
                "Catechin hydrate",
                "4-Hydroxybenzoic acid",
                "Chlorogenic acid",
                "Caffeic acid",
                "(-)-Epicatechin",
                "4-Hydroxy-3-benzoic acid",
                "p-Coumaric acid",
                "trans-Ferulic acid",
                "Benzoic acid",
                "Rutin",
                "trans-Cinnamic acid",
                "Quercetin",
                "Kaempferol",
            ],
            HplcAnalysisType::Glucosinolate => &[
                "Progoitrin",
                "Sinigrin",
                "Glucoalyssin",
                "Gluconapoleiferin",
                "Gluconapin",
                "4-Hydroxyglucobrassicin",
                "Glucobrassicanapin",
                "Glucoerucin",
                "Glucobrassicin",
                "4-Methoxyglucobrassicin",
                "Gluconasturtiin",
                "Neoglucobrassicin",
            ],
            HplcAnalysisType::Acacetin => &["Acacetin", "Acacetin-7-O-glucoside"],
            HplcAnalysisType::RosmarinicAcid => {
                &["Rosmarinic acid", "Caffeic acid", "Salvianolic acid B"]
            }
            HplcAnalysisType::Tilianin => &["Tilianin", "Acacetin-7-O-rutinoside"],
        }
    }
}

impl std::fmt::Display for HplcAnalysisType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// A peak exactly as the document-extraction service reports it. The
/// service is inconsistent about field names, so every known alias is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPeak {
    #[serde(rename = "Ret. Time", default, skip_serializing_if = "Option::is_none")]
    pub ret_time: Option<RawReading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention_time: Option<RawReading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rt: Option<RawReading>,
    #[serde(rename = "Area", default, skip_serializing_if = "Option::is_none")]
    pub area_title: Option<RawReading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<RawReading>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak_area: Option<RawReading>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HplcPeak {
    pub retention_time: f64,
    pub area: f64,
}

/// Expected retention time of one compound. Standards are kept as an
/// ordered list so results come out in the order the user entered them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RtStandard {
    pub compound: String,
    pub rt: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompoundCurve {
    pub a: Option<f64>,
    pub b: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HplcCalibration {
    /// Sample mass in grams, shared by both formula families.
    pub sample_weight: Option<f64>,
    /// Per-compound slope/intercept, used by phenol analyses.
    pub curves: BTreeMap<String, CompoundCurve>,
    pub standard_area: Option<f64>,
    pub molecular_weight: Option<f64>,
    pub conversion_factor: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HplcMatchResult {
    pub compound: String,
    pub standard_rt: f64,
    pub matched_rt: Option<f64>,
    pub area: Option<f64>,
}

/// Sample metadata carried in a chromatogram's file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HplcFileInfo {
    pub factor: String,
    pub treatment: String,
    pub replicate: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HplcSampleResult {
    pub sample_name: String,
    pub factor: String,
    pub treatment: String,
    pub replicate: String,
    pub compound: String,
    pub standard_rt: f64,
    pub matched_rt: Option<f64>,
    pub area: Option<f64>,
    pub concentration: Option<f64>,
}
