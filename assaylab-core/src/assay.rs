//! Spectrophotometric formula engine.
//!
//! `Assay` is the closed set of protocols, each variant carrying exactly the
//! calibration it needs. Resolving an `AssayKind` against the user's
//! `CalibrationParameters` either yields a fully parameterized `Assay` or
//! `None` when something required is still missing; in the latter case the
//! caller reports the degraded `N/A` outcome.

use crate::error::AssayLabError;
use assaylab_schemas::{
    assay::AssayKind,
    calibration::{AnthocyaninParams, CalibrationParameters, EnzymeRateParams, SodParams},
};
use std::collections::BTreeMap;
use tracing::debug;

pub const UNAVAILABLE_UNIT: &str = "N/A";

/// Millimolar extinction coefficient of H2O2 at 240 nm.
pub const CATALASE_EXTINCTION: f64 = 39.4;
/// Extinction coefficient of tetraguaiacol at 470 nm.
pub const PEROXIDASE_EXTINCTION: f64 = 26.6;
/// Inhibition percentage defining one SOD unit.
pub const SOD_UNIT_INHIBITION: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PigmentBreakdown {
    pub chl_a: f64,
    pub chl_b: f64,
    pub carotenoid: f64,
}

impl PigmentBreakdown {
    pub fn total_chlorophyll(&self) -> f64 {
        self.chl_a + self.chl_b
    }
}

/// Derived values for one sample.
#[derive(Debug, Clone, PartialEq)]
pub struct AssayOutcome {
    pub result: f64,
    pub unit: &'static str,
    /// Only set by the chlorophyll assay.
    pub pigments: Option<PigmentBreakdown>,
}

impl AssayOutcome {
    pub fn unavailable() -> Self {
        Self {
            result: 0.0,
            unit: UNAVAILABLE_UNIT,
            pigments: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.unit != UNAVAILABLE_UNIT
    }

    fn single(result: f64, unit: &'static str) -> Self {
        Self {
            result,
            unit,
            pigments: None,
        }
    }
}

/// Linear calibration `A = slope * c + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardCurve {
    pub slope: f64,
    pub intercept: f64,
}

impl StandardCurve {
    pub fn concentration(&self, absorbance: f64) -> f64 {
        (absorbance - self.intercept) / self.slope
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnthocyaninConstants {
    pub volume: f64,
    pub dilution: f64,
    pub molecular_weight: f64,
    pub epsilon: f64,
    pub mass: f64,
}

impl AnthocyaninConstants {
    /// Cyanidin-3-glucoside in 2 mL extract from 20 mg tissue.
    pub const DEFAULT: AnthocyaninConstants = AnthocyaninConstants {
        volume: 2.0,
        dilution: 1.0,
        molecular_weight: 449.2,
        epsilon: 26900.0,
        mass: 0.02,
    };

    /// Applies the user's overrides on top of `DEFAULT`. This is the only
    /// place anthocyanin defaults are decided.
    pub fn merged(overrides: &AnthocyaninParams) -> Self {
        let pick = |value: Option<f64>, fallback: f64| {
            value.filter(|v| v.is_finite()).unwrap_or(fallback)
        };
        let d = Self::DEFAULT;
        Self {
            volume: pick(overrides.volume, d.volume),
            dilution: pick(overrides.dilution, d.dilution),
            molecular_weight: pick(overrides.molecular_weight, d.molecular_weight),
            epsilon: pick(overrides.epsilon, d.epsilon),
            mass: pick(overrides.mass, d.mass),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnzymeRate {
    pub delta_a: f64,
    pub total_vol: f64,
    pub enzyme_vol: f64,
    pub enzyme_conc: f64,
}

impl EnzymeRate {
    fn from_params(params: &EnzymeRateParams) -> Option<Self> {
        Some(Self {
            delta_a: nonzero(params.delta_a)?,
            total_vol: nonzero(params.total_vol)?,
            enzyme_vol: nonzero(params.enzyme_vol)?,
            enzyme_conc: nonzero(params.enzyme_conc)?,
        })
    }

    /// Specific activity in μmol/min/mg given the extinction coefficient.
    pub fn specific_activity(&self, extinction: f64) -> f64 {
        let per_ml = (self.delta_a * self.total_vol * 1000.0) / (extinction * self.enzyme_vol);
        per_ml / self.enzyme_conc
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SodActivity {
    pub control_abs: f64,
    pub total_vol: f64,
    pub enzyme_vol: f64,
    pub enzyme_conc: f64,
}

impl SodActivity {
    fn from_params(params: &SodParams) -> Option<Self> {
        Some(Self {
            control_abs: nonzero(params.control_abs)?,
            total_vol: nonzero(params.total_vol)?,
            enzyme_vol: nonzero(params.enzyme_vol)?,
            enzyme_conc: nonzero(params.enzyme_conc)?,
        })
    }

    pub fn inhibition_percent(&self, sample_abs: f64) -> f64 {
        ((self.control_abs - sample_abs) / self.control_abs) * 100.0
    }

    pub fn specific_activity(&self, sample_abs: f64) -> f64 {
        let per_ml = (self.inhibition_percent(sample_abs) * self.total_vol)
            / (SOD_UNIT_INHIBITION * self.enzyme_vol);
        per_ml / self.enzyme_conc
    }
}

/// A fully parameterized protocol, ready to evaluate readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Assay {
    Chlorophyll,
    Carotenoid,
    TotalPhenol(StandardCurve),
    TotalFlavonoid(StandardCurve),
    H2o2(StandardCurve),
    Glucosinolate,
    Dpph { control: f64 },
    Anthocyanin(AnthocyaninConstants),
    Catalase(EnzymeRate),
    Peroxidase(EnzymeRate),
    Sod(SodActivity),
}

impl Assay {
    /// Binds `kind` to its calibration. `None` means a required parameter
    /// is missing (absent, non-finite, or zero where it is a divisor).
    pub fn resolve(kind: AssayKind, params: &CalibrationParameters) -> Option<Self> {
        let curve = || {
            Some(StandardCurve {
                slope: nonzero(params.std_a)?,
                intercept: finite(params.std_b)?,
            })
        };

        match kind {
            AssayKind::ChlorophyllAB => Some(Assay::Chlorophyll),
            AssayKind::Carotenoid => Some(Assay::Carotenoid),
            AssayKind::TotalPhenol => curve().map(Assay::TotalPhenol),
            AssayKind::TotalFlavonoid => curve().map(Assay::TotalFlavonoid),
            AssayKind::H2o2 => curve().map(Assay::H2o2),
            AssayKind::Glucosinolate => Some(Assay::Glucosinolate),
            AssayKind::DpphScavenging => {
                nonzero(params.dpph_control).map(|control| Assay::Dpph { control })
            }
            AssayKind::Anthocyanin => {
                Some(Assay::Anthocyanin(AnthocyaninConstants::merged(&params.anthocyanin)))
            }
            AssayKind::Cat => EnzymeRate::from_params(&params.cat).map(Assay::Catalase),
            AssayKind::Pod => EnzymeRate::from_params(&params.pod).map(Assay::Peroxidase),
            AssayKind::Sod => SodActivity::from_params(&params.sod).map(Assay::Sod),
        }
    }

    pub fn kind(&self) -> AssayKind {
        match self {
            Assay::Chlorophyll => AssayKind::ChlorophyllAB,
            Assay::Carotenoid => AssayKind::Carotenoid,
            Assay::TotalPhenol(_) => AssayKind::TotalPhenol,
            Assay::TotalFlavonoid(_) => AssayKind::TotalFlavonoid,
            Assay::H2o2(_) => AssayKind::H2o2,
            Assay::Glucosinolate => AssayKind::Glucosinolate,
            Assay::Dpph { .. } => AssayKind::DpphScavenging,
            Assay::Anthocyanin(_) => AssayKind::Anthocyanin,
            Assay::Catalase(_) => AssayKind::Cat,
            Assay::Peroxidase(_) => AssayKind::Pod,
            Assay::Sod(_) => AssayKind::Sod,
        }
    }

    pub fn evaluate(&self, readings: &BTreeMap<String, f64>) -> AssayOutcome {
        let a = |label: &str| readings.get(label).copied().unwrap_or(0.0);
        let unit = self.kind().unit();

        match self {
            Assay::Chlorophyll => {
                let pigments = pigments(a("665.2"), a("652.4"), a("470"));
                AssayOutcome {
                    result: pigments.chl_a,
                    unit,
                    pigments: Some(pigments),
                }
            }
            Assay::Carotenoid => {
                AssayOutcome::single(pigments(a("665.2"), a("652.4"), a("470")).carotenoid, unit)
            }
            Assay::TotalPhenol(curve) => AssayOutcome::single(curve.concentration(a("765")), unit),
            Assay::TotalFlavonoid(curve) => {
                AssayOutcome::single(curve.concentration(a("415")), unit)
            }
            Assay::H2o2(curve) => AssayOutcome::single(curve.concentration(a("390")), unit),
            Assay::Glucosinolate => AssayOutcome::single(1.40 + 118.86 * a("425"), unit),
            Assay::Dpph { control } => {
                AssayOutcome::single(((control - a("517")) / control) * 100.0, unit)
            }
            Assay::Anthocyanin(c) => {
                let result = (a("530") - a("600")) * c.volume * c.dilution * c.molecular_weight
                    / (c.epsilon * c.mass);
                AssayOutcome::single(result, unit)
            }
            Assay::Catalase(rate) => {
                AssayOutcome::single(rate.specific_activity(CATALASE_EXTINCTION), unit)
            }
            Assay::Peroxidase(rate) => {
                AssayOutcome::single(rate.specific_activity(PEROXIDASE_EXTINCTION), unit)
            }
            Assay::Sod(sod) => AssayOutcome::single(sod.specific_activity(a("560")), unit),
        }
    }
}

/// Lichtenthaler equations for 90% methanol extracts.
pub fn pigments(a665_2: f64, a652_4: f64, a470: f64) -> PigmentBreakdown {
    let chl_a = 16.82 * a665_2 - 9.28 * a652_4;
    let chl_b = 36.92 * a652_4 - 16.54 * a665_2;
    let carotenoid = (1000.0 * a470 - 1.91 * chl_a - 95.15 * chl_b) / 225.0;
    PigmentBreakdown {
        chl_a,
        chl_b,
        carotenoid,
    }
}

/// Computes the derived quantity for one absorbance record.
///
/// Missing calibration yields `AssayOutcome::unavailable()`, as does a
/// computation that ends up non-finite (e.g. a zero anthocyanin mass
/// override).
pub fn compute_result(
    kind: AssayKind,
    absorbance_values: &BTreeMap<String, f64>,
    params: &CalibrationParameters,
) -> AssayOutcome {
    let Some(assay) = Assay::resolve(kind, params) else {
        debug!(assay = %kind, "calibration incomplete, reporting N/A");
        return AssayOutcome::unavailable();
    };

    let outcome = assay.evaluate(absorbance_values);
    let pigments_finite = outcome.pigments.map_or(true, |p| {
        p.chl_a.is_finite() && p.chl_b.is_finite() && p.carotenoid.is_finite()
    });
    if !outcome.result.is_finite() || !pigments_finite {
        debug!(assay = %kind, "non-finite result, reporting N/A");
        return AssayOutcome::unavailable();
    }
    outcome
}

/// Parses an assay key, failing loudly on names outside the catalogue.
pub fn parse_kind(key: &str) -> Result<AssayKind, AssayLabError> {
    AssayKind::from_key(key).ok_or_else(|| AssayLabError::UnknownAssay(key.to_string()))
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn nonzero(value: Option<f64>) -> Option<f64> {
    finite(value).filter(|v| *v != 0.0)
}
