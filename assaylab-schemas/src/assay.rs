use serde::{Deserialize, Serialize};

/// The spectrophotometric protocols supported by the formula engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssayKind {
    #[serde(rename = "chlorophyll_a_b")]
    ChlorophyllAB,
    Carotenoid,
    TotalPhenol,
    TotalFlavonoid,
    Glucosinolate,
    DpphScavenging,
    Anthocyanin,
    Cat,
    Pod,
    Sod,
    H2o2,
}

impl AssayKind {
    pub const ALL: [AssayKind; 11] = [
        AssayKind::ChlorophyllAB,
        AssayKind::Carotenoid,
        AssayKind::TotalPhenol,
        AssayKind::TotalFlavonoid,
        AssayKind::Glucosinolate,
        AssayKind::DpphScavenging,
        AssayKind::Anthocyanin,
        AssayKind::Cat,
        AssayKind::Pod,
        AssayKind::Sod,
        AssayKind::H2o2,
    ];

    /// The key used in configuration files and upload forms.
    pub fn key(&self) -> &'static str {
        match self {
            AssayKind::ChlorophyllAB => "chlorophyll_a_b",
            AssayKind::Carotenoid => "carotenoid",
            AssayKind::TotalPhenol => "total_phenol",
            AssayKind::TotalFlavonoid => "total_flavonoid",
            AssayKind::Glucosinolate => "glucosinolate",
            AssayKind::DpphScavenging => "dpph_scavenging",
            AssayKind::Anthocyanin => "anthocyanin",
            AssayKind::Cat => "cat",
            AssayKind::Pod => "pod",
            AssayKind::Sod => "sod",
            AssayKind::H2o2 => "h2o2",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.key() == key.trim())
    }

    pub fn title(&self) -> &'static str {
        match self {
            AssayKind::ChlorophyllAB => "Total Chlorophyll & Total Carotenoid",
            AssayKind::Carotenoid => "Total Carotenoid",
            AssayKind::TotalPhenol => "Total Phenolic Content",
            AssayKind::TotalFlavonoid => "Total Flavonoid",
            AssayKind::Glucosinolate => "Total Glucosinolate",
            AssayKind::DpphScavenging => "DPPH Radical Scavenging",
            AssayKind::Anthocyanin => "Total Anthocyanin",
            AssayKind::Cat => "Catalase (CAT) Activity",
            AssayKind::Pod => "Peroxidase (POD) Activity",
            AssayKind::Sod => "Superoxide Dismutase (SOD) Activity",
            AssayKind::H2o2 => "Hydrogen Peroxide (H2O2) Content",
        }
    }

    /// Wavelength labels an absorbance record must carry for this assay.
    pub fn required_wavelengths(&self) -> &'static [&'static str] {
        match self {
            AssayKind::ChlorophyllAB => &["665.2", "652.4", "470"],
            AssayKind::Carotenoid => &["470", "665.2", "652.4"],
            AssayKind::TotalPhenol => &["765"],
            AssayKind::TotalFlavonoid => &["415"],
            AssayKind::Glucosinolate => &["425"],
            AssayKind::DpphScavenging => &["517"],
            AssayKind::Anthocyanin => &["530", "600"],
            AssayKind::Cat => &["240"],
            AssayKind::Pod => &["470"],
            AssayKind::Sod => &["560"],
            AssayKind::H2o2 => &["390"],
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            AssayKind::ChlorophyllAB | AssayKind::Carotenoid => "μg/ml",
            AssayKind::TotalPhenol => "mg GAE/g",
            AssayKind::TotalFlavonoid => "mg QE/g",
            AssayKind::Glucosinolate | AssayKind::H2o2 => "μmol/g",
            AssayKind::DpphScavenging => "% inhibition",
            AssayKind::Anthocyanin => "mg/g",
            AssayKind::Cat | AssayKind::Pod => "μmol/min/mg",
            AssayKind::Sod => "unit/mg",
        }
    }
}

impl std::fmt::Display for AssayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_from_key() {
        for kind in AssayKind::ALL {
            assert_eq!(AssayKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(AssayKind::from_key("lipid_peroxidation"), None);
    }

    #[test]
    fn serde_uses_snake_case_keys() {
        let json = serde_json::to_string(&AssayKind::ChlorophyllAB).unwrap();
        assert_eq!(json, "\"chlorophyll_a_b\"");
        let kind: AssayKind = serde_json::from_str("\"dpph_scavenging\"").unwrap();
        assert_eq!(kind, AssayKind::DpphScavenging);
    }
}
