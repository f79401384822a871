//! Coverage taxonomy for extracted insurance quotes.
//!
//! Every coverage line an extraction can carry belongs to exactly one of the
//! 21 [`CoverageType`] categories. Per-category display metadata lives in a
//! single table indexed by the enum discriminant, so the table order *is* the
//! canonical row order used by comparisons.
//!
//! # Schema generations
//!
//! - v1: the 8 base lines plus `other`
//! - v3: 12 additional specialty lines (EPLI through fiduciary)
//!
//! The table is checked at compile time: each entry must sit at its own
//! discriminant and `Other` must be the final variant. Adding a category means
//! adding a variant and a table row; forgetting either fails the build.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Number of coverage categories in the taxonomy.
pub const COVERAGE_TYPE_COUNT: usize = 21;

/// A coverage category. Declaration order is canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageType {
    GeneralLiability,
    Property,
    AutoLiability,
    AutoPhysicalDamage,
    Umbrella,
    WorkersComp,
    ProfessionalLiability,
    Cyber,
    Epli,
    #[serde(rename = "d_and_o")]
    DAndO,
    Crime,
    Pollution,
    InlandMarine,
    BuildersRisk,
    BusinessInterruption,
    ProductLiability,
    GarageLiability,
    LiquorLiability,
    MedicalMalpractice,
    Fiduciary,
    Other,
}

/// How much a coverage line matters when it differs between quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageImportance {
    /// Core protection most insureds need (GL, property, WC, E&O, cyber).
    Critical,
    Standard,
    /// Rare or situational lines.
    Peripheral,
}

impl CoverageImportance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Standard => "standard",
            Self::Peripheral => "peripheral",
        }
    }
}

/// Display and classification metadata for one coverage category.
#[derive(Debug, Clone, Copy)]
pub struct CoverageMeta {
    pub kind: CoverageType,
    /// Wire key, e.g. `general_liability`.
    pub key: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub importance: CoverageImportance,
    /// First extraction schema version that could emit this category.
    pub introduced_in: u32,
}

// ── Metadata table ──

const fn meta(
    kind: CoverageType,
    key: &'static str,
    label: &'static str,
    icon: &'static str,
    importance: CoverageImportance,
    introduced_in: u32,
) -> CoverageMeta {
    CoverageMeta {
        kind,
        key,
        label,
        icon,
        importance,
        introduced_in,
    }
}

use CoverageImportance::{Critical, Peripheral, Standard};

const COVERAGE_TABLE: [CoverageMeta; COVERAGE_TYPE_COUNT] = [
    meta(CoverageType::GeneralLiability, "general_liability", "General Liability", "shield", Critical, 1),
    meta(CoverageType::Property, "property", "Property", "building", Critical, 1),
    meta(CoverageType::AutoLiability, "auto_liability", "Auto Liability", "car", Standard, 1),
    meta(CoverageType::AutoPhysicalDamage, "auto_physical_damage", "Auto Physical Damage", "car-crash", Standard, 1),
    meta(CoverageType::Umbrella, "umbrella", "Umbrella", "umbrella", Standard, 1),
    meta(CoverageType::WorkersComp, "workers_comp", "Workers' Compensation", "hard-hat", Critical, 1),
    meta(CoverageType::ProfessionalLiability, "professional_liability", "Professional Liability", "briefcase", Critical, 1),
    meta(CoverageType::Cyber, "cyber", "Cyber Liability", "lock", Critical, 1),
    meta(CoverageType::Epli, "epli", "Employment Practices Liability", "users", Standard, 3),
    meta(CoverageType::DAndO, "d_and_o", "Directors & Officers", "landmark", Standard, 3),
    meta(CoverageType::Crime, "crime", "Crime", "alert-triangle", Standard, 3),
    meta(CoverageType::Pollution, "pollution", "Pollution Liability", "leaf", Peripheral, 3),
    meta(CoverageType::InlandMarine, "inland_marine", "Inland Marine", "truck", Peripheral, 3),
    meta(CoverageType::BuildersRisk, "builders_risk", "Builders Risk", "hammer", Peripheral, 3),
    meta(CoverageType::BusinessInterruption, "business_interruption", "Business Interruption", "pause-circle", Standard, 3),
    meta(CoverageType::ProductLiability, "product_liability", "Product Liability", "package", Standard, 3),
    meta(CoverageType::GarageLiability, "garage_liability", "Garage Liability", "warehouse", Peripheral, 3),
    meta(CoverageType::LiquorLiability, "liquor_liability", "Liquor Liability", "wine", Peripheral, 3),
    meta(CoverageType::MedicalMalpractice, "medical_malpractice", "Medical Malpractice", "stethoscope", Peripheral, 3),
    meta(CoverageType::Fiduciary, "fiduciary", "Fiduciary Liability", "scale", Peripheral, 3),
    meta(CoverageType::Other, "other", "Other", "file-question", Peripheral, 1),
];

const _: () = {
    assert!(CoverageType::Other as usize == COVERAGE_TYPE_COUNT - 1);
    let mut i = 0;
    while i < COVERAGE_TYPE_COUNT {
        assert!(COVERAGE_TABLE[i].kind as usize == i);
        i += 1;
    }
};

impl CoverageType {
    /// All categories in canonical order.
    pub const ALL: [CoverageType; COVERAGE_TYPE_COUNT] = {
        let mut out = [CoverageType::Other; COVERAGE_TYPE_COUNT];
        let mut i = 0;
        while i < COVERAGE_TYPE_COUNT {
            out[i] = COVERAGE_TABLE[i].kind;
            i += 1;
        }
        out
    };

    pub fn meta(self) -> &'static CoverageMeta {
        &COVERAGE_TABLE[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        self.meta().key
    }

    pub fn label(self) -> &'static str {
        self.meta().label
    }

    pub fn icon(self) -> &'static str {
        self.meta().icon
    }

    pub fn importance(self) -> CoverageImportance {
        self.meta().importance
    }

    pub fn is_critical(self) -> bool {
        self.importance() == CoverageImportance::Critical
    }

    pub fn introduced_in(self) -> u32 {
        self.meta().introduced_in
    }
}

impl fmt::Display for CoverageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a coverage key is not part of the taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized coverage type: {0:?}")]
pub struct UnknownCoverageType(pub String);

impl FromStr for CoverageType {
    type Err = UnknownCoverageType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        COVERAGE_TABLE
            .iter()
            .find(|m| m.key == s)
            .map(|m| m.kind)
            .ok_or_else(|| UnknownCoverageType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn table_has_one_entry_per_variant() {
        assert_eq!(CoverageType::ALL.len(), 21);
        let unique: HashSet<_> = CoverageType::ALL.iter().collect();
        assert_eq!(unique.len(), COVERAGE_TYPE_COUNT);
    }

    #[test]
    fn canonical_order_matches_declaration() {
        for (i, kind) in CoverageType::ALL.iter().enumerate() {
            assert_eq!(*kind as usize, i);
            assert_eq!(kind.meta().kind, *kind);
        }
        assert_eq!(CoverageType::ALL[0], CoverageType::GeneralLiability);
        assert_eq!(CoverageType::ALL[20], CoverageType::Other);
    }

    #[test]
    fn keys_match_serde_names() {
        for kind in CoverageType::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
            let parsed: CoverageType = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn from_str_roundtrip_and_rejects_unknown() {
        assert_eq!("d_and_o".parse::<CoverageType>().unwrap(), CoverageType::DAndO);
        assert_eq!("epli".parse::<CoverageType>().unwrap(), CoverageType::Epli);
        let err = "flood".parse::<CoverageType>().unwrap_err();
        assert_eq!(err, UnknownCoverageType("flood".into()));
    }

    #[test]
    fn v1_base_has_nine_types() {
        let v1 = CoverageType::ALL
            .iter()
            .filter(|k| k.introduced_in() == 1)
            .count();
        assert_eq!(v1, 9);
        assert_eq!(COVERAGE_TYPE_COUNT - v1, 12);
    }

    #[test]
    fn critical_set() {
        let critical: Vec<_> = CoverageType::ALL
            .iter()
            .copied()
            .filter(|k| k.is_critical())
            .collect();
        assert_eq!(
            critical,
            vec![
                CoverageType::GeneralLiability,
                CoverageType::Property,
                CoverageType::WorkersComp,
                CoverageType::ProfessionalLiability,
                CoverageType::Cyber,
            ]
        );
    }

    #[test]
    fn labels_are_unique() {
        let labels: HashSet<_> = CoverageType::ALL.iter().map(|k| k.label()).collect();
        assert_eq!(labels.len(), COVERAGE_TYPE_COUNT);
    }
}
