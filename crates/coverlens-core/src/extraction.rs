//! Canonical quote extraction record shared by every Coverlens component.
//!
//! One shape covers every extraction schema generation. Fields added by later
//! generations are optional (or empty lists) so a v1 record and a v3 record
//! flow through the comparison code identically. `None` always means "not
//! found in the document", never "found as zero".

use serde::{Deserialize, Serialize};

use crate::coverage::CoverageType;

/// Schema generation produced by the current extraction pipeline.
pub const CURRENT_EXTRACTION_VERSION: u32 = 3;

/// Version assumed for records that carry no `extractionVersion` field.
pub const LEGACY_EXTRACTION_VERSION: u32 = 1;

const _: () = assert!(CURRENT_EXTRACTION_VERSION >= 3);

/// A structured record produced by reading one insurance quote document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteExtraction {
    pub carrier_name: Option<String>,
    pub policy_number: Option<String>,
    pub named_insured: Option<String>,
    pub effective_date: Option<String>,
    pub expiration_date: Option<String>,
    pub annual_premium: Option<f64>,
    pub coverages: Vec<CoverageItem>,
    pub exclusions: Vec<String>,
    pub deductibles: Vec<DeductibleItem>,
    /// v2+.
    pub policy_metadata: Option<PolicyMetadata>,
    /// v2+.
    pub endorsements: Vec<Endorsement>,
    /// v3+.
    pub carrier_info: Option<CarrierInfo>,
    /// v3+.
    pub premium_breakdown: Option<PremiumBreakdown>,
    pub extraction_version: u32,
}

impl Default for QuoteExtraction {
    fn default() -> Self {
        Self {
            carrier_name: None,
            policy_number: None,
            named_insured: None,
            effective_date: None,
            expiration_date: None,
            annual_premium: None,
            coverages: Vec::new(),
            exclusions: Vec::new(),
            deductibles: Vec::new(),
            policy_metadata: None,
            endorsements: Vec::new(),
            carrier_info: None,
            premium_breakdown: None,
            extraction_version: CURRENT_EXTRACTION_VERSION,
        }
    }
}

impl QuoteExtraction {
    /// First coverage item of the given type, if any.
    pub fn coverage(&self, kind: CoverageType) -> Option<&CoverageItem> {
        self.coverages.iter().find(|c| c.coverage_type == kind)
    }

    pub fn has_coverage(&self, kind: CoverageType) -> bool {
        self.coverage(kind).is_some()
    }

    /// Whether any endorsement on this quote matches `form_number`.
    ///
    /// See [`Endorsement::matches_form`] for the matching rules.
    pub fn has_endorsement(&self, form_number: &str) -> bool {
        self.endorsements.iter().any(|e| e.matches_form(form_number))
    }
}

/// One line of insured protection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageItem {
    #[serde(rename = "type")]
    pub coverage_type: CoverageType,
    pub name: String,
    pub description: Option<String>,
    pub source_pages: Vec<u32>,
    pub limit: Option<f64>,
    pub sublimit: Option<f64>,
    pub limit_type: Option<LimitType>,
    pub deductible: Option<f64>,
    pub aggregate_limit: Option<f64>,
    pub self_insured_retention: Option<f64>,
    /// Percentage, e.g. `80.0` for 80 % coinsurance.
    pub coinsurance: Option<f64>,
    pub waiting_period: Option<String>,
    pub indemnity_period: Option<String>,
}

impl CoverageItem {
    /// A bare item with only type and name set.
    pub fn new(coverage_type: CoverageType, name: impl Into<String>) -> Self {
        Self {
            coverage_type,
            name: name.into(),
            description: None,
            source_pages: Vec::new(),
            limit: None,
            sublimit: None,
            limit_type: None,
            deductible: None,
            aggregate_limit: None,
            self_insured_retention: None,
            coinsurance: None,
            waiting_period: None,
            indemnity_period: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitType {
    PerOccurrence,
    Aggregate,
    PerPerson,
    CombinedSingle,
}

impl LimitType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PerOccurrence => "per occurrence",
            Self::Aggregate => "aggregate",
            Self::PerPerson => "per person",
            Self::CombinedSingle => "combined single",
        }
    }
}

/// A policy-level deductible listed outside the coverage table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeductibleItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: Option<f64>,
    pub applies_to: Option<String>,
}

/// A policy form that broadens, restricts, or conditions base coverage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endorsement {
    pub form_number: String,
    pub name: String,
    #[serde(rename = "type")]
    pub endorsement_type: EndorsementType,
    pub description: String,
    pub affected_coverage: Option<String>,
    pub source_pages: Vec<u32>,
}

impl Endorsement {
    /// Match against a reference form number.
    ///
    /// Whitespace and case are ignored, and a reference number matches any
    /// edition of the form: `CG 20 10` matches `cg2010 04 13` and
    /// `CG 20 10 (04/13)`. Anything after the reference number must be an
    /// edition date, so `CG 20 101` is a different form.
    pub fn matches_form(&self, form_number: &str) -> bool {
        let wanted = compact_form_number(form_number);
        if wanted.is_empty() {
            return false;
        }
        compact_form_number(&self.form_number)
            .strip_prefix(wanted.as_str())
            .is_some_and(is_edition_suffix)
    }
}

/// Empty, a bare `MMYY` edition, or text set off by punctuation.
fn is_edition_suffix(rest: &str) -> bool {
    match rest.chars().next() {
        None => true,
        Some(c) if !c.is_ascii_alphanumeric() => true,
        Some(_) => rest.len() == 4 && rest.bytes().all(|b| b.is_ascii_digit()),
    }
}

/// Strip whitespace and uppercase, so `cg 20 10` and `CG2010` compare equal.
pub fn compact_form_number(form_number: &str) -> String {
    form_number
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndorsementType {
    Broadening,
    Restricting,
    Conditional,
}

impl EndorsementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Broadening => "broadening",
            Self::Restricting => "restricting",
            Self::Conditional => "conditional",
        }
    }
}

/// Policy form metadata (v2+).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyMetadata {
    pub form_type: Option<FormType>,
    pub form_numbers: Vec<String>,
    pub policy_type: Option<PolicyType>,
    pub retro_date: Option<String>,
    pub extended_reporting_period: Option<String>,
    pub audit_type: Option<AuditType>,
    pub source_pages: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormType {
    Iso,
    Proprietary,
    Manuscript,
}

impl FormType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Iso => "ISO",
            Self::Proprietary => "Proprietary",
            Self::Manuscript => "Manuscript",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyType {
    #[serde(rename = "occurrence")]
    Occurrence,
    #[serde(rename = "claims-made", alias = "claims_made")]
    ClaimsMade,
}

impl PolicyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Occurrence => "Occurrence",
            Self::ClaimsMade => "Claims-Made",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditType {
    Annual,
    Monthly,
    Final,
    None,
}

impl AuditType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Monthly => "monthly",
            Self::Final => "final",
            Self::None => "none",
        }
    }
}

/// Carrier identity and financial strength (v3+).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarrierInfo {
    pub am_best_rating: Option<String>,
    pub am_best_financial_size: Option<String>,
    pub naic_code: Option<String>,
    pub admitted_status: Option<AdmittedStatus>,
    pub claims_phone: Option<String>,
    pub underwriter: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdmittedStatus {
    #[serde(rename = "admitted")]
    Admitted,
    #[serde(rename = "non-admitted", alias = "non_admitted")]
    NonAdmitted,
    #[serde(rename = "surplus")]
    Surplus,
}

impl AdmittedStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admitted => "Admitted",
            Self::NonAdmitted => "Non-Admitted",
            Self::Surplus => "Surplus Lines",
        }
    }
}

/// Premium split by component (v3+). Only the total is required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumBreakdown {
    pub base_premium: Option<f64>,
    pub coverage_premiums: Vec<CoveragePremium>,
    pub taxes: Option<f64>,
    pub fees: Option<f64>,
    pub broker_fee: Option<f64>,
    pub surplus_lines_tax: Option<f64>,
    pub total_premium: f64,
    pub payment_plan: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoveragePremium {
    pub coverage: String,
    pub premium: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endorsement(form: &str) -> Endorsement {
        Endorsement {
            form_number: form.into(),
            name: "Additional Insured".into(),
            endorsement_type: EndorsementType::Broadening,
            description: "Adds owners as additional insureds".into(),
            affected_coverage: Some("General Liability".into()),
            source_pages: vec![12],
        }
    }

    #[test]
    fn default_is_current_version_and_empty() {
        let ext = QuoteExtraction::default();
        assert_eq!(ext.extraction_version, CURRENT_EXTRACTION_VERSION);
        assert!(ext.coverages.is_empty());
        assert!(ext.annual_premium.is_none());
    }

    #[test]
    fn coverage_lookup_returns_first_match() {
        let mut first = CoverageItem::new(CoverageType::Other, "Sign coverage");
        first.limit = Some(5_000.0);
        let second = CoverageItem::new(CoverageType::Other, "Glass");
        let ext = QuoteExtraction {
            coverages: vec![first, second],
            ..Default::default()
        };
        assert_eq!(ext.coverage(CoverageType::Other).unwrap().name, "Sign coverage");
        assert!(!ext.has_coverage(CoverageType::Cyber));
    }

    #[test]
    fn form_number_matching_ignores_spacing_case_and_edition() {
        assert!(endorsement("CG 20 10 04 13").matches_form("CG 20 10"));
        assert!(endorsement("cg2010").matches_form("CG 20 10"));
        assert!(!endorsement("CG 20 37").matches_form("CG 20 10"));
        assert!(!endorsement("CG 20 10").matches_form("   "));
    }

    #[test]
    fn form_number_matching_requires_an_edition_boundary() {
        assert!(!endorsement("CG 20 101").matches_form("CG 20 10"));
        assert!(!endorsement("CG 20 10A").matches_form("CG 20 10"));
        assert!(!endorsement("CG 20 10 04 13 1").matches_form("CG 20 10"));
        assert!(endorsement("CG 20 10 (04/13)").matches_form("CG 20 10"));
        assert!(endorsement("CG 20 10-0413").matches_form("CG 20 10"));
        assert!(endorsement("CG 20 10 04 13").matches_form("cg 2010"));
    }

    #[test]
    fn json_uses_camel_case_and_type_keys() {
        let ext = QuoteExtraction {
            carrier_name: Some("Acme Mutual".into()),
            endorsements: vec![endorsement("CG 20 10")],
            ..Default::default()
        };
        let json = serde_json::to_value(&ext).unwrap();
        assert_eq!(json["carrierName"], "Acme Mutual");
        assert_eq!(json["endorsements"][0]["type"], "broadening");
        assert_eq!(json["extractionVersion"], 3);
    }

    #[test]
    fn hyphenated_enum_values() {
        let p: PolicyType = serde_json::from_str("\"claims-made\"").unwrap();
        assert_eq!(p, PolicyType::ClaimsMade);
        let p: PolicyType = serde_json::from_str("\"claims_made\"").unwrap();
        assert_eq!(p, PolicyType::ClaimsMade);
        let a: AdmittedStatus = serde_json::from_str("\"non-admitted\"").unwrap();
        assert_eq!(a, AdmittedStatus::NonAdmitted);
    }
}
