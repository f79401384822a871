//! Gap analysis between compared quotes.
//!
//! Gaps are relative: a coverage or endorsement is only "missing" from a quote
//! if another quote in the same comparison has it. A single quote therefore
//! never has gaps.
//!
//! Numeric limit differences beyond the materiality threshold are reported as
//! conflicts rather than gaps.

use coverlens_core::format::format_currency;
use coverlens_core::{CoverageImportance, CoverageType, QuoteExtraction};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ComparisonConfig;
use crate::risk::calculate_risk_score;
use crate::rows::{coverage_row_label, coverage_union};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A field or coverage present in some quotes and missing from others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapWarning {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub coverage_type: Option<CoverageType>,
    pub documents_missing: Vec<usize>,
    pub documents_present: Vec<usize>,
    pub severity: Severity,
}

/// A reference endorsement carried by some quotes and not others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndorsementGap {
    pub form_number: String,
    pub name: String,
    pub documents_missing: Vec<usize>,
    pub documents_present: Vec<usize>,
    pub severity: Severity,
}

impl EndorsementGap {
    /// Flatten into the table's gap list.
    pub fn to_gap_warning(&self) -> GapWarning {
        GapWarning {
            field: format!("{} ({})", self.name, self.form_number),
            coverage_type: None,
            documents_missing: self.documents_missing.clone(),
            documents_present: self.documents_present.clone(),
            severity: self.severity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    LimitVariance,
}

/// A materially different numeric value for the same field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictWarning {
    pub field: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub coverage_type: Option<CoverageType>,
    pub kind: ConflictKind,
    pub description: String,
    pub affected_indices: Vec<usize>,
    pub severity: Severity,
    /// `(max - min) / max * 100`.
    pub variance_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAnalysis {
    pub missing_coverages: Vec<GapWarning>,
    pub limit_concerns: Vec<ConflictWarning>,
    pub endorsement_gaps: Vec<EndorsementGap>,
    pub overall_risk_score: u8,
}

/// An endorsement whose absence is worth flagging when a competing quote has it.
#[derive(Debug, Clone, Copy)]
pub struct CriticalEndorsement {
    pub form_number: &'static str,
    pub name: &'static str,
    pub severity: Severity,
}

pub const CRITICAL_ENDORSEMENTS: &[CriticalEndorsement] = &[
    CriticalEndorsement {
        form_number: "CG 20 10",
        name: "Additional Insured \u{2013} Owners, Lessees or Contractors",
        severity: Severity::High,
    },
    CriticalEndorsement {
        form_number: "CG 20 37",
        name: "Additional Insured \u{2013} Completed Operations",
        severity: Severity::High,
    },
    CriticalEndorsement {
        form_number: "CG 24 04",
        name: "Waiver of Transfer of Rights of Recovery",
        severity: Severity::High,
    },
    CriticalEndorsement {
        form_number: "CG 20 01",
        name: "Primary and Noncontributory",
        severity: Severity::Medium,
    },
    CriticalEndorsement {
        form_number: "CG 25 03",
        name: "Designated Construction Project(s) General Aggregate Limit",
        severity: Severity::Medium,
    },
    CriticalEndorsement {
        form_number: "CG 25 04",
        name: "Designated Location(s) General Aggregate Limit",
        severity: Severity::Medium,
    },
];

/// Run every gap check and score the findings.
pub fn analyze_gaps(extractions: &[QuoteExtraction], config: &ComparisonConfig) -> GapAnalysis {
    let missing_coverages = find_missing_coverages(extractions);
    let limit_concerns = find_limit_concerns(extractions, config.materiality_threshold_pct);
    let endorsement_gaps = find_endorsement_gaps(extractions);
    let overall_risk_score = calculate_risk_score(
        &missing_coverages,
        &limit_concerns,
        &endorsement_gaps,
        &config.risk_weights,
    );

    debug!(
        documents = extractions.len(),
        missing_coverages = missing_coverages.len(),
        limit_concerns = limit_concerns.len(),
        endorsement_gaps = endorsement_gaps.len(),
        overall_risk_score,
        "gap analysis complete"
    );

    GapAnalysis {
        missing_coverages,
        limit_concerns,
        endorsement_gaps,
        overall_risk_score,
    }
}

/// Split quote indices into (missing, present) by `has`.
fn partition(
    extractions: &[QuoteExtraction],
    has: impl Fn(&QuoteExtraction) -> bool,
) -> (Vec<usize>, Vec<usize>) {
    let mut missing = Vec::new();
    let mut present = Vec::new();
    for (i, e) in extractions.iter().enumerate() {
        if has(e) {
            present.push(i);
        } else {
            missing.push(i);
        }
    }
    (missing, present)
}

fn missing_severity(kind: CoverageType) -> Severity {
    match kind.importance() {
        CoverageImportance::Critical => Severity::High,
        CoverageImportance::Standard => Severity::Medium,
        CoverageImportance::Peripheral => Severity::Low,
    }
}

/// One warning per coverage type held by some, but not all, quotes.
pub fn find_missing_coverages(extractions: &[QuoteExtraction]) -> Vec<GapWarning> {
    if extractions.len() < 2 {
        return Vec::new();
    }
    coverage_union(extractions)
        .into_iter()
        .filter_map(|kind| {
            let (missing, present) = partition(extractions, |e| e.has_coverage(kind));
            if missing.is_empty() {
                return None;
            }
            Some(GapWarning {
                field: kind.label().to_string(),
                coverage_type: Some(kind),
                documents_missing: missing,
                documents_present: present,
                severity: missing_severity(kind),
            })
        })
        .collect()
}

/// One gap per reference endorsement held by some, but not all, quotes.
pub fn find_endorsement_gaps(extractions: &[QuoteExtraction]) -> Vec<EndorsementGap> {
    if extractions.len() < 2 {
        return Vec::new();
    }
    CRITICAL_ENDORSEMENTS
        .iter()
        .filter_map(|reference| {
            let (missing, present) =
                partition(extractions, |e| e.has_endorsement(reference.form_number));
            if missing.is_empty() || present.is_empty() {
                return None;
            }
            Some(EndorsementGap {
                form_number: reference.form_number.to_string(),
                name: reference.name.to_string(),
                documents_missing: missing,
                documents_present: present,
                severity: reference.severity,
            })
        })
        .collect()
}

/// Coverage limits whose spread exceeds `threshold_pct` of the highest limit.
pub fn find_limit_concerns(
    extractions: &[QuoteExtraction],
    threshold_pct: f64,
) -> Vec<ConflictWarning> {
    let mut concerns = Vec::new();
    for kind in coverage_union(extractions) {
        let limits: Vec<(usize, f64)> = extractions
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.coverage(kind)?.limit.map(|l| (i, l)))
            .collect();
        if limits.len() < 2 {
            continue;
        }

        let max = limits.iter().map(|&(_, l)| l).fold(f64::MIN, f64::max);
        let min = limits.iter().map(|&(_, l)| l).fold(f64::MAX, f64::min);
        if max <= 0.0 {
            continue;
        }
        let variance_pct = (max - min) / max * 100.0;
        if variance_pct <= threshold_pct {
            continue;
        }

        let severity = match kind.importance() {
            CoverageImportance::Peripheral => Severity::Low,
            _ => Severity::Medium,
        };
        concerns.push(ConflictWarning {
            field: coverage_row_label(kind, "Limit"),
            coverage_type: Some(kind),
            kind: ConflictKind::LimitVariance,
            description: format!(
                "{} limits vary by {:.0}% ({} vs {})",
                kind.label(),
                variance_pct,
                format_currency(min),
                format_currency(max)
            ),
            affected_indices: limits
                .iter()
                .filter(|&&(_, l)| l < max)
                .map(|&(i, _)| i)
                .collect(),
            severity,
            variance_pct,
        });
    }
    concerns
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverlens_core::{CoverageItem, Endorsement, EndorsementType};

    fn quote(coverages: &[(CoverageType, Option<f64>)]) -> QuoteExtraction {
        QuoteExtraction {
            coverages: coverages
                .iter()
                .map(|&(kind, limit)| {
                    let mut item = CoverageItem::new(kind, kind.label());
                    item.limit = limit;
                    item
                })
                .collect(),
            ..Default::default()
        }
    }

    fn with_endorsement(mut q: QuoteExtraction, form: &str) -> QuoteExtraction {
        q.endorsements.push(Endorsement {
            form_number: form.into(),
            name: "Endorsement".into(),
            endorsement_type: EndorsementType::Broadening,
            description: "desc".into(),
            affected_coverage: None,
            source_pages: vec![],
        });
        q
    }

    #[test]
    fn disjoint_coverages_yield_two_gaps() {
        let a = quote(&[(CoverageType::GeneralLiability, Some(1_000_000.0))]);
        let b = quote(&[(CoverageType::Cyber, Some(500_000.0))]);
        let gaps = find_missing_coverages(&[a, b]);
        assert_eq!(gaps.len(), 2);
        assert_eq!(gaps[0].field, "General Liability");
        assert_eq!(gaps[0].documents_missing, vec![1]);
        assert_eq!(gaps[0].documents_present, vec![0]);
        assert_eq!(gaps[1].coverage_type, Some(CoverageType::Cyber));
        assert_eq!(gaps[1].documents_missing, vec![0]);
    }

    #[test]
    fn severity_follows_importance() {
        let a = quote(&[
            (CoverageType::WorkersComp, None),
            (CoverageType::Umbrella, None),
            (CoverageType::LiquorLiability, None),
        ]);
        let b = quote(&[]);
        let gaps = find_missing_coverages(&[a, b]);
        let severities: Vec<Severity> = gaps.iter().map(|g| g.severity).collect();
        assert_eq!(severities, vec![Severity::Medium, Severity::High, Severity::Low]);
        assert_eq!(gaps[1].coverage_type, Some(CoverageType::WorkersComp));
    }

    #[test]
    fn coverage_everywhere_is_not_a_gap() {
        let a = quote(&[(CoverageType::Property, Some(1.0))]);
        let b = quote(&[(CoverageType::Property, None)]);
        assert!(find_missing_coverages(&[a, b]).is_empty());
    }

    #[test]
    fn single_quote_never_has_gaps() {
        let a = with_endorsement(
            quote(&[(CoverageType::GeneralLiability, Some(1.0)), (CoverageType::Cyber, None)]),
            "CG 20 10",
        );
        let analysis = analyze_gaps(&[a], &ComparisonConfig::default());
        assert!(analysis.missing_coverages.is_empty());
        assert!(analysis.endorsement_gaps.is_empty());
        assert!(analysis.limit_concerns.is_empty());
        assert_eq!(analysis.overall_risk_score, 0);
    }

    #[test]
    fn no_quotes_is_empty_analysis() {
        let analysis = analyze_gaps(&[], &ComparisonConfig::default());
        assert!(analysis.missing_coverages.is_empty());
        assert_eq!(analysis.overall_risk_score, 0);
    }

    #[test]
    fn endorsement_gap_names_missing_form() {
        let a = with_endorsement(quote(&[]), "CG 20 10 04 13");
        let b = with_endorsement(quote(&[]), "CG 21 47");
        let c = with_endorsement(quote(&[]), "cg2010");
        let gaps = find_endorsement_gaps(&[a, b, c]);
        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].form_number, "CG 20 10");
        assert_eq!(gaps[0].documents_missing, vec![1]);
        assert_eq!(gaps[0].documents_present, vec![0, 2]);
        assert_eq!(gaps[0].severity, Severity::High);

        let flat = gaps[0].to_gap_warning();
        assert_eq!(
            flat.field,
            "Additional Insured \u{2013} Owners, Lessees or Contractors (CG 20 10)"
        );
    }

    #[test]
    fn non_reference_endorsements_ignored() {
        let a = with_endorsement(quote(&[]), "IL 00 17");
        let b = quote(&[]);
        assert!(find_endorsement_gaps(&[a, b]).is_empty());
    }

    #[test]
    fn limit_concern_reports_variance_and_values() {
        let a = quote(&[(CoverageType::GeneralLiability, Some(1_000_000.0))]);
        let b = quote(&[(CoverageType::GeneralLiability, Some(2_000_000.0))]);
        let concerns = find_limit_concerns(&[a, b], 25.0);
        assert_eq!(concerns.len(), 1);
        let c = &concerns[0];
        assert_eq!(c.field, "General Liability \u{2013} Limit");
        assert_eq!(c.kind, ConflictKind::LimitVariance);
        assert_eq!(
            c.description,
            "General Liability limits vary by 50% ($1,000,000 vs $2,000,000)"
        );
        assert_eq!(c.affected_indices, vec![0]);
        assert_eq!(c.severity, Severity::Medium);
        assert_eq!(c.variance_pct, 50.0);
    }

    #[test]
    fn limit_variance_at_threshold_is_not_material() {
        let a = quote(&[(CoverageType::Property, Some(750_000.0))]);
        let b = quote(&[(CoverageType::Property, Some(1_000_000.0))]);
        assert!(find_limit_concerns(&[a.clone(), b.clone()], 25.0).is_empty());
        assert_eq!(find_limit_concerns(&[a, b], 20.0).len(), 1);
    }

    #[test]
    fn limit_concerns_skip_null_and_zero_limits() {
        let a = quote(&[(CoverageType::Crime, None)]);
        let b = quote(&[(CoverageType::Crime, Some(100_000.0))]);
        assert!(find_limit_concerns(&[a, b], 1.0).is_empty());
        let c = quote(&[(CoverageType::Crime, Some(0.0))]);
        let d = quote(&[(CoverageType::Crime, Some(0.0))]);
        assert!(find_limit_concerns(&[c, d], 1.0).is_empty());
    }

    #[test]
    fn peripheral_limit_concern_is_low() {
        let a = quote(&[(CoverageType::Pollution, Some(100_000.0))]);
        let b = quote(&[(CoverageType::Pollution, Some(1_000_000.0))]);
        let concerns = find_limit_concerns(&[a, b], 25.0);
        assert_eq!(concerns[0].severity, Severity::Low);
    }

    #[test]
    fn analysis_scores_its_findings() {
        let a = quote(&[(CoverageType::GeneralLiability, Some(1_000_000.0))]);
        let b = quote(&[(CoverageType::Cyber, Some(500_000.0))]);
        let analysis = analyze_gaps(&[a, b], &ComparisonConfig::default());
        // Two critical missing coverages: 2 * (15 + 10).
        assert_eq!(analysis.overall_risk_score, 50);
    }
}
