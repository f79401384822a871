//! Aggregate risk scoring over gap-analysis findings.
//!
//! Every finding contributes its severity weight. Missing coverages also carry
//! a bonus for the coverage's importance. The total saturates at 100.

use coverlens_core::{CoverageImportance, CoverageType};
use serde::{Deserialize, Serialize};

use crate::gaps::{ConflictWarning, EndorsementGap, GapWarning, Severity};

pub const MAX_RISK_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RiskWeights {
    pub high: u32,
    pub medium: u32,
    pub low: u32,
    pub critical_coverage_bonus: u32,
    pub standard_coverage_bonus: u32,
    pub peripheral_coverage_bonus: u32,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            high: 15,
            medium: 8,
            low: 3,
            critical_coverage_bonus: 10,
            standard_coverage_bonus: 5,
            peripheral_coverage_bonus: 0,
        }
    }
}

impl RiskWeights {
    pub fn severity(&self, severity: Severity) -> u32 {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    pub fn importance_bonus(&self, kind: CoverageType) -> u32 {
        match kind.importance() {
            CoverageImportance::Critical => self.critical_coverage_bonus,
            CoverageImportance::Standard => self.standard_coverage_bonus,
            CoverageImportance::Peripheral => self.peripheral_coverage_bonus,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Score in `0..=100`. Empty findings score 0.
pub fn calculate_risk_score(
    missing: &[GapWarning],
    concerns: &[ConflictWarning],
    endorsement_gaps: &[EndorsementGap],
    weights: &RiskWeights,
) -> u8 {
    let missing_total = missing.iter().fold(0u32, |acc, gap| {
        let bonus = gap.coverage_type.map_or(0, |k| weights.importance_bonus(k));
        acc.saturating_add(weights.severity(gap.severity))
            .saturating_add(bonus)
    });
    let concern_total = concerns
        .iter()
        .fold(0u32, |acc, c| acc.saturating_add(weights.severity(c.severity)));
    let endorsement_total = endorsement_gaps
        .iter()
        .fold(0u32, |acc, g| acc.saturating_add(weights.severity(g.severity)));

    let total = missing_total
        .saturating_add(concern_total)
        .saturating_add(endorsement_total);
    total.min(MAX_RISK_SCORE as u32) as u8
}

pub fn risk_level(score: u8) -> RiskLevel {
    match score {
        0..30 => RiskLevel::Low,
        30..60 => RiskLevel::Medium,
        _ => RiskLevel::High,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gaps::ConflictKind;

    fn gap(kind: CoverageType, severity: Severity) -> GapWarning {
        GapWarning {
            field: kind.label().to_string(),
            coverage_type: Some(kind),
            documents_missing: vec![1],
            documents_present: vec![0],
            severity,
        }
    }

    fn concern(severity: Severity) -> ConflictWarning {
        ConflictWarning {
            field: "Property \u{2013} Limit".into(),
            coverage_type: Some(CoverageType::Property),
            kind: ConflictKind::LimitVariance,
            description: String::new(),
            affected_indices: vec![0],
            severity,
            variance_pct: 50.0,
        }
    }

    fn endorsement(severity: Severity) -> EndorsementGap {
        EndorsementGap {
            form_number: "CG 20 01".into(),
            name: "Primary and Noncontributory".into(),
            documents_missing: vec![0],
            documents_present: vec![1],
            severity,
        }
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(calculate_risk_score(&[], &[], &[], &RiskWeights::default()), 0);
        assert_eq!(risk_level(0), RiskLevel::Low);
    }

    #[test]
    fn weights_add_up() {
        let w = RiskWeights::default();
        let missing = [
            gap(CoverageType::Cyber, Severity::High),
            gap(CoverageType::Crime, Severity::Medium),
            gap(CoverageType::InlandMarine, Severity::Low),
        ];
        // (15 + 10) + (8 + 5) + (3 + 0)
        assert_eq!(calculate_risk_score(&missing, &[], &[], &w), 41);
        assert_eq!(calculate_risk_score(&[], &[concern(Severity::Medium)], &[], &w), 8);
        assert_eq!(
            calculate_risk_score(&[], &[], &[endorsement(Severity::High)], &w),
            15
        );
    }

    #[test]
    fn caps_at_one_hundred() {
        let missing: Vec<GapWarning> = CoverageType::ALL
            .into_iter()
            .map(|k| gap(k, Severity::High))
            .collect();
        let score = calculate_risk_score(&missing, &[], &[], &RiskWeights::default());
        assert_eq!(score, MAX_RISK_SCORE);
        assert_eq!(risk_level(score), RiskLevel::High);
    }

    #[test]
    fn huge_weights_do_not_overflow() {
        let w = RiskWeights {
            high: u32::MAX,
            ..RiskWeights::default()
        };
        let missing = [
            gap(CoverageType::Cyber, Severity::High),
            gap(CoverageType::Property, Severity::High),
        ];
        assert_eq!(calculate_risk_score(&missing, &[], &[], &w), 100);
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(risk_level(29), RiskLevel::Low);
        assert_eq!(risk_level(30), RiskLevel::Medium);
        assert_eq!(risk_level(59), RiskLevel::Medium);
        assert_eq!(risk_level(60), RiskLevel::High);
        assert_eq!(risk_level(100), RiskLevel::High);
    }

    mod proptest_risk {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Finding {
            Missing(GapWarning),
            Concern(ConflictWarning),
            Endorsement(EndorsementGap),
        }

        fn severity() -> impl Strategy<Value = Severity> {
            prop_oneof![Just(Severity::Low), Just(Severity::Medium), Just(Severity::High)]
        }

        fn finding() -> impl Strategy<Value = Finding> {
            prop_oneof![
                (proptest::option::of(proptest::sample::select(CoverageType::ALL.to_vec())), severity())
                    .prop_map(|(kind, s)| match kind {
                        Some(k) => Finding::Missing(gap(k, s)),
                        None => Finding::Missing(GapWarning {
                            coverage_type: None,
                            ..gap(CoverageType::Other, s)
                        }),
                    }),
                severity().prop_map(|s| Finding::Concern(concern(s))),
                severity().prop_map(|s| Finding::Endorsement(endorsement(s))),
            ]
        }

        fn score(findings: &[Finding], w: &RiskWeights) -> u8 {
            let (mut missing, mut concerns, mut endorsements) = (vec![], vec![], vec![]);
            for f in findings {
                match f.clone() {
                    Finding::Missing(g) => missing.push(g),
                    Finding::Concern(c) => concerns.push(c),
                    Finding::Endorsement(e) => endorsements.push(e),
                }
            }
            calculate_risk_score(&missing, &concerns, &endorsements, w)
        }

        proptest! {
            #[test]
            fn score_is_bounded_and_monotone(
                findings in proptest::collection::vec(finding(), 0..16),
                extra in finding(),
            ) {
                let w = RiskWeights::default();
                let base = score(&findings, &w);
                prop_assert!(base <= MAX_RISK_SCORE);

                let mut more = findings.clone();
                more.push(extra);
                let grown = score(&more, &w);
                prop_assert!(grown <= MAX_RISK_SCORE);
                prop_assert!(grown >= base);
            }

            #[test]
            fn single_missing_coverage_scores_severity_plus_bonus(
                kind in proptest::sample::select(CoverageType::ALL.to_vec()),
                s in severity(),
            ) {
                let w = RiskWeights::default();
                let only = calculate_risk_score(&[gap(kind, s)], &[], &[], &w);
                prop_assert_eq!(
                    only as u32,
                    (w.severity(s) + w.importance_bonus(kind)).min(MAX_RISK_SCORE as u32)
                );
            }
        }
    }
}
