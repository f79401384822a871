//! Inputs for the branded one-page PDF summary.
//!
//! Layout and rendering belong to the renderer; this module only gathers and
//! validates what it needs into one serializable document.

use chrono::NaiveDate;
use coverlens_compare::{
    ComparisonRow, ComparisonTableData, ConflictWarning, GapWarning, RiskLevel, build_detail_rows,
};
use coverlens_core::QuoteExtraction;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ExportError;

pub const DEFAULT_PRIMARY_COLOR: &str = "#2563eb";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyBranding {
    pub agency_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub logo_url: Option<String>,
    pub primary_color: String,
}

impl AgencyBranding {
    pub fn new(agency_name: impl Into<String>) -> Self {
        Self {
            agency_name: agency_name.into(),
            logo_url: None,
            primary_color: DEFAULT_PRIMARY_COLOR.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ExportError> {
        if is_hex_color(&self.primary_color) {
            Ok(())
        } else {
            Err(ExportError::InvalidColor(self.primary_color.clone()))
        }
    }
}

fn is_hex_color(s: &str) -> bool {
    s.strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Exclusions listed by one quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteExclusions {
    pub header: String,
    pub exclusions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnePagerInput {
    pub branding: AgencyBranding,
    pub generated_on: NaiveDate,
    pub headers: Vec<String>,
    pub rows: Vec<ComparisonRow>,
    /// Field labels of rows where the quotes disagree.
    pub highlighted_fields: Vec<String>,
    pub detail_rows: Vec<ComparisonRow>,
    pub exclusions: Vec<QuoteExclusions>,
    pub gaps: Vec<GapWarning>,
    pub conflicts: Vec<ConflictWarning>,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
}

impl OnePagerInput {
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Gather a one-pager for `table`, built from the same `extractions`.
pub fn build_one_pager(
    table: &ComparisonTableData,
    extractions: &[QuoteExtraction],
    branding: &AgencyBranding,
    generated_on: NaiveDate,
) -> Result<OnePagerInput, ExportError> {
    if let Err(err) = branding.validate() {
        warn!(agency = %branding.agency_name, "rejected one-pager branding");
        return Err(err);
    }

    let exclusions = table
        .headers
        .iter()
        .zip(extractions)
        .map(|(header, e)| QuoteExclusions {
            header: header.clone(),
            exclusions: e.exclusions.clone(),
        })
        .collect();

    debug!(
        agency = %branding.agency_name,
        quotes = extractions.len(),
        %generated_on,
        "assembled one-pager input"
    );
    Ok(OnePagerInput {
        branding: branding.clone(),
        generated_on,
        headers: table.headers.clone(),
        rows: table.rows.clone(),
        highlighted_fields: table.differing_rows().map(|r| r.field.clone()).collect(),
        detail_rows: build_detail_rows(extractions),
        exclusions,
        gaps: table.gaps.clone(),
        conflicts: table.conflicts.clone(),
        risk_score: table.risk_score,
        risk_level: table.risk_level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use coverlens_compare::{ComparisonConfig, build_comparison_table};
    use coverlens_core::CarrierInfo;

    fn quotes() -> Vec<QuoteExtraction> {
        vec![
            QuoteExtraction {
                carrier_name: Some("Alpha".into()),
                annual_premium: Some(5000.0),
                exclusions: vec!["Mold".into(), "War".into()],
                carrier_info: Some(CarrierInfo {
                    am_best_rating: Some("A+".into()),
                    ..Default::default()
                }),
                ..Default::default()
            },
            QuoteExtraction {
                carrier_name: Some("Beta".into()),
                annual_premium: Some(5000.0),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn colour_validation() {
        for good in ["#2563eb", "#ABCDEF", "#000000"] {
            assert!(is_hex_color(good), "{good}");
        }
        for bad in ["2563eb", "#2563e", "#2563ebb", "#gggggg", "", "#"] {
            assert!(!is_hex_color(bad), "{bad}");
        }
        assert!(AgencyBranding::new("Acme").validate().is_ok());
    }

    #[test]
    fn rejects_bad_branding() {
        let qs = quotes();
        let table = build_comparison_table(&qs, &[], &ComparisonConfig::default());
        let branding = AgencyBranding {
            primary_color: "blue".into(),
            ..AgencyBranding::new("Acme")
        };
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let err = build_one_pager(&table, &qs, &branding, date).unwrap_err();
        assert!(matches!(err, ExportError::InvalidColor(ref c) if c == "blue"));
    }

    #[test]
    fn gathers_sections() {
        let qs = quotes();
        let table = build_comparison_table(&qs, &[], &ComparisonConfig::default());
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let input = build_one_pager(&table, &qs, &AgencyBranding::new("Acme"), date).unwrap();

        assert_eq!(input.headers, vec!["Alpha", "Beta"]);
        assert_eq!(input.exclusions[0].exclusions, vec!["Mold", "War"]);
        assert!(input.exclusions[1].exclusions.is_empty());
        assert!(input.highlighted_fields.contains(&"Carrier".to_string()));
        assert!(input.highlighted_fields.contains(&"Exclusion Count".to_string()));
        assert!(!input.highlighted_fields.contains(&"Annual Premium".to_string()));
        assert_eq!(input.detail_rows.len(), 1);
        assert_eq!(input.detail_rows[0].field, "AM Best Rating");

        let json: serde_json::Value = serde_json::from_str(&input.to_json().unwrap()).unwrap();
        assert_eq!(json["generatedOn"], "2024-01-02");
        assert_eq!(json["branding"]["primaryColor"], "#2563eb");
        assert!(json["branding"].get("logoUrl").is_none());
    }
}
