//! Assemble the full comparison: aligned rows, gaps, conflicts, and score.

use coverlens_core::QuoteExtraction;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::comparator::ComparisonRow;
use crate::config::ComparisonConfig;
use crate::error::ComparisonError;
use crate::gaps::{ConflictWarning, GapWarning, analyze_gaps};
use crate::risk::{RiskLevel, risk_level};
use crate::rows::build_comparison_rows;

pub const MIN_COMPARISON_DOCUMENTS: usize = 2;
pub const MAX_COMPARISON_DOCUMENTS: usize = 4;

/// Everything a renderer needs for the side-by-side view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonTableData {
    pub headers: Vec<String>,
    pub rows: Vec<ComparisonRow>,
    pub document_count: usize,
    pub gaps: Vec<GapWarning>,
    pub conflicts: Vec<ConflictWarning>,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
}

impl ComparisonTableData {
    /// Rows where at least two quotes disagree.
    pub fn differing_rows(&self) -> impl Iterator<Item = &ComparisonRow> {
        self.rows.iter().filter(|r| r.has_difference)
    }
}

/// Check a user's document selection before loading anything.
pub fn validate_selection(count: usize) -> Result<(), ComparisonError> {
    if !(MIN_COMPARISON_DOCUMENTS..=MAX_COMPARISON_DOCUMENTS).contains(&count) {
        return Err(ComparisonError::SelectionSize {
            count,
            min: MIN_COMPARISON_DOCUMENTS,
            max: MAX_COMPARISON_DOCUMENTS,
        });
    }
    Ok(())
}

/// Column header for quote `index`: carrier, then filename, then `Quote N`.
pub fn document_header(extraction: &QuoteExtraction, filename: Option<&str>, index: usize) -> String {
    extraction
        .carrier_name
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .or(filename.filter(|s| !s.trim().is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Quote {}", index + 1))
}

/// Build the table for `extractions`, in column order.
///
/// `filenames` runs parallel to `extractions` and may be shorter. Fewer than
/// two quotes still yields a full table, just without ranking or gaps.
pub fn build_comparison_table(
    extractions: &[QuoteExtraction],
    filenames: &[String],
    config: &ComparisonConfig,
) -> ComparisonTableData {
    let headers: Vec<String> = extractions
        .iter()
        .enumerate()
        .map(|(i, e)| document_header(e, filenames.get(i).map(String::as_str), i))
        .collect();

    let rows = build_comparison_rows(extractions);
    let analysis = analyze_gaps(extractions, config);

    let mut gaps = analysis.missing_coverages;
    gaps.extend(analysis.endorsement_gaps.iter().map(|g| g.to_gap_warning()));
    let conflicts = analysis.limit_concerns;
    let risk_score = analysis.overall_risk_score;

    info!(
        documents = extractions.len(),
        rows = rows.len(),
        gaps = gaps.len(),
        conflicts = conflicts.len(),
        risk_score,
        "comparison built"
    );

    ComparisonTableData {
        headers,
        rows,
        document_count: extractions.len(),
        gaps,
        conflicts,
        risk_score,
        risk_level: risk_level(risk_score),
    }
}
