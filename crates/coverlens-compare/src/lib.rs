//! Side-by-side comparison of normalized quote extractions.
//!
//! Everything here is a pure function of its inputs: rows, gaps, conflicts and
//! the risk score are rebuilt from scratch for every comparison.

pub mod comparator;
pub mod config;
pub mod error;
pub mod gaps;
pub mod risk;
pub mod rows;
pub mod table;

pub use comparator::{
    ComparisonRow, ComparisonValue, Direction, FieldSpec, FieldType, RawValue, RowCategory,
    ValueStatus, compare_field,
};
pub use config::{ComparisonConfig, DEFAULT_MATERIALITY_THRESHOLD_PCT};
pub use error::{ComparisonError, ConfigError};
pub use gaps::{
    CRITICAL_ENDORSEMENTS, ConflictKind, ConflictWarning, EndorsementGap, GapAnalysis, GapWarning,
    Severity, analyze_gaps,
};
pub use risk::{RiskLevel, RiskWeights, calculate_risk_score, risk_level};
pub use rows::{build_comparison_rows, build_detail_rows};
pub use table::{
    ComparisonTableData, MAX_COMPARISON_DOCUMENTS, MIN_COMPARISON_DOCUMENTS,
    build_comparison_table, validate_selection,
};
