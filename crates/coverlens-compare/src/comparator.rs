//! Field comparison across quotes.
//!
//! Given one logical field pulled from each of N extractions, produce a
//! [`ComparisonRow`]: a display cell per quote plus the best and worst
//! positions. Best/worst only considers values that were found and are
//! numeric. A quote silent on a field is never ranked, so a missing limit is
//! not "worse" than a stated $0 limit.

use coverlens_core::CoverageType;
use coverlens_core::format::{NOT_FOUND_DISPLAY, format_currency, format_date};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Currency,
    Date,
    Count,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Currency => "currency",
            Self::Date => "date",
            Self::Count => "count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowCategory {
    Basic,
    Coverage,
    Summary,
    Detail,
}

impl RowCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Coverage => "coverage",
            Self::Summary => "summary",
            Self::Detail => "detail",
        }
    }
}

/// Which end of a numeric field is favourable to the insured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    HigherIsBetter,
    LowerIsBetter,
    NotComparable,
}

/// Declared properties of a comparable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub label: String,
    pub category: RowCategory,
    pub field_type: FieldType,
    pub direction: Direction,
    pub coverage_type: Option<CoverageType>,
}

impl FieldSpec {
    pub fn new(
        label: impl Into<String>,
        category: RowCategory,
        field_type: FieldType,
        direction: Direction,
    ) -> Self {
        Self {
            label: label.into(),
            category,
            field_type,
            direction,
            coverage_type: None,
        }
    }

    pub fn for_coverage(mut self, kind: CoverageType) -> Self {
        self.coverage_type = Some(kind);
        self
    }
}

/// An extracted value before display formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueStatus {
    Found,
    NotFound,
}

/// One quote's cell in a comparison row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonValue {
    pub display: String,
    pub raw: Option<RawValue>,
    pub status: ValueStatus,
}

impl ComparisonValue {
    pub fn is_found(&self) -> bool {
        self.status == ValueStatus::Found
    }
}

/// One field compared across every quote, in quote order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRow {
    pub field: String,
    pub category: RowCategory,
    pub field_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub coverage_type: Option<CoverageType>,
    pub values: Vec<ComparisonValue>,
    pub has_difference: bool,
    pub best_index: Option<usize>,
    pub worst_index: Option<usize>,
}

impl ComparisonRow {
    /// Panics if best/worst highlighting is inconsistent with the values.
    ///
    /// Such a row can only come from a comparator defect, so it must not be
    /// rendered.
    pub fn assert_consistent(&self) {
        assert_eq!(
            self.best_index.is_some(),
            self.worst_index.is_some(),
            "row {:?}: best and worst must be set together",
            self.field
        );
        for idx in [self.best_index, self.worst_index].into_iter().flatten() {
            assert!(
                idx < self.values.len(),
                "row {:?}: index {idx} out of range for {} values",
                self.field,
                self.values.len()
            );
            assert!(
                self.values[idx].is_found(),
                "row {:?}: index {idx} points at a not-found value",
                self.field
            );
        }
    }
}

/// Compare one field across quotes. `values[i]` is quote `i`'s raw value.
pub fn compare_field(spec: &FieldSpec, values: &[Option<RawValue>]) -> ComparisonRow {
    let cells = values
        .iter()
        .map(|raw| ComparisonValue {
            display: display_value(spec.field_type, raw.as_ref()),
            raw: raw.clone(),
            status: if raw.is_some() {
                ValueStatus::Found
            } else {
                ValueStatus::NotFound
            },
        })
        .collect();

    let (best_index, worst_index) = best_and_worst(spec.direction, values);

    let row = ComparisonRow {
        field: spec.label.clone(),
        category: spec.category,
        field_type: spec.field_type,
        coverage_type: spec.coverage_type,
        values: cells,
        has_difference: has_difference(values),
        best_index,
        worst_index,
    };
    row.assert_consistent();
    row
}

/// Render a raw value for a cell of the given type.
pub fn display_value(field_type: FieldType, raw: Option<&RawValue>) -> String {
    match (field_type, raw) {
        (_, None) => NOT_FOUND_DISPLAY.to_string(),
        (FieldType::Currency, Some(RawValue::Number(n))) => format_currency(*n),
        (FieldType::Date, Some(RawValue::Text(s))) => format_date(s),
        (_, Some(RawValue::Number(n))) => format!("{n}"),
        (_, Some(RawValue::Text(s))) => s.clone(),
    }
}

fn has_difference(values: &[Option<RawValue>]) -> bool {
    let mut found = values.iter().flatten();
    match found.next() {
        Some(first) => found.any(|v| v != first),
        None => false,
    }
}

/// Indices of the best and worst numeric values, lowest index on ties.
fn best_and_worst(direction: Direction, values: &[Option<RawValue>]) -> (Option<usize>, Option<usize>) {
    if direction == Direction::NotComparable {
        return (None, None);
    }

    let numeric: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.as_ref()?.as_number().map(|n| (i, n)))
        .collect();
    if numeric.len() < 2 {
        return (None, None);
    }

    let (mut max_i, mut max) = numeric[0];
    let (mut min_i, mut min) = numeric[0];
    for &(i, n) in &numeric[1..] {
        if n > max {
            max = n;
            max_i = i;
        }
        if n < min {
            min = n;
            min_i = i;
        }
    }

    if max == min {
        return (None, None);
    }

    match direction {
        Direction::HigherIsBetter => (Some(max_i), Some(min_i)),
        Direction::LowerIsBetter => (Some(min_i), Some(max_i)),
        Direction::NotComparable => (None, None),
    }
}
