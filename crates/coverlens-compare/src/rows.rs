//! Ordered comparison rows for a set of quotes.
//!
//! Row order is fixed by declaration, never by input order:
//!
//! 1. basic fields (carrier through expiration date)
//! 2. per coverage category, in canonical taxonomy order, a limit row and a
//!    deductible row, each only when some quote states that value
//! 3. summary counts, always present
//!
//! Direction (higher or lower is better) is declared per field in the tables
//! below.

use coverlens_core::{CoverageItem, CoverageType, QuoteExtraction};

use crate::comparator::{ComparisonRow, Direction, FieldSpec, FieldType, RawValue, RowCategory, compare_field};

/// A field read straight off the extraction record.
struct RecordField {
    label: &'static str,
    field_type: FieldType,
    direction: Direction,
    read: fn(&QuoteExtraction) -> Option<RawValue>,
}

/// A numeric sub-field of a coverage item.
struct CoverageField {
    suffix: &'static str,
    direction: Direction,
    read: fn(&CoverageItem) -> Option<f64>,
}

fn text(value: &Option<String>) -> Option<RawValue> {
    value.as_deref().map(RawValue::from)
}

fn number(value: Option<f64>) -> Option<RawValue> {
    value.map(RawValue::Number)
}

const BASIC_FIELDS: &[RecordField] = &[
    RecordField {
        label: "Carrier",
        field_type: FieldType::Text,
        direction: Direction::NotComparable,
        read: |e| text(&e.carrier_name),
    },
    RecordField {
        label: "Policy Number",
        field_type: FieldType::Text,
        direction: Direction::NotComparable,
        read: |e| text(&e.policy_number),
    },
    RecordField {
        label: "Named Insured",
        field_type: FieldType::Text,
        direction: Direction::NotComparable,
        read: |e| text(&e.named_insured),
    },
    RecordField {
        label: "Annual Premium",
        field_type: FieldType::Currency,
        direction: Direction::LowerIsBetter,
        read: |e| number(e.annual_premium),
    },
    RecordField {
        label: "Effective Date",
        field_type: FieldType::Date,
        direction: Direction::NotComparable,
        read: |e| text(&e.effective_date),
    },
    RecordField {
        label: "Expiration Date",
        field_type: FieldType::Date,
        direction: Direction::NotComparable,
        read: |e| text(&e.expiration_date),
    },
];

const COVERAGE_FIELDS: &[CoverageField] = &[
    CoverageField {
        suffix: "Limit",
        direction: Direction::HigherIsBetter,
        read: |c| c.limit,
    },
    CoverageField {
        suffix: "Deductible",
        direction: Direction::LowerIsBetter,
        read: |c| c.deductible,
    },
];

const SUMMARY_FIELDS: &[RecordField] = &[
    RecordField {
        label: "Coverage Count",
        field_type: FieldType::Count,
        direction: Direction::HigherIsBetter,
        read: |e| Some(RawValue::Number(e.coverages.len() as f64)),
    },
    RecordField {
        label: "Exclusion Count",
        field_type: FieldType::Count,
        direction: Direction::LowerIsBetter,
        read: |e| Some(RawValue::Number(e.exclusions.len() as f64)),
    },
];

/// v2/v3 fields shown in the one-pager's detail section.
const DETAIL_FIELDS: &[RecordField] = &[
    RecordField {
        label: "AM Best Rating",
        field_type: FieldType::Text,
        direction: Direction::NotComparable,
        read: |e| text(&e.carrier_info.as_ref()?.am_best_rating),
    },
    RecordField {
        label: "Admitted Status",
        field_type: FieldType::Text,
        direction: Direction::NotComparable,
        read: |e| Some(e.carrier_info.as_ref()?.admitted_status?.as_str().into()),
    },
    RecordField {
        label: "Policy Type",
        field_type: FieldType::Text,
        direction: Direction::NotComparable,
        read: |e| Some(e.policy_metadata.as_ref()?.policy_type?.as_str().into()),
    },
    RecordField {
        label: "Form Type",
        field_type: FieldType::Text,
        direction: Direction::NotComparable,
        read: |e| Some(e.policy_metadata.as_ref()?.form_type?.as_str().into()),
    },
    RecordField {
        label: "Total Premium",
        field_type: FieldType::Currency,
        direction: Direction::LowerIsBetter,
        read: |e| number(Some(e.premium_breakdown.as_ref()?.total_premium)),
    },
    RecordField {
        label: "Taxes",
        field_type: FieldType::Currency,
        direction: Direction::LowerIsBetter,
        read: |e| number(e.premium_breakdown.as_ref()?.taxes),
    },
    RecordField {
        label: "Fees",
        field_type: FieldType::Currency,
        direction: Direction::LowerIsBetter,
        read: |e| number(e.premium_breakdown.as_ref()?.fees),
    },
];

impl RecordField {
    fn compare(&self, category: RowCategory, extractions: &[QuoteExtraction]) -> ComparisonRow {
        let spec = FieldSpec::new(self.label, category, self.field_type, self.direction);
        let values: Vec<Option<RawValue>> = extractions.iter().map(self.read).collect();
        compare_field(&spec, &values)
    }
}

/// Label for a coverage sub-field row, e.g. `General Liability – Limit`.
pub fn coverage_row_label(kind: CoverageType, suffix: &str) -> String {
    format!("{} \u{2013} {}", kind.label(), suffix)
}

/// Coverage categories present in at least one quote, in canonical order.
pub fn coverage_union(extractions: &[QuoteExtraction]) -> Vec<CoverageType> {
    CoverageType::ALL
        .into_iter()
        .filter(|&kind| extractions.iter().any(|e| e.has_coverage(kind)))
        .collect()
}

/// Build the full ordered comparison table body.
pub fn build_comparison_rows(extractions: &[QuoteExtraction]) -> Vec<ComparisonRow> {
    let mut rows: Vec<ComparisonRow> = BASIC_FIELDS
        .iter()
        .map(|f| f.compare(RowCategory::Basic, extractions))
        .collect();

    rows.extend(coverage_rows(extractions));

    rows.extend(
        SUMMARY_FIELDS
            .iter()
            .map(|f| f.compare(RowCategory::Summary, extractions)),
    );
    rows
}

fn coverage_rows(extractions: &[QuoteExtraction]) -> Vec<ComparisonRow> {
    let mut rows = Vec::new();
    for kind in coverage_union(extractions) {
        for field in COVERAGE_FIELDS {
            let values: Vec<Option<RawValue>> = extractions
                .iter()
                .map(|e| number(e.coverage(kind).and_then(field.read)))
                .collect();
            if values.iter().all(Option::is_none) {
                continue;
            }
            let spec = FieldSpec::new(
                coverage_row_label(kind, field.suffix),
                RowCategory::Coverage,
                FieldType::Currency,
                field.direction,
            )
            .for_coverage(kind);
            rows.push(compare_field(&spec, &values));
        }
    }
    rows
}

/// Rows for carrier, policy-form and premium detail (v2/v3 data).
///
/// Each row is emitted only when at least one quote has a value for it.
pub fn build_detail_rows(extractions: &[QuoteExtraction]) -> Vec<ComparisonRow> {
    DETAIL_FIELDS
        .iter()
        .map(|f| f.compare(RowCategory::Detail, extractions))
        .filter(|row| row.values.iter().any(|v| v.is_found()))
        .collect()
}
