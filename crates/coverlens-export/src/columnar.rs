//! Arrow view of a comparison table, one record per row.

use std::collections::HashMap;
use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use coverlens_compare::ComparisonTableData;

use crate::error::ExportError;

/// Metadata key holding a quote column's display header.
pub const HEADER_METADATA_KEY: &str = "header";

pub fn quote_column_name(index: usize) -> String {
    format!("quote_{}", index + 1)
}

/// Schema for a table with `headers.len()` quote columns.
pub fn comparison_schema(headers: &[String]) -> Schema {
    let mut fields = vec![
        Field::new("field", DataType::Utf8, false),
        Field::new("category", DataType::Utf8, false),
        Field::new("field_type", DataType::Utf8, false),
        Field::new("has_difference", DataType::Boolean, false),
        Field::new("best_index", DataType::UInt32, true),
        Field::new("worst_index", DataType::UInt32, true),
    ];
    for (i, header) in headers.iter().enumerate() {
        fields.push(
            Field::new(quote_column_name(i), DataType::Utf8, false).with_metadata(HashMap::from([(
                HEADER_METADATA_KEY.to_string(),
                header.clone(),
            )])),
        );
    }
    Schema::new(fields)
}

pub fn comparison_batch(table: &ComparisonTableData) -> Result<RecordBatch, ExportError> {
    let n = table.headers.len();
    for row in &table.rows {
        if row.values.len() != n {
            return Err(ExportError::RowWidth {
                row: row.field.clone(),
                got: row.values.len(),
                expected: n,
            });
        }
    }

    let rows = &table.rows;
    let index = |i: Option<usize>| i.map(|i| i as u32);

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.field.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.category.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.field_type.as_str()))),
        Arc::new(BooleanArray::from(
            rows.iter().map(|r| r.has_difference).collect::<Vec<_>>(),
        )),
        Arc::new(UInt32Array::from(
            rows.iter().map(|r| index(r.best_index)).collect::<Vec<_>>(),
        )),
        Arc::new(UInt32Array::from(
            rows.iter().map(|r| index(r.worst_index)).collect::<Vec<_>>(),
        )),
    ];
    for q in 0..n {
        columns.push(Arc::new(StringArray::from_iter_values(
            rows.iter().map(|r| r.values[q].display.as_str()),
        )));
    }

    let schema = Arc::new(comparison_schema(&table.headers));
    Ok(RecordBatch::try_new(schema, columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use coverlens_compare::{ComparisonConfig, build_comparison_table};
    use coverlens_core::QuoteExtraction;

    fn table() -> ComparisonTableData {
        let quotes = [
            QuoteExtraction {
                carrier_name: Some("Alpha".into()),
                annual_premium: Some(6000.0),
                ..Default::default()
            },
            QuoteExtraction {
                annual_premium: Some(4500.0),
                ..Default::default()
            },
        ];
        build_comparison_table(&quotes, &["b.pdf".to_string()], &ComparisonConfig::default())
    }

    #[test]
    fn schema_has_fixed_and_quote_columns() {
        let schema = comparison_schema(&["A".into(), "B".into(), "C".into()]);
        assert_eq!(schema.fields().len(), 9);
        assert!(schema.field_with_name("best_index").is_ok());
        let q3 = schema.field_with_name("quote_3").unwrap();
        assert_eq!(q3.metadata().get(HEADER_METADATA_KEY).map(String::as_str), Some("C"));
    }

    #[test]
    fn batch_mirrors_rows() {
        let t = table();
        let batch = comparison_batch(&t).unwrap();
        assert_eq!(batch.num_rows(), t.rows.len());
        assert_eq!(batch.num_columns(), 8);

        let premium_row = t.rows.iter().position(|r| r.field == "Annual Premium").unwrap();
        let best = batch
            .column_by_name("best_index")
            .unwrap()
            .as_any()
            .downcast_ref::<UInt32Array>()
            .unwrap();
        assert_eq!(best.value(premium_row), 1);
        assert!(best.is_null(0));

        let q2 = batch
            .column_by_name("quote_2")
            .unwrap()
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(q2.value(0), "\u{2014}");
        assert_eq!(q2.value(premium_row), "$4,500");
    }

    #[test]
    fn ragged_row_is_rejected() {
        let mut t = table();
        t.rows[0].values.pop();
        let err = comparison_batch(&t).unwrap_err();
        assert!(matches!(err, ExportError::RowWidth { got: 1, expected: 2, .. }));
    }
}
