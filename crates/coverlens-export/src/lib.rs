//! Renderer-facing adapters for comparison tables: CSV text, PDF one-pager
//! inputs, and an Arrow record batch.

pub mod columnar;
pub mod csv;
pub mod error;
pub mod pdf;

pub use columnar::{comparison_batch, comparison_schema};
pub use csv::{csv_filename, escape_csv, generate_csv_content, parse_csv, unescape_csv};
pub use error::ExportError;
pub use pdf::{AgencyBranding, OnePagerInput, build_one_pager};
