//! Core types for Coverlens: the canonical quote extraction record, the
//! coverage taxonomy, cell formatting, and normalisation of raw records.

pub mod coverage;
pub mod extraction;
pub mod format;
pub mod normalize;

pub use coverage::{COVERAGE_TYPE_COUNT, CoverageImportance, CoverageMeta, CoverageType};
pub use extraction::{
    AdmittedStatus, AuditType, CURRENT_EXTRACTION_VERSION, CarrierInfo, CoverageItem,
    CoveragePremium, DeductibleItem, Endorsement, EndorsementType, FormType, LimitType,
    PolicyMetadata, PolicyType, PremiumBreakdown, QuoteExtraction,
};
pub use normalize::{FieldIssue, IssueKind, NormalizeError, normalize_all, normalize_extraction};
