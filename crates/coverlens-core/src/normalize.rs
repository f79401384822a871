//! Normalisation of raw extraction JSON into a canonical [`QuoteExtraction`].
//!
//! Extraction records are stored exactly as the pipeline produced them, so a
//! record may come from any schema generation. This pass absorbs all of them:
//!
//! - absent or `null` optional fields become `None` / empty lists
//! - a present field of the wrong type is an error, except that legacy numeric
//!   fields (`annualPremium`, coverage `limit` and `deductible`,
//!   `deductibles[].amount`) also accept numeric-looking strings such as
//!   `"$1,000,000"`
//! - unknown coverage categories are an error
//! - a missing `extractionVersion` means version 1
//!
//! Every problem in the record is collected before failing, and a record
//! with any problem is rejected whole.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::coverage::CoverageType;
use crate::extraction::{
    CarrierInfo, CoverageItem, CoveragePremium, DeductibleItem, Endorsement, LEGACY_EXTRACTION_VERSION,
    PolicyMetadata, PremiumBreakdown, QuoteExtraction,
};

/// What was wrong with one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    Missing,
    WrongType { expected: &'static str },
    Unrecognized { value: String },
}

/// A single offending field, addressed by its JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    /// e.g. `coverages[2].type`; `$` for the record itself.
    pub path: String,
    pub kind: IssueKind,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::Missing => write!(f, "{}: required field is missing", self.path),
            IssueKind::WrongType { expected } => write!(f, "{}: expected {expected}", self.path),
            IssueKind::Unrecognized { value } => {
                write!(f, "{}: unrecognized value {value}", self.path)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("invalid extraction: {}", join_issues(.0))]
    Invalid(Vec<FieldIssue>),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NormalizeError {
    /// The offending fields, empty for parse errors.
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            Self::Invalid(issues) => issues,
            Self::Json(_) => &[],
        }
    }
}

fn join_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl QuoteExtraction {
    /// Parse extraction JSON text and normalise it.
    pub fn from_json_str(s: &str) -> Result<Self, NormalizeError> {
        let value: Value = serde_json::from_str(s)?;
        normalize_extraction(&value)
    }
}

/// Normalise one raw extraction record.
pub fn normalize_extraction(raw: &Value) -> Result<QuoteExtraction, NormalizeError> {
    let mut reader = Reader::default();
    let extraction = reader.extraction(raw);
    match extraction {
        Some(ext) if reader.issues.is_empty() => {
            debug!(
                version = ext.extraction_version,
                coverages = ext.coverages.len(),
                endorsements = ext.endorsements.len(),
                "normalized extraction"
            );
            Ok(ext)
        }
        _ => {
            warn!(issues = reader.issues.len(), "rejected extraction record");
            Err(NormalizeError::Invalid(reader.issues))
        }
    }
}

/// Normalise a batch, reporting every issue across all records.
///
/// Issue paths are prefixed with the record position, e.g. `[1].coverages[0].type`.
pub fn normalize_all(raws: &[Value]) -> Result<Vec<QuoteExtraction>, NormalizeError> {
    let mut out = Vec::with_capacity(raws.len());
    let mut issues = Vec::new();
    for (i, raw) in raws.iter().enumerate() {
        match normalize_extraction(raw) {
            Ok(ext) => out.push(ext),
            Err(e) => issues.extend(e.issues().iter().map(|issue| FieldIssue {
                path: if issue.path == "$" {
                    format!("[{i}]")
                } else {
                    format!("[{i}].{}", issue.path)
                },
                kind: issue.kind.clone(),
            })),
        }
    }
    if issues.is_empty() {
        Ok(out)
    } else {
        Err(NormalizeError::Invalid(issues))
    }
}

/// Parse a numeric-looking legacy string: `"1000000"`, `"$1,000,000"`, `"-2500.50"`.
///
/// A sign may sit either side of the `$`. Commas must separate whole groups
/// of three digits; no other separators are accepted.
pub fn parse_numeric_str(s: &str) -> Option<f64> {
    let s = s.trim();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let s = s.strip_prefix('$').unwrap_or(s);
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) if !negative => (true, rest),
        Some(_) => return None,
        None => (negative, s),
    };

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (s, None),
    };
    let digits = whole_digits(whole)?;
    let mut text = String::with_capacity(s.len() + 1);
    if negative {
        text.push('-');
    }
    text.push_str(&digits);
    if let Some(f) = frac {
        if f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        text.push('.');
        text.push_str(f);
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Digits of the integer part, with thousands separators removed.
fn whole_digits(whole: &str) -> Option<String> {
    let is_digits = |g: &str| !g.is_empty() && g.bytes().all(|b| b.is_ascii_digit());
    if !whole.contains(',') {
        return is_digits(whole).then(|| whole.to_string());
    }
    let mut groups = whole.split(',');
    let lead = groups.next()?;
    if !is_digits(lead) || lead.len() > 3 {
        return None;
    }
    let mut out = lead.to_string();
    for group in groups {
        if group.len() != 3 || !is_digits(group) {
            return None;
        }
        out.push_str(group);
    }
    Some(out)
}

// ── Field reader ──

/// Whether a numeric field predates strict typing in the extraction pipeline.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Numeric {
    Strict,
    Legacy,
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{path}.{key}")
    }
}

/// Collects issues while walking a raw record.
#[derive(Default)]
struct Reader {
    issues: Vec<FieldIssue>,
}

impl Reader {
    fn issue(&mut self, path: String, kind: IssueKind) {
        self.issues.push(FieldIssue { path, kind });
    }

    fn wrong_type(&mut self, path: String, expected: &'static str) {
        self.issue(path, IssueKind::WrongType { expected });
    }

    /// Fetch a key, folding JSON `null` into absence.
    fn get<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
        obj.get(key).filter(|v| !v.is_null())
    }

    fn extraction(&mut self, raw: &Value) -> Option<QuoteExtraction> {
        let Some(obj) = raw.as_object() else {
            self.wrong_type("$".into(), "an object");
            return None;
        };
        let path = "";

        Some(QuoteExtraction {
            carrier_name: self.opt_string(obj, "carrierName", path),
            policy_number: self.opt_string(obj, "policyNumber", path),
            named_insured: self.opt_string(obj, "namedInsured", path),
            effective_date: self.opt_string(obj, "effectiveDate", path),
            expiration_date: self.opt_string(obj, "expirationDate", path),
            annual_premium: self.opt_number(obj, "annualPremium", path, Numeric::Legacy),
            coverages: self.object_list(obj, "coverages", path, Self::coverage),
            exclusions: self.string_list(obj, "exclusions", path),
            deductibles: self.object_list(obj, "deductibles", path, Self::deductible),
            policy_metadata: self.opt_object(obj, "policyMetadata", path, Self::policy_metadata),
            endorsements: self.object_list(obj, "endorsements", path, Self::endorsement),
            carrier_info: self.opt_object(obj, "carrierInfo", path, Self::carrier_info),
            premium_breakdown: self.opt_object(
                obj,
                "premiumBreakdown",
                path,
                Self::premium_breakdown,
            ),
            extraction_version: self.version(obj),
        })
    }

    fn version(&mut self, obj: &Map<String, Value>) -> u32 {
        match Self::get(obj, "extractionVersion") {
            None => LEGACY_EXTRACTION_VERSION,
            Some(v) => match v.as_u64().and_then(|n| u32::try_from(n).ok()) {
                Some(n) if n >= 1 => n,
                _ => {
                    self.wrong_type("extractionVersion".into(), "a positive integer");
                    LEGACY_EXTRACTION_VERSION
                }
            },
        }
    }

    fn coverage(&mut self, obj: &Map<String, Value>, path: &str) -> Option<CoverageItem> {
        let coverage_type = self.req_enum::<CoverageType>(obj, "type", path);
        let name = self.req_string(obj, "name", path);
        let description = self.opt_string(obj, "description", path);
        let source_pages = self.page_list(obj, "sourcePages", path);
        let limit = self.opt_number(obj, "limit", path, Numeric::Legacy);
        let sublimit = self.opt_number(obj, "sublimit", path, Numeric::Strict);
        let limit_type = self.opt_enum(obj, "limitType", path);
        let deductible = self.opt_number(obj, "deductible", path, Numeric::Legacy);
        let aggregate_limit = self.opt_number(obj, "aggregateLimit", path, Numeric::Strict);
        let self_insured_retention =
            self.opt_number(obj, "selfInsuredRetention", path, Numeric::Strict);
        let coinsurance = self.opt_number(obj, "coinsurance", path, Numeric::Strict);
        let waiting_period = self.opt_string(obj, "waitingPeriod", path);
        let indemnity_period = self.opt_string(obj, "indemnityPeriod", path);
        Some(CoverageItem {
            coverage_type: coverage_type?,
            name: name?,
            description,
            source_pages,
            limit,
            sublimit,
            limit_type,
            deductible,
            aggregate_limit,
            self_insured_retention,
            coinsurance,
            waiting_period,
            indemnity_period,
        })
    }

    fn deductible(&mut self, obj: &Map<String, Value>, path: &str) -> Option<DeductibleItem> {
        let kind = self.req_string(obj, "type", path);
        let amount = self.opt_number(obj, "amount", path, Numeric::Legacy);
        let applies_to = self.opt_string(obj, "appliesTo", path);
        Some(DeductibleItem {
            kind: kind?,
            amount,
            applies_to,
        })
    }

    fn endorsement(&mut self, obj: &Map<String, Value>, path: &str) -> Option<Endorsement> {
        let form_number = self.req_string(obj, "formNumber", path);
        let name = self.req_string(obj, "name", path);
        let endorsement_type = self.req_enum(obj, "type", path);
        let description = self.req_string(obj, "description", path);
        let affected_coverage = self.opt_string(obj, "affectedCoverage", path);
        let source_pages = self.page_list(obj, "sourcePages", path);
        Some(Endorsement {
            form_number: form_number?,
            name: name?,
            endorsement_type: endorsement_type?,
            description: description?,
            affected_coverage,
            source_pages,
        })
    }

    fn policy_metadata(&mut self, obj: &Map<String, Value>, path: &str) -> Option<PolicyMetadata> {
        Some(PolicyMetadata {
            form_type: self.opt_enum(obj, "formType", path),
            form_numbers: self.string_list(obj, "formNumbers", path),
            policy_type: self.opt_enum(obj, "policyType", path),
            retro_date: self.opt_string(obj, "retroDate", path),
            extended_reporting_period: self.opt_string(obj, "extendedReportingPeriod", path),
            audit_type: self.opt_enum(obj, "auditType", path),
            source_pages: self.page_list(obj, "sourcePages", path),
        })
    }

    fn carrier_info(&mut self, obj: &Map<String, Value>, path: &str) -> Option<CarrierInfo> {
        Some(CarrierInfo {
            am_best_rating: self.opt_string(obj, "amBestRating", path),
            am_best_financial_size: self.opt_string(obj, "amBestFinancialSize", path),
            naic_code: self.opt_string(obj, "naicCode", path),
            admitted_status: self.opt_enum(obj, "admittedStatus", path),
            claims_phone: self.opt_string(obj, "claimsPhone", path),
            underwriter: self.opt_string(obj, "underwriter", path),
        })
    }

    fn premium_breakdown(
        &mut self,
        obj: &Map<String, Value>,
        path: &str,
    ) -> Option<PremiumBreakdown> {
        let base_premium = self.opt_number(obj, "basePremium", path, Numeric::Strict);
        let coverage_premiums = self.object_list(obj, "coveragePremiums", path, Self::coverage_premium);
        let taxes = self.opt_number(obj, "taxes", path, Numeric::Strict);
        let fees = self.opt_number(obj, "fees", path, Numeric::Strict);
        let broker_fee = self.opt_number(obj, "brokerFee", path, Numeric::Strict);
        let surplus_lines_tax = self.opt_number(obj, "surplusLinesTax", path, Numeric::Strict);
        let total_premium = self.req_number(obj, "totalPremium", path);
        let payment_plan = self.opt_string(obj, "paymentPlan", path);
        Some(PremiumBreakdown {
            base_premium,
            coverage_premiums,
            taxes,
            fees,
            broker_fee,
            surplus_lines_tax,
            total_premium: total_premium?,
            payment_plan,
        })
    }

    fn coverage_premium(&mut self, obj: &Map<String, Value>, path: &str) -> Option<CoveragePremium> {
        let coverage = self.req_string(obj, "coverage", path);
        let premium = self.req_number(obj, "premium", path);
        Some(CoveragePremium {
            coverage: coverage?,
            premium: premium?,
        })
    }

    // ── Scalars ──

    fn opt_string(&mut self, obj: &Map<String, Value>, key: &str, path: &str) -> Option<String> {
        match Self::get(obj, key)? {
            Value::String(s) => Some(s.clone()),
            _ => {
                self.wrong_type(child(path, key), "a string");
                None
            }
        }
    }

    fn req_string(&mut self, obj: &Map<String, Value>, key: &str, path: &str) -> Option<String> {
        if Self::get(obj, key).is_none() {
            self.issue(child(path, key), IssueKind::Missing);
            return None;
        }
        self.opt_string(obj, key, path)
    }

    fn opt_number(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        path: &str,
        numeric: Numeric,
    ) -> Option<f64> {
        match Self::get(obj, key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) if numeric == Numeric::Legacy => match parse_numeric_str(s) {
                Some(v) => Some(v),
                None => {
                    self.wrong_type(child(path, key), "a number or numeric string");
                    None
                }
            },
            _ => {
                let expected = match numeric {
                    Numeric::Legacy => "a number or numeric string",
                    Numeric::Strict => "a number",
                };
                self.wrong_type(child(path, key), expected);
                None
            }
        }
    }

    fn req_number(&mut self, obj: &Map<String, Value>, key: &str, path: &str) -> Option<f64> {
        if Self::get(obj, key).is_none() {
            self.issue(child(path, key), IssueKind::Missing);
            return None;
        }
        self.opt_number(obj, key, path, Numeric::Strict)
    }

    fn opt_enum<T: DeserializeOwned>(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<T> {
        let value = Self::get(obj, key)?;
        if !value.is_string() {
            self.wrong_type(child(path, key), "a string");
            return None;
        }
        match serde_json::from_value::<T>(value.clone()) {
            Ok(v) => Some(v),
            Err(_) => {
                self.issue(
                    child(path, key),
                    IssueKind::Unrecognized {
                        value: value.to_string(),
                    },
                );
                None
            }
        }
    }

    fn req_enum<T: DeserializeOwned>(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<T> {
        if Self::get(obj, key).is_none() {
            self.issue(child(path, key), IssueKind::Missing);
            return None;
        }
        self.opt_enum(obj, key, path)
    }

    // ── Lists ──

    fn array<'a>(
        &mut self,
        obj: &'a Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<&'a Vec<Value>> {
        match Self::get(obj, key)? {
            Value::Array(items) => Some(items),
            _ => {
                self.wrong_type(child(path, key), "an array");
                None
            }
        }
    }

    fn string_list(&mut self, obj: &Map<String, Value>, key: &str, path: &str) -> Vec<String> {
        let Some(items) = self.array(obj, key, path) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item {
                Value::String(s) => out.push(s.clone()),
                _ => self.wrong_type(format!("{}[{i}]", child(path, key)), "a string"),
            }
        }
        out
    }

    fn page_list(&mut self, obj: &Map<String, Value>, key: &str, path: &str) -> Vec<u32> {
        let Some(items) = self.array(obj, key, path) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match item.as_u64().and_then(|n| u32::try_from(n).ok()) {
                Some(page) => out.push(page),
                None => self.wrong_type(
                    format!("{}[{i}]", child(path, key)),
                    "a non-negative page number",
                ),
            }
        }
        out
    }

    fn object_list<T>(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        path: &str,
        mut read: impl FnMut(&mut Self, &Map<String, Value>, &str) -> Option<T>,
    ) -> Vec<T> {
        let Some(items) = self.array(obj, key, path) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let item_path = format!("{}[{i}]", child(path, key));
            match item.as_object() {
                Some(item_obj) => {
                    if let Some(v) = read(self, item_obj, &item_path) {
                        out.push(v);
                    }
                }
                None => self.wrong_type(item_path, "an object"),
            }
        }
        out
    }

    fn opt_object<T>(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        path: &str,
        read: impl FnOnce(&mut Self, &Map<String, Value>, &str) -> Option<T>,
    ) -> Option<T> {
        match Self::get(obj, key)? {
            Value::Object(inner) => read(self, inner, &child(path, key)),
            _ => {
                self.wrong_type(child(path, key), "an object");
                None
            }
        }
    }
}
