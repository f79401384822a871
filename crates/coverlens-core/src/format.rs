//! Display formatting for comparison cells.
//!
//! Currency renders as US dollars with thousands separators and cents only
//! when the amount has them: `1000000.0` → `$1,000,000`, `1234.5` → `$1,234.50`.
//! Dates render as `M/D/YYYY`; anything unparseable passes through untouched.

use chrono::{Datelike, NaiveDate};

/// Shown in place of a value the document did not state.
pub const NOT_FOUND_DISPLAY: &str = "\u{2014}";

/// Amounts at or above this many dollars render without cents; past it an
/// `f64` no longer holds whole cents exactly.
pub const MAX_CENTS_PRECISION: f64 = 1e13;

pub fn format_currency(amount: f64) -> String {
    let abs = amount.abs();
    let (dollars, cents) = if abs < MAX_CENTS_PRECISION {
        let cents_total = (abs * 100.0).round() as u64;
        ((cents_total / 100).to_string(), cents_total % 100)
    } else {
        (format!("{:.0}", abs.trunc()), 0)
    };

    let mut out = String::new();
    if amount < 0.0 && (cents > 0 || dollars != "0") {
        out.push('-');
    }
    out.push('$');
    out.push_str(&group_thousands(&dollars));
    if cents > 0 {
        out.push_str(&format!(".{cents:02}"));
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Parse the date shapes extraction output is known to contain.
///
/// Accepts `YYYY-MM-DD` (optionally followed by a time part) and `MM/DD/YYYY`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Some(prefix) = s.get(..10)
        && let Ok(d) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d")
    {
        return Some(d);
    }
    NaiveDate::parse_from_str(s, "%m/%d/%Y").ok()
}

pub fn format_date(s: &str) -> String {
    match parse_date(s) {
        Some(d) => format!("{}/{}/{}", d.month(), d.day(), d.year()),
        None => s.to_string(),
    }
}
