//! Terminal rendering for quotes and comparisons.
//!
//! A single quote prints as a vertical card grouped into sections; empty
//! sections are skipped. Comparisons print through Arrow's table formatter.

use coverlens_compare::ComparisonTableData;
use coverlens_core::{CoverageItem, QuoteExtraction};
use coverlens_core::format::{format_currency, format_date};
use coverlens_export::comparison_batch;

const MAX_LIST_ITEMS: usize = 10;

type Section = Vec<(&'static str, String)>;

fn push_text(section: &mut Section, label: &'static str, value: Option<&str>) {
    if let Some(v) = value {
        section.push((label, v.to_string()));
    }
}

fn push_currency(section: &mut Section, label: &'static str, value: Option<f64>) {
    if let Some(v) = value {
        section.push((label, format_currency(v)));
    }
}

// ── Public API ──

/// Print a single normalized quote as a vertical card.
pub fn print_quote_card(quote: &QuoteExtraction, source: &str) {
    let title = quote.carrier_name.as_deref().unwrap_or(source);
    println!("=== {} ===", title);
    println!("extraction v{}", quote.extraction_version);
    println!();

    print_section("Policy", &policy_section(quote));
    print_section("Form", &form_section(quote));
    print_section("Carrier", &carrier_section(quote));
    print_section("Premium", &premium_section(quote));
    print_coverages(quote);
    print_list(
        "Endorsements",
        quote
            .endorsements
            .iter()
            .map(|e| format!("{:<16} {} ({})", e.form_number, e.name, e.endorsement_type.as_str())),
    );
    print_list("Exclusions", quote.exclusions.iter().cloned());
    print_list(
        "Deductibles",
        quote.deductibles.iter().map(|d| {
            let amount = d.amount.map(format_currency).unwrap_or_else(|| "-".into());
            match &d.applies_to {
                Some(to) => format!("{:<16} {} ({})", d.kind, amount, to),
                None => format!("{:<16} {}", d.kind, amount),
            }
        }),
    );
}

/// Print the aligned comparison followed by its findings.
pub fn print_comparison(table: &ComparisonTableData) -> anyhow::Result<()> {
    let batch = comparison_batch(table)?;
    let view = batch.project(&view_columns(table.headers.len()))?;
    println!("{}", arrow::util::pretty::pretty_format_batches(&[view])?);

    for (i, header) in table.headers.iter().enumerate() {
        println!("  quote_{:<20} {}", i + 1, header);
    }
    println!();

    if !table.gaps.is_empty() {
        println!("Gaps ({}):", table.gaps.len());
        for gap in &table.gaps {
            let missing: Vec<&str> = gap
                .documents_missing
                .iter()
                .filter_map(|&i| table.headers.get(i).map(String::as_str))
                .collect();
            println!(
                "  [{:<6}] {} missing in {}",
                gap.severity.as_str(),
                gap.field,
                missing.join(", ")
            );
        }
        println!();
    }

    if !table.conflicts.is_empty() {
        println!("Conflicts ({}):", table.conflicts.len());
        for conflict in &table.conflicts {
            println!("  [{:<6}] {}", conflict.severity.as_str(), conflict.description);
        }
        println!();
    }

    println!(
        "Risk score: {} ({})",
        table.risk_score,
        table.risk_level.as_str()
    );
    Ok(())
}

/// `field`, `best_index`, `worst_index`, then the quote columns.
fn view_columns(quotes: usize) -> Vec<usize> {
    let mut cols = vec![0, 4, 5];
    cols.extend(6..6 + quotes);
    cols
}

// ── Sections ──

fn policy_section(q: &QuoteExtraction) -> Section {
    let mut s = Section::new();
    push_text(&mut s, "policy_number", q.policy_number.as_deref());
    push_text(&mut s, "named_insured", q.named_insured.as_deref());
    if let Some(d) = &q.effective_date {
        s.push(("effective_date", format_date(d)));
    }
    if let Some(d) = &q.expiration_date {
        s.push(("expiration_date", format_date(d)));
    }
    push_currency(&mut s, "annual_premium", q.annual_premium);
    s
}

fn form_section(q: &QuoteExtraction) -> Section {
    let mut s = Section::new();
    let Some(meta) = &q.policy_metadata else {
        return s;
    };
    push_text(&mut s, "form_type", meta.form_type.map(|f| f.as_str()));
    if !meta.form_numbers.is_empty() {
        s.push(("form_numbers", meta.form_numbers.join(", ")));
    }
    push_text(&mut s, "policy_type", meta.policy_type.map(|p| p.as_str()));
    push_text(&mut s, "retro_date", meta.retro_date.as_deref());
    push_text(
        &mut s,
        "extended_reporting_period",
        meta.extended_reporting_period.as_deref(),
    );
    push_text(&mut s, "audit_type", meta.audit_type.map(|a| a.as_str()));
    s
}

fn carrier_section(q: &QuoteExtraction) -> Section {
    let mut s = Section::new();
    let Some(info) = &q.carrier_info else {
        return s;
    };
    push_text(&mut s, "am_best_rating", info.am_best_rating.as_deref());
    push_text(&mut s, "am_best_financial_size", info.am_best_financial_size.as_deref());
    push_text(&mut s, "naic_code", info.naic_code.as_deref());
    push_text(&mut s, "admitted_status", info.admitted_status.map(|a| a.as_str()));
    push_text(&mut s, "claims_phone", info.claims_phone.as_deref());
    push_text(&mut s, "underwriter", info.underwriter.as_deref());
    s
}

fn premium_section(q: &QuoteExtraction) -> Section {
    let mut s = Section::new();
    let Some(p) = &q.premium_breakdown else {
        return s;
    };
    push_currency(&mut s, "base_premium", p.base_premium);
    for cp in &p.coverage_premiums {
        s.push(("coverage_premium", format!("{} {}", cp.coverage, format_currency(cp.premium))));
    }
    push_currency(&mut s, "taxes", p.taxes);
    push_currency(&mut s, "fees", p.fees);
    push_currency(&mut s, "broker_fee", p.broker_fee);
    push_currency(&mut s, "surplus_lines_tax", p.surplus_lines_tax);
    s.push(("total_premium", format_currency(p.total_premium)));
    push_text(&mut s, "payment_plan", p.payment_plan.as_deref());
    s
}

// ── Rendering ──

fn print_section(header: &str, rows: &Section) {
    if rows.is_empty() {
        return;
    }
    println!("{header}");
    for (label, value) in rows {
        println!("  {:<26} {}", label, value);
    }
    println!();
}

fn print_coverages(q: &QuoteExtraction) {
    if q.coverages.is_empty() {
        return;
    }
    println!("Coverages ({}):", q.coverages.len());
    for c in q.coverages.iter().take(MAX_LIST_ITEMS) {
        println!("  {}", coverage_line(c));
        if c.name != c.coverage_type.label() {
            println!("      {}", c.name);
        }
    }
    if q.coverages.len() > MAX_LIST_ITEMS {
        println!("  ... and {} more", q.coverages.len() - MAX_LIST_ITEMS);
    }
    println!();
}

fn coverage_line(c: &CoverageItem) -> String {
    let kind = c.coverage_type;
    let mut line = format!(
        "{} {:<28} {:<10}",
        kind.icon(),
        kind.label(),
        kind.importance().as_str()
    );
    if let Some(limit) = c.limit {
        line.push_str(&format!("  limit {}", format_currency(limit)));
        if let Some(lt) = c.limit_type {
            line.push_str(&format!(" {}", lt.as_str()));
        }
    }
    if let Some(ded) = c.deductible {
        line.push_str(&format!("  ded {}", format_currency(ded)));
    }
    if let Some(sir) = c.self_insured_retention {
        line.push_str(&format!("  SIR {}", format_currency(sir)));
    }
    line.trim_end().to_string()
}

fn print_list(header: &str, items: impl ExactSizeIterator<Item = String>) {
    let len = items.len();
    if len == 0 {
        return;
    }
    println!("{header} ({len}):");
    for item in items.take(MAX_LIST_ITEMS) {
        println!("  {item}");
    }
    if len > MAX_LIST_ITEMS {
        println!("  ... and {} more", len - MAX_LIST_ITEMS);
    }
    println!();
}
