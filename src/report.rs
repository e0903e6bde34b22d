//! Plain-text rendering of a [`CalculationResult`].
//!
//! Everything printed here is read from the result; nothing is recomputed.

use std::fmt;

use rust_decimal::Decimal;

use crate::types::{CalculationResult, ItemBreakdown};

const RULE_WIDTH: usize = 72;

/// Display adapter producing the full text report.
pub struct TextReport<'a>(pub &'a CalculationResult);

/// Renders the summary, the per-type totals and the itemised audit trail.
pub fn render_text(result: &CalculationResult) -> String {
    TextReport(result).to_string()
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let result = self.0;
        let snap = &result.snapshot;
        let base = result.base_currency();

        writeln!(f, "Zakat Report {} ({})", result.id, result.timestamp.format("%Y-%m-%d %H:%M UTC"))?;
        writeln!(f, "{:=<width$}", "", width = RULE_WIDTH)?;

        let summary = [
            ("Gross assets", snap.gross_assets),
            ("Deductions", snap.deductions_total),
            ("Net assets", snap.net_assets),
            ("Nisab", snap.nisab_value),
            ("Zakat due", snap.zakat_due),
        ];
        for (label, amount) in summary {
            writeln!(f, "  {:<20} {:>18} {}", label, money(amount), base)?;
        }
        writeln!(f, "  {:<20} {:>18}", "Status", snap.status)?;
        writeln!(
            f,
            "  {:<20} {:>18} ({} days)",
            "Next due date",
            snap.due_date.gregorian.format("%Y-%m-%d").to_string(),
            snap.due_date.days_remaining
        )?;

        if !snap.breakdown.by_type.is_empty() {
            writeln!(f)?;
            writeln!(f, "By asset type")?;
            writeln!(f, "{:-<width$}", "", width = RULE_WIDTH)?;

            let mut by_type: Vec<_> = snap.breakdown.by_type.iter().collect();
            by_type.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
            for (asset_type, amount) in by_type {
                writeln!(f, "  {:<20} {:>18} {}", asset_type.to_string(), money(*amount), base)?;
            }
        }

        if !snap.breakdown.items.is_empty() {
            writeln!(f)?;
            writeln!(f, "Items")?;
            writeln!(f, "{:-<width$}", "", width = RULE_WIDTH)?;
            for row in &snap.breakdown.items {
                write_item(f, row, &base.to_string())?;
            }
        }

        Ok(())
    }
}

fn write_item(f: &mut fmt::Formatter<'_>, row: &ItemBreakdown, base: &str) -> fmt::Result {
    let marker = if row.included { "+" } else { "-" };
    let original = match row.original_currency {
        Some(currency) => format!("{} {}", money(row.original_value), currency),
        None => money(row.original_value),
    };

    writeln!(f, "  {} {} [{}]", marker, row.label, row.asset_type)?;
    writeln!(
        f,
        "      {:<18} -> {:>14} {}  {}",
        original,
        money(row.converted_value),
        base,
        if row.included { "included" } else { "excluded" }
    )?;
    writeln!(f, "      {}", row.reason)
}

fn money(amount: Decimal) -> String {
    format!("{:.2}", amount)
}
