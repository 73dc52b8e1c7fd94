//! Summary report command

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use finsight_core::{dashboard, format_currency, parse_file, DashboardReport, DEFAULT_CURRENCY};
use rust_decimal::Decimal;

use super::truncate;

const RULE: &str = "   ─────────────────────────────────────────────────────────────";

pub fn cmd_summary(file: &Path) -> Result<()> {
    let dataset =
        parse_file(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let report = dashboard(&dataset)?;
    print!("{}", render_summary(&report));
    Ok(())
}

/// Render the dashboard as terminal text
pub fn render_summary(report: &DashboardReport) -> String {
    let money = |amount: Decimal| format_currency(amount, DEFAULT_CURRENCY);
    let mut out = String::new();

    let _ = writeln!(out);
    let _ = writeln!(out, "📊 Financial Summary");
    let _ = writeln!(out, "   Source: {} ({} rows)", report.source, report.row_count);
    let _ = writeln!(out, "{}", RULE);
    let summary = &report.summary;
    let _ = writeln!(out, "   {:<16} {:>20}", "Total income", money(summary.total_income));
    let _ = writeln!(out, "   {:<16} {:>20}", "Total expense", money(summary.total_expense));
    let _ = writeln!(out, "   {:<16} {:>20}", "Net cash", money(summary.net_cash));

    let _ = writeln!(out);
    let _ = writeln!(out, "🧾 Expenses by detail");
    let _ = writeln!(out, "{}", RULE);
    if report.expense_breakdown.is_empty() {
        let _ = writeln!(out, "   No expense details found.");
    } else {
        let total = report.expense_breakdown.total().filter(|t| !t.is_zero());
        for (detail, amount) in report.expense_breakdown.sorted_by_amount() {
            let share = total
                .and_then(|total| amount.checked_div(total))
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .map(|percent| format!("{:>5.1}%", percent))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "   {:<24} {:>20}  {}",
                truncate(detail, 24),
                money(amount),
                share
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "📈 Monthly trend");
    let _ = writeln!(out, "{}", RULE);
    let points = report.monthly_series.chronological();
    if points.is_empty() {
        let _ = writeln!(out, "   No month column found.");
    } else {
        for point in points {
            let month = truncate(&point.month, 24);
            let _ = writeln!(out, "   {:<24} {:>20}", month, money(point.amount));
        }
    }

    out
}
