//! Aggregations over uploaded transaction rows
//!
//! Amounts are exact decimals, so results do not depend on row order. Any
//! finite slice (including an empty one) produces a value unless a running
//! total leaves the decimal range, which is reported as [`Error::Overflow`].

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{
    DashboardReport, Dataset, ExpenseBreakdown, FinancialSummary, MonthlySeries, TransactionRow,
};

fn add(total: &mut Decimal, amount: Decimal, what: impl FnOnce() -> String) -> Result<()> {
    *total = total
        .checked_add(amount)
        .ok_or_else(|| Error::Overflow(what()))?;
    Ok(())
}

/// Income, expense and net cash over all rows
pub fn summarize(rows: &[TransactionRow]) -> Result<FinancialSummary> {
    let mut total_income = Decimal::ZERO;
    let mut total_expense = Decimal::ZERO;

    for row in rows {
        if row.category.is_income() {
            add(&mut total_income, row.amount, || "total income".into())?;
        } else if row.category.is_expense() {
            add(&mut total_expense, row.amount, || "total expense".into())?;
        }
    }

    let net_cash = total_income
        .checked_sub(total_expense)
        .ok_or_else(|| Error::Overflow("net cash".to_string()))?;

    Ok(FinancialSummary {
        total_income,
        total_expense,
        net_cash,
    })
}

/// Expense totals per detail
///
/// Expense rows without a detail still count towards the expense total in
/// [`summarize`] but have no slice here.
pub fn breakdown_by_detail(rows: &[TransactionRow]) -> Result<ExpenseBreakdown> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();

    for row in rows.iter().filter(|r| r.category.is_expense()) {
        if let Some(detail) = &row.detail {
            let total = totals.entry(detail.clone()).or_default();
            add(total, row.amount, || format!("expenses for {}", detail))?;
        }
    }

    Ok(ExpenseBreakdown(totals))
}

/// Amount totals per month label, across every category
pub fn group_by_month(rows: &[TransactionRow]) -> Result<MonthlySeries> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();

    for row in rows {
        if let Some(month) = &row.month {
            let total = totals.entry(month.clone()).or_default();
            add(total, row.amount, || format!("amounts for {}", month))?;
        }
    }

    Ok(MonthlySeries(totals))
}

/// Build the full dashboard report for a dataset
pub fn dashboard(dataset: &Dataset) -> Result<DashboardReport> {
    let rows = dataset.rows();
    let report = DashboardReport {
        source: dataset.source.clone(),
        row_count: rows.len(),
        summary: summarize(rows)?,
        expense_breakdown: breakdown_by_detail(rows)?,
        monthly_series: group_by_month(rows)?,
    };

    debug!(
        source = %report.source,
        rows = report.row_count,
        details = report.expense_breakdown.len(),
        months = report.monthly_series.len(),
        "Built dashboard report"
    );

    Ok(report)
}
