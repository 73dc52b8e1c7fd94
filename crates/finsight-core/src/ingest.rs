//! Spreadsheet ingestion (CSV and XLSX) into validated transaction rows
//!
//! Both formats go through the same header check: `Category` and `Amount` are
//! required, `Detail` and `Month` are optional. A sheet missing a required
//! column is rejected with [`Error::Schema`] before any row is read.
//!
//! Every other column is kept as cell text so the advisor preview shows the
//! sheet as uploaded. XLSX date cells become ISO dates (`2024-01-05`), or a
//! `YYYY-MM` label in the `Month` column.

use std::io::{Cursor, Read};
use std::path::Path;
use std::str::FromStr;

use calamine::{Data, DataType, Reader, Xlsx};
use chrono::NaiveTime;
use csv::ReaderBuilder;
use rust_decimal::Decimal;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Category, Dataset, TransactionRow};

pub const CATEGORY_COLUMN: &str = "Category";
pub const AMOUNT_COLUMN: &str = "Amount";
pub const DETAIL_COLUMN: &str = "Detail";
pub const MONTH_COLUMN: &str = "Month";

/// Columns every sheet must carry
pub const REQUIRED_COLUMNS: [&str; 2] = [CATEGORY_COLUMN, AMOUNT_COLUMN];

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Xlsx,
}

impl SheetFormat {
    /// Detect the format from a file name's extension
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(Error::UnsupportedFormat(file_name.to_string())),
        }
    }
}

/// Parse an uploaded file, dispatching on its extension
pub fn parse_upload(file_name: &str, data: &[u8]) -> Result<Dataset> {
    match SheetFormat::from_file_name(file_name)? {
        SheetFormat::Csv => parse_csv(data, file_name),
        SheetFormat::Xlsx => parse_xlsx(data, file_name),
    }
}

/// Read and parse a file from disk
pub fn parse_file(path: &Path) -> Result<Dataset> {
    let data = std::fs::read(path)?;
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    parse_upload(name, &data)
}

/// Parse CSV data into a dataset
pub fn parse_csv<R: Read>(reader: R, source: &str) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = header_names(rdr.headers()?.iter());
    let columns = ColumnMap::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        let cells: Vec<&str> = record.iter().collect();
        // Header is line 1
        if let Some(row) = columns.build_row(&cells, index + 2)? {
            rows.push(row);
        }
    }

    debug!(source = %source, rows = rows.len(), "Parsed CSV sheet");
    Ok(Dataset::from_sheet(source, headers, rows))
}

/// Parse XLSX data (first worksheet) into a dataset
pub fn parse_xlsx(data: &[u8], source: &str) -> Result<Dataset> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(data))?;

    let first_sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| Error::Import("Workbook has no worksheets".into()))?;

    let range = workbook.worksheet_range(&first_sheet)?;

    let mut sheet_rows = range.rows();

    let headers = match sheet_rows.next() {
        Some(header) => header_names(header.iter().map(|cell| cell_text(cell, false))),
        None => Vec::new(),
    };
    let columns = ColumnMap::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (index, sheet_row) in sheet_rows.enumerate() {
        let texts: Vec<String> = sheet_row
            .iter()
            .enumerate()
            .map(|(i, cell)| cell_text(cell, columns.month == Some(i)))
            .collect();
        let cells: Vec<&str> = texts.iter().map(String::as_str).collect();
        if let Some(row) = columns.build_row(&cells, index + 2)? {
            rows.push(row);
        }
    }

    debug!(source = %source, sheet = %first_sheet, rows = rows.len(), "Parsed XLSX sheet");
    Ok(Dataset::from_sheet(source, headers, rows))
}

fn header_names<I, S>(cells: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cells
        .into_iter()
        .map(|cell| cell.as_ref().trim().to_string())
        .collect()
}

/// Text of one XLSX cell, matching what the same sheet saved as CSV holds
///
/// Date cells would otherwise print as Excel serial numbers.
fn cell_text(cell: &Data, month_column: bool) -> String {
    match cell {
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(dt) if month_column => dt.format("%Y-%m").to_string(),
            Some(dt) if dt.time() == NaiveTime::MIN => dt.format("%Y-%m-%d").to_string(),
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => cell.to_string(),
        },
        _ => cell.to_string(),
    }
}

/// Positions of the known columns in a sheet's header
#[derive(Debug, Clone, Copy)]
struct ColumnMap {
    category: usize,
    amount: usize,
    detail: Option<usize>,
    month: Option<usize>,
    width: usize,
}

impl ColumnMap {
    fn from_headers(headers: &[String]) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| find(name).is_none())
            .map(|name| name.to_string())
            .collect();

        match (find(CATEGORY_COLUMN), find(AMOUNT_COLUMN)) {
            (Some(category), Some(amount)) => Ok(Self {
                category,
                amount,
                detail: find(DETAIL_COLUMN),
                month: find(MONTH_COLUMN),
                width: headers.len(),
            }),
            _ => Err(Error::Schema { missing }),
        }
    }

    /// Build a row from raw cells; fully blank lines are skipped
    ///
    /// The row keeps one trimmed cell per header column.
    fn build_row(&self, cells: &[&str], line: usize) -> Result<Option<TransactionRow>> {
        if cells.iter().all(|c| c.trim().is_empty()) {
            return Ok(None);
        }

        let cell = |index: usize| cells.get(index).map(|c| c.trim()).unwrap_or("");
        let optional = |index: Option<usize>| {
            index
                .map(cell)
                .filter(|c| !c.is_empty())
                .map(String::from)
        };

        let raw_amount = cell(self.amount);
        let amount = parse_amount(raw_amount).ok_or_else(|| {
            Error::Import(format!("Row {}: unable to parse amount '{}'", line, raw_amount))
        })?;

        Ok(Some(TransactionRow {
            category: Category::from_label(cell(self.category)),
            detail: optional(self.detail),
            amount,
            month: optional(self.month),
            cells: (0..self.width).map(|i| cell(i).to_string()).collect(),
        }))
    }
}

/// Parse an amount string, handling currency symbols and separators
///
/// A blank cell counts as zero.
fn parse_amount(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    let cleaned: String = trimmed
        .trim_start_matches("Rp")
        .trim_start_matches("IDR")
        .replace(['$', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    if cleaned.is_empty() {
        return Some(Decimal::ZERO);
    }

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}
