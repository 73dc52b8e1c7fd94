//! Error types for Finsight

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Required columns are absent from an uploaded sheet
    #[error("Missing required column(s): {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Advisor request failed: {0}")]
    AdvisorClient(String),

    /// A running total left the exact decimal range
    #[error("Amount total out of range: {0}")]
    Overflow(String),

    #[error("No transaction data uploaded yet")]
    NoDataset,

    #[error("Unsupported file format: {0} (expected .csv or .xlsx)")]
    UnsupportedFormat(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::XlsxError),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::AdvisorClient(format!("request timed out: {}", err))
        } else if err.is_connect() {
            Self::AdvisorClient(format!("connection failed: {}", err))
        } else if err.is_decode() {
            Self::AdvisorClient(format!("malformed response: {}", err))
        } else {
            Self::AdvisorClient(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
