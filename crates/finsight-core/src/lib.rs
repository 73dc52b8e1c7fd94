//! Finsight Core Library
//!
//! Shared functionality for the Finsight personal finance dashboard:
//! - Spreadsheet ingestion (CSV and XLSX) into validated transaction rows
//! - Aggregations: summary, expense breakdown, monthly trend
//! - Advisor request building over a bounded data preview
//! - Pluggable chat-completion backends (Groq or any OpenAI-compatible server)
//! - Prompt library for customizable advisor prompts
//! - Explicit per-session state and command handlers

pub mod advisor;
pub mod aggregate;
pub mod ai;
pub mod config;
pub mod conversation;
pub mod error;
pub mod format;
pub mod ingest;
pub mod models;
pub mod preview;
pub mod prompts;
pub mod session;

/// Test utilities including a mock chat-completion server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advisor::{Advisor, RequestBuilder, DEFAULT_PREVIEW_ROWS};
pub use aggregate::{breakdown_by_detail, dashboard, group_by_month, summarize};
pub use ai::{
    AIClient, AdvisorBackend, AdvisorModel, AdvisorRequest, MockBackend,
    OpenAICompatibleBackend,
};
pub use config::{AdvisorConfig, BackendKind};
pub use conversation::Conversation;
pub use error::{Error, Result};
pub use format::{format_currency, DEFAULT_CURRENCY};
pub use ingest::{parse_csv, parse_file, parse_upload, parse_xlsx, SheetFormat};
pub use models::{
    Category, ChatMessage, DashboardReport, Dataset, ExpenseBreakdown, FinancialSummary,
    MonthlyPoint, MonthlySeries, Role, TransactionRow,
};
pub use preview::render_preview;
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
pub use session::{PendingExchange, Session};
