//! Integration tests for finsight-core
//!
//! These tests exercise the full upload → dashboard → advisor workflow.

use std::path::{Path, PathBuf};

use finsight_core::{
    dashboard, ingest::parse_csv, parse_file, render_preview, Advisor, AIClient, AdvisorModel,
    Category, Error, MockBackend, RequestBuilder, Role, Session, DEFAULT_PREVIEW_ROWS,
};
use rust_decimal_macros::dec;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// A small household sheet: two months, one income, a few expense details
fn household_csv() -> &'static str {
    "Month,Category,Detail,Amount\n\
     Jan,Income,Salary,\"5,000,000\"\n\
     Jan,Expense,Food,\"1,200,000\"\n\
     Jan,Expense,Transport,450000\n\
     Feb,Income,Salary,\"5,000,000\"\n\
     Feb,Expense,Food,\"1,350,000\"\n\
     Feb,Expense,Rent,\"2,000,000\"\n\
     Feb,Savings,Deposit,500000\n"
}

fn new_session() -> Session {
    Session::new(
        RequestBuilder::embedded().expect("embedded prompts"),
        DEFAULT_PREVIEW_ROWS,
    )
}

// =============================================================================
// Upload → dashboard
// =============================================================================

#[test]
fn test_upload_to_dashboard() {
    let mut session = new_session();
    let report = session
        .on_upload("keuangan.csv", household_csv().as_bytes())
        .expect("upload");

    assert_eq!(report.row_count, 7);
    assert_eq!(report.summary.total_income, dec!(10000000));
    assert_eq!(report.summary.total_expense, dec!(5000000));
    assert_eq!(report.summary.net_cash, dec!(5000000));

    assert_eq!(report.expense_breakdown.get("Food"), Some(dec!(2550000)));
    assert_eq!(report.expense_breakdown.get("Deposit"), None);
    let ranked = report.expense_breakdown.sorted_by_amount();
    assert_eq!(ranked[0], ("Food", dec!(2550000)));

    let months: Vec<String> = report
        .monthly_series
        .chronological()
        .into_iter()
        .map(|p| p.month)
        .collect();
    assert_eq!(months, vec!["Jan", "Feb"]);
    assert_eq!(report.monthly_series.get("Feb"), Some(dec!(8850000)));
}

#[test]
fn test_dashboard_json_shape() {
    let mut session = new_session();
    let report = session
        .on_upload("keuangan.csv", household_csv().as_bytes())
        .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["source"], "keuangan.csv");
    assert_eq!(json["summary"]["net_cash"], 5000000.0);
    assert_eq!(json["expense_breakdown"]["Rent"], 2000000.0);
    assert_eq!(json["monthly_series"][0]["month"], "Jan");
    assert_eq!(json["monthly_series"][1]["month"], "Feb");
}

#[test]
fn test_parse_file_from_disk() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("finance.csv");
    std::fs::write(&path, household_csv()).unwrap();

    let dataset = parse_file(&path).unwrap();
    assert_eq!(dataset.source, "finance.csv");
    assert_eq!(dataset.len(), 7);

    let in_memory = parse_csv(household_csv().as_bytes(), "finance.csv").unwrap();
    assert_eq!(dataset, in_memory);
}

#[test]
fn test_xlsx_matches_its_csv_export() {
    let xlsx = parse_file(&fixture("household.xlsx")).expect("xlsx fixture");
    let csv = parse_file(&fixture("household.csv")).expect("csv fixture");

    assert_eq!(xlsx.source, "household.xlsx");
    assert_eq!(
        xlsx.columns,
        vec!["Date", "Month", "Category", "Detail", "Amount", "Note"]
    );
    assert_eq!(xlsx.columns, csv.columns);
    assert_eq!(xlsx.rows, csv.rows);

    // Date cells read as calendar dates, not serial numbers
    assert_eq!(xlsx.rows[1].cells[0], "2024-01-05");
    assert_eq!(xlsx.rows[1].month.as_deref(), Some("2024-01"));
    assert_eq!(xlsx.rows[1].amount, dec!(200.5));
    assert_eq!(xlsx.rows[4].month.as_deref(), Some("2024-03"));
    assert!(xlsx.rows[4].detail.is_none());

    let report = dashboard(&xlsx).unwrap();
    let from_csv = dashboard(&csv).unwrap();
    assert_eq!(report.summary, from_csv.summary);
    assert_eq!(report.expense_breakdown, from_csv.expense_breakdown);
    assert_eq!(report.monthly_series, from_csv.monthly_series);
    assert_eq!(report.summary.total_expense, dec!(355.5));
    assert_eq!(report.monthly_series.get("2024-01"), Some(dec!(1200.5)));
    assert_eq!(report.monthly_series.get("2024-02"), Some(dec!(80)));
    assert_eq!(report.expense_breakdown.get("Food"), Some(dec!(250.5)));

    let preview = render_preview(&xlsx, DEFAULT_PREVIEW_ROWS);
    assert!(preview.contains("January pay"));
    assert!(!preview.contains("45296"));
}

#[test]
fn test_missing_amount_column_rejected() {
    let mut session = new_session();
    let err = session
        .on_upload("bad.csv", b"Month,Category,Detail\nJan,Income,Salary\n")
        .unwrap_err();

    assert_eq!(err.to_string(), "Missing required column(s): Amount");
    assert!(session.dataset().is_none());
}

// =============================================================================
// Advisor workflow
// =============================================================================

#[tokio::test]
async fn test_chat_workflow_with_failure_and_reset() {
    let mock = MockBackend::with_replies(["Food is your largest expense.", "Cook at home more."]);
    let advisor = Advisor::new(AIClient::Mock(mock.clone()));
    let mut session = new_session();
    session
        .on_upload("keuangan.csv", household_csv().as_bytes())
        .unwrap();

    advisor
        .ask(&mut session, "Where does my money go?", AdvisorModel::default())
        .await
        .unwrap();
    advisor
        .ask(&mut session, "How do I cut it?", AdvisorModel::Llama33Versatile)
        .await
        .unwrap();
    assert_eq!(session.conversation().len(), 4);

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].model, AdvisorModel::Llama33Versatile);
    assert_eq!(requests[1].messages.len(), 4);
    assert_eq!(requests[1].messages[2].role, Role::Assistant);
    assert_eq!(requests[1].messages[2].content, "Food is your largest expense.");

    // Empty question: validation error, no request sent
    let err = advisor
        .ask(&mut session, "   ", AdvisorModel::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(mock.requests().len(), 2);

    // Failing client: history untouched
    let failing = Advisor::new(AIClient::Mock(MockBackend::failing("connection reset")));
    let err = failing
        .ask(&mut session, "Still there?", AdvisorModel::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::AdvisorClient(_)));
    assert_eq!(session.conversation().len(), 4);

    session.on_reset_chat();
    assert!(session.conversation().is_empty());
    assert_eq!(session.dataset().map(|d| d.len()), Some(7));
}

#[tokio::test]
async fn test_insight_uses_bounded_preview() {
    let mut csv = String::from("Category,Detail,Amount\n");
    for i in 0..40 {
        csv.push_str(&format!("Expense,Item{:02},{}\n", i, 1000 + i));
    }

    let mock = MockBackend::new();
    let advisor = Advisor::new(AIClient::Mock(mock.clone()));
    let mut session = Session::new(RequestBuilder::embedded().unwrap(), 5);
    session.on_upload("many.csv", csv.as_bytes()).unwrap();

    advisor
        .insight(&session, AdvisorModel::default())
        .await
        .unwrap();

    let request = &mock.requests()[0];
    assert_eq!(request.messages.len(), 2);
    let user = &request.messages[1].content;
    assert!(user.contains("Item04"));
    assert!(!user.contains("Item05"));
    assert!(session.conversation().is_empty());
}

#[test]
fn test_open_categories_flow_through() {
    let dataset = parse_csv(
        "Category,Amount\nIncome,100\nexpense,40\nExpense,10\n".as_bytes(),
        "mixed.csv",
    )
    .unwrap();

    assert_eq!(dataset.rows[1].category, Category::Other("expense".into()));
    let summary = finsight_core::summarize(dataset.rows()).unwrap();
    assert_eq!(summary.total_expense, dec!(10));
    assert_eq!(summary.net_cash, dec!(90));
}
