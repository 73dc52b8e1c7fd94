//! Domain models for Finsight

use std::collections::BTreeMap;

use chrono::Month;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

/// Transaction category
///
/// The set is open: sheets can carry labels other than Income and Expense,
/// which are kept as-is and only take part in the monthly series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Income,
    Expense,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
            Self::Other(label) => label,
        }
    }

    /// Category for a sheet label; matching is exact after trimming
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Income" => Self::Income,
            "Expense" => Self::Expense,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn is_income(&self) -> bool {
        matches!(self, Self::Income)
    }

    pub fn is_expense(&self) -> bool {
        matches!(self, Self::Expense)
    }
}

impl std::str::FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

/// A single validated transaction row from an uploaded sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub category: Category,
    /// Free-text subcategory, used for the expense breakdown
    pub detail: Option<String>,
    pub amount: Decimal,
    /// Grouping label for the monthly series (no calendar validation)
    pub month: Option<String>,
    /// Cell text as it appeared in the sheet, one entry per dataset column
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cells: Vec<String>,
}

impl TransactionRow {
    pub fn new(category: Category, amount: Decimal) -> Self {
        Self {
            category,
            detail: None,
            amount,
            month: None,
            cells: Vec::new(),
        }
    }

    /// Cells under [`CANONICAL_COLUMNS`], derived from the typed fields
    fn canonical_cells(&self) -> Vec<String> {
        vec![
            self.category.to_string(),
            self.detail.clone().unwrap_or_default(),
            self.amount.normalize().to_string(),
            self.month.clone().unwrap_or_default(),
        ]
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_month(mut self, month: impl Into<String>) -> Self {
        self.month = Some(month.into());
        self
    }
}

/// Columns of a dataset assembled from typed rows rather than a sheet
pub const CANONICAL_COLUMNS: [&str; 4] = ["Category", "Detail", "Amount", "Month"];

/// The rows of one upload, in upload order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// File name the rows came from
    pub source: String,
    /// Sheet header, every column in sheet order
    #[serde(default)]
    pub columns: Vec<String>,
    pub rows: Vec<TransactionRow>,
}

impl Dataset {
    /// Dataset from typed rows, laid out under [`CANONICAL_COLUMNS`]
    pub fn new(source: impl Into<String>, rows: Vec<TransactionRow>) -> Self {
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.cells = row.canonical_cells();
                row
            })
            .collect();

        Self {
            source: source.into(),
            columns: CANONICAL_COLUMNS.map(String::from).to_vec(),
            rows,
        }
    }

    /// Dataset as read from a sheet; each row's cells line up with `columns`
    pub fn from_sheet(
        source: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<TransactionRow>,
    ) -> Self {
        Self {
            source: source.into(),
            columns,
            rows,
        }
    }

    pub fn rows(&self) -> &[TransactionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ========== Report Models ==========

/// Income, expense and net totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net_cash: Decimal,
}

/// Expense totals keyed by detail
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseBreakdown(pub BTreeMap<String, Decimal>);

impl ExpenseBreakdown {
    pub fn get(&self, detail: &str) -> Option<Decimal> {
        self.0.get(detail).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Decimal)> {
        self.0.iter()
    }

    /// Sum of all slices, `None` if it leaves the decimal range
    pub fn total(&self) -> Option<Decimal> {
        self.0
            .values()
            .try_fold(Decimal::ZERO, |total, amount| total.checked_add(*amount))
    }

    /// Entries ordered by amount, largest first (ties by detail name)
    pub fn sorted_by_amount(&self) -> Vec<(&str, Decimal)> {
        let mut entries: Vec<(&str, Decimal)> =
            self.0.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

/// A single point of the monthly series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPoint {
    pub month: String,
    pub amount: Decimal,
}

/// Amount totals keyed by month label
///
/// Serializes as a chronological list of points, ready for a line chart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlySeries(pub BTreeMap<String, Decimal>);

impl MonthlySeries {
    pub fn get(&self, month: &str) -> Option<Decimal> {
        self.0.get(month).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Points in calendar order where labels are recognizable
    ///
    /// Recognized labels (`2024-01`, `Jan`, `January 2024`, Indonesian month
    /// names) sort by year then month; anything else follows, in lexical order.
    pub fn chronological(&self) -> Vec<MonthlyPoint> {
        let mut points: Vec<(MonthKey, &String, Decimal)> = self
            .0
            .iter()
            .map(|(label, amount)| (MonthKey::parse(label), label, *amount))
            .collect();
        points.sort_by(|a, b| a.0.cmp(&b.0));
        points
            .into_iter()
            .map(|(_, label, amount)| MonthlyPoint {
                month: label.clone(),
                amount,
            })
            .collect()
    }
}

impl Serialize for MonthlySeries {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.chronological().serialize(serializer)
    }
}

/// Sort key for month labels
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum MonthKey {
    Calendar { year: Option<i32>, month: u32 },
    Label(String),
}

impl MonthKey {
    fn parse(label: &str) -> Self {
        let trimmed = label.trim();

        // ISO-like: 2024-01 or 2024/01
        if let Some((year, month)) = trimmed.split_once(['-', '/']) {
            if let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<u32>()) {
                if (1..=12).contains(&month) {
                    return Self::Calendar {
                        year: Some(year),
                        month,
                    };
                }
            }
        }

        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        match parts.as_slice() {
            [name] => {
                if let Some(month) = month_number(name) {
                    return Self::Calendar { year: None, month };
                }
            }
            [a, b] => {
                if let (Some(month), Ok(year)) = (month_number(a), b.parse::<i32>()) {
                    return Self::Calendar {
                        year: Some(year),
                        month,
                    };
                }
                if let (Ok(year), Some(month)) = (a.parse::<i32>(), month_number(b)) {
                    return Self::Calendar {
                        year: Some(year),
                        month,
                    };
                }
            }
            _ => {}
        }

        Self::Label(trimmed.to_string())
    }
}

/// Month number from an English or Indonesian month name or abbreviation
fn month_number(name: &str) -> Option<u32> {
    if let Ok(month) = name.parse::<Month>() {
        return Some(month.number_from_month());
    }

    let month = match name.to_lowercase().as_str() {
        "januari" => 1,
        "februari" | "feb" => 2,
        "maret" | "mar" => 3,
        "april" | "apr" => 4,
        "mei" => 5,
        "juni" | "jun" => 6,
        "juli" | "jul" => 7,
        "agustus" | "agu" | "agt" => 8,
        "september" | "sep" => 9,
        "oktober" | "okt" => 10,
        "november" | "nov" => 11,
        "desember" | "des" => 12,
        _ => return None,
    };
    Some(month)
}

/// Everything the dashboard needs to render one upload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub source: String,
    pub row_count: usize,
    pub summary: FinancialSummary,
    pub expense_breakdown: ExpenseBreakdown,
    pub monthly_series: MonthlySeries,
}

// ========== Conversation Models ==========

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A role-tagged message, used both for conversation turns and requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_category_parse_is_exact() {
        assert_eq!("Income".parse::<Category>().unwrap(), Category::Income);
        assert_eq!(" Expense ".parse::<Category>().unwrap(), Category::Expense);
        assert_eq!(
            "income".parse::<Category>().unwrap(),
            Category::Other("income".to_string())
        );
        assert_eq!(
            "Savings".parse::<Category>().unwrap(),
            Category::Other("Savings".to_string())
        );
    }

    #[test]
    fn test_category_serde_round_trip() {
        let json = serde_json::to_string(&Category::Expense).unwrap();
        assert_eq!(json, "\"Expense\"");
        let parsed: Category = serde_json::from_str("\"Investment\"").unwrap();
        assert_eq!(parsed, Category::Other("Investment".to_string()));
    }

    #[test]
    fn test_breakdown_sorted_by_amount() {
        let mut map = BTreeMap::new();
        map.insert("Food".to_string(), dec!(250));
        map.insert("Rent".to_string(), dec!(1500));
        map.insert("Coffee".to_string(), dec!(250));
        let breakdown = ExpenseBreakdown(map);

        let sorted = breakdown.sorted_by_amount();
        assert_eq!(sorted[0], ("Rent", dec!(1500)));
        assert_eq!(sorted[1], ("Coffee", dec!(250)));
        assert_eq!(sorted[2], ("Food", dec!(250)));
        assert_eq!(breakdown.total(), Some(dec!(2000)));
    }

    #[test]
    fn test_dataset_from_typed_rows_uses_canonical_columns() {
        let dataset = Dataset::new(
            "typed",
            vec![TransactionRow::new(Category::Expense, dec!(12.50)).with_detail("Food")],
        );
        assert_eq!(dataset.columns, CANONICAL_COLUMNS.map(String::from).to_vec());
        assert_eq!(dataset.rows[0].cells, vec!["Expense", "Food", "12.5", ""]);
    }

    #[test]
    fn test_chronological_month_names() {
        let mut map = BTreeMap::new();
        for (month, amount) in [("Mar", 3), ("Jan", 1), ("Feb", 2), ("December", 12)] {
            map.insert(month.to_string(), Decimal::from(amount));
        }
        let labels: Vec<String> = MonthlySeries(map)
            .chronological()
            .into_iter()
            .map(|p| p.month)
            .collect();
        assert_eq!(labels, vec!["Jan", "Feb", "Mar", "December"]);
    }

    #[test]
    fn test_chronological_with_years_and_unknown_labels() {
        let mut map = BTreeMap::new();
        for label in ["2024-02", "Q1", "2023-12", "Jan 2024", "Agustus"] {
            map.insert(label.to_string(), dec!(1));
        }
        let labels: Vec<String> = MonthlySeries(map)
            .chronological()
            .into_iter()
            .map(|p| p.month)
            .collect();
        // Yearless names first, then by year/month, then unrecognized labels
        assert_eq!(labels, vec!["Agustus", "2023-12", "Jan 2024", "2024-02", "Q1"]);
    }

    #[test]
    fn test_indonesian_month_names() {
        assert_eq!(month_number("Mei"), Some(5));
        assert_eq!(month_number("oktober"), Some(10));
        assert_eq!(month_number("Desember"), Some(12));
        assert_eq!(month_number("Kuartal"), None);
    }

    #[test]
    fn test_monthly_series_serializes_as_points() {
        let mut map = BTreeMap::new();
        map.insert("Feb".to_string(), dec!(50));
        map.insert("Jan".to_string(), dec!(200));
        let json = serde_json::to_value(MonthlySeries(map)).unwrap();
        assert_eq!(json[0]["month"], "Jan");
        assert_eq!(json[0]["amount"], 200.0);
        assert_eq!(json[1]["month"], "Feb");
    }

    #[test]
    fn test_chat_message_serialization() {
        let msg = ChatMessage::assistant("Hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "Hi");
    }
}
