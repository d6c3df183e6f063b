//! Display-ready dashboard structures

use serde::Serialize;

use super::AggregationWarning;

/// A stored record rendered for the transaction list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedTransaction {
    pub id: String,
    pub name: String,
    /// Localized currency string
    pub amount: String,
    /// Stored `type` tag, unchanged
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    /// Localized short date
    pub date: String,
}

/// One highlight card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightEntry {
    pub amount: String,
    pub last_transaction: String,
}

/// The three highlight cards, always produced together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightSummary {
    pub entries: HighlightEntry,
    pub expenses: HighlightEntry,
    pub total: HighlightEntry,
}

/// Unformatted sums behind the highlight cards
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Totals {
    pub entries: f64,
    pub expenses: f64,
    pub net: f64,
}

/// Everything the dashboard screen needs from one aggregation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub transactions: Vec<FormattedTransaction>,
    pub highlights: HighlightSummary,
    pub totals: Totals,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<AggregationWarning>,
}

impl DashboardSummary {
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
