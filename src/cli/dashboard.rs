//! `gofinances dashboard` subcommand

use clap::Args;
use serde::Serialize;
use std::fmt::Write;

use crate::services::{DashboardService, StorageProvider};
use crate::types::{DashboardSummary, GoFinancesError, HighlightEntry, Result};

/// Show highlight cards and the transaction list
#[derive(Args, Debug)]
pub struct DashboardArgs {
    /// User whose transactions are shown
    #[arg(long)]
    pub user: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl DashboardArgs {
    pub fn run<S: StorageProvider>(self, service: &DashboardService<S>) -> Result<()> {
        // The empty state is still shown when loading fails
        let (summary, error) = service.load_or_empty(&self.user);
        if let Some(e) = &error {
            eprintln!("[gofinances] Error: showing empty dashboard: {}", e);
        }

        if self.json {
            println!("{}", render_json(&summary, error.as_ref())?);
        } else {
            print!("{}", render_text(&summary));
        }

        Ok(())
    }
}

/// JSON document printed by `dashboard --json`
#[derive(Serialize)]
struct DashboardOutput<'a> {
    #[serde(flatten)]
    summary: &'a DashboardSummary,
    /// Why the summary is the empty state, when loading failed
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Summary as pretty JSON, with an `error` field when loading failed
pub fn render_json(summary: &DashboardSummary, error: Option<&GoFinancesError>) -> Result<String> {
    let output = DashboardOutput {
        summary,
        error: error.map(ToString::to_string),
    };
    serde_json::to_string_pretty(&output).map_err(|e| GoFinancesError::Parse(e.to_string()))
}

/// Plain-text dashboard: three cards, then one line per transaction
pub fn render_text(summary: &DashboardSummary) -> String {
    let mut out = String::new();
    let h = &summary.highlights;

    for (label, card) in [
        ("entries", &h.entries),
        ("expenses", &h.expenses),
        ("total", &h.total),
    ] {
        write_card(&mut out, label, card);
    }

    out.push('\n');

    if summary.transactions.is_empty() {
        out.push_str("(no transactions)\n");
        return out;
    }

    let name_width = summary
        .transactions
        .iter()
        .map(|t| t.name.chars().count())
        .max()
        .unwrap_or(0);

    for t in &summary.transactions {
        let sign = if t.kind == "positive" { ' ' } else { '-' };
        let _ = writeln!(
            out,
            "{}  {:<width$}  {}{:>14}  {}",
            t.date,
            t.name,
            sign,
            t.amount,
            t.category,
            width = name_width
        );
    }

    out
}

fn write_card(out: &mut String, label: &str, card: &HighlightEntry) {
    let _ = writeln!(out, "{:<9} {:>16}  {}", label, card.amount, card.last_transaction);
}
