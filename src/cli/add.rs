//! `gofinances add` subcommand for recording a transaction

use chrono::Utc;
use clap::Args;

use crate::services::{NewTransaction, StorageProvider, TransactionRepository};
use crate::types::{parse_date, GoFinancesError, Result, TransactionKind};

/// Record a new income or expense
#[derive(Args, Debug)]
pub struct AddArgs {
    /// User the transaction belongs to
    #[arg(long)]
    pub user: String,

    /// Description
    #[arg(long)]
    pub name: String,

    /// Amount (positive number)
    #[arg(long)]
    pub amount: f64,

    /// "positive" for income, "negative" for an expense
    #[arg(long = "type", value_name = "TYPE")]
    pub kind: TransactionKind,

    /// Category label
    #[arg(long)]
    pub category: String,

    /// Creation date (ISO 8601); defaults to now
    #[arg(long)]
    pub date: Option<String>,
}

impl AddArgs {
    pub fn run<S: StorageProvider>(self, repository: &TransactionRepository<S>) -> Result<()> {
        let created_at = match self.date.as_deref() {
            Some(text) => parse_date(text).ok_or_else(|| {
                GoFinancesError::Validation(format!("date \"{}\" is not a valid date", text))
            })?,
            None => Utc::now(),
        };

        let record = NewTransaction {
            name: self.name,
            amount: self.amount,
            kind: self.kind,
            category: self.category,
        }
        .into_raw(created_at)?;

        repository.append(&self.user, record.clone())?;

        let json = serde_json::to_string_pretty(&record)
            .map_err(|e| GoFinancesError::Parse(e.to_string()))?;
        println!("{}", json);

        Ok(())
    }
}
