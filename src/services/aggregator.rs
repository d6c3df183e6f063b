//! Aggregator service for computing dashboard highlights

use chrono::{DateTime, Utc};

use crate::services::LocaleConfig;
use crate::types::{
    DashboardSummary, FormattedTransaction, HighlightEntry, HighlightSummary,
    RawTransaction, Result, Totals, Transaction, TransactionKind,
};

/// Aggregator for turning stored records into dashboard summaries
pub struct Aggregator;

impl Aggregator {
    /// Compute the formatted transaction list and the three highlight cards.
    ///
    /// Every record is validated before any total is touched, so a
    /// `MalformedRecord` error never leaves a half-filled summary behind.
    /// The input order is preserved in `transactions`.
    pub fn compute_summary(
        raw: &[RawTransaction],
        locale: &LocaleConfig,
    ) -> Result<DashboardSummary> {
        let mut transactions = Vec::with_capacity(raw.len());
        let mut warnings = Vec::new();

        for record in raw {
            let (transaction, warning) = Transaction::from_raw(record)?;
            if let Some(warning) = warning {
                tracing::warn!("{}", warning);
                warnings.push(warning);
            }
            transactions.push(transaction);
        }

        let totals = Self::totals(&transactions);

        let formatted = transactions
            .iter()
            .map(|tx| Self::format_transaction(tx, locale))
            .collect();

        let entries_last = Self::last_date_for(
            transactions
                .iter()
                .filter(|tx| tx.kind == TransactionKind::Entry),
        );
        let expenses_last = Self::last_date_for(
            transactions
                .iter()
                .filter(|tx| tx.kind == TransactionKind::Expense),
        );

        let entries_day = entries_last.map(|d| locale.format_caption_day(d));
        let expenses_day = expenses_last.map(|d| locale.format_caption_day(d));

        // The total card's range ends on the last expense day, even when the
        // latest entry is more recent.
        let highlights = HighlightSummary {
            entries: HighlightEntry {
                amount: locale.format_currency(totals.entries),
                last_transaction: caption(
                    locale,
                    &locale.last_entry_prefix,
                    entries_day.as_deref(),
                ),
            },
            expenses: HighlightEntry {
                amount: locale.format_currency(totals.expenses),
                last_transaction: caption(
                    locale,
                    &locale.last_expense_prefix,
                    expenses_day.as_deref(),
                ),
            },
            total: HighlightEntry {
                amount: locale.format_currency(totals.net),
                last_transaction: caption(
                    locale,
                    &locale.total_range_prefix,
                    expenses_day.as_deref(),
                ),
            },
        };

        tracing::debug!(
            records = raw.len(),
            warnings = warnings.len(),
            "aggregated transactions"
        );

        Ok(DashboardSummary {
            transactions: formatted,
            highlights,
            totals,
            warnings,
        })
    }

    /// Latest date in an already-filtered subset, `None` when it is empty
    pub fn last_date_for<'a, I>(subset: I) -> Option<DateTime<Utc>>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        subset.into_iter().map(|tx| tx.date).max()
    }

    /// Sum entries and expenses; `net` is entries minus expenses
    pub fn totals(transactions: &[Transaction]) -> Totals {
        let mut totals = Totals::default();

        for tx in transactions {
            match tx.kind {
                TransactionKind::Entry => totals.entries += tx.amount,
                TransactionKind::Expense => totals.expenses += tx.amount,
            }
        }

        totals.net = totals.entries - totals.expenses;
        totals
    }

    fn format_transaction(tx: &Transaction, locale: &LocaleConfig) -> FormattedTransaction {
        FormattedTransaction {
            id: tx.id.clone(),
            name: tx.name.clone(),
            amount: locale.format_currency(tx.amount),
            kind: tx.type_tag.clone(),
            category: tx.category.clone(),
            date: locale.format_short_date(tx.date),
        }
    }
}

impl DashboardSummary {
    /// The canonical empty state: zero totals and sentinel captions
    pub fn empty(locale: &LocaleConfig) -> Self {
        let zero = HighlightEntry {
            amount: locale.format_currency(0.0),
            last_transaction: locale.no_transactions.clone(),
        };

        Self {
            transactions: Vec::new(),
            highlights: HighlightSummary {
                entries: zero.clone(),
                expenses: zero.clone(),
                total: zero,
            },
            totals: Totals::default(),
            warnings: Vec::new(),
        }
    }
}

fn caption(locale: &LocaleConfig, prefix: &str, day: Option<&str>) -> String {
    match day {
        Some(day) => format!("{}{}", prefix, day),
        None => locale.no_transactions.clone(),
    }
}
