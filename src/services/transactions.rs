//! Transaction repository and dashboard loading
//!
//! The repository reads and writes a user's stored list; the dashboard
//! service runs the load routine the dashboard screen performs on mount
//! and on every return to focus.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::services::storage::{transactions_key, StorageProvider};
use crate::services::{Aggregator, LocaleConfig};
use crate::types::{
    DashboardSummary, GoFinancesError, RawAmount, RawTransaction, Result, TransactionKind,
};

/// Per-user access to stored transaction lists
pub struct TransactionRepository<S> {
    storage: S,
}

impl<S: StorageProvider> TransactionRepository<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Stored records for `user_id`. An absent or blank value is an empty list.
    pub fn load(&self, user_id: &str) -> Result<Vec<RawTransaction>> {
        let key = transactions_key(user_id);
        decode(&key, self.storage.get(&key)?)
    }

    /// Append a record to the end of the user's list.
    ///
    /// The read and the write happen inside one storage update, so
    /// concurrent appends for the same user all survive.
    pub fn append(&self, user_id: &str, record: RawTransaction) -> Result<()> {
        let key = transactions_key(user_id);
        let mut record = Some(record);

        self.storage.update(&key, &mut |current| {
            let mut records = decode(&key, current)?;
            records.extend(record.take());
            encode(&records)
        })
    }

    /// Replace the user's list
    pub fn save(&self, user_id: &str, records: &[RawTransaction]) -> Result<()> {
        self.storage.set(&transactions_key(user_id), &encode(records)?)
    }

    pub fn clear(&self, user_id: &str) -> Result<()> {
        self.storage.remove(&transactions_key(user_id))
    }
}

fn decode(key: &str, content: Option<String>) -> Result<Vec<RawTransaction>> {
    let content = match content {
        Some(content) if !content.trim().is_empty() => content,
        _ => return Ok(Vec::new()),
    };

    serde_json::from_str(&content)
        .map_err(|e| GoFinancesError::Parse(format!("stored transactions for {}: {}", key, e)))
}

fn encode(records: &[RawTransaction]) -> Result<String> {
    serde_json::to_string(records)
        .map_err(|e| GoFinancesError::Storage(format!("Serialization failed: {}", e)))
}

/// Loads and aggregates a user's transactions for the dashboard
pub struct DashboardService<S> {
    repository: TransactionRepository<S>,
    locale: LocaleConfig,
}

impl<S: StorageProvider> DashboardService<S> {
    pub fn new(repository: TransactionRepository<S>, locale: LocaleConfig) -> Self {
        Self { repository, locale }
    }

    pub fn repository(&self) -> &TransactionRepository<S> {
        &self.repository
    }

    pub fn locale(&self) -> &LocaleConfig {
        &self.locale
    }

    /// Read the user's list and compute the dashboard summary
    pub fn load(&self, user_id: &str) -> Result<DashboardSummary> {
        let records = self.repository.load(user_id)?;
        tracing::debug!(user_id, records = records.len(), "loaded transactions");
        Aggregator::compute_summary(&records, &self.locale)
    }

    /// Like [`load`](Self::load), but any failure yields the empty state.
    /// The error is handed back so the caller can show it and retry later.
    pub fn load_or_empty(&self, user_id: &str) -> (DashboardSummary, Option<GoFinancesError>) {
        match self.load(user_id) {
            Ok(summary) => (summary, None),
            Err(e) => {
                tracing::error!("could not load dashboard for {}: {}", user_id, e);
                (DashboardSummary::empty(&self.locale), Some(e))
            }
        }
    }
}

/// A transaction about to be recorded
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub name: String,
    pub amount: f64,
    pub kind: TransactionKind,
    pub category: String,
}

impl NewTransaction {
    /// Creation-time checks: non-empty name and category, positive finite amount
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(GoFinancesError::Validation("name is required".into()));
        }
        if self.category.trim().is_empty() {
            return Err(GoFinancesError::Validation("category is required".into()));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(GoFinancesError::Validation(format!(
                "amount must be a positive number, got {}",
                self.amount
            )));
        }
        Ok(())
    }

    /// Validate and stamp with a fresh id and `created_at`
    pub fn into_raw(self, created_at: DateTime<Utc>) -> Result<RawTransaction> {
        self.validate()?;
        Ok(RawTransaction {
            id: Uuid::new_v4().to_string(),
            name: self.name.trim().to_string(),
            amount: Some(RawAmount::Number(self.amount)),
            kind: self.kind.as_str().to_string(),
            category: self.category.trim().to_string(),
            date: Some(created_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::{FileStorage, MemoryStorage};
    use crate::types::AggregationWarning;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn new_tx(name: &str, amount: f64, kind: TransactionKind) -> NewTransaction {
        NewTransaction {
            name: name.to_string(),
            amount,
            kind,
            category: "food".to_string(),
        }
    }

    fn service() -> DashboardService<MemoryStorage> {
        DashboardService::new(
            TransactionRepository::new(MemoryStorage::new()),
            LocaleConfig::pt_br(),
        )
    }

    fn jan(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
    }

    // ========== TransactionRepository ==========

    #[test]
    fn test_load_absent_key_is_empty() {
        let repo = TransactionRepository::new(MemoryStorage::new());
        assert!(repo.load("u1").unwrap().is_empty());
    }

    #[test]
    fn test_load_blank_value_is_empty() {
        let storage = MemoryStorage::new();
        storage.set(&transactions_key("u1"), "  ").unwrap();
        let repo = TransactionRepository::new(storage);

        assert!(repo.load("u1").unwrap().is_empty());
    }

    #[test]
    fn test_load_invalid_json_is_parse_error() {
        let storage = MemoryStorage::new();
        storage.set(&transactions_key("u1"), "not json {{").unwrap();
        let repo = TransactionRepository::new(storage);

        assert!(matches!(repo.load("u1"), Err(GoFinancesError::Parse(_))));
    }

    #[test]
    fn test_append_keeps_insertion_order() {
        let repo = TransactionRepository::new(MemoryStorage::new());

        let first = new_tx("Lunch", 30.0, TransactionKind::Expense)
            .into_raw(jan(2))
            .unwrap();
        let second = new_tx("Salary", 5000.0, TransactionKind::Entry)
            .into_raw(jan(1))
            .unwrap();
        repo.append("u1", first.clone()).unwrap();
        repo.append("u1", second.clone()).unwrap();

        assert_eq!(repo.load("u1").unwrap(), vec![first, second]);
    }

    #[test]
    fn test_append_to_unreadable_list_keeps_stored_value() {
        let storage = MemoryStorage::new();
        storage.set(&transactions_key("u1"), "not json {{").unwrap();
        let repo = TransactionRepository::new(storage);
        let record = new_tx("Lunch", 30.0, TransactionKind::Expense)
            .into_raw(jan(2))
            .unwrap();

        assert!(matches!(repo.append("u1", record), Err(GoFinancesError::Parse(_))));
        assert_eq!(
            repo.storage().get(&transactions_key("u1")).unwrap(),
            Some("not json {{".into())
        );
    }

    #[test]
    fn test_concurrent_appends_are_all_kept() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_path_buf();

        let handles: Vec<_> = (0..6)
            .map(|i| {
                let dir = dir.clone();
                std::thread::spawn(move || {
                    let repo = TransactionRepository::new(FileStorage::open(dir).unwrap());
                    for j in 0..5 {
                        let name = format!("t{}-{}", i, j);
                        let record = new_tx(&name, 1.0, TransactionKind::Expense)
                            .into_raw(jan(1))
                            .unwrap();
                        repo.append("u1", record).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let repo = TransactionRepository::new(FileStorage::open(dir).unwrap());
        assert_eq!(repo.load("u1").unwrap().len(), 30);
    }

    #[test]
    fn test_users_do_not_share_lists() {
        let repo = TransactionRepository::new(MemoryStorage::new());
        let record = new_tx("Lunch", 30.0, TransactionKind::Expense)
            .into_raw(jan(2))
            .unwrap();

        repo.append("alice", record).unwrap();

        assert_eq!(repo.load("alice").unwrap().len(), 1);
        assert!(repo.load("bob").unwrap().is_empty());
    }

    #[test]
    fn test_clear() {
        let repo = TransactionRepository::new(MemoryStorage::new());
        let record = new_tx("Lunch", 30.0, TransactionKind::Expense)
            .into_raw(jan(2))
            .unwrap();
        repo.append("u1", record).unwrap();

        repo.clear("u1").unwrap();

        assert!(repo.load("u1").unwrap().is_empty());
    }

    // ========== DashboardService ==========

    #[test]
    fn test_dashboard_load_after_appends() {
        let service = service();
        let repo = service.repository();
        repo.append(
            "u1",
            new_tx("Salary", 1000.0, TransactionKind::Entry)
                .into_raw(jan(5))
                .unwrap(),
        )
        .unwrap();
        repo.append(
            "u1",
            new_tx("Rent", 400.0, TransactionKind::Expense)
                .into_raw(jan(10))
                .unwrap(),
        )
        .unwrap();

        let summary = service.load("u1").unwrap();

        assert_eq!(summary.transactions.len(), 2);
        assert_eq!(summary.highlights.total.amount, "R$\u{a0}600,00");
        assert_eq!(summary.highlights.total.last_transaction, "01 à 10 de janeiro");
    }

    #[test]
    fn test_dashboard_load_or_empty_on_malformed_record() {
        let service = service();
        service
            .repository()
            .storage()
            .set(
                &transactions_key("u1"),
                r#"[{"id":"x1","name":"?","amount":"lots","type":"positive",
                    "category":"c","date":"2024-01-01"}]"#,
            )
            .unwrap();

        let (summary, error) = service.load_or_empty("u1");

        assert_eq!(summary, DashboardSummary::empty(service.locale()));
        assert!(matches!(
            error,
            Some(GoFinancesError::MalformedRecord { ref id, .. }) if id == "x1"
        ));
    }

    #[test]
    fn test_dashboard_load_tolerates_null_type() {
        let service = service();
        service
            .repository()
            .storage()
            .set(
                &transactions_key("u1"),
                r#"[{"id":"a","name":"Pay","amount":10,"type":"positive","category":"c",
                    "date":"2024-01-05"},
                    {"id":"b","name":"?","amount":3,"type":null,"category":null,
                    "date":"2024-01-06"}]"#,
            )
            .unwrap();

        let summary = service.load("u1").unwrap();

        assert!((summary.totals.expenses - 3.0).abs() < f64::EPSILON);
        assert_eq!(
            summary.warnings,
            vec![AggregationWarning::UnknownCategoryType {
                id: "b".into(),
                value: String::new(),
            }]
        );
    }

    #[test]
    fn test_dashboard_load_or_empty_without_data() {
        let service = service();

        let (summary, error) = service.load_or_empty("nobody");

        assert!(error.is_none());
        assert!(summary.is_empty());
        assert_eq!(summary.highlights.entries.last_transaction, "Não há transações");
    }

    // ========== NewTransaction ==========

    #[test]
    fn test_into_raw_stamps_id_and_date() {
        let raw = new_tx("  Coffee ", 4.5, TransactionKind::Expense)
            .into_raw(jan(3))
            .unwrap();

        assert!(Uuid::parse_str(&raw.id).is_ok());
        assert_eq!(raw.name, "Coffee");
        assert_eq!(raw.kind, "negative");
        assert_eq!(raw.date.as_deref(), Some("2024-01-03T12:00:00.000Z"));
        assert_eq!(raw.amount, Some(RawAmount::Number(4.5)));
    }

    #[test]
    fn test_into_raw_ids_are_unique() {
        let a = new_tx("A", 1.0, TransactionKind::Entry).into_raw(jan(1)).unwrap();
        let b = new_tx("A", 1.0, TransactionKind::Entry).into_raw(jan(1)).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        for tx in [
            new_tx("", 10.0, TransactionKind::Entry),
            new_tx("Ok", 0.0, TransactionKind::Entry),
            new_tx("Ok", -5.0, TransactionKind::Entry),
            new_tx("Ok", f64::NAN, TransactionKind::Entry),
            NewTransaction {
                category: " ".into(),
                ..new_tx("Ok", 1.0, TransactionKind::Entry)
            },
        ] {
            assert!(matches!(tx.validate(), Err(GoFinancesError::Validation(_))));
        }
    }
}
