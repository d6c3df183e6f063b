//! Services for loading, aggregating and formatting transactions

pub mod aggregator;
pub mod locale;
pub mod settings;
pub mod storage;
pub mod transactions;

pub use aggregator::Aggregator;
pub use locale::LocaleConfig;
pub use settings::Settings;
pub use storage::{transactions_key, FileStorage, MemoryStorage, StorageProvider};
pub use transactions::{DashboardService, NewTransaction, TransactionRepository};
