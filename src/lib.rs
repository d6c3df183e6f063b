//! gofinances: income/expense records and the dashboard highlights built from them

pub mod cli;
pub mod services;
pub mod types;
