mod add;
mod dashboard;

pub use add::AddArgs;
pub use dashboard::{render_json, render_text, DashboardArgs};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::services::{
    DashboardService, FileStorage, LocaleConfig, Settings, TransactionRepository,
};

/// Income/expense tracker with dashboard highlights
#[derive(Parser)]
#[command(name = "gofinances")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory holding stored transaction lists
    #[arg(long, global = true, value_name = "PATH")]
    data_dir: Option<PathBuf>,

    /// Display locale (pt-BR or en-US)
    #[arg(long, global = true, value_name = "TAG")]
    locale: Option<String>,

    /// Settings file (defaults to ~/.gofinances/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show highlight cards and the transaction list
    Dashboard(DashboardArgs),

    /// Record a new transaction
    Add(AddArgs),

    /// Delete every stored transaction of a user
    Clear {
        /// User whose list is removed
        #[arg(long)]
        user: String,
    },
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let settings = match &self.config {
            Some(path) => Settings::load_from(path)?,
            None => Settings::load_from(&Settings::default_path()?)?,
        };

        let merged = Settings {
            locale: self.locale.or(settings.locale),
            data_dir: self.data_dir.or(settings.data_dir),
            utc_offset_minutes: settings.utc_offset_minutes,
        };
        let locale: LocaleConfig = merged.locale_config()?;

        let storage = match merged.data_dir {
            Some(dir) => FileStorage::open(dir)?,
            None => FileStorage::new()?,
        };
        tracing::debug!(dir = %storage.storage_dir().display(), "using storage");

        let repository = TransactionRepository::new(storage);

        match self.command {
            Commands::Dashboard(args) => {
                let service = DashboardService::new(repository, locale);
                args.run(&service)?;
            }
            Commands::Add(args) => args.run(&repository)?,
            Commands::Clear { user } => {
                repository.clear(&user)?;
                println!("Cleared transactions for {}", user);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionKind;

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["gofinances"]).is_err());
    }

    #[test]
    fn test_cli_parse_dashboard() {
        let cli = Cli::try_parse_from(["gofinances", "dashboard", "--user", "42"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Dashboard(DashboardArgs { ref user, json: false }) if user == "42"
        ));
    }

    #[test]
    fn test_cli_parse_dashboard_json_with_globals() {
        let cli = Cli::try_parse_from([
            "gofinances",
            "dashboard",
            "--user",
            "42",
            "--json",
            "--locale",
            "en-US",
            "--data-dir",
            "/tmp/gf",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Dashboard(DashboardArgs { json: true, .. })));
        assert_eq!(cli.locale.as_deref(), Some("en-US"));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/gf")));
    }

    #[test]
    fn test_cli_parse_add() {
        let cli = Cli::try_parse_from([
            "gofinances",
            "add",
            "--user",
            "42",
            "--name",
            "Salary",
            "--amount",
            "3500.50",
            "--type",
            "positive",
            "--category",
            "salary",
        ])
        .unwrap();

        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.kind, TransactionKind::Entry);
                assert!((args.amount - 3500.5).abs() < f64::EPSILON);
                assert!(args.date.is_none());
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_cli_parse_add_rejects_unknown_type() {
        let result = Cli::try_parse_from([
            "gofinances",
            "add",
            "--user",
            "42",
            "--name",
            "x",
            "--amount",
            "1",
            "--type",
            "transfer",
            "--category",
            "c",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_parse_clear() {
        let cli = Cli::try_parse_from(["gofinances", "clear", "--user", "7"]).unwrap();
        assert!(matches!(cli.command, Commands::Clear { ref user } if user == "7"));
    }
}
