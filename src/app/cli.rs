use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use boleto_domain::{PaymentMethod, ReportPeriod, StatusFilter};

#[derive(Parser, Debug)]
#[command(
    name = "boleto_cli",
    version,
    about = "Track installment receivables (boletos) and their payments"
)]
pub struct Cli {
    /// Directory holding the portfolio, its backups and the config file
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Evaluate statuses as of this date instead of today (YYYY-MM-DD)
    #[arg(long, global = true, value_name = "DATE")]
    pub today: Option<NaiveDate>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a new boleto and generate its installment schedule
    Add(AddArgs),
    /// List boletos, newest first
    List(FilterArgs),
    /// Show one boleto with its installments
    Show { id: String },
    /// Toggle the paid flag of an installment (1-based number)
    Pay { id: String, number: usize },
    /// Move one installment to a new due date
    Reschedule {
        id: String,
        number: usize,
        date: NaiveDate,
    },
    /// Change header fields; any change besides the client name rebuilds the schedule
    Edit(EditArgs),
    /// Remove a boleto
    Delete { id: String },
    /// Portfolio totals and the nearest installments
    Dashboard,
    /// Breakdowns by status, method and creation month
    Report(FilterArgs),
    /// Nearest unpaid installments across all boletos
    Upcoming {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Overdue and due-soon installments
    Alerts,
    /// Write the portfolio as a JSON backup file
    Export {
        /// Target file; defaults to boletos-backup-YYYY-MM-DD.json, `-` prints to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace the portfolio with the contents of a JSON backup file
    Import { path: PathBuf },
    /// Snapshot the portfolio into the rolling backup directory
    Backup {
        #[arg(long)]
        note: Option<String>,
    },
    /// List rolling backups, newest first
    Backups,
    /// Restore the portfolio from a rolling backup
    Restore { id: String },
    /// Inspect or change settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(long)]
    pub client: String,
    #[arg(long)]
    pub total: Decimal,
    #[arg(long, default_value = "0")]
    pub down: Decimal,
    #[arg(long, default_value = "cash")]
    pub down_method: PaymentMethod,
    #[arg(long)]
    pub count: u32,
    #[arg(long, default_value = "boleto")]
    pub method: PaymentMethod,
    /// Due date of installment #1 (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: String,
    #[arg(long)]
    pub client: Option<String>,
    #[arg(long)]
    pub total: Option<Decimal>,
    #[arg(long)]
    pub down: Option<Decimal>,
    #[arg(long)]
    pub down_method: Option<PaymentMethod>,
    #[arg(long)]
    pub count: Option<u32>,
    #[arg(long)]
    pub method: Option<PaymentMethod>,
    #[arg(long)]
    pub start: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// last-month, last-3-months, last-6-months, last-year or all
    #[arg(long, default_value = "all")]
    pub period: ReportPeriod,
    /// all, paid, pending or overdue
    #[arg(long, default_value = "all")]
    pub status: StatusFilter,
    #[arg(long)]
    pub method: Option<PaymentMethod>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print every setting
    Show,
    /// Change one setting (a backup of the previous config is kept)
    Set { key: String, value: String },
    /// List config backups
    Backups,
    /// Restore a config backup by file name
    Restore { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_defaults() {
        let cli = Cli::try_parse_from([
            "boleto_cli",
            "--data-dir",
            "/tmp/x",
            "add",
            "--client",
            "Ana",
            "--total",
            "1200",
            "--count",
            "5",
        ])
        .expect("parse add");
        match cli.command {
            Command::Add(args) => {
                assert_eq!(args.down, Decimal::ZERO);
                assert_eq!(args.down_method, PaymentMethod::Cash);
                assert_eq!(args.method, PaymentMethod::Boleto);
                assert_eq!(args.start, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_method() {
        assert!(Cli::try_parse_from([
            "boleto_cli", "add", "--client", "Ana", "--total", "10", "--count", "1", "--method",
            "cheque",
        ])
        .is_err());
    }
}
