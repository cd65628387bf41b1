//! These structs provide the CLI interface for the ledger-view CLI.

use crate::commands::OutputFormat;
use crate::model::{DateRange, SortKey};
use crate::view::{Clock, ALL_CATEGORIES};
use crate::Result;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// ledger-view: your spending at a glance.
///
/// Shows expenditure by category for a date range and a sortable, filterable table of
/// transactions, all read from your budgeting dashboard's API. Transactions can be viewed in
/// detail and deleted after confirmation.
///
/// Set LEDGER_VIEW_IN_TEST_MODE to any non-empty value to run against built-in sample data
/// instead of the API.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the home directory and write the configuration file.
    ///
    /// Run this first. Afterwards, put your session token in $LEDGER_VIEW_HOME/.secrets/token or
    /// pass it with --token / LEDGER_VIEW_TOKEN.
    Init(InitArgs),
    /// Show expenditure by category, with each category's share of the total.
    Categories(RangeArgs),
    /// Show the transaction table.
    Transactions(TransactionsArgs),
    /// Show every field of one transaction.
    View(ViewArgs),
    /// Delete one transaction after confirmation.
    Delete(DeleteArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where configuration and the transaction cache are held. Defaults to
    /// ~/ledger-view
    #[arg(long, env = "LEDGER_VIEW_HOME", default_value_t = default_home())]
    home: DisplayPath,

    /// The session token. When omitted it is read from the token file named in the config.
    #[arg(long, env = "LEDGER_VIEW_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Print the human-readable text or a JSON object with the structured data.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
}

impl Common {
    pub fn new(
        log_level: LevelFilter,
        home: PathBuf,
        token: Option<String>,
        output: OutputFormat,
    ) -> Self {
        Self {
            log_level,
            home: home.into(),
            token,
            output,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }
}

/// Args for the `ledger-view init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the dashboard API, e.g. https://budget.example.com
    #[arg(long)]
    api_host: String,

    /// Your user id on the dashboard.
    #[arg(long)]
    user_id: String,
}

impl InitArgs {
    pub fn new(api_host: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            api_host: api_host.into(),
            user_id: user_id.into(),
        }
    }

    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// An inclusive date range. Either end defaults to the matching end of the current month.
#[derive(Debug, Parser, Clone, Default)]
pub struct RangeArgs {
    /// First day to include, YYYY-MM-DD.
    #[arg(long)]
    start: Option<String>,

    /// Last day to include, YYYY-MM-DD.
    #[arg(long)]
    end: Option<String>,
}

impl RangeArgs {
    pub fn new(start: Option<&str>, end: Option<&str>) -> Self {
        Self {
            start: start.map(String::from),
            end: end.map(String::from),
        }
    }

    /// Fills the missing ends from the current month on `clock`.
    pub fn resolve(&self, clock: &dyn Clock) -> Result<DateRange> {
        let month = DateRange::month_of(clock.today());
        let start = self.start.clone().unwrap_or_else(|| month.start_param());
        let end = self.end.clone().unwrap_or_else(|| month.end_param());
        DateRange::parse(&start, &end)
    }
}

/// Args for the `ledger-view transactions` command.
#[derive(Debug, Parser, Clone)]
pub struct TransactionsArgs {
    #[clap(flatten)]
    range: RangeArgs,

    /// Only show this category. "All categories" or an empty value shows everything.
    #[arg(long, default_value = ALL_CATEGORIES)]
    category: String,

    /// A click on a column header. Repeat to click again: the first click on a column sorts it
    /// descending, the second ascending. Without this the table is newest first.
    #[arg(long, value_enum)]
    sort: Vec<SortKey>,
}

impl TransactionsArgs {
    pub fn new(range: RangeArgs, category: impl Into<String>, sort: Vec<SortKey>) -> Self {
        Self {
            range,
            category: category.into(),
            sort,
        }
    }

    pub fn range(&self) -> &RangeArgs {
        &self.range
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn sort(&self) -> &[SortKey] {
        &self.sort
    }
}

/// Args for the `ledger-view view` command.
#[derive(Debug, Parser, Clone)]
pub struct ViewArgs {
    /// The transaction id.
    id: i64,

    #[clap(flatten)]
    range: RangeArgs,
}

impl ViewArgs {
    pub fn new(id: i64, range: RangeArgs) -> Self {
        Self { id, range }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn range(&self) -> &RangeArgs {
        &self.range
    }
}

/// Args for the `ledger-view delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The transaction id.
    id: i64,

    /// Do not ask for confirmation.
    #[arg(long, short)]
    yes: bool,

    /// The range the transaction is looked up in.
    #[clap(flatten)]
    range: RangeArgs,
}

impl DeleteArgs {
    pub fn new(id: i64, yes: bool, range: RangeArgs) -> Self {
        Self { id, yes, range }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn yes(&self) -> bool {
        self.yes
    }

    pub fn range(&self) -> &RangeArgs {
        &self.range
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("ledger-view"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or LEDGER_VIEW_HOME instead of relying on the default \
                home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("ledger-view")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::FixedClock;
    use chrono::NaiveDate;

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2024, 2, 10).unwrap())
    }

    #[test]
    fn test_parse_transactions_with_sort_clicks() {
        let args = Args::try_parse_from([
            "ledger-view",
            "--home",
            "/tmp/lv",
            "transactions",
            "--category",
            "Food",
            "--sort",
            "amount",
            "--sort",
            "amount",
        ])
        .unwrap();
        assert_eq!(args.common().home().path(), Path::new("/tmp/lv"));
        let Command::Transactions(t) = args.command() else {
            panic!("expected the transactions command");
        };
        assert_eq!(t.category(), "Food");
        assert_eq!(t.sort(), &[SortKey::Amount, SortKey::Amount]);
    }

    #[test]
    fn test_category_defaults_to_all() {
        let args = Args::try_parse_from(["ledger-view", "transactions"]).unwrap();
        let Command::Transactions(t) = args.command() else {
            panic!("expected the transactions command");
        };
        assert_eq!(t.category(), ALL_CATEGORIES);
        assert!(t.sort().is_empty());
    }

    #[test]
    fn test_parse_delete() {
        let args = Args::try_parse_from(["ledger-view", "delete", "7", "--yes"]).unwrap();
        let Command::Delete(d) = args.command() else {
            panic!("expected the delete command");
        };
        assert_eq!(d.id(), 7);
        assert!(d.yes());
    }

    #[test]
    fn test_range_defaults_to_current_month() {
        let range = RangeArgs::default().resolve(&clock()).unwrap();
        assert_eq!(range.start_param(), "2024-02-01");
        assert_eq!(range.end_param(), "2024-02-29");
    }

    #[test]
    fn test_range_partial_override() {
        let range = RangeArgs::new(Some("2024-01-15"), None)
            .resolve(&clock())
            .unwrap();
        assert_eq!(range.start_param(), "2024-01-15");
        assert_eq!(range.end_param(), "2024-02-29");
    }

    #[test]
    fn test_log_level_parses() {
        let args =
            Args::try_parse_from(["ledger-view", "--log-level", "debug", "categories"]).unwrap();
        assert_eq!(args.common().log_level(), LevelFilter::DEBUG);
        assert_eq!(args.common().output(), OutputFormat::Text);
    }

    #[test]
    fn test_json_output() {
        let args =
            Args::try_parse_from(["ledger-view", "--output", "json", "categories"]).unwrap();
        assert_eq!(args.common().output(), OutputFormat::Json);
    }
}
