//! These structs provide the CLI interface for the expense CLI.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// expense: Record personal expenses.
///
/// Expenses are validated locally and sent to a remote expense API, which is the system of record.
/// Custom categories are kept in a local database and offered after the built-in ones.
///
/// Run `expense init` first to create the data directory.
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
    /// Create the data directory, the configuration file and the local category database.
    ///
    /// By default the data directory is $HOME/expense. Pass --expense-home or set EXPENSE_HOME
    /// to put it somewhere else.
    Init(InitArgs),
    /// Record a new expense.
    Add(AddArgs),
    /// List the expenses recorded by the signed-in user, newest first.
    List,
    /// List, add or reset custom categories.
    Categories(CategoriesArgs),
    /// Change user preferences.
    Settings(SettingsArgs),
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

    /// The directory where expense data and configuration is held. Defaults to ~/expense
    #[arg(long, env = "EXPENSE_HOME", default_value_t = default_expense_home())]
    expense_home: DisplayPath,

    /// The signed-in user. Overrides `user_id` from the config file.
    #[arg(long, env = "EXPENSE_USER")]
    user: Option<String>,
}

impl Common {
    pub fn new(log_level: LevelFilter, expense_home: PathBuf, user: Option<String>) -> Self {
        Self {
            log_level,
            expense_home: expense_home.into(),
            user,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn expense_home(&self) -> &DisplayPath {
        &self.expense_home
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

/// (Not shown): Args for the `expense init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the remote expense API, e.g. https://api.example.com/v1
    #[arg(long)]
    api_url: String,

    /// The name of the remote database that expenses are written to.
    #[arg(long, default_value = "expenses")]
    database_name: String,
}

impl InitArgs {
    pub fn new(api_url: impl Into<String>, database_name: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            database_name: database_name.into(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }
}

/// (Not shown): Args for the `expense add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    /// The amount, a number greater than zero.
    amount: String,

    /// The category. Defaults to the first one offered.
    #[arg(long)]
    category: Option<String>,

    /// The currency code. Defaults to the first configured currency.
    #[arg(long)]
    currency: Option<String>,

    /// A free-form remark.
    #[arg(long)]
    description: Option<String>,

    /// The date shown on the form, as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,
}

impl AddArgs {
    pub fn new(amount: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            category: None,
            currency: None,
            description: None,
            date: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }
}

/// (Not shown): Args for the `expense categories` command.
#[derive(Debug, Parser, Clone)]
pub struct CategoriesArgs {
    #[command(subcommand)]
    command: CategoriesCommand,
}

impl CategoriesArgs {
    pub fn new(command: CategoriesCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &CategoriesCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum CategoriesCommand {
    /// Show every selectable category: the built-in ones, then the custom ones by name.
    List,
    /// Add a custom category.
    Add {
        /// The name of the new category.
        name: String,
    },
    /// Remove every custom category. This cannot be undone.
    Reset,
}

/// (Not shown): Args for the `expense settings` command.
#[derive(Debug, Parser, Clone)]
pub struct SettingsArgs {
    #[command(subcommand)]
    command: SettingsCommand,
}

impl SettingsArgs {
    pub fn new(command: SettingsCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &SettingsCommand {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Set the display language, e.g. `en` or `km`.
    Language {
        /// A language code.
        code: String,
    },
}

fn default_expense_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("expense"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --expense-home or EXPENSE_HOME instead of relying on the default \
                expense home directory.",
            );
            PathBuf::from("expense")
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

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
