use clap::Parser;
use expense_entry::args::{Args, CategoriesCommand, Command, SettingsCommand};
use expense_entry::{commands, Config, Error, ErrorType, Mode, Result};
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().expense_home().path();
    let user = args.common().user();

    // This allows for running the program without a backend. When EXPENSE_IN_TEST_MODE is set and
    // non-empty, then the mode will be Mode::Testing, otherwise it will be Mode::Http.
    let mode = Mode::from_env();

    let _: () = match args.command() {
        Command::Init(init_args) => {
            commands::init(home, init_args.api_url(), init_args.database_name())
                .await?
                .print()
        }

        Command::Add(add_args) => {
            let config = load(home).await?;
            commands::add_expense(config, mode, user, add_args.clone())
                .await?
                .print()
        }

        Command::List => {
            let config = load(home).await?;
            commands::list_expenses(config, mode, user).await?.print()
        }

        Command::Categories(categories_args) => {
            let config = load(home).await?;
            match categories_args.command() {
                CategoriesCommand::List => commands::list_categories(config).await?.print(),
                CategoriesCommand::Add { name } => commands::add_category(config, mode, name)
                    .await?
                    .print(),
                CategoriesCommand::Reset => commands::reset_categories(config).await?.print(),
            }
        }

        Command::Settings(settings_args) => {
            let config = load(home).await?;
            match settings_args.command() {
                SettingsCommand::Language { code } => {
                    commands::set_language(config, mode, code).await?.print()
                }
            }
        }
    };
    Ok(())
}

async fn load(home: &Path) -> Result<Config> {
    Config::load(home)
        .await
        .map_err(|e| Error::new(ErrorType::Config, e))
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                "expense_entry",
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
