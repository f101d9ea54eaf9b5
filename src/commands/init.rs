use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory and:
/// - Creates an initial `config.json` file using `api_url` and `database_name` along with defaults
/// - Creates the local category database
///
/// # Arguments
/// - `expense_home` - The directory that will be the root of data directory, e.g. `$HOME/expense`
/// - `api_url` - The base URL of the remote expense API.
/// - `database_name` - The remote database that expenses are written to.
///
/// # Errors
/// - Returns an error if the directory is already initialized or any file operation fails.
pub async fn init(expense_home: &Path, api_url: &str, database_name: &str) -> Result<Out<()>> {
    let _config = Config::create(expense_home, api_url, database_name)
        .await
        .context("Unable to create the data directory and configs")
        .pub_result(ErrorType::Config)?;
    Ok("Successfully created the expense directory and config".into())
}
