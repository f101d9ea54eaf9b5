//! Access to the remote system of record that durably stores accepted expenses.
//!
//! The `ExpenseApi` trait is implemented by `HttpApi`, which talks to the real backend, and by
//! `TestApi`, which keeps everything in memory. Which one is used is decided by `Mode`.

mod http;
mod test_api;

use crate::error::Res;
use crate::model::Expense;
use crate::Config;
use std::sync::Arc;

pub(crate) use http::HttpApi;
pub use test_api::TestApi;

/// When this environment variable is set and non-empty the program runs against `TestApi`.
pub const TEST_MODE_ENV: &str = "EXPENSE_IN_TEST_MODE";

/// Whether the remote API is the real backend or the in-memory test double.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Mode {
    #[default]
    Http,
    Testing,
}

impl Mode {
    /// Returns `Mode::Testing` if `EXPENSE_IN_TEST_MODE` is set to a non-empty value, otherwise
    /// `Mode::Http`.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Testing,
            _ => Mode::Http,
        }
    }
}

/// The remote expense API.
#[async_trait::async_trait]
pub trait ExpenseApi: Send + Sync {
    /// Sends `expense` to the collection named `database_name`.
    ///
    /// Returns the status code of the answer, whatever it is. An `Err` means that no answer was
    /// received at all.
    async fn create_expense(&self, database_name: &str, expense: &Expense) -> anyhow::Result<u16>;

    /// Returns the expenses created by `created_by`, most recent first.
    async fn list_expenses(
        &self,
        database_name: &str,
        created_by: &str,
    ) -> anyhow::Result<Vec<Expense>>;
}

/// Returns `true` for 2xx status codes.
pub(crate) fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Creates the `ExpenseApi` for `mode`.
pub(crate) fn expense_api(config: &Config, mode: Mode) -> Res<Arc<dyn ExpenseApi>> {
    Ok(match mode {
        Mode::Http => Arc::new(HttpApi::new(config.api_url())?),
        Mode::Testing => Arc::new(TestApi::default()),
    })
}
