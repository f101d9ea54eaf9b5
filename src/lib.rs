//! Record personal expenses against a remote system of record.
//!
//! Expenses are entered on a form, validated locally, and sent to a remote expense API. The set of
//! selectable categories is a fixed built-in list followed by custom categories that are kept in a
//! local SQLite database. The screens run on a single-threaded `ui::UiLoop`; storage and network
//! calls run on background workers.

mod api;
pub mod args;
pub mod commands;
mod config;
mod db;
mod error;
mod model;
mod picker;
mod service;
pub mod ui;
mod utils;
pub mod workflow;

#[cfg(test)]
mod test;

pub use api::{ExpenseApi, Mode, TestApi, TEST_MODE_ENV};
pub use config::Config;
pub use db::CategoryStore;
pub use error::{Error, ErrorType, Result, ValidationError};
pub use model::{Amount, Category, Expense, ExpenseInput, BUILT_IN_CATEGORIES, DEFAULT_CURRENCIES};
pub use picker::CategoryPicker;
pub use service::{Outcome, SubmissionService};
