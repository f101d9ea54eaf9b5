//! Implements the `ExpenseApi` trait in memory for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without a backend.

use crate::api::{is_success, ExpenseApi};
use crate::model::Expense;
use anyhow::bail;
use std::sync::{Mutex, MutexGuard};

const CREATED: u16 = 201;

/// An in-memory system of record. Accepted expenses are kept per database name. The answer to the
/// next `create_expense` calls can be scripted with `respond_with_status` and `fail_transport`.
#[derive(Debug, Default)]
pub struct TestApi {
    state: Mutex<TestApiState>,
}

#[derive(Debug, Default)]
struct TestApiState {
    records: Vec<(String, Expense)>,
    status: Option<u16>,
    transport_error: Option<String>,
    create_calls: usize,
    list_calls: usize,
}

impl TestApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every following `create_expense` with `status`.
    pub fn respond_with_status(&self, status: u16) {
        self.state().status = Some(status);
    }

    /// Fail every following call as if the network were down.
    pub fn fail_transport(&self, message: impl Into<String>) {
        self.state().transport_error = Some(message.into());
    }

    /// Go back to accepting everything.
    pub fn recover(&self) {
        let mut state = self.state();
        state.status = None;
        state.transport_error = None;
    }

    pub fn create_calls(&self) -> usize {
        self.state().create_calls
    }

    pub fn list_calls(&self) -> usize {
        self.state().list_calls
    }

    /// The expenses accepted into `database_name`, in the order they arrived.
    pub fn records(&self, database_name: &str) -> Vec<Expense> {
        self.state()
            .records
            .iter()
            .filter(|(db, _)| db == database_name)
            .map(|(_, expense)| expense.clone())
            .collect()
    }

    fn state(&self) -> MutexGuard<'_, TestApiState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl ExpenseApi for TestApi {
    async fn create_expense(&self, database_name: &str, expense: &Expense) -> anyhow::Result<u16> {
        let mut state = self.state();
        state.create_calls += 1;
        if let Some(message) = &state.transport_error {
            bail!("{message}");
        }
        let status = state.status.unwrap_or(CREATED);
        if is_success(status) {
            state
                .records
                .push((database_name.to_string(), expense.clone()));
        }
        Ok(status)
    }

    async fn list_expenses(
        &self,
        database_name: &str,
        created_by: &str,
    ) -> anyhow::Result<Vec<Expense>> {
        let mut state = self.state();
        state.list_calls += 1;
        if let Some(message) = &state.transport_error {
            bail!("{message}");
        }
        let mut expenses: Vec<Expense> = state
            .records
            .iter()
            .rev()
            .filter(|(db, e)| db == database_name && e.created_by() == created_by)
            .map(|(_, e)| e.clone())
            .collect();
        // Stable, so records with the same timestamp stay latest-first.
        expenses.sort_by(|a, b| b.created_date().cmp(&a.created_date()));
        Ok(expenses)
    }
}
