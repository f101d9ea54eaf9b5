//! Validates user-entered expenses and submits them to the remote system of record.

use crate::api::{is_success, ExpenseApi};
use crate::error::{Error, ErrorType, ValidationError};
use crate::model::{Amount, Expense, ExpenseInput};
use chrono::{DateTime, SubsecRound, Utc};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};
use uuid::Uuid;

/// The result of sending an expense to the remote API. Neither failure is retried; the user must
/// submit again, which can create a duplicate if the server had in fact stored the first attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The remote API answered with a 2xx status.
    Accepted(Expense),
    /// The remote API answered with any other status.
    Rejected { status: u16 },
    /// No answer was received.
    TransportError(String),
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }

    /// Converts the outcome into a `Result`, tagging failures as `Rejected` or `Transport`.
    pub fn into_result(self) -> crate::Result<Expense> {
        match self {
            Outcome::Accepted(expense) => Ok(expense),
            Outcome::Rejected { status } => Err(Error::new(
                ErrorType::Rejected,
                anyhow::anyhow!("Failed to save expense: {status}"),
            )),
            Outcome::TransportError(message) => Err(Error::new(
                ErrorType::Transport,
                anyhow::anyhow!("Error: {message}"),
            )),
        }
    }
}

/// Builds `Expense` records from form input and sends them to `database_name`.
pub struct SubmissionService {
    api: Arc<dyn ExpenseApi>,
    database_name: String,
    last_timestamp: Mutex<DateTime<Utc>>,
}

impl SubmissionService {
    pub fn new(api: Arc<dyn ExpenseApi>, database_name: impl Into<String>) -> Self {
        Self {
            api,
            database_name: database_name.into(),
            last_timestamp: Mutex::new(DateTime::<Utc>::MIN_UTC),
        }
    }

    /// Validates `input` and builds the record that would be sent, with a fresh id and timestamp.
    /// Nothing is sent.
    ///
    /// # Errors
    /// - `EmptyAmount` if the amount text is empty.
    /// - `InvalidAmount` if it is not a number or not greater than zero.
    /// - `EmptyCategory` if no category is given.
    pub fn prepare(&self, input: &ExpenseInput) -> Result<Expense, ValidationError> {
        let amount = Amount::parse(&input.amount_text)?;
        let category = input.category.trim();
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        Ok(Expense {
            id: Uuid::new_v4().to_string(),
            amount,
            currency: input.currency.clone(),
            category: category.to_string(),
            remark: input.remark.trim().to_string(),
            created_by: input.user_id.clone(),
            created_date: self.next_timestamp(),
        })
    }

    /// Sends an already prepared expense. Exactly one remote call is made.
    pub async fn send(&self, expense: Expense) -> Outcome {
        match self.api.create_expense(&self.database_name, &expense).await {
            Ok(status) if is_success(status) => {
                debug!("Expense {} accepted with status {status}", expense.id());
                Outcome::Accepted(expense)
            }
            Ok(status) => {
                warn!("Expense {} rejected with status {status}", expense.id());
                Outcome::Rejected { status }
            }
            Err(e) => {
                warn!("Expense {} was not delivered: {e:#}", expense.id());
                Outcome::TransportError(format!("{e:#}"))
            }
        }
    }

    /// `prepare` followed by `send`. Invalid input never reaches the network.
    pub async fn submit(&self, input: &ExpenseInput) -> Result<Outcome, ValidationError> {
        let expense = self.prepare(input)?;
        Ok(self.send(expense).await)
    }

    /// The current time at millisecond precision, never earlier than the previous timestamp.
    fn next_timestamp(&self) -> DateTime<Utc> {
        let now = Utc::now().trunc_subsecs(3);
        let mut last = self
            .last_timestamp
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let timestamp = now.max(*last);
        *last = timestamp;
        timestamp
    }
}
