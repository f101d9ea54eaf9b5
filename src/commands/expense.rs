//! Expense command handlers.

use crate::api::{expense_api, Mode};
use crate::args::AddArgs;
use crate::commands::{last_toast, screen, Out};
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::Expense;
use crate::workflow::{EntryView, Screen, Tab};
use crate::{Config, Result};
use anyhow::{anyhow, Context};
use tracing::debug;

/// Fills in the expense entry form from `args` and saves it.
///
/// # Returns
///
/// On success, returns an `Out` containing the expense as it was accepted by the remote API.
///
/// # Errors
///
/// - `ErrorType::Validation` if the amount is invalid, or the category or currency is not offered.
/// - `ErrorType::Rejected` if the remote API answered with a non-success status.
/// - `ErrorType::Transport` if the remote API could not be reached.
pub async fn add_expense(
    config: Config,
    mode: Mode,
    user: Option<&str>,
    args: AddArgs,
) -> Result<Out<Expense>> {
    let mut ui = screen(&config, mode, user)?;
    ui.dispatch(|screen, ui| screen.show_tab(ui, Tab::AddExpense));
    ui.run_until_idle().await;

    ui.dispatch(|screen, _| fill_form(screen, &args))?;
    ui.dispatch(|screen, ui| screen.save_expense(ui));
    ui.run_until_idle().await;

    let screen = ui.state();
    let entry = entry(screen)?;
    if let Some(message) = entry.amount_error().or(entry.category_error()) {
        return Err(Error::new(ErrorType::Validation, anyhow!("{message}")));
    }
    let outcome = entry
        .last_outcome()
        .cloned()
        .context("The expense was not submitted")
        .pub_result(ErrorType::Service)?;
    let expense = outcome.into_result()?;
    let message = last_toast(screen).unwrap_or_else(|| format!("Saved expense {}", expense.id()));
    Ok(Out::new(message, expense))
}

/// Fetches the expenses recorded by the signed-in user, newest first.
///
/// # Errors
///
/// - `ErrorType::Transport` if the remote API could not be reached or refused to answer.
pub async fn list_expenses(
    config: Config,
    mode: Mode,
    user: Option<&str>,
) -> Result<Out<Vec<Expense>>> {
    let api = expense_api(&config, mode).pub_result(ErrorType::Config)?;
    let user = user.unwrap_or(config.user_id());
    let expenses = api
        .list_expenses(config.database_name(), user)
        .await
        .context("Unable to list expenses")
        .pub_result(ErrorType::Transport)?;
    debug!("Fetched {} expenses", expenses.len());

    let mut message = format!("{} expenses", expenses.len());
    for expense in &expenses {
        message.push_str(&format!(
            "\n{}  {:>12} {}  {}  {}",
            expense.created_date().format("%Y-%m-%d %H:%M"),
            expense.amount(),
            expense.currency(),
            expense.category(),
            expense.remark()
        ));
    }
    Ok(Out::new(message, expenses))
}

fn fill_form(screen: &mut Screen, args: &AddArgs) -> Result<()> {
    let entry = screen
        .entry_mut()
        .context("The entry form is not mounted")
        .pub_result(ErrorType::Service)?;
    entry.set_amount(args.amount());
    if let Some(description) = args.description() {
        entry.set_description(description);
    }
    if let Some(date) = args.date() {
        entry.set_date(date);
    }
    if let Some(currency) = args.currency() {
        if !entry.select_currency(currency) {
            return Err(Error::new(
                ErrorType::Validation,
                anyhow!(
                    "Unknown currency '{currency}', expected one of: {}",
                    entry.currencies().join(", ")
                ),
            ));
        }
    }
    if let Some(category) = args.category() {
        if !entry.select_category(category) {
            return Err(Error::new(
                ErrorType::Validation,
                anyhow!(
                    "Unknown category '{category}', expected one of: {}",
                    entry.categories().join(", ")
                ),
            ));
        }
    }
    Ok(())
}

fn entry(screen: &Screen) -> Result<&EntryView> {
    screen
        .entry()
        .context("The entry form is not mounted")
        .pub_result(ErrorType::Service)
}
