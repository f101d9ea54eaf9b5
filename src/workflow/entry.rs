use crate::error::ValidationError;
use crate::model::ExpenseInput;
use crate::service::Outcome;
use crate::ui::ViewToken;
use crate::workflow::refresh;
use crate::workflow::{Screen, Tab, ToastLength, Ui};
use chrono::{Local, NaiveDate};
use tracing::{debug, info, trace};

const DATE_FORMAT: &str = "%d/%m/%Y";
const SAVE_LABEL: &str = "Add Expense";
const BUSY_LABEL: &str = "Saving...";

/// Where the entry form is in its submission cycle. A submission always ends back in `Editing`;
/// how it ended is kept in `EntryView::last_outcome`.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum EntryState {
    #[default]
    Editing,
    Submitting,
}

/// The expense entry form.
#[derive(Debug)]
pub struct EntryView {
    token: ViewToken,
    state: EntryState,
    amount: String,
    description: String,
    date: NaiveDate,
    currencies: Vec<String>,
    currency_index: usize,
    categories: Vec<String>,
    category_index: usize,
    amount_error: Option<String>,
    category_error: Option<String>,
    last_outcome: Option<Outcome>,
    category_loads: usize,
}

impl EntryView {
    pub(super) fn new(token: ViewToken, currencies: Vec<String>) -> Self {
        Self {
            token,
            state: EntryState::Editing,
            amount: String::new(),
            description: String::new(),
            date: today(),
            currencies,
            currency_index: 0,
            categories: Vec::new(),
            category_index: 0,
            amount_error: None,
            category_error: None,
            last_outcome: None,
            category_loads: 0,
        }
    }

    pub fn token(&self) -> ViewToken {
        self.token
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The date as the form displays it, `dd/MM/yyyy`.
    pub fn date_text(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    pub fn currencies(&self) -> &[String] {
        &self.currencies
    }

    pub fn selected_currency(&self) -> Option<&str> {
        self.currencies.get(self.currency_index).map(String::as_str)
    }

    /// The selectable categories: built-in names first, then the custom ones.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.categories.get(self.category_index).map(String::as_str)
    }

    pub fn amount_error(&self) -> Option<&str> {
        self.amount_error.as_deref()
    }

    pub fn category_error(&self) -> Option<&str> {
        self.category_error.as_deref()
    }

    /// The outcome of the most recent submission that reached the remote API.
    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }

    /// How many category loads have been applied to this form.
    pub fn category_loads(&self) -> usize {
        self.category_loads
    }

    pub fn button_label(&self) -> &'static str {
        if self.state == EntryState::Submitting {
            BUSY_LABEL
        } else {
            SAVE_LABEL
        }
    }

    pub fn is_button_enabled(&self) -> bool {
        self.state != EntryState::Submitting
    }

    pub fn set_amount(&mut self, text: impl Into<String>) {
        self.amount = text.into();
        self.amount_error = None;
    }

    pub fn set_description(&mut self, text: impl Into<String>) {
        self.description = text.into();
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
    }

    /// Selects the first currency called `code`. Returns `false` if there is none.
    pub fn select_currency(&mut self, code: &str) -> bool {
        match self.currencies.iter().position(|c| c == code) {
            Some(ix) => {
                self.currency_index = ix;
                true
            }
            None => false,
        }
    }

    /// Selects the first category called `name`. Returns `false` if there is none.
    pub fn select_category(&mut self, name: &str) -> bool {
        match self.categories.iter().position(|c| c == name) {
            Some(ix) => {
                self.category_index = ix;
                self.category_error = None;
                true
            }
            None => false,
        }
    }

    /// Resets every field to its initial value. The category list itself is kept.
    pub fn clear(&mut self) {
        self.amount.clear();
        self.description.clear();
        self.currency_index = 0;
        self.category_index = 0;
        self.date = today();
        self.amount_error = None;
        self.category_error = None;
    }

    /// Replaces the category list. The selection follows the selected name if it is still
    /// offered, otherwise the first entry is selected.
    fn apply_categories(&mut self, names: Vec<String>) {
        let selected = self.selected_category().map(str::to_string);
        self.category_index = selected
            .and_then(|name| names.iter().position(|n| *n == name))
            .unwrap_or(0);
        self.categories = names;
        self.category_loads += 1;
    }

    fn input(&self, user_id: &str) -> ExpenseInput {
        ExpenseInput {
            amount_text: self.amount.clone(),
            currency: self.selected_currency().unwrap_or_default().to_string(),
            category: self.selected_category().unwrap_or_default().to_string(),
            remark: self.description.clone(),
            user_id: user_id.to_string(),
        }
    }

    fn show_validation_error(&mut self, error: ValidationError) {
        debug!("Entry form is invalid: {error}");
        match error {
            ValidationError::EmptyAmount | ValidationError::InvalidAmount(_) => {
                self.amount_error = Some(error.to_string())
            }
            ValidationError::EmptyCategory | ValidationError::EmptyCategoryName => {
                self.category_error = Some(error.to_string())
            }
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl Screen {
    /// Reloads the category list of the entry form in the background. A store failure leaves the
    /// built-in categories only. Does nothing if the form is not mounted.
    pub fn load_categories(&mut self, ui: &Ui) {
        let Some(entry) = self.entry.as_ref() else {
            return;
        };
        let token = entry.token();
        let picker = self.services().picker.clone();
        ui.run_in_background(
            async move { picker.load().await },
            move |screen: &mut Screen, _: &Ui, names: Vec<String>| match screen.entry_for(token) {
                Some(entry) => {
                    trace!("Applying {} categories to the entry form", names.len());
                    entry.apply_categories(names);
                }
                None => debug!("Discarding categories loaded for a torn-down entry form"),
            },
        );
    }

    /// Validates the form and, if it is valid, submits it in the background. Validation errors are
    /// shown on their fields and nothing is sent. Ignored while a submission is in flight.
    pub fn save_expense(&mut self, ui: &Ui) {
        let services = self.services().clone();
        let Some(entry) = self.entry.as_mut() else {
            debug!("The entry form is not mounted");
            return;
        };
        if entry.state == EntryState::Submitting {
            debug!("A submission is already in flight");
            return;
        }
        entry.amount_error = None;
        entry.category_error = None;
        let expense = match services.submitter.prepare(&entry.input(services.user_id())) {
            Ok(expense) => expense,
            Err(e) => {
                entry.show_validation_error(e);
                return;
            }
        };

        info!("Submitting expense {}", expense.id());
        entry.state = EntryState::Submitting;
        let token = entry.token();
        let submitter = services.submitter.clone();
        ui.run_in_background(
            async move { submitter.send(expense).await },
            move |screen: &mut Screen, ui: &Ui, outcome: Outcome| {
                screen.finish_submission(ui, token, outcome)
            },
        );
    }

    fn finish_submission(&mut self, ui: &Ui, token: ViewToken, outcome: Outcome) {
        let Some(entry) = self.entry_for(token) else {
            debug!("Discarding a submission outcome for a torn-down entry form");
            return;
        };
        let (message, length) = match &outcome {
            Outcome::Accepted(_) => {
                entry.clear();
                ("Expense saved successfully!".to_string(), ToastLength::Short)
            }
            Outcome::Rejected { status } => {
                (format!("Failed to save expense: {status}"), ToastLength::Long)
            }
            Outcome::TransportError(message) => (format!("Error: {message}"), ToastLength::Long),
        };
        let accepted = outcome.is_accepted();
        entry.last_outcome = Some(outcome);
        entry.state = EntryState::Editing;

        if accepted {
            self.show_tab(ui, Tab::ExpenseList);
            self.toast(message, length);
            refresh::propagate(ui, self.services().refresh_pulses.clone());
        } else {
            self.toast(message, length);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;
    use crate::test::{FailingStore, TestEnv};
    use crate::ui::UiLoop;
    use crate::workflow::{Services, Toast};
    use std::sync::Arc;

    async fn entry_loop(env: &TestEnv) -> UiLoop<Screen> {
        let mut ui = UiLoop::new(Screen::new(env.services()));
        ui.dispatch(|screen, ui| screen.show_tab(ui, Tab::AddExpense));
        ui.run_until_idle().await;
        ui
    }

    fn fill(ui: &mut UiLoop<Screen>, amount: &str, category: &str) {
        ui.dispatch(|screen, _| {
            let entry = screen.entry_mut().unwrap();
            entry.set_amount(amount);
            assert!(entry.select_category(category));
        });
    }

    #[tokio::test]
    async fn test_mount_loads_built_in_and_custom_categories() {
        let env = TestEnv::new().await;
        env.store().insert("Gym").await.unwrap();
        let ui = entry_loop(&env).await;

        let entry = ui.state().entry().unwrap();
        assert_eq!(entry.categories().first().unwrap(), "Food");
        assert_eq!(entry.categories().last().unwrap(), "Gym");
        assert_eq!(entry.selected_category(), Some("Food"));
        assert_eq!(entry.selected_currency(), Some("USD"));
        assert_eq!(entry.button_label(), "Add Expense");
        assert_eq!(entry.category_loads(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_shows_built_ins_only() {
        let env = TestEnv::new().await;
        let services = Services::new(
            vec!["Food".to_string(), "Other".to_string()],
            vec!["USD".to_string()],
            Arc::new(FailingStore),
            env.api(),
            env.preferences(),
            "expenses",
            "",
        );
        let mut ui = UiLoop::new(Screen::new(Arc::new(services)));
        ui.dispatch(|screen, ui| screen.show_tab(ui, Tab::AddExpense));
        ui.run_until_idle().await;
        assert_eq!(ui.state().entry().unwrap().categories(), &["Food", "Other"]);
        assert!(ui.state().toasts().is_empty());
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let env = TestEnv::new().await;
        let mut ui = entry_loop(&env).await;
        fill(&mut ui, "12.50", "Transport");
        ui.dispatch(|screen, _| {
            let entry = screen.entry_mut().unwrap();
            entry.set_description("taxi");
            entry.set_date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
            assert!(entry.select_currency("KHR"));
        });

        ui.dispatch(|screen, ui| screen.save_expense(ui));
        let entry = ui.state().entry().unwrap();
        assert_eq!(entry.state(), EntryState::Submitting);
        assert_eq!(entry.button_label(), "Saving...");
        assert!(!entry.is_button_enabled());

        ui.run_until_idle().await;
        let records = env.api().records("expenses");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].category(), "Transport");
        assert_eq!(records[0].currency(), "KHR");
        assert_eq!(records[0].remark(), "taxi");
        assert_eq!(records[0].created_by(), "uid-1");

        let screen = ui.state();
        let entry = screen.entry().unwrap();
        assert_eq!(entry.state(), EntryState::Editing);
        assert_eq!(entry.amount(), "");
        assert_eq!(entry.description(), "");
        assert_eq!(entry.selected_currency(), Some("USD"));
        assert_eq!(entry.selected_category(), Some("Food"));
        assert_eq!(entry.date(), today());
        assert!(entry.last_outcome().unwrap().is_accepted());
        assert_eq!(screen.tab(), Tab::ExpenseList);
        assert_eq!(
            screen.toasts(),
            &[Toast {
                message: "Expense saved successfully!".to_string(),
                length: ToastLength::Short
            }]
        );
    }

    #[tokio::test]
    async fn test_refresh_pulses_after_success() {
        let env = TestEnv::new().await;
        let mut ui = entry_loop(&env).await;
        ui.dispatch(|screen, ui| screen.show_tab(ui, Tab::Home));
        ui.dispatch(|screen, ui| screen.show_tab(ui, Tab::AddExpense));
        ui.run_until_idle().await;
        let lists_before = env.api().list_calls();

        fill(&mut ui, "3", "Food");
        ui.dispatch(|screen, ui| screen.save_expense(ui));
        ui.run_until_idle().await;

        let screen = ui.state();
        let list = screen.list().unwrap();
        // Mounting the list loads it once, then every pulse reloads it.
        assert_eq!(list.reloads(), 1 + 6);
        assert_eq!(list.expenses().len(), 1);
        assert_eq!(screen.home().unwrap().reloads(), 1 + 6);
        assert_eq!(
            screen.home().unwrap().last_expense().unwrap().category(),
            "Food"
        );
        assert_eq!(env.api().list_calls() - lists_before, 7 + 6);
    }

    #[tokio::test]
    async fn test_invalid_amounts_are_shown_inline() {
        let env = TestEnv::new().await;
        let mut ui = entry_loop(&env).await;

        for (text, expected) in [
            ("", "Please enter an amount"),
            ("abc", "Please enter a valid amount greater than zero, got 'abc'"),
            ("0", "Please enter a valid amount greater than zero, got '0'"),
            ("-5", "Please enter a valid amount greater than zero, got '-5'"),
        ] {
            fill(&mut ui, text, "Food");
            ui.dispatch(|screen, ui| screen.save_expense(ui));
            ui.run_until_idle().await;
            let entry = ui.state().entry().unwrap();
            assert_eq!(entry.amount_error(), Some(expected));
            assert_eq!(entry.state(), EntryState::Editing);
            assert_eq!(entry.amount(), text);
        }
        assert_eq!(env.api().create_calls(), 0);
        assert!(ui.state().toasts().is_empty());
    }

    #[tokio::test]
    async fn test_empty_category_list() {
        let env = TestEnv::new().await;
        let services = Services::new(
            Vec::new(),
            vec!["USD".to_string()],
            env.store(),
            env.api(),
            env.preferences(),
            "expenses",
            "",
        );
        let mut ui = UiLoop::new(Screen::new(Arc::new(services)));
        ui.dispatch(|screen, ui| screen.show_tab(ui, Tab::AddExpense));
        ui.run_until_idle().await;
        ui.dispatch(|screen, ui| {
            screen.entry_mut().unwrap().set_amount("5");
            screen.save_expense(ui);
        });
        assert_eq!(
            ui.state().entry().unwrap().category_error(),
            Some("Please select a category")
        );
        assert_eq!(env.api().create_calls(), 0);
    }

    #[tokio::test]
    async fn test_rejected_keeps_form() {
        let env = TestEnv::new().await;
        env.api().respond_with_status(500);
        let mut ui = entry_loop(&env).await;
        ui.dispatch(|screen, ui| screen.show_tab(ui, Tab::Home));
        ui.dispatch(|screen, ui| screen.show_tab(ui, Tab::AddExpense));
        ui.run_until_idle().await;
        let lists_before = env.api().list_calls();
        let home_reloads = ui.state().home().unwrap().reloads();
        fill(&mut ui, "7", "Bills");

        ui.dispatch(|screen, ui| screen.save_expense(ui));
        ui.run_until_idle().await;
        assert_eq!(env.api().list_calls(), lists_before);
        let screen = ui.state();
        assert_eq!(screen.home().unwrap().reloads(), home_reloads);
        let entry = screen.entry().unwrap();
        assert_eq!(entry.amount(), "7");
        assert_eq!(entry.selected_category(), Some("Bills"));
        assert_eq!(entry.state(), EntryState::Editing);
        assert_eq!(
            entry.last_outcome(),
            Some(&Outcome::Rejected { status: 500 })
        );
        assert_eq!(screen.tab(), Tab::AddExpense);
        assert_eq!(screen.toasts()[0].message, "Failed to save expense: 500");
        assert_eq!(screen.toasts()[0].length, ToastLength::Long);
        assert!(screen.list().is_none());
    }

    #[tokio::test]
    async fn test_transport_error_then_retry() {
        let env = TestEnv::new().await;
        env.api().fail_transport("connection refused");
        let mut ui = entry_loop(&env).await;
        fill(&mut ui, "2.25", "Health");

        ui.dispatch(|screen, ui| screen.save_expense(ui));
        ui.run_until_idle().await;
        assert_eq!(
            ui.state().toasts()[0].message,
            "Error: connection refused"
        );
        assert_eq!(ui.state().entry().unwrap().amount(), "2.25");

        env.api().recover();
        ui.dispatch(|screen, ui| screen.save_expense(ui));
        ui.run_until_idle().await;
        assert_eq!(env.api().records("expenses").len(), 1);
        assert_eq!(env.api().create_calls(), 2);
        assert_eq!(ui.state().tab(), Tab::ExpenseList);
    }

    #[tokio::test]
    async fn test_second_save_while_submitting_is_ignored() {
        let env = TestEnv::new().await;
        let mut ui = entry_loop(&env).await;
        fill(&mut ui, "1", "Food");
        ui.dispatch(|screen, ui| {
            screen.save_expense(ui);
            screen.save_expense(ui);
        });
        ui.run_until_idle().await;
        assert_eq!(env.api().create_calls(), 1);
    }

    #[tokio::test]
    async fn test_outcome_for_torn_down_form_is_discarded() {
        let env = TestEnv::new().await;
        let mut ui = entry_loop(&env).await;
        fill(&mut ui, "9", "Food");
        ui.dispatch(|screen, ui| {
            screen.save_expense(ui);
            screen.recreate(ui);
        });
        ui.run_until_idle().await;

        // The request was sent, but the new form never hears about it.
        assert_eq!(env.api().create_calls(), 1);
        let screen = ui.state();
        assert!(screen.toasts().is_empty());
        assert_eq!(screen.tab(), Tab::AddExpense);
        assert!(screen.entry().unwrap().last_outcome().is_none());
    }

    #[tokio::test]
    async fn test_reload_keeps_selected_category() {
        let env = TestEnv::new().await;
        let mut ui = entry_loop(&env).await;
        fill(&mut ui, "1", "Shopping");
        env.store().insert("Books").await.unwrap();
        ui.dispatch(|screen, ui| screen.load_categories(ui));
        ui.run_until_idle().await;
        let entry = ui.state().entry().unwrap();
        assert_eq!(entry.selected_category(), Some("Shopping"));
        assert!(entry.categories().contains(&"Books".to_string()));
    }

    #[tokio::test]
    async fn test_date_defaults_to_today() {
        let env = TestEnv::new().await;
        let mut ui = entry_loop(&env).await;
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        ui.dispatch(|screen, _| screen.entry_mut().unwrap().set_date(date));
        assert_eq!(ui.state().entry().unwrap().date_text(), "29/02/2024");
        ui.dispatch(|screen, _| screen.entry_mut().unwrap().clear());
        assert_eq!(ui.state().entry().unwrap().date(), today());
    }

    #[test]
    fn test_validation_errors_are_tagged() {
        let err: crate::Error = ValidationError::EmptyCategory.into();
        assert_eq!(err.error_type(), ErrorType::Validation);
    }
}
