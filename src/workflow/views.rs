//! The read-only views that show what the remote API holds.

use crate::model::Expense;
use crate::ui::ViewToken;
use crate::workflow::{Screen, Ui};
use tracing::{debug, warn};

/// The signed-in user's expenses, newest first.
#[derive(Debug)]
pub struct ListView {
    token: ViewToken,
    expenses: Vec<Expense>,
    reloads: usize,
}

impl ListView {
    pub(super) fn new(token: ViewToken) -> Self {
        Self {
            token,
            expenses: Vec::new(),
            reloads: 0,
        }
    }

    pub fn token(&self) -> ViewToken {
        self.token
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// How many reloads have been requested since the view was mounted.
    pub fn reloads(&self) -> usize {
        self.reloads
    }
}

/// Shows the most recent expense.
#[derive(Debug)]
pub struct HomeView {
    token: ViewToken,
    last_expense: Option<Expense>,
    reloads: usize,
}

impl HomeView {
    pub(super) fn new(token: ViewToken) -> Self {
        Self {
            token,
            last_expense: None,
            reloads: 0,
        }
    }

    pub fn token(&self) -> ViewToken {
        self.token
    }

    pub fn last_expense(&self) -> Option<&Expense> {
        self.last_expense.as_ref()
    }

    pub fn reloads(&self) -> usize {
        self.reloads
    }
}

impl Screen {
    /// Fetches the expense list again. A failure is logged and the previous contents are kept.
    pub fn reload_list(&mut self, ui: &Ui) {
        let services = self.services().clone();
        let Some(list) = self.list.as_mut() else {
            return;
        };
        list.reloads += 1;
        let token = list.token;
        ui.run_in_background(
            async move {
                services
                    .api
                    .list_expenses(services.database_name(), services.user_id())
                    .await
            },
            move |screen: &mut Screen, _: &Ui, result: anyhow::Result<Vec<Expense>>| {
                let Some(list) = screen.list_for(token) else {
                    debug!("Discarding expenses loaded for a torn-down list");
                    return;
                };
                match result {
                    Ok(expenses) => list.expenses = expenses,
                    Err(e) => warn!("Unable to load expenses: {e:#}"),
                }
            },
        );
    }

    /// Fetches the most recent expense again. A failure is logged and the previous one is kept.
    pub fn reload_home(&mut self, ui: &Ui) {
        let services = self.services().clone();
        let Some(home) = self.home.as_mut() else {
            return;
        };
        home.reloads += 1;
        let token = home.token;
        ui.run_in_background(
            async move {
                services
                    .api
                    .list_expenses(services.database_name(), services.user_id())
                    .await
            },
            move |screen: &mut Screen, _: &Ui, result: anyhow::Result<Vec<Expense>>| {
                let Some(home) = screen.home_for(token) else {
                    debug!("Discarding the last expense loaded for a torn-down home view");
                    return;
                };
                match result {
                    Ok(expenses) => home.last_expense = expenses.into_iter().next(),
                    Err(e) => warn!("Unable to load the last expense: {e:#}"),
                }
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use crate::ui::UiLoop;
    use crate::workflow::Tab;

    #[tokio::test]
    async fn test_list_failure_keeps_previous_contents() {
        let env = TestEnv::new().await;
        let mut ui = UiLoop::new(Screen::new(env.services()));
        ui.dispatch(|screen, ui| {
            screen.show_tab(ui, Tab::AddExpense);
            let entry = screen.entry_mut().unwrap();
            entry.set_amount("4");
        });
        ui.run_until_idle().await;
        ui.dispatch(|screen, ui| screen.save_expense(ui));
        ui.run_until_idle().await;
        assert_eq!(ui.state().list().unwrap().expenses().len(), 1);

        env.api().fail_transport("offline");
        ui.dispatch(|screen, ui| screen.reload_list(ui));
        ui.run_until_idle().await;
        assert_eq!(ui.state().list().unwrap().expenses().len(), 1);
        assert_eq!(ui.state().toasts().len(), 1);
    }

    #[tokio::test]
    async fn test_home_shows_newest_expense() {
        let env = TestEnv::new().await;
        let mut ui = UiLoop::new(Screen::new(env.services()));
        ui.dispatch(|screen, ui| screen.show_tab(ui, Tab::AddExpense));
        ui.run_until_idle().await;
        for amount in ["1", "2"] {
            ui.dispatch(|screen, ui| {
                screen.show_tab(ui, Tab::AddExpense);
                screen.entry_mut().unwrap().set_amount(amount);
                screen.save_expense(ui);
            });
            ui.run_until_idle().await;
        }

        ui.dispatch(|screen, ui| screen.show_tab(ui, Tab::Home));
        ui.run_until_idle().await;
        let home = ui.state().home().unwrap();
        assert_eq!(home.last_expense().unwrap().amount().to_string(), "2");
    }
}
