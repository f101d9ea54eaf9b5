//! After a successful submission the remote API may take a moment before the new record shows up
//! in its listings, so the data views are reloaded several times on a fixed schedule.

use crate::workflow::{Screen, Ui};
use std::time::Duration;
use tracing::{debug, trace};

/// Schedules one data-view refresh after each of `delays`, measured from the previous refresh.
/// The first refresh happens `delays[0]` after this call.
pub(super) fn propagate(ui: &Ui, delays: Vec<Duration>) {
    debug!("Scheduling {} refresh pulses", delays.len());
    ui.post_pulses(delays, |screen: &mut Screen, ui: &Ui, ix: usize| {
        trace!("Refresh pulse {}", ix + 1);
        screen.refresh_data_views(ui);
    });
}

impl Screen {
    /// Reloads the list and home views, whichever are mounted.
    pub fn refresh_data_views(&mut self, ui: &Ui) {
        if self.list.is_some() {
            self.reload_list(ui);
        }
        if self.home.is_some() {
            self.reload_home(ui);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;
    use crate::ui::UiLoop;
    use crate::workflow::Tab;
    use std::time::Instant;

    #[tokio::test]
    async fn test_pulse_schedule() {
        let env = TestEnv::new().await;
        let mut ui = UiLoop::new(Screen::new(env.services()));
        ui.dispatch(|screen, ui| screen.show_tab(ui, Tab::ExpenseList));
        ui.run_until_idle().await;

        let delays: Vec<Duration> = [200, 200, 200, 200, 400, 400]
            .into_iter()
            .map(Duration::from_millis)
            .collect();
        let start = Instant::now();
        ui.dispatch(|_, ui| propagate(ui, delays));
        ui.run_until_idle().await;
        assert!(start.elapsed() >= Duration::from_millis(1600));
        assert_eq!(ui.state().list().unwrap().reloads(), 7);
    }

    #[tokio::test]
    async fn test_no_views_mounted() {
        let env = TestEnv::new().await;
        let mut ui = UiLoop::new(Screen::new(env.services()));
        ui.dispatch(|_, ui| propagate(ui, vec![Duration::from_millis(1); 3]));
        ui.run_until_idle().await;
        assert_eq!(env.api().list_calls(), 0);
    }
}
