//! Command handlers for the expense CLI.
//!
//! The handlers drive the same screens and workflows that an interactive front end would, on a
//! `UiLoop` that runs until all background work, refresh pulses included, has finished.

mod category;
mod expense;
mod init;
mod settings;

use crate::api::{expense_api, Mode};
use crate::error::{ErrorType, IntoResult};
use crate::ui::UiLoop;
use crate::workflow::{Screen, Services};
use crate::{Config, Result};
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, info};

pub use category::{add_category, list_categories, reset_categories};
pub use expense::{add_expense, list_expenses};
pub use init::init;
pub use settings::set_language;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Wires a headless screen for `config`. `user` overrides the user from the config file.
fn screen(config: &Config, mode: Mode, user: Option<&str>) -> Result<UiLoop<Screen>> {
    let api = expense_api(config, mode).pub_result(ErrorType::Config)?;
    let user = user.unwrap_or(config.user_id());
    let services = Services::from_config(config, api, user);
    Ok(UiLoop::new(Screen::new(Arc::new(services))))
}

/// The newest notification, if any was shown.
fn last_toast(screen: &Screen) -> Option<String> {
    screen.toasts().last().map(|toast| toast.message.clone())
}
