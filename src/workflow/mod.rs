//! The screens of the application and the workflows that run on them.
//!
//! Everything here executes on the UI loop (see `crate::ui`). Storage and network calls are handed
//! to background workers and their results are applied back onto the `Screen` when they arrive,
//! provided the view that asked for them is still mounted.

mod entry;
mod new_category;
mod refresh;
mod screen;
mod settings;
mod views;

pub use entry::{EntryState, EntryView};
pub use new_category::NewCategoryView;
pub use screen::{Screen, Tab, Toast, ToastLength, Ui};
pub use settings::{Preferences, SettingsView};
pub use views::{HomeView, ListView};

use crate::api::ExpenseApi;
use crate::config::DEFAULT_REFRESH_PULSES_MS;
use crate::db::CategoryStore;
use crate::picker::CategoryPicker;
use crate::service::SubmissionService;
use crate::Config;
use std::sync::Arc;
use std::time::Duration;

/// The collaborators that the screens need. Built once and shared by every view.
pub struct Services {
    picker: Arc<CategoryPicker>,
    submitter: Arc<SubmissionService>,
    store: Arc<dyn CategoryStore>,
    api: Arc<dyn ExpenseApi>,
    preferences: Arc<dyn Preferences>,
    database_name: String,
    currencies: Vec<String>,
    user_id: String,
    language: Option<String>,
    refresh_pulses: Vec<Duration>,
}

impl Services {
    pub fn new(
        built_in_categories: Vec<String>,
        currencies: Vec<String>,
        store: Arc<dyn CategoryStore>,
        api: Arc<dyn ExpenseApi>,
        preferences: Arc<dyn Preferences>,
        database_name: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        let database_name = database_name.into();
        Self {
            picker: Arc::new(CategoryPicker::new(built_in_categories, store.clone())),
            submitter: Arc::new(SubmissionService::new(api.clone(), database_name.clone())),
            store,
            api,
            preferences,
            database_name,
            currencies,
            user_id: user_id.into(),
            language: None,
            refresh_pulses: DEFAULT_REFRESH_PULSES_MS
                .iter()
                .map(|ms| Duration::from_millis(*ms))
                .collect(),
        }
    }

    /// Wires everything from `config`. `user_id` is the signed-in user, or empty.
    pub fn from_config(config: &Config, api: Arc<dyn ExpenseApi>, user_id: &str) -> Self {
        Self::new(
            config.categories().to_vec(),
            config.currencies().to_vec(),
            config.store(),
            api,
            Arc::new(config.clone()),
            config.database_name(),
            user_id,
        )
        .with_language(config.language().map(str::to_string))
        .with_refresh_pulses(config.refresh_pulses())
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_refresh_pulses(mut self, delays: Vec<Duration>) -> Self {
        self.refresh_pulses = delays;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }
}
