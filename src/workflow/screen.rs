use crate::ui::{UiHandle, ViewToken, ViewTokens};
use crate::workflow::entry::EntryView;
use crate::workflow::new_category::NewCategoryView;
use crate::workflow::settings::SettingsView;
use crate::workflow::views::{HomeView, ListView};
use crate::workflow::Services;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// The handle that workflows use to schedule work on the screen's UI loop.
pub type Ui = UiHandle<Screen>;

/// The top-level destinations of the application.
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Home,
    AddExpense,
    ExpenseList,
    Settings,
}

serde_plain::derive_display_from_serialize!(Tab);
serde_plain::derive_fromstr_from_deserialize!(Tab);

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ToastLength {
    Short,
    Long,
}

/// A transient notification shown to the user.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Toast {
    pub message: String,
    pub length: ToastLength,
}

/// The whole UI state. It is owned by a `UiLoop` and only touched from the loop.
///
/// A view is mounted the first time its tab is shown and stays mounted when another tab is
/// selected. Showing an already mounted view again resumes it, which reloads its data. The
/// new-category view is a modal that sits on top of whatever tab is selected.
pub struct Screen {
    services: Arc<Services>,
    tokens: ViewTokens,
    tab: Tab,
    language: Option<String>,
    pub(super) entry: Option<EntryView>,
    pub(super) list: Option<ListView>,
    pub(super) home: Option<HomeView>,
    pub(super) settings: Option<SettingsView>,
    pub(super) new_category: Option<NewCategoryView>,
    toasts: Vec<Toast>,
}

impl Screen {
    /// Creates a screen with no view mounted. Call `show_tab` to mount the first one.
    pub fn new(services: Arc<Services>) -> Self {
        let language = services.language.clone();
        Self {
            services,
            tokens: ViewTokens::default(),
            tab: Tab::default(),
            language,
            entry: None,
            list: None,
            home: None,
            settings: None,
            new_category: None,
            toasts: Vec::new(),
        }
    }

    pub fn services(&self) -> &Arc<Services> {
        &self.services
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub(super) fn set_language(&mut self, language: String) {
        self.language = Some(language);
    }

    pub fn is_mounted(&self, tab: Tab) -> bool {
        match tab {
            Tab::Home => self.home.is_some(),
            Tab::AddExpense => self.entry.is_some(),
            Tab::ExpenseList => self.list.is_some(),
            Tab::Settings => self.settings.is_some(),
        }
    }

    /// Selects `tab`, mounting its view if needed and resuming it otherwise.
    pub fn show_tab(&mut self, ui: &Ui, tab: Tab) {
        debug!("Showing {tab}");
        self.tab = tab;
        if self.is_mounted(tab) {
            self.resume(ui);
        } else {
            self.mount(ui, tab);
        }
    }

    /// Called when the current view becomes visible again: its data is reloaded.
    pub fn resume(&mut self, ui: &Ui) {
        match self.tab {
            Tab::Home => self.reload_home(ui),
            Tab::AddExpense => self.load_categories(ui),
            Tab::ExpenseList => self.reload_list(ui),
            Tab::Settings => {}
        }
    }

    /// Tears every view down, the modal included, and mounts the current tab again. Results of
    /// work started by the old views are discarded when they arrive.
    pub fn recreate(&mut self, ui: &Ui) {
        info!("Recreating the screen");
        self.entry = None;
        self.list = None;
        self.home = None;
        self.settings = None;
        self.new_category = None;
        self.mount(ui, self.tab);
    }

    fn mount(&mut self, ui: &Ui, tab: Tab) {
        let token = self.tokens.issue();
        match tab {
            Tab::Home => {
                self.home = Some(HomeView::new(token));
                self.reload_home(ui);
            }
            Tab::AddExpense => {
                self.entry = Some(EntryView::new(token, self.services.currencies.clone()));
                self.load_categories(ui);
            }
            Tab::ExpenseList => {
                self.list = Some(ListView::new(token));
                self.reload_list(ui);
            }
            Tab::Settings => {
                self.settings = Some(SettingsView::new(token, self.language.clone()));
            }
        }
    }

    pub(super) fn issue_token(&mut self) -> ViewToken {
        self.tokens.issue()
    }

    pub fn toast(&mut self, message: impl Into<String>, length: ToastLength) {
        let message = message.into();
        debug!("Toast: {message}");
        self.toasts.push(Toast { message, length });
    }

    /// Every notification shown so far, oldest first.
    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    pub fn entry(&self) -> Option<&EntryView> {
        self.entry.as_ref()
    }

    pub fn entry_mut(&mut self) -> Option<&mut EntryView> {
        self.entry.as_mut()
    }

    pub fn list(&self) -> Option<&ListView> {
        self.list.as_ref()
    }

    pub fn home(&self) -> Option<&HomeView> {
        self.home.as_ref()
    }

    pub fn settings(&self) -> Option<&SettingsView> {
        self.settings.as_ref()
    }

    pub fn new_category(&self) -> Option<&NewCategoryView> {
        self.new_category.as_ref()
    }

    pub fn new_category_mut(&mut self) -> Option<&mut NewCategoryView> {
        self.new_category.as_mut()
    }

    pub(super) fn entry_for(&mut self, token: ViewToken) -> Option<&mut EntryView> {
        self.entry.as_mut().filter(|view| view.token() == token)
    }

    pub(super) fn list_for(&mut self, token: ViewToken) -> Option<&mut ListView> {
        self.list.as_mut().filter(|view| view.token() == token)
    }

    pub(super) fn home_for(&mut self, token: ViewToken) -> Option<&mut HomeView> {
        self.home.as_mut().filter(|view| view.token() == token)
    }

    pub(super) fn settings_for(&mut self, token: ViewToken) -> Option<&mut SettingsView> {
        self.settings.as_mut().filter(|view| view.token() == token)
    }

    pub(super) fn new_category_for(&mut self, token: ViewToken) -> Option<&mut NewCategoryView> {
        self.new_category
            .as_mut()
            .filter(|view| view.token() == token)
    }
}
