use crate::error::{ErrorType, ValidationError};
use crate::model::Category;
use crate::ui::ViewToken;
use crate::workflow::{Screen, Tab, ToastLength, Ui};
use tracing::{debug, info};

/// The modal form that creates a custom category.
#[derive(Debug)]
pub struct NewCategoryView {
    token: ViewToken,
    name: String,
    name_error: Option<String>,
    saving: bool,
}

impl NewCategoryView {
    fn new(token: ViewToken) -> Self {
        Self {
            token,
            name: String::new(),
            name_error: None,
            saving: false,
        }
    }

    pub fn token(&self) -> ViewToken {
        self.token
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.name_error = None;
    }

    pub fn name_error(&self) -> Option<&str> {
        self.name_error.as_deref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }
}

impl Screen {
    /// Opens the new-category form on top of the current tab. An already open form is replaced.
    pub fn open_new_category(&mut self) {
        let token = self.issue_token();
        self.new_category = Some(NewCategoryView::new(token));
    }

    /// Validates the name and stores the category in the background. On success the form closes
    /// and the entry form reloads its categories. On failure the form stays open with its input.
    pub fn save_category(&mut self, ui: &Ui) {
        let store = self.services().store.clone();
        let Some(view) = self.new_category.as_mut() else {
            debug!("The new-category form is not open");
            return;
        };
        if view.saving {
            return;
        }
        let name = view.name.trim().to_string();
        if name.is_empty() {
            view.name_error = Some(ValidationError::EmptyCategoryName.to_string());
            return;
        }

        view.name_error = None;
        view.saving = true;
        let token = view.token;
        ui.run_in_background(
            async move { store.insert(&name).await },
            move |screen: &mut Screen, ui: &Ui, result: crate::Result<Category>| {
                screen.finish_category(ui, token, result)
            },
        );
    }

    /// Closes the form without saving anything.
    pub fn cancel_new_category(&mut self, ui: &Ui) {
        if self.new_category.is_some() {
            self.close_new_category(ui, false);
        }
    }

    fn finish_category(&mut self, ui: &Ui, token: ViewToken, result: crate::Result<Category>) {
        let Some(view) = self.new_category_for(token) else {
            debug!("Discarding the result of saving a category from a closed form");
            return;
        };
        view.saving = false;
        match result {
            Ok(category) => {
                info!("Added category {} '{}'", category.id(), category.name());
                self.toast(
                    format!("Category '{}' added successfully!", category.name()),
                    ToastLength::Short,
                );
                self.close_new_category(ui, true);
            }
            Err(e) if e.error_type() == ErrorType::Validation => {
                view.name_error = Some(e.to_string());
            }
            Err(e) => {
                self.toast(format!("Error saving category: {e}"), ToastLength::Long);
            }
        }
    }

    fn close_new_category(&mut self, ui: &Ui, saved: bool) {
        self.new_category = None;
        // The view underneath becomes visible again.
        if self.tab() == Tab::AddExpense {
            self.resume(ui);
        } else if saved {
            self.load_categories(ui);
        }
    }
}
