use crate::error::{ErrorType, IntoResult};
use crate::ui::ViewToken;
use crate::workflow::{Screen, ToastLength, Ui};
use crate::{Config, Result};
use tracing::{debug, info};

/// Where user preferences are persisted.
#[async_trait::async_trait]
pub trait Preferences: Send + Sync {
    async fn save_language(&self, language: &str) -> Result<()>;
}

#[async_trait::async_trait]
impl Preferences for Config {
    async fn save_language(&self, language: &str) -> Result<()> {
        self.persist_language(language)
            .await
            .pub_result(ErrorType::Config)
    }
}

/// The settings page.
#[derive(Debug)]
pub struct SettingsView {
    token: ViewToken,
    language: Option<String>,
    language_error: Option<String>,
    save_error: Option<String>,
    saving: bool,
}

impl SettingsView {
    pub(super) fn new(token: ViewToken, language: Option<String>) -> Self {
        Self {
            token,
            language,
            language_error: None,
            save_error: None,
            saving: false,
        }
    }

    pub fn token(&self) -> ViewToken {
        self.token
    }

    /// The language in effect when the page was mounted.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn language_error(&self) -> Option<&str> {
        self.language_error.as_deref()
    }

    /// Why the last language change could not be saved. Cleared when another change starts.
    pub fn save_error(&self) -> Option<&str> {
        self.save_error.as_deref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }
}

impl Screen {
    /// Persists `code` as the display language and recreates the screen so that every view picks
    /// it up. Only possible from the settings page.
    pub fn change_language(&mut self, ui: &Ui, code: &str) {
        let preferences = self.services().preferences.clone();
        let Some(view) = self.settings.as_mut() else {
            debug!("The settings page is not mounted");
            return;
        };
        let code = code.trim().to_string();
        if !is_language_code(&code) {
            view.language_error = Some(format!("'{code}' is not a language code"));
            return;
        }
        if view.saving {
            return;
        }

        view.language_error = None;
        view.save_error = None;
        view.saving = true;
        let token = view.token;
        ui.run_in_background(
            {
                let code = code.clone();
                async move { preferences.save_language(&code).await }
            },
            move |screen: &mut Screen, ui: &Ui, result: Result<()>| {
                let Some(view) = screen.settings_for(token) else {
                    debug!("Discarding a language change from a torn-down settings page");
                    return;
                };
                view.saving = false;
                view.save_error = result.as_ref().err().map(|e| e.to_string());
                match result {
                    Ok(()) => {
                        info!("Display language set to '{code}'");
                        screen.set_language(code);
                        screen.recreate(ui);
                    }
                    Err(e) => screen.toast(
                        format!("Unable to save the language: {e}"),
                        ToastLength::Long,
                    ),
                }
            },
        );
    }
}

/// Accepts tags like `en`, `km` or `pt-BR`.
fn is_language_code(code: &str) -> bool {
    let mut parts = code.split('-');
    let primary_ok = parts.next().is_some_and(|primary| {
        (2..=3).contains(&primary.len()) && primary.chars().all(|c| c.is_ascii_lowercase())
    });
    primary_ok
        && parts.all(|part| {
            (2..=8).contains(&part.len()) && part.chars().all(|c| c.is_ascii_alphanumeric())
        })
}
