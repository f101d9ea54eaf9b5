use crate::api::Mode;
use crate::commands::{screen, Out};
use crate::error::{Error, ErrorType};
use crate::ui::UiLoop;
use crate::workflow::{Screen, Tab};
use crate::{Config, Result};
use anyhow::anyhow;

/// Sets the display language from the settings page.
///
/// # Errors
///
/// - `ErrorType::Validation` if `code` is not a language code.
/// - `ErrorType::Config` if the config file could not be written.
pub async fn set_language(config: Config, mode: Mode, code: &str) -> Result<Out<String>> {
    let ui = screen(&config, mode, None)?;
    change_language(ui, code).await
}

async fn change_language(mut ui: UiLoop<Screen>, code: &str) -> Result<Out<String>> {
    ui.dispatch(|screen, ui| {
        screen.show_tab(ui, Tab::Settings);
        screen.change_language(ui, code);
    });
    ui.run_until_idle().await;

    let Some(view) = ui.state().settings() else {
        return Err(Error::new(
            ErrorType::Config,
            anyhow!("The settings page could not be shown"),
        ));
    };
    if let Some(message) = view.language_error() {
        return Err(Error::new(ErrorType::Validation, anyhow!("{message}")));
    }
    if let Some(message) = view.save_error() {
        return Err(Error::new(
            ErrorType::Config,
            anyhow!("Unable to save the language: {message}"),
        ));
    }
    let code = code.trim();
    Ok(Out::new(format!("Language set to '{code}'"), code.to_string()))
}
