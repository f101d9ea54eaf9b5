//! Category command handlers.

use crate::api::Mode;
use crate::commands::{last_toast, screen, Out};
use crate::error::{Error, ErrorType};
use crate::picker::CategoryPicker;
use crate::workflow::Tab;
use crate::{Config, Result};
use anyhow::anyhow;

/// Lists every selectable category: the built-in ones in their configured order, then the custom
/// ones ordered by name.
///
/// # Errors
///
/// - `ErrorType::Storage` if the local database cannot be read.
pub async fn list_categories(config: Config) -> Result<Out<Vec<String>>> {
    let picker = CategoryPicker::new(config.categories().to_vec(), config.store());
    let names = picker.try_load().await?;
    Ok(Out::new(names.join("\n"), names))
}

/// Adds a custom category through the new-category form, as if it had been opened from the
/// entry form.
///
/// # Returns
///
/// On success, returns an `Out` containing the categories that the entry form now offers.
///
/// # Errors
///
/// - `ErrorType::Validation` if `name` is empty.
/// - `ErrorType::Storage` if the category could not be stored.
pub async fn add_category(config: Config, mode: Mode, name: &str) -> Result<Out<Vec<String>>> {
    let mut ui = screen(&config, mode, None)?;
    ui.dispatch(|screen, ui| {
        screen.show_tab(ui, Tab::AddExpense);
        screen.open_new_category();
        if let Some(view) = screen.new_category_mut() {
            view.set_name(name);
        }
        screen.save_category(ui);
    });
    ui.run_until_idle().await;

    let screen = ui.state();
    if let Some(view) = screen.new_category() {
        // The form stays open when the category was not saved.
        if let Some(message) = view.name_error() {
            return Err(Error::new(ErrorType::Validation, anyhow!("{message}")));
        }
        let message = last_toast(screen).unwrap_or_else(|| "The category was not saved".into());
        return Err(Error::new(ErrorType::Storage, anyhow!("{message}")));
    }

    let names = screen
        .entry()
        .map(|entry| entry.categories().to_vec())
        .unwrap_or_default();
    let message =
        last_toast(screen).unwrap_or_else(|| format!("Category '{}' added", name.trim()));
    Ok(Out::new(message, names))
}

/// Removes every custom category. The built-in ones are not affected.
///
/// # Errors
///
/// - `ErrorType::Storage` if the local database fails.
pub async fn reset_categories(config: Config) -> Result<Out<u64>> {
    let removed = config.store().delete_all().await?;
    Ok(Out::new(
        format!("Removed {removed} custom categories"),
        removed,
    ))
}
