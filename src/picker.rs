//! Builds the list of selectable categories: the built-in names followed by the custom ones.

use crate::db::CategoryStore;
use crate::model::Category;
use crate::Result;
use std::sync::Arc;
use tracing::{trace, warn};

/// Merges the fixed built-in categories with the contents of the `CategoryStore`.
///
/// Names are not deduplicated: a custom category that has the same name as a built-in one
/// appears twice.
pub struct CategoryPicker {
    built_ins: Vec<String>,
    store: Arc<dyn CategoryStore>,
}

impl CategoryPicker {
    pub fn new(built_ins: Vec<String>, store: Arc<dyn CategoryStore>) -> Self {
        Self { built_ins, store }
    }

    pub fn built_ins(&self) -> &[String] {
        &self.built_ins
    }

    /// Returns the built-in names, in their original order, followed by the stored names in
    /// store order.
    pub async fn try_load(&self) -> Result<Vec<String>> {
        let custom = self.store.list_all().await?;
        trace!("Loaded {} custom categories", custom.len());
        Ok(merge(&self.built_ins, custom))
    }

    /// Like `try_load`, but a store failure is logged and only the built-in names are returned.
    pub async fn load(&self) -> Vec<String> {
        match self.try_load().await {
            Ok(names) => names,
            Err(e) => {
                warn!("Unable to load custom categories, showing built-in ones only: {e}");
                self.built_ins.clone()
            }
        }
    }
}

fn merge(built_ins: &[String], custom: impl IntoIterator<Item = Category>) -> Vec<String> {
    built_ins
        .iter()
        .cloned()
        .chain(custom.into_iter().map(|c| c.name))
        .collect()
}
