use serde::{Deserialize, Serialize};

/// A user-defined category, stored locally in the `categories` table.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Category {
    /// Assigned by the store on insert.
    pub(crate) id: i64,
    pub(crate) name: String,
}

impl Category {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The categories that ship with the application and are never stored.
pub const BUILT_IN_CATEGORIES: &[&str] = &[
    "Food",
    "Transport",
    "Shopping",
    "Bills",
    "Entertainment",
    "Health",
    "Other",
];

/// The currencies offered by the entry form unless configured otherwise.
pub const DEFAULT_CURRENCIES: &[&str] = &["USD", "KHR"];
