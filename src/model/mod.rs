//! Types that represent the core data model, such as `Expense` and `Category`.
mod amount;
mod category;
mod expense;

pub use amount::Amount;
pub use category::{Category, BUILT_IN_CATEGORIES, DEFAULT_CURRENCIES};
pub use expense::{Expense, ExpenseInput};
