use crate::model::Amount;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// An expense as it is sent to, and read back from, the remote system of record.
///
/// Example JSON:
/// ```json
/// {
///   "id": "0b6f2c6e-5f0c-4a55-9f0c-0d3d0f3c5a11",
///   "amount": 12.5,
///   "currency": "USD",
///   "category": "Food",
///   "remark": "lunch",
///   "createdBy": "uid-123",
///   "createdDate": "2026-10-17T09:30:00.000Z"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub(crate) id: String,
    pub(crate) amount: Amount,
    pub(crate) currency: String,
    pub(crate) category: String,
    #[serde(default)]
    pub(crate) remark: String,
    #[serde(default)]
    pub(crate) created_by: String,
    #[serde(with = "iso8601")]
    pub(crate) created_date: DateTime<Utc>,
}

impl Expense {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn remark(&self) -> &str {
        &self.remark
    }

    /// The user that created the expense. Empty if nobody was signed in.
    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }
}

/// The raw values of the entry form, as typed or selected by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseInput {
    pub amount_text: String,
    pub currency: String,
    pub category: String,
    pub remark: String,
    pub user_id: String,
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix.
mod iso8601 {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub(super) fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
