//! Implements the `ExpenseApi` trait over HTTP with `reqwest`.

use crate::api::ExpenseApi;
use crate::error::Res;
use crate::model::Expense;
use anyhow::{bail, Context};
use std::time::Duration;
use tracing::trace;
use url::Url;

/// The header that selects the remote database (collection) a request applies to.
const DB_NAME_HEADER: &str = "x-db-name";
const EXPENSES_PATH: &str = "expenses";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Talks to the remote backend at `base`.
///
/// - `POST {base}/expenses` with the expense as a JSON body creates an expense.
/// - `GET {base}/expenses?createdBy={user}` lists a user's expenses.
///
/// Both carry the database name in the `x-db-name` header. The base URL is only resolved when a
/// request is made, so commands that never reach the backend do not depend on it.
pub(crate) struct HttpApi {
    client: reqwest::Client,
    api_url: String,
}

impl HttpApi {
    pub(crate) fn new(api_url: impl Into<String>) -> Res<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Unable to create the HTTP client")?;
        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }
}

#[async_trait::async_trait]
impl ExpenseApi for HttpApi {
    async fn create_expense(&self, database_name: &str, expense: &Expense) -> anyhow::Result<u16> {
        let endpoint = endpoint(&self.api_url)?;
        trace!("POST {endpoint} for expense {}", expense.id());
        let response = self
            .client
            .post(endpoint)
            .header(DB_NAME_HEADER, database_name)
            .json(expense)
            .send()
            .await?;
        Ok(response.status().as_u16())
    }

    async fn list_expenses(
        &self,
        database_name: &str,
        created_by: &str,
    ) -> anyhow::Result<Vec<Expense>> {
        let endpoint = endpoint(&self.api_url)?;
        trace!("GET {endpoint} for user '{created_by}'");
        let response = self
            .client
            .get(endpoint)
            .header(DB_NAME_HEADER, database_name)
            .query(&[("createdBy", created_by)])
            .send()
            .await
            .context("Failed to request the expense list")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Listing expenses failed with status {status}");
        }

        let mut expenses: Vec<Expense> = response
            .json()
            .await
            .context("Failed to parse the expense list")?;
        expenses.sort_by(|a, b| b.created_date().cmp(&a.created_date()));
        Ok(expenses)
    }
}

/// Builds the expenses endpoint from the configured base URL, which may or may not end in `/`.
fn endpoint(api_url: &str) -> Res<Url> {
    let mut base =
        Url::parse(api_url).with_context(|| format!("Invalid API URL '{api_url}'"))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(EXPENSES_PATH)
        .with_context(|| format!("Unable to build the expenses URL from '{api_url}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint() {
        assert_eq!(
            endpoint("https://api.example.com").unwrap().as_str(),
            "https://api.example.com/expenses"
        );
        assert_eq!(
            endpoint("https://api.example.com/v1").unwrap().as_str(),
            "https://api.example.com/v1/expenses"
        );
        assert_eq!(
            endpoint("https://api.example.com/v1/").unwrap().as_str(),
            "https://api.example.com/v1/expenses"
        );
    }

    #[test]
    fn test_endpoint_invalid() {
        assert!(endpoint("not a url").is_err());
        assert!(endpoint("").is_err());
    }

    #[tokio::test]
    async fn test_invalid_url_fails_on_request() {
        let api = HttpApi::new("not a url").unwrap();
        let expense = Expense {
            id: "id-1".to_string(),
            amount: crate::Amount::parse("5").unwrap(),
            currency: "USD".to_string(),
            category: "Bills".to_string(),
            remark: String::new(),
            created_by: "uid-1".to_string(),
            created_date: chrono::Utc::now(),
        };
        let err = api.create_expense("db", &expense).await.unwrap_err();
        assert!(format!("{err:#}").contains("Invalid API URL"));
        assert!(api.list_expenses("db", "uid-1").await.is_err());
    }
}
