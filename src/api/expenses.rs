//! Typed operations on the remote expense API.
//!
//! Each function maps one endpoint of the API's interface; see the table in
//! the README. These are pure request/response mappings with no local state.

use reqwest::{Method, multipart};

use crate::Error;

use super::{
    client::ApiClient,
    models::{AggregatedPoint, Expense, ExpensePage, ExpenseTotal, NewExpense, TimeRange},
};

/// The typed client for the expense endpoints.
#[derive(Debug, Clone)]
pub struct ExpenseApi {
    client: ApiClient,
}

impl ExpenseApi {
    /// Wrap an [ApiClient] with the expense operations.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch the time-aggregated cost series at the given granularity.
    pub async fn list_aggregated(&self, range: TimeRange) -> Result<Vec<AggregatedPoint>, Error> {
        self.client
            .get_json(
                "/expenses/aggregated",
                &[("timeRange", range.as_str().to_owned())],
            )
            .await
    }

    /// Fetch one page of expenses. `page` is 1-indexed.
    pub async fn list_paged(&self, page: u64, page_size: u64) -> Result<ExpensePage, Error> {
        self.client
            .get_json(
                "/Expenses/paged",
                &[
                    ("page", page.to_string()),
                    ("pageSize", page_size.to_string()),
                ],
            )
            .await
    }

    /// Fetch every expense record without paging.
    pub async fn list_all(&self) -> Result<Vec<Expense>, Error> {
        self.client.get_json("/Expenses", &[]).await
    }

    /// Fetch the total record count.
    pub async fn total(&self) -> Result<ExpenseTotal, Error> {
        self.client.get_json("/Expenses/total-expenses", &[]).await
    }

    /// Fetch a single expense by its server-assigned id.
    pub async fn get(&self, id: i64) -> Result<Expense, Error> {
        self.client.get_json(&format!("/Expenses/{id}"), &[]).await
    }

    /// Create a new expense. The server assigns `id` and `dateCreated`.
    pub async fn create(&self, record: &NewExpense) -> Result<Expense, Error> {
        let form = multipart_form(record)?;

        self.client
            .send_multipart(Method::POST, "/Expenses", form)
            .await
    }

    /// Update an existing expense by id.
    pub async fn update(&self, id: i64, record: &NewExpense) -> Result<Expense, Error> {
        let form = multipart_form(record)?;

        self.client
            .send_multipart(Method::PUT, &format!("/Expenses/{id}"), form)
            .await
    }

    /// Delete an expense by id.
    pub async fn delete(&self, id: i64) -> Result<(), Error> {
        self.client
            .delete("/Expenses", &[("id", id.to_string())])
            .await
    }
}

/// Build the multipart payload the API expects for create and update.
fn multipart_form(record: &NewExpense) -> Result<multipart::Form, Error> {
    let mut form = multipart::Form::new()
        .text("ExpenseName", record.expense_name.clone())
        .text("ExpenseDetails", record.expense_details.clone())
        .text("Cost", record.cost.to_string());

    if let Some(image) = &record.image {
        let part = multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|error| Error::Multipart(error.to_string()))?;

        form = form.part("ExpenseImage", part);
    }

    Ok(form)
}
