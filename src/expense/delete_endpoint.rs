//! Defines the route handler for deleting an expense.

use axum::{
    extract::{FromRef, Path, Query, State},
    response::{IntoResponse, Response},
};
use maud::html;
use serde::Deserialize;

use crate::{
    AppState,
    alert::Alert,
    api::ExpenseApi,
    cache::ResponseCache,
    pagination::PaginationConfig,
};

use super::expenses_page::{CACHE_RESOURCE, default_expenses_content};

/// The state needed for deleting an expense.
#[derive(Debug, Clone)]
pub struct DeleteExpenseState {
    /// The typed client for the remote expense API.
    pub expense_api: ExpenseApi,
    /// The cache of API responses.
    pub cache: ResponseCache,
    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for DeleteExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_api: state.expense_api.clone(),
            cache: state.cache.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The query parameters identifying the page the delete button was on.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteExpenseQuery {
    /// The 1-indexed page number that was being displayed.
    pub page: Option<u64>,
    /// The number of expenses per page.
    pub page_size: Option<u64>,
}

/// Handler for deleting an expense via the DELETE method.
///
/// On success the response cache is invalidated and the refreshed expense
/// table is returned along with a success alert. The page number is clamped
/// back into range when the deleted record was the last one on the last page.
pub async fn delete_expense_endpoint(
    State(state): State<DeleteExpenseState>,
    Path(expense_id): Path<i64>,
    Query(query): Query<DeleteExpenseQuery>,
) -> Response {
    let page = query.page.unwrap_or(state.pagination_config.default_page);
    let page_size = query
        .page_size
        .unwrap_or(state.pagination_config.default_page_size)
        .max(1);

    if let Err(error) = state.expense_api.delete(expense_id).await {
        return error.into_alert_response();
    }

    if let Err(error) = state.cache.invalidate(CACHE_RESOURCE) {
        return error.into_alert_response();
    }

    let content = match default_expenses_content(
        &state.expense_api,
        &state.cache,
        &state.pagination_config,
        page,
        page_size,
    )
    .await
    {
        Ok(content) => content,
        Err(error) => return error.into_alert_response(),
    };

    let alert = Alert::Success {
        message: "Expense deleted.".to_owned(),
    };

    html! {
        (content)
        (alert.into_oob_html())
    }
    .into_response()
}
