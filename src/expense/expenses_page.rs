//! Defines the route handler for the page that displays expenses as a table.

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::Markup;
use serde::Deserialize;

use crate::{
    AppState, Error,
    api::{ExpenseApi, models::ExpensePage},
    cache::ResponseCache,
    gate::{is_unlocked, unlock_page},
    pagination::{PaginationConfig, clamp_page, total_pages},
};

use super::{
    form::{ExpenseFormValues, create_expense_form},
    view::{expenses_content, expenses_view},
};

/// The cache namespace for expense API responses.
pub(crate) const CACHE_RESOURCE: &str = "expenses";

/// The state needed for the expenses page.
#[derive(Debug, Clone)]
pub struct ExpensesViewState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The typed client for the remote expense API.
    pub expense_api: ExpenseApi,
    /// The cache of API responses.
    pub cache: ResponseCache,
    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ExpensesViewState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            expense_api: state.expense_api.clone(),
            cache: state.cache.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<ExpensesViewState> for Key {
    fn from_ref(state: &ExpensesViewState) -> Self {
        state.cookie_key.clone()
    }
}

/// The query parameters for selecting a page of expenses.
#[derive(Debug, Default, Deserialize)]
pub struct ExpensesQuery {
    /// The 1-indexed page number to display.
    pub page: Option<u64>,
    /// The number of expenses per page.
    pub page_size: Option<u64>,
}

/// Render an overview of the recorded expenses.
pub async fn get_expenses_page(
    State(state): State<ExpensesViewState>,
    jar: PrivateCookieJar,
    Query(query): Query<ExpensesQuery>,
) -> Result<Response, Error> {
    if !is_unlocked(&jar) {
        return Ok(unlock_page());
    }

    let page_size = query
        .page_size
        .unwrap_or(state.pagination_config.default_page_size)
        .max(1);
    let requested_page = query.page.unwrap_or(state.pagination_config.default_page);

    let content = default_expenses_content(
        &state.expense_api,
        &state.cache,
        &state.pagination_config,
        requested_page,
        page_size,
    )
    .await?;

    Ok(expenses_view(&content).into_response())
}

/// Fetch the requested page and render the `#expenses-content` section with
/// an empty create form.
pub(crate) async fn default_expenses_content(
    expense_api: &ExpenseApi,
    cache: &ResponseCache,
    pagination_config: &PaginationConfig,
    requested_page: u64,
    page_size: u64,
) -> Result<Markup, Error> {
    let (page, expense_page) =
        fetch_clamped_expense_page(expense_api, cache, requested_page, page_size).await?;

    let suggestions = name_suggestions(&expense_page);
    let form = create_expense_form(
        &ExpenseFormValues::default(),
        &suggestions,
        None,
        page,
        page_size,
    );

    Ok(expenses_content(
        &expense_page,
        page,
        page_size,
        pagination_config.max_pages,
        &form,
    ))
}

/// Fetch one page of expenses, serving from the cache when possible.
pub(crate) async fn fetch_expense_page(
    expense_api: &ExpenseApi,
    cache: &ResponseCache,
    page: u64,
    page_size: u64,
) -> Result<ExpensePage, Error> {
    let params = format!("paged?page={page}&pageSize={page_size}");

    if let Some(cached) = cache.get::<ExpensePage>(CACHE_RESOURCE, &params)? {
        return Ok(cached);
    }

    let generation = cache.begin_request()?;
    let fetched = expense_api.list_paged(page, page_size).await?;
    cache.put(generation, CACHE_RESOURCE, &params, &fetched)?;

    Ok(fetched)
}

/// Fetch the requested page, clamping into range when the request points past
/// the last page (e.g. after deleting the last record on it).
///
/// Returns the effective page number along with the data.
pub(crate) async fn fetch_clamped_expense_page(
    expense_api: &ExpenseApi,
    cache: &ResponseCache,
    requested_page: u64,
    page_size: u64,
) -> Result<(u64, ExpensePage), Error> {
    let requested_page = requested_page.max(1);
    let expense_page = fetch_expense_page(expense_api, cache, requested_page, page_size).await?;

    let page_count = total_pages(expense_page.total_count, page_size);
    let page = clamp_page(requested_page, page_count);

    if page == requested_page {
        return Ok((page, expense_page));
    }

    let expense_page = fetch_expense_page(expense_api, cache, page, page_size).await?;

    Ok((page, expense_page))
}

/// Distinct expense names on the current page, used for form autocomplete.
pub(crate) fn name_suggestions(expense_page: &ExpensePage) -> Vec<String> {
    let mut names: Vec<String> = expense_page
        .items
        .iter()
        .map(|expense| expense.expense_name.clone())
        .collect();
    names.sort();
    names.dedup();

    names
}

#[cfg(test)]
mod expenses_page_tests {
    use axum::extract::{Query, State};
    use axum_extra::extract::PrivateCookieJar;
    use scraper::Selector;

    use crate::{
        app_state::create_cookie_key,
        cache::ResponseCache,
        endpoints,
        pagination::PaginationConfig,
        test_utils::{
            StubExpenseApi, assert_valid_html, must_get_form, parse_html_document, unlocked_jar,
        },
    };

    use super::{ExpensesQuery, ExpensesViewState, get_expenses_page};

    async fn test_state(stub: &StubExpenseApi) -> ExpensesViewState {
        ExpensesViewState {
            cookie_key: create_cookie_key("foobar"),
            expense_api: stub.serve().await,
            cache: ResponseCache::default(),
            pagination_config: PaginationConfig::default(),
        }
    }

    #[tokio::test]
    async fn locked_session_gets_the_unlock_page() {
        let stub = StubExpenseApi::default();
        let state = test_state(&stub).await;
        let jar = PrivateCookieJar::new(state.cookie_key.clone());

        let response = get_expenses_page(State(state), jar, Query(ExpensesQuery::default()))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let form = must_get_form(&document);
        assert_eq!(form.attr("hx-post"), Some(endpoints::UNLOCK_API));
    }

    #[tokio::test]
    async fn expenses_page_displays_a_table_row_per_expense() {
        let stub = StubExpenseApi::default();
        stub.seed(3);
        let state = test_state(&stub).await;
        let jar = unlocked_jar(state.cookie_key.clone());

        let response = get_expenses_page(State(state), jar, Query(ExpensesQuery::default()))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let rows: Vec<_> = document
            .select(&Selector::parse("tbody tr[data-expense-row='true']").unwrap())
            .collect();
        assert_eq!(rows.len(), 3, "want one row per seeded expense");
    }

    #[tokio::test]
    async fn page_past_the_end_clamps_to_the_last_page() {
        let stub = StubExpenseApi::default();
        stub.seed(25);
        let state = test_state(&stub).await;
        let jar = unlocked_jar(state.cookie_key.clone());

        let response = get_expenses_page(
            State(state),
            jar,
            Query(ExpensesQuery {
                page: Some(9),
                page_size: Some(10),
            }),
        )
        .await
        .unwrap();

        let document = parse_html_document(response).await;
        // Scoped to the pagination nav so the nav bar's active link does not
        // match first.
        let current = document
            .select(&Selector::parse("nav.pagination [aria-current='page']").unwrap())
            .next()
            .expect("expected the current page indicator");

        assert_eq!(current.text().collect::<String>(), "3");
    }

    #[tokio::test]
    async fn second_request_is_served_from_the_cache() {
        let stub = StubExpenseApi::default();
        stub.seed(2);
        let state = test_state(&stub).await;
        let jar = unlocked_jar(state.cookie_key.clone());

        let first = get_expenses_page(
            State(state.clone()),
            jar.clone(),
            Query(ExpensesQuery::default()),
        )
        .await
        .unwrap();
        let first = parse_html_document(first).await;

        // New records appear on the server behind the cache's back.
        stub.seed(5);

        let second = get_expenses_page(State(state), jar, Query(ExpensesQuery::default()))
            .await
            .unwrap();
        let second = parse_html_document(second).await;

        let row_selector = Selector::parse("tbody tr[data-expense-row='true']").unwrap();
        assert_eq!(
            second.select(&row_selector).count(),
            first.select(&row_selector).count(),
            "a fresh cache entry should be served without re-fetching"
        );
    }
}
