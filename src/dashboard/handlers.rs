//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - The route handler for displaying the dashboard
//! - HTML view functions for rendering the dashboard UI
//! - State and query types used by the handler

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, Error,
    api::{
        ExpenseApi,
        models::{AggregatedPoint, ExpenseTotal, TimeRange},
    },
    cache::ResponseCache,
    dashboard::charts::{DashboardChart, charts_script, charts_view, spending_chart},
    endpoints,
    expense::{CACHE_RESOURCE, default_expenses_content},
    gate::{is_unlocked, unlock_page},
    html::{
        HeadElement, LINK_STYLE, PAGE_CONTAINER_STYLE, base, currency_rounded_with_tooltip,
        dollar_input_styles,
    },
    navigation::NavBar,
    pagination::PaginationConfig,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The typed client for the remote expense API.
    pub expense_api: ExpenseApi,
    /// The cache of API responses.
    pub cache: ResponseCache,
    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for DashboardState {
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
impl FromRef<DashboardState> for Key {
    fn from_ref(state: &DashboardState) -> Self {
        state.cookie_key.clone()
    }
}

/// The query parameters for selecting the aggregation granularity.
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// The time bucket to aggregate costs by. Defaults to `day`.
    pub time_range: Option<TimeRange>,
}

/// Display a page with an overview of spending over time.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    jar: PrivateCookieJar,
    Query(query): Query<DashboardQuery>,
) -> Result<Response, Error> {
    if !is_unlocked(&jar) {
        return Ok(unlock_page());
    }

    let range = query.time_range.unwrap_or_default();
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    // Neither fetch depends on the other, so let them race.
    let (total, points, expenses) = tokio::join!(
        fetch_total(&state.expense_api, &state.cache),
        fetch_aggregated(&state.expense_api, &state.cache, range),
        default_expenses_content(
            &state.expense_api,
            &state.cache,
            &state.pagination_config,
            state.pagination_config.default_page,
            state.pagination_config.default_page_size,
        ),
    );
    let (total, points, expenses) = (total?, points?, expenses?);

    if points.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar, &expenses).into_response());
    }

    let total_spent: f64 = points.iter().map(|point| point.cost).sum();
    let subtitle = format!("By {}", range.label().to_lowercase());
    let charts = [DashboardChart {
        id: "spending-chart",
        options: spending_chart(&subtitle, &points).to_string(),
    }];

    Ok(dashboard_view(
        nav_bar,
        range,
        total.expense_total_count,
        total_spent,
        &charts,
        &expenses,
    )
    .into_response())
}

/// Fetch the total record count, serving from the cache when possible.
async fn fetch_total(
    expense_api: &ExpenseApi,
    cache: &ResponseCache,
) -> Result<ExpenseTotal, Error> {
    const PARAMS: &str = "total";

    if let Some(cached) = cache.get::<ExpenseTotal>(CACHE_RESOURCE, PARAMS)? {
        return Ok(cached);
    }

    let generation = cache.begin_request()?;
    let fetched = expense_api.total().await?;
    cache.put(generation, CACHE_RESOURCE, PARAMS, &fetched)?;

    Ok(fetched)
}

/// Fetch the aggregated cost series, serving from the cache when possible.
async fn fetch_aggregated(
    expense_api: &ExpenseApi,
    cache: &ResponseCache,
    range: TimeRange,
) -> Result<Vec<AggregatedPoint>, Error> {
    let params = format!("aggregated?timeRange={}", range.as_str());

    if let Some(cached) = cache.get::<Vec<AggregatedPoint>>(CACHE_RESOURCE, &params)? {
        return Ok(cached);
    }

    let generation = cache.begin_request()?;
    let fetched = expense_api.list_aggregated(range).await?;
    cache.put(generation, CACHE_RESOURCE, &params, &fetched)?;

    Ok(fetched)
}

/// The links for switching the aggregation granularity.
fn range_selector(current: TimeRange) -> Markup {
    html!(
        nav aria-label="Aggregation range" class="flex gap-4 mb-4"
        {
            @for range in [
                TimeRange::Day,
                TimeRange::Week,
                TimeRange::Month,
                TimeRange::Year,
            ] {
                @if range == current {
                    span
                        aria-current="page"
                        class="font-semibold text-gray-900 dark:text-white"
                    {
                        (range.label())
                    }
                } @else {
                    a
                        href=(format!(
                            "{}?time_range={}",
                            endpoints::DASHBOARD_VIEW,
                            range.as_str()
                        ))
                        class=(LINK_STYLE)
                    {
                        (range.label())
                    }
                }
            }
        }
    )
}

fn summary_cards(record_count: u64, total_spent: f64) -> Markup {
    html!(
        section class="grid grid-cols-2 gap-4 w-full max-w-md mb-4"
        {
            div class="p-4 bg-white rounded shadow dark:bg-gray-800"
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Recorded expenses" }

                p
                    class="text-2xl font-semibold"
                    data-summary="record-count"
                {
                    (record_count)
                }
            }

            div class="p-4 bg-white rounded shadow dark:bg-gray-800"
            {
                p class="text-sm text-gray-500 dark:text-gray-400" { "Total spent" }

                p
                    class="text-2xl font-semibold"
                    data-summary="total-spent"
                {
                    (currency_rounded_with_tooltip(total_spent))
                }
            }
        }
    )
}

fn dashboard_view(
    nav_bar: NavBar,
    range: TimeRange,
    record_count: u64,
    total_spent: f64,
    charts: &[DashboardChart],
    expenses: &Markup,
) -> Markup {
    let content = html!(
        (nav_bar.into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Dashboard" }

            (range_selector(range))
            (summary_cards(record_count, total_spent))
            (charts_view(charts))
            (expenses)
        }
    );

    let head_elements = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(charts),
        dollar_input_styles(),
    ];

    base("Dashboard", &head_elements, &content)
}

fn dashboard_no_data_view(nav_bar: NavBar, expenses: &Markup) -> Markup {
    let content = html!(
        (nav_bar.into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Dashboard" }

            p class="text-center mb-4"
            {
                "Charts will show up here once you record some expenses."
            }

            (expenses)
        }
    );

    base("Dashboard", &[dollar_input_styles()], &content)
}

#[cfg(test)]
mod dashboard_page_tests {
    use axum::extract::{Query, State};
    use axum_extra::extract::PrivateCookieJar;
    use scraper::Selector;

    use crate::{
        api::models::TimeRange,
        app_state::create_cookie_key,
        cache::ResponseCache,
        endpoints,
        pagination::PaginationConfig,
        test_utils::{
            StubExpenseApi, assert_status_ok, assert_valid_html, must_get_form,
            parse_html_document, unlocked_jar,
        },
    };

    use super::{DashboardQuery, DashboardState, get_dashboard_page};

    async fn test_state(stub: &StubExpenseApi) -> DashboardState {
        DashboardState {
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

        let response = get_dashboard_page(State(state), jar, Query(DashboardQuery::default()))
            .await
            .unwrap();

        let document = parse_html_document(response).await;
        let form = must_get_form(&document);
        assert_eq!(form.attr("hx-post"), Some(endpoints::UNLOCK_API));
    }

    #[tokio::test]
    async fn dashboard_shows_summary_and_chart() {
        let stub = StubExpenseApi::default();
        stub.seed(3);
        let state = test_state(&stub).await;
        let jar = unlocked_jar(state.cookie_key.clone());

        let response = get_dashboard_page(State(state), jar, Query(DashboardQuery::default()))
            .await
            .unwrap();
        assert_status_ok(&response);

        let document = parse_html_document(response).await;
        assert_valid_html(&document);

        let record_count = document
            .select(&Selector::parse("[data-summary='record-count']").unwrap())
            .next()
            .expect("expected the record count card");
        assert_eq!(record_count.text().collect::<String>().trim(), "3");

        let total_spent = document
            .select(&Selector::parse("[data-summary='total-spent']").unwrap())
            .next()
            .expect("expected the total spent card");
        // Seeded costs are 1 + 2 + 3.
        assert_eq!(total_spent.text().collect::<String>().trim(), "$6");

        assert!(
            document
                .select(&Selector::parse("#spending-chart").unwrap())
                .next()
                .is_some(),
            "expected the chart container"
        );

        let initializes_chart = document
            .select(&Selector::parse("script").unwrap())
            .any(|script| script.text().collect::<String>().contains("spending-chart"));
        assert!(initializes_chart, "expected the chart init script");

        let rows: Vec<_> = document
            .select(&Selector::parse("tbody tr[data-expense-row='true']").unwrap())
            .collect();
        assert_eq!(rows.len(), 3, "the expense table should be embedded below");
    }

    #[tokio::test]
    async fn range_selector_marks_the_current_range() {
        let stub = StubExpenseApi::default();
        stub.seed(2);
        let state = test_state(&stub).await;
        let jar = unlocked_jar(state.cookie_key.clone());

        let response = get_dashboard_page(
            State(state),
            jar,
            Query(DashboardQuery {
                time_range: Some(TimeRange::Week),
            }),
        )
        .await
        .unwrap();

        let document = parse_html_document(response).await;
        let current = document
            .select(&Selector::parse("nav[aria-label='Aggregation range'] [aria-current='page']").unwrap())
            .next()
            .expect("expected the current range marker");

        assert_eq!(current.text().collect::<String>(), "Week");
    }

    #[tokio::test]
    async fn displays_prompt_text_on_no_data() {
        let stub = StubExpenseApi::default();
        let state = test_state(&stub).await;
        let jar = unlocked_jar(state.cookie_key.clone());

        let response = get_dashboard_page(State(state), jar, Query(DashboardQuery::default()))
            .await
            .unwrap();
        assert_status_ok(&response);

        let document = parse_html_document(response).await;
        let text = document.root_element().text().collect::<String>();

        assert!(text.contains("Charts will show up here"));
    }
}
