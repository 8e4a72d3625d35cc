use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use axum::{
    Json, Router,
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, put},
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, Key},
};
use serde::Deserialize;
use serde_json::json;
use time::{Duration, OffsetDateTime};

use crate::api::{
    ApiClient, ExpenseApi,
    models::{AggregatedPoint, Expense, ExpensePage, ExpenseTotal},
};

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::OK);
}

#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    let location = response
        .headers()
        .get("hx-redirect")
        .expect("Headers missing hx-redirect");

    assert_eq!(location, endpoint);
}

/// A cookie jar that has already passed the passphrase gate.
pub(crate) fn unlocked_jar(key: Key) -> PrivateCookieJar {
    PrivateCookieJar::new(key).add(Cookie::new(crate::gate::COOKIE_UNLOCKED, "1"))
}

/// Serve `app` on an ephemeral local port and return its base URL.
pub(crate) async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Could not bind to an ephemeral port");
    let address = listener.local_addr().expect("Could not get local address");

    tokio::spawn(async move {
        axum::serve(listener, app)
            .await
            .expect("Stub server stopped unexpectedly");
    });

    format!("http://{address}")
}

/// An in-process stand-in for the remote expense API.
///
/// Keeps its records in memory and mirrors the API's routes and payload
/// shapes, so client code can be exercised over a real socket.
#[derive(Clone)]
pub(crate) struct StubExpenseApi {
    state: Arc<Mutex<StubState>>,
}

struct StubState {
    expenses: Vec<Expense>,
    next_id: i64,
    fail_next: Option<(u16, String)>,
}

impl Default for StubExpenseApi {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(StubState {
                expenses: Vec::new(),
                next_id: 1,
                fail_next: None,
            })),
        }
    }
}

impl StubExpenseApi {
    /// Insert `count` records with ids `1..=count` and cost equal to the id.
    pub(crate) fn seed(&self, count: i64) {
        let mut state = self.state.lock().unwrap();

        for i in 1..=count {
            let expense = Expense {
                id: i,
                expense_name: format!("Expense {i}"),
                expense_details: None,
                cost: i as f64,
                image_path: None,
                date_created: OffsetDateTime::now_utc() - Duration::days(i),
            };
            state.expenses.push(expense);
        }

        state.next_id = count + 1;
    }

    /// Make the next request fail with `status` and a JSON `message` payload.
    pub(crate) fn fail_next(&self, status: u16, message: &str) {
        self.state.lock().unwrap().fail_next = Some((status, message.to_owned()));
    }

    /// A snapshot of the stub's records.
    pub(crate) fn expenses(&self) -> Vec<Expense> {
        self.state.lock().unwrap().expenses.clone()
    }

    /// Serve the stub on an ephemeral port and return a client pointed at it.
    pub(crate) async fn serve(&self) -> ExpenseApi {
        let base_url = spawn_server(self.router()).await;
        let client = ApiClient::new(&base_url, None).expect("Could not create API client");

        ExpenseApi::new(client)
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/Expenses", get(list_expenses).post(create_expense))
            .route("/Expenses", delete(delete_expense))
            .route("/Expenses/paged", get(list_paged))
            .route("/Expenses/total-expenses", get(total_expenses))
            .route("/Expenses/{id}", get(get_expense))
            .route("/Expenses/{id}", put(update_expense))
            .route("/expenses/aggregated", get(list_aggregated))
            .with_state(self.state.clone())
    }
}

/// Take the injected failure, if one is pending.
fn take_failure(state: &Arc<Mutex<StubState>>) -> Option<Response> {
    let (status, message) = state.lock().unwrap().fail_next.take()?;
    let status = StatusCode::from_u16(status).unwrap();

    Some((status, Json(json!({ "message": message }))).into_response())
}

async fn list_expenses(State(state): State<Arc<Mutex<StubState>>>) -> Response {
    if let Some(failure) = take_failure(&state) {
        return failure;
    }

    Json(state.lock().unwrap().expenses.clone()).into_response()
}

#[derive(Deserialize)]
struct PageParams {
    page: u64,
    #[serde(rename = "pageSize")]
    page_size: u64,
}

async fn list_paged(
    State(state): State<Arc<Mutex<StubState>>>,
    Query(params): Query<PageParams>,
) -> Response {
    if let Some(failure) = take_failure(&state) {
        return failure;
    }

    let state = state.lock().unwrap();
    let start = (params.page.max(1) - 1) * params.page_size;
    let items = state
        .expenses
        .iter()
        .skip(start as usize)
        .take(params.page_size as usize)
        .cloned()
        .collect();

    Json(ExpensePage {
        total_count: state.expenses.len() as u64,
        items,
    })
    .into_response()
}

async fn total_expenses(State(state): State<Arc<Mutex<StubState>>>) -> Response {
    if let Some(failure) = take_failure(&state) {
        return failure;
    }

    let total = state.lock().unwrap().expenses.len() as u64;

    Json(ExpenseTotal {
        expense_total_count: total,
    })
    .into_response()
}

async fn get_expense(
    State(state): State<Arc<Mutex<StubState>>>,
    Path(id): Path<i64>,
) -> Response {
    if let Some(failure) = take_failure(&state) {
        return failure;
    }

    let state = state.lock().unwrap();

    match state.expenses.iter().find(|expense| expense.id == id) {
        Some(expense) => Json(expense.clone()).into_response(),
        None => not_found(id),
    }
}

async fn create_expense(
    State(state): State<Arc<Mutex<StubState>>>,
    multipart: Multipart,
) -> Response {
    if let Some(failure) = take_failure(&state) {
        return failure;
    }

    let fields = read_expense_form(multipart).await;
    let mut state = state.lock().unwrap();
    let id = state.next_id;
    state.next_id += 1;

    let expense = Expense {
        id,
        expense_name: fields.expense_name,
        expense_details: fields.expense_details,
        cost: fields.cost,
        image_path: fields.image_file_name.map(|name| format!("/uploads/{name}")),
        date_created: OffsetDateTime::now_utc(),
    };
    state.expenses.push(expense.clone());

    Json(expense).into_response()
}

async fn update_expense(
    State(state): State<Arc<Mutex<StubState>>>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Response {
    if let Some(failure) = take_failure(&state) {
        return failure;
    }

    let fields = read_expense_form(multipart).await;
    let mut state = state.lock().unwrap();

    let Some(expense) = state.expenses.iter_mut().find(|expense| expense.id == id) else {
        return not_found(id);
    };

    expense.expense_name = fields.expense_name;
    expense.expense_details = fields.expense_details;
    expense.cost = fields.cost;
    if let Some(name) = fields.image_file_name {
        expense.image_path = Some(format!("/uploads/{name}"));
    }

    Json(expense.clone()).into_response()
}

#[derive(Deserialize)]
struct DeleteParams {
    id: i64,
}

async fn delete_expense(
    State(state): State<Arc<Mutex<StubState>>>,
    Query(params): Query<DeleteParams>,
) -> Response {
    if let Some(failure) = take_failure(&state) {
        return failure;
    }

    let mut state = state.lock().unwrap();
    let before = state.expenses.len();
    state.expenses.retain(|expense| expense.id != params.id);

    if state.expenses.len() == before {
        return not_found(params.id);
    }

    StatusCode::NO_CONTENT.into_response()
}

#[derive(Deserialize)]
struct AggregatedParams {
    #[serde(rename = "timeRange")]
    time_range: String,
}

async fn list_aggregated(
    State(state): State<Arc<Mutex<StubState>>>,
    Query(params): Query<AggregatedParams>,
) -> Response {
    if let Some(failure) = take_failure(&state) {
        return failure;
    }

    let state = state.lock().unwrap();
    let mut buckets: BTreeMap<String, f64> = BTreeMap::new();

    for expense in &state.expenses {
        let date = expense.date_created.date();
        let label = match params.time_range.as_str() {
            "week" => format!("{}-W{:02}", date.year(), date.iso_week()),
            "month" => format!("{}-{:02}", date.year(), u8::from(date.month())),
            "year" => date.year().to_string(),
            _ => date.to_string(),
        };

        *buckets.entry(label).or_insert(0.0) += expense.cost;
    }

    let points: Vec<AggregatedPoint> = buckets
        .into_iter()
        .map(|(date, cost)| AggregatedPoint { date, cost })
        .collect();

    Json(points).into_response()
}

struct ExpenseFormFields {
    expense_name: String,
    expense_details: Option<String>,
    cost: f64,
    image_file_name: Option<String>,
}

async fn read_expense_form(mut multipart: Multipart) -> ExpenseFormFields {
    let mut fields = ExpenseFormFields {
        expense_name: String::new(),
        expense_details: None,
        cost: 0.0,
        image_file_name: None,
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .expect("Could not read multipart field")
    {
        let name = field.name().unwrap_or_default().to_owned();

        match name.as_str() {
            "ExpenseName" => fields.expense_name = field.text().await.unwrap(),
            "ExpenseDetails" => {
                let text = field.text().await.unwrap();
                fields.expense_details = (!text.is_empty()).then_some(text);
            }
            "Cost" => fields.cost = field.text().await.unwrap().parse().unwrap(),
            "ExpenseImage" => {
                fields.image_file_name = field.file_name().map(str::to_owned);
                // Consume the body so the stream stays well-formed.
                let _ = field.bytes().await.unwrap();
            }
            other => panic!("Unexpected multipart field {other}"),
        }
    }

    fields
}

fn not_found(id: i64) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("No expense with id {id}.") })),
    )
        .into_response()
}
