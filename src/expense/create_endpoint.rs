//! Defines the route handler for creating a new expense.

use axum::{
    extract::{FromRef, Multipart, State},
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    AppState, Error,
    alert::Alert,
    api::{
        ExpenseApi,
        models::{ImageUpload, NewExpense},
    },
    cache::ResponseCache,
    cost_expr::evaluate_cost,
    pagination::PaginationConfig,
};

use super::{
    expenses_page::{
        CACHE_RESOURCE, default_expenses_content, fetch_clamped_expense_page, name_suggestions,
    },
    form::{ExpenseFormValues, create_expense_form},
    view::expenses_content,
};

/// The state needed for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseState {
    /// The typed client for the remote expense API.
    pub expense_api: ExpenseApi,
    /// The cache of API responses.
    pub cache: ResponseCache,
    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for CreateExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            expense_api: state.expense_api.clone(),
            cache: state.cache.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The fields submitted by the create-expense form.
#[derive(Default)]
struct CreateFormData {
    values: ExpenseFormValues,
    image: Option<ImageUpload>,
    page: Option<u64>,
    page_size: Option<u64>,
}

/// Handler for creating an expense via the POST method.
///
/// On success the record is stored on the API server, the response cache is
/// invalidated and the refreshed expense table is returned along with a
/// success alert. A cost expression that does not evaluate, or a rejection
/// from the API server, re-renders the form with the entered values and an
/// inline error message.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseState>,
    multipart: Multipart,
) -> Response {
    let form = match read_create_form(multipart).await {
        Ok(form) => form,
        Err(error) => return error.into_alert_response(),
    };

    let page = form.page.unwrap_or(state.pagination_config.default_page);
    let page_size = form
        .page_size
        .unwrap_or(state.pagination_config.default_page_size)
        .max(1);

    let cost = match evaluate_cost(&form.values.cost) {
        Ok(cost) => cost,
        Err(error) => {
            return content_with_form_error(&state, &form.values, &error.to_string(), page, page_size)
                .await;
        }
    };

    let record = NewExpense {
        expense_name: form.values.expense_name.trim().to_owned(),
        expense_details: form.values.expense_details.trim().to_owned(),
        cost,
        image: form.image,
    };

    let created = match state.expense_api.create(&record).await {
        Ok(created) => created,
        Err(
            error @ Error::Api {
                message: Some(_), ..
            },
        ) => {
            let message = error.user_message();
            return content_with_form_error(&state, &form.values, &message, page, page_size).await;
        }
        Err(error) => return error.into_alert_response(),
    };

    if let Err(error) = state.cache.invalidate(CACHE_RESOURCE) {
        return error.into_alert_response();
    }

    let refreshed = default_expenses_content(
        &state.expense_api,
        &state.cache,
        &state.pagination_config,
        page,
        page_size,
    )
    .await;

    match refreshed {
        Ok(content) => {
            let alert = Alert::Success {
                message: format!("Added \"{}\".", created.expense_name),
            };

            html! {
                (content)
                (alert.into_oob_html())
            }
            .into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}

/// Read the create-expense form out of the multipart request body.
///
/// Unknown fields are skipped. An image part with no file name means the user
/// left the file picker empty, so it is ignored.
async fn read_create_form(mut multipart: Multipart) -> Result<CreateFormData, Error> {
    let mut form = CreateFormData::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| Error::Multipart(error.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_owned();

        match name.as_str() {
            "expense_name" => form.values.expense_name = read_text(field).await?,
            "expense_details" => form.values.expense_details = read_text(field).await?,
            "cost" => form.values.cost = read_text(field).await?,
            "page" => form.page = read_text(field).await?.parse().ok(),
            "page_size" => form.page_size = read_text(field).await?.parse().ok(),
            "expense_image" => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|error| Error::Multipart(error.to_string()))?;

                if !file_name.is_empty() && !bytes.is_empty() {
                    form.image = Some(ImageUpload {
                        file_name,
                        content_type,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, Error> {
    field
        .text()
        .await
        .map_err(|error| Error::Multipart(error.to_string()))
}

/// Re-render the expense table with the form carrying the entered values and
/// an inline error message.
async fn content_with_form_error(
    state: &CreateExpenseState,
    values: &ExpenseFormValues,
    error_message: &str,
    page: u64,
    page_size: u64,
) -> Response {
    let (page, expense_page) =
        match fetch_clamped_expense_page(&state.expense_api, &state.cache, page, page_size).await {
            Ok(result) => result,
            Err(error) => return error.into_alert_response(),
        };

    let suggestions = name_suggestions(&expense_page);
    let form = create_expense_form(values, &suggestions, Some(error_message), page, page_size);

    expenses_content(
        &expense_page,
        page,
        page_size,
        state.pagination_config.max_pages,
        &form,
    )
    .into_response()
}
