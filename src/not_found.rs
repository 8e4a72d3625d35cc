//! The 404 page returned for unknown routes and missing expenses.
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::html::error_view;

pub async fn get_404_not_found() -> Response {
    get_404_not_found_response()
}

pub fn get_404_not_found_response() -> Response {
    let page = error_view(
        "Not Found",
        "404",
        "Sorry, that page does not exist.",
        "Check the address or head back to the expense list.",
    );

    (StatusCode::NOT_FOUND, Html(page.into_string())).into_response()
}
