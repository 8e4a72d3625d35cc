//! Outlay is a web client for an expense-tracking REST API.
//!
//! This library serves HTML pages directly: expense records live on a remote
//! API server, and every page is rendered from data fetched over HTTP. The
//! client keeps a short-lived response cache that is invalidated whenever an
//! expense is created or deleted, so the server stays the single source of
//! truth.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod alert;
mod api;
mod app_state;
mod cache;
mod cost_expr;
mod dashboard;
mod endpoints;
mod expense;
mod gate;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod pagination;
mod routing;

#[cfg(test)]
mod test_utils;

pub use api::{ApiClient, ExpenseApi};
pub use app_state::AppState;
pub use logging::logging_middleware;
pub use pagination::PaginationConfig;
pub use routing::build_router;

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::get_404_not_found_response};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The expense API could not be reached (network unreachable, timeout,
    /// connection refused).
    #[error("could not reach the expense API: {0}")]
    Transport(String),

    /// The expense API returned a non-success status.
    ///
    /// `message` holds the server's error payload when the response body
    /// contained one, otherwise `None`.
    #[error("the expense API returned status {status}")]
    Api {
        /// The HTTP status code of the response.
        status: u16,
        /// The server-supplied error message, if any.
        message: Option<String>,
    },

    /// The expense API returned a body that could not be decoded as the
    /// expected JSON shape.
    #[error("could not decode the expense API response: {0}")]
    InvalidResponse(String),

    /// Could not acquire the response cache lock.
    #[error("could not acquire the response cache lock")]
    CacheLock,

    /// The multipart form sent by the browser could not be parsed.
    #[error("could not parse multipart form: {0}")]
    Multipart(String),

    /// The requested resource was not found.
    #[error("the requested resource could not be found")]
    NotFound,
}

impl Error {
    /// The message to show the user for this error.
    ///
    /// Server-supplied messages are surfaced verbatim, everything else gets a
    /// generic description.
    pub(crate) fn user_message(&self) -> String {
        match self {
            Error::Api {
                message: Some(message),
                ..
            } => message.clone(),
            Error::Transport(_) => "Could not reach the expense service.".to_owned(),
            _ => "An unexpected error occurred, please try again later.".to_owned(),
        }
    }

    /// Convert the error into an HTTP response with an HTML alert.
    ///
    /// The status code is always a client or server error so htmx skips the
    /// normal swap and `hx-target-error` routes the alert into
    /// `#alert-container` instead of blanking the triggering element's
    /// target.
    fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::Api {
                status,
                message: Some(message),
            } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                Alert::Error {
                    message: "The expense service rejected the request".to_owned(),
                    details: message,
                },
            ),
            Error::Transport(reason) => {
                tracing::error!("Could not reach the expense API: {reason}");
                (
                    StatusCode::BAD_GATEWAY,
                    Alert::ErrorSimple {
                        message: "Could not reach the expense service.".to_owned(),
                    },
                )
            }
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::ErrorSimple {
                        message: "An unexpected error occurred, please try again later.".to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Error::InvalidResponse(error.to_string())
        } else {
            Error::Transport(error.to_string())
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::Transport(ref reason) => {
                tracing::error!("Could not reach the expense API: {reason}");
                InternalServerError {
                    description: "The expense service could not be reached.",
                    fix: "Check that the expense API server is running and try again.",
                }
                .into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                InternalServerError::default().into_response()
            }
        }
    }
}
