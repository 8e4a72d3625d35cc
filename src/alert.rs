//! Alert toasts for success and error messages.
//!
//! Alerts land in the `#alert-container` element of the base layout through
//! one of two routes. Success alerts render with `hx-swap-oob` so a handler
//! can return its main fragment plus an alert in one response. Error alerts
//! travel on responses with an error status code, which the response-targets
//! extension routes into the container via `hx-target-error`.

use maud::{Markup, html};

const ALERT_SUCCESS_STYLE: &str = "flex items-start gap-3 w-full p-4 mb-2 rounded-lg shadow \
    text-green-800 bg-green-50 dark:bg-gray-800 dark:text-green-400";

const ALERT_ERROR_STYLE: &str = "flex items-start gap-3 w-full p-4 mb-2 rounded-lg shadow \
    text-red-800 bg-red-50 dark:bg-gray-800 dark:text-red-400";

const DISMISS_BUTTON_STYLE: &str = "ms-auto -mx-1.5 -my-1.5 rounded-lg p-1.5 inline-flex \
    items-center justify-center h-8 w-8 bg-transparent hover:bg-gray-200 dark:hover:bg-gray-700";

/// A message shown to the user in the floating alert container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    /// The operation succeeded.
    Success {
        /// The headline, e.g. "Expense created".
        message: String,
    },
    /// The operation failed and there is a detail line to show.
    Error {
        /// The headline describing what failed.
        message: String,
        /// Specifics, e.g. the server's rejection message.
        details: String,
    },
    /// The operation failed with no further detail.
    ErrorSimple {
        /// The headline describing what failed.
        message: String,
    },
}

impl Alert {
    /// Render the alert as an out-of-band swap into `#alert-container`.
    ///
    /// Use this on success paths where the response body is the refreshed
    /// page fragment and the alert rides along.
    pub fn into_oob_html(self) -> Markup {
        html! {
            div id="alert-container" hx-swap-oob="true" class="w-full max-w-md px-4"
            {
                (self.into_html())
            }
        }
    }

    /// Render the bare alert element.
    ///
    /// Error responses return this as their whole body; `hx-target-error`
    /// swaps it into `#alert-container`.
    pub fn into_html(self) -> Markup {
        let (style, message, details) = match self {
            Alert::Success { message } => (ALERT_SUCCESS_STYLE, message, None),
            Alert::Error { message, details } => (ALERT_ERROR_STYLE, message, Some(details)),
            Alert::ErrorSimple { message } => (ALERT_ERROR_STYLE, message, None),
        };

        html! {
            div class=(style) role="alert"
            {
                div
                {
                    p class="text-sm font-medium" { (message) }

                    @if let Some(details) = &details
                    {
                        p class="text-sm" { (details) }
                    }
                }

                button
                    type="button"
                    class=(DISMISS_BUTTON_STYLE)
                    aria-label="Close"
                    onclick="this.closest('[role=alert]').remove()"
                {
                    "✕"
                }
            }
        }
    }
}
