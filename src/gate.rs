//! The shared-passphrase gate in front of the expense pages.
//!
//! This is a convenience screen, not authentication: the passphrase is shared
//! by everyone who uses the instance and the only secret-keeping happens on
//! the API server behind its bearer token. Unlocking sets a private session
//! cookie so the prompt is not shown again until the browser closes.

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, Key, SameSite},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    AppState, endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, loading_spinner, passphrase_input},
};

/// The cookie that marks a browser session as unlocked.
pub(crate) const COOKIE_UNLOCKED: &str = "unlocked";

pub(crate) const INCORRECT_PASSPHRASE_ERROR_MSG: &str = "Incorrect password.";

/// Whether the session has already passed the gate.
pub(crate) fn is_unlocked(jar: &PrivateCookieJar) -> bool {
    jar.get(COOKIE_UNLOCKED).is_some()
}

fn unlock_form(error_message: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::UNLOCK_API)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            hx-indicator="#indicator"
            hx-disabled-elt="#passphrase, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (passphrase_input(error_message))

            button
                type="submit" id="submit-button" tabindex="0"
                class=(BUTTON_PRIMARY_STYLE)
            {
                span class="inline htmx-indicator" id="indicator"
                {
                    (loading_spinner())
                }
                "Unlock"
            }
        }
    }
}

/// The full unlock page shown in place of any expense page while locked.
pub(crate) fn unlock_page() -> Response {
    let content = html! {
        div class=(FORM_CONTAINER_STYLE)
        {
            p class="flex items-center mb-6 text-2xl font-semibold text-gray-900 dark:text-white"
            {
                "Outlay"
            }

            div class="w-full bg-white rounded-lg shadow dark:border md:mt-0 sm:max-w-md xl:p-0 dark:bg-gray-800 dark:border-gray-700"
            {
                div class="p-6 space-y-4 md:space-y-6 sm:p-8"
                {
                    h1 class="text-xl font-bold leading-tight tracking-tight text-gray-900 md:text-2xl dark:text-white"
                    {
                        "Enter the password"
                    }

                    (unlock_form(None))
                }
            }
        }
    };

    base("Unlock", &[], &content).into_response()
}

/// The state needed to check the passphrase and set the unlock cookie.
#[derive(Debug, Clone)]
pub struct UnlockState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The shared passphrase that unlocks the expense pages.
    pub passphrase: String,
}

impl FromRef<AppState> for UnlockState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            passphrase: state.passphrase.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<UnlockState> for Key {
    fn from_ref(state: &UnlockState) -> Self {
        state.cookie_key.clone()
    }
}

/// The raw data entered in the unlock form.
#[derive(Clone, Deserialize)]
pub struct UnlockForm {
    /// The passphrase entered by the user.
    pub passphrase: String,
}

/// Handler for unlock requests via the POST method.
///
/// On a correct passphrase the unlock cookie is set and the client is
/// redirected to the expenses page. Otherwise the form is returned with an
/// error message.
pub async fn post_unlock(
    State(state): State<UnlockState>,
    jar: PrivateCookieJar,
    Form(form): Form<UnlockForm>,
) -> Response {
    if form.passphrase != state.passphrase {
        return unlock_form(Some(INCORRECT_PASSPHRASE_ERROR_MSG)).into_response();
    }

    let cookie = Cookie::build((COOKIE_UNLOCKED, "1"))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    (
        StatusCode::SEE_OTHER,
        HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
        jar.add(cookie),
    )
        .into_response()
}
