//! Implements a struct that holds the shared state of the web server.

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use crate::{
    Error,
    api::{ApiClient, ExpenseApi},
    cache::ResponseCache,
    pagination::PaginationConfig,
};

/// The state shared across the route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The shared passphrase that unlocks the expense pages.
    pub passphrase: String,

    /// The typed client for the remote expense API.
    pub expense_api: ExpenseApi,

    /// The cache of API responses, invalidated on every mutation.
    pub cache: ResponseCache,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,
}

impl AppState {
    /// Create a new [AppState] with a client for the expense API at
    /// `api_base_url`.
    ///
    /// `bearer_token` is attached to every outbound API request when set.
    /// `passphrase` is the shared phrase that unlocks the pages.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(
        api_base_url: &str,
        bearer_token: Option<String>,
        passphrase: &str,
        cookie_secret: &str,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        let client = ApiClient::new(api_base_url, bearer_token)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            passphrase: passphrase.to_owned(),
            expense_api: ExpenseApi::new(client),
            cache: ResponseCache::default(),
            pagination_config,
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}
