//! The HTTP adapter for the remote expense API.
//!
//! All outbound requests go through [ApiClient], which owns the base URL and
//! the bearer token. The token is passed in explicitly at construction time so
//! tests can inject a fixed token instead of reading ambient state.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, multipart};
use serde::{Deserialize, de::DeserializeOwned};

use crate::Error;

/// How long to wait for the expense API before giving up on a request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A thin wrapper around [reqwest::Client] that knows the expense API's base
/// URL and attaches the `Authorization: Bearer` header when a token is
/// configured.
///
/// Cloning is cheap, the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    bearer_token: Option<String>,
}

/// The error payload the expense API sends with non-success responses.
///
/// The body is not guaranteed to have this shape (or to be JSON at all), so
/// decoding failures fall back to a generic error.
#[derive(Debug, Deserialize)]
struct ServerErrorPayload {
    message: Option<String>,
}

impl ApiClient {
    /// Create a client for the API at `base_url`.
    ///
    /// `bearer_token` is attached to every request when `Some`; when `None`
    /// no auth header is sent and the server decides whether that is
    /// acceptable.
    ///
    /// # Errors
    /// Returns [Error::Transport] if the underlying HTTP client cannot be
    /// initialized.
    pub fn new(base_url: &str, bearer_token: Option<String>) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|error| Error::Transport(error.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            bearer_token,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let request = self.http.request(method, url);

        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a GET request and decode the JSON response.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let response = self.request(Method::GET, path).query(query).send().await?;
        let response = check_status(response).await?;

        Ok(response.json().await?)
    }

    /// Send a multipart POST or PUT request and decode the JSON response.
    pub(crate) async fn send_multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: multipart::Form,
    ) -> Result<T, Error> {
        let response = self.request(method, path).multipart(form).send().await?;
        let response = check_status(response).await?;

        Ok(response.json().await?)
    }

    /// Send a DELETE request, discarding the response body.
    pub(crate) async fn delete(&self, path: &str, query: &[(&str, String)]) -> Result<(), Error> {
        let response = self
            .request(Method::DELETE, path)
            .query(query)
            .send()
            .await?;
        check_status(response).await?;

        Ok(())
    }
}

/// Turn a non-success response into [Error::Api], surfacing the server's
/// message when the body carries one.
async fn check_status(response: Response) -> Result<Response, Error> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ServerErrorPayload>()
        .await
        .ok()
        .and_then(|payload| payload.message);

    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}
