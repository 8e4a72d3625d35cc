//! The client for the remote expense API.
//!
//! [client] wraps the outbound HTTP calls and attaches the bearer token,
//! [models] defines the wire types and [expenses] exposes the typed
//! operations. Nothing in this module caches responses, that is the caller's
//! job (see [crate::cache]).

mod client;
mod expenses;
pub(crate) mod models;

pub use client::ApiClient;
pub use expenses::ExpenseApi;
