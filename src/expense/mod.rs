//! The expense table page and its create/delete endpoints.
//!
//! The page is served as a full HTML document; the create and delete
//! endpoints return the refreshed `#expenses-content` section as an htmx
//! fragment together with an out-of-band alert.

mod create_endpoint;
mod delete_endpoint;
mod expenses_page;
mod form;
mod view;

pub use create_endpoint::create_expense_endpoint;
pub use delete_endpoint::delete_expense_endpoint;
pub use expenses_page::get_expenses_page;

pub(crate) use expenses_page::{CACHE_RESOURCE, default_expenses_content};
