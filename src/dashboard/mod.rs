//! The dashboard page with the spending-over-time chart.

mod charts;
mod handlers;

pub use handlers::get_dashboard_page;
