//! The wire types exchanged with the remote expense API.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A single expense record as stored by the API server.
///
/// `id` and `date_created` are server-assigned: the server never reuses an id
/// once assigned, and the client treats both fields as read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The server-assigned unique identifier.
    pub id: i64,
    /// The free-text label for the expense.
    pub expense_name: String,
    /// Optional free-text details.
    #[serde(default)]
    pub expense_details: Option<String>,
    /// The amount spent. Finite and non-negative.
    pub cost: f64,
    /// The URL of the uploaded image, when one was attached.
    #[serde(default)]
    pub image_path: Option<String>,
    /// When the server created the record.
    #[serde(with = "time::serde::rfc3339")]
    pub date_created: OffsetDateTime,
}

/// One page of expenses plus the total record count, used to drive the
/// pagination controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePage {
    /// The total number of expense records on the server.
    pub total_count: u64,
    /// The records for the requested page, in server-side order.
    pub items: Vec<Expense>,
}

/// The aggregate returned by the total-expenses endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseTotal {
    /// The total number of expense records.
    pub expense_total_count: u64,
}

/// One point of the time-aggregated cost series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedPoint {
    /// The bucket label, e.g. "2026-08-25".
    pub date: String,
    /// The summed cost for the bucket.
    pub cost: f64,
}

/// The granularity of the aggregated cost series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    /// One bucket per day.
    #[default]
    Day,
    /// One bucket per week.
    Week,
    /// One bucket per month.
    Month,
    /// One bucket per year.
    Year,
}

impl TimeRange {
    /// The query-parameter value the API expects.
    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Day => "day",
            TimeRange::Week => "week",
            TimeRange::Month => "month",
            TimeRange::Year => "year",
        }
    }

    /// The label shown in the dashboard's range selector.
    pub fn label(self) -> &'static str {
        match self {
            TimeRange::Day => "Day",
            TimeRange::Week => "Week",
            TimeRange::Month => "Month",
            TimeRange::Year => "Year",
        }
    }
}

/// The fields for creating or updating an expense.
///
/// Sent to the API as a multipart form so an image file can ride along.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// The free-text label for the expense.
    pub expense_name: String,
    /// Optional free-text details.
    pub expense_details: String,
    /// The amount spent. Must be finite and non-negative before submission.
    pub cost: f64,
    /// The image to attach, if any.
    pub image: Option<ImageUpload>,
}

/// An image file attached to an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    /// The file name the browser reported.
    pub file_name: String,
    /// The MIME type the browser reported, e.g. "image/png".
    pub content_type: String,
    /// The raw file contents.
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod model_tests {
    use time::macros::datetime;

    use super::{Expense, ExpensePage, TimeRange};

    #[test]
    fn expense_deserializes_from_api_json() {
        let json = r#"{
            "id": 7,
            "expenseName": "Coffee",
            "expenseDetails": "Flat white",
            "cost": 4.5,
            "imagePath": null,
            "dateCreated": "2026-08-25T09:30:00Z"
        }"#;

        let got: Expense = serde_json::from_str(json).unwrap();

        assert_eq!(got.id, 7);
        assert_eq!(got.expense_name, "Coffee");
        assert_eq!(got.expense_details.as_deref(), Some("Flat white"));
        assert_eq!(got.cost, 4.5);
        assert_eq!(got.image_path, None);
        assert_eq!(got.date_created, datetime!(2026-08-25 09:30 UTC));
    }

    #[test]
    fn expense_tolerates_missing_optional_fields() {
        let json = r#"{
            "id": 1,
            "expenseName": "Bus fare",
            "cost": 2.0,
            "dateCreated": "2026-01-02T00:00:00Z"
        }"#;

        let got: Expense = serde_json::from_str(json).unwrap();

        assert_eq!(got.expense_details, None);
        assert_eq!(got.image_path, None);
    }

    #[test]
    fn page_deserializes_total_count_and_items() {
        let json = r#"{ "totalCount": 31, "items": [] }"#;

        let got: ExpensePage = serde_json::from_str(json).unwrap();

        assert_eq!(got.total_count, 31);
        assert!(got.items.is_empty());
    }

    #[test]
    fn time_range_defaults_to_day() {
        assert_eq!(TimeRange::default(), TimeRange::Day);
        assert_eq!(TimeRange::default().as_str(), "day");
    }
}
