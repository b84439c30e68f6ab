use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A review row of the merged, analysis-ready dataset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PreparedReview {
    pub film: String,
    pub date: NaiveDate,
    /// Days between `date` and the common start date shared by all films.
    pub days_since_start: i64,
    pub stars: f64,
    pub text: String,
}
