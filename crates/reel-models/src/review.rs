use serde::{Deserialize, Serialize};

/// Highest rating a review listing can display.
pub const MAX_STARS: f64 = 5.0;

/// A single audience review as scraped from a listing page.
///
/// `date` is kept exactly as displayed (e.g. "Mar 3, 2021"); parsing happens
/// downstream when the dataset is prepared.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub date: String,
    pub stars: f64, // 0.0-5.0 in 0.5 steps
    pub text: String,
}

impl Review {
    pub fn new(date: impl Into<String>, stars: f64, text: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            stars,
            text: text.into(),
        }
    }

    /// Key used for exact-duplicate detection. Stars are compared on their
    /// half-step value so 2.5 and 2.50000001 never appear as separate rows.
    pub fn dedup_key(&self) -> (String, i64, String) {
        (
            self.date.clone(),
            (self.stars * 2.0).round() as i64,
            self.text.clone(),
        )
    }
}
