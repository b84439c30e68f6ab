use crate::review::Review;
use serde::{Deserialize, Serialize};

/// Ordered, append-only accumulator for one scrape run.
///
/// No uniqueness is enforced here. A stalled pagination that re-renders the
/// same page produces the same reviews twice; removing them is a separate
/// post-processing step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ReviewCollection {
    reviews: Vec<Review>,
}

impl ReviewCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, review: Review) {
        self.reviews.push(review);
    }

    pub fn extend<I: IntoIterator<Item = Review>>(&mut self, reviews: I) {
        self.reviews.extend(reviews);
    }

    pub fn len(&self) -> usize {
        self.reviews.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reviews.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Review> {
        self.reviews.iter()
    }

    pub fn as_slice(&self) -> &[Review] {
        &self.reviews
    }
}

impl From<Vec<Review>> for ReviewCollection {
    fn from(reviews: Vec<Review>) -> Self {
        Self { reviews }
    }
}

impl IntoIterator for ReviewCollection {
    type Item = Review;
    type IntoIter = std::vec::IntoIter<Review>;

    fn into_iter(self) -> Self::IntoIter {
        self.reviews.into_iter()
    }
}

impl<'a> IntoIterator for &'a ReviewCollection {
    type Item = &'a Review;
    type IntoIter = std::slice::Iter<'a, Review>;

    fn into_iter(self) -> Self::IntoIter {
        self.reviews.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_preserves_order_and_duplicates() {
        let mut collection = ReviewCollection::new();
        collection.extend(vec![
            Review::new("Jan 1, 2020", 5.0, "a"),
            Review::new("Jan 2, 2020", 3.5, "b"),
        ]);
        collection.push(Review::new("Jan 1, 2020", 5.0, "a"));

        assert_eq!(collection.len(), 3);
        let texts: Vec<&str> = collection.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "a"]);
    }
}
