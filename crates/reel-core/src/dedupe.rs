use anyhow::{Context, Result};
use reel_models::Review;
use reel_sources::{read_reviews_csv, write_reviews_csv};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupeReport {
    pub before: usize,
    pub after: usize,
}

impl DedupeReport {
    pub fn removed(&self) -> usize {
        self.before - self.after
    }
}

/// Drop exact repeats of `(date, stars, text)`, keeping the first occurrence
/// and the original order.
pub fn dedupe_reviews(reviews: Vec<Review>) -> (Vec<Review>, DedupeReport) {
    let before = reviews.len();
    let mut seen = HashSet::with_capacity(before);
    let kept: Vec<Review> = reviews
        .into_iter()
        .filter(|review| seen.insert(review.dedup_key()))
        .collect();

    let report = DedupeReport {
        before,
        after: kept.len(),
    };
    (kept, report)
}

/// Dedupe a review file. Writes back to `input` when `output` is `None`.
pub fn dedupe_file(input: &Path, output: Option<&Path>) -> Result<DedupeReport> {
    let reviews = read_reviews_csv(input)
        .with_context(|| format!("Failed to read reviews from {}", input.display()))?;
    let (kept, report) = dedupe_reviews(reviews);

    let target = output.unwrap_or(input);
    write_reviews_csv(target, &kept)
        .with_context(|| format!("Failed to write reviews to {}", target.display()))?;

    info!(
        input = %input.display(),
        output = %target.display(),
        removed = report.removed(),
        "Deduplicated {} -> {} reviews",
        report.before,
        report.after
    );
    Ok(report)
}
