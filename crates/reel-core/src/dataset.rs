use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::Writer;
use reel_config::{Config, PathManager};
use reel_models::{PreparedReview, Review};
use reel_sources::read_reviews_csv;
use std::path::Path;
use tracing::{debug, info, warn};

/// The reviews collected for one film
#[derive(Debug, Clone, PartialEq)]
pub struct FilmReviews {
    pub name: String,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSummary {
    pub start: Option<NaiveDate>,
    pub rows: usize,
    /// Reviews whose displayed date did not match the format (e.g. "5d")
    pub unparsed_dates: usize,
    /// Reviews dated before the common start
    pub before_start: usize,
}

pub fn parse_review_date(raw: &str, date_format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), date_format).ok()
}

/// Latest of the per-film earliest dates, so every film covers the whole
/// window from the returned date on. Films without any dates are ignored.
pub fn common_start_date(per_film_dates: &[Vec<NaiveDate>]) -> Option<NaiveDate> {
    per_film_dates
        .iter()
        .filter_map(|dates| dates.iter().min().copied())
        .max()
}

/// Parse dates, keep reviews on or after the common start date, and encode
/// each date as its day offset from that start.
pub fn prepare_dataset(films: &[FilmReviews], date_format: &str) -> (Vec<PreparedReview>, DatasetSummary) {
    let mut summary = DatasetSummary::default();

    let parsed: Vec<Vec<(NaiveDate, &Review)>> = films
        .iter()
        .map(|film| {
            let mut dated = Vec::with_capacity(film.reviews.len());
            for review in &film.reviews {
                match parse_review_date(&review.date, date_format) {
                    Some(date) => dated.push((date, review)),
                    None => {
                        debug!(film = %film.name, date = %review.date, "Unparsed review date");
                        summary.unparsed_dates += 1;
                    }
                }
            }
            dated
        })
        .collect();

    let per_film_dates: Vec<Vec<NaiveDate>> = parsed
        .iter()
        .map(|dated| dated.iter().map(|(date, _)| *date).collect())
        .collect();
    let Some(start) = common_start_date(&per_film_dates) else {
        warn!("No review dates could be parsed with format '{}'", date_format);
        return (Vec::new(), summary);
    };
    summary.start = Some(start);

    let mut rows = Vec::new();
    for (film, dated) in films.iter().zip(parsed) {
        for (date, review) in dated {
            if date < start {
                summary.before_start += 1;
                continue;
            }
            rows.push(PreparedReview {
                film: film.name.clone(),
                date,
                days_since_start: (date - start).num_days(),
                stars: review.stars,
                text: review.text.clone(),
            });
        }
    }
    summary.rows = rows.len();

    if summary.unparsed_dates > 0 {
        warn!("Dropped {} reviews with unparsable dates", summary.unparsed_dates);
    }
    info!(
        start = %start,
        rows = summary.rows,
        before_start = summary.before_start,
        "Prepared dataset"
    );
    (rows, summary)
}

/// Read every configured film's review file
pub fn load_film_reviews(config: &Config, paths: &PathManager) -> Result<Vec<FilmReviews>> {
    let default_dir = paths.raw_dir();
    config
        .films
        .iter()
        .map(|film| {
            let path = config.film_output(film, &default_dir);
            let reviews = read_reviews_csv(&path)
                .with_context(|| format!("Failed to read reviews for '{}' from {}", film.name, path.display()))?;
            Ok(FilmReviews {
                name: film.name.clone(),
                reviews,
            })
        })
        .collect()
}

pub fn write_dataset_csv(path: &Path, rows: &[PreparedReview]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut writer = Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    if rows.is_empty() {
        writer.write_record(["film", "date", "days_since_start", "stars", "text"])?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!("Wrote {} prepared reviews to {}", rows.len(), path.display());
    Ok(())
}
