use crate::error::{Result, ScrapeError};
use csv::{Reader, Writer};
use reel_models::Review;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

/// Column layout of a per-film review file
pub const REVIEW_COLUMNS: [&str; 3] = ["date", "stars", "text"];

/// Write reviews as `date,stars,text`, replacing any existing file.
pub fn write_reviews_csv<P: AsRef<Path>>(path: P, reviews: &[Review]) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = Writer::from_path(path)?;
    // serialize() only emits the header with the first record
    if reviews.is_empty() {
        writer.write_record(REVIEW_COLUMNS)?;
    }
    for review in reviews {
        writer.serialize(review)?;
    }
    writer.flush()?;

    info!("Wrote {} reviews to {}", reviews.len(), path.display());
    Ok(reviews.len())
}

/// Read a `date,stars,text` file; extra columns are ignored.
pub fn read_reviews_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Review>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut reader = Reader::from_reader(file);

    let headers = reader.headers()?.clone();
    let header_map: HashMap<&str, usize> = headers.iter().enumerate().map(|(i, h)| (h, i)).collect();
    for col in REVIEW_COLUMNS {
        if !header_map.contains_key(col) {
            return Err(ScrapeError::MissingColumn(col.to_string()));
        }
    }

    let mut reviews = Vec::new();
    for result in reader.deserialize() {
        let review: Review = result?;
        reviews.push(review);
    }

    debug!("Read {} reviews from {}", reviews.len(), path.display());
    Ok(reviews)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_written_reviews_read_back_identically() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("film.csv");
        let reviews = vec![
            Review::new("Mar 3, 2021", 2.5, "Decent, but long"),
            Review::new("Mar 2, 2021", 5.0, "He said \"wow\"\nthen left"),
            Review::new("Mar 1, 2021", 0.0, ""),
        ];

        assert_eq!(write_reviews_csv(&path, &reviews).unwrap(), 3);
        let loaded = read_reviews_csv(&path).unwrap();

        assert_eq!(loaded, reviews);
    }

    #[test]
    fn test_header_written_for_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_reviews_csv(&path, &[]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "date,stars,text\n");
        assert!(read_reviews_csv(&path).unwrap().is_empty());
    }

    #[test]
    fn test_missing_column_is_reported() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "date,text").unwrap();
        writeln!(file, "Jan 1, 2020,hello").unwrap();

        match read_reviews_csv(file.path()) {
            Err(ScrapeError::MissingColumn(col)) => assert_eq!(col, "stars"),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_integer_stars_are_accepted() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "date,stars,text").unwrap();
        writeln!(file, "\"Jan 1, 2020\",4,fine").unwrap();

        let reviews = read_reviews_csv(file.path()).unwrap();
        assert_eq!(reviews, vec![Review::new("Jan 1, 2020", 4.0, "fine")]);
    }
}
