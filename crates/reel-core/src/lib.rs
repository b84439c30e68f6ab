pub mod dataset;
pub mod dedupe;

pub use dataset::{common_start_date, load_film_reviews, parse_review_date, prepare_dataset, write_dataset_csv, DatasetSummary, FilmReviews};
pub use dedupe::{dedupe_file, dedupe_reviews, DedupeReport};
