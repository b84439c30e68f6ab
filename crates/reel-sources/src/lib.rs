pub mod browser;
pub mod error;
pub mod export;
pub mod parser;
pub mod reviews;

pub use browser::{with_browser, with_session, BrowserOptions, ChromiumBrowser, ReviewBrowser};
pub use error::ScrapeError;
pub use export::{read_reviews_csv, write_reviews_csv, REVIEW_COLUMNS};
pub use parser::{extract_dates, extract_stars, extract_texts, leading_text_token, parse_page, PageParse, Selectors};
pub use reviews::{PageProgress, RenderWait, ReviewScraper, ScrapeState};
