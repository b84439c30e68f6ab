use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScrapeError>;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("page count must be at least 1")]
    InvalidPageCount,

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Next page control not found (selector: {selector})")]
    NextPageMissing { selector: String },

    #[error("Invalid CSS selector: {selector}")]
    Selector { selector: String },

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<chromiumoxide::error::CdpError> for ScrapeError {
    fn from(value: chromiumoxide::error::CdpError) -> Self {
        ScrapeError::Browser(value.to_string())
    }
}
