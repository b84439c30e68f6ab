pub mod config;
pub mod dedupe;
pub mod prepare;
pub mod scrape;
