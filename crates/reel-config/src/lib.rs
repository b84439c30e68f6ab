pub mod config;
pub mod paths;

pub use config::{Config, DatasetConfig, FilmConfig, LoggingConfig, ScrapeOptions, SelectorConfig, default_config};
pub use paths::PathManager;
