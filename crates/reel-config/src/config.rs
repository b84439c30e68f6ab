use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub scrape: ScrapeOptions,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub films: Vec<FilmConfig>,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Browser and pacing settings shared by every film
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrapeOptions {
    /// Fixed pause after each "next page" click before the page is parsed again
    #[serde(default = "default_render_wait_ms")]
    pub render_wait_ms: u64,

    #[serde(default = "default_true")]
    pub headless: bool,

    /// Extra Chromium command-line flags appended after the built-in ones
    #[serde(default)]
    pub browser_args: Vec<String>,

    /// Where per-film CSVs land; defaults to the data dir's `raw/`
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

/// CSS selectors describing the review-listing markup.
///
/// These are tied to the exact page shape at the time they were written.
/// When the site changes its markup, update them here rather than in code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectorConfig {
    /// One per review: the block holding the star icons
    #[serde(default = "default_rating_block_selector")]
    pub rating_block: String,
    /// Full star icon inside a rating block (counts 1.0)
    #[serde(default = "default_filled_star_selector")]
    pub filled_star: String,
    /// Half star icon inside a rating block (counts 0.5)
    #[serde(default = "default_half_star_selector")]
    pub half_star: String,
    #[serde(default = "default_date_selector")]
    pub date: String,
    /// Matches two elements per review; only the first of each pair is text
    #[serde(default = "default_text_selector")]
    pub text: String,
    #[serde(default = "default_next_page_selector")]
    pub next_page: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilmConfig {
    pub name: String,
    pub url: String,
    #[serde(default = "default_pages")]
    pub pages: u32,
    /// Overrides `<output_dir>/<name>.csv`
    #[serde(default)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasetConfig {
    /// chrono format of the displayed review dates
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Daily-rotated log file; logs go to stderr when unset
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_render_wait_ms() -> u64 {
    3000
}

fn default_pages() -> u32 {
    1
}

fn default_date_format() -> String {
    "%b %d, %Y".to_string()
}

fn default_rating_block_selector() -> String {
    "span.star-display".to_string()
}

fn default_filled_star_selector() -> String {
    "span.star-display__filled".to_string()
}

fn default_half_star_selector() -> String {
    "span.star-display__half".to_string()
}

fn default_date_selector() -> String {
    "span.audience-reviews__duration".to_string()
}

fn default_text_selector() -> String {
    "p.js-clamp".to_string()
}

fn default_next_page_selector() -> String {
    "button.js-prev-next-paging-next".to_string()
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            render_wait_ms: default_render_wait_ms(),
            headless: true,
            browser_args: Vec::new(),
            output_dir: None,
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            rating_block: default_rating_block_selector(),
            filled_star: default_filled_star_selector(),
            half_star: default_half_star_selector(),
            date: default_date_selector(),
            text: default_text_selector(),
            next_page: default_next_page_selector(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            output: None,
        }
    }
}

/// Starter config written by `config init`
pub fn default_config() -> Config {
    Config {
        scrape: ScrapeOptions::default(),
        selectors: SelectorConfig::default(),
        films: vec![FilmConfig {
            name: "example-film".to_string(),
            url: "https://www.rottentomatoes.com/m/example_film/reviews?type=user".to_string(),
            pages: 10,
            output: None,
        }],
        dataset: DatasetConfig::default(),
        logging: LoggingConfig::default(),
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), films = config.films.len(), "Loaded config");
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let mut names = HashSet::new();
        for film in &self.films {
            if film.name.trim().is_empty() {
                anyhow::bail!("Film name must not be empty");
            }
            if !names.insert(film.name.as_str()) {
                anyhow::bail!("Duplicate film name: {}", film.name);
            }
            if film.pages == 0 {
                anyhow::bail!("Film '{}': pages must be at least 1", film.name);
            }
            if !(film.url.starts_with("http://") || film.url.starts_with("https://")) {
                anyhow::bail!("Film '{}': url must start with http:// or https://", film.name);
            }
        }

        let selectors = [
            ("rating_block", &self.selectors.rating_block),
            ("filled_star", &self.selectors.filled_star),
            ("half_star", &self.selectors.half_star),
            ("date", &self.selectors.date),
            ("text", &self.selectors.text),
            ("next_page", &self.selectors.next_page),
        ];
        for (key, value) in selectors {
            if value.trim().is_empty() {
                anyhow::bail!("Selector '{}' must not be empty", key);
            }
            if scraper::Selector::parse(value).is_err() {
                anyhow::bail!("Selector '{}' is not valid CSS: {}", key, value);
            }
        }

        if self.dataset.date_format.trim().is_empty() {
            anyhow::bail!("dataset.date_format must not be empty");
        }

        Ok(())
    }

    pub fn film(&self, name: &str) -> Option<&FilmConfig> {
        self.films.iter().find(|f| f.name == name)
    }

    /// CSV path for a film: explicit `output`, else `<output_dir>/<name>.csv`
    pub fn film_output(&self, film: &FilmConfig, default_dir: &Path) -> PathBuf {
        if let Some(ref output) = film.output {
            return output.clone();
        }
        let dir = self.scrape.output_dir.as_deref().unwrap_or(default_dir);
        dir.join(format!("{}.csv", film.name))
    }
}
