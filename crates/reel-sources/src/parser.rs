use crate::error::{Result, ScrapeError};
use reel_config::SelectorConfig;
use reel_models::{Review, MAX_STARS};
use scraper::{Html, Selector};
use tracing::{debug, warn};

/// Compiled form of [`SelectorConfig`]
#[derive(Debug, Clone)]
pub struct Selectors {
    pub rating_block: Selector,
    pub filled_star: Selector,
    pub half_star: Selector,
    pub date: Selector,
    pub text: Selector,
    /// Passed to the browser as-is, never matched against parsed markup
    pub next_page: String,
}

impl Selectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            rating_block: create_selector(&config.rating_block)?,
            filled_star: create_selector(&config.filled_star)?,
            half_star: create_selector(&config.half_star)?,
            date: create_selector(&config.date)?,
            text: create_selector(&config.text)?,
            next_page: {
                create_selector(&config.next_page)?;
                config.next_page.clone()
            },
        })
    }
}

#[inline]
fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| ScrapeError::Selector {
        selector: sel_str.to_string(),
    })
}

/// Result of parsing one rendered listing page
#[derive(Debug, Clone, PartialEq)]
pub struct PageParse {
    pub reviews: Vec<Review>,
    pub star_count: usize,
    pub date_count: usize,
    pub text_count: usize,
}

impl PageParse {
    /// False when the three extracted sequences disagree in length, which
    /// means records on this page may be paired with the wrong stars/dates.
    pub fn is_aligned(&self) -> bool {
        self.star_count == self.date_count && self.date_count == self.text_count
    }
}

/// Text between the end of the element's opening tag and the next tag
/// boundary, trimmed.
///
/// This slices serialized markup instead of walking the DOM: any inline
/// child element (`<br>`, `<em>`, a nested span) truncates the token, and
/// entities stay escaped.
pub fn leading_text_token(markup: &str) -> String {
    markup
        .split_once('>')
        .map(|(_, rest)| rest.split('<').next().unwrap_or_default())
        .unwrap_or_default()
        .trim()
        .to_string()
}

fn star_value(filled: usize, half: usize) -> f64 {
    (filled as f64 + half as f64 * 0.5).clamp(0.0, MAX_STARS)
}

/// One rating per rating block: 1.0 per filled icon plus 0.5 per half icon.
pub fn extract_stars(document: &Html, selectors: &Selectors) -> Vec<f64> {
    document
        .select(&selectors.rating_block)
        .map(|block| {
            let filled = block.select(&selectors.filled_star).count();
            let half = block.select(&selectors.half_star).count();
            star_value(filled, half)
        })
        .collect()
}

/// First text token of every date/duration container, unparsed.
pub fn extract_dates(document: &Html, selectors: &Selectors) -> Vec<String> {
    document
        .select(&selectors.date)
        .map(|element| leading_text_token(&element.html()))
        .collect()
}

/// Leading text token of every other text block, starting with the first.
///
/// The text selector matches two elements per review at the time of writing
/// (the review body and a second clamped block), so index 0 of each pair is
/// kept and index 1 dropped. A review rendered with a single block shifts
/// every following text onto the wrong record; nothing here detects that.
pub fn extract_texts(document: &Html, selectors: &Selectors) -> Vec<String> {
    document
        .select(&selectors.text)
        .step_by(2)
        .map(|element| leading_text_token(&element.html()))
        .collect()
}

/// Parse a page's markup and pair stars, dates and texts positionally.
///
/// Missing markers yield an empty page rather than an error. When the three
/// sequences differ in length the extra entries are dropped after a warning.
pub fn parse_page(html: &str, selectors: &Selectors) -> PageParse {
    let document = Html::parse_document(html);

    let stars = extract_stars(&document, selectors);
    let dates = extract_dates(&document, selectors);
    let texts = extract_texts(&document, selectors);

    let parse = PageParse {
        star_count: stars.len(),
        date_count: dates.len(),
        text_count: texts.len(),
        reviews: stars
            .into_iter()
            .zip(dates)
            .zip(texts)
            .map(|((stars, date), text)| Review { date, stars, text })
            .collect(),
    };

    if !parse.is_aligned() {
        warn!(
            stars = parse.star_count,
            dates = parse.date_count,
            texts = parse.text_count,
            "Extracted sequences differ in length; records on this page may be misaligned"
        );
    }
    debug!(reviews = parse.reviews.len(), "Parsed listing page");

    parse
}

#[cfg(test)]
mod tests;
