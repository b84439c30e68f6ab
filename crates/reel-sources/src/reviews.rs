use crate::browser::ReviewBrowser;
use crate::error::{Result, ScrapeError};
use crate::parser::{parse_page, Selectors};
use reel_models::ReviewCollection;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Position in a scrape run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeState {
    /// Page `page` (1-based) is rendered and ready to parse
    OnPage { page: u32 },
    Done,
}

impl ScrapeState {
    /// State after page `page` has been parsed
    pub fn after_parse(page: u32, page_count: u32) -> Self {
        if page >= page_count {
            ScrapeState::Done
        } else {
            ScrapeState::OnPage { page: page + 1 }
        }
    }
}

/// Pause between clicking "next" and parsing the new page.
///
/// A fixed sleep, not an event-driven readiness check. It cannot tell a slow
/// render from a finished one, so too short a delay re-parses the old page.
#[derive(Debug, Clone, Copy)]
pub struct RenderWait {
    delay: Duration,
}

impl RenderWait {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub async fn wait_for_next_page_ready(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

/// Emitted once per parsed page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    pub page: u32,
    pub page_count: u32,
    pub reviews_on_page: usize,
    pub total_reviews: usize,
}

type ProgressCallback = Box<dyn Fn(PageProgress) + Send + Sync>;

pub struct ReviewScraper {
    selectors: Selectors,
    render_wait: RenderWait,
    on_page: Option<ProgressCallback>,
}

impl ReviewScraper {
    pub fn new(selectors: Selectors, render_wait: RenderWait) -> Self {
        Self {
            selectors,
            render_wait,
            on_page: None,
        }
    }

    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(PageProgress) + Send + Sync + 'static,
    {
        self.on_page = Some(Box::new(callback));
        self
    }

    /// Collect reviews from `page_count` consecutive listing pages.
    ///
    /// Loads `start_url`, then parses the rendered page, appends its reviews
    /// and, unless it was the last page, clicks the next-page control and
    /// waits for the render. That is `page_count` parses and
    /// `page_count - 1` advances.
    ///
    /// Nothing checks that an advance actually changed the page: a stalled
    /// listing is parsed again and its reviews appended twice. A missing
    /// next-page control aborts the whole run.
    pub async fn scrape<B>(&self, browser: &mut B, start_url: &str, page_count: u32) -> Result<ReviewCollection>
    where
        B: ReviewBrowser + ?Sized,
    {
        if page_count == 0 {
            return Err(ScrapeError::InvalidPageCount);
        }

        info!(url = start_url, pages = page_count, "Scraping reviews");
        browser.navigate(start_url).await?;

        let mut reviews = ReviewCollection::new();
        let mut state = ScrapeState::OnPage { page: 1 };

        while let ScrapeState::OnPage { page } = state {
            let html = browser.page_source().await?;
            let parsed = parse_page(&html, &self.selectors);

            if parsed.reviews.is_empty() {
                warn!(page, "No reviews found on page; the markup may not match the configured selectors");
            }

            let reviews_on_page = parsed.reviews.len();
            reviews.extend(parsed.reviews);
            debug!(page, reviews_on_page, total = reviews.len(), "Page parsed");

            if let Some(ref callback) = self.on_page {
                callback(PageProgress {
                    page,
                    page_count,
                    reviews_on_page,
                    total_reviews: reviews.len(),
                });
            }

            state = ScrapeState::after_parse(page, page_count);
            if let ScrapeState::OnPage { .. } = state {
                if let Err(e) = browser.click_next(&self.selectors.next_page).await {
                    warn!(page, "Pagination advance failed: {}", e);
                    return Err(e);
                }
                self.render_wait.wait_for_next_page_ready().await;
            }
        }

        info!("Scraped {} reviews across {} pages", reviews.len(), page_count);
        Ok(reviews)
    }
}
