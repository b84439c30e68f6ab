use crate::error::{Result, ScrapeError};
use async_trait::async_trait;
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use chromiumoxide::error::CdpError;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::future::BoxFuture;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use which::which;

/// The browser operations the review scraper needs.
///
/// Kept narrow so the pagination loop can be driven by a real Chromium
/// session or by scripted pages in tests.
#[async_trait]
pub trait ReviewBrowser: Send {
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Serialized DOM of the page as currently rendered
    async fn page_source(&mut self) -> Result<String>;

    /// Click the element matching `selector`; `NextPageMissing` when absent
    async fn click_next(&mut self, selector: &str) -> Result<()>;

    async fn close(&mut self) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub extra_args: Vec<String>,
    /// Profile directory; a throwaway profile is used when unset
    pub user_data_dir: Option<PathBuf>,
    /// Where a Chromium build is downloaded when none is installed
    pub fetch_dir: PathBuf,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            extra_args: Vec::new(),
            user_data_dir: None,
            fetch_dir: std::env::temp_dir().join("reelscrape_chromium"),
        }
    }
}

/// Run `operation` against `browser`, closing the browser afterwards on
/// every path. A close failure is logged and never masks the operation's
/// own result.
pub async fn with_session<B, F, R>(mut browser: B, operation: F) -> Result<R>
where
    B: ReviewBrowser,
    F: for<'a> FnOnce(&'a mut B) -> BoxFuture<'a, Result<R>>,
{
    let result = operation(&mut browser).await;

    if let Err(e) = browser.close().await {
        warn!("Failed to close browser session: {}", e);
    }

    result
}

/// Launch Chromium, run `operation` with it, and shut it down afterwards.
pub async fn with_browser<F, R>(options: &BrowserOptions, operation: F) -> Result<R>
where
    F: for<'a> FnOnce(&'a mut ChromiumBrowser) -> BoxFuture<'a, Result<R>>,
{
    let browser = ChromiumBrowser::launch(options).await?;
    with_session(browser, operation).await
}

pub struct ChromiumBrowser {
    browser: Option<Browser>,
    page: Option<Page>,
    handler_task: Option<JoinHandle<()>>,
}

impl ChromiumBrowser {
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let chrome_path = match find_system_chromium() {
            Some(path) => path,
            None => fetch_chromium(&options.fetch_dir).await?,
        };

        let config = build_browser_config(&chrome_path, options)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScrapeError::Browser(format!("Failed to launch browser: {}", e)))?;

        let handler_task = tokio::spawn(async move {
            let mut error_count = 0;
            const MAX_ERRORS: usize = 10;

            while let Some(event) = handler.next().await {
                match event {
                    Ok(_) => error_count = 0,
                    Err(e) => {
                        error_count += 1;
                        warn!("Browser handler error (count: {}/{}): {:?}", error_count, MAX_ERRORS, e);
                        if error_count >= MAX_ERRORS {
                            error!("Browser handler received {} consecutive errors, giving up", error_count);
                            break;
                        }
                    }
                }
            }
            debug!("Browser handler task ended");
        });

        info!(executable = %chrome_path.display(), headless = options.headless, "Browser launched");
        Ok(Self {
            browser: Some(browser),
            page: None,
            handler_task: Some(handler_task),
        })
    }

    fn browser(&self) -> Result<&Browser> {
        self.browser
            .as_ref()
            .ok_or_else(|| ScrapeError::Browser("Browser already closed".to_string()))
    }

    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| ScrapeError::Browser("No page open; navigate first".to_string()))
    }
}

#[async_trait]
impl ReviewBrowser for ChromiumBrowser {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        debug!(url, "Navigating");
        match self.page {
            Some(ref page) => {
                page.goto(url).await?;
            }
            None => {
                let page = self.browser()?.new_page(url).await?;
                self.page = Some(page);
            }
        }
        self.page()?.wait_for_navigation().await?;
        Ok(())
    }

    async fn page_source(&mut self) -> Result<String> {
        Ok(self.page()?.content().await?)
    }

    async fn click_next(&mut self, selector: &str) -> Result<()> {
        let element = self
            .page()?
            .find_element(selector)
            .await
            .map_err(|e| next_control_error(e, selector))?;
        element.scroll_into_view().await?;
        element.click().await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                warn!("Failed to close page: {}", e);
            }
        }

        if let Some(mut browser) = self.browser.take() {
            info!("Shutting down browser instance");
            browser.close().await?;
            if let Err(e) = browser.wait().await {
                warn!("Failed waiting for browser process to exit: {}", e);
            }
        }

        if let Some(handler_task) = self.handler_task.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), handler_task).await;
        }

        Ok(())
    }
}

impl Drop for ChromiumBrowser {
    fn drop(&mut self) {
        // chromiumoxide kills the child process when `Browser` drops
        if self.browser.is_some() {
            warn!("Browser dropped without close(); killing process");
        }
        if let Some(handler_task) = self.handler_task.take() {
            handler_task.abort();
        }
    }
}

/// Locate an installed Chromium/Chrome: well-known paths first, then PATH.
fn find_system_chromium() -> Option<PathBuf> {
    let known_paths = [
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/usr/bin/google-chrome",
        "/usr/local/bin/chromium",
        "/opt/chromium/chromium",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    ];

    for path in &known_paths {
        if Path::new(path).exists() {
            return Some(PathBuf::from(path));
        }
    }

    which("chromium")
        .or_else(|_| which("chromium-browser"))
        .or_else(|_| which("google-chrome"))
        .ok()
}

async fn fetch_chromium(fetch_dir: &Path) -> Result<PathBuf> {
    info!("No system Chromium found, downloading via BrowserFetcher...");
    tokio::fs::create_dir_all(fetch_dir).await?;

    let options = BrowserFetcherOptions::builder()
        .with_path(fetch_dir)
        .build()
        .map_err(|e| ScrapeError::Browser(format!("Failed to create BrowserFetcherOptions: {}", e)))?;
    let info = BrowserFetcher::new(options)
        .fetch()
        .await
        .map_err(|e| ScrapeError::Browser(format!("Failed to fetch Chromium: {}", e)))?;

    info!("Chromium downloaded to: {:?}", info.executable_path);
    Ok(info.executable_path)
}

fn build_browser_config(chrome_path: &Path, options: &BrowserOptions) -> Result<BrowserConfig> {
    let mut builder = BrowserConfig::builder().chrome_executable(chrome_path);

    if !options.headless {
        builder = builder.with_head();
    }

    if !cfg!(target_os = "macos") {
        builder = builder.arg("--no-sandbox").arg("--disable-dev-shm-usage");
    }

    builder = builder
        .arg("--disable-extensions")
        .arg("--disable-notifications")
        .arg("--disable-sync")
        .arg("--disable-default-apps")
        .arg("--log-level=3")
        .arg("--disable-background-timer-throttling")
        .arg("--disable-renderer-backgrounding")
        .window_size(1280, 1024);

    if let Some(ref dir) = options.user_data_dir {
        std::fs::create_dir_all(dir)?;
        builder = builder.user_data_dir(dir);
    }

    for arg in &options.extra_args {
        builder = builder.arg(arg.as_str());
    }

    builder
        .build()
        .map_err(|e| ScrapeError::Browser(format!("Failed to build browser config: {}", e)))
}

/// A selector with no match surfaces from CDP as a protocol error on node id 0
/// (or `NotFound`); anything else means the session itself is broken.
fn next_control_error(err: CdpError, selector: &str) -> ScrapeError {
    match err {
        CdpError::Chrome(_) | CdpError::NotFound => ScrapeError::NextPageMissing {
            selector: selector.to_string(),
        },
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct Recorder {
        closed: Arc<AtomicBool>,
        navigations: Vec<String>,
    }

    #[async_trait]
    impl ReviewBrowser for Recorder {
        async fn navigate(&mut self, url: &str) -> Result<()> {
            self.navigations.push(url.to_string());
            Ok(())
        }

        async fn page_source(&mut self) -> Result<String> {
            Ok(String::new())
        }

        async fn click_next(&mut self, selector: &str) -> Result<()> {
            Err(ScrapeError::NextPageMissing {
                selector: selector.to_string(),
            })
        }

        async fn close(&mut self) -> Result<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_with_session_closes_after_success() {
        let recorder = Recorder::default();
        let closed = recorder.closed.clone();

        let result = with_session(recorder, |browser| {
            async move {
                browser.navigate("https://example.com").await?;
                Ok::<_, ScrapeError>(browser.navigations.len())
            }
            .boxed()
        })
        .await;

        assert_eq!(result.unwrap(), 1);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_with_session_closes_after_failure() {
        let recorder = Recorder::default();
        let closed = recorder.closed.clone();

        let result: Result<()> = with_session(recorder, |browser| {
            async move { browser.click_next("button.next").await }.boxed()
        })
        .await;

        assert!(matches!(result, Err(ScrapeError::NextPageMissing { .. })));
        assert!(closed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_build_browser_config_accepts_extra_args() {
        let options = BrowserOptions {
            extra_args: vec!["--lang=en-US".to_string()],
            ..BrowserOptions::default()
        };
        assert!(build_browser_config(Path::new("/usr/bin/chromium"), &options).is_ok());
    }

    #[test]
    fn test_missing_next_control_is_distinguished_from_session_failure() {
        let no_node = CdpError::Chrome(chromiumoxide::types::Error {
            code: -32000,
            message: "Could not find node with given id".to_string(),
        });
        assert!(matches!(
            next_control_error(no_node, "button.next"),
            ScrapeError::NextPageMissing { ref selector } if selector == "button.next"
        ));
        assert!(matches!(
            next_control_error(CdpError::NotFound, "button.next"),
            ScrapeError::NextPageMissing { .. }
        ));

        assert!(matches!(
            next_control_error(CdpError::NoResponse, "button.next"),
            ScrapeError::Browser(_)
        ));
        assert!(matches!(
            next_control_error(CdpError::Timeout, "button.next"),
            ScrapeError::Browser(_)
        ));
    }
}
