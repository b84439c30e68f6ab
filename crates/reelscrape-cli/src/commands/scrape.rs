use super::config::{config_file, load_config};
use crate::output::Output;
use clap::{ArgAction, Args};
use color_eyre::eyre::{bail, eyre};
use color_eyre::Result;
use futures::FutureExt;
use indicatif::{ProgressBar, ProgressStyle};
use reel_config::{default_config, Config, FilmConfig, PathManager};
use reel_sources::{
    with_browser, write_reviews_csv, BrowserOptions, PageProgress, RenderWait, ReviewScraper, ScrapeError, Selectors,
};
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Args, Debug, Default)]
pub struct ScrapeArgs {
    /// Name of a configured film
    #[arg(long)]
    pub film: Option<String>,

    /// Scrape every configured film (the default when neither --film nor --url is given)
    #[arg(long, action = ArgAction::SetTrue, conflicts_with_all = ["film", "url"])]
    pub all: bool,

    /// Listing URL to scrape without a config entry
    #[arg(long)]
    pub url: Option<String>,

    /// Number of listing pages to parse (overrides the config)
    #[arg(long)]
    pub pages: Option<u32>,

    /// Destination CSV; only valid when a single film is scraped
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Pause after each "next page" click, in milliseconds
    #[arg(long)]
    pub wait_ms: Option<u64>,

    /// Show the browser window
    #[arg(long, action = ArgAction::SetTrue)]
    pub headed: bool,
}

struct ScrapeJob {
    film: FilmConfig,
    output: PathBuf,
}

struct FilmResult {
    name: String,
    output: PathBuf,
    reviews: usize,
}

pub async fn run_scrape(args: ScrapeArgs, config_path: Option<&Path>, output: &Output) -> Result<()> {
    tracing::debug!("Scrape command started");

    // An ad-hoc --url run works without a config file
    let config = if args.url.is_some() && !config_file(config_path).exists() {
        Config {
            films: Vec::new(),
            ..default_config()
        }
    } else {
        load_config(config_path)?
    };

    let targets = resolve_targets(&args, &config)?;
    if targets.len() > 1 && args.output.is_some() {
        bail!("--output can only be used when scraping a single film");
    }

    let paths = PathManager::default();
    let default_dir = paths.raw_dir();
    let jobs: Vec<ScrapeJob> = targets
        .into_iter()
        .map(|film| ScrapeJob {
            output: args
                .output
                .clone()
                .unwrap_or_else(|| config.film_output(&film, &default_dir)),
            film,
        })
        .collect();

    // Reject before a browser is launched
    if jobs.iter().any(|job| job.film.pages == 0) {
        return Err(ScrapeError::InvalidPageCount.into());
    }

    let selectors = Selectors::compile(&config.selectors)?;
    let render_wait = RenderWait::from_millis(args.wait_ms.unwrap_or(config.scrape.render_wait_ms));
    let options = BrowserOptions {
        headless: config.scrape.headless && !args.headed,
        extra_args: config.scrape.browser_args.clone(),
        user_data_dir: Some(paths.browser_dir()),
        fetch_dir: paths.data_dir().join("chromium"),
    };
    let show_progress = output.show_progress();

    info!(films = jobs.len(), wait_ms = render_wait.delay().as_millis() as u64, "Starting scrape");

    let results = with_browser(&options, |browser| {
        async move {
            let mut results = Vec::with_capacity(jobs.len());
            for job in &jobs {
                let bar = progress_bar(&job.film, show_progress);
                let scraper = ReviewScraper::new(selectors.clone(), render_wait).with_progress({
                    let bar = bar.clone();
                    move |progress: PageProgress| {
                        bar.set_position(progress.page as u64);
                        bar.set_message(format!("{} reviews", progress.total_reviews));
                    }
                });

                let reviews = scraper.scrape(browser, &job.film.url, job.film.pages).await?;
                bar.finish_and_clear();

                let written = write_reviews_csv(&job.output, reviews.as_slice())?;
                info!(film = %job.film.name, reviews = written, output = %job.output.display(), "Film scraped");
                results.push(FilmResult {
                    name: job.film.name.clone(),
                    output: job.output.clone(),
                    reviews: written,
                });
            }
            Ok::<_, ScrapeError>(results)
        }
        .boxed()
    })
    .await?;

    for result in &results {
        output.success(format!(
            "{}: {} reviews written to {}",
            result.name,
            result.reviews,
            result.output.display()
        ));
    }
    if results.iter().any(|r| r.reviews > 0) {
        output.info("Raw files may contain repeats; run 'reelscrape dedupe <file>' before analysis.");
    }
    output.json(&json!({
        "type": "scrape",
        "films": results.iter().map(|r| json!({
            "name": r.name,
            "reviews": r.reviews,
            "output": r.output,
        })).collect::<Vec<_>>(),
    }));

    Ok(())
}

fn resolve_targets(args: &ScrapeArgs, config: &Config) -> Result<Vec<FilmConfig>> {
    let mut targets = if let Some(ref url) = args.url {
        vec![FilmConfig {
            name: args.film.clone().unwrap_or_else(|| "adhoc".to_string()),
            url: url.clone(),
            pages: 1,
            output: None,
        }]
    } else if let Some(ref name) = args.film {
        let film = config
            .film(name)
            .cloned()
            .ok_or_else(|| eyre!("Film '{}' is not configured", name))?;
        vec![film]
    } else {
        if config.films.is_empty() {
            bail!("No films configured; add [[films]] entries or pass --url");
        }
        config.films.clone()
    };

    if let Some(pages) = args.pages {
        for target in &mut targets {
            target.pages = pages;
        }
    }
    Ok(targets)
}

fn progress_bar(film: &FilmConfig, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(film.pages as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} pages {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  "),
    );
    bar.set_prefix(film.name.clone());
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(names: &[&str]) -> Config {
        Config {
            films: names
                .iter()
                .map(|name| FilmConfig {
                    name: name.to_string(),
                    url: format!("https://example.com/{}", name),
                    pages: 4,
                    output: None,
                })
                .collect(),
            ..default_config()
        }
    }

    #[test]
    fn test_defaults_to_all_configured_films() {
        let targets = resolve_targets(&ScrapeArgs::default(), &config_with(&["a", "b", "c"])).unwrap();
        let names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_named_film_with_page_override() {
        let args = ScrapeArgs {
            film: Some("b".to_string()),
            pages: Some(9),
            ..ScrapeArgs::default()
        };
        let targets = resolve_targets(&args, &config_with(&["a", "b"])).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].name, "b");
        assert_eq!(targets[0].pages, 9);
    }

    #[test]
    fn test_unknown_film_is_an_error() {
        let args = ScrapeArgs {
            film: Some("missing".to_string()),
            ..ScrapeArgs::default()
        };
        assert!(resolve_targets(&args, &config_with(&["a"])).is_err());
    }

    #[test]
    fn test_adhoc_url_ignores_config_films() {
        let args = ScrapeArgs {
            url: Some("https://example.com/other".to_string()),
            ..ScrapeArgs::default()
        };
        let targets = resolve_targets(&args, &config_with(&[])).unwrap();
        assert_eq!(targets[0].name, "adhoc");
        assert_eq!(targets[0].pages, 1);
    }

    #[test]
    fn test_zero_pages_is_kept_for_rejection() {
        let args = ScrapeArgs {
            pages: Some(0),
            ..ScrapeArgs::default()
        };
        let targets = resolve_targets(&args, &config_with(&["a"])).unwrap();
        assert_eq!(targets[0].pages, 0);
    }

    #[test]
    fn test_no_films_configured() {
        assert!(resolve_targets(&ScrapeArgs::default(), &config_with(&[])).is_err());
    }
}
