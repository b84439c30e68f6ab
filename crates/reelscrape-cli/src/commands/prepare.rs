use super::config::load_config;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use reel_config::PathManager;
use reel_core::{load_film_reviews, prepare_dataset, write_dataset_csv};
use serde_json::json;
use std::path::{Path, PathBuf};

pub fn run_prepare(
    config_path: Option<&Path>,
    target: Option<PathBuf>,
    date_format: Option<String>,
    output: &Output,
) -> Result<()> {
    let config = load_config(config_path)?;
    if config.films.is_empty() {
        return Err(eyre!("No films configured; nothing to prepare"));
    }

    let paths = PathManager::default();
    let films = load_film_reviews(&config, &paths).map_err(|e| eyre!("{:#}", e))?;
    let date_format = date_format.unwrap_or_else(|| config.dataset.date_format.clone());
    let (rows, summary) = prepare_dataset(&films, &date_format);

    let destination = target
        .or_else(|| config.dataset.output.clone())
        .unwrap_or_else(|| paths.dataset_file());
    write_dataset_csv(&destination, &rows).map_err(|e| eyre!("{:#}", e))?;

    match summary.start {
        Some(start) => output.success(format!(
            "Wrote {} reviews from {} films starting {} to {}",
            summary.rows,
            films.len(),
            start,
            destination.display()
        )),
        None => output.warn(format!(
            "No review dates matched '{}'; wrote an empty dataset to {}",
            date_format,
            destination.display()
        )),
    }
    if summary.unparsed_dates > 0 {
        output.warn(format!("{} reviews skipped: date not in '{}' format", summary.unparsed_dates, date_format));
    }
    if summary.before_start > 0 {
        output.info(format!("{} reviews dated before the common start were dropped", summary.before_start));
    }
    output.json(&json!({
        "type": "prepare",
        "output": destination,
        "start": summary.start.map(|d| d.to_string()),
        "rows": summary.rows,
        "unparsed_dates": summary.unparsed_dates,
        "before_start": summary.before_start,
    }));
    Ok(())
}
