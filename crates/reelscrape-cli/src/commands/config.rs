use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use reel_config::{default_config, Config, PathManager};
use std::path::{Path, PathBuf};

pub fn config_file(config_path: Option<&Path>) -> PathBuf {
    match config_path {
        Some(path) => path.to_path_buf(),
        None => PathManager::default().config_file(),
    }
}

/// Load and validate the config, pointing at `config init` when missing
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let path = config_file(config_path);
    if !path.exists() {
        return Err(eyre!(
            "No config file at {}. Run 'reelscrape config init' to create one.",
            path.display()
        ));
    }
    let config = Config::load_from_file(&path).map_err(|e| eyre!("Failed to load {}: {}", path.display(), e))?;
    config.validate().map_err(|e| eyre!("Invalid configuration: {}", e))?;
    Ok(config)
}

/// Log file from the config, if one is readable. Runs before logging is
/// initialised, so failures are ignored here and reported by the command.
pub fn configured_log_file(config_path: Option<&Path>) -> Option<PathBuf> {
    let path = config_file(config_path);
    Config::load_from_file(&path).ok().and_then(|c| c.logging.file)
}

pub fn run_config(cmd: ConfigCommands, config_path: Option<&Path>, output: &Output) -> Result<()> {
    let path = config_file(config_path);
    match cmd {
        ConfigCommands::Path => {
            output.info(path.display().to_string());
            output.json(&serde_json::json!({ "config_file": path }));
        }
        ConfigCommands::Show => {
            let config = load_config(config_path)?;
            output.info(format!("Config file: {}", path.display()));
            output.info(summarize(&config));
            output.json(&serde_json::json!({
                "config_file": path,
                "films": config.films.iter().map(|f| serde_json::json!({
                    "name": f.name,
                    "url": f.url,
                    "pages": f.pages,
                })).collect::<Vec<_>>(),
                "render_wait_ms": config.scrape.render_wait_ms,
                "headless": config.scrape.headless,
            }));
        }
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                output.warn(format!("Config already exists at {} (use --force to overwrite)", path.display()));
                return Ok(());
            }
            PathManager::default()
                .ensure_directories()
                .map_err(|e| eyre!("Failed to create data directories: {}", e))?;
            default_config()
                .save_to_file(&path)
                .map_err(|e| eyre!("Failed to write {}: {}", path.display(), e))?;
            output.success(format!("Wrote starter config to {}", path.display()));
        }
    }
    Ok(())
}

fn summarize(config: &Config) -> String {
    let mut lines = vec![format!(
        "render wait: {} ms, headless: {}",
        config.scrape.render_wait_ms, config.scrape.headless
    )];
    for film in &config.films {
        lines.push(format!("  {} ({} pages): {}", film.name, film.pages, film.url));
    }
    if config.films.is_empty() {
        lines.push("  no films configured".to_string());
    }
    lines.join("\n")
}
