use clap::{ArgAction, Parser, Subcommand};
use commands::{config, dedupe, prepare, scrape};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "reelscrape")]
#[command(about = "Collect audience reviews for films from paginated review listings")]
#[command(version)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output_format: output::OutputFormat,

    /// Config file (defaults to config.toml in the config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape reviews for one or all configured films
    #[command(long_about = "Open the film's review listing in Chromium, parse the given number of pages and write the reviews to a date,stars,text CSV. Without --film or --url every configured film is scraped in one browser session.")]
    Scrape(scrape::ScrapeArgs),

    /// Remove duplicate rows from a review CSV
    #[command(long_about = "Drop rows whose date, stars and text all repeat an earlier row, keeping the first occurrence. Stalled pagination produces such repeats. Rewrites the input unless --output is given.")]
    Dedupe {
        /// Review CSV to clean
        input: PathBuf,

        /// Write the result here instead of overwriting the input
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Merge configured films into one dataset with day offsets
    #[command(long_about = "Read every configured film's review CSV, parse the displayed dates, keep reviews on or after the latest per-film start date and write film,date,days_since_start,stars,text.")]
    Prepare {
        /// Destination CSV (defaults to dataset.output or the data directory)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// chrono format of the displayed review dates
        #[arg(long)]
        date_format: Option<String>,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write a starter configuration
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },

    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let log_file = config::configured_log_file(cli.config.as_deref());
    let guard = logging::init_logging(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output_format, cli.quiet);
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        Commands::Scrape(args) => scrape::run_scrape(args, config_path, &output).await,
        Commands::Dedupe { input, output: target } => dedupe::run_dedupe(&input, target.as_deref(), &output),
        Commands::Prepare { output: target, date_format } => {
            prepare::run_prepare(config_path, target, date_format, &output)
        }
        Commands::Config { cmd } => config::run_config(cmd, config_path, &output),
    };

    // JSON consumers get an error event on stdout instead of the eyre report
    if let Err(ref err) = result {
        if !output.is_human() {
            output.error(output::error_message(err));
            drop(guard);
            std::process::exit(1);
        }
    }
    result
}
