use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use forecast_core::{
    Config, DayForecast, FetchFailure, ForecastClient, ForecastController, ForecastView,
    RequestBuilder,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Multi-day weather forecast viewer")]
pub struct Cli {
    /// Log internal progress to stderr (RUST_LOG overrides the level).
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeatherMap API key used for forecast requests.
    Configure,

    /// Show the 16-day forecast for a city.
    Show {
        /// City name, e.g. "Boston" or "San Francisco".
        city: String,
    },
}

impl Cli {
    pub fn init_tracing(&self) {
        let default_filter = if self.verbose {
            "forecast_core=debug,forecast_cli=debug"
        } else {
            "warn"
        };

        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city } => show(&city).await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeatherMap API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.set_api_key(api_key);
    config.save()?;

    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );

    Ok(())
}

async fn show(city: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let builder = RequestBuilder::from_config(&config)?;
    let client = ForecastClient::new()?;

    let mut controller = ForecastController::new(builder, client, TerminalView::default());

    if controller.request_fetch(city) {
        controller.process_completion().await;
    }

    if let Some(message) = &controller.view().failure {
        anyhow::bail!("{message}");
    }

    Ok(())
}

/// Renders the forecast list to stdout, one row per day.
#[derive(Debug, Default)]
struct TerminalView {
    failure: Option<String>,
}

impl ForecastView for TerminalView {
    fn on_request_started(&mut self) {
        println!("Fetching forecast...");
    }

    fn on_forecast_ready(&mut self, days: &[DayForecast]) {
        for day in days {
            println!("{}", format_day(day));
        }
    }

    fn on_scroll_to_top(&mut self) {
        // A terminal prints top-down; nothing to scroll.
    }

    fn on_error(&mut self, failure: &FetchFailure) {
        self.failure = Some(failure.to_string());
    }
}

fn format_date(date: DateTime<Utc>) -> String {
    date.format("%a %Y-%m-%d").to_string()
}

fn format_day(day: &DayForecast) -> String {
    let date = day
        .date()
        .map(format_date)
        .unwrap_or_else(|| day.timestamp_seconds.to_string());

    format!(
        "{date}  {:>5.1}°C / {:>5.1}°C  {:>3.0}%  {} ({})",
        day.min_temperature_c,
        day.max_temperature_c,
        day.humidity_percent,
        day.condition_description,
        day.icon_id,
    )
}
