use anyhow::Context;
use clap::Parser;
use forecast_companion::data::TableLoader;
use forecast_companion::telemetry::init_tracing;
use forecast_companion::{CompanionConfig, Credentials, Pipeline, RunRequest};
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "forecast-companion")]
#[command(about = "Forecast a time series, narrate it and build a slide deck")]
struct Cli {
    /// CSV file with a header row
    input: PathBuf,

    /// Date column (defaults to the first column)
    #[arg(long)]
    date_column: Option<String>,

    /// Value column (defaults to the second column)
    #[arg(long)]
    value_column: Option<String>,

    /// Number of future periods to forecast
    #[arg(long)]
    horizon: Option<usize>,

    /// Where to write the slide deck
    #[arg(long, short, default_value = "forecast_narrative.pptx")]
    output: PathBuf,

    /// TOML configuration file
    #[arg(long, env = "FORECAST_COMPANION_CONFIG")]
    config: Option<PathBuf>,

    /// Also write the forecast table as CSV
    #[arg(long)]
    forecast_csv: Option<PathBuf>,

    /// Narrative provider API key
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    init_tracing();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = match &cli.config {
        Some(path) => CompanionConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => CompanionConfig::default(),
    };
    let horizon = cli.horizon.unwrap_or(config.default_horizon);

    let table = TableLoader::from_csv(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let (date_column, value_column) = match (cli.date_column, cli.value_column) {
        (Some(date), Some(value)) => (date, value),
        (date, value) => {
            let (first, second) = TableLoader::default_columns(&table)?;
            (date.unwrap_or(first), value.unwrap_or(second))
        }
    };

    let pipeline = Pipeline::from_config(config).context("building narrative client")?;
    let credentials = Credentials::new(cli.api_key.unwrap_or_default());
    info!(input = %cli.input.display(), %date_column, %value_column, horizon, "starting run");

    let request = RunRequest::new(table, date_column, value_column, horizon, credentials);
    let bundle = match pipeline.run(request) {
        Ok(bundle) => bundle,
        Err(failure) => {
            eprintln!("Stage {} failed ({}): {}", failure.stage, failure.kind(), failure.error);
            if let Some(forecast) = &failure.forecast {
                eprintln!("Forecast was computed ({} rows) before the failure", forecast.len());
                if let Some(path) = &cli.forecast_csv {
                    forecast.write_csv(File::create(path)?)?;
                    eprintln!("Forecast written to {}", path.display());
                }
            }
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Some(path) = &cli.forecast_csv {
        bundle
            .forecast
            .write_csv(File::create(path)?)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    for line in bundle.insights.iter() {
        println!("{line}");
    }

    bundle
        .write_document(&cli.output)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    println!("Saved {}", cli.output.display());

    Ok(ExitCode::SUCCESS)
}
