//! CLI entry point: fetch the yearly survey archives and write the trends report.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use survey_trends::{
    config::Settings,
    fetch,
    pipeline,
    process::locate_results_csv,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "survey-trends")]
#[command(about = "Year-over-year charts of Stack Overflow Developer Survey answers", long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct Overrides {
    /// YAML settings file replacing the built-in defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Last survey year to download and report on
    #[arg(long, global = true)]
    max_year: Option<u16>,

    /// First survey year shown in the report
    #[arg(long, global = true)]
    min_year: Option<u16>,

    /// Directory holding one extracted archive per year
    #[arg(long, global = true)]
    cache_dir: Option<String>,

    /// Where to write the HTML report
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Number of categories charted per question
    #[arg(long, global = true)]
    top: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Download and extract survey archives that are not cached yet
    Fetch,
    /// Fetch missing years, then write the HTML report (the default)
    Report,
    /// Print the column names of a cached year's results file
    Columns {
        #[arg(long)]
        year: u16,
    },
}

impl Overrides {
    fn apply(&self, settings: &mut Settings) {
        if let Some(y) = self.max_year {
            settings.max_survey_year = y;
        }
        if let Some(y) = self.min_year {
            settings.min_report_year = y;
        }
        if let Some(dir) = &self.cache_dir {
            settings.cache_dir = dir.clone();
        }
        if let Some(out) = &self.output {
            settings.output_html = out.clone();
        }
        if let Some(n) = self.top {
            settings.top_categories = n;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) load & validate settings ─────────────────────────────────
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.overrides.config.as_deref())?;
    cli.overrides.apply(&mut settings);
    settings.validate()?;
    info!(
        cache_dir = %settings.cache_dir().display(),
        years = ?settings.report_years(),
        "startup"
    );

    // ─── 3) build HTTP client ────────────────────────────────────────
    let client = Client::builder()
        .timeout(Duration::from_secs(600))
        .build()
        .context("building HTTP client")?;

    // ─── 4) run the requested command ────────────────────────────────
    match cli.command.unwrap_or(Commands::Report) {
        Commands::Fetch => {
            let fetched = fetch::download_and_extract_raw_data(&client, &settings).await?;
            info!(years = ?fetched, "fetch finished");
        }
        Commands::Report => {
            let summary = pipeline::run(&client, &settings).await?;
            info!(
                output = %settings.output_html().display(),
                charts = summary.charts,
                rows = summary.rows,
                years = ?summary.report_years,
                "report finished"
            );
        }
        Commands::Columns { year } => {
            let path = locate_results_csv(&settings.year_dir(year), &settings.results_file)?;
            let mut rdr = csv::Reader::from_path(&path)
                .with_context(|| format!("opening {}", path.display()))?;
            let headers = rdr.headers()?.clone();
            println!("{}", serde_json::to_string_pretty(&headers.iter().collect::<Vec<_>>())?);
        }
    }

    Ok(())
}
