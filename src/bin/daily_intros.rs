use anyhow::{Context, Result, bail};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use intros::core::config::{AppConfig, ExecutionMode};
use intros::modes::{RunOutcome, select_strategy};
use intros::report::{WindowArgs, latest_report_date, resolve_window};
use intros::utils::sanitize::is_valid_date;

/// Scan the intros channel and draft welcome messages for new members.
///
/// With no dates, the window starts the day after the newest existing report
/// and runs until now.
#[derive(Debug, Parser)]
#[command(name = "daily-intros", version)]
struct Cli {
    /// First day to include (YYYY-MM-DD)
    #[arg(value_parser = parse_date)]
    start_date: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(value_parser = parse_date)]
    end_date: Option<NaiveDate>,

    /// Date the report is filed under (YYYY-MM-DD)
    #[arg(value_parser = parse_date)]
    output_date: Option<NaiveDate>,

    /// live: query Slack directly; request: write an extraction request instead
    #[arg(long, value_parser = parse_mode)]
    mode: Option<ExecutionMode>,

    /// Override OUTPUT_DIRECTORY
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    if !is_valid_date(raw) {
        return Err(format!("'{raw}' is not a valid YYYY-MM-DD date"));
    }
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| e.to_string())
}

fn parse_mode(raw: &str) -> Result<ExecutionMode, String> {
    raw.parse().map_err(|e: intros::IntroError| e.to_string())
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::from_env().context("loading configuration")?;
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    if let (Some(start), Some(end)) = (cli.start_date, cli.end_date)
        && end < start
    {
        bail!("end date {end} is before start date {start}");
    }

    let args = WindowArgs {
        start_date: cli.start_date,
        end_date: cli.end_date,
        output_date: cli.output_date,
    };
    let latest = if args.start_date.is_none() {
        latest_report_date(
            &config.output_dir,
            &config.filename_template,
            &config.date_format,
        )
        .context("scanning existing reports")?
    } else {
        None
    };
    let window = resolve_window(args, latest, Utc::now()).context("resolving search window")?;

    let strategy = select_strategy(&config)
        .await
        .context("initializing run")?;

    match strategy
        .execute(&window)
        .await
        .context("daily intro run failed")?
    {
        RunOutcome::Report(summary) => {
            info!(
                intros = summary.intro_count,
                path = %summary.report_path.display(),
                "Report ready"
            );
            println!(
                "Found {} introduction(s); report saved to {}",
                summary.intro_count,
                summary.report_path.display()
            );
        }
        RunOutcome::RequestWritten { path, instructions } => {
            println!("{instructions}");
            println!("Request saved to {}", path.display());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    intros::setup_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!("{e:#}");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
