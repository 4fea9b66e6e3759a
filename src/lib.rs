/// Intros - finds new-member introductions in a Slack channel and drafts welcome messages.
///
/// Each run searches the configured channel for messages posted inside a date window,
/// keeps the ones that read like self-introductions, pulls out the poster's name and
/// LinkedIn profile, and writes a Markdown report with one drafted welcome per person.
///
/// # Architecture
///
/// The system uses:
/// - slack-morphism and reqwest for Slack Web API access
/// - regex for intro and LinkedIn detection
/// - Tokio deadlines to time-box every profile lookup
/// - tracing for structured logs
///
/// # Example
///
/// ```no_run
/// use intros::core::config::AppConfig;
/// use intros::modes::{RunOutcome, select_strategy};
/// use intros::report::{WindowArgs, latest_report_date, resolve_window};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     intros::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let latest = latest_report_date(
///         &config.output_dir,
///         &config.filename_template,
///         &config.date_format,
///     )?;
///     let window = resolve_window(WindowArgs::default(), latest, chrono::Utc::now())?;
///
///     let strategy = select_strategy(&config).await?;
///     match strategy.execute(&window).await? {
///         RunOutcome::Report(summary) => println!("{} intro(s)", summary.intro_count),
///         RunOutcome::RequestWritten { instructions, .. } => println!("{instructions}"),
///     }
///
///     Ok(())
/// }
/// ```
// Module declarations
pub mod core;
pub mod errors;
pub mod intro;
pub mod modes;
pub mod pipeline;
pub mod report;
pub mod slack;
pub mod utils;

pub use errors::IntroError;

/// Configure structured logging with JSON format on stderr.
///
/// Verbosity comes from `RUST_LOG` and defaults to `info`. Calling this more than
/// once keeps the first subscriber.
///
/// # Example
///
/// ```
/// // Initialize structured logging once at startup
/// intros::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
