use alerter::EmailNotifier;
use anyhow::Context;
use api_client::{MoexClient, RateSource};
use chrono::Local;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::{ConfigPaths, Settings};
use core_types::{CurrencyPair, ReportPeriod};
use engine::{Generation, ReportEngine, ReportJob};
use report::ReportTable;
use std::process::ExitCode;
use std::sync::Arc;

/// The main entry point for the monthly fixing report.
#[tokio::main]
async fn main() -> ExitCode {
    // Secrets such as MAILING__PASSWORD may live in a .env file.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let settings = match configuration::load_settings(&cli.paths.settings) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!(
                "Failed to load configuration from {}: {e}",
                cli.paths.settings.display()
            );
            return ExitCode::FAILURE;
        }
    };

    // Held until exit so buffered file logs are flushed.
    let _log_guard = match configuration::init_tracing(&settings.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match execute(cli, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Report run failed:\n{e:?}");
            ExitCode::FAILURE
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Builds the monthly report of evening clearing currency fixings and emails it.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    paths: ConfigPaths,

    /// Defaults to `run` when omitted.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate last month's report if needed, then email it.
    Run(RunArgs),
    /// Fetch the rates and print the report table without writing or sending anything.
    Preview(PreviewArgs),
}

#[derive(Parser, Default)]
struct RunArgs {
    /// Report month instead of the previous calendar month (format: YYYY-MM).
    #[arg(long)]
    month: Option<ReportPeriod>,

    /// Regenerate even if a current report already exists.
    #[arg(long)]
    force: bool,

    /// Skip email delivery for this run.
    #[arg(long)]
    no_email: bool,
}

#[derive(Parser)]
struct PreviewArgs {
    /// Report month instead of the previous calendar month (format: YYYY-MM).
    #[arg(long)]
    month: Option<ReportPeriod>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn execute(cli: Cli, settings: Settings) -> anyhow::Result<()> {
    let Cli { paths, command } = cli;

    let pairs = settings.report.currency_pairs()?;
    let client =
        MoexClient::new(&settings.provider).context("Failed to build the rate provider client")?;
    let source: Arc<dyn RateSource> = Arc::new(client);

    match command.unwrap_or_else(|| Commands::Run(RunArgs::default())) {
        Commands::Run(args) => handle_run(args, &paths, &settings, pairs, source).await,
        Commands::Preview(args) => handle_preview(args, &settings, pairs, source).await,
    }
}

/// Handles the orchestration of a report run.
async fn handle_run(
    args: RunArgs,
    paths: &ConfigPaths,
    settings: &Settings,
    pairs: [CurrencyPair; 2],
    source: Arc<dyn RateSource>,
) -> anyhow::Result<()> {
    let job = ReportJob {
        period: resolve_period(args.month)?,
        pairs,
        force: args.force,
    };

    let mut engine = ReportEngine::from_settings(settings, source);
    if settings.delivery.enabled && !args.no_email {
        // Loaded up front so a broken mail config fails before any work is done.
        let mail = configuration::load_mail_settings(&paths.mail).with_context(|| {
            format!("Failed to load mailing parameters from {}", paths.mail.display())
        })?;
        engine = engine.with_notifier(EmailNotifier::from_settings(&mail)?);
    }

    let outcome = engine.run(&job).await?;

    let verb = match outcome.generation {
        Generation::Generated(_) => "generated",
        Generation::Reused(_) => "reused",
    };
    tracing::info!(
        period = %job.period,
        path = %outcome.artifact.display(),
        rows = outcome.generation.manifest().rows,
        emailed = outcome.emailed,
        "Report {verb}."
    );
    Ok(())
}

async fn handle_preview(
    args: PreviewArgs,
    settings: &Settings,
    pairs: [CurrencyPair; 2],
    source: Arc<dyn RateSource>,
) -> anyhow::Result<()> {
    let job = ReportJob {
        period: resolve_period(args.month)?,
        pairs,
        force: false,
    };

    let engine = ReportEngine::from_settings(settings, source);
    let table = engine.build_table(&job).await?;

    println!("Report {} ({} rows)", job.period, table.len());
    println!("{}", preview_table(&table));
    Ok(())
}

/// Uses the explicit month if given, otherwise the month before today's local date.
fn resolve_period(month: Option<ReportPeriod>) -> anyhow::Result<ReportPeriod> {
    match month {
        Some(period) => Ok(period),
        None => Ok(ReportPeriod::preceding(Local::now().date_naive())?),
    }
}

/// Lays the report out as a terminal table, with the ratio computed instead of a formula.
fn preview_table(table: &ReportTable) -> Table {
    let mut preview = Table::new();
    preview.load_preset(UTF8_FULL).set_header(table.header().to_vec());

    for row in table.rows() {
        let mut cells = Vec::with_capacity(report::table::COLUMN_COUNT);
        for side in [&row.first, &row.second] {
            match side {
                Some(record) => cells.extend([
                    record.date.format("%d.%m.%Y").to_string(),
                    record.value.to_string(),
                    record.time.format("%H:%M:%S").to_string(),
                ]),
                None => cells.extend(std::iter::repeat_n(String::new(), 3)),
            }
        }
        cells.push(
            row.ratio()
                .map(|ratio| ratio.round_dp(6).normalize().to_string())
                .unwrap_or_default(),
        );
        preview.add_row(cells);
    }

    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use core_types::{RateRecord, RateSeries, RowAlignment};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn series(pair: &str, values: &[Decimal]) -> RateSeries {
        let mut series = RateSeries::new(pair.parse().unwrap());
        for (i, value) in values.iter().enumerate() {
            series.push(RateRecord {
                date: NaiveDate::from_ymd_opt(2026, 9, i as u32 + 1).unwrap(),
                time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
                value: *value,
            });
        }
        series
    }

    #[test]
    fn no_subcommand_means_run_with_defaults() {
        let cli = Cli::try_parse_from(["fixing-report"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.paths.settings.to_str(), Some("config.toml"));
        assert_eq!(cli.paths.mail.to_str(), Some("mailing_params.json"));
    }

    #[test]
    fn run_accepts_month_and_flags() {
        let cli = Cli::try_parse_from([
            "fixing-report",
            "run",
            "--month",
            "2026-09",
            "--force",
            "--no-email",
            "--config",
            "/etc/fixing-report.toml",
        ])
        .unwrap();

        let Some(Commands::Run(args)) = cli.command else {
            panic!("expected the run subcommand");
        };
        assert_eq!(args.month, Some(ReportPeriod::for_month(2026, 9).unwrap()));
        assert!(args.force);
        assert!(args.no_email);
        assert_eq!(cli.paths.settings.to_str(), Some("/etc/fixing-report.toml"));
    }

    #[test]
    fn invalid_month_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["fixing-report", "preview", "--month", "2026-13"]).is_err());
    }

    #[test]
    fn explicit_month_wins_over_the_calendar() {
        let period = ReportPeriod::for_month(2025, 12).unwrap();
        assert_eq!(resolve_period(Some(period)).unwrap(), period);
    }

    #[test]
    fn preview_shows_padding_and_computed_ratio() {
        let table = ReportTable::build(
            &series("USD/RUB", &[dec!(90.5), dec!(91)]),
            &series("JPY/RUB", &[dec!(0.625)]),
            RowAlignment::Positional,
        );

        let rendered = preview_table(&table).to_string();
        assert!(rendered.contains("Результат"));
        assert!(rendered.contains("01.09.2026"));
        assert!(rendered.contains("144.8"));
        assert!(rendered.contains("91"));
    }
}
