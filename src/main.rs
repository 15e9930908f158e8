//! # Capa Bias
//!
//! A crawling and analysis pipeline for club-favoritism bias on the front
//! covers of the Portuguese sports dailies (A Bola, Record, O Jogo). Covers
//! come from the SAPO 24 newspaper kiosk; club highlights come from manual
//! bounding-box annotations; match results come from a CSV feed. The reports
//! show which club each cover highlighted across a year and whether
//! highlights track the club's wins.
//!
//! ## Features
//!
//! - Crawls daily cover images from the SAPO 24 kiosk (all three dailies)
//! - Pairs covers with VOC-style XML annotations into a dataset
//! - Derives per-cover highlighted clubs from bounding-box areas
//! - Renders a categorical year calendar and monthly trend charts
//! - Correlates next-day cover highlights with wins and non-wins
//!
//! ## Usage
//!
//! ```sh
//! capa_bias crawl --out ./data/covers
//! capa_bias analyze --data-dir ./data --out-dir .
//! ```
//!
//! ## Architecture
//!
//! The application follows a pipeline architecture:
//! 1. **Crawling**: Download cover pages and images (parallel, 5 at a time)
//! 2. **Tables**: Build or reload the cached covers/games tables
//! 3. **Reports**: Render `calendar_view.png` and `month_view.png`, print
//!    the day-after analysis

use clap::Parser;
use std::error::Error;
use tracing::{error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod catalog;
mod cli;
mod dataset;
mod models;
mod outputs;
mod scrapers;
mod tables;
mod utils;

use cli::{AnalyzeArgs, Cli, Command, CrawlArgs};
use outputs::{calendar, day_after, monthly};
use scrapers::sapo;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("capa_bias starting up");

    let args = Cli::parse();
    match args.command {
        Command::Crawl(crawl_args) => run_crawl(crawl_args).await?,
        Command::Analyze(analyze_args) => run_analyze(analyze_args).await?,
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Run the `crawl` subcommand: download covers for the selected newspapers.
#[instrument(level = "info", skip_all)]
async fn run_crawl(args: CrawlArgs) -> Result<(), Box<dyn Error>> {
    if args.start > args.end {
        error!(start = %args.start, end = %args.end, "Crawl range start is later than end");
        return Err(format!("start {} is later than end {}", args.start, args.end).into());
    }

    // Early check: ensure the cover output dir is writable
    if let Err(e) = ensure_writable_dir(&args.out).await {
        error!(
            path = %args.out.display(),
            error = %e,
            "Cover output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let newspapers = args.newspapers();
    info!(
        newspapers = newspapers.len(),
        start = %args.start,
        end = %args.end,
        resolution = ?args.resolution,
        "Starting cover crawl"
    );

    let mut saved = 0usize;
    let mut skipped = 0usize;
    for newspaper in newspapers {
        let summary =
            sapo::crawl_covers(newspaper, args.start, args.end, args.resolution, &args.out).await;
        saved += summary.saved;
        skipped += summary.skipped;
    }

    info!(saved, skipped, "Cover crawl completed");
    Ok(())
}

/// Run the `analyze` subcommand: tables, chart renders, day-after report.
#[instrument(level = "info", skip_all)]
async fn run_analyze(args: AnalyzeArgs) -> Result<(), Box<dyn Error>> {
    // Early check: ensure the report output dir is writable
    if let Err(e) = ensure_writable_dir(&args.out_dir).await {
        error!(
            path = %args.out_dir.display(),
            error = %e,
            "Report output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let covers = tables::covers_table(&args.data_dir)?;
    info!(rows = covers.len(), "Covers table ready");
    let games = tables::games_table(&args.data_dir, args.year)?;
    info!(rows = games.len(), "Games table ready");

    info!("Creating calendar plot");
    calendar::render_calendar_view(&covers, args.year, &args.out_dir.join("calendar_view.png"))?;

    info!("Creating month plot");
    monthly::render_month_view(&covers, &args.out_dir.join("month_view.png"))?;

    info!("Next day analysis");
    day_after::print_day_after_report(&covers, &games);

    Ok(())
}
