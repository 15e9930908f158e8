//! Command-line interface definitions for the cover-bias pipeline.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! The pipeline has two subcommands: `crawl` downloads cover images from the
//! kiosk, `analyze` builds the tables and produces the bias reports.

use crate::catalog::{Newspaper, Resolution};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments for the cover-bias application.
///
/// # Examples
///
/// ```sh
/// # Crawl all of 2019 for all three newspapers
/// capa_bias crawl --out ./data/covers
///
/// # Crawl one newspaper over a narrower range
/// capa_bias crawl -n record --start 2019-03-01 --end 2019-03-31
///
/// # Build tables and write the reports
/// capa_bias analyze --data-dir ./data --out-dir .
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// The pipeline stages exposed as subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download daily newspaper covers from the SAPO 24 kiosk
    Crawl(CrawlArgs),
    /// Build the covers/games tables and produce the bias reports
    Analyze(AnalyzeArgs),
}

/// Arguments of the `crawl` subcommand.
#[derive(Args, Debug)]
pub struct CrawlArgs {
    /// Output directory for the cover images
    #[arg(short, long, default_value = "./data/covers")]
    pub out: PathBuf,

    /// Newspaper to crawl (abola, record, ojogo); repeat the flag for
    /// several, omit it for all three
    #[arg(short, long, value_parser = parse_newspaper)]
    pub newspaper: Vec<Newspaper>,

    /// First day of the crawl range (YYYY-MM-DD)
    #[arg(long, default_value = "2019-01-01")]
    pub start: NaiveDate,

    /// Last day of the crawl range, inclusive (YYYY-MM-DD)
    #[arg(long, default_value = "2019-12-31")]
    pub end: NaiveDate,

    /// Cover resolution as WxH; one of the kiosk's published sizes
    #[arg(long, default_value = "1050x1305", value_parser = parse_resolution)]
    pub resolution: Resolution,
}

impl CrawlArgs {
    /// The newspapers this run covers: the selected ones, or all three
    /// when the flag was not given.
    pub fn newspapers(&self) -> Vec<Newspaper> {
        if self.newspaper.is_empty() {
            Newspaper::ALL.to_vec()
        } else {
            self.newspaper.clone()
        }
    }
}

/// Arguments of the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Data directory holding covers/, labels/, games_data.csv, and the
    /// table caches
    #[arg(short, long, default_value = "./data")]
    pub data_dir: PathBuf,

    /// Output directory for the rendered PNG reports
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Analysis year
    #[arg(short, long, default_value_t = 2019)]
    pub year: i32,
}

fn parse_newspaper(s: &str) -> Result<Newspaper, String> {
    Newspaper::from_key(s)
        .ok_or_else(|| format!("unknown newspaper {s:?} (expected abola, record, or ojogo)"))
}

fn parse_resolution(s: &str) -> Result<Resolution, String> {
    let (w, h) = s
        .split_once('x')
        .ok_or_else(|| format!("expected WxH, got {s:?}"))?;
    let width: u32 = w.parse().map_err(|_| format!("bad width in {s:?}"))?;
    let height: u32 = h.parse().map_err(|_| format!("bad height in {s:?}"))?;
    Resolution::from_dims(width, height).ok_or_else(|| {
        format!("unsupported resolution {s:?}; known sizes: 320x398, 640x795, 870x1081, 910x1131, 1050x1305")
    })
}
