//! Utility functions for cover file naming, date arithmetic, and file system
//! operations.
//!
//! This module provides helper functions used throughout the application:
//! - Cover file-stem construction and validation
//! - Inclusive date-range and whole-year iteration
//! - File system validation for output directories

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fs as stdfs;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Matches a well-formed cover stem: `{Newspaper}_{YYYY-MM-DD}`.
static COVER_STEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z]+)_(\d{4}-\d{2}-\d{2})$").unwrap()
});

/// Build the file stem for a crawled cover.
///
/// The stem is `{newspaper}_{date}` with the date in ISO `YYYY-MM-DD` form,
/// e.g. `Abola_2019-01-03`. Both the crawler (writing) and the dataset
/// loader (filtering) go through this format.
///
/// # Arguments
///
/// * `newspaper` - The newspaper display name, e.g. `"Abola"`
/// * `date` - The cover's publication date
///
/// # Returns
///
/// The file stem without an extension.
///
/// # Examples
///
/// ```ignore
/// let date = NaiveDate::from_ymd_opt(2019, 1, 3).unwrap();
/// assert_eq!(cover_stem("Abola", date), "Abola_2019-01-03");
/// ```
pub fn cover_stem(newspaper: &str, date: NaiveDate) -> String {
    format!("{}_{}", newspaper, date)
}

/// Parse a cover file stem back into its newspaper name and date.
///
/// The inverse of [`cover_stem`]. Stems that do not match the
/// `{Newspaper}_{YYYY-MM-DD}` shape (stray files, editor backups) yield
/// `None`, which the dataset loader uses to filter directory listings.
///
/// # Arguments
///
/// * `stem` - The file stem, without extension
///
/// # Returns
///
/// The newspaper name as written in the stem, and the parsed date.
pub fn parse_cover_stem(stem: &str) -> Option<(String, NaiveDate)> {
    let caps = COVER_STEM_RE.captures(stem)?;
    let newspaper = caps.get(1)?.as_str().to_string();
    let date = NaiveDate::parse_from_str(caps.get(2)?.as_str(), "%Y-%m-%d").ok()?;
    Some((newspaper, date))
}

/// All dates from `start` through `end`, inclusive.
///
/// # Arguments
///
/// * `start` - First date of the range
/// * `end` - Last date of the range
///
/// # Returns
///
/// The dates in ascending order; empty when `start > end`.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Every calendar day of a year, in order (365 or 366 entries).
///
/// # Arguments
///
/// * `year` - The calendar year
///
/// # Returns
///
/// The full list of days, or an error for years outside chrono's range.
pub fn year_days(year: i32) -> Result<Vec<NaiveDate>, Box<dyn Error>> {
    let first = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| format!("year out of range: {year}"))?;
    Ok(first.iter_days().take_while(|d| d.year() == year).collect())
}

/// Ensure a directory exists and is writable.
///
/// This function creates the directory if it doesn't exist, then performs
/// a write test by creating and immediately deleting a probe file.
///
/// # Arguments
///
/// * `path` - The directory path to validate
///
/// # Returns
///
/// `Ok(())` if the directory exists and is writable, or an error describing
/// the failure.
///
/// # Errors
///
/// Returns an error if:
/// - The directory cannot be created
/// - The directory is not writable (permission denied, read-only filesystem, etc.)
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Err(e) = fs::create_dir_all(path).await {
        return Err(Box::new(e));
    }
    // Try a small sync write using std fs (simpler error surface)
    let probe_path = path.join("..__probe_write__");
    match stdfs::File::create(&probe_path) {
        Ok(_) => {
            let _ = stdfs::remove_file(&probe_path);
            info!("Output directory is writable");
            Ok(())
        }
        Err(e) => Err(Box::new(e)),
    }
}
