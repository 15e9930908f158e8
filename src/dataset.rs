//! Labeled-cover dataset loader.
//!
//! A dataset lives under one root directory with two flat subdirectories:
//!
//! ```text
//! data_dir/
//! ├── covers/
//! │   ├── Abola_2019-01-03.jpeg
//! │   └── ...
//! └── labels/
//!     ├── Abola_2019-01-03.xml
//!     └── ...
//! ```
//!
//! Cover images come from the crawler; annotation files come from a manual
//! labelling pass and share the cover's file stem. Both listings are
//! filtered to well-formed `{Newspaper}_{YYYY-MM-DD}` stems, sorted
//! descending by stem, and paired positionally. The pairing is only sound
//! when the two directories mirror each other, so [`CoversDataset::get`]
//! re-checks stem identity on every access and treats a mismatch as fatal:
//! a half-labelled directory silently shifting pairs would corrupt every
//! downstream statistic.

use crate::models::CoverAnnotation;
use crate::utils::parse_cover_stem;
use chrono::NaiveDate;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// One indexed file with its validated stem parts.
#[derive(Debug, Clone)]
struct Entry {
    stem: String,
    newspaper: String,
    date: NaiveDate,
    path: PathBuf,
}

/// A fully materialized dataset item: image bytes plus parsed annotation.
#[derive(Debug, Clone)]
pub struct LabeledCover {
    /// Newspaper name as written in the file stem, e.g. `"Abola"`.
    pub newspaper: String,
    /// Publication date from the file stem.
    pub date: NaiveDate,
    /// Raw JPEG bytes, never decoded here.
    pub image: Vec<u8>,
    /// The parsed annotation for this cover.
    pub annotation: CoverAnnotation,
}

/// Index over the covers/labels directory pair.
///
/// Construction only lists and validates file names; bytes and XML are read
/// lazily per item through [`CoversDataset::get`].
#[derive(Debug)]
pub struct CoversDataset {
    covers: Vec<Entry>,
    labels: Vec<Entry>,
}

impl CoversDataset {
    /// Index a dataset root.
    ///
    /// Lists `{root}/covers/*.jpeg` and `{root}/labels/*.xml`, keeps only
    /// files whose stems parse as `{Newspaper}_{YYYY-MM-DD}`, and sorts
    /// both listings descending by stem.
    ///
    /// # Arguments
    ///
    /// * `root` - The dataset root containing `covers/` and `labels/`
    ///
    /// # Errors
    ///
    /// Returns an error when either subdirectory is missing or unreadable.
    #[instrument(level = "info", skip_all, fields(root = %root.display()))]
    pub fn open(root: &Path) -> Result<CoversDataset, Box<dyn Error>> {
        let covers = list_entries(&root.join("covers"), "jpeg")?;
        let labels = list_entries(&root.join("labels"), "xml")?;
        info!(
            covers = covers.len(),
            labels = labels.len(),
            "Indexed labeled-cover dataset"
        );
        Ok(CoversDataset { covers, labels })
    }

    /// Number of index positions with both a cover and a label available.
    pub fn len(&self) -> usize {
        self.covers.len().min(self.labels.len())
    }

    /// Whether the dataset holds no complete pairs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load the pair at `idx`: image bytes plus parsed annotation.
    ///
    /// # Errors
    ///
    /// Returns an error when `idx` is out of bounds, when the paired stems
    /// differ (data-integrity violation that aborts the whole run), when
    /// either file cannot be read, or when the annotation fails to parse.
    pub fn get(&self, idx: usize) -> Result<LabeledCover, Box<dyn Error>> {
        let (cover, label) = match (self.covers.get(idx), self.labels.get(idx)) {
            (Some(c), Some(l)) => (c, l),
            _ => return Err(format!("dataset index out of bounds: {idx}").into()),
        };
        if cover.stem != label.stem {
            return Err(format!(
                "cover/label stem mismatch at index {idx}: {:?} vs {:?}",
                cover.stem, label.stem
            )
            .into());
        }
        let image = fs::read(&cover.path)?;
        let xml = fs::read_to_string(&label.path)?;
        let annotation = CoverAnnotation::from_xml(&xml)?;
        Ok(LabeledCover {
            newspaper: cover.newspaper.clone(),
            date: cover.date,
            image,
            annotation,
        })
    }

    /// Load every pair in index order.
    pub fn iter(&self) -> impl Iterator<Item = Result<LabeledCover, Box<dyn Error>>> + '_ {
        (0..self.len()).map(|idx| self.get(idx))
    }
}

/// List `{dir}/*.{ext}` files with parseable stems, sorted descending by stem.
fn list_entries(dir: &Path, ext: &str) -> Result<Vec<Entry>, Box<dyn Error>> {
    let mut entries = Vec::new();
    for dir_entry in fs::read_dir(dir)? {
        let path = dir_entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some(ext) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let Some((newspaper, date)) = parse_cover_stem(stem) else {
            continue;
        };
        entries.push(Entry {
            stem: stem.to_string(),
            newspaper,
            date,
            path,
        });
    }
    entries.sort_by(|a, b| b.stem.cmp(&a.stem));
    Ok(entries)
}
