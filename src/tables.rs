//! Tabular transform layer: covers table, games table, and their JSON caches.
//!
//! Both tables are plain row vectors. The covers table is derived from the
//! labeled-cover dataset; the games table from the match-results CSV feed.
//! Building the covers table means re-reading every annotation file, so both
//! tables are cached as JSON under the data directory:
//!
//! - `covers_table.json`
//! - `games_table.json`
//!
//! Cache invalidation is presence-based only: if the file exists it is
//! loaded as-is, regardless of age or of the flags the current run was
//! given. Delete the file to force a rebuild.

use crate::dataset::CoversDataset;
use crate::models::{CoverAnnotation, CoverRecord, GameRecord};
use chrono::Datelike;
use itertools::Itertools;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

/// Relative tolerance of the "highlighted" area band.
///
/// An object counts as highlighted when its area is within this fraction of
/// the cover's largest object area.
pub const MAX_AREA_TOL: f64 = 0.3;

/// Covers-table cache file name, relative to the data directory.
pub const COVERS_CACHE: &str = "covers_table.json";

/// Games-table cache file name, relative to the data directory.
pub const GAMES_CACHE: &str = "games_table.json";

/// Match-results feed file name, relative to the data directory.
pub const GAMES_CSV: &str = "games_data.csv";

/// The highlighted label ids of one annotated cover.
///
/// Highlighted means within the [`MAX_AREA_TOL`] band of the cover's max
/// object area: `|area - max_area| <= MAX_AREA_TOL * max_area`, bounds
/// inclusive. The result is sorted and deduplicated; it is empty only when
/// the annotation has no objects at all, since the max-area object is
/// always within its own band.
pub fn highlighted_ids(annotation: &CoverAnnotation) -> Vec<u8> {
    let Some(max_area) = annotation.max_area() else {
        return Vec::new();
    };
    let tol = MAX_AREA_TOL * max_area as f64;
    annotation
        .objects
        .iter()
        .filter(|o| (max_area as f64 - o.area as f64).abs() <= tol)
        .map(|o| o.label.id())
        .sorted_unstable()
        .dedup()
        .collect()
}

/// Build the covers table from a dataset.
///
/// Covers annotated with zero objects are skipped: some newspapers do not
/// publish on holidays, and those days carry an empty annotation. Every
/// emitted record therefore has a non-empty highlighted set. The newspaper
/// column is the lower-cased stem name.
#[instrument(level = "info", skip_all)]
pub fn build_covers_table(dataset: &CoversDataset) -> Result<Vec<CoverRecord>, Box<dyn Error>> {
    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for item in dataset.iter() {
        let item = item?;
        let highlighted = highlighted_ids(&item.annotation);
        if highlighted.is_empty() {
            skipped += 1;
            continue;
        }
        rows.push(CoverRecord {
            date: item.date,
            newspaper: item.newspaper.to_lowercase(),
            highlighted,
        });
    }
    info!(rows = rows.len(), skipped, "Built covers table");
    Ok(rows)
}

/// Build the games table from the match-results CSV feed.
///
/// The feed has headers `date,home_team,away_team,home_score,away_score`
/// with ISO dates. Rows outside `year` are dropped, then exact-duplicate
/// rows are removed, keeping first-seen order.
#[instrument(level = "info", skip_all, fields(path = %csv_path.display(), year = year))]
pub fn build_games_table(csv_path: &Path, year: i32) -> Result<Vec<GameRecord>, Box<dyn Error>> {
    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut rows = Vec::new();
    for record in reader.deserialize::<GameRecord>() {
        let record = record?;
        if record.date.year() != year {
            continue;
        }
        rows.push(record);
    }
    let unique: Vec<GameRecord> = rows.into_iter().unique().collect();
    info!(rows = unique.len(), "Built games table");
    Ok(unique)
}

/// Load a cached table, or build and cache it.
///
/// The cache hit path deserializes the file and returns it verbatim; the
/// miss path runs `build`, writes the result as JSON, and returns it. A
/// reloaded table is row-for-row identical to the build that produced it.
pub fn load_or_build<T, F>(cache_path: &Path, build: F) -> Result<Vec<T>, Box<dyn Error>>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<Vec<T>, Box<dyn Error>>,
{
    if cache_path.exists() {
        let json = fs::read_to_string(cache_path)?;
        let rows: Vec<T> = serde_json::from_str(&json)?;
        info!(path = %cache_path.display(), rows = rows.len(), "Loaded cached table");
        return Ok(rows);
    }
    let rows = build()?;
    fs::write(cache_path, serde_json::to_string(&rows)?)?;
    info!(path = %cache_path.display(), rows = rows.len(), "Cached freshly built table");
    Ok(rows)
}

/// The covers table for a data directory, through the cache.
pub fn covers_table(data_dir: &Path) -> Result<Vec<CoverRecord>, Box<dyn Error>> {
    load_or_build(&data_dir.join(COVERS_CACHE), || {
        let dataset = CoversDataset::open(data_dir)?;
        build_covers_table(&dataset)
    })
}

/// The games table for a data directory and analysis year, through the cache.
pub fn games_table(data_dir: &Path, year: i32) -> Result<Vec<GameRecord>, Box<dyn Error>> {
    load_or_build(&data_dir.join(GAMES_CACHE), || {
        build_games_table(&data_dir.join(GAMES_CSV), year)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LabelClass;
    use crate::models::AnnotatedObject;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn object(label: LabelClass, area: i64) -> AnnotatedObject {
        // Corners chosen so the derived area equals `area` exactly.
        AnnotatedObject {
            label,
            xmin: 0,
            ymin: 0,
            xmax: area,
            ymax: 1,
            area,
        }
    }

    fn annotation(objects: Vec<AnnotatedObject>) -> CoverAnnotation {
        CoverAnnotation {
            width: 1050,
            height: 1305,
            objects,
        }
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("capa_bias_tbl_{tag}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_highlighted_near_tie_keeps_both() {
        let ann = annotation(vec![
            object(LabelClass::Benfica, 1000),
            object(LabelClass::Porto, 990),
        ]);
        assert_eq!(highlighted_ids(&ann), vec![1, 2]);
    }

    #[test]
    fn test_highlighted_band_is_inclusive() {
        // 1000 - 700 == 300 == 0.3 * 1000, exactly on the bound.
        let ann = annotation(vec![
            object(LabelClass::Benfica, 1000),
            object(LabelClass::Sporting, 700),
        ]);
        assert_eq!(highlighted_ids(&ann), vec![1, 3]);
    }

    #[test]
    fn test_highlighted_excludes_outside_band() {
        let ann = annotation(vec![
            object(LabelClass::Benfica, 1000),
            object(LabelClass::Sporting, 699),
        ]);
        assert_eq!(highlighted_ids(&ann), vec![1]);
    }

    #[test]
    fn test_highlighted_sorts_and_dedups() {
        let ann = annotation(vec![
            object(LabelClass::Porto, 950),
            object(LabelClass::Benfica, 1000),
            object(LabelClass::Benfica, 980),
        ]);
        assert_eq!(highlighted_ids(&ann), vec![1, 2]);
    }

    #[test]
    fn test_highlighted_empty_annotation() {
        assert!(highlighted_ids(&annotation(vec![])).is_empty());
    }

    #[test]
    fn test_covers_table_skips_empty_and_lowercases() {
        let root = scratch_dir("covers");
        std::fs::create_dir_all(root.join("covers")).unwrap();
        std::fs::create_dir_all(root.join("labels")).unwrap();
        let labelled = r#"<annotation>
            <size><width>1050</width><height>1305</height></size>
            <object>
                <name>porto</name>
                <bndbox><xmin>0</xmin><ymin>0</ymin><xmax>10</xmax><ymax>10</ymax></bndbox>
            </object>
        </annotation>"#;
        let holiday = r#"<annotation>
            <size><width>1050</width><height>1305</height></size>
        </annotation>"#;
        std::fs::write(root.join("covers/Abola_2019-01-02.jpeg"), b"x").unwrap();
        std::fs::write(root.join("labels/Abola_2019-01-02.xml"), labelled).unwrap();
        std::fs::write(root.join("covers/Abola_2019-01-01.jpeg"), b"x").unwrap();
        std::fs::write(root.join("labels/Abola_2019-01-01.xml"), holiday).unwrap();

        let dataset = CoversDataset::open(&root).unwrap();
        let table = build_covers_table(&dataset).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].newspaper, "abola");
        assert_eq!(table[0].date, NaiveDate::from_ymd_opt(2019, 1, 2).unwrap());
        assert_eq!(table[0].highlighted, vec![2]);
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_games_table_filters_year_and_dedups() {
        let dir = scratch_dir("games");
        let csv_path = dir.join(GAMES_CSV);
        std::fs::write(
            &csv_path,
            "date,home_team,away_team,home_score,away_score\n\
             2019-03-10,Benfica,Porto,2,1\n\
             2018-12-30,Benfica,Porto,1,1\n\
             2019-03-10,Benfica,Porto,2,1\n\
             2019-05-01,Sporting,Benfica,0,0\n",
        )
        .unwrap();
        let table = build_games_table(&csv_path, 2019).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[0].home_team, "Benfica");
        assert_eq!(table[0].home_score, 2);
        assert_eq!(table[1].date, NaiveDate::from_ymd_opt(2019, 5, 1).unwrap());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_cache_roundtrip_is_identical() {
        let dir = scratch_dir("cache_rt");
        let rows = vec![
            CoverRecord {
                date: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap(),
                newspaper: "abola".to_string(),
                highlighted: vec![1, 3],
            },
            CoverRecord {
                date: NaiveDate::from_ymd_opt(2019, 1, 2).unwrap(),
                newspaper: "ojogo".to_string(),
                highlighted: vec![5],
            },
        ];
        let cache = dir.join(COVERS_CACHE);
        let built = load_or_build(&cache, || Ok(rows.clone())).unwrap();
        assert_eq!(built, rows);
        assert!(cache.exists());

        let reloaded: Vec<CoverRecord> =
            load_or_build(&cache, || panic!("cache present, must not rebuild")).unwrap();
        assert_eq!(reloaded, rows);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_cache_presence_short_circuits_even_when_stale() {
        let dir = scratch_dir("cache_stale");
        let cached = vec![GameRecord {
            date: NaiveDate::from_ymd_opt(2019, 3, 10).unwrap(),
            home_team: "Benfica".to_string(),
            away_team: "Porto".to_string(),
            home_score: 2,
            away_score: 1,
        }];
        let cache = dir.join(GAMES_CACHE);
        std::fs::write(&cache, serde_json::to_string(&cached).unwrap()).unwrap();

        let fresh = vec![GameRecord {
            date: NaiveDate::from_ymd_opt(2019, 8, 8).unwrap(),
            home_team: "Sporting".to_string(),
            away_team: "Benfica".to_string(),
            home_score: 0,
            away_score: 3,
        }];
        let loaded = load_or_build(&cache, || Ok(fresh.clone())).unwrap();
        assert_eq!(loaded, cached);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
