//! Data models for covers, annotations, and match results.
//!
//! This module defines the core data structures used throughout the application:
//! - [`CoverAnnotation`] / [`AnnotatedObject`]: A cover's labelled bounding
//!   boxes, parsed from the VOC-style XML files the labelling tool emits
//! - [`CoverRecord`]: One row of the covers table (date, newspaper,
//!   highlighted club ids)
//! - [`GameRecord`]: One row of the games table (a single match result)
//!
//! The table records derive `Serialize`/`Deserialize` because both tables are
//! cached to JSON between runs; dates round-trip as `YYYY-MM-DD` strings via
//! chrono's serde support.

use crate::catalog::LabelClass;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;

/// Raw `<size>` element of an annotation file.
#[derive(Debug, Deserialize)]
struct VocSize {
    width: u32,
    height: u32,
}

/// Raw `<bndbox>` element of an annotation object.
#[derive(Debug, Deserialize)]
struct VocBox {
    xmin: i64,
    ymin: i64,
    xmax: i64,
    ymax: i64,
}

/// Raw `<object>` element of an annotation file.
#[derive(Debug, Deserialize)]
struct VocObject {
    name: String,
    bndbox: VocBox,
}

/// Raw `<annotation>` document root. Fields the analysis never reads
/// (`folder`, `filename`, `segmented`, per-object `pose`/`truncated`/...)
/// are ignored by serde.
#[derive(Debug, Deserialize)]
struct VocAnnotation {
    size: VocSize,
    #[serde(rename = "object", default)]
    objects: Vec<VocObject>,
}

/// A single labelled bounding box on a cover.
///
/// # Fields
///
/// * `label` - The resolved label class of the box
/// * `xmin`/`ymin`/`xmax`/`ymax` - Pixel corners, as written by the labeller
/// * `area` - Derived box area, `(xmax - xmin) * (ymax - ymin)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedObject {
    /// The resolved label class of the box.
    pub label: LabelClass,
    /// Left edge in pixels.
    pub xmin: i64,
    /// Top edge in pixels.
    pub ymin: i64,
    /// Right edge in pixels.
    pub xmax: i64,
    /// Bottom edge in pixels.
    pub ymax: i64,
    /// Box area in square pixels, derived from the corners.
    pub area: i64,
}

/// The parsed annotation of one cover image.
///
/// Cover dimensions come from the annotation metadata, never from decoding
/// the image bytes; the analysis treats the XML as the source of truth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverAnnotation {
    /// Cover width in pixels, from the annotation's `<size>` element.
    pub width: u32,
    /// Cover height in pixels, from the annotation's `<size>` element.
    pub height: u32,
    /// All labelled boxes on the cover. Empty for non-publication days
    /// that were annotated with no objects.
    pub objects: Vec<AnnotatedObject>,
}

impl CoverAnnotation {
    /// Parse a VOC-style annotation document.
    ///
    /// Object names resolve case-insensitively against [`LabelClass`]; a
    /// name outside the catalog is a data-integrity error, not a skippable
    /// object.
    ///
    /// # Arguments
    ///
    /// * `xml` - The full annotation document text
    ///
    /// # Returns
    ///
    /// The parsed annotation, or an error if the document is malformed or
    /// names an unknown label class.
    pub fn from_xml(xml: &str) -> Result<CoverAnnotation, Box<dyn Error>> {
        let raw: VocAnnotation = quick_xml::de::from_str(xml)?;
        let mut objects = Vec::with_capacity(raw.objects.len());
        for obj in raw.objects {
            let label = LabelClass::from_name(&obj.name)
                .ok_or_else(|| format!("unknown label class in annotation: {:?}", obj.name))?;
            let b = obj.bndbox;
            objects.push(AnnotatedObject {
                label,
                xmin: b.xmin,
                ymin: b.ymin,
                xmax: b.xmax,
                ymax: b.ymax,
                area: (b.xmax - b.xmin) * (b.ymax - b.ymin),
            });
        }
        Ok(CoverAnnotation {
            width: raw.size.width,
            height: raw.size.height,
            objects,
        })
    }

    /// The largest box area on the cover, or `None` when there are no boxes.
    pub fn max_area(&self) -> Option<i64> {
        self.objects.iter().map(|o| o.area).max()
    }
}

/// One row of the covers table: which clubs a cover highlighted on a date.
///
/// Only covers with at least one annotated object produce a record, so
/// `highlighted` is never empty in a built table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverRecord {
    /// Publication date of the cover.
    pub date: NaiveDate,
    /// Lower-cased newspaper key ("abola", "record", "ojogo").
    pub newspaper: String,
    /// Sorted, deduplicated label ids of the highlighted clubs.
    pub highlighted: Vec<u8>,
}

impl CoverRecord {
    /// Whether this cover highlighted the club with the given label id.
    pub fn highlights(&self, label_id: u8) -> bool {
        self.highlighted.contains(&label_id)
    }
}

/// One row of the games table: a single match result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameRecord {
    /// Match date.
    pub date: NaiveDate,
    /// Home side, catalog display name ("Benfica", "Porto", "Sporting").
    pub home_team: String,
    /// Away side, catalog display name.
    pub away_team: String,
    /// Goals scored by the home side.
    pub home_score: u32,
    /// Goals scored by the away side.
    pub away_score: u32,
}
