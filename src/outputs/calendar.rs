//! Categorical calendar grid and the stacked `calendar_view.png` render.
//!
//! One panel shows a whole year as a calmap-style grid: weekday rows by
//! ISO-week columns, one cell per day. Each date may carry several club
//! labels at once, so a cell is subdivided into vertical strips, one color
//! per label. To keep every cell the same width regardless of how many
//! labels it holds, all cells are cut into `L` strips where `L` is the
//! least common multiple of every label-set size seen in the year; a day
//! with `k` labels paints each label over `L / k` contiguous strips.
//!
//! The grid construction ([`build_calendar_grid`]) is pure and fully
//! testable; [`render_calendar_view`] draws one grid per newspaper, stacked
//! vertically, with per-club cover-share legends.

use crate::catalog::{Club, Newspaper, PT_DAY_LABELS, PT_MONTH_LABELS};
use crate::models::CoverRecord;
use crate::utils::year_days;
use chrono::{Datelike, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

/// Edge length of one day cell, in pixels.
const DAY_PX: i32 = 14;
/// Grid origin inside a panel, leaving room for weekday labels and a title.
const GRID_LEFT: i32 = 50;
const GRID_TOP: i32 = 30;
/// Panel canvas size; three panels are stacked into the final image.
const PANEL_WIDTH: u32 = 850;
const PANEL_HEIGHT: u32 = 190;
/// Background of cells that are real dates of the year ("whitesmoke").
const FILL_COLOR: RGBColor = RGBColor(245, 245, 245);
/// Strip color of label ids outside the tracked-club palette.
const NON_CLUB_COLOR: RGBColor = RGBColor(128, 128, 128);
/// Width of the white gridlines between day cells.
const GRIDLINE_PX: u32 = 2;

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 { a } else { gcd(b, a % b) }
}

fn lcm(a: usize, b: usize) -> usize {
    a / gcd(a, b) * b
}

/// A year of label sets laid out as an expanded strip matrix.
///
/// The matrix has `7 * subdivision` rows and `columns * subdivision`
/// columns; each day cell is a `subdivision x subdivision` block. `cells`
/// holds the label id painted at each position (`None` is masked: either
/// no data for that day, or a grid slot outside the year). `fill` is true
/// exactly on the blocks of real dates of the year, whether or not they
/// carry data.
#[derive(Debug, Clone)]
pub struct CalendarGrid {
    /// The calendar year this grid covers.
    pub year: i32,
    /// Strip count `L` per day cell.
    pub subdivision: usize,
    /// Number of week columns before expansion.
    pub columns: usize,
    /// Expanded label matrix, `(7 * L) x (columns * L)`.
    pub cells: Vec<Vec<Option<u8>>>,
    /// Expanded background mask, same dimensions as `cells`.
    pub fill: Vec<Vec<bool>>,
    /// Unexpanded column of each month's 15th day, for month tick placement.
    pub month_columns: [usize; 12],
}

/// Build the strip matrix for one year of a date-to-labels series.
///
/// Dates outside `year` are ignored; days of the year absent from the
/// series (or present with an empty set) become masked, filled cells.
/// Label sets are consumed in the order given; callers keep them sorted so
/// strip order is deterministic.
///
/// Week columns follow the ISO week number of each day, with the year
/// boundary renumbered: some days belong to the previous year's last ISO
/// week or the next year's first. Those get new week numbers (0, and max
/// plus one) so the ordering stays intact and week/day pairs stay unique.
///
/// The subdivision factor is the LCM of the distinct set sizes observed,
/// counting dataless days as size one. Sets of coprime sizes inflate it
/// multiplicatively; that is inherent to the layout, which trades cell
/// resolution for exact proportional strips.
pub fn build_calendar_grid(
    series: &BTreeMap<NaiveDate, Vec<u8>>,
    year: i32,
) -> Result<CalendarGrid, Box<dyn Error>> {
    let days = year_days(year)?;

    let mut weeks: Vec<u32> = days.iter().map(|d| d.iso_week().week()).collect();
    for (i, day) in days.iter().enumerate() {
        if day.month() == 1 && weeks[i] > 50 {
            weeks[i] = 0;
        }
    }
    let max_week = *weeks.iter().max().ok_or("empty year")?;
    for (i, day) in days.iter().enumerate() {
        if day.month() == 12 && weeks[i] < 10 {
            weeks[i] = max_week + 1;
        }
    }
    let min_week = *weeks.iter().min().ok_or("empty year")?;
    let columns = (*weeks.iter().max().ok_or("empty year")? - min_week + 1) as usize;

    let mut subdivision: usize = 1;
    for day in &days {
        let size = series.get(day).map(|s| s.len()).unwrap_or(1).max(1);
        subdivision = lcm(subdivision, size);
    }

    let mut cells = vec![vec![None; columns * subdivision]; 7 * subdivision];
    let mut fill = vec![vec![false; columns * subdivision]; 7 * subdivision];
    for (i, day) in days.iter().enumerate() {
        let row = day.weekday().num_days_from_monday() as usize;
        let col = (weeks[i] - min_week) as usize;
        let set = series.get(day).filter(|s| !s.is_empty());
        for block_row in 0..subdivision {
            for strip in 0..subdivision {
                let er = row * subdivision + block_row;
                let ec = col * subdivision + strip;
                fill[er][ec] = true;
                if let Some(set) = set {
                    cells[er][ec] = Some(set[strip / (subdivision / set.len())]);
                }
            }
        }
    }

    let first = *days.first().ok_or("empty year")?;
    let mut month_columns = [0usize; 12];
    for month in 1..=12u32 {
        let fifteenth = NaiveDate::from_ymd_opt(year, month, 15)
            .ok_or_else(|| format!("invalid month {month} in year {year}"))?;
        let idx = (fifteenth - first).num_days() as usize;
        month_columns[(month - 1) as usize] = (weeks[idx] - min_week) as usize;
    }

    Ok(CalendarGrid {
        year,
        subdivision,
        columns,
        cells,
        fill,
        month_columns,
    })
}

/// Per-club share of covers that highlighted the club, in report order.
///
/// The share is `covers highlighting the club / total covers`; with no
/// covers at all the ratio is NaN, which the legend prints as-is.
pub fn club_shares(records: &[&CoverRecord]) -> [(Club, f64); 4] {
    let total = records.len() as f64;
    Club::ALL.map(|club| {
        let count = records
            .iter()
            .filter(|r| r.highlights(club.label().id()))
            .count();
        (club, count as f64 / total)
    })
}

/// Render `calendar_view.png`: one calendar panel per newspaper, stacked.
///
/// Panel order is the catalog's newspaper order. Each panel is titled with
/// the newspaper name and carries a four-swatch legend of club cover
/// shares.
#[instrument(level = "info", skip_all, fields(year = year, path = %out_path.display()))]
pub fn render_calendar_view(
    covers: &[CoverRecord],
    year: i32,
    out_path: &Path,
) -> Result<(), Box<dyn Error>> {
    let root =
        BitMapBackend::new(out_path, (PANEL_WIDTH, PANEL_HEIGHT * 3)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((3, 1));

    for (panel, newspaper) in panels.iter().zip(Newspaper::ALL) {
        let records: Vec<&CoverRecord> = covers
            .iter()
            .filter(|r| r.newspaper == newspaper.table_key())
            .collect();
        let series: BTreeMap<NaiveDate, Vec<u8>> = records
            .iter()
            .map(|r| (r.date, r.highlighted.clone()))
            .collect();
        let grid = build_calendar_grid(&series, year)?;
        let shares = club_shares(&records);
        draw_calendar_panel(panel, &grid, newspaper.name(), &shares)?;
    }

    root.present()?;
    info!("Wrote calendar view");
    Ok(())
}

/// Strip color for a painted label id: tracked clubs use their catalog
/// colors, every other label class (an ad as the largest box, say) paints
/// the same gray as the catch-all club.
fn overlay_color(id: u8) -> RGBColor {
    match Club::from_label_id(id) {
        Some(club) => {
            let (r, g, b) = club.color();
            RGBColor(r, g, b)
        }
        None => NON_CLUB_COLOR,
    }
}

/// Draw one newspaper's calendar panel onto its drawing area.
fn draw_calendar_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    grid: &CalendarGrid,
    title: &str,
    shares: &[(Club, f64); 4],
) -> Result<(), Box<dyn Error>> {
    let title_style = TextStyle::from(("sans-serif", 16).into_font())
        .pos(Pos::new(HPos::Center, VPos::Top));
    area.draw(&Text::new(
        title.to_string(),
        ((PANEL_WIDTH / 2) as i32, 6),
        title_style,
    ))?;

    let l = grid.subdivision;
    let strip_px = DAY_PX as f64 / l as f64;
    for (er, row) in grid.cells.iter().enumerate() {
        for (ec, cell) in row.iter().enumerate() {
            let x0 = GRID_LEFT + (ec as f64 * strip_px).round() as i32;
            let x1 = GRID_LEFT + ((ec + 1) as f64 * strip_px).round() as i32;
            let y0 = GRID_TOP + (er as f64 * strip_px).round() as i32;
            let y1 = GRID_TOP + ((er + 1) as f64 * strip_px).round() as i32;
            if grid.fill[er][ec] {
                area.draw(&Rectangle::new([(x0, y0), (x1, y1)], FILL_COLOR.filled()))?;
            }
            if let Some(id) = cell {
                area.draw(&Rectangle::new(
                    [(x0, y0), (x1, y1)],
                    overlay_color(*id).filled(),
                ))?;
            }
        }
    }

    // Interior gridlines between day cells, on top of the strips.
    let grid_right = GRID_LEFT + grid.columns as i32 * DAY_PX;
    let grid_bottom = GRID_TOP + 7 * DAY_PX;
    let line_style = WHITE.stroke_width(GRIDLINE_PX);
    for c in 1..grid.columns as i32 {
        let x = GRID_LEFT + c * DAY_PX;
        area.draw(&PathElement::new(vec![(x, GRID_TOP), (x, grid_bottom)], line_style))?;
    }
    for r in 1..7 {
        let y = GRID_TOP + r * DAY_PX;
        area.draw(&PathElement::new(vec![(GRID_LEFT, y), (grid_right, y)], line_style))?;
    }

    let day_style = TextStyle::from(("sans-serif", 12).into_font())
        .pos(Pos::new(HPos::Right, VPos::Center));
    for (r, label) in PT_DAY_LABELS.iter().enumerate() {
        let y = GRID_TOP + r as i32 * DAY_PX + DAY_PX / 2;
        area.draw(&Text::new(label.to_string(), (GRID_LEFT - 6, y), day_style.clone()))?;
    }

    let month_style = TextStyle::from(("sans-serif", 12).into_font())
        .pos(Pos::new(HPos::Center, VPos::Top));
    for (m, label) in PT_MONTH_LABELS.iter().enumerate() {
        let x = GRID_LEFT + grid.month_columns[m] as i32 * DAY_PX + DAY_PX / 2;
        area.draw(&Text::new(
            label.to_string(),
            (x, grid_bottom + 4),
            month_style.clone(),
        ))?;
    }

    let legend_style = TextStyle::from(("sans-serif", 12).into_font())
        .pos(Pos::new(HPos::Left, VPos::Center));
    let item_width = 110;
    let legend_y = grid_bottom + 26;
    let mut x = (PANEL_WIDTH as i32 - item_width * shares.len() as i32) / 2;
    for (club, share) in shares {
        let (r, g, b) = club.color();
        area.draw(&Rectangle::new(
            [(x, legend_y - 6), (x + 12, legend_y + 6)],
            RGBColor(r, g, b).filled(),
        ))?;
        area.draw(&Text::new(
            format!("{} {:.1}%", club.name(), share * 100.0),
            (x + 16, legend_y),
            legend_style.clone(),
        ))?;
        x += item_width;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_lcm_helpers() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(lcm(1, 1), 1);
        assert_eq!(lcm(2, 3), 6);
        assert_eq!(lcm(6, 4), 12);
    }

    #[test]
    fn test_trailing_next_year_week_gets_renumbered() {
        // 2019 ends with Dec 30/31 in ISO week 1 of 2020; they move to a
        // fresh last column instead of wrapping to the first.
        let grid = build_calendar_grid(&BTreeMap::new(), 2019).unwrap();
        assert_eq!(grid.year, 2019);
        assert_eq!(grid.subdivision, 1);
        assert_eq!(grid.columns, 53);
        // Dec 30 is a Monday, Dec 31 a Tuesday, both in the last column.
        assert!(grid.fill[0][52]);
        assert!(grid.fill[1][52]);
        // The rest of that week is not part of 2019.
        assert!(!grid.fill[2][52]);
        assert!(!grid.fill[6][52]);
        // Jan 1 is a Tuesday in the first column.
        assert!(grid.fill[1][0]);
        assert!(!grid.fill[0][0]);
    }

    #[test]
    fn test_leading_previous_year_week_gets_renumbered() {
        // 2016 opens with Jan 1-3 in ISO week 53 of 2015; they move to a
        // fresh column 0 ahead of week 1.
        let grid = build_calendar_grid(&BTreeMap::new(), 2016).unwrap();
        assert_eq!(grid.columns, 53);
        // Jan 1 2016 is a Friday in column 0.
        assert!(grid.fill[4][0]);
        assert!(!grid.fill[0][0]);
        // Jan 4 is the Monday of ISO week 1, one column over.
        assert!(grid.fill[0][1]);
    }

    #[test]
    fn test_subdivision_is_lcm_of_set_sizes() {
        let mut series = BTreeMap::new();
        series.insert(date(2019, 1, 1), vec![1, 2]);
        series.insert(date(2019, 1, 2), vec![1, 2, 3]);
        let grid = build_calendar_grid(&series, 2019).unwrap();
        assert_eq!(grid.subdivision, 6);
        assert_eq!(grid.cells.len(), 7 * 6);
        assert_eq!(grid.cells[0].len(), 53 * 6);
    }

    #[test]
    fn test_strip_expansion_is_proportional() {
        let mut series = BTreeMap::new();
        series.insert(date(2019, 1, 1), vec![1, 2]);
        series.insert(date(2019, 1, 2), vec![1, 2, 3]);
        let grid = build_calendar_grid(&series, 2019).unwrap();
        let l = grid.subdivision;

        // Jan 1 (Tuesday, row 1): two labels over six strips.
        let tuesday: Vec<Option<u8>> = grid.cells[l][0..l].to_vec();
        assert_eq!(
            tuesday,
            vec![Some(1), Some(1), Some(1), Some(2), Some(2), Some(2)]
        );
        // All block rows of the day repeat the same strips.
        assert_eq!(grid.cells[2 * l - 1][0..l], tuesday[..]);

        // Jan 2 (Wednesday, row 2): three labels, two strips each.
        let wednesday: Vec<Option<u8>> = grid.cells[2 * l][0..l].to_vec();
        assert_eq!(
            wednesday,
            vec![Some(1), Some(1), Some(2), Some(2), Some(3), Some(3)]
        );
    }

    #[test]
    fn test_days_without_data_are_masked_but_filled() {
        let mut series = BTreeMap::new();
        series.insert(date(2019, 1, 1), vec![1]);
        let grid = build_calendar_grid(&series, 2019).unwrap();
        // Jan 3 (Thursday, row 3) has no record: background only.
        assert!(grid.fill[3][0]);
        assert_eq!(grid.cells[3][0], None);
    }

    #[test]
    fn test_fill_covers_every_day_of_year_exactly() {
        let grid = build_calendar_grid(&BTreeMap::new(), 2019).unwrap();
        let filled: usize = grid
            .fill
            .iter()
            .map(|row| row.iter().filter(|f| **f).count())
            .sum();
        // With subdivision 1 each day is exactly one cell.
        assert_eq!(filled, 365);

        let leap = build_calendar_grid(&BTreeMap::new(), 2020).unwrap();
        let filled: usize = leap
            .fill
            .iter()
            .map(|row| row.iter().filter(|f| **f).count())
            .sum();
        assert_eq!(filled, 366);
    }

    #[test]
    fn test_month_tick_columns_track_the_fifteenth() {
        let grid = build_calendar_grid(&BTreeMap::new(), 2019).unwrap();
        // Jan 15 2019 sits in ISO week 3, i.e. the third column.
        assert_eq!(grid.month_columns[0], 2);
        // Mar 15 in week 11, Dec 15 in week 50.
        assert_eq!(grid.month_columns[2], 10);
        assert_eq!(grid.month_columns[11], 49);
    }

    #[test]
    fn test_club_shares() {
        let records = vec![
            CoverRecord {
                date: date(2019, 1, 1),
                newspaper: "abola".to_string(),
                highlighted: vec![1],
            },
            CoverRecord {
                date: date(2019, 1, 2),
                newspaper: "abola".to_string(),
                highlighted: vec![1, 2],
            },
        ];
        let refs: Vec<&CoverRecord> = records.iter().collect();
        let shares = club_shares(&refs);
        assert_eq!(shares[0].0, Club::Benfica);
        assert!((shares[0].1 - 1.0).abs() < f64::EPSILON);
        assert!((shares[1].1 - 0.5).abs() < f64::EPSILON);
        assert!((shares[3].1 - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overlay_paints_non_club_ids_gray() {
        // A cover whose largest box is an ad reaches the render as a raw
        // label id; it paints the catch-all gray rather than dropping out
        // of the overlay.
        let mut series = BTreeMap::new();
        series.insert(date(2019, 1, 1), vec![4]);
        let grid = build_calendar_grid(&series, 2019).unwrap();
        assert_eq!(grid.cells[1][0], Some(4));

        let rgb = |c: RGBColor| (c.0, c.1, c.2);
        assert_eq!(rgb(overlay_color(4)), (128, 128, 128));
        assert_eq!(rgb(overlay_color(0)), (128, 128, 128));
        assert_eq!(rgb(overlay_color(1)), (255, 0, 0));
        assert_eq!(rgb(overlay_color(2)), (0, 0, 255));
        assert_eq!(rgb(overlay_color(3)), (0, 128, 0));
        assert_eq!(rgb(overlay_color(5)), (128, 128, 128));
    }

    #[test]
    #[ignore = "draws text labels, so it needs a system font"]
    fn test_render_calendar_view_writes_png() {
        let covers = vec![
            CoverRecord {
                date: date(2019, 3, 11),
                newspaper: "abola".to_string(),
                highlighted: vec![1, 3],
            },
            CoverRecord {
                date: date(2019, 3, 12),
                newspaper: "record".to_string(),
                highlighted: vec![2],
            },
        ];
        let path = std::env::temp_dir()
            .join(format!("capa_bias_calendar_{}.png", std::process::id()));
        render_calendar_view(&covers, 2019, &path).unwrap();
        let meta = std::fs::metadata(&path).unwrap();
        assert!(meta.len() > 0);
        std::fs::remove_file(&path).unwrap();
    }
}
