//! Monthly highlight-rate trend and the `month_view.png` render.
//!
//! For each newspaper, every cover's highlighted set is one-hot expanded
//! into per-club indicators and averaged by calendar month: the value for
//! (club, month) is the fraction of that month's covers that highlighted
//! the club. The render shows the three newspapers side by side with one
//! dashed, circle-marked line per tracked club in the club's fixed color;
//! the catch-all "other" class is tabulated but not plotted.

use crate::catalog::{Club, Newspaper, PT_MONTH_LABELS};
use crate::models::CoverRecord;
use chrono::Datelike;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

const PANEL_WIDTH: u32 = 500;
const PANEL_HEIGHT: u32 = 500;

/// Fraction of covers highlighting `club`, by calendar month.
///
/// Months with no covers are absent from the result; months present carry
/// `hits / total` over that month's records. The result is sorted by month.
pub fn monthly_highlight_rates(records: &[&CoverRecord], club: Club) -> Vec<(u32, f64)> {
    let id = club.label().id();
    let mut by_month: BTreeMap<u32, (usize, usize)> = BTreeMap::new();
    for record in records {
        let entry = by_month.entry(record.date.month()).or_insert((0, 0));
        entry.0 += 1;
        if record.highlights(id) {
            entry.1 += 1;
        }
    }
    by_month
        .into_iter()
        .map(|(month, (total, hits))| (month, hits as f64 / total as f64))
        .collect()
}

/// Render `month_view.png`: three side-by-side monthly trend panels.
#[instrument(level = "info", skip_all, fields(path = %out_path.display()))]
pub fn render_month_view(covers: &[CoverRecord], out_path: &Path) -> Result<(), Box<dyn Error>> {
    let root =
        BitMapBackend::new(out_path, (PANEL_WIDTH * 3, PANEL_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 3));

    for (idx, (panel, newspaper)) in panels.iter().zip(Newspaper::ALL).enumerate() {
        let records: Vec<&CoverRecord> = covers
            .iter()
            .filter(|r| r.newspaper == newspaper.table_key())
            .collect();

        let mut chart = ChartBuilder::on(panel)
            .caption(newspaper.name(), ("sans-serif", 18))
            .margin(10)
            .x_label_area_size(28)
            .y_label_area_size(48)
            .build_cartesian_2d(0i32..13i32, 0f64..1f64)?;

        let y_desc = if idx == 0 {
            "Percentagem de capas com destaque"
        } else {
            ""
        };
        chart
            .configure_mesh()
            .x_labels(14)
            .x_label_formatter(&|x| {
                if (1..=12).contains(x) {
                    PT_MONTH_LABELS[(*x - 1) as usize].to_string()
                } else {
                    String::new()
                }
            })
            .y_label_formatter(&|y| format!("{:.0}%", y * 100.0))
            .y_desc(y_desc)
            .draw()?;

        for club in Club::WITH_GAMES {
            let (r, g, b) = club.color();
            let color = RGBColor(r, g, b);
            let points: Vec<(i32, f64)> = monthly_highlight_rates(&records, club)
                .into_iter()
                .map(|(month, rate)| (month as i32, rate))
                .collect();
            chart.draw_series(DashedLineSeries::new(
                points.iter().copied(),
                5,
                3,
                color.stroke_width(2),
            ))?;
            chart.draw_series(
                points
                    .iter()
                    .map(|(month, rate)| Circle::new((*month, *rate), 4, color.filled())),
            )?;
        }
    }

    root.present()?;
    info!("Wrote month view");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(date: &str, newspaper: &str, highlighted: Vec<u8>) -> CoverRecord {
        CoverRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            newspaper: newspaper.to_string(),
            highlighted,
        }
    }

    #[test]
    fn test_monthly_rates_are_per_month_means() {
        let records = vec![
            record("2019-01-05", "abola", vec![1]),
            record("2019-01-20", "abola", vec![2]),
            record("2019-03-01", "abola", vec![1, 2]),
        ];
        let refs: Vec<&CoverRecord> = records.iter().collect();

        let benfica = monthly_highlight_rates(&refs, Club::Benfica);
        assert_eq!(benfica.len(), 2);
        assert_eq!(benfica[0].0, 1);
        assert!((benfica[0].1 - 0.5).abs() < f64::EPSILON);
        assert_eq!(benfica[1].0, 3);
        assert!((benfica[1].1 - 1.0).abs() < f64::EPSILON);

        let porto = monthly_highlight_rates(&refs, Club::Porto);
        assert!((porto[0].1 - 0.5).abs() < f64::EPSILON);
        assert!((porto[1].1 - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_months_without_covers_are_absent() {
        let records = vec![record("2019-06-01", "ojogo", vec![3])];
        let refs: Vec<&CoverRecord> = records.iter().collect();
        let sporting = monthly_highlight_rates(&refs, Club::Sporting);
        assert_eq!(sporting, vec![(6, 1.0)]);
    }

    #[test]
    fn test_empty_records_have_no_months() {
        assert!(monthly_highlight_rates(&[], Club::Benfica).is_empty());
    }

    #[test]
    #[ignore = "draws text labels, so it needs a system font"]
    fn test_render_month_view_writes_png() {
        let covers = vec![
            record("2019-01-05", "abola", vec![1]),
            record("2019-02-05", "abola", vec![1, 2]),
            record("2019-01-10", "record", vec![2]),
        ];
        let path = std::env::temp_dir().join(format!("capa_bias_month_{}.png", std::process::id()));
        render_month_view(&covers, &path).unwrap();
        let meta = std::fs::metadata(&path).unwrap();
        assert!(meta.len() > 0);
        std::fs::remove_file(&path).unwrap();
    }
}
