//! Day-after win/non-win correlation report.
//!
//! For every newspaper and tracked club, the club's matches are split into
//! wins and non-wins, each match date is shifted forward one day, and the
//! shifted dates are matched against the dates on which that newspaper's
//! cover highlighted the club. The report prints, per (newspaper, club),
//! the bucket totals, the highlighted percentages, and the explicit date
//! lists of all four buckets for manual inspection.

use crate::catalog::{Club, Newspaper};
use crate::models::{CoverRecord, GameRecord};
use chrono::{Duration, NaiveDate};
use itertools::Itertools;
use std::collections::BTreeSet;

/// Match outcome from one club's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The club's side scored strictly more than the opponent.
    Win,
    /// Draws and losses: the club's side scored no more than the opponent.
    NonWin,
}

/// One outcome bucket of the day-after analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeBreakdown {
    /// Number of matches with this outcome.
    pub total: usize,
    /// Day-after dates on which the newspaper highlighted the club.
    pub highlighted: Vec<NaiveDate>,
    /// Day-after dates with no highlighting cover (including days with no
    /// cover at all).
    pub unhighlighted: Vec<NaiveDate>,
}

impl OutcomeBreakdown {
    /// Fraction of this bucket's matches followed by a highlighting cover.
    ///
    /// Computed in floating point with no empty-bucket guard: a bucket with
    /// zero matches yields NaN, and the report prints it as such. Callers
    /// that need a number must feed non-empty data.
    pub fn pct_highlighted(&self) -> f64 {
        self.highlighted.len() as f64 / self.total as f64
    }
}

/// The day-after analysis of one (newspaper, club) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayAfterReport {
    pub newspaper: Newspaper,
    pub club: Club,
    pub wins: OutcomeBreakdown,
    pub non_wins: OutcomeBreakdown,
}

/// Dates of the club's matches with the given outcome, in table order.
///
/// A match counts for the club from either the home or the away
/// perspective; matches not involving the club are ignored.
pub fn club_outcome_dates(games: &[GameRecord], club: Club, outcome: Outcome) -> Vec<NaiveDate> {
    let name = club.name();
    games
        .iter()
        .filter(|game| {
            let (scored, conceded) = if game.home_team == name {
                (game.home_score, game.away_score)
            } else if game.away_team == name {
                (game.away_score, game.home_score)
            } else {
                return false;
            };
            match outcome {
                Outcome::Win => scored > conceded,
                Outcome::NonWin => scored <= conceded,
            }
        })
        .map(|game| game.date)
        .collect()
}

/// Run the day-after analysis for one (newspaper, club) pair.
///
/// Every match date is shifted forward one day and looked up among the
/// dates on which `newspaper`'s cover highlighted `club`. Within each
/// outcome bucket, `highlighted` and `unhighlighted` partition the shifted
/// dates, so their lengths always sum to `total`.
pub fn analyze_newspaper_club(
    covers: &[CoverRecord],
    games: &[GameRecord],
    newspaper: Newspaper,
    club: Club,
) -> DayAfterReport {
    let id = club.label().id();
    let key = newspaper.table_key();
    let highlight_dates: BTreeSet<NaiveDate> = covers
        .iter()
        .filter(|r| r.newspaper == key && r.highlights(id))
        .map(|r| r.date)
        .collect();

    let breakdown = |outcome: Outcome| {
        let mut highlighted = Vec::new();
        let mut unhighlighted = Vec::new();
        for date in club_outcome_dates(games, club, outcome) {
            let after = date + Duration::days(1);
            if highlight_dates.contains(&after) {
                highlighted.push(after);
            } else {
                unhighlighted.push(after);
            }
        }
        OutcomeBreakdown {
            total: highlighted.len() + unhighlighted.len(),
            highlighted,
            unhighlighted,
        }
    };

    DayAfterReport {
        newspaper,
        club,
        wins: breakdown(Outcome::Win),
        non_wins: breakdown(Outcome::NonWin),
    }
}

/// Print the full day-after report to stdout.
///
/// One block per newspaper, one section per tracked club. Percentages are
/// rendered with no decimals; empty buckets print NaN.
pub fn print_day_after_report(covers: &[CoverRecord], games: &[GameRecord]) {
    for newspaper in Newspaper::ALL {
        println!("=======");
        for club in Club::WITH_GAMES {
            let report = analyze_newspaper_club(covers, games, newspaper, club);
            println!();
            println!(
                "Analysis {} - {}",
                report.newspaper.table_key(),
                report.club.name()
            );
            println!("Number of wins: {}", report.wins.total);
            println!("Number of non_wins: {}", report.non_wins.total);
            println!(
                "Pct highlighted wins: {:.0}%",
                report.wins.pct_highlighted() * 100.0
            );
            println!(
                "Pct highlighted non wins: {:.0}%",
                report.non_wins.pct_highlighted() * 100.0
            );
            println!("Highlighted wins: {}", format_dates(&report.wins.highlighted));
            println!(
                "Highlighted non_wins: {}",
                format_dates(&report.non_wins.highlighted)
            );
            println!(
                "Unhighlighted wins: {}",
                format_dates(&report.wins.unhighlighted)
            );
            println!(
                "Unhighlighted non_wins: {}",
                format_dates(&report.non_wins.unhighlighted)
            );
        }
    }
}

fn format_dates(dates: &[NaiveDate]) -> String {
    format!("[{}]", dates.iter().join(", "))
}
