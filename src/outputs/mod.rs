//! Report generation modules for the analysis outputs.
//!
//! This module contains submodules responsible for turning the covers and
//! games tables into the final artifacts:
//!
//! # Submodules
//!
//! - [`calendar`]: Year calendar grids with per-day club strips, rendered
//!   as the stacked `calendar_view.png`
//! - [`monthly`]: Monthly highlight-rate trends, rendered as the
//!   side-by-side `month_view.png`
//! - [`day_after`]: Win/non-win day-after correlation, printed to stdout
//!
//! # Output Structure
//!
//! ```text
//! out_dir/
//! ├── calendar_view.png   # 3 stacked panels, one per newspaper
//! └── month_view.png      # 3 side-by-side panels, one per newspaper
//! ```

pub mod calendar;
pub mod day_after;
pub mod monthly;
