//! Cover crawlers for the newspaper kiosks that republish daily front pages.
//!
//! Each crawler follows the same two-phase pattern per day:
//!
//! 1. **Page fetch**: Download the kiosk page for one newspaper/day pair
//! 2. **Image fetch**: Pick the cover image URL out of the page markup and
//!    download the bytes to `{Newspaper}_{date}.jpeg`
//!
//! # Supported Sources
//!
//! | Source | Module | Notes |
//! |--------|--------|-------|
//! | SAPO 24 | [`sapo`] | Portuguese sports dailies: A Bola, Record, O Jogo |
//!
//! # Common Patterns
//!
//! Crawlers use:
//! - Concurrent day fetching with `futures::stream` behind a fixed pool
//! - Graceful error handling (failed days are logged and skipped)
//! - Shared file naming through [`crate::utils::cover_stem`]

pub mod sapo;
