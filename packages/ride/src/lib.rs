#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ride bookings dataset loading and summaries.
//!
//! Reads the bookings CSV into [`RideRecord`](ride_map_ride_models::RideRecord)
//! values once at startup and computes the per-category counts the
//! dashboard charts are drawn from.

pub mod loader;
pub mod summary;

pub use loader::{load_rides, load_rides_from_reader};
pub use summary::{RideSummary, summarize};

use thiserror::Error;

/// Errors that can occur while loading the rides dataset.
#[derive(Debug, Error)]
pub enum RideError {
    /// The dataset file could not be opened or read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row had a value that could not be converted.
    #[error("Invalid value on line {line}: {message}")]
    InvalidRow {
        /// One-based line number in the file, counting the header.
        line: u64,
        /// Description of what went wrong.
        message: String,
    },
}
