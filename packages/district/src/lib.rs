#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Districts: the unit rides are aggregated by.
//!
//! [`resolver`] maps free-text pickup/drop location names onto district
//! names through a fixed, hand-curated table. [`boundary`] loads the
//! district polygons of the region of interest from a shapefile or
//! `GeoJSON` file and caches each district's centroid.

pub mod boundary;
pub mod resolver;

pub use boundary::{BoundarySource, DistrictPolygon, DistrictSet, load_districts};
pub use resolver::{LocationDistrictMap, TableAsymmetry, UNKNOWN_DISTRICT, normalize_location};

use thiserror::Error;

/// Errors that can occur while loading district data.
#[derive(Debug, Error)]
pub enum DistrictError {
    /// A file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The location table TOML is malformed.
    #[error("Location table error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The shapefile or its attribute table could not be read.
    #[error("Shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    /// The `GeoJSON` file could not be parsed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The boundary file has an extension we cannot read.
    #[error("Unsupported boundary format: {0}")]
    UnsupportedFormat(String),

    /// The boundary file parsed but yielded nothing usable.
    #[error("No districts found: {message}")]
    Empty {
        /// Description of what was filtered out.
        message: String,
    },
}
