//! Server configuration from environment variables.

use std::path::PathBuf;

use ride_map_district::BoundarySource;

/// Default bookings dataset path.
pub const DEFAULT_RIDES_CSV: &str = "ncr_ride_bookings.csv";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8050;

/// Everything the dashboard needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Bookings CSV (`RIDES_CSV`).
    pub rides_csv: PathBuf,
    /// District boundaries (`BOUNDARIES_PATH`, `REGION`).
    pub boundaries: BoundarySource,
    /// Replacement location table (`LOCATION_TABLE`); the built-in table
    /// is used when unset.
    pub location_table: Option<PathBuf>,
    /// Flow map style TOML (`FLOW_MAP_STYLE`).
    pub style_path: Option<PathBuf>,
    /// Listen address (`BIND_ADDR`).
    pub bind_addr: String,
    /// Listen port (`PORT`).
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            rides_csv: PathBuf::from(DEFAULT_RIDES_CSV),
            boundaries: BoundarySource::default(),
            location_table: None,
            style_path: None,
            bind_addr: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl DashboardConfig {
    /// Reads the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, falling back to the
    /// defaults for unset or empty variables. An unparseable `PORT` is
    /// logged and ignored.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = get("PORT").map_or(defaults.port, |p| {
            p.trim().parse().unwrap_or_else(|_| {
                log::warn!("Ignoring invalid PORT '{p}', using {}", defaults.port);
                defaults.port
            })
        });

        let mut boundaries = defaults.boundaries;
        if let Some(path) = get("BOUNDARIES_PATH") {
            boundaries.path = PathBuf::from(path);
        }
        if let Some(region) = get("REGION") {
            boundaries.region = region;
        }

        Self {
            rides_csv: get("RIDES_CSV").map_or(defaults.rides_csv, PathBuf::from),
            boundaries,
            location_table: get("LOCATION_TABLE").map(PathBuf::from),
            style_path: get("FLOW_MAP_STYLE").map(PathBuf::from),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            port,
        }
    }
}
