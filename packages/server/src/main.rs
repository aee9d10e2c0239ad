#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ride map dashboard server binary.
//!
//! Configured through environment variables; see
//! [`ride_map_server::DashboardConfig`].

use ride_map_server::{DashboardConfig, run_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = DashboardConfig::from_env();
    run_server(config).await.map_err(|e| {
        log::error!("Dashboard failed: {e}");
        std::io::Error::other(e)
    })
}
