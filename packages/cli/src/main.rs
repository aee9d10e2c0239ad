#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the ride map toolchain.
//!
//! Renders a single flow map to disk, prints the flow table as JSON, or
//! starts the dashboard server. Inputs default to the same environment
//! variables the server reads; flags override them.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use ride_map_ride_models::{RideFilter, VehicleType};
use ride_map_server::{Dashboard, DashboardConfig};
use ride_map_server_models::ApiFlowEdge;

#[derive(Parser)]
#[command(name = "ride_map", about = "Ride flow map toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one flow map to a PNG (or HTML) file
    Render {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        filter: FilterArgs,
        /// Output file
        #[arg(long, default_value = "flow_map.png")]
        out: PathBuf,
        /// Write the embeddable HTML fragment instead of the raw PNG
        #[arg(long)]
        html: bool,
    },
    /// Print the district flows as JSON
    Flows {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Start the dashboard server
    Serve {
        #[command(flatten)]
        data: DataArgs,
        /// Listen address
        #[arg(long)]
        bind: Option<String>,
        /// Listen port
        #[arg(long)]
        port: Option<u16>,
    },
}

#[derive(Args)]
struct DataArgs {
    /// Bookings CSV
    #[arg(long)]
    rides: Option<PathBuf>,
    /// District boundaries (`.shp` or `.geojson`)
    #[arg(long)]
    boundaries: Option<PathBuf>,
    /// Region to keep from the boundary file
    #[arg(long)]
    region: Option<String>,
    /// Replacement location table (TOML)
    #[arg(long)]
    location_table: Option<PathBuf>,
    /// Flow map style (TOML)
    #[arg(long)]
    style: Option<PathBuf>,
}

impl DataArgs {
    fn into_config(self) -> DashboardConfig {
        let mut config = DashboardConfig::from_env();
        if let Some(rides) = self.rides {
            config.rides_csv = rides;
        }
        if let Some(boundaries) = self.boundaries {
            config.boundaries.path = boundaries;
        }
        if let Some(region) = self.region {
            config.boundaries.region = region;
        }
        if self.location_table.is_some() {
            config.location_table = self.location_table;
        }
        if self.style.is_some() {
            config.style_path = self.style;
        }
        config
    }
}

#[derive(Args)]
struct FilterArgs {
    /// First booking date included (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last booking date included (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
    /// Vehicle type to include; repeat for several, omit for all
    #[arg(long = "vehicle")]
    vehicles: Vec<VehicleType>,
}

impl From<FilterArgs> for RideFilter {
    fn from(args: FilterArgs) -> Self {
        let defaults = Self::default();
        Self {
            from: args.from.unwrap_or(defaults.from),
            to: args.to.unwrap_or(defaults.to),
            vehicle_types: args.vehicles,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            data,
            filter,
            out,
            html,
        } => {
            let dashboard = Dashboard::load(&data.into_config())?;
            let filter = RideFilter::from(filter);
            if html {
                std::fs::write(&out, dashboard.render_html(&filter)?)?;
            } else {
                std::fs::write(&out, dashboard.render_png(&filter)?)?;
            }
            log::info!("Flow map written to {}", out.display());
        }
        Commands::Flows { data, filter } => {
            let dashboard = Dashboard::load(&data.into_config())?;
            let filter = RideFilter::from(filter);
            let flows = dashboard.flows(&filter);
            let widths = dashboard.style().widths.widths(&flows);
            let edges: Vec<ApiFlowEdge> = flows
                .edges()
                .iter()
                .zip(widths)
                .map(|(edge, width)| ApiFlowEdge::new(edge, width))
                .collect();
            println!("{}", serde_json::to_string_pretty(&edges)?);
        }
        Commands::Serve { data, bind, port } => {
            let mut config = data.into_config();
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(port) = port {
                config.port = port;
            }
            actix_web::rt::System::new().block_on(ride_map_server::run_server(config))?;
        }
    }

    Ok(())
}
