#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the ride map dashboard.
//!
//! Loads the bookings dataset, the district boundaries and the location
//! table once at startup, then serves the filter options, chart
//! summaries, flow tables and rendered flow maps for any date window and
//! vehicle selection. The rendered map is available both as a PNG and as
//! an HTML fragment that embeds it.

pub mod config;
pub mod dashboard;
mod handlers;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use ride_map_district::DistrictError;
use ride_map_render::RenderError;
use ride_map_ride::RideError;

pub use config::DashboardConfig;
pub use dashboard::Dashboard;

/// Errors that can occur while starting the dashboard.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The bookings dataset could not be loaded.
    #[error("Ride data error: {0}")]
    Ride(#[from] RideError),

    /// The location table or the district boundaries could not be loaded.
    #[error("District data error: {0}")]
    District(#[from] DistrictError),

    /// The flow map style is unreadable or unusable.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// The HTTP server failed to bind or run.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// Loaded dashboard data, read-only after startup.
    pub dashboard: Dashboard,
}

/// Registers every dashboard route.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/vehicle-types", web::get().to(handlers::vehicle_types))
            .route("/summary", web::get().to(handlers::summary))
            .route("/flows", web::get().to(handlers::flows)),
    )
    .route("/flow-map.png", web::get().to(handlers::flow_map_png))
    .route("/flow-map", web::get().to(handlers::flow_map_html));
}

/// Loads the dashboard described by `config` and serves it.
///
/// This is a regular async function; the caller provides the runtime
/// (e.g. via `#[actix_web::main]`) and initializes logging.
///
/// # Errors
///
/// Returns [`ServerError`] if loading fails, or if the HTTP server fails
/// to bind or encounters a runtime error.
pub async fn run_server(config: DashboardConfig) -> Result<(), ServerError> {
    log::info!("Loading dashboard data...");
    let dashboard = Dashboard::load(&config)?;
    log::info!(
        "Loaded {} rides across {} districts",
        dashboard.rides().len(),
        dashboard.districts().len()
    );

    serve(dashboard, &config.bind_addr, config.port).await?;
    Ok(())
}

/// Serves an already-loaded dashboard until shutdown.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
pub async fn serve(dashboard: Dashboard, bind_addr: &str, port: u16) -> std::io::Result<()> {
    let state = web::Data::new(AppState { dashboard });

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::{StatusCode, header};
    use actix_web::test;
    use ride_map_server_models::{ApiFlowEdge, ApiHealth, ApiVehicleType};

    macro_rules! app {
        () => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new(AppState {
                        dashboard: dashboard::tests::dashboard(),
                    }))
                    .configure(configure_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn health_reports_version() {
        let app = app!();
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: ApiHealth = test::call_and_read_body_json(&app, req).await;
        assert!(body.healthy);
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn lists_every_vehicle_type() {
        let app = app!();
        let req = test::TestRequest::get().uri("/api/vehicle-types").to_request();
        let body: Vec<ApiVehicleType> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.len(), 7);
        assert_eq!(body[6].value, "Uber XL");
    }

    #[actix_web::test]
    async fn flows_carry_widths() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/flows?from=2024-01-01&to=2024-12-31")
            .to_request();
        let body: Vec<ApiFlowEdge> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.len(), 2);
        assert_eq!((body[0].origin.as_str(), body[0].volume), ("CENTRAL", 1));
        assert!((body[0].width - 0.5).abs() < 1e-12);
        assert_eq!((body[1].origin.as_str(), body[1].volume), ("SOUTH", 2));
        assert!((body[1].width - 8.0).abs() < 1e-12);
    }

    #[actix_web::test]
    async fn vehicle_filter_applies_to_flows() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/flows?vehicleTypes=Go%20Sedan")
            .to_request();
        let body: Vec<ApiFlowEdge> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.len(), 1);
        assert_eq!(body[0].destination, "CENTRAL");
    }

    #[actix_web::test]
    async fn unknown_vehicle_type_is_bad_request() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/flow-map.png?vehicleTypes=Auto,Rickshaw")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn summary_counts_filtered_rides() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/api/summary?vehicleTypes=Auto")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 2);
        assert_eq!(body["byVehicleType"][0]["name"], "Auto");
    }

    #[actix_web::test]
    async fn serves_png() {
        let app = app!();
        let req = test::TestRequest::get().uri("/flow-map.png").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
        let body = test::read_body(resp).await;
        assert_eq!(&body[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[actix_web::test]
    async fn serves_embeddable_html() {
        let app = app!();
        let req = test::TestRequest::get()
            .uri("/flow-map?from=2030-01-01&to=2030-01-02")
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        let html = std::str::from_utf8(&body).unwrap();
        assert!(html.contains("data:image/png;base64,iVBORw0KGgo"));
    }
}
