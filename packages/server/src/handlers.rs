//! HTTP handler functions for the ride map dashboard.

use actix_web::{HttpResponse, web};
use ride_map_ride_models::{RideFilter, VehicleType};
use ride_map_server_models::{
    ApiFlowEdge, ApiHealth, ApiSummary, ApiVehicleType, FlowMapQueryParams,
};

use crate::AppState;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/vehicle-types`
///
/// Returns the vehicle type options for the filter checklist.
pub async fn vehicle_types() -> HttpResponse {
    let options: Vec<ApiVehicleType> = VehicleType::all()
        .iter()
        .copied()
        .map(ApiVehicleType::from)
        .collect();
    HttpResponse::Ok().json(options)
}

/// `GET /api/summary`
///
/// Chart counts for the filtered rides.
pub async fn summary(
    state: web::Data<AppState>,
    params: web::Query<FlowMapQueryParams>,
) -> HttpResponse {
    let filter = match parse_filter(&params) {
        Ok(filter) => filter,
        Err(response) => return response,
    };
    HttpResponse::Ok().json(ApiSummary::from(state.dashboard.summary(&filter)))
}

/// `GET /api/flows`
///
/// District-to-district flows for the filtered rides, with line widths.
pub async fn flows(
    state: web::Data<AppState>,
    params: web::Query<FlowMapQueryParams>,
) -> HttpResponse {
    let filter = match parse_filter(&params) {
        Ok(filter) => filter,
        Err(response) => return response,
    };

    let flows = state.dashboard.flows(&filter);
    let widths = state.dashboard.style().widths.widths(&flows);
    let edges: Vec<ApiFlowEdge> = flows
        .edges()
        .iter()
        .zip(widths)
        .map(|(edge, width)| ApiFlowEdge::new(edge, width))
        .collect();
    HttpResponse::Ok().json(edges)
}

/// `GET /flow-map.png`
pub async fn flow_map_png(
    state: web::Data<AppState>,
    params: web::Query<FlowMapQueryParams>,
) -> HttpResponse {
    let filter = match parse_filter(&params) {
        Ok(filter) => filter,
        Err(response) => return response,
    };

    match state.dashboard.render_png(&filter) {
        Ok(png) => HttpResponse::Ok().content_type("image/png").body(png),
        Err(e) => {
            log::error!("Failed to render flow map: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to render flow map"
            }))
        }
    }
}

/// `GET /flow-map`
///
/// The flow map as an HTML fragment suitable for an iframe.
pub async fn flow_map_html(
    state: web::Data<AppState>,
    params: web::Query<FlowMapQueryParams>,
) -> HttpResponse {
    let filter = match parse_filter(&params) {
        Ok(filter) => filter,
        Err(response) => return response,
    };

    match state.dashboard.render_html(&filter) {
        Ok(html) => HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(html),
        Err(e) => {
            log::error!("Failed to render flow map: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to render flow map"
            }))
        }
    }
}

/// Converts query parameters into a filter, or a `400` naming the
/// unknown vehicle type.
fn parse_filter(params: &FlowMapQueryParams) -> Result<RideFilter, HttpResponse> {
    params.to_filter().map_err(|name| {
        log::debug!("Rejecting unknown vehicle type '{name}'");
        HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("Unknown vehicle type: {name}")
        }))
    })
}
