#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the ride map dashboard.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the domain types to allow independent evolution of the API
//! contract.

use chrono::NaiveDate;
use ride_map_flow::FlowEdge;
use ride_map_ride::RideSummary;
use ride_map_ride_models::{RideFilter, VehicleType};
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Query parameters shared by the flow, summary and map endpoints.
///
/// Missing dates fall back to the default window. `vehicleTypes` is a
/// comma-separated list of vehicle type names; missing or empty selects
/// every type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowMapQueryParams {
    /// First booking date included (`YYYY-MM-DD`).
    pub from: Option<NaiveDate>,
    /// Last booking date included (`YYYY-MM-DD`).
    pub to: Option<NaiveDate>,
    /// Comma-separated vehicle type names.
    pub vehicle_types: Option<String>,
}

impl FlowMapQueryParams {
    /// Builds the ride filter these parameters describe.
    ///
    /// # Errors
    ///
    /// Returns the offending name if a vehicle type is not recognised.
    pub fn to_filter(&self) -> Result<RideFilter, String> {
        let defaults = RideFilter::default();
        let vehicle_types = self
            .vehicle_types
            .as_deref()
            .map(parse_vehicle_types)
            .transpose()?
            .unwrap_or_default();

        Ok(RideFilter {
            from: self.from.unwrap_or(defaults.from),
            to: self.to.unwrap_or(defaults.to),
            vehicle_types,
        })
    }
}

/// Parses a comma-separated vehicle type list, ignoring blank entries.
///
/// # Errors
///
/// Returns the first name that is not a known vehicle type.
pub fn parse_vehicle_types(s: &str) -> Result<Vec<VehicleType>, String> {
    s.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| name.parse().map_err(|_| name.to_string()))
        .collect()
}

/// A vehicle type option for the dashboard checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiVehicleType {
    /// Display label.
    pub label: String,
    /// Value to send back in `vehicleTypes`.
    pub value: String,
}

impl From<VehicleType> for ApiVehicleType {
    fn from(vehicle_type: VehicleType) -> Self {
        Self {
            label: vehicle_type.to_string(),
            value: vehicle_type.to_string(),
        }
    }
}

/// One flow line as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiFlowEdge {
    /// Pickup district.
    pub origin: String,
    /// Drop district.
    pub destination: String,
    /// Number of rides.
    pub volume: u64,
    /// Line width in points.
    pub width: f64,
    /// Origin centroid as `[x, y]` in the boundary file's coordinates.
    pub start: [f64; 2],
    /// Destination centroid as `[x, y]`.
    pub end: [f64; 2],
}

impl ApiFlowEdge {
    /// Converts a flow edge with its computed width.
    #[must_use]
    pub fn new(edge: &FlowEdge, width: f64) -> Self {
        Self {
            origin: edge.origin.clone(),
            destination: edge.destination.clone(),
            volume: edge.volume,
            width,
            start: [edge.geometry.start.x, edge.geometry.start.y],
            end: [edge.geometry.end.x, edge.geometry.end.y],
        }
    }
}

/// Count for one category value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCategoryCount {
    /// Category value.
    pub name: String,
    /// Number of rides.
    pub count: u64,
}

/// Count for one booking date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiDailyCount {
    /// Booking date.
    pub date: NaiveDate,
    /// Number of rides.
    pub count: u64,
}

/// Chart data for the filtered ride set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiSummary {
    /// Number of rides.
    pub total: u64,
    /// Sum of known booking values.
    pub total_booking_value: f64,
    /// Rides per vehicle type.
    pub by_vehicle_type: Vec<ApiCategoryCount>,
    /// Rides per booking outcome.
    pub by_status: Vec<ApiCategoryCount>,
    /// Rides per day, in date order.
    pub daily: Vec<ApiDailyCount>,
}

impl From<RideSummary> for ApiSummary {
    fn from(summary: RideSummary) -> Self {
        Self {
            total: summary.total,
            total_booking_value: summary.total_booking_value,
            by_vehicle_type: summary
                .by_vehicle_type
                .into_iter()
                .map(|(vehicle_type, count)| ApiCategoryCount {
                    name: vehicle_type.to_string(),
                    count,
                })
                .collect(),
            by_status: summary
                .by_status
                .into_iter()
                .map(|(status, count)| ApiCategoryCount {
                    name: status.to_string(),
                    count,
                })
                .collect(),
            daily: summary
                .daily
                .into_iter()
                .map(|(date, count)| ApiDailyCount { date, count })
                .collect(),
        }
    }
}
