//! Per-category ride counts for the dashboard charts.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use ride_map_ride_models::{BookingStatus, RideRecord, VehicleType};

/// Aggregate counts over a filtered ride set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RideSummary {
    /// Number of rides.
    pub total: u64,
    /// Sum of known booking values.
    pub total_booking_value: f64,
    /// Rides per vehicle type.
    pub by_vehicle_type: BTreeMap<VehicleType, u64>,
    /// Rides per booking outcome.
    pub by_status: BTreeMap<BookingStatus, u64>,
    /// Rides per booking date.
    pub daily: BTreeMap<NaiveDate, u64>,
}

/// Computes a [`RideSummary`] in a single pass.
#[must_use]
pub fn summarize<'a, I>(rides: I) -> RideSummary
where
    I: IntoIterator<Item = &'a RideRecord>,
{
    let mut summary = RideSummary::default();

    for ride in rides {
        summary.total += 1;
        summary.total_booking_value += ride.booking_value.unwrap_or(0.0);
        *summary.by_vehicle_type.entry(ride.vehicle_type).or_default() += 1;
        *summary.by_status.entry(ride.status).or_default() += 1;
        *summary.daily.entry(ride.date).or_default() += 1;
    }

    summary
}
