#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ride booking record types.
//!
//! Defines the canonical [`RideRecord`] loaded from the bookings dataset,
//! the fixed [`VehicleType`] and [`BookingStatus`] category sets, the
//! [`RideFilter`] the dashboard applies on every interaction, and the
//! [`ResolvedRide`] that carries a ride's pickup and drop districts.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Vehicle category a ride was booked with.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum VehicleType {
    /// Auto rickshaw
    #[serde(rename = "Auto")]
    #[strum(serialize = "Auto")]
    Auto,
    /// Motorbike
    #[serde(rename = "Bike")]
    #[strum(serialize = "Bike")]
    Bike,
    /// Electric bike
    #[serde(rename = "eBike")]
    #[strum(serialize = "eBike")]
    EBike,
    /// Compact hatchback
    #[serde(rename = "Go Mini")]
    #[strum(serialize = "Go Mini")]
    GoMini,
    /// Standard sedan
    #[serde(rename = "Go Sedan")]
    #[strum(serialize = "Go Sedan")]
    GoSedan,
    /// Premium sedan
    #[serde(rename = "Premier Sedan")]
    #[strum(serialize = "Premier Sedan")]
    PremierSedan,
    /// Six-seater
    #[serde(rename = "Uber XL")]
    #[strum(serialize = "Uber XL")]
    UberXl,
}

impl VehicleType {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Auto,
            Self::Bike,
            Self::EBike,
            Self::GoMini,
            Self::GoSedan,
            Self::PremierSedan,
            Self::UberXl,
        ]
    }
}

/// Outcome of a booking.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum BookingStatus {
    /// Ride finished normally
    #[serde(rename = "Completed")]
    #[strum(serialize = "Completed")]
    Completed,
    /// Driver cancelled after accepting
    #[serde(rename = "Cancelled by Driver")]
    #[strum(serialize = "Cancelled by Driver")]
    CancelledByDriver,
    /// Customer cancelled before pickup
    #[serde(rename = "Cancelled by Customer")]
    #[strum(serialize = "Cancelled by Customer")]
    CancelledByCustomer,
    /// Ride started but did not reach the drop location
    #[serde(rename = "Incomplete")]
    #[strum(serialize = "Incomplete")]
    Incomplete,
    /// No driver accepted the booking
    #[serde(rename = "No Driver Found")]
    #[strum(serialize = "No Driver Found")]
    NoDriverFound,
}

impl BookingStatus {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Completed,
            Self::CancelledByDriver,
            Self::CancelledByCustomer,
            Self::Incomplete,
            Self::NoDriverFound,
        ]
    }
}

/// One booking from the rides dataset. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideRecord {
    /// Booking date.
    pub date: NaiveDate,
    /// Booking time of day.
    pub time: NaiveTime,
    /// Booking identifier, with any surrounding quotes removed.
    pub booking_id: String,
    /// Booking outcome.
    pub status: BookingStatus,
    /// Customer identifier.
    pub customer_id: String,
    /// Vehicle category.
    pub vehicle_type: VehicleType,
    /// Free-text pickup location name.
    pub pickup_location: String,
    /// Free-text drop location name.
    pub drop_location: String,
    /// Average driver time-to-arrival in minutes.
    pub avg_vtat: Option<f64>,
    /// Average customer time-to-arrival in minutes.
    pub avg_ctat: Option<f64>,
    /// Fare in rupees.
    pub booking_value: Option<f64>,
    /// Distance in kilometres.
    pub ride_distance: Option<f64>,
    /// Rating given to the driver.
    pub driver_rating: Option<f64>,
    /// Rating given to the customer.
    pub customer_rating: Option<f64>,
    /// Payment method, when the ride was paid.
    pub payment_method: Option<String>,
}

/// A ride together with the districts its pickup and drop locations
/// resolved to (or the unknown sentinel).
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRide {
    /// The underlying booking.
    pub record: RideRecord,
    /// District of the pickup location.
    pub pickup_district: String,
    /// District of the drop location.
    pub drop_district: String,
}

/// Start of the dashboard's default date window.
pub const DEFAULT_FROM: (i32, u32, u32) = (2024, 1, 1);

/// End of the dashboard's default date window.
pub const DEFAULT_TO: (i32, u32, u32) = (2024, 12, 31);

/// Filter applied to the ride set before aggregation.
///
/// Date bounds are inclusive. An empty `vehicle_types` list selects every
/// vehicle type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideFilter {
    /// First booking date included.
    pub from: NaiveDate,
    /// Last booking date included.
    pub to: NaiveDate,
    /// Vehicle types included; empty means all.
    pub vehicle_types: Vec<VehicleType>,
}

impl Default for RideFilter {
    fn default() -> Self {
        let (fy, fm, fd) = DEFAULT_FROM;
        let (ty, tm, td) = DEFAULT_TO;
        Self {
            from: NaiveDate::from_ymd_opt(fy, fm, fd).unwrap_or(NaiveDate::MIN),
            to: NaiveDate::from_ymd_opt(ty, tm, td).unwrap_or(NaiveDate::MAX),
            vehicle_types: Vec::new(),
        }
    }
}

impl RideFilter {
    /// Returns whether the ride falls inside the date window and matches
    /// the vehicle selection.
    #[must_use]
    pub fn matches(&self, ride: &RideRecord) -> bool {
        ride.date >= self.from
            && ride.date <= self.to
            && (self.vehicle_types.is_empty() || self.vehicle_types.contains(&ride.vehicle_type))
    }
}
