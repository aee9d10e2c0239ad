//! Bookings CSV loader.
//!
//! The dataset has one row per booking with human-readable headers
//! (`"Booking ID"`, `"Pickup Location"`, ...). Numeric columns use the
//! literal string `null` for missing values and identifiers are wrapped
//! in an extra pair of quotes, so rows are read as strings first and
//! converted field by field.

use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use ride_map_ride_models::{BookingStatus, RideRecord, VehicleType};
use serde::Deserialize;

use crate::RideError;

/// Raw CSV row, before type conversion.
#[derive(Debug, Deserialize)]
struct CsvRideRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Time")]
    time: String,
    #[serde(rename = "Booking ID", default)]
    booking_id: String,
    #[serde(rename = "Booking Status")]
    booking_status: String,
    #[serde(rename = "Customer ID", default)]
    customer_id: String,
    #[serde(rename = "Vehicle Type")]
    vehicle_type: String,
    #[serde(rename = "Pickup Location")]
    pickup_location: String,
    #[serde(rename = "Drop Location")]
    drop_location: String,
    #[serde(rename = "Avg VTAT", default)]
    avg_vtat: Option<String>,
    #[serde(rename = "Avg CTAT", default)]
    avg_ctat: Option<String>,
    #[serde(rename = "Booking Value", default)]
    booking_value: Option<String>,
    #[serde(rename = "Ride Distance", default)]
    ride_distance: Option<String>,
    #[serde(rename = "Driver Ratings", default)]
    driver_rating: Option<String>,
    #[serde(rename = "Customer Rating", default)]
    customer_rating: Option<String>,
    #[serde(rename = "Payment Method", default)]
    payment_method: Option<String>,
}

/// Loads the bookings dataset from a CSV file.
///
/// # Errors
///
/// Returns [`RideError`] if the file cannot be read or any row is
/// malformed. A missing or broken dataset is fatal for the dashboard, so
/// no partial result is returned.
pub fn load_rides(path: &Path) -> Result<Vec<RideRecord>, RideError> {
    log::info!("Loading rides from {}...", path.display());
    let file = std::fs::File::open(path)?;
    let rides = load_rides_from_reader(file)?;
    log::info!("Loaded {} rides from {}", rides.len(), path.display());
    Ok(rides)
}

/// Loads the bookings dataset from any CSV reader.
///
/// # Errors
///
/// Returns [`RideError`] on CSV syntax errors or unconvertible values.
pub fn load_rides_from_reader<R: Read>(reader: R) -> Result<Vec<RideRecord>, RideError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut rides = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, csv::Position::line);
        let row: CsvRideRow = record.deserialize(Some(&headers))?;
        rides.push(convert_row(row, line)?);
    }

    Ok(rides)
}

fn convert_row(row: CsvRideRow, line: u64) -> Result<RideRecord, RideError> {
    let invalid = |message: String| RideError::InvalidRow { line, message };

    let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
        .map_err(|e| invalid(format!("date '{}': {e}", row.date)))?;
    let time = parse_time(&row.time).ok_or_else(|| invalid(format!("time '{}'", row.time)))?;
    let status: BookingStatus = row
        .booking_status
        .parse()
        .map_err(|_| invalid(format!("booking status '{}'", row.booking_status)))?;
    let vehicle_type: VehicleType = row
        .vehicle_type
        .parse()
        .map_err(|_| invalid(format!("vehicle type '{}'", row.vehicle_type)))?;

    Ok(RideRecord {
        date,
        time,
        booking_id: strip_quotes(&row.booking_id),
        status,
        customer_id: strip_quotes(&row.customer_id),
        vehicle_type,
        pickup_location: row.pickup_location,
        drop_location: row.drop_location,
        avg_vtat: parse_optional_f64(row.avg_vtat.as_deref()),
        avg_ctat: parse_optional_f64(row.avg_ctat.as_deref()),
        booking_value: parse_optional_f64(row.booking_value.as_deref()),
        ride_distance: parse_optional_f64(row.ride_distance.as_deref()),
        driver_rating: parse_optional_f64(row.driver_rating.as_deref()),
        customer_rating: parse_optional_f64(row.customer_rating.as_deref()),
        payment_method: row
            .payment_method
            .filter(|s| !is_missing(s))
            .map(|s| s.trim().to_string()),
    })
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

/// Identifiers in the dataset look like `"CNR5884300"` including quotes.
fn strip_quotes(s: &str) -> String {
    s.trim().trim_matches('"').to_string()
}

fn is_missing(s: &str) -> bool {
    let s = s.trim();
    s.is_empty() || s.eq_ignore_ascii_case("null") || s.eq_ignore_ascii_case("nan")
}

/// Parses a numeric cell. Missing markers and garbage both become `None`.
fn parse_optional_f64(s: Option<&str>) -> Option<f64> {
    let s = s?;
    if is_missing(s) {
        return None;
    }
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
