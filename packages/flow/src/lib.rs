#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Origin-destination flow aggregation.
//!
//! Groups rides by their ordered (pickup district, drop district) pair,
//! counts each pair, drops pairs that touch anything other than a known
//! district, and attaches a straight line between the two district
//! centroids. Flows are recomputed from scratch for every filter and
//! never cached.

pub mod width;

use std::collections::{BTreeMap, BTreeSet};

use geo::Line;
use ride_map_district::DistrictSet;
use ride_map_ride_models::ResolvedRide;

pub use width::WidthScale;

/// Anything with a resolved pickup and drop district.
pub trait DistrictPair {
    /// District the ride started in.
    fn pickup_district(&self) -> &str;
    /// District the ride ended in.
    fn drop_district(&self) -> &str;
}

impl DistrictPair for ResolvedRide {
    fn pickup_district(&self) -> &str {
        &self.pickup_district
    }

    fn drop_district(&self) -> &str {
        &self.drop_district
    }
}

impl<S: AsRef<str>> DistrictPair for (S, S) {
    fn pickup_district(&self) -> &str {
        self.0.as_ref()
    }

    fn drop_district(&self) -> &str {
        self.1.as_ref()
    }
}

impl<T: DistrictPair + ?Sized> DistrictPair for &T {
    fn pickup_district(&self) -> &str {
        (**self).pickup_district()
    }

    fn drop_district(&self) -> &str {
        (**self).drop_district()
    }
}

/// Ride count for one ordered district pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FlowCount {
    /// Pickup district.
    pub origin: String,
    /// Drop district.
    pub destination: String,
    /// Number of rides.
    pub volume: u64,
}

/// A volume-weighted flow line between two district centroids.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEdge {
    /// Pickup district.
    pub origin: String,
    /// Drop district.
    pub destination: String,
    /// Number of rides.
    pub volume: u64,
    /// Straight segment from the origin centroid to the destination
    /// centroid.
    pub geometry: Line<f64>,
}

/// The flows of one render request. May be empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowCollection {
    edges: Vec<FlowEdge>,
}

impl FlowCollection {
    /// The flow edges, ordered by origin then destination.
    #[must_use]
    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    /// Smallest and largest volume, or `None` when there are no flows.
    #[must_use]
    pub fn volume_range(&self) -> Option<(u64, u64)> {
        let min = self.edges.iter().map(|e| e.volume).min()?;
        let max = self.edges.iter().map(|e| e.volume).max()?;
        Some((min, max))
    }

    /// Sum of all volumes.
    #[must_use]
    pub fn total_volume(&self) -> u64 {
        self.edges.iter().map(|e| e.volume).sum()
    }

    /// Number of flows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether there are no flows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl<'a> IntoIterator for &'a FlowCollection {
    type Item = &'a FlowEdge;
    type IntoIter = std::slice::Iter<'a, FlowEdge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

/// Counts rides per ordered (pickup, drop) district pair.
///
/// `(A, B)` and `(B, A)` are distinct flows. Pairs with either endpoint
/// outside `valid_districts` (including the unknown sentinel) are
/// dropped. The result is ordered by origin then destination.
#[must_use]
pub fn count_flows<I>(rides: I, valid_districts: &BTreeSet<String>) -> Vec<FlowCount>
where
    I: IntoIterator,
    I::Item: DistrictPair,
{
    let mut counts: BTreeMap<(String, String), u64> = BTreeMap::new();
    for ride in rides {
        let key = (
            ride.pickup_district().to_string(),
            ride.drop_district().to_string(),
        );
        *counts.entry(key).or_default() += 1;
    }

    let pairs = counts.len();
    let flows: Vec<FlowCount> = counts
        .into_iter()
        .filter(|((origin, destination), _)| {
            valid_districts.contains(origin) && valid_districts.contains(destination)
        })
        .map(|((origin, destination), volume)| FlowCount {
            origin,
            destination,
            volume,
        })
        .collect();

    log::debug!(
        "Counted {pairs} district pairs, {} between known districts",
        flows.len()
    );
    flows
}

/// Aggregates rides into flow edges between the districts of `districts`.
///
/// An empty ride sequence yields an empty collection.
#[must_use]
pub fn aggregate_flows<I>(rides: I, districts: &DistrictSet) -> FlowCollection
where
    I: IntoIterator,
    I::Item: DistrictPair,
{
    let edges = count_flows(rides, &districts.name_set())
        .into_iter()
        .filter_map(|flow| {
            let origin = districts.centroid(&flow.origin)?;
            let destination = districts.centroid(&flow.destination)?;
            Some(FlowEdge {
                origin: flow.origin,
                destination: flow.destination,
                volume: flow.volume,
                geometry: Line::new(origin.0, destination.0),
            })
        })
        .collect();

    FlowCollection { edges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{MultiPolygon, polygon};
    use ride_map_district::{LocationDistrictMap, UNKNOWN_DISTRICT};

    fn square(x: f64, y: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
            (x: x, y: y),
        ]])
    }

    fn districts() -> DistrictSet {
        DistrictSet::from_polygons([
            ("SOUTH".to_string(), square(0.0, 0.0)),
            ("CENTRAL".to_string(), square(0.0, 2.0)),
            ("EAST".to_string(), square(2.0, 2.0)),
        ])
    }

    fn resolve(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        let map = LocationDistrictMap::embedded().unwrap();
        pairs
            .iter()
            .map(|(p, d)| {
                (
                    map.resolve_district(p).to_string(),
                    map.resolve_district(d).to_string(),
                )
            })
            .collect()
    }

    fn triples(flows: &FlowCollection) -> Vec<(String, String, u64)> {
        flows
            .edges()
            .iter()
            .map(|e| (e.origin.clone(), e.destination.clone(), e.volume))
            .collect()
    }

    #[test]
    fn empty_input_yields_empty_collection() {
        let flows = aggregate_flows(Vec::<(String, String)>::new(), &districts());
        assert!(flows.is_empty());
        assert_eq!(flows.volume_range(), None);
        assert_eq!(flows.total_volume(), 0);
    }

    #[test]
    fn directed_pairs_are_counted_separately() {
        let rides = resolve(&[
            ("AIIMS", "Connaught Place"),
            ("AIIMS", "Connaught Place"),
            ("Connaught Place", "AIIMS"),
        ]);
        let flows = aggregate_flows(&rides, &districts());

        assert_eq!(
            triples(&flows),
            vec![
                ("CENTRAL".to_string(), "SOUTH".to_string(), 1),
                ("SOUTH".to_string(), "CENTRAL".to_string(), 2),
            ]
        );
        assert_eq!(flows.volume_range(), Some((1, 2)));
    }

    #[test]
    fn geometry_joins_centroids() {
        let flows = aggregate_flows([("SOUTH", "EAST")], &districts());
        let line = flows.edges()[0].geometry;
        assert_eq!(line.start, geo::coord! { x: 0.5, y: 0.5 });
        assert_eq!(line.end, geo::coord! { x: 2.5, y: 2.5 });
    }

    #[test]
    fn unknown_endpoints_are_dropped() {
        let rides = resolve(&[
            ("Nowhereville", "AIIMS"),
            ("Nowhereville", "AIIMS"),
            ("AIIMS", "Nowhereville"),
        ]);
        assert_eq!(rides[0].0, UNKNOWN_DISTRICT);
        assert!(aggregate_flows(&rides, &districts()).is_empty());
    }

    #[test]
    fn names_outside_the_district_set_are_dropped() {
        // Cyber Hub resolves to OUTSIDE, which is not a district.
        let rides = resolve(&[("Cyber Hub", "AIIMS"), ("AIIMS", "ITO")]);
        let flows = aggregate_flows(&rides, &districts());
        assert_eq!(
            triples(&flows),
            vec![("SOUTH".to_string(), "CENTRAL".to_string(), 1)]
        );
    }

    #[test]
    fn volume_never_exceeds_valid_ride_count() {
        let rides = vec![
            ("SOUTH", "CENTRAL"),
            ("SOUTH", UNKNOWN_DISTRICT),
            ("EAST", "EAST"),
            ("NORTH", "SOUTH"),
            ("CENTRAL", "EAST"),
            ("CENTRAL", "EAST"),
        ];
        let set = districts();
        let valid = rides
            .iter()
            .filter(|(p, d)| set.contains(p) && set.contains(d))
            .count() as u64;
        let flows = aggregate_flows(&rides, &set);
        assert!(flows.total_volume() <= valid);
        assert_eq!(flows.total_volume(), 4);
    }

    #[test]
    fn aggregation_is_order_independent() {
        let rides = vec![
            ("SOUTH", "CENTRAL"),
            ("CENTRAL", "SOUTH"),
            ("SOUTH", "CENTRAL"),
            ("EAST", "SOUTH"),
            ("SOUTH", "CENTRAL"),
        ];
        let mut reversed = rides.clone();
        reversed.reverse();
        let mut rotated = rides.clone();
        rotated.rotate_left(2);

        let set = districts();
        let expected = triples(&aggregate_flows(&rides, &set));
        assert_eq!(triples(&aggregate_flows(&reversed, &set)), expected);
        assert_eq!(triples(&aggregate_flows(&rotated, &set)), expected);
    }

    #[test]
    fn count_flows_filters_by_valid_set() {
        let valid = BTreeSet::from(["A".to_string(), "B".to_string()]);
        let counts = count_flows([("A", "B"), ("A", "C"), ("B", "A"), ("A", "B")], &valid);
        assert_eq!(
            counts,
            vec![
                FlowCount {
                    origin: "A".to_string(),
                    destination: "B".to_string(),
                    volume: 2,
                },
                FlowCount {
                    origin: "B".to_string(),
                    destination: "A".to_string(),
                    volume: 1,
                },
            ]
        );
    }
}
