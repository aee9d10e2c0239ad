//! Line-width scaling for flow edges.
//!
//! Widths are a linear min-max normalization of raw volumes. With a
//! long-tailed volume distribution the busiest pair dominates the range;
//! that is the intended visual encoding.

use serde::{Deserialize, Serialize};

use crate::FlowCollection;

/// Linear mapping from volume to line width, in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidthScale {
    /// Width of the lowest-volume flow.
    pub min_width: f64,
    /// Width of the highest-volume flow, and of every flow when all
    /// volumes are equal.
    pub max_width: f64,
}

impl Default for WidthScale {
    fn default() -> Self {
        Self {
            min_width: 0.5,
            max_width: 8.0,
        }
    }
}

impl WidthScale {
    /// Width for `volume` given the collection's `(vmin, vmax)`.
    ///
    /// A degenerate range (`vmax == vmin`, including a single flow) gets
    /// `max_width` instead of dividing by zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn width_for(&self, volume: u64, (vmin, vmax): (u64, u64)) -> f64 {
        if vmax <= vmin {
            return self.max_width;
        }
        let t = (volume.saturating_sub(vmin)) as f64 / (vmax - vmin) as f64;
        t.clamp(0.0, 1.0).mul_add(self.max_width - self.min_width, self.min_width)
    }

    /// Widths for every edge of `flows`, in edge order. Empty for an
    /// empty collection.
    #[must_use]
    pub fn widths(&self, flows: &FlowCollection) -> Vec<f64> {
        let Some(range) = flows.volume_range() else {
            return Vec::new();
        };
        flows
            .edges()
            .iter()
            .map(|edge| self.width_for(edge.volume, range))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate_flows;
    use geo::{MultiPolygon, polygon};
    use ride_map_district::DistrictSet;

    fn districts() -> DistrictSet {
        let square = |x: f64| {
            MultiPolygon(vec![polygon![
                (x: x, y: 0.0),
                (x: x + 1.0, y: 0.0),
                (x: x + 1.0, y: 1.0),
                (x: x, y: 1.0),
                (x: x, y: 0.0),
            ]])
        };
        DistrictSet::from_polygons([
            ("SOUTH".to_string(), square(0.0)),
            ("CENTRAL".to_string(), square(2.0)),
        ])
    }

    #[test]
    fn endpoints_map_to_min_and_max() {
        let scale = WidthScale::default();
        assert!((scale.width_for(1, (1, 2)) - 0.5).abs() < 1e-12);
        assert!((scale.width_for(2, (1, 2)) - 8.0).abs() < 1e-12);
        assert!((scale.width_for(6, (1, 11)) - 4.25).abs() < 1e-12);
    }

    #[test]
    fn degenerate_range_uses_max_width() {
        let scale = WidthScale::default();
        assert!((scale.width_for(5, (5, 5)) - 8.0).abs() < 1e-12);
    }

    #[test]
    fn empty_collection_has_no_widths() {
        assert!(WidthScale::default().widths(&FlowCollection::default()).is_empty());
    }

    #[test]
    fn busier_direction_gets_max_width() {
        let rides = [
            ("SOUTH", "CENTRAL"),
            ("SOUTH", "CENTRAL"),
            ("CENTRAL", "SOUTH"),
        ];
        let flows = aggregate_flows(rides, &districts());
        let widths = WidthScale::default().widths(&flows);

        // Edges are ordered CENTRAL→SOUTH, SOUTH→CENTRAL.
        assert_eq!(flows.edges()[0].origin, "CENTRAL");
        assert!((widths[0] - 0.5).abs() < 1e-12);
        assert!((widths[1] - 8.0).abs() < 1e-12);
    }

    #[test]
    fn single_flow_uses_max_width() {
        let flows = aggregate_flows([("SOUTH", "CENTRAL")], &districts());
        assert_eq!(WidthScale::default().widths(&flows), vec![8.0]);
    }

    #[test]
    fn deserializes_partial_toml() {
        let scale: WidthScale = toml::de::from_str("max_width = 12.0").unwrap();
        assert!((scale.max_width - 12.0).abs() < 1e-12);
        assert!((scale.min_width - 0.5).abs() < 1e-12);
    }
}
