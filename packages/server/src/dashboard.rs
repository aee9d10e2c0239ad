//! The loaded, read-only dashboard data and the per-request pipeline.

use ride_map_district::{DistrictSet, LocationDistrictMap, load_districts};
use ride_map_flow::{FlowCollection, aggregate_flows};
use ride_map_render::{FlowMapStyle, RenderError, embed_png_html, render_flow_map};
use ride_map_ride::{RideSummary, load_rides, summarize};
use ride_map_ride_models::{ResolvedRide, RideFilter};

use crate::ServerError;
use crate::config::DashboardConfig;

/// Rides with their districts already resolved, the district polygons,
/// and the map style. Built once at startup and shared by every request.
#[derive(Debug, Clone)]
pub struct Dashboard {
    rides: Vec<ResolvedRide>,
    districts: DistrictSet,
    style: FlowMapStyle,
}

impl Dashboard {
    /// Loads every input named by `config` and resolves ride locations.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if any input is missing or malformed, or if
    /// the style describes a canvas with no room for the map.
    pub fn load(config: &DashboardConfig) -> Result<Self, ServerError> {
        let table = match &config.location_table {
            Some(path) => LocationDistrictMap::from_path(path)?,
            None => LocationDistrictMap::embedded()?,
        };

        let style = match &config.style_path {
            Some(path) => FlowMapStyle::from_path(path)?,
            None => FlowMapStyle::default(),
        };
        style.validate()?;

        let districts = load_districts(&config.boundaries)?;
        let rides = table.resolve_rides(load_rides(&config.rides_csv)?);

        Ok(Self::new(rides, districts, style))
    }

    /// Builds a dashboard from already-loaded data.
    #[must_use]
    pub const fn new(
        rides: Vec<ResolvedRide>,
        districts: DistrictSet,
        style: FlowMapStyle,
    ) -> Self {
        Self {
            rides,
            districts,
            style,
        }
    }

    /// All loaded rides.
    #[must_use]
    pub fn rides(&self) -> &[ResolvedRide] {
        &self.rides
    }

    /// The district polygons of the region.
    #[must_use]
    pub const fn districts(&self) -> &DistrictSet {
        &self.districts
    }

    /// The map style every render uses.
    #[must_use]
    pub const fn style(&self) -> &FlowMapStyle {
        &self.style
    }

    /// Rides matching `filter`, in load order.
    pub fn filtered<'a>(
        &'a self,
        filter: &'a RideFilter,
    ) -> impl Iterator<Item = &'a ResolvedRide> + 'a {
        self.rides.iter().filter(move |ride| filter.matches(&ride.record))
    }

    /// Flows between districts for the rides matching `filter`.
    #[must_use]
    pub fn flows(&self, filter: &RideFilter) -> FlowCollection {
        aggregate_flows(self.filtered(filter), &self.districts)
    }

    /// Chart counts for the rides matching `filter`.
    #[must_use]
    pub fn summary(&self, filter: &RideFilter) -> RideSummary {
        summarize(self.filtered(filter).map(|ride| &ride.record))
    }

    /// Renders the flow map for `filter` as PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if rendering fails.
    pub fn render_png(&self, filter: &RideFilter) -> Result<Vec<u8>, RenderError> {
        let flows = self.flows(filter);
        log::debug!(
            "Rendering {} flows ({} rides) for {filter:?}",
            flows.len(),
            flows.total_volume()
        );
        render_flow_map(&self.districts, &flows, &self.style)
    }

    /// Renders the flow map for `filter` as an embeddable HTML fragment.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if rendering fails.
    pub fn render_html(&self, filter: &RideFilter) -> Result<String, RenderError> {
        Ok(embed_png_html(&self.render_png(filter)?))
    }
}
