//! District boundary loading.
//!
//! Reads a polygon-per-district file (ESRI Shapefile or `GeoJSON`),
//! keeps the features whose region attribute matches the region of
//! interest, and computes one centroid per district. The result is a
//! [`DistrictSet`] that is built once at startup and never mutated.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use geo::{BoundingRect, Centroid, MultiPolygon, Point, Rect};
use geojson::GeoJson;
use serde::{Deserialize, Serialize};
use shapefile::dbase::{FieldValue, Record};

use crate::DistrictError;

/// Where and how to read district boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct BoundarySource {
    /// Path to a `.shp` file (with its `.dbf` alongside) or a
    /// `.geojson`/`.json` `FeatureCollection`.
    pub path: PathBuf,
    /// Attribute holding the district name.
    pub name_field: String,
    /// Attribute holding the state/region name.
    pub region_field: String,
    /// Region value to keep, compared after cleanup.
    pub region: String,
}

impl Default for BoundarySource {
    fn default() -> Self {
        Self {
            path: PathBuf::from("input/DISTRICT_BOUNDARY.shp"),
            name_field: "District".to_string(),
            region_field: "STATE".to_string(),
            region: "DELHI".to_string(),
        }
    }
}

/// One administrative district.
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictPolygon {
    /// District name, unique within a [`DistrictSet`].
    pub name: String,
    /// Boundary geometry.
    pub geometry: MultiPolygon<f64>,
    /// Geometric centroid, the anchor for flow lines and labels.
    ///
    /// Computed in the boundary file's own coordinates without
    /// reprojection. For lon/lat data this is a planar centroid in
    /// degrees, which differs slightly from one taken in a metric CRS
    /// such as UTM 44N (EPSG:32644).
    pub centroid: Point<f64>,
}

/// The fixed set of districts of the region of interest, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct DistrictSet {
    districts: Vec<DistrictPolygon>,
    index: BTreeMap<String, usize>,
}

impl DistrictSet {
    /// Builds a set from named polygons.
    ///
    /// Polygons sharing a name are merged into one `MultiPolygon`.
    /// Districts whose geometry has no centroid (empty polygons) are
    /// skipped with a warning.
    pub fn from_polygons<I>(polygons: I) -> Self
    where
        I: IntoIterator<Item = (String, MultiPolygon<f64>)>,
    {
        let mut merged: BTreeMap<String, MultiPolygon<f64>> = BTreeMap::new();
        for (name, geometry) in polygons {
            merged
                .entry(name)
                .and_modify(|existing| existing.0.extend(geometry.0.iter().cloned()))
                .or_insert(geometry);
        }

        let mut districts = Vec::with_capacity(merged.len());
        for (name, geometry) in merged {
            let Some(centroid) = geometry.centroid() else {
                log::warn!("District {name} has empty geometry, skipping");
                continue;
            };
            districts.push(DistrictPolygon {
                name,
                geometry,
                centroid,
            });
        }

        let index = districts
            .iter()
            .enumerate()
            .map(|(i, d)| (d.name.clone(), i))
            .collect();

        Self { districts, index }
    }

    /// Looks up a district by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&DistrictPolygon> {
        self.index.get(name).map(|&i| &self.districts[i])
    }

    /// Whether `name` is one of the districts.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The centroid of the named district.
    #[must_use]
    pub fn centroid(&self, name: &str) -> Option<Point<f64>> {
        self.get(name).map(|d| d.centroid)
    }

    /// Names of all districts.
    #[must_use]
    pub fn name_set(&self) -> BTreeSet<String> {
        self.index.keys().cloned().collect()
    }

    /// Iterates the districts in name order.
    pub fn iter(&self) -> std::slice::Iter<'_, DistrictPolygon> {
        self.districts.iter()
    }

    /// Bounding box of every district polygon.
    #[must_use]
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        self.districts
            .iter()
            .filter_map(|d| d.geometry.bounding_rect())
            .reduce(|a, b| {
                Rect::new(
                    (a.min().x.min(b.min().x), a.min().y.min(b.min().y)),
                    (a.max().x.max(b.max().x), a.max().y.max(b.max().y)),
                )
            })
    }

    /// Number of districts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.districts.len()
    }

    /// Whether there are no districts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
    }
}

impl<'a> IntoIterator for &'a DistrictSet {
    type Item = &'a DistrictPolygon;
    type IntoIter = std::slice::Iter<'a, DistrictPolygon>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Loads the districts of `source.region` from `source.path`.
///
/// # Errors
///
/// Returns [`DistrictError`] if the file is missing or unreadable, has
/// an unsupported extension, or contains no district of the region.
pub fn load_districts(source: &BoundarySource) -> Result<DistrictSet, DistrictError> {
    log::info!("Loading district boundaries from {}...", source.path.display());

    let extension = source
        .path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let features = match extension.as_str() {
        "shp" => read_shapefile(&source.path, source)?,
        "geojson" | "json" => {
            let contents = std::fs::read_to_string(&source.path)?;
            read_geojson(&contents, source)?
        }
        other => return Err(DistrictError::UnsupportedFormat(other.to_string())),
    };

    let districts = DistrictSet::from_polygons(features);
    if districts.is_empty() {
        return Err(DistrictError::Empty {
            message: format!(
                "no feature of {} has {} = {}",
                source.path.display(),
                source.region_field,
                source.region
            ),
        });
    }

    log::info!(
        "Loaded {} districts of {} from {}",
        districts.len(),
        source.region,
        source.path.display()
    );
    Ok(districts)
}

/// Boundary attributes carry stray `>` markers and padding.
fn clean_attribute(raw: &str) -> String {
    raw.replace('>', "").trim().to_string()
}

/// Applies the region filter and name cleanup shared by both formats.
fn keep_feature(
    name: Option<&str>,
    region: Option<&str>,
    source: &BoundarySource,
) -> Option<String> {
    let region = clean_attribute(region?);
    if region != source.region {
        return None;
    }
    let name = clean_attribute(name?);
    if name.is_empty() {
        log::debug!("Skipping {} feature with an empty name", source.region);
        return None;
    }
    Some(name)
}

fn read_shapefile(
    path: &Path,
    source: &BoundarySource,
) -> Result<Vec<(String, MultiPolygon<f64>)>, DistrictError> {
    let shapes = shapefile::read_as::<_, shapefile::Polygon, Record>(path)?;
    log::debug!("Read {} shapes from {}", shapes.len(), path.display());

    Ok(shapes
        .into_iter()
        .filter_map(|(polygon, record)| {
            let name = character_field(&record, &source.name_field);
            let region = character_field(&record, &source.region_field);
            let name = keep_feature(name.as_deref(), region.as_deref(), source)?;
            Some((name, MultiPolygon::<f64>::from(polygon)))
        })
        .collect())
}

fn character_field(record: &Record, field: &str) -> Option<String> {
    match record.get(field)? {
        FieldValue::Character(value) => value.clone(),
        FieldValue::Memo(value) => Some(value.clone()),
        _ => None,
    }
}

fn read_geojson(
    contents: &str,
    source: &BoundarySource,
) -> Result<Vec<(String, MultiPolygon<f64>)>, DistrictError> {
    let GeoJson::FeatureCollection(collection) = contents.parse::<GeoJson>()? else {
        return Err(DistrictError::UnsupportedFormat(
            "GeoJSON boundary file must be a FeatureCollection".to_string(),
        ));
    };

    let mut features = Vec::new();
    for feature in collection.features {
        let name = feature
            .property(&source.name_field)
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let region = feature
            .property(&source.region_field)
            .and_then(|v| v.as_str())
            .map(str::to_string);
        let Some(name) = keep_feature(name.as_deref(), region.as_deref(), source) else {
            continue;
        };

        let Some(geometry) = feature.geometry else {
            log::warn!("District {name} has no geometry, skipping");
            continue;
        };
        let multi_polygon = match geo::Geometry::<f64>::try_from(geometry) {
            Ok(geo::Geometry::MultiPolygon(mp)) => mp,
            Ok(geo::Geometry::Polygon(p)) => MultiPolygon(vec![p]),
            Ok(_) => {
                log::warn!("District {name} is not a polygon, skipping");
                continue;
            }
            Err(e) => {
                log::warn!("District {name} has invalid geometry: {e}");
                continue;
            }
        };
        features.push((name, multi_polygon));
    }

    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    fn square(x: f64, y: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![polygon![
            (x: x, y: y),
            (x: x + size, y: y),
            (x: x + size, y: y + size),
            (x: x, y: y + size),
            (x: x, y: y),
        ]])
    }

    const FIXTURE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "District": "SOUTH>", "STATE": " DELHI>" },
                "geometry": { "type": "Polygon", "coordinates": [[[77.0, 28.4], [77.2, 28.4], [77.2, 28.6], [77.0, 28.6], [77.0, 28.4]]] }
            },
            {
                "type": "Feature",
                "properties": { "District": "CENTRAL", "STATE": "DELHI" },
                "geometry": { "type": "MultiPolygon", "coordinates": [[[[77.2, 28.6], [77.3, 28.6], [77.3, 28.7], [77.2, 28.7], [77.2, 28.6]]]] }
            },
            {
                "type": "Feature",
                "properties": { "District": "GURGAON", "STATE": "HARYANA" },
                "geometry": { "type": "Polygon", "coordinates": [[[76.9, 28.4], [77.0, 28.4], [77.0, 28.5], [76.9, 28.4]]] }
            },
            {
                "type": "Feature",
                "properties": { "District": "NOWHERE", "STATE": "DELHI" },
                "geometry": { "type": "Point", "coordinates": [77.1, 28.5] }
            }
        ]
    }"#;

    #[test]
    fn centroid_is_cached_per_district() {
        let set = DistrictSet::from_polygons([("A".to_string(), square(0.0, 0.0, 2.0))]);
        let centroid = set.centroid("A").unwrap();
        assert!((centroid.x() - 1.0).abs() < 1e-9);
        assert!((centroid.y() - 1.0).abs() < 1e-9);
        assert!(set.centroid("B").is_none());
    }

    #[test]
    fn duplicate_names_are_merged() {
        let set = DistrictSet::from_polygons([
            ("A".to_string(), square(0.0, 0.0, 1.0)),
            ("A".to_string(), square(2.0, 0.0, 1.0)),
        ]);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("A").unwrap().geometry.0.len(), 2);
        assert!((set.centroid("A").unwrap().x() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn empty_geometry_is_skipped() {
        let set = DistrictSet::from_polygons([
            ("A".to_string(), MultiPolygon::<f64>(vec![])),
            ("B".to_string(), square(0.0, 0.0, 1.0)),
        ]);
        assert_eq!(set.name_set(), BTreeSet::from(["B".to_string()]));
    }

    #[test]
    fn bounding_rect_spans_all_districts() {
        let set = DistrictSet::from_polygons([
            ("A".to_string(), square(0.0, 0.0, 1.0)),
            ("B".to_string(), square(3.0, 5.0, 1.0)),
        ]);
        let rect = set.bounding_rect().unwrap();
        assert_eq!(rect.min(), geo::coord! { x: 0.0, y: 0.0 });
        assert_eq!(rect.max(), geo::coord! { x: 4.0, y: 6.0 });
        assert!(DistrictSet::default().bounding_rect().is_none());
    }

    #[test]
    fn geojson_filters_region_and_cleans_names() {
        let features = read_geojson(FIXTURE, &BoundarySource::default()).unwrap();
        let names: Vec<&str> = features.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["SOUTH", "CENTRAL"]);
    }

    #[test]
    fn geojson_must_be_feature_collection() {
        let err = read_geojson(
            r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#,
            &BoundarySource::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DistrictError::UnsupportedFormat(_)));
    }

    fn shapefile_square(x: f64, y: f64) -> shapefile::Polygon {
        shapefile::Polygon::new(shapefile::PolygonRing::Outer(vec![
            shapefile::Point::new(x, y),
            shapefile::Point::new(x, y + 2.0),
            shapefile::Point::new(x + 2.0, y + 2.0),
            shapefile::Point::new(x + 2.0, y),
            shapefile::Point::new(x, y),
        ]))
    }

    fn attributes(district: &str, state: &str) -> Record {
        let mut record = Record::default();
        record.insert(
            "District".to_string(),
            FieldValue::Character(Some(district.to_string())),
        );
        record.insert(
            "STATE".to_string(),
            FieldValue::Character(Some(state.to_string())),
        );
        record
    }

    #[test]
    fn shapefile_filters_region_and_cleans_names() {
        let dir = std::env::temp_dir().join(format!("ride_map_shp_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("districts.shp");

        {
            let table = shapefile::dbase::TableWriterBuilder::new()
                .add_character_field("District".try_into().unwrap(), 50)
                .add_character_field("STATE".try_into().unwrap(), 50);
            let mut writer = shapefile::Writer::from_path(&path, table).unwrap();
            writer
                .write_shape_and_record(
                    &shapefile_square(0.0, 0.0),
                    &attributes("SOUTH>", " DELHI>"),
                )
                .unwrap();
            writer
                .write_shape_and_record(
                    &shapefile_square(5.0, 5.0),
                    &attributes("GURGAON", "HARYANA"),
                )
                .unwrap();
        }

        let source = BoundarySource {
            path: path.clone(),
            ..BoundarySource::default()
        };
        let set = load_districts(&source);
        std::fs::remove_dir_all(&dir).unwrap();

        let set = set.unwrap();
        assert_eq!(set.name_set(), BTreeSet::from(["SOUTH".to_string()]));
        let centroid = set.centroid("SOUTH").unwrap();
        assert!((centroid.x() - 1.0).abs() < 1e-9);
        assert!((centroid.y() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn missing_boundary_file_is_fatal() {
        let source = BoundarySource {
            path: PathBuf::from("/nonexistent/districts.geojson"),
            ..BoundarySource::default()
        };
        assert!(matches!(load_districts(&source), Err(DistrictError::Io(_))));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let source = BoundarySource {
            path: PathBuf::from("districts.kml"),
            ..BoundarySource::default()
        };
        assert!(matches!(
            load_districts(&source),
            Err(DistrictError::UnsupportedFormat(_))
        ));
    }
}
