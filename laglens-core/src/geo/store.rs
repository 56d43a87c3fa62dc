//! Land polygons loaded from GeoJSON and projected once at load time.

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::projection::{project, world_extent, ProjectedBounds};
use crate::error::GeometryLoadError;

/// Coarse world land masses shipped with the crate.
const BUNDLED_LAND: &str = include_str!("../../data/land.geojson");

/// A projected polygon: one exterior ring plus zero or more holes.
///
/// Immutable after construction. Bounds are derived once from the exterior
/// ring and are only used for index pruning.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    exterior: Vec<(f64, f64)>,
    holes: Vec<Vec<(f64, f64)>>,
    bounds: ProjectedBounds,
}

impl Polygon {
    /// Build a polygon from already-projected rings.
    pub fn new(exterior: Vec<(f64, f64)>, holes: Vec<Vec<(f64, f64)>>) -> Self {
        let bounds = ProjectedBounds::from_points(&exterior);
        Self {
            exterior,
            holes,
            bounds,
        }
    }

    pub fn exterior(&self) -> &[(f64, f64)] {
        &self.exterior
    }

    pub fn holes(&self) -> &[Vec<(f64, f64)>] {
        &self.holes
    }

    pub fn bounds(&self) -> &ProjectedBounds {
        &self.bounds
    }

    /// True if the point lies in the interior or on the boundary.
    ///
    /// Points strictly inside a hole are outside; points on a hole's edge
    /// are on the polygon boundary and therefore inside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        if !self.bounds.contains(x, y) {
            return false;
        }
        match ring_relation(&self.exterior, x, y) {
            RingRelation::Outside => false,
            RingRelation::Boundary => true,
            RingRelation::Inside => self
                .holes
                .iter()
                .all(|hole| ring_relation(hole, x, y) != RingRelation::Inside),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RingRelation {
    Inside,
    Boundary,
    Outside,
}

/// Crossing-number test with an explicit on-edge check.
///
/// The ring may or may not repeat its first vertex at the end.
fn ring_relation(ring: &[(f64, f64)], x: f64, y: f64) -> RingRelation {
    let n = ring.len();
    if n < 3 {
        return RingRelation::Outside;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = ring[i];
        let (xj, yj) = ring[j];

        if on_segment((xj, yj), (xi, yi), (x, y)) {
            return RingRelation::Boundary;
        }

        // Half-open rule on y so a vertex is counted once.
        if (yi > y) != (yj > y) {
            let x_cross = xi + (y - yi) * (xj - xi) / (yj - yi);
            if x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    if inside {
        RingRelation::Inside
    } else {
        RingRelation::Outside
    }
}

fn on_segment(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> bool {
    let cross = (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0);
    let scale = (b.0 - a.0).abs().max((b.1 - a.1).abs()).max(1.0);
    if cross.abs() > 1e-9 * scale * scale {
        return false;
    }
    p.0 >= a.0.min(b.0) && p.0 <= a.0.max(b.0) && p.1 >= a.1.min(b.1) && p.1 <= a.1.max(b.1)
}

/// Owner of all land polygons for the process lifetime.
#[derive(Debug, Clone)]
pub struct GeometryStore {
    polygons: Vec<Polygon>,
    extent: ProjectedBounds,
}

impl GeometryStore {
    /// Load the dataset embedded in the crate.
    pub fn bundled() -> Result<Self, GeometryLoadError> {
        Self::from_geojson_str(BUNDLED_LAND)
    }

    /// Load a GeoJSON FeatureCollection from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GeometryLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_geojson_str(&content)
    }

    /// Parse a GeoJSON FeatureCollection and project every vertex.
    pub fn from_geojson_str(content: &str) -> Result<Self, GeometryLoadError> {
        let root: Value = serde_json::from_str(content)?;
        let features = match root.get("features").and_then(Value::as_array) {
            Some(features) => features.as_slice(),
            None => &[],
        };

        let mut polygons = Vec::new();
        for (index, feature) in features.iter().enumerate() {
            let geometry = &feature["geometry"];
            if geometry.is_null() {
                continue;
            }
            let kind = geometry["type"].as_str().unwrap_or_default();
            let coords = &geometry["coordinates"];
            match kind {
                "Polygon" => polygons.push(parse_polygon(index, coords)?),
                "MultiPolygon" => {
                    for member in coords.as_array().into_iter().flatten() {
                        polygons.push(parse_polygon(index, member)?);
                    }
                }
                other => {
                    return Err(GeometryLoadError::UnsupportedGeometry {
                        feature: index,
                        kind: other.to_string(),
                    })
                }
            }
        }

        tracing::debug!(polygons = polygons.len(), "loaded land geometry");

        Ok(Self {
            polygons,
            extent: world_extent(),
        })
    }

    /// Build a store from polygons that are already projected.
    pub fn from_polygons(polygons: Vec<Polygon>) -> Self {
        Self {
            polygons,
            extent: world_extent(),
        }
    }

    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Projected corners of the drawable world.
    pub fn extent(&self) -> ProjectedBounds {
        self.extent
    }

    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }
}

/// Parse `[exterior, hole, ...]` rings of geographic positions.
fn parse_polygon(feature: usize, rings: &Value) -> Result<Polygon, GeometryLoadError> {
    let mut projected: Vec<Vec<(f64, f64)>> = Vec::new();
    for ring in rings.as_array().into_iter().flatten() {
        let points: Vec<(f64, f64)> = ring
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|pos| {
                let pos = pos.as_array()?;
                let lon = pos.first()?.as_f64()?;
                let lat = pos.get(1)?.as_f64()?;
                Some(project(lon, lat))
            })
            .collect();
        if points.len() < 3 {
            return Err(GeometryLoadError::InvalidRing {
                feature,
                positions: points.len(),
            });
        }
        projected.push(points);
    }

    if projected.is_empty() {
        return Err(GeometryLoadError::InvalidRing {
            feature,
            positions: 0,
        });
    }

    let exterior = projected.remove(0);
    Ok(Polygon::new(exterior, projected))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> Vec<(f64, f64)> {
        vec![
            (x0, y0),
            (x0 + size, y0),
            (x0 + size, y0 + size),
            (x0, y0 + size),
            (x0, y0),
        ]
    }

    #[test]
    fn polygon_contains_interior_and_boundary() {
        let poly = Polygon::new(square(0.0, 0.0, 10.0), vec![]);
        assert!(poly.contains(5.0, 5.0));
        assert!(poly.contains(0.0, 5.0));
        assert!(poly.contains(10.0, 10.0));
        assert!(!poly.contains(10.5, 5.0));
        assert!(!poly.contains(-0.1, -0.1));
    }

    #[test]
    fn hole_is_subtracted_but_its_edge_is_land() {
        let poly = Polygon::new(square(0.0, 0.0, 10.0), vec![square(4.0, 4.0, 2.0)]);
        assert!(!poly.contains(5.0, 5.0));
        assert!(poly.contains(4.0, 5.0));
        assert!(poly.contains(2.0, 2.0));
    }

    #[test]
    fn concave_polygon() {
        // U shape opening upward.
        let ring = vec![
            (0.0, 0.0),
            (6.0, 0.0),
            (6.0, 6.0),
            (4.0, 6.0),
            (4.0, 2.0),
            (2.0, 2.0),
            (2.0, 6.0),
            (0.0, 6.0),
        ];
        let poly = Polygon::new(ring, vec![]);
        assert!(poly.contains(1.0, 5.0));
        assert!(poly.contains(5.0, 5.0));
        assert!(!poly.contains(3.0, 4.0));
        assert!(poly.contains(3.0, 1.0));
    }

    #[test]
    fn loads_polygon_and_multipolygon() {
        let json = r#"{
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "properties": {}, "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]
                }},
                {"type": "Feature", "properties": {}, "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[20,20],[30,20],[30,30],[20,20]]],
                        [[[40,40],[50,40],[50,50],[40,40]]]
                    ]
                }},
                {"type": "Feature", "properties": {}, "geometry": null}
            ]
        }"#;
        let store = GeometryStore::from_geojson_str(json).unwrap();
        assert_eq!(store.len(), 3);

        let (x, y) = project(5.0, 5.0);
        assert!(store.polygons()[0].contains(x, y));
    }

    #[test]
    fn rejects_unsupported_geometry() {
        let json = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"LineString","coordinates":[[0,0],[1,1]]}}
        ]}"#;
        let err = GeometryStore::from_geojson_str(json).unwrap_err();
        assert!(matches!(
            err,
            GeometryLoadError::UnsupportedGeometry { feature: 0, ref kind } if kind == "LineString"
        ));
    }

    #[test]
    fn rejects_degenerate_ring() {
        let json = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","geometry":{"type":"Polygon","coordinates":[[[0,0],[1,1]]]}}
        ]}"#;
        let err = GeometryStore::from_geojson_str(json).unwrap_err();
        assert!(matches!(err, GeometryLoadError::InvalidRing { positions: 2, .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = GeometryStore::from_geojson_str("{not json").unwrap_err();
        assert!(matches!(err, GeometryLoadError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = GeometryStore::load("/definitely/not/here.geojson").unwrap_err();
        assert!(matches!(err, GeometryLoadError::Io(_)));
    }

    #[test]
    fn bundled_dataset_loads() {
        let store = GeometryStore::bundled().unwrap();
        assert!(store.len() > 10);

        // Interior of Brazil and of Australia.
        let (bx, by) = project(-50.0, -10.0);
        let (ax, ay) = project(134.0, -25.0);
        assert!(store.polygons().iter().any(|p| p.contains(bx, by)));
        assert!(store.polygons().iter().any(|p| p.contains(ax, ay)));

        // Middle of the Pacific.
        let (px, py) = project(-150.0, 0.0);
        assert!(!store.polygons().iter().any(|p| p.contains(px, py)));
    }

    #[test]
    fn projection_is_reproducible_across_loads() {
        let a = GeometryStore::bundled().unwrap();
        let b = GeometryStore::bundled().unwrap();
        assert_eq!(a.polygons(), b.polygons());
    }
}
