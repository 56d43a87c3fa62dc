//! Forward spherical Web Mercator projection.
//!
//! Geographic coordinates (longitude, latitude in degrees) are mapped to
//! planar metres. The projection is a pure function, so polygons and markers
//! projected in different runs land on identical coordinates.

use std::f64::consts::FRAC_PI_4;

/// Earth radius used by Web Mercator (EPSG:3857), in metres.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Latitude beyond which Mercator diverges; inputs are clamped to it.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// Geographic extent of the drawable world: (lon_min, lat_min, lon_max, lat_max).
///
/// Clipped near the poles, where Mercator stretches land beyond usefulness.
pub const WORLD_BOUNDS: (f64, f64, f64, f64) = (-180.0, -75.0, 180.0, 85.0);

/// Axis-aligned bounding box in projected coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedBounds {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl ProjectedBounds {
    /// An inverted box that any `extend` call will replace.
    pub const EMPTY: ProjectedBounds = ProjectedBounds {
        xmin: f64::INFINITY,
        ymin: f64::INFINITY,
        xmax: f64::NEG_INFINITY,
        ymax: f64::NEG_INFINITY,
    };

    /// Bounding box of a set of points.
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        let mut bounds = Self::EMPTY;
        for &(x, y) in points {
            bounds.extend_point(x, y);
        }
        bounds
    }

    /// Grow the box to include a point.
    pub fn extend_point(&mut self, x: f64, y: f64) {
        self.xmin = self.xmin.min(x);
        self.ymin = self.ymin.min(y);
        self.xmax = self.xmax.max(x);
        self.ymax = self.ymax.max(y);
    }

    /// Grow the box to include another box.
    pub fn extend(&mut self, other: &ProjectedBounds) {
        self.xmin = self.xmin.min(other.xmin);
        self.ymin = self.ymin.min(other.ymin);
        self.xmax = self.xmax.max(other.xmax);
        self.ymax = self.ymax.max(other.ymax);
    }

    /// Inclusive point test.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.xmin + self.xmax) / 2.0,
            (self.ymin + self.ymax) / 2.0,
        )
    }
}

/// Project a geographic coordinate to planar Web Mercator metres.
#[inline]
pub fn project(lon: f64, lat: f64) -> (f64, f64) {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = EARTH_RADIUS * lon.to_radians();
    let y = EARTH_RADIUS * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}

/// Projected corners of [`WORLD_BOUNDS`].
pub fn world_extent() -> ProjectedBounds {
    let (lon_min, lat_min, lon_max, lat_max) = WORLD_BOUNDS;
    let (xmin, ymin) = project(lon_min, lat_min);
    let (xmax, ymax) = project(lon_max, lat_max);
    ProjectedBounds {
        xmin,
        ymin,
        xmax,
        ymax,
    }
}
