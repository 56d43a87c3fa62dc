//! Error types for the laglens engine.

use thiserror::Error;

/// Errors that can occur while loading land geometry.
///
/// These are fatal at startup: there is no map without geometry.
#[derive(Debug, Error)]
pub enum GeometryLoadError {
    /// The geometry file could not be read.
    #[error("Failed to read geometry source: {0}")]
    Io(#[from] std::io::Error),

    /// The source is not valid GeoJSON.
    #[error("Failed to parse geometry source: {0}")]
    Parse(#[from] serde_json::Error),

    /// A feature uses a geometry type other than Polygon or MultiPolygon.
    #[error("Feature {feature} has unsupported geometry type {kind:?}")]
    UnsupportedGeometry { feature: usize, kind: String },

    /// A ring has too few positions to enclose any area.
    #[error("Feature {feature} contains a ring with {positions} positions (need at least 3)")]
    InvalidRing { feature: usize, positions: usize },
}

/// Errors returned by the map rasterizer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    /// The requested canvas has a zero dimension.
    #[error("Invalid canvas dimensions {columns}x{rows}: both must be greater than zero")]
    InvalidDimensions { columns: u16, rows: u16 },
}

/// Errors returned when adding a host to the registry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HostError {
    /// A host with this name is already registered.
    #[error("Host with name '{0}' already exists")]
    DuplicateName(String),

    /// A host with this address is already registered.
    #[error("Host with address {0} already exists")]
    DuplicateAddress(String),

    /// A required field was left empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Latitude outside [-90, 90].
    #[error("Latitude must be between -90 and 90 (got {0})")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180].
    #[error("Longitude must be between -180 and 180 (got {0})")]
    InvalidLongitude(f64),
}

impl HostError {
    /// Returns true if this error is a name or address collision.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, HostError::DuplicateName(_) | HostError::DuplicateAddress(_))
    }
}
