//! Geospatial pipeline for the ASCII world map.
//!
//! ## Submodules
//!
//! - [`projection`]: Web Mercator forward projection and projected bounds
//! - [`store`]: GeoJSON loading into projected [`Polygon`]s ([`GeometryStore`])
//! - [`index`]: Bounding-box hierarchy answering point-in-land queries ([`SpatialIndex`])
//! - [`raster`]: Cached land/water grids with host markers ([`MapRasterizer`])
//!
//! ## Data Flow
//!
//! ```text
//! GeoJSON (lon/lat)
//!        │ project() once
//!        ▼
//! GeometryStore ──▶ SpatialIndex::build()
//!                          │
//!                          ▼
//! MapRasterizer::render(columns, rows, markers)
//!        │
//!        ├──▶ LandGrid (cached per size)
//!        └──▶ Grid (land/water + markers)
//! ```

pub mod index;
pub mod projection;
pub mod raster;
pub mod store;

pub use index::{PolygonId, SpatialIndex, SpatialIndexEntry};
pub use projection::{project, world_extent, ProjectedBounds, WORLD_BOUNDS};
pub use raster::{Cell, CellStyle, Grid, LandGrid, MapRasterizer, Marker, LAND_GLYPH, WATER_GLYPH};
pub use store::{GeometryStore, Polygon};
