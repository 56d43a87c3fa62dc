//! ASCII world-map rasterization with a per-size land/water cache.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::index::SpatialIndex;
use super::projection::{project, ProjectedBounds};
use super::store::GeometryStore;
use crate::error::{GeometryLoadError, MapError};
use crate::status::LatencyStatus;

/// Glyph drawn for land cells.
pub const LAND_GLYPH: char = '*';
/// Glyph drawn for water cells.
pub const WATER_GLYPH: char = ' ';

/// A host to place on the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub latitude: f64,
    pub longitude: f64,
    pub status: LatencyStatus,
}

impl Marker {
    pub fn new(latitude: f64, longitude: f64, status: LatencyStatus) -> Self {
        Self {
            latitude,
            longitude,
            status,
        }
    }
}

/// Style class of a rendered cell. Callers map these to terminal styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellStyle {
    Water,
    Land,
    Marker(LatencyStatus),
}

/// One rendered character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub style: CellStyle,
}

impl Cell {
    const WATER: Cell = Cell {
        glyph: WATER_GLYPH,
        style: CellStyle::Water,
    };
    const LAND: Cell = Cell {
        glyph: LAND_GLYPH,
        style: CellStyle::Land,
    };
}

/// Land/water classification for one canvas size. Row 0 is north.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandGrid {
    columns: usize,
    rows: usize,
    land: Vec<bool>,
}

impl LandGrid {
    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn is_land(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.columns && self.land[row * self.columns + col]
    }

    /// Number of land cells.
    pub fn land_count(&self) -> usize {
        self.land.iter().filter(|&&l| l).count()
    }
}

/// A rendered map: land/water cells with markers composited on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    columns: usize,
    rows: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        if row < self.rows && col < self.columns {
            self.cells.get(row * self.columns + col)
        } else {
            None
        }
    }

    /// Iterate rows from north to south.
    pub fn lines(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.columns)
    }

    /// Positions and statuses of every marker cell.
    pub fn markers(&self) -> Vec<(usize, usize, LatencyStatus)> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(i, cell)| match cell.style {
                CellStyle::Marker(status) => Some((i / self.columns, i % self.columns, status)),
                _ => None,
            })
            .collect()
    }

    /// Glyphs only, one line per row.
    pub fn to_plain_string(&self) -> String {
        let mut out = String::with_capacity((self.columns + 1) * self.rows);
        for (i, line) in self.lines().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.extend(line.iter().map(|c| c.glyph));
        }
        out
    }
}

/// Turns canvas sizes and markers into character grids.
///
/// Owns the geometry and its index. Land grids are computed once per
/// distinct `(columns, rows)` and kept for the rasterizer's lifetime.
#[derive(Debug)]
pub struct MapRasterizer {
    store: GeometryStore,
    index: SpatialIndex,
    cache: RwLock<HashMap<(u16, u16), Arc<LandGrid>>>,
}

impl MapRasterizer {
    /// Build a rasterizer over the given geometry.
    pub fn new(store: GeometryStore) -> Self {
        let index = SpatialIndex::build(store.polygons());
        Self {
            store,
            index,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Rasterizer over the bundled world land dataset.
    pub fn bundled() -> Result<Self, GeometryLoadError> {
        Ok(Self::new(GeometryStore::bundled()?))
    }

    pub fn store(&self) -> &GeometryStore {
        &self.store
    }

    /// Number of canvas sizes currently cached.
    pub fn cached_sizes(&self) -> usize {
        self.cache.read().len()
    }

    /// Render the map at `columns x rows` with `markers` on top.
    ///
    /// Markers outside the drawable extent are dropped. When two markers
    /// share a cell the later one wins.
    pub fn render(&self, columns: u16, rows: u16, markers: &[Marker]) -> Result<Grid, MapError> {
        let land = self.land_grid(columns, rows)?;

        let mut cells: Vec<Cell> = land
            .land
            .iter()
            .map(|&is_land| if is_land { Cell::LAND } else { Cell::WATER })
            .collect();

        for marker in markers {
            if let Some((row, col)) = self.cell_for(marker.latitude, marker.longitude, columns, rows)
            {
                cells[row * land.columns + col] = Cell {
                    glyph: marker.status.glyph(),
                    style: CellStyle::Marker(marker.status),
                };
            }
        }

        Ok(Grid {
            columns: land.columns,
            rows: land.rows,
            cells,
        })
    }

    /// The cached land/water grid for a canvas size, computing it on a miss.
    pub fn land_grid(&self, columns: u16, rows: u16) -> Result<Arc<LandGrid>, MapError> {
        if columns == 0 || rows == 0 {
            return Err(MapError::InvalidDimensions { columns, rows });
        }

        let key = (columns, rows);
        if let Some(grid) = self.cache.read().get(&key) {
            return Ok(grid.clone());
        }

        // Computed without holding the lock. Concurrent misses for the same
        // size produce identical grids; the first insert is kept.
        let grid = Arc::new(self.classify(columns as usize, rows as usize));
        tracing::debug!(columns, rows, land = grid.land_count(), "rasterized land grid");

        let mut cache = self.cache.write();
        Ok(cache.entry(key).or_insert(grid).clone())
    }

    /// Grid cell `(row, col)` for a geographic position, if it is on the canvas.
    pub fn cell_for(&self, latitude: f64, longitude: f64, columns: u16, rows: u16) -> Option<(usize, usize)> {
        if columns == 0 || rows == 0 {
            return None;
        }
        let extent = self.store.extent();
        let (pixel_width, pixel_height) = cell_size(&extent, columns as usize, rows as usize);
        let (x, y) = project(longitude, latitude);

        let col = ((x - extent.xmin) / pixel_width).floor();
        let row = ((extent.ymax - y) / pixel_height).floor();
        if col < 0.0 || row < 0.0 || col >= columns as f64 || row >= rows as f64 {
            return None;
        }
        Some((row as usize, col as usize))
    }

    fn classify(&self, columns: usize, rows: usize) -> LandGrid {
        let extent = self.store.extent();
        let (pixel_width, pixel_height) = cell_size(&extent, columns, rows);
        let polygons = self.store.polygons();

        let mut land = Vec::with_capacity(columns * rows);
        for row in 0..rows {
            let y = extent.ymax - (row as f64 + 0.5) * pixel_height;
            for col in 0..columns {
                let x = extent.xmin + (col as f64 + 0.5) * pixel_width;
                land.push(self.index.contains(polygons, x, y));
            }
        }

        LandGrid {
            columns,
            rows,
            land,
        }
    }
}

fn cell_size(extent: &ProjectedBounds, columns: usize, rows: usize) -> (f64, f64) {
    (extent.width() / columns as f64, extent.height() / rows as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rasterizer() -> MapRasterizer {
        MapRasterizer::bundled().unwrap()
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        let map = rasterizer();
        assert_eq!(
            map.render(0, 10, &[]),
            Err(MapError::InvalidDimensions { columns: 0, rows: 10 })
        );
        assert_eq!(
            map.render(10, 0, &[]),
            Err(MapError::InvalidDimensions { columns: 10, rows: 0 })
        );
        assert_eq!(map.cached_sizes(), 0);
    }

    #[test]
    fn land_grid_is_cached_per_size() {
        let map = rasterizer();
        let a = map.land_grid(80, 24).unwrap();
        let b = map.land_grid(80, 24).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(map.cached_sizes(), 1);

        let c = map.land_grid(40, 12).unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(map.cached_sizes(), 2);
    }

    #[test]
    fn markers_do_not_change_land_classification() {
        let map = rasterizer();
        let first = map
            .render(60, 20, &[Marker::new(40.0, -77.0, LatencyStatus::Good)])
            .unwrap();
        let second = map
            .render(60, 20, &[Marker::new(-33.9, 151.2, LatencyStatus::Down)])
            .unwrap();

        let land = map.land_grid(60, 20).unwrap();
        for row in 0..20 {
            for col in 0..60 {
                let a = first.get(row, col).unwrap();
                let b = second.get(row, col).unwrap();
                if a.style != CellStyle::Marker(LatencyStatus::Good)
                    && b.style != CellStyle::Marker(LatencyStatus::Down)
                {
                    assert_eq!(a, b);
                    assert_eq!(a.style == CellStyle::Land, land.is_land(row, col));
                }
            }
        }
        assert_eq!(map.cached_sizes(), 1);
    }

    #[test]
    fn origin_marker_lands_in_fixed_cell() {
        let map = rasterizer();
        let expected = map.cell_for(0.0, 0.0, 2, 2);
        assert_eq!(expected, Some((1, 1)));
        for _ in 0..5 {
            let grid = map
                .render(2, 2, &[Marker::new(0.0, 0.0, LatencyStatus::Good)])
                .unwrap();
            assert_eq!(grid.markers(), vec![(1, 1, LatencyStatus::Good)]);
        }
    }

    #[test]
    fn markers_outside_extent_are_dropped() {
        let map = rasterizer();
        let grid = map
            .render(
                40,
                20,
                &[
                    Marker::new(89.0, 0.0, LatencyStatus::Good),
                    Marker::new(-80.0, 0.0, LatencyStatus::Good),
                ],
            )
            .unwrap();
        assert!(grid.markers().is_empty());
    }

    #[test]
    fn later_marker_wins_shared_cell() {
        let map = rasterizer();
        let grid = map
            .render(
                10,
                5,
                &[
                    Marker::new(48.85, 2.29, LatencyStatus::Good),
                    Marker::new(48.86, 2.30, LatencyStatus::Down),
                ],
            )
            .unwrap();
        let markers = grid.markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].2, LatencyStatus::Down);
    }

    #[test]
    fn continents_are_land_and_oceans_are_water() {
        let map = rasterizer();
        let land = map.land_grid(120, 40).unwrap();

        let (row, col) = map.cell_for(-25.0, 134.0, 120, 40).unwrap();
        assert!(land.is_land(row, col), "central Australia");

        let (row, col) = map.cell_for(0.0, -150.0, 120, 40).unwrap();
        assert!(!land.is_land(row, col), "central Pacific");

        let (row, col) = map.cell_for(-40.0, -30.0, 120, 40).unwrap();
        assert!(!land.is_land(row, col), "south Atlantic");
    }

    #[test]
    fn plain_string_has_one_line_per_row() {
        let map = rasterizer();
        let grid = map.render(30, 7, &[]).unwrap();
        let text = grid.to_plain_string();
        assert_eq!(text.lines().count(), 7);
        assert!(text.lines().all(|l| l.chars().count() == 30));
        assert!(text.contains(LAND_GLYPH));
    }

    #[test]
    fn concurrent_misses_converge_on_one_grid() {
        let map = rasterizer();
        let grids: Vec<Arc<LandGrid>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4).map(|_| s.spawn(|| map.land_grid(50, 16).unwrap())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(grids.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(map.cached_sizes(), 1);
        let cached = map.land_grid(50, 16).unwrap();
        assert_eq!(*cached, *grids[0]);
    }

    #[test]
    fn empty_store_renders_all_water() {
        let map = MapRasterizer::new(GeometryStore::from_polygons(Vec::new()));
        let grid = map.render(8, 4, &[]).unwrap();
        assert!(grid.lines().flatten().all(|c| c.style == CellStyle::Water));
    }
}
