//! Static bounding-box hierarchy over projected polygons.
//!
//! The tree is bulk-loaded once with Sort-Tile-Recursive packing and never
//! mutated afterwards, so it can be shared freely between readers. It owns no
//! polygon data: leaves refer to polygons by their position in the store.

use super::projection::ProjectedBounds;
use super::store::Polygon;

/// Maximum children per node.
const NODE_CAPACITY: usize = 8;

/// Position of a polygon in the slice the index was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolygonId(pub usize);

/// A leaf entry: bounds plus a non-owning polygon reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialIndexEntry {
    pub bounds: ProjectedBounds,
    pub id: PolygonId,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        bounds: ProjectedBounds,
        entries: Vec<SpatialIndexEntry>,
    },
    Branch {
        bounds: ProjectedBounds,
        children: Vec<Node>,
    },
}

impl Node {
    fn bounds(&self) -> &ProjectedBounds {
        match self {
            Node::Leaf { bounds, .. } | Node::Branch { bounds, .. } => bounds,
        }
    }
}

/// Read-only point query index.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    root: Option<Node>,
    len: usize,
}

impl SpatialIndex {
    /// Bulk-load an index over `polygons`.
    pub fn build(polygons: &[Polygon]) -> Self {
        let entries: Vec<SpatialIndexEntry> = polygons
            .iter()
            .enumerate()
            .map(|(i, p)| SpatialIndexEntry {
                bounds: *p.bounds(),
                id: PolygonId(i),
            })
            .collect();
        let len = entries.len();

        if entries.is_empty() {
            return Self { root: None, len };
        }

        let mut level: Vec<Node> = str_pack(entries, |e| e.bounds)
            .into_iter()
            .map(|group| Node::Leaf {
                bounds: union(group.iter().map(|e| &e.bounds)),
                entries: group,
            })
            .collect();

        while level.len() > 1 {
            level = str_pack(level, |n| *n.bounds())
                .into_iter()
                .map(|group| Node::Branch {
                    bounds: union(group.iter().map(Node::bounds)),
                    children: group,
                })
                .collect();
        }

        Self {
            root: level.pop(),
            len,
        }
    }

    /// Number of indexed polygons.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Ids of polygons whose bounding box contains the point.
    pub fn candidates(&self, x: f64, y: f64) -> Vec<PolygonId> {
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            visit(root, x, y, &mut |entry: &SpatialIndexEntry| {
                out.push(entry.id);
                false
            });
        }
        out
    }

    /// True if any polygon's boundary or interior contains the point.
    ///
    /// `polygons` must be the slice the index was built from.
    pub fn contains(&self, polygons: &[Polygon], x: f64, y: f64) -> bool {
        let Some(root) = &self.root else {
            return false;
        };
        visit(root, x, y, &mut |entry: &SpatialIndexEntry| {
            polygons.get(entry.id.0).is_some_and(|p| p.contains(x, y))
        })
    }
}

/// Depth-first walk over entries whose bounds contain the point.
///
/// Stops as soon as `hit` returns true and reports whether it did.
fn visit<F>(node: &Node, x: f64, y: f64, hit: &mut F) -> bool
where
    F: FnMut(&SpatialIndexEntry) -> bool,
{
    if !node.bounds().contains(x, y) {
        return false;
    }
    match node {
        Node::Leaf { entries, .. } => entries
            .iter()
            .filter(|e| e.bounds.contains(x, y))
            .any(|e| hit(e)),
        Node::Branch { children, .. } => children.iter().any(|c| visit(c, x, y, hit)),
    }
}

fn union<'a, I>(boxes: I) -> ProjectedBounds
where
    I: Iterator<Item = &'a ProjectedBounds>,
{
    let mut out = ProjectedBounds::EMPTY;
    for b in boxes {
        out.extend(b);
    }
    out
}

/// Sort-Tile-Recursive grouping into runs of at most `NODE_CAPACITY`.
fn str_pack<T, F>(mut items: Vec<T>, bounds_of: F) -> Vec<Vec<T>>
where
    F: Fn(&T) -> ProjectedBounds,
{
    let leaf_count = items.len().div_ceil(NODE_CAPACITY);
    let slice_count = (leaf_count as f64).sqrt().ceil().max(1.0) as usize;
    let slice_len = slice_count * NODE_CAPACITY;

    items.sort_by(|a, b| bounds_of(a).center().0.total_cmp(&bounds_of(b).center().0));

    let mut groups = Vec::with_capacity(leaf_count);
    let mut rest = items;
    while !rest.is_empty() {
        let tail = rest.split_off(slice_len.min(rest.len()));
        let mut slice = rest;
        rest = tail;

        slice.sort_by(|a, b| bounds_of(a).center().1.total_cmp(&bounds_of(b).center().1));
        while !slice.is_empty() {
            let tail = slice.split_off(NODE_CAPACITY.min(slice.len()));
            groups.push(slice);
            slice = tail;
        }
    }
    groups
}
