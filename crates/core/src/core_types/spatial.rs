use crate::core_types::vec2::Vec2;
use rustc_hash::FxHashMap;

/// Cells a radius query may visit before it falls back to a full scan
const SQUARE_SCAN_LIMIT: u64 = 1024;

/// Spatial index using a Morton-keyed hash grid for fast neighbor queries
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cells: FxHashMap<u64, Vec<u32>>,
    cell_size: f32,
    origin: Vec2,
}

impl SpatialIndex {
    /// Create a new spatial index anchored at `origin`
    pub fn new(origin: Vec2, cell_size: f32) -> Self {
        SpatialIndex {
            cells: FxHashMap::default(),
            cell_size: cell_size.max(f32::EPSILON),
            origin,
        }
    }

    fn cell_coords(&self, pos: Vec2) -> (i32, i32) {
        let ix = ((pos.x - self.origin.x) / self.cell_size).floor() as i32;
        let iy = ((pos.y - self.origin.y) / self.cell_size).floor() as i32;
        (ix, iy)
    }

    /// Insert an element into the spatial index
    pub fn insert(&mut self, id: u32, position: Vec2) {
        let (ix, iy) = self.cell_coords(position);
        self.cells.entry(morton_encode(ix, iy)).or_default().push(id);
    }

    /// Remove an element from the spatial index
    pub fn remove(&mut self, id: u32, position: Vec2) {
        let (ix, iy) = self.cell_coords(position);
        let hash = morton_encode(ix, iy);
        if let Some(cell) = self.cells.get_mut(&hash) {
            cell.retain(|&x| x != id);
            if cell.is_empty() {
                self.cells.remove(&hash);
            }
        }
    }

    /// Query all elements in cells overlapping the square around `pos`.
    ///
    /// Candidates are a superset of the elements within `radius`; callers
    /// still check exact distances.
    pub fn query_radius(&self, pos: Vec2, radius: f32) -> Vec<u32> {
        let reach = (radius.max(0.0) / self.cell_size).ceil() as i32;

        // Past this many cells the square costs more than visiting every occupied cell
        let side = 2 * u64::from(reach.unsigned_abs()) + 1;
        let limit = (self.cells.len() as u64).max(SQUARE_SCAN_LIMIT);
        if side.saturating_mul(side) > limit {
            return self.cells.values().flatten().copied().collect();
        }

        let (cx, cy) = self.cell_coords(pos);
        let mut results = Vec::new();
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                let key = morton_encode(cx.saturating_add(dx), cy.saturating_add(dy));
                if let Some(elements) = self.cells.get(&key) {
                    results.extend(elements);
                }
            }
        }

        results
    }

    /// Drop every element
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Get number of elements in the index
    pub fn element_count(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }
}

/// Morton encode 2D cell coordinates into a single 64-bit key
fn morton_encode(x: i32, y: i32) -> u64 {
    // Reinterpret as unsigned so negative cells still get distinct keys
    let x = u64::from(x as u32);
    let y = u64::from(y as u32);

    let mut result = 0u64;
    for i in 0..32 {
        result |= (((x >> i) & 1) << (2 * i)) | (((y >> i) & 1) << (2 * i + 1));
    }

    result
}
