//! Uniform spatial index over region bounds.
//!
//! Point-in-region queries run once per ray step, so the lookup must not scan
//! every region. Cells hold the ids of all regions whose bounds overlap them;
//! a query reads one cell and the caller filters with the exact edge-inclusive
//! containment test, so results match a full scan.

use fxhash::FxHashMap;

use crate::nav::NavRegion;

/// Cells per axis. Maps top out at a few thousand regions, so 64x64 keeps
/// cell occupancy in the single digits.
const GRID_CELLS_PER_AXIS: usize = 64;

#[derive(Debug, Clone)]
pub(crate) struct RegionGrid {
    min_x: f64,
    min_y: f64,
    cell_width: f64,
    cell_height: f64,
    cols: usize,
    rows: usize,
    cells: Vec<Vec<u32>>,
}

impl RegionGrid {
    pub(crate) fn build(regions: &FxHashMap<u32, NavRegion>) -> Self {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for region in regions.values() {
            let (lo_x, hi_x) = ordered(region.north_west.x, region.south_east.x);
            let (lo_y, hi_y) = ordered(region.north_west.y, region.south_east.y);
            min_x = min_x.min(lo_x);
            min_y = min_y.min(lo_y);
            max_x = max_x.max(hi_x);
            max_y = max_y.max(hi_y);
        }

        if regions.is_empty() || !min_x.is_finite() || !min_y.is_finite() {
            return Self {
                min_x: 0.0,
                min_y: 0.0,
                cell_width: 1.0,
                cell_height: 1.0,
                cols: 0,
                rows: 0,
                cells: Vec::new(),
            };
        }

        let cols = GRID_CELLS_PER_AXIS;
        let rows = GRID_CELLS_PER_AXIS;
        // Degenerate extents (all regions on one line) still need a nonzero
        // cell size.
        let cell_width = ((max_x - min_x) / cols as f64).max(f64::MIN_POSITIVE);
        let cell_height = ((max_y - min_y) / rows as f64).max(f64::MIN_POSITIVE);

        let mut grid = Self {
            min_x,
            min_y,
            cell_width,
            cell_height,
            cols,
            rows,
            cells: vec![Vec::new(); cols * rows],
        };

        let mut ids: Vec<u32> = regions.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            let region = &regions[&id];
            let (lo_x, hi_x) = ordered(region.north_west.x, region.south_east.x);
            let (lo_y, hi_y) = ordered(region.north_west.y, region.south_east.y);
            let col_lo = grid.col_of(lo_x);
            let col_hi = grid.col_of(hi_x);
            let row_lo = grid.row_of(lo_y);
            let row_hi = grid.row_of(hi_y);
            for row in row_lo..=row_hi {
                for col in col_lo..=col_hi {
                    grid.cells[row * grid.cols + col].push(id);
                }
            }
        }

        grid
    }

    /// Region ids whose bounds overlap the cell containing the point, sorted
    /// ascending. A superset of the regions actually containing the point.
    pub(crate) fn candidates(&self, x: f64, y: f64) -> &[u32] {
        if self.cells.is_empty() || !x.is_finite() || !y.is_finite() {
            return &[];
        }
        let col = self.col_of(x);
        let row = self.row_of(y);
        &self.cells[row * self.cols + col]
    }

    #[inline]
    fn col_of(&self, x: f64) -> usize {
        (((x - self.min_x) / self.cell_width) as usize).min(self.cols - 1)
    }

    #[inline]
    fn row_of(&self, y: f64) -> usize {
        (((y - self.min_y) / self.cell_height) as usize).min(self.rows - 1)
    }
}

#[inline]
fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Position;

    fn square(id: u32, x: f64, y: f64, size: f64) -> NavRegion {
        NavRegion::new(
            id,
            Position::new(x, y + size, 0.0),
            Position::new(x + size, y, 0.0),
        )
    }

    fn region_map(regions: Vec<NavRegion>) -> FxHashMap<u32, NavRegion> {
        regions.into_iter().map(|r| (r.id, r)).collect()
    }

    #[test]
    fn test_candidates_cover_containing_regions() {
        let regions = region_map(vec![
            square(1, 0.0, 0.0, 100.0),
            square(2, 100.0, 0.0, 100.0),
            square(3, 900.0, 900.0, 100.0),
        ]);
        let grid = RegionGrid::build(&regions);

        for (x, y) in [(50.0, 50.0), (100.0, 50.0), (150.0, 50.0), (950.0, 950.0)] {
            let candidates = grid.candidates(x, y);
            for region in regions.values() {
                if region.contains(Position::new(x, y, 0.0)) {
                    assert!(
                        candidates.contains(&region.id),
                        "grid at ({x}, {y}) dropped containing region {}",
                        region.id
                    );
                }
            }
        }
    }

    #[test]
    fn test_candidates_outside_bounds() {
        let grid = RegionGrid::build(&region_map(vec![square(1, 0.0, 0.0, 100.0)]));
        // Clamped to an edge cell; exact containment is the caller's filter.
        assert_eq!(grid.candidates(-500.0, -500.0), &[1]);
    }

    #[test]
    fn test_empty_and_nonfinite() {
        let grid = RegionGrid::build(&FxHashMap::default());
        assert!(grid.candidates(0.0, 0.0).is_empty());

        let grid = RegionGrid::build(&region_map(vec![square(1, 0.0, 0.0, 100.0)]));
        assert!(grid.candidates(f64::NAN, 0.0).is_empty());
    }
}
