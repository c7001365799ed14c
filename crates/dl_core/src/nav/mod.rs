//! # Navigation Mesh
//!
//! Typed view of a map's walkable-space partition: convex axis-aligned
//! regions plus the adjacency graph over them. Built once per map from the
//! static map-data collaborator's listing and read-only afterwards; per-frame
//! observation state lives in [`crate::vision::VisionGraph`], never here.

mod grid;

use fxhash::FxHashMap;
use pathfinding::prelude::bfs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AnalysisError, Result};
use crate::geom::{point_in_rect, Position};
use grid::RegionGrid;

/// One convex axis-aligned cell of the walkable-space partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavRegion {
    pub id: u32,
    pub north_west: Position,
    pub south_east: Position,
}

impl NavRegion {
    pub fn new(id: u32, north_west: Position, south_east: Position) -> Self {
        Self { id, north_west, south_east }
    }

    /// Edge-inclusive 2D containment. Z bounds are kept for consumers that
    /// need elevation but do not gate containment.
    #[inline]
    pub fn contains(&self, point: Position) -> bool {
        point_in_rect(
            (point.x, point.y),
            (self.north_west.x, self.north_west.y),
            (self.south_east.x, self.south_east.y),
        )
    }

    pub fn center(&self) -> Position {
        Position::new(
            (self.north_west.x + self.south_east.x) / 2.0,
            (self.north_west.y + self.south_east.y) / 2.0,
            (self.north_west.z + self.south_east.z) / 2.0,
        )
    }

    /// 2D footprint, the size metric controlled-area sums use.
    #[inline]
    pub fn area(&self) -> f64 {
        (self.south_east.x - self.north_west.x).abs()
            * (self.south_east.y - self.north_west.y).abs()
    }
}

/// The region set and adjacency for one map. One instance per map name,
/// shared read-only across every frame computation on that map.
#[derive(Debug, Clone)]
pub struct NavGraph {
    regions: FxHashMap<u32, NavRegion>,
    adjacency: FxHashMap<u32, Vec<u32>>,
    grid: RegionGrid,
}

impl NavGraph {
    /// Builds the graph from a region listing and undirected adjacency pairs.
    ///
    /// An edge naming a region absent from the listing is an upstream data
    /// contract violation and fails loudly.
    pub fn from_regions(
        regions: Vec<NavRegion>,
        adjacency: &[(u32, u32)],
    ) -> Result<Self> {
        let regions: FxHashMap<u32, NavRegion> =
            regions.into_iter().map(|r| (r.id, r)).collect();

        let mut edges: FxHashMap<u32, Vec<u32>> = FxHashMap::default();
        for &(a, b) in adjacency {
            for id in [a, b] {
                if !regions.contains_key(&id) {
                    return Err(AnalysisError::UnknownNavRegion { region_id: id });
                }
            }
            edges.entry(a).or_default().push(b);
            edges.entry(b).or_default().push(a);
        }
        for neighbors in edges.values_mut() {
            neighbors.sort_unstable();
            neighbors.dedup();
        }

        let grid = RegionGrid::build(&regions);
        Ok(Self { regions, adjacency: edges, grid })
    }

    pub fn region(&self, id: u32) -> Option<&NavRegion> {
        self.regions.get(&id)
    }

    pub fn contains_id(&self, id: u32) -> bool {
        self.regions.contains_key(&id)
    }

    pub fn regions(&self) -> impl Iterator<Item = &NavRegion> {
        self.regions.values()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn neighbors(&self, id: u32) -> &[u32] {
        self.adjacency.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All regions containing the point, edge ties included, ascending by id.
    pub fn regions_at(&self, point: Position) -> Vec<u32> {
        // Grid candidates are sorted at build time; filtering keeps the order.
        self.grid
            .candidates(point.x, point.y)
            .iter()
            .copied()
            .filter(|id| self.regions[id].contains(point))
            .collect()
    }

    /// The region whose center is closest to the point; never fails on a
    /// non-empty graph. Ties resolve to the smaller id.
    pub fn nearest_region(&self, point: Position) -> Option<&NavRegion> {
        if !point.is_finite() {
            return None;
        }
        self.regions.values().min_by(|a, b| {
            let da = a.center().distance_to(point);
            let db = b.center().distance_to(point);
            da.partial_cmp(&db)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        })
    }

    /// Shortest hop path over adjacency, endpoints included. `None` when the
    /// regions are unreachable from each other; callers skip that pair's
    /// contribution.
    pub fn region_path(&self, from: u32, to: u32) -> Option<Vec<u32>> {
        if !self.regions.contains_key(&from) || !self.regions.contains_key(&to) {
            warn!(from, to, "path query names an unknown region");
            return None;
        }
        let path = bfs(
            &from,
            |id| self.neighbors(*id).to_vec(),
            |id| *id == to,
        );
        if path.is_none() {
            warn!(from, to, "no path between regions");
        }
        path
    }

    /// Sum of every region's footprint.
    pub fn total_area(&self) -> f64 {
        self.regions.values().map(NavRegion::area).sum()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A 3x1 strip of adjacent 100-unit square regions along +x, ids 1..=3.
    pub fn strip_graph() -> NavGraph {
        NavGraph::from_regions(
            vec![
                square(1, 0.0, 0.0, 100.0),
                square(2, 100.0, 0.0, 100.0),
                square(3, 200.0, 0.0, 100.0),
            ],
            &[(1, 2), (2, 3)],
        )
        .expect("strip graph is well formed")
    }

    pub fn square(id: u32, x: f64, y: f64, size: f64) -> NavRegion {
        NavRegion::new(
            id,
            Position::new(x, y + size, 0.0),
            Position::new(x + size, y, 0.0),
        )
    }
}
