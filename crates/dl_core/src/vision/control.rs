//! # Vision/Control Aggregator
//!
//! Merges per-player vision traces into per-region observation state for one
//! frame, resolves each region's controlling side by majority vote of living
//! observers, and sums controlled footprint per side.
//!
//! Observation state lives in a [`VisionGraph`] value built fresh per frame,
//! never on the shared [`NavGraph`], so no stale annotation can leak from one
//! frame into the next.

use fxhash::{FxHashMap, FxHashSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Frame, PlayerFrameState, Round, Side};
use crate::nav::NavGraph;
use crate::vision::tracer::{trace_vision, TraceConfig, VisionTraceResults};

/// Per-region observation state for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionAnnotation {
    /// Steam ids of every player with the region in their visible set.
    pub observed_by: FxHashSet<u64>,
    /// Majority side among living observers, `None` on any tie.
    pub controlling_side: Option<Side>,
}

/// One frame's observation annotations over a map's regions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionGraph {
    annotations: FxHashMap<u32, RegionAnnotation>,
}

impl VisionGraph {
    /// A fresh, unobserved annotation per region of the graph.
    pub fn for_nav(nav: &NavGraph) -> Self {
        Self {
            annotations: nav
                .regions()
                .map(|r| (r.id, RegionAnnotation::default()))
                .collect(),
        }
    }

    pub fn annotation(&self, region_id: u32) -> Option<&RegionAnnotation> {
        self.annotations.get(&region_id)
    }

    pub fn controlling_side(&self, region_id: u32) -> Option<Side> {
        self.annotations.get(&region_id).and_then(|a| a.controlling_side)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &RegionAnnotation)> {
        self.annotations.iter().map(|(id, a)| (*id, a))
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}

/// Aggregate controlled footprint per side. Both sides are always present;
/// an uncontested map reads zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlledAreas {
    pub ct: f64,
    pub t: f64,
}

impl ControlledAreas {
    pub fn side(&self, side: Side) -> f64 {
        match side {
            Side::Ct => self.ct,
            Side::T => self.t,
        }
    }
}

/// Traces every living player in the frame and unions their visible sets
/// into per-region observed-by sets.
///
/// Returns the fresh annotation graph and each player's full trace, keyed by
/// steam id, for consumers that need the ray geometry.
pub fn build_vision_graph(
    frame: &Frame,
    nav: &NavGraph,
    config: &TraceConfig,
) -> (VisionGraph, FxHashMap<u64, VisionTraceResults>) {
    let living: Vec<&PlayerFrameState> = frame.living_players().collect();

    // Traces only read frame/nav data, so the per-player fan-out is safe.
    let traces: Vec<(u64, VisionTraceResults)> = living
        .par_iter()
        .map(|player| (player.steam_id, trace_vision(player, frame, nav, config)))
        .collect();

    let mut graph = VisionGraph::for_nav(nav);
    for (steam_id, results) in &traces {
        for region_id in &results.visible_region_ids {
            if let Some(annotation) = graph.annotations.get_mut(region_id) {
                annotation.observed_by.insert(*steam_id);
            }
        }
    }

    debug!(
        tick = frame.tick,
        players = traces.len(),
        regions = graph.len(),
        "vision graph built"
    );
    (graph, traces.into_iter().collect())
}

/// Resolves each region's controlling side from its observed-by set: strict
/// majority of living observers, `None` on any tie including zero-zero.
///
/// A pure per-region decision; control never spreads to neighboring regions.
pub fn grow_controlled_areas(frame: &Frame, graph: &mut VisionGraph) {
    let alive_ct: FxHashSet<u64> = alive_ids(frame, Side::Ct);
    let alive_t: FxHashSet<u64> = alive_ids(frame, Side::T);

    for annotation in graph.annotations.values_mut() {
        let mut ct_count = 0usize;
        let mut t_count = 0usize;
        for observer in &annotation.observed_by {
            if alive_ct.contains(observer) {
                ct_count += 1;
            } else if alive_t.contains(observer) {
                t_count += 1;
            }
        }
        annotation.controlling_side = match ct_count.cmp(&t_count) {
            std::cmp::Ordering::Greater => Some(Side::Ct),
            std::cmp::Ordering::Less => Some(Side::T),
            std::cmp::Ordering::Equal => None,
        };
    }
}

fn alive_ids(frame: &Frame, side: Side) -> FxHashSet<u64> {
    let team = match side {
        Side::Ct => &frame.ct,
        Side::T => &frame.t,
    };
    team.players
        .iter()
        .filter(|p| p.hp > 0)
        .map(|p| p.steam_id)
        .collect()
}

/// Sums each side's controlled region footprint.
pub fn controlled_area_sizes(graph: &VisionGraph, nav: &NavGraph) -> ControlledAreas {
    let mut areas = ControlledAreas::default();
    for (region_id, annotation) in graph.iter() {
        let Some(region) = nav.region(region_id) else {
            continue;
        };
        match annotation.controlling_side {
            Some(Side::Ct) => areas.ct += region.area(),
            Some(Side::T) => areas.t += region.area(),
            None => {}
        }
    }
    areas
}

/// The per-round controlled-area time series: one sample per frame, keyed by
/// the frame's tick, in frame order.
pub fn control_series(
    round: &Round,
    nav: &NavGraph,
    config: &TraceConfig,
) -> Vec<(i64, ControlledAreas)> {
    round
        .frames
        .iter()
        .map(|frame| {
            let (mut graph, _) = build_vision_graph(frame, nav, config);
            grow_controlled_areas(frame, &mut graph);
            (frame.tick, controlled_area_sizes(&graph, nav))
        })
        .collect()
}
