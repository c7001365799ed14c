//! # Vision Tracer
//!
//! Casts a fan of rays from a player's eye position across their field of
//! view and step-marches each ray through the navigation mesh, collecting
//! every region a ray passes through until the ray leaves the mesh (a wall)
//! or enters a smoke cloud.
//!
//! ## Algorithm
//! 1. Resolve the player's starting region: containing region, else nearest
//!    by center distance. Irresolvable positions yield an empty result.
//! 2. Build the ray fan: the straight-ahead yaw first, then evenly spaced
//!    angles across `[yaw - fov/2, yaw + fov/2]`.
//! 3. March each ray in `step_size` increments at the player's elevation.
//!    A step inside a smoke cube ends the ray; a step outside every region
//!    is the wall collision and ends the ray there.

use fxhash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AnalysisError, Result};
use crate::geom::Position;
use crate::models::{Frame, PlayerFrameState};
use crate::nav::NavGraph;

/// Half-extent of a smoke cloud's occlusion cube, world units.
pub const SMOKE_RADIUS: f64 = 144.0;

/// Default vision cone width, degrees.
pub const DEFAULT_FOV_DEGREES: f64 = 90.0;

/// Default ray count across the cone.
pub const DEFAULT_RAY_COUNT: u32 = 30;

/// Default march increment, world units.
pub const DEFAULT_STEP_SIZE: f64 = 20.0;

/// Ray-fan parameters. More rays and smaller steps trade speed for accuracy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceConfig {
    fov_degrees: f64,
    ray_count: u32,
    step_size: f64,
}

impl TraceConfig {
    /// Rejects parameters outside `fov in (0, 360]`, `ray_count >= 1`,
    /// `step_size > 0`. These are caller bugs, not data anomalies.
    pub fn new(fov_degrees: f64, ray_count: u32, step_size: f64) -> Result<Self> {
        if !(fov_degrees > 0.0 && fov_degrees <= 360.0) {
            return Err(AnalysisError::InvalidTraceConfig(format!(
                "fov must be in (0, 360] degrees, got {fov_degrees}"
            )));
        }
        if ray_count < 1 {
            return Err(AnalysisError::InvalidTraceConfig(
                "ray count must be at least 1".to_string(),
            ));
        }
        if !(step_size > 0.0) {
            return Err(AnalysisError::InvalidTraceConfig(format!(
                "step size must be positive, got {step_size}"
            )));
        }
        Ok(Self { fov_degrees, ray_count, step_size })
    }

    pub fn fov_degrees(&self) -> f64 {
        self.fov_degrees
    }

    pub fn ray_count(&self) -> u32 {
        self.ray_count
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            fov_degrees: DEFAULT_FOV_DEGREES,
            ray_count: DEFAULT_RAY_COUNT,
            step_size: DEFAULT_STEP_SIZE,
        }
    }
}

/// What one player can see in one frame. Index 0 of both `angles_traced` and
/// `end_points` is the straight-ahead ray, where the player is aiming.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionTraceResults {
    /// Traced ray angles, degrees.
    pub angles_traced: Vec<f64>,
    /// Terminal point per ray, ordered like `angles_traced`.
    pub end_points: Vec<Position>,
    /// Every region some ray passed through, plus the starting region.
    pub visible_region_ids: FxHashSet<u32>,
}

impl VisionTraceResults {
    pub fn is_empty(&self) -> bool {
        self.angles_traced.is_empty() && self.visible_region_ids.is_empty()
    }
}

/// Whether a point sits inside any active smoke's occlusion cube: within
/// `SMOKE_RADIUS` on all three axes simultaneously, bounds inclusive.
#[inline]
pub fn point_in_smoke(frame: &Frame, point: Position) -> bool {
    frame.smokes.iter().any(|smoke| {
        (point.x - smoke.x).abs() <= SMOKE_RADIUS
            && (point.y - smoke.y).abs() <= SMOKE_RADIUS
            && (point.z - smoke.z).abs() <= SMOKE_RADIUS
    })
}

/// Traces the player's vision cone through the navigation mesh.
///
/// A player whose position resolves to no region at all (malformed
/// coordinates, empty mesh) gets an empty result, never an error.
pub fn trace_vision(
    player: &PlayerFrameState,
    frame: &Frame,
    nav: &NavGraph,
    config: &TraceConfig,
) -> VisionTraceResults {
    let origin = player.position();
    if !origin.is_finite() || nav.is_empty() {
        warn!(
            steam_id = player.steam_id,
            "vision trace skipped: unresolvable player position"
        );
        return VisionTraceResults::default();
    }

    let start_region = match nav.regions_at(origin).first().copied() {
        Some(id) => id,
        None => match nav.nearest_region(origin) {
            Some(region) => {
                debug!(
                    steam_id = player.steam_id,
                    region_id = region.id,
                    "player position outside mesh, using nearest region"
                );
                region.id
            }
            None => {
                warn!(
                    steam_id = player.steam_id,
                    "vision trace skipped: no region resolvable"
                );
                return VisionTraceResults::default();
            }
        },
    };

    let mut results = VisionTraceResults::default();
    results.visible_region_ids.insert(start_region);

    // Straight-ahead first, then the fan across [yaw - fov/2, yaw + fov/2]
    // with both edges included.
    results.angles_traced.push(player.view_x);
    let half_fov = config.fov_degrees / 2.0;
    let spacing = config.fov_degrees / config.ray_count as f64;
    for i in 0..=config.ray_count {
        results.angles_traced.push(player.view_x - half_fov + i as f64 * spacing);
    }

    for i in 0..results.angles_traced.len() {
        let angle = results.angles_traced[i].to_radians();
        let end_point = march_ray(
            origin,
            angle,
            start_region,
            frame,
            nav,
            config.step_size,
            &mut results.visible_region_ids,
        );
        results.end_points.push(end_point);
    }

    results
}

/// Steps one ray outward until it is occluded by smoke or leaves every
/// region. Returns the terminal point; touched regions accumulate into
/// `visible`.
fn march_ray(
    origin: Position,
    angle_radians: f64,
    start_region: u32,
    frame: &Frame,
    nav: &NavGraph,
    step_size: f64,
    visible: &mut FxHashSet<u32>,
) -> Position {
    let dx = angle_radians.cos() * step_size;
    let dy = angle_radians.sin() * step_size;

    let mut point = origin;
    let mut current_region = start_region;
    let mut steps: u64 = 0;
    loop {
        if point_in_smoke(frame, point) {
            return point;
        }
        let in_current = nav
            .region(current_region)
            .is_some_and(|r| r.contains(point));
        if !in_current {
            let containing = nav.regions_at(point);
            match containing.last() {
                Some(&last) => {
                    visible.extend(containing.iter().copied());
                    current_region = last;
                }
                // Outside every region: the wall collision.
                None => return point,
            }
        }
        steps += 1;
        point = Position::new(
            origin.x + steps as f64 * dx,
            origin.y + steps as f64 * dy,
            origin.z,
        );
    }
}
