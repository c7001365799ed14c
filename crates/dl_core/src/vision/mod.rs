//! # Vision Engine
//!
//! Derives territorial state from one frame of player telemetry: who can see
//! which navigation regions ([`tracer`]) and which side therefore controls
//! them ([`control`]).

pub mod control;
pub mod tracer;

pub use control::{
    build_vision_graph, control_series, controlled_area_sizes, grow_controlled_areas,
    ControlledAreas, RegionAnnotation, VisionGraph,
};
pub use tracer::{
    point_in_smoke, trace_vision, TraceConfig, VisionTraceResults, DEFAULT_FOV_DEGREES,
    DEFAULT_RAY_COUNT, DEFAULT_STEP_SIZE, SMOKE_RADIUS,
};
