#![recursion_limit = "256"]
//! # dl_core - Tactical-State Derivation Engine
//!
//! Derives tactical state from recorded competitive-match telemetry: for
//! every sampled frame, which map regions each side can see or occupy, and
//! for every round, a chronological account of notable game events.
//!
//! ## Features
//! - Vision tracing: per-player ray fans over the navigation mesh with smoke
//!   occlusion
//! - Territorial control: per-region majority vote over living observers and
//!   controlled-area sums per side
//! - Timeline synthesis: discrete log translation plus frame-pair diffing
//!   into one tick-sorted event sequence
//! - Pure, deterministic, in-memory transforms over already-parsed data; no
//!   I/O anywhere in the core
//!
//! The demo model (rounds, frames, player states) arrives from a demo-parsing
//! collaborator and the navigation mesh from a static map-data collaborator;
//! both are consumed, never produced, here.

pub mod error;
pub mod geom;
pub mod models;
pub mod nav;
pub mod timeline;
pub mod vision;

pub use error::{AnalysisError, Result};
pub use geom::{Position, ViewAngles};
pub use models::{
    Bomb, BombEvent, Damage, Demo, Fire, Flash, Frame, Grenade, Kill, PlayerConnection,
    PlayerFrameState, Projectile, RosterPlayer, Round, Side, Smoke, Team, TeamFrameState, Weapon,
};
pub use nav::{NavGraph, NavRegion};
pub use timeline::{
    synthesize_match, synthesize_round, Event, EventMeta, Timeline,
};
pub use vision::{
    build_vision_graph, control_series, controlled_area_sizes, grow_controlled_areas,
    trace_vision, ControlledAreas, TraceConfig, VisionGraph, VisionTraceResults,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
