//! # Data Model
//!
//! Typed representations of a match as supplied by the demo-parsing
//! collaborator: rounds, frames, per-team and per-player frame state, and the
//! discrete event logs. Field vocabulary (serde names and units) mirrors the
//! collaborator's demo schema exactly.

pub mod demo;
pub mod frame;
pub mod side;

pub use demo::{
    BombEvent, Damage, Demo, Flash, Grenade, Kill, PlayerConnection, RosterPlayer, Round, Team,
    WeaponFire,
};
pub use frame::{
    Bomb, Fire, Frame, PlayerFrameState, Projectile, Smoke, TeamFrameState, Weapon,
};
pub use side::Side;
