//! # Event Timeline
//!
//! The typed event vocabulary ([`event`]) and the synthesizer that derives a
//! tick-sorted timeline from a round's logs and frames ([`synthesizer`]).

pub mod event;
pub mod synthesizer;

pub use event::{
    Event, EventMeta, PlayerRef, PositionedPlayer, PositionedPlayerView, Timeline, WeaponInfo,
};
pub use synthesizer::{
    synthesize_match, synthesize_round, SIGNIFICANT_DIRECTION_CHANGE_DEGREES,
    SIGNIFICANT_SPEED_DROP_FACTOR,
};
