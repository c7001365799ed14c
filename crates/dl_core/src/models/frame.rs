//! Per-frame match state: one sampled snapshot per tick.
//!
//! Serde names mirror the demo collaborator's schema; units are world
//! coordinates for positions and degrees for view angles (`view_x` is yaw,
//! `view_y` is pitch).

use nalgebra::Vector3;
use serde::{Deserialize, Deserializer, Serialize};

use crate::geom::{Position, ViewAngles};
use crate::models::side::Side;

/// A weapon as it appears in a player's per-frame inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weapon {
    #[serde(rename = "weaponName")]
    pub name: String,
    pub weapon_class: String,
    pub ammo_in_magazine: i32,
    pub ammo_in_reserve: i32,
}

impl Weapon {
    /// Whether two inventory entries are the same weapon, ignoring ammo.
    ///
    /// Full equality treats a gun with one round fewer as a different weapon;
    /// identity is what "still holding the same gun" checks need.
    pub fn same_identity(&self, other: &Weapon) -> bool {
        self.name == other.name && self.weapon_class == other.weapon_class
    }
}

/// One player's state in one frame. Immutable once parsed; the engines only
/// ever compare these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerFrameState {
    #[serde(rename = "steamID")]
    pub steam_id: u64,
    pub name: String,
    pub team: String,
    pub side: Side,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub velocity_x: f64,
    pub velocity_y: f64,
    pub velocity_z: f64,
    /// Yaw, degrees (0 = east, 90 = north).
    pub view_x: f64,
    /// Pitch, degrees (90 = straight down, 270 = straight up).
    pub view_y: f64,
    pub hp: i32,
    pub armor: i32,
    pub active_weapon: String,
    pub total_utility: i32,
    pub is_alive: bool,
    pub is_blinded: bool,
    pub is_airborne: bool,
    pub is_ducking: bool,
    pub is_ducking_in_progress: bool,
    #[serde(rename = "isUnDuckingInProgress")]
    pub is_unducking_in_progress: bool,
    pub is_defusing: bool,
    pub is_planting: bool,
    pub is_reloading: bool,
    pub is_in_bomb_zone: bool,
    pub is_in_buy_zone: bool,
    pub is_standing: bool,
    pub is_scoped: bool,
    pub is_walking: bool,
    pub is_unknown: bool,
    /// First entry is the weapon currently held. Upstream serializes `null`
    /// for an empty inventory.
    #[serde(default, deserialize_with = "null_to_empty")]
    pub inventory: Vec<Weapon>,
    pub equipment_value: i32,
    #[serde(rename = "equipmentValueFreezetimeEnd")]
    pub equipment_value_freeze_time_end: i32,
    pub equipment_value_round_start: i32,
    pub cash: i32,
    pub cash_spend_this_round: i32,
    pub cash_spend_total: i32,
    pub has_helmet: bool,
    #[serde(rename = "hasDefuse")]
    pub has_defuse_kit: bool,
    pub has_bomb: bool,
    pub ping: i32,
    pub zoom_level: i32,
}

impl PlayerFrameState {
    #[inline]
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }

    #[inline]
    pub fn view(&self) -> ViewAngles {
        ViewAngles::new(self.view_x, self.view_y)
    }

    #[inline]
    pub fn velocity(&self) -> Vector3<f64> {
        Vector3::new(self.velocity_x, self.velocity_y, self.velocity_z)
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity().norm()
    }

    /// Whether any velocity component is nonzero.
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.velocity_x != 0.0 || self.velocity_y != 0.0 || self.velocity_z != 0.0
    }

    /// The weapon currently held, `None` for an empty inventory.
    #[inline]
    pub fn held_weapon(&self) -> Option<&Weapon> {
        self.inventory.first()
    }
}

fn null_to_empty<'de, D>(deserializer: D) -> Result<Vec<Weapon>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Weapon>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One team's state in one frame. Player order is stable across consecutive
/// frames of a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamFrameState {
    pub side: Side,
    pub team_name: String,
    pub team_eq_val: i32,
    pub alive_players: i32,
    pub total_utility: i32,
    pub players: Vec<PlayerFrameState>,
}

/// Where the bomb currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bomb {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// An in-flight grenade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projectile {
    pub projectile_type: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// An active smoke cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Smoke {
    #[serde(rename = "grenadeEntityID")]
    pub grenade_entity_id: i64,
    pub start_tick: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Smoke {
    #[inline]
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }
}

/// An active fire (molotov/incendiary area).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fire {
    #[serde(rename = "uniqueID")]
    pub unique_id: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Fire {
    #[inline]
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y, self.z)
    }
}

/// One sampled snapshot of full match state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub is_kill_frame: bool,
    pub tick: i64,
    pub seconds: f64,
    pub clock_time: String,
    pub t: TeamFrameState,
    pub ct: TeamFrameState,
    pub bomb_planted: bool,
    #[serde(rename = "bombsite")]
    pub bomb_site: String,
    pub bomb: Bomb,
    pub projectiles: Vec<Projectile>,
    pub smokes: Vec<Smoke>,
    pub fires: Vec<Fire>,
}

impl Frame {
    /// Every player on both sides, CT first.
    pub fn players(&self) -> impl Iterator<Item = &PlayerFrameState> {
        self.ct.players.iter().chain(self.t.players.iter())
    }

    /// Every player with hp remaining, CT first.
    pub fn living_players(&self) -> impl Iterator<Item = &PlayerFrameState> {
        self.players().filter(|p| p.hp > 0)
    }
}
