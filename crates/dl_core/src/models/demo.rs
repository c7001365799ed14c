//! Match-level model: the demo, its rounds, and each round's discrete event
//! logs as supplied by the demo-parsing collaborator.
//!
//! Serde names mirror the collaborator's schema. Optional actor references
//! (assister, flash thrower, traded player) stay `Option`s; absence is data,
//! not an error.

use serde::{Deserialize, Serialize};

use crate::models::frame::Frame;
use crate::models::side::Side;

/// A player joining or leaving the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerConnection {
    pub tick: i64,
    /// `"connect"` or `"disconnect"`.
    pub action: String,
    #[serde(rename = "steamID")]
    pub steam_id: u64,
}

/// A roster entry: a player known to be on a team this round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPlayer {
    pub player_name: String,
    #[serde(rename = "steamID")]
    pub steam_id: u64,
}

/// A named team and its roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub team_name: String,
    pub players: Vec<RosterPlayer>,
}

/// One entry of the kill log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kill {
    pub tick: i64,
    pub seconds: f64,
    pub clock_time: String,
    #[serde(rename = "attackerSteamID")]
    pub attacker_steam_id: u64,
    pub attacker_name: String,
    pub attacker_team: String,
    pub attacker_side: Side,
    pub attacker_x: f64,
    pub attacker_y: f64,
    pub attacker_z: f64,
    pub attacker_view_x: f64,
    pub attacker_view_y: f64,
    #[serde(rename = "victimSteamID")]
    pub victim_steam_id: u64,
    pub victim_name: String,
    pub victim_team: String,
    pub victim_side: Side,
    pub victim_x: f64,
    pub victim_y: f64,
    pub victim_z: f64,
    pub victim_view_x: f64,
    pub victim_view_y: f64,
    #[serde(rename = "assisterSteamID")]
    pub assister_steam_id: Option<u64>,
    pub assister_name: Option<String>,
    pub assister_team: Option<String>,
    pub assister_side: Option<Side>,
    pub is_suicide: bool,
    pub is_teamkill: bool,
    pub is_wallbang: bool,
    pub penetrated_objects: i32,
    pub is_first_kill: bool,
    pub is_headshot: bool,
    #[serde(rename = "victimBlinded")]
    pub is_victim_blinded: bool,
    #[serde(rename = "attackerBlinded")]
    pub is_attacker_blinded: bool,
    #[serde(rename = "flashThrowerSteamID")]
    pub flash_thrower_steam_id: Option<u64>,
    pub flash_thrower_name: Option<String>,
    pub flash_thrower_team: Option<String>,
    pub flash_thrower_side: Option<Side>,
    #[serde(rename = "noScope")]
    pub is_no_scope: bool,
    #[serde(rename = "thruSmoke")]
    pub is_through_smoke: bool,
    pub distance: f64,
    pub is_trade: bool,
    pub player_traded_name: Option<String>,
    pub player_traded_team: Option<String>,
    #[serde(rename = "playerTradedSteamID")]
    pub player_traded_steam_id: Option<u64>,
    pub weapon: String,
    pub weapon_class: String,
}

/// One entry of the damage log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Damage {
    pub tick: i64,
    pub seconds: f64,
    pub clock_time: String,
    #[serde(rename = "attackerSteamID")]
    pub attacker_steam_id: u64,
    pub attacker_name: String,
    pub attacker_team: String,
    pub attacker_side: Side,
    pub attacker_x: f64,
    pub attacker_y: f64,
    pub attacker_z: f64,
    pub attacker_view_x: f64,
    pub attacker_view_y: f64,
    #[serde(rename = "attackerStrafe")]
    pub is_attacker_strafe: bool,
    #[serde(rename = "victimSteamID")]
    pub victim_steam_id: u64,
    pub victim_name: String,
    pub victim_team: String,
    pub victim_side: Side,
    pub victim_x: f64,
    pub victim_y: f64,
    pub victim_z: f64,
    pub victim_view_x: f64,
    pub victim_view_y: f64,
    pub weapon: String,
    pub weapon_class: String,
    pub hp_damage: i32,
    pub hp_damage_taken: i32,
    pub armor_damage: i32,
    pub armor_damage_taken: i32,
    pub hit_group: String,
    pub is_friendly_fire: bool,
    pub distance: f64,
    pub zoom_level: i32,
}

/// One entry of the grenade log; throw and destruction are both recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grenade {
    pub throw_tick: i64,
    pub destroy_tick: i64,
    pub throw_seconds: f64,
    pub throw_clock_time: String,
    pub destroy_seconds: f64,
    pub destroy_clock_time: String,
    #[serde(rename = "throwerSteamID")]
    pub thrower_steam_id: u64,
    pub thrower_name: String,
    pub thrower_team: String,
    pub thrower_side: Side,
    pub thrower_x: f64,
    pub thrower_y: f64,
    pub thrower_z: f64,
    /// e.g. "Flashbang", "Smoke Grenade", "HE Grenade".
    pub grenade_type: String,
    pub grenade_x: f64,
    pub grenade_y: f64,
    pub grenade_z: f64,
    pub entity_id: i64,
}

/// One entry of the bomb log. The acting side is implied by the action
/// (planting is T, defusing is CT), so no side field exists here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BombEvent {
    pub tick: i64,
    pub seconds: f64,
    pub clock_time: String,
    #[serde(rename = "playerSteamID")]
    pub player_steam_id: u64,
    pub player_name: String,
    pub player_team: String,
    pub player_x: f64,
    pub player_y: f64,
    pub player_z: f64,
    /// e.g. "plant_begin", "plant_abort", "defuse_start".
    pub bomb_action: String,
    /// e.g. "A".
    pub bomb_site: String,
}

/// One entry of the weapon-fire log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponFire {
    pub tick: i64,
    pub seconds: f64,
    pub clock_time: String,
    #[serde(rename = "playerSteamID")]
    pub player_steam_id: u64,
    pub player_name: String,
    pub player_team: String,
    pub player_side: Side,
    pub player_x: f64,
    pub player_y: f64,
    pub player_z: f64,
    pub player_view_x: f64,
    pub player_view_y: f64,
    #[serde(rename = "playerStrafe")]
    pub is_player_strafe: bool,
    pub weapon: String,
    pub weapon_class: String,
    pub ammo_in_magazine: i32,
    pub ammo_in_reserve: i32,
    pub zoom_level: i32,
}

/// One entry of the flash log: attacker blinded player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flash {
    pub tick: i64,
    pub seconds: f64,
    pub clock_time: String,
    #[serde(rename = "attackerSteamID")]
    pub attacker_steam_id: u64,
    pub attacker_name: String,
    pub attacker_team: String,
    pub attacker_side: Side,
    pub attacker_x: f64,
    pub attacker_y: f64,
    pub attacker_z: f64,
    pub attacker_view_x: f64,
    pub attacker_view_y: f64,
    #[serde(rename = "playerSteamID")]
    pub player_steam_id: u64,
    pub player_name: String,
    pub player_team: String,
    pub player_side: Side,
    pub player_x: f64,
    pub player_y: f64,
    pub player_z: f64,
    pub player_view_x: f64,
    pub player_view_y: f64,
    pub flash_duration: f64,
}

/// One play of the objective cycle: ordered frames plus the discrete logs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    #[serde(rename = "roundNum")]
    pub round_number: i32,
    pub is_warmup: bool,
    pub start_tick: i64,
    pub freeze_time_end_tick: i64,
    pub end_tick: i64,
    /// Trails `end_tick` by the round-restart delay.
    pub end_official_tick: i64,
    pub bomb_plant_tick: Option<i64>,
    pub t_score: i32,
    pub ct_score: i32,
    pub end_t_score: i32,
    #[serde(rename = "endCTScore")]
    pub end_ct_score: i32,
    pub ct_team: String,
    pub t_team: String,
    pub winning_side: Side,
    pub winning_team: String,
    pub losing_team: String,
    pub round_end_reason: String,
    pub ct_freeze_time_end_eq_val: i32,
    pub ct_round_start_eq_val: i32,
    pub ct_round_spend_money: i32,
    pub ct_buy_type: String,
    pub t_freeze_time_end_eq_val: i32,
    pub t_round_start_eq_val: i32,
    pub t_round_spend_money: i32,
    pub t_buy_type: String,
    pub ct_side: Team,
    pub t_side: Team,
    pub kills: Vec<Kill>,
    pub damages: Vec<Damage>,
    pub grenades: Vec<Grenade>,
    pub bomb_events: Vec<BombEvent>,
    pub weapon_fires: Vec<WeaponFire>,
    pub flashes: Vec<Flash>,
    pub frames: Vec<Frame>,
}

/// A parsed match: identity, map, and the recorded rounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demo {
    #[serde(rename = "matchID")]
    pub match_id: String,
    pub client_name: String,
    pub map_name: String,
    pub tick_rate: i32,
    pub player_connections: Vec<PlayerConnection>,
    pub game_rounds: Vec<Round>,
}
