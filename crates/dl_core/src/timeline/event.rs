//! # Timeline Events
//!
//! The closed sum type over every kind of event a round can produce, plus the
//! copy value types its payloads carry. Payloads never borrow from frames;
//! frames are transient and events outlive them.
//!
//! [`Event::tick`] is the single sort-key accessor and the `Display`
//! implementation is the single formatter, both exhaustive matches, so a new
//! kind cannot be forgotten in either.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geom::{Position, ViewAngles};
use crate::models::Side;

/// A player identified by the fields every log record carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub steam_id: u64,
    pub team: String,
    pub side: Side,
    pub name: String,
}

impl fmt::Display for PlayerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.team, self.side, self.name)
    }
}

/// A player at a known position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedPlayer {
    #[serde(flatten)]
    pub player: PlayerRef,
    pub position: Position,
}

impl fmt::Display for PositionedPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.player, self.position)
    }
}

/// A player at a known position with a known view direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedPlayerView {
    #[serde(flatten)]
    pub player: PlayerRef,
    pub position: Position,
    pub view: ViewAngles,
}

impl fmt::Display for PositionedPlayerView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {} looking at {}", self.player, self.position, self.view)
    }
}

/// A weapon as referenced by events. Ammo is unknown in kill/damage records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponInfo {
    pub name: String,
    pub weapon_class: String,
    pub ammo_in_magazine: Option<i32>,
    pub ammo_in_reserve: Option<i32>,
}

impl WeaponInfo {
    pub fn without_ammo(name: &str, weapon_class: &str) -> Self {
        Self {
            name: name.to_string(),
            weapon_class: weapon_class.to_string(),
            ammo_in_magazine: None,
            ammo_in_reserve: None,
        }
    }
}

impl From<&crate::models::Weapon> for WeaponInfo {
    fn from(weapon: &crate::models::Weapon) -> Self {
        Self {
            name: weapon.name.clone(),
            weapon_class: weapon.weapon_class.clone(),
            ammo_in_magazine: Some(weapon.ammo_in_magazine),
            ammo_in_reserve: Some(weapon.ammo_in_reserve),
        }
    }
}

impl fmt::Display for WeaponInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) with {} rounds in magazine and {} rounds in reserve",
            self.name,
            self.weapon_class,
            fmt_ammo(self.ammo_in_magazine),
            fmt_ammo(self.ammo_in_reserve),
        )
    }
}

fn fmt_ammo(ammo: Option<i32>) -> String {
    match ammo {
        Some(n) => n.to_string(),
        None => "unknown".to_string(),
    }
}

/// Shared timing fields of every in-round event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMeta {
    pub tick: i64,
    pub seconds: f64,
    pub clock_time: String,
}

/// Everything that can happen on a timeline. Round boundary and connection
/// variants carry only a tick; everything else carries full [`EventMeta`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    RoundStart {
        tick: i64,
        ct_score: i32,
        t_score: i32,
        ct_equipment_value: i32,
        t_equipment_value: i32,
    },
    FreezeTimeEnd {
        tick: i64,
        ct_equipment_value: i32,
        t_equipment_value: i32,
        ct_money_spent: i32,
        t_money_spent: i32,
        ct_buy_type: String,
        t_buy_type: String,
    },
    RoundEnd {
        tick: i64,
        official_tick: i64,
        reason: String,
        winning_side: Side,
        winning_team: String,
        losing_team: String,
        end_ct_score: i32,
        end_t_score: i32,
    },
    PlayerConnection {
        tick: i64,
        steam_id: u64,
        action: String,
    },
    Kill {
        meta: EventMeta,
        attacker: PositionedPlayerView,
        victim: PositionedPlayerView,
        assister: Option<PlayerRef>,
        is_suicide: bool,
        is_teamkill: bool,
        is_wallbang: bool,
        penetrated_objects: i32,
        is_first_kill: bool,
        is_headshot: bool,
        is_victim_blinded: bool,
        is_attacker_blinded: bool,
        flash_thrower: Option<PlayerRef>,
        is_no_scope: bool,
        is_through_smoke: bool,
        distance: f64,
        player_traded: Option<PlayerRef>,
        weapon: WeaponInfo,
    },
    Damage {
        meta: EventMeta,
        attacker: PositionedPlayerView,
        is_attacker_strafe: bool,
        victim: PositionedPlayerView,
        weapon: WeaponInfo,
        hp_damage: i32,
        hp_damage_taken: i32,
        armor_damage: i32,
        armor_damage_taken: i32,
        hit_group: String,
        is_friendly_fire: bool,
        distance: f64,
        zoom_level: i32,
    },
    GrenadeThrow {
        meta: EventMeta,
        entity_id: i64,
        grenade_type: String,
        thrower: PositionedPlayer,
    },
    GrenadeTrigger {
        meta: EventMeta,
        entity_id: i64,
        grenade_type: String,
        position: Position,
    },
    BombAction {
        meta: EventMeta,
        player: PositionedPlayer,
        bomb_action: String,
        bomb_site: String,
    },
    WeaponFire {
        meta: EventMeta,
        player: PositionedPlayerView,
        is_player_strafe: bool,
        weapon: WeaponInfo,
        zoom_level: i32,
    },
    Flash {
        meta: EventMeta,
        attacker: PositionedPlayerView,
        player: PositionedPlayerView,
        flash_duration: f64,
    },
    MovementStart {
        meta: EventMeta,
        player: PositionedPlayerView,
    },
    MovementStop {
        meta: EventMeta,
        player: PositionedPlayerView,
    },
    DirectionChange {
        meta: EventMeta,
        player: PositionedPlayerView,
        old_velocity: [f64; 3],
        new_velocity: [f64; 3],
    },
    SpeedDrop {
        meta: EventMeta,
        player: PositionedPlayerView,
        old_speed: f64,
        new_speed: f64,
    },
    ReloadStart {
        meta: EventMeta,
        player: PositionedPlayerView,
        weapon: WeaponInfo,
    },
    ReloadFinish {
        meta: EventMeta,
        player: PositionedPlayerView,
        weapon: WeaponInfo,
    },
    ReloadCancel {
        meta: EventMeta,
        player: PositionedPlayerView,
        weapon: WeaponInfo,
    },
    Scope {
        meta: EventMeta,
        player: PositionedPlayerView,
        weapon: WeaponInfo,
    },
    Unscope {
        meta: EventMeta,
        player: PositionedPlayerView,
        weapon: Option<WeaponInfo>,
    },
    WeaponSwitch {
        meta: EventMeta,
        player: PositionedPlayerView,
        previous_weapon: WeaponInfo,
        new_weapon: WeaponInfo,
    },
    InventoryChange {
        meta: EventMeta,
        player: PositionedPlayerView,
        gained: Vec<WeaponInfo>,
        lost: Vec<WeaponInfo>,
    },
    Death {
        meta: EventMeta,
        player: PositionedPlayer,
    },
    SmokeSpawn {
        meta: EventMeta,
        grenade_entity_id: i64,
        position: Position,
    },
    SmokeDespawn {
        meta: EventMeta,
        grenade_entity_id: i64,
        position: Position,
    },
    FireSpawn {
        meta: EventMeta,
        unique_id: i64,
        position: Position,
    },
    FireDespawn {
        meta: EventMeta,
        unique_id: i64,
        position: Position,
    },
    BombPickup {
        meta: EventMeta,
        player: PositionedPlayer,
    },
    BombDrop {
        meta: EventMeta,
        player: PositionedPlayer,
    },
}

impl Event {
    /// The sample tick, the timeline's sort key.
    pub fn tick(&self) -> i64 {
        match self {
            Event::RoundStart { tick, .. }
            | Event::FreezeTimeEnd { tick, .. }
            | Event::RoundEnd { tick, .. }
            | Event::PlayerConnection { tick, .. } => *tick,
            Event::Kill { meta, .. }
            | Event::Damage { meta, .. }
            | Event::GrenadeThrow { meta, .. }
            | Event::GrenadeTrigger { meta, .. }
            | Event::BombAction { meta, .. }
            | Event::WeaponFire { meta, .. }
            | Event::Flash { meta, .. }
            | Event::MovementStart { meta, .. }
            | Event::MovementStop { meta, .. }
            | Event::DirectionChange { meta, .. }
            | Event::SpeedDrop { meta, .. }
            | Event::ReloadStart { meta, .. }
            | Event::ReloadFinish { meta, .. }
            | Event::ReloadCancel { meta, .. }
            | Event::Scope { meta, .. }
            | Event::Unscope { meta, .. }
            | Event::WeaponSwitch { meta, .. }
            | Event::InventoryChange { meta, .. }
            | Event::Death { meta, .. }
            | Event::SmokeSpawn { meta, .. }
            | Event::SmokeDespawn { meta, .. }
            | Event::FireSpawn { meta, .. }
            | Event::FireDespawn { meta, .. }
            | Event::BombPickup { meta, .. }
            | Event::BombDrop { meta, .. } => meta.tick,
        }
    }

    /// The shared timing fields, absent on the tick-only variants.
    pub fn meta(&self) -> Option<&EventMeta> {
        match self {
            Event::RoundStart { .. }
            | Event::FreezeTimeEnd { .. }
            | Event::RoundEnd { .. }
            | Event::PlayerConnection { .. } => None,
            Event::Kill { meta, .. }
            | Event::Damage { meta, .. }
            | Event::GrenadeThrow { meta, .. }
            | Event::GrenadeTrigger { meta, .. }
            | Event::BombAction { meta, .. }
            | Event::WeaponFire { meta, .. }
            | Event::Flash { meta, .. }
            | Event::MovementStart { meta, .. }
            | Event::MovementStop { meta, .. }
            | Event::DirectionChange { meta, .. }
            | Event::SpeedDrop { meta, .. }
            | Event::ReloadStart { meta, .. }
            | Event::ReloadFinish { meta, .. }
            | Event::ReloadCancel { meta, .. }
            | Event::Scope { meta, .. }
            | Event::Unscope { meta, .. }
            | Event::WeaponSwitch { meta, .. }
            | Event::InventoryChange { meta, .. }
            | Event::Death { meta, .. }
            | Event::SmokeSpawn { meta, .. }
            | Event::SmokeDespawn { meta, .. }
            | Event::FireSpawn { meta, .. }
            | Event::FireDespawn { meta, .. }
            | Event::BombPickup { meta, .. }
            | Event::BombDrop { meta, .. } => Some(meta),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::RoundStart {
                ct_equipment_value,
                t_equipment_value,
                ..
            } => write!(
                f,
                "New round started - CT/T equipment values: {ct_equipment_value}/{t_equipment_value}"
            ),
            Event::FreezeTimeEnd {
                ct_equipment_value,
                t_equipment_value,
                ct_money_spent,
                t_money_spent,
                ct_buy_type,
                t_buy_type,
                ..
            } => write!(
                f,
                "Freeze time ended - CT/T equipment values: {ct_equipment_value}/{t_equipment_value}, \
                 CT/T money spent: {ct_money_spent}({ct_buy_type})/{t_money_spent}({t_buy_type})"
            ),
            Event::RoundEnd {
                reason,
                winning_side,
                winning_team,
                end_ct_score,
                end_t_score,
                ..
            } => write!(
                f,
                "Round ended - {winning_team} ({winning_side}) wins ({reason}), \
                 CT {end_ct_score} - T {end_t_score}"
            ),
            Event::PlayerConnection { steam_id, action, .. } => {
                write!(f, "Player with ID {steam_id} took server action {action}")
            }
            Event::Kill {
                attacker,
                victim,
                is_teamkill,
                is_wallbang,
                penetrated_objects,
                is_first_kill,
                is_headshot,
                is_victim_blinded,
                is_attacker_blinded,
                flash_thrower,
                is_no_scope,
                is_through_smoke,
                distance,
                player_traded,
                weapon,
                ..
            } => {
                write!(f, "{attacker}")?;
                if *is_attacker_blinded {
                    write!(f, " (BLINDED BY {})", fmt_opt_player(flash_thrower))?;
                }
                write!(f, " killed {victim}")?;
                if *is_victim_blinded {
                    write!(f, " (BLINDED BY {})", fmt_opt_player(flash_thrower))?;
                }
                write!(f, " with {weapon} at a distance of {distance}")?;
                if *is_headshot {
                    write!(f, " (HEADSHOT)")?;
                }
                if *is_wallbang {
                    write!(f, " (WALLBANG through {penetrated_objects} OBJECTS)")?;
                }
                if *is_teamkill {
                    write!(f, " (TEAMKILL)")?;
                }
                if *is_first_kill {
                    write!(f, " (FIRST KILL OF ROUND)")?;
                }
                if *is_no_scope {
                    write!(f, " (NO SCOPE)")?;
                }
                if *is_through_smoke {
                    write!(f, " (THROUGH SMOKE)")?;
                }
                if let Some(traded) = player_traded {
                    write!(f, " (TRADED FOR {traded})")?;
                }
                Ok(())
            }
            Event::Damage {
                attacker,
                is_attacker_strafe,
                victim,
                hp_damage,
                hp_damage_taken,
                armor_damage,
                armor_damage_taken,
                hit_group,
                is_friendly_fire,
                distance,
                zoom_level,
                ..
            } => {
                write!(f, "{attacker}")?;
                if *is_attacker_strafe {
                    write!(f, " (STRAFING)")?;
                }
                write!(
                    f,
                    " damaged {victim} for {hp_damage_taken}HP and {armor_damage_taken}Armor \
                     ({hp_damage}/{armor_damage} raw) in the {hit_group} at a distance of \
                     {distance} at zoom level {zoom_level}"
                )?;
                if *is_friendly_fire {
                    write!(f, " (FRIENDLY FIRE)")?;
                }
                Ok(())
            }
            Event::GrenadeThrow { entity_id, grenade_type, thrower, .. } => {
                write!(f, "{thrower} threw a {grenade_type} (ID: {entity_id})")
            }
            Event::GrenadeTrigger { entity_id, grenade_type, position, .. } => {
                write!(f, "A {grenade_type} triggered at {position} (ID: {entity_id})")
            }
            Event::BombAction { player, bomb_action, bomb_site, .. } => {
                write!(f, "{player} took the action {bomb_action} at site {bomb_site}")
            }
            Event::WeaponFire { player, is_player_strafe, weapon, zoom_level, .. } => {
                write!(f, "{player}")?;
                if *is_player_strafe {
                    write!(f, " (STRAFING)")?;
                }
                write!(f, " fired {weapon} at zoom level {zoom_level}")
            }
            Event::Flash { attacker, player, flash_duration, .. } => {
                write!(f, "{attacker} flashed {player} for {flash_duration} seconds")
            }
            Event::MovementStart { player, .. } => write!(f, "{player} started moving"),
            Event::MovementStop { player, .. } => write!(f, "{player} stopped moving"),
            Event::DirectionChange { player, old_velocity, new_velocity, .. } => write!(
                f,
                "{player} significantly changed movement direction from {} to {}",
                fmt_velocity(old_velocity),
                fmt_velocity(new_velocity),
            ),
            Event::SpeedDrop { player, old_speed, new_speed, .. } => write!(
                f,
                "{player} significantly slowed their speed from {old_speed} to {new_speed}"
            ),
            Event::ReloadStart { player, weapon, .. } => {
                write!(f, "{player} started reloading their {weapon}")
            }
            Event::ReloadFinish { player, weapon, .. } => {
                write!(f, "{player} finished reloading their {weapon}")
            }
            Event::ReloadCancel { player, weapon, .. } => {
                write!(f, "{player} cancelled reloading their {weapon}")
            }
            Event::Scope { player, weapon, .. } => {
                write!(f, "{player} scoped their {weapon}")
            }
            Event::Unscope { player, weapon, .. } => match weapon {
                Some(weapon) => write!(f, "{player} unscoped their {weapon}"),
                None => write!(f, "{player} unscoped"),
            },
            Event::WeaponSwitch { player, previous_weapon, new_weapon, .. } => write!(
                f,
                "{player} switched their weapon from {previous_weapon} to {new_weapon}"
            ),
            Event::InventoryChange { player, gained, lost, .. } => {
                let gained: Vec<String> = gained.iter().map(WeaponInfo::to_string).collect();
                let lost: Vec<String> = lost.iter().map(WeaponInfo::to_string).collect();
                match (gained.is_empty(), lost.is_empty()) {
                    (false, false) => {
                        write!(f, "{player} gained {gained:?} and lost {lost:?}")
                    }
                    (false, true) => write!(f, "{player} gained {gained:?}"),
                    (true, false) => write!(f, "{player} lost {lost:?}"),
                    (true, true) => write!(f, "{player} inventory unchanged"),
                }
            }
            Event::Death { player, .. } => write!(f, "{player} died"),
            Event::SmokeSpawn { grenade_entity_id, position, .. } => {
                write!(f, "Smoke {grenade_entity_id} spawned at {position}")
            }
            Event::SmokeDespawn { grenade_entity_id, position, .. } => {
                write!(f, "Smoke {grenade_entity_id} despawned at {position}")
            }
            Event::FireSpawn { unique_id, position, .. } => {
                write!(f, "Fire {unique_id} spawned at {position}")
            }
            Event::FireDespawn { unique_id, position, .. } => {
                write!(f, "Fire {unique_id} despawned at {position}")
            }
            Event::BombPickup { player, .. } => write!(f, "{player} picked up the bomb"),
            Event::BombDrop { player, .. } => {
                write!(f, "{player} dropped the bomb (or planted it)")
            }
        }
    }
}

fn fmt_opt_player(player: &Option<PlayerRef>) -> String {
    match player {
        Some(p) => p.to_string(),
        None => "unknown".to_string(),
    }
}

fn fmt_velocity(v: &[f64; 3]) -> String {
    format!("({}, {}, {})", v[0], v[1], v[2])
}

/// The chronologically sorted event sequence for a round or match.
/// Append-only while building; [`Timeline::finish`] sorts by tick and the
/// result is treated as immutable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    events: Vec<Event>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    /// Sorts ascending by tick. The sort is stable, so events at the same
    /// tick keep their generation order.
    pub fn finish(mut self) -> Self {
        self.events.sort_by_key(Event::tick);
        self
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn is_sorted_by_tick(&self) -> bool {
        self.events.windows(2).all(|pair| pair[0].tick() <= pair[1].tick())
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, event) in self.events.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{event}")?;
        }
        Ok(())
    }
}
