//! # Timeline Synthesizer
//!
//! Turns a round's discrete event logs and its frame sequence into one
//! tick-sorted [`Timeline`].
//!
//! ## Algorithm
//! 1. Round scalars become the round-start, freeze-time-end, and round-end
//!    events.
//! 2. Each discrete log entry becomes exactly one event (a grenade becomes
//!    throw plus trigger).
//! 3. Consecutive frame pairs are diffed per player, paired by steam id, with
//!    one independent predicate per derived event kind.
//! 4. Frame-level smoke and fire lists are diffed for spawns and despawns.
//!
//! The diff is stateless: nothing persists beyond the two frames under
//! comparison.

use fxhash::FxHashMap;
use tracing::{debug, info};

use crate::error::{AnalysisError, Result};
use crate::geom::{angle_between_degrees, Position, ViewAngles};
use crate::models::{
    BombEvent, Damage, Demo, Flash, Frame, Grenade, Kill, PlayerFrameState, Round, Side,
    WeaponFire,
};
use crate::timeline::event::{
    Event, EventMeta, PlayerRef, PositionedPlayer, PositionedPlayerView, Timeline, WeaponInfo,
};

/// Direction changes below this angle are noise, degrees.
pub const SIGNIFICANT_DIRECTION_CHANGE_DEGREES: f64 = 15.0;

/// A speed drop counts when the new speed falls below this fraction of the
/// old one.
pub const SIGNIFICANT_SPEED_DROP_FACTOR: f64 = 0.7;

/// Synthesizes the full timeline for one round.
///
/// Fails only on upstream data-contract violations (mismatched damage
/// fields); missing optional actors and empty inventories are ordinary data.
pub fn synthesize_round(round: &Round) -> Result<Timeline> {
    let mut timeline = Timeline::new();

    push_round_scalars(&mut timeline, round);
    push_discrete_logs(&mut timeline, round)?;
    push_frame_diffs(&mut timeline, round);

    let timeline = timeline.finish();
    debug!(
        round = round.round_number,
        events = timeline.len(),
        "round timeline synthesized"
    );
    Ok(timeline)
}

/// Synthesizes one timeline for the whole match: player connections plus
/// every round's events, globally tick-sorted.
pub fn synthesize_match(demo: &Demo) -> Result<Timeline> {
    let mut timeline = Timeline::new();

    for connection in &demo.player_connections {
        timeline.push(Event::PlayerConnection {
            tick: connection.tick,
            steam_id: connection.steam_id,
            action: connection.action.clone(),
        });
    }

    for round in &demo.game_rounds {
        timeline.extend(synthesize_round(round)?.into_events());
    }

    let timeline = timeline.finish();
    info!(
        match_id = %demo.match_id,
        rounds = demo.game_rounds.len(),
        events = timeline.len(),
        "match timeline synthesized"
    );
    Ok(timeline)
}

fn push_round_scalars(timeline: &mut Timeline, round: &Round) {
    timeline.push(Event::RoundStart {
        tick: round.start_tick,
        ct_score: round.ct_score,
        t_score: round.t_score,
        ct_equipment_value: round.ct_round_start_eq_val,
        t_equipment_value: round.t_round_start_eq_val,
    });
    timeline.push(Event::FreezeTimeEnd {
        tick: round.freeze_time_end_tick,
        ct_equipment_value: round.ct_freeze_time_end_eq_val,
        t_equipment_value: round.t_freeze_time_end_eq_val,
        ct_money_spent: round.ct_round_spend_money,
        t_money_spent: round.t_round_spend_money,
        ct_buy_type: round.ct_buy_type.clone(),
        t_buy_type: round.t_buy_type.clone(),
    });
    timeline.push(Event::RoundEnd {
        tick: round.end_tick,
        official_tick: round.end_official_tick,
        reason: round.round_end_reason.clone(),
        winning_side: round.winning_side,
        winning_team: round.winning_team.clone(),
        losing_team: round.losing_team.clone(),
        end_ct_score: round.end_ct_score,
        end_t_score: round.end_t_score,
    });
}

fn push_discrete_logs(timeline: &mut Timeline, round: &Round) -> Result<()> {
    for kill in &round.kills {
        timeline.push(kill_event(kill));
    }
    for damage in &round.damages {
        timeline.push(damage_event(damage)?);
    }
    for grenade in &round.grenades {
        let (throw, trigger) = grenade_events(grenade);
        timeline.push(throw);
        timeline.push(trigger);
    }
    for bomb in &round.bomb_events {
        timeline.push(bomb_event(bomb)?);
    }
    for fire in &round.weapon_fires {
        timeline.push(weapon_fire_event(fire));
    }
    for flash in &round.flashes {
        timeline.push(flash_event(flash));
    }
    Ok(())
}

fn kill_event(kill: &Kill) -> Event {
    let assister = match kill.assister_steam_id {
        Some(steam_id) => Some(PlayerRef {
            steam_id,
            team: kill.assister_team.clone().unwrap_or_default(),
            side: kill.assister_side.unwrap_or(kill.attacker_side),
            name: kill.assister_name.clone().unwrap_or_default(),
        }),
        None => None,
    };
    let flash_thrower = match kill.flash_thrower_steam_id {
        Some(steam_id) => Some(PlayerRef {
            steam_id,
            team: kill.flash_thrower_team.clone().unwrap_or_default(),
            side: kill.flash_thrower_side.unwrap_or(kill.attacker_side),
            name: kill.flash_thrower_name.clone().unwrap_or_default(),
        }),
        None => None,
    };
    // The kill log carries no side for the traded player; the trade victim
    // was on the attacker's opposite side.
    let player_traded = match kill.player_traded_steam_id {
        Some(steam_id) => Some(PlayerRef {
            steam_id,
            team: kill.player_traded_team.clone().unwrap_or_default(),
            side: kill.attacker_side.invert(),
            name: kill.player_traded_name.clone().unwrap_or_default(),
        }),
        None => None,
    };

    Event::Kill {
        meta: EventMeta {
            tick: kill.tick,
            seconds: kill.seconds,
            clock_time: kill.clock_time.clone(),
        },
        attacker: positioned_view(
            kill.attacker_steam_id,
            &kill.attacker_team,
            kill.attacker_side,
            &kill.attacker_name,
            Position::new(kill.attacker_x, kill.attacker_y, kill.attacker_z),
            ViewAngles::new(kill.attacker_view_x, kill.attacker_view_y),
        ),
        victim: positioned_view(
            kill.victim_steam_id,
            &kill.victim_team,
            kill.victim_side,
            &kill.victim_name,
            Position::new(kill.victim_x, kill.victim_y, kill.victim_z),
            ViewAngles::new(kill.victim_view_x, kill.victim_view_y),
        ),
        assister,
        is_suicide: kill.is_suicide,
        is_teamkill: kill.is_teamkill,
        is_wallbang: kill.is_wallbang,
        penetrated_objects: kill.penetrated_objects,
        is_first_kill: kill.is_first_kill,
        is_headshot: kill.is_headshot,
        is_victim_blinded: kill.is_victim_blinded,
        is_attacker_blinded: kill.is_attacker_blinded,
        flash_thrower,
        is_no_scope: kill.is_no_scope,
        is_through_smoke: kill.is_through_smoke,
        distance: kill.distance,
        player_traded,
        weapon: WeaponInfo::without_ammo(&kill.weapon, &kill.weapon_class),
    }
}

fn damage_event(damage: &Damage) -> Result<Event> {
    // Dealt and taken figures describe the same hit; disagreement means the
    // upstream parser broke its contract.
    if damage.hp_damage != damage.hp_damage_taken {
        return Err(AnalysisError::DamageFieldMismatch {
            tick: damage.tick,
            field: "hp",
            dealt: damage.hp_damage,
            taken: damage.hp_damage_taken,
        });
    }
    if damage.armor_damage != damage.armor_damage_taken {
        return Err(AnalysisError::DamageFieldMismatch {
            tick: damage.tick,
            field: "armor",
            dealt: damage.armor_damage,
            taken: damage.armor_damage_taken,
        });
    }

    Ok(Event::Damage {
        meta: EventMeta {
            tick: damage.tick,
            seconds: damage.seconds,
            clock_time: damage.clock_time.clone(),
        },
        attacker: positioned_view(
            damage.attacker_steam_id,
            &damage.attacker_team,
            damage.attacker_side,
            &damage.attacker_name,
            Position::new(damage.attacker_x, damage.attacker_y, damage.attacker_z),
            ViewAngles::new(damage.attacker_view_x, damage.attacker_view_y),
        ),
        is_attacker_strafe: damage.is_attacker_strafe,
        victim: positioned_view(
            damage.victim_steam_id,
            &damage.victim_team,
            damage.victim_side,
            &damage.victim_name,
            Position::new(damage.victim_x, damage.victim_y, damage.victim_z),
            ViewAngles::new(damage.victim_view_x, damage.victim_view_y),
        ),
        weapon: WeaponInfo::without_ammo(&damage.weapon, &damage.weapon_class),
        hp_damage: damage.hp_damage,
        hp_damage_taken: damage.hp_damage_taken,
        armor_damage: damage.armor_damage,
        armor_damage_taken: damage.armor_damage_taken,
        hit_group: damage.hit_group.clone(),
        is_friendly_fire: damage.is_friendly_fire,
        distance: damage.distance,
        zoom_level: damage.zoom_level,
    })
}

fn grenade_events(grenade: &Grenade) -> (Event, Event) {
    let throw = Event::GrenadeThrow {
        meta: EventMeta {
            tick: grenade.throw_tick,
            seconds: grenade.throw_seconds,
            clock_time: grenade.throw_clock_time.clone(),
        },
        entity_id: grenade.entity_id,
        grenade_type: grenade.grenade_type.clone(),
        thrower: positioned(
            grenade.thrower_steam_id,
            &grenade.thrower_team,
            grenade.thrower_side,
            &grenade.thrower_name,
            Position::new(grenade.thrower_x, grenade.thrower_y, grenade.thrower_z),
        ),
    };
    let trigger = Event::GrenadeTrigger {
        meta: EventMeta {
            tick: grenade.destroy_tick,
            seconds: grenade.destroy_seconds,
            clock_time: grenade.destroy_clock_time.clone(),
        },
        entity_id: grenade.entity_id,
        grenade_type: grenade.grenade_type.clone(),
        position: Position::new(grenade.grenade_x, grenade.grenade_y, grenade.grenade_z),
    };
    (throw, trigger)
}

fn bomb_event(bomb: &BombEvent) -> Result<Event> {
    // The log has no side field; the action implies it, and an action that
    // implies neither side is malformed upstream data.
    let side = Side::from_bomb_action(&bomb.bomb_action)?;
    Ok(Event::BombAction {
        meta: EventMeta {
            tick: bomb.tick,
            seconds: bomb.seconds,
            clock_time: bomb.clock_time.clone(),
        },
        player: positioned(
            bomb.player_steam_id,
            &bomb.player_team,
            side,
            &bomb.player_name,
            Position::new(bomb.player_x, bomb.player_y, bomb.player_z),
        ),
        bomb_action: bomb.bomb_action.clone(),
        bomb_site: bomb.bomb_site.clone(),
    })
}

fn weapon_fire_event(fire: &WeaponFire) -> Event {
    Event::WeaponFire {
        meta: EventMeta {
            tick: fire.tick,
            seconds: fire.seconds,
            clock_time: fire.clock_time.clone(),
        },
        player: positioned_view(
            fire.player_steam_id,
            &fire.player_team,
            fire.player_side,
            &fire.player_name,
            Position::new(fire.player_x, fire.player_y, fire.player_z),
            ViewAngles::new(fire.player_view_x, fire.player_view_y),
        ),
        is_player_strafe: fire.is_player_strafe,
        weapon: WeaponInfo {
            name: fire.weapon.clone(),
            weapon_class: fire.weapon_class.clone(),
            ammo_in_magazine: Some(fire.ammo_in_magazine),
            ammo_in_reserve: Some(fire.ammo_in_reserve),
        },
        zoom_level: fire.zoom_level,
    }
}

fn flash_event(flash: &Flash) -> Event {
    Event::Flash {
        meta: EventMeta {
            tick: flash.tick,
            seconds: flash.seconds,
            clock_time: flash.clock_time.clone(),
        },
        attacker: positioned_view(
            flash.attacker_steam_id,
            &flash.attacker_team,
            flash.attacker_side,
            &flash.attacker_name,
            Position::new(flash.attacker_x, flash.attacker_y, flash.attacker_z),
            ViewAngles::new(flash.attacker_view_x, flash.attacker_view_y),
        ),
        player: positioned_view(
            flash.player_steam_id,
            &flash.player_team,
            flash.player_side,
            &flash.player_name,
            Position::new(flash.player_x, flash.player_y, flash.player_z),
            ViewAngles::new(flash.player_view_x, flash.player_view_y),
        ),
        flash_duration: flash.flash_duration,
    }
}

fn push_frame_diffs(timeline: &mut Timeline, round: &Round) {
    for pair in round.frames.windows(2) {
        let (previous, current) = (&pair[0], &pair[1]);

        // Players are paired by steam id, not list position; a missing id in
        // the previous frame simply skips that player's diff.
        let previous_by_id: FxHashMap<u64, &PlayerFrameState> =
            previous.players().map(|p| (p.steam_id, p)).collect();

        for player in current.players() {
            if let Some(previous_player) = previous_by_id.get(&player.steam_id) {
                diff_player(timeline, current, previous_player, player);
            }
        }

        diff_volumes(timeline, previous, current);
    }
}

/// Evaluates every derived-event predicate for one player across one frame
/// pair. Predicates are independent; several can fire at once.
fn diff_player(
    timeline: &mut Timeline,
    frame: &Frame,
    previous: &PlayerFrameState,
    current: &PlayerFrameState,
) {
    let meta = frame_meta(frame);
    let snapshot = || player_view_snapshot(current);

    if previous.is_moving() && !current.is_moving() {
        timeline.push(Event::MovementStop { meta: meta.clone(), player: snapshot() });
    }
    if !previous.is_moving() && current.is_moving() {
        timeline.push(Event::MovementStart { meta: meta.clone(), player: snapshot() });
    }

    // A zero velocity has no direction; the angle is undefined then, not a
    // NaN to propagate.
    if let Some(degrees) = angle_between_degrees(previous.velocity(), current.velocity()) {
        if degrees > SIGNIFICANT_DIRECTION_CHANGE_DEGREES {
            timeline.push(Event::DirectionChange {
                meta: meta.clone(),
                player: snapshot(),
                old_velocity: [previous.velocity_x, previous.velocity_y, previous.velocity_z],
                new_velocity: [current.velocity_x, current.velocity_y, current.velocity_z],
            });
        }
    }

    let previous_speed = previous.speed();
    let current_speed = current.speed();
    if current_speed < previous_speed * SIGNIFICANT_SPEED_DROP_FACTOR {
        timeline.push(Event::SpeedDrop {
            meta: meta.clone(),
            player: snapshot(),
            old_speed: previous_speed,
            new_speed: current_speed,
        });
    }

    if current.is_reloading && !previous.is_reloading {
        if let Some(weapon) = current.held_weapon() {
            timeline.push(Event::ReloadStart {
                meta: meta.clone(),
                player: snapshot(),
                weapon: weapon.into(),
            });
        }
    }

    if !current.is_reloading && previous.is_reloading {
        if let (Some(held), Some(previously_held)) =
            (current.held_weapon(), previous.held_weapon())
        {
            let finished = held.same_identity(previously_held)
                && held.ammo_in_magazine > previously_held.ammo_in_magazine;
            if finished {
                timeline.push(Event::ReloadFinish {
                    meta: meta.clone(),
                    player: snapshot(),
                    weapon: held.into(),
                });
            } else {
                timeline.push(Event::ReloadCancel {
                    meta: meta.clone(),
                    player: snapshot(),
                    weapon: previously_held.into(),
                });
            }
        }
    }

    if current.is_scoped && !previous.is_scoped {
        if let Some(weapon) = current.held_weapon() {
            timeline.push(Event::Scope {
                meta: meta.clone(),
                player: snapshot(),
                weapon: weapon.into(),
            });
        }
    }
    if !current.is_scoped && previous.is_scoped {
        timeline.push(Event::Unscope {
            meta: meta.clone(),
            player: snapshot(),
            weapon: current.held_weapon().map(WeaponInfo::from),
        });
    }

    if let (Some(held), Some(previously_held)) = (current.held_weapon(), previous.held_weapon())
    {
        if !held.same_identity(previously_held) {
            timeline.push(Event::WeaponSwitch {
                meta: meta.clone(),
                player: snapshot(),
                previous_weapon: previously_held.into(),
                new_weapon: held.into(),
            });
        }
    }

    // Firing a shot already counts: one round fewer in the magazine makes a
    // weapon unequal to its previous self.
    let gained: Vec<WeaponInfo> = current
        .inventory
        .iter()
        .filter(|w| !previous.inventory.contains(w))
        .map(WeaponInfo::from)
        .collect();
    let lost: Vec<WeaponInfo> = previous
        .inventory
        .iter()
        .filter(|w| !current.inventory.contains(w))
        .map(WeaponInfo::from)
        .collect();
    if !gained.is_empty() || !lost.is_empty() {
        timeline.push(Event::InventoryChange {
            meta: meta.clone(),
            player: snapshot(),
            gained,
            lost,
        });
    }

    if previous.is_alive && !current.is_alive {
        timeline.push(Event::Death {
            meta: meta.clone(),
            player: player_snapshot(current),
        });
    }

    if current.has_bomb && !previous.has_bomb {
        timeline.push(Event::BombPickup {
            meta: meta.clone(),
            player: player_snapshot(current),
        });
    }
    if !current.has_bomb && previous.has_bomb {
        timeline.push(Event::BombDrop { meta, player: player_snapshot(current) });
    }
}

/// Diffs the frame-level smoke and fire lists for spawns and despawns.
/// Despawn events carry the entry's last known position.
fn diff_volumes(timeline: &mut Timeline, previous: &Frame, current: &Frame) {
    let meta = frame_meta(current);

    for smoke in current.smokes.iter().filter(|s| !previous.smokes.contains(s)) {
        timeline.push(Event::SmokeSpawn {
            meta: meta.clone(),
            grenade_entity_id: smoke.grenade_entity_id,
            position: smoke.position(),
        });
    }
    for smoke in previous.smokes.iter().filter(|s| !current.smokes.contains(s)) {
        timeline.push(Event::SmokeDespawn {
            meta: meta.clone(),
            grenade_entity_id: smoke.grenade_entity_id,
            position: smoke.position(),
        });
    }

    for fire in current.fires.iter().filter(|f| !previous.fires.contains(f)) {
        timeline.push(Event::FireSpawn {
            meta: meta.clone(),
            unique_id: fire.unique_id,
            position: fire.position(),
        });
    }
    for fire in previous.fires.iter().filter(|f| !current.fires.contains(f)) {
        timeline.push(Event::FireDespawn {
            meta: meta.clone(),
            unique_id: fire.unique_id,
            position: fire.position(),
        });
    }
}

fn frame_meta(frame: &Frame) -> EventMeta {
    EventMeta {
        tick: frame.tick,
        seconds: frame.seconds,
        clock_time: frame.clock_time.clone(),
    }
}

fn player_view_snapshot(player: &PlayerFrameState) -> PositionedPlayerView {
    PositionedPlayerView {
        player: player_ref(player),
        position: player.position(),
        view: player.view(),
    }
}

fn player_snapshot(player: &PlayerFrameState) -> PositionedPlayer {
    PositionedPlayer { player: player_ref(player), position: player.position() }
}

fn player_ref(player: &PlayerFrameState) -> PlayerRef {
    PlayerRef {
        steam_id: player.steam_id,
        team: player.team.clone(),
        side: player.side,
        name: player.name.clone(),
    }
}

fn positioned(
    steam_id: u64,
    team: &str,
    side: Side,
    name: &str,
    position: Position,
) -> PositionedPlayer {
    PositionedPlayer {
        player: PlayerRef { steam_id, team: team.to_string(), side, name: name.to_string() },
        position,
    }
}

fn positioned_view(
    steam_id: u64,
    team: &str,
    side: Side,
    name: &str,
    position: Position,
    view: ViewAngles,
) -> PositionedPlayerView {
    PositionedPlayerView {
        player: PlayerRef { steam_id, team: team.to_string(), side, name: name.to_string() },
        position,
        view,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_support::{
        test_frame, test_player, test_round, test_smoke, test_weapon,
    };
    use crate::models::{Fire, Grenade, Kill, PlayerConnection};
    use proptest::prelude::*;

    fn count_kind(timeline: &Timeline, matcher: impl Fn(&Event) -> bool) -> usize {
        timeline.events().iter().filter(|e| matcher(e)).count()
    }

    fn test_kill(tick: i64) -> Kill {
        Kill {
            tick,
            seconds: tick as f64 / 128.0,
            clock_time: "01:30".to_string(),
            attacker_steam_id: 1,
            attacker_name: "alice".to_string(),
            attacker_team: "Alpha".to_string(),
            attacker_side: Side::Ct,
            attacker_x: 0.0,
            attacker_y: 0.0,
            attacker_z: 0.0,
            attacker_view_x: 0.0,
            attacker_view_y: 0.0,
            victim_steam_id: 2,
            victim_name: "bob".to_string(),
            victim_team: "Bravo".to_string(),
            victim_side: Side::T,
            victim_x: 100.0,
            victim_y: 0.0,
            victim_z: 0.0,
            victim_view_x: 180.0,
            victim_view_y: 0.0,
            assister_steam_id: None,
            assister_name: None,
            assister_team: None,
            assister_side: None,
            is_suicide: false,
            is_teamkill: false,
            is_wallbang: false,
            penetrated_objects: 0,
            is_first_kill: false,
            is_headshot: true,
            is_victim_blinded: false,
            is_attacker_blinded: false,
            flash_thrower_steam_id: None,
            flash_thrower_name: None,
            flash_thrower_team: None,
            flash_thrower_side: None,
            is_no_scope: false,
            is_through_smoke: false,
            distance: 100.0,
            is_trade: true,
            player_traded_name: Some("carol".to_string()),
            player_traded_team: Some("Bravo".to_string()),
            player_traded_steam_id: Some(3),
            weapon: "AK-47".to_string(),
            weapon_class: "Rifle".to_string(),
        }
    }

    fn test_damage(tick: i64, hp_damage: i32, hp_damage_taken: i32) -> Damage {
        Damage {
            tick,
            seconds: tick as f64 / 128.0,
            clock_time: "01:29".to_string(),
            attacker_steam_id: 1,
            attacker_name: "alice".to_string(),
            attacker_team: "Alpha".to_string(),
            attacker_side: Side::Ct,
            attacker_x: 0.0,
            attacker_y: 0.0,
            attacker_z: 0.0,
            attacker_view_x: 0.0,
            attacker_view_y: 0.0,
            is_attacker_strafe: false,
            victim_steam_id: 2,
            victim_name: "bob".to_string(),
            victim_team: "Bravo".to_string(),
            victim_side: Side::T,
            victim_x: 100.0,
            victim_y: 0.0,
            victim_z: 0.0,
            victim_view_x: 180.0,
            victim_view_y: 0.0,
            weapon: "AK-47".to_string(),
            weapon_class: "Rifle".to_string(),
            hp_damage,
            hp_damage_taken,
            armor_damage: 5,
            armor_damage_taken: 5,
            hit_group: "Chest".to_string(),
            is_friendly_fire: false,
            distance: 100.0,
            zoom_level: 0,
        }
    }

    fn test_grenade(throw_tick: i64, destroy_tick: i64) -> Grenade {
        Grenade {
            throw_tick,
            destroy_tick,
            throw_seconds: throw_tick as f64 / 128.0,
            throw_clock_time: "01:45".to_string(),
            destroy_seconds: destroy_tick as f64 / 128.0,
            destroy_clock_time: "01:42".to_string(),
            thrower_steam_id: 1,
            thrower_name: "alice".to_string(),
            thrower_team: "Alpha".to_string(),
            thrower_side: Side::Ct,
            thrower_x: 0.0,
            thrower_y: 0.0,
            thrower_z: 0.0,
            grenade_type: "Smoke Grenade".to_string(),
            grenade_x: 500.0,
            grenade_y: 250.0,
            grenade_z: 0.0,
            entity_id: 77,
        }
    }

    #[test]
    fn test_round_scalars_become_three_events() {
        let round = test_round(Vec::new());
        let timeline = synthesize_round(&round).unwrap();

        assert_eq!(timeline.len(), 3);
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::RoundStart { .. })), 1);
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::FreezeTimeEnd { .. })), 1);
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::RoundEnd { .. })), 1);
    }

    #[test]
    fn test_discrete_log_event_counts_are_exact() {
        let mut round = test_round(Vec::new());
        round.kills = vec![test_kill(2000), test_kill(2100)];
        round.damages = vec![test_damage(1900, 27, 27)];
        round.grenades = vec![test_grenade(1500, 1800)];

        let timeline = synthesize_round(&round).unwrap();
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::Kill { .. })), 2);
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::Damage { .. })), 1);
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::GrenadeThrow { .. })), 1);
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::GrenadeTrigger { .. })), 1);
        // 3 scalar events + 2 kills + 1 damage + grenade throw and trigger.
        assert_eq!(timeline.len(), 8, "no drops, no duplicates");
        assert!(timeline.is_sorted_by_tick());
    }

    #[test]
    fn test_traded_player_side_is_attacker_opposite() {
        let mut round = test_round(Vec::new());
        round.kills = vec![test_kill(2000)];
        let timeline = synthesize_round(&round).unwrap();
        let traded = timeline
            .events()
            .iter()
            .find_map(|e| match e {
                Event::Kill { player_traded, .. } => player_traded.as_ref(),
                _ => None,
            })
            .expect("kill carries the traded player");
        assert_eq!(traded.side, Side::T);
    }

    #[test]
    fn test_damage_field_mismatch_is_loud() {
        let mut round = test_round(Vec::new());
        round.damages = vec![test_damage(1900, 27, 20)];
        let err = synthesize_round(&round);
        assert!(matches!(
            err,
            Err(AnalysisError::DamageFieldMismatch { field: "hp", dealt: 27, taken: 20, .. })
        ));
    }

    #[test]
    fn test_movement_start_without_direction_change() {
        let frame_a = test_frame(1000, vec![test_player(1, Side::Ct)], vec![]);
        let mut frame_b = test_frame(1064, vec![test_player(1, Side::Ct)], vec![]);
        frame_b.ct.players[0].velocity_x = 100.0;

        let round = test_round(vec![frame_a, frame_b]);
        let timeline = synthesize_round(&round).unwrap();

        let starts = count_kind(&timeline, |e| matches!(e, Event::MovementStart { .. }));
        assert_eq!(starts, 1, "standing still then moving is one start event");
        assert!(
            timeline.events().iter().any(
                |e| matches!(e, Event::MovementStart { meta, .. } if meta.tick == 1064)
            ),
            "derived events carry the current frame's tick"
        );
        assert_eq!(
            count_kind(&timeline, |e| matches!(e, Event::DirectionChange { .. })),
            0,
            "a zero previous velocity has no direction to change from"
        );
        // Accelerating from rest is never a speed drop either.
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::SpeedDrop { .. })), 0);
    }

    #[test]
    fn test_direction_change_threshold() {
        let mut frame_a = test_frame(1000, vec![test_player(1, Side::Ct)], vec![]);
        frame_a.ct.players[0].velocity_x = 100.0;
        let mut frame_b = test_frame(1064, vec![test_player(1, Side::Ct)], vec![]);
        // 45 degrees away at the same speed.
        frame_b.ct.players[0].velocity_x = 100.0 / 2.0_f64.sqrt();
        frame_b.ct.players[0].velocity_y = 100.0 / 2.0_f64.sqrt();

        let round = test_round(vec![frame_a, frame_b]);
        let timeline = synthesize_round(&round).unwrap();
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::DirectionChange { .. })), 1);
    }

    #[test]
    fn test_reload_finish_when_ammo_increased() {
        let mut frame_a = test_frame(1000, vec![test_player(1, Side::Ct)], vec![]);
        frame_a.ct.players[0].is_reloading = true;
        frame_a.ct.players[0].inventory = vec![test_weapon("AK-47", 3)];
        let mut frame_b = test_frame(1064, vec![test_player(1, Side::Ct)], vec![]);
        frame_b.ct.players[0].is_reloading = false;
        frame_b.ct.players[0].inventory = vec![test_weapon("AK-47", 30)];

        let round = test_round(vec![frame_a, frame_b]);
        let timeline = synthesize_round(&round).unwrap();

        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::ReloadFinish { .. })), 1);
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::ReloadCancel { .. })), 0);
    }

    #[test]
    fn test_reload_cancel_when_weapon_changed() {
        let mut frame_a = test_frame(1000, vec![test_player(1, Side::Ct)], vec![]);
        frame_a.ct.players[0].is_reloading = true;
        frame_a.ct.players[0].inventory = vec![test_weapon("AK-47", 3)];
        let mut frame_b = test_frame(1064, vec![test_player(1, Side::Ct)], vec![]);
        frame_b.ct.players[0].is_reloading = false;
        frame_b.ct.players[0].inventory = vec![test_weapon("M4A4", 30)];

        let round = test_round(vec![frame_a, frame_b]);
        let timeline = synthesize_round(&round).unwrap();

        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::ReloadCancel { .. })), 1);
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::ReloadFinish { .. })), 0);
        // Swapping rifles also switches weapons and changes the inventory.
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::WeaponSwitch { .. })), 1);
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::InventoryChange { .. })), 1);
    }

    #[test]
    fn test_reload_checks_skip_empty_inventories() {
        let mut frame_a = test_frame(1000, vec![test_player(1, Side::Ct)], vec![]);
        frame_a.ct.players[0].is_reloading = true;
        frame_a.ct.players[0].inventory.clear();
        let mut frame_b = test_frame(1064, vec![test_player(1, Side::Ct)], vec![]);
        frame_b.ct.players[0].is_reloading = false;
        frame_b.ct.players[0].inventory.clear();

        let round = test_round(vec![frame_a, frame_b]);
        let timeline = synthesize_round(&round).unwrap();
        assert_eq!(
            count_kind(&timeline, |e| matches!(
                e,
                Event::ReloadFinish { .. } | Event::ReloadCancel { .. }
            )),
            0,
            "empty inventories skip the reload outcome checks"
        );
    }

    #[test]
    fn test_ammo_change_is_inventory_change_not_weapon_switch() {
        let mut frame_a = test_frame(1000, vec![test_player(1, Side::Ct)], vec![]);
        frame_a.ct.players[0].inventory = vec![test_weapon("AK-47", 30)];
        let mut frame_b = test_frame(1064, vec![test_player(1, Side::Ct)], vec![]);
        frame_b.ct.players[0].inventory = vec![test_weapon("AK-47", 29)];

        let round = test_round(vec![frame_a, frame_b]);
        let timeline = synthesize_round(&round).unwrap();

        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::WeaponSwitch { .. })), 0);
        let change = timeline
            .events()
            .iter()
            .find_map(|e| match e {
                Event::InventoryChange { gained, lost, .. } => Some((gained, lost)),
                _ => None,
            })
            .expect("firing a round changes the inventory");
        assert_eq!(change.0.len(), 1);
        assert_eq!(change.1.len(), 1);
    }

    #[test]
    fn test_scope_and_unscope_flips() {
        let mut frame_a = test_frame(1000, vec![test_player(1, Side::Ct)], vec![]);
        frame_a.ct.players[0].is_scoped = false;
        let mut frame_b = test_frame(1064, vec![test_player(1, Side::Ct)], vec![]);
        frame_b.ct.players[0].is_scoped = true;
        let mut frame_c = test_frame(1128, vec![test_player(1, Side::Ct)], vec![]);
        frame_c.ct.players[0].is_scoped = false;

        let round = test_round(vec![frame_a, frame_b, frame_c]);
        let timeline = synthesize_round(&round).unwrap();
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::Scope { .. })), 1);
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::Unscope { .. })), 1);
    }

    #[test]
    fn test_death_and_bomb_possession_flips() {
        let mut frame_a = test_frame(1000, vec![test_player(1, Side::Ct)], vec![test_player(2, Side::T)]);
        frame_a.t.players[0].has_bomb = true;
        let mut frame_b = test_frame(1064, vec![test_player(1, Side::Ct)], vec![test_player(2, Side::T)]);
        frame_b.t.players[0].has_bomb = false;
        frame_b.t.players[0].is_alive = false;
        frame_b.t.players[0].hp = 0;
        frame_b.ct.players[0].has_bomb = true;

        let round = test_round(vec![frame_a, frame_b]);
        let timeline = synthesize_round(&round).unwrap();
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::Death { .. })), 1);
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::BombDrop { .. })), 1);
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::BombPickup { .. })), 1);
    }

    #[test]
    fn test_smoke_despawn_carries_last_position() {
        let mut frame_a = test_frame(1000, vec![test_player(1, Side::Ct)], vec![]);
        frame_a.smokes.push(test_smoke(42, 512.0, 256.0, 8.0));
        let frame_b = test_frame(1064, vec![test_player(1, Side::Ct)], vec![]);

        let round = test_round(vec![frame_a, frame_b]);
        let timeline = synthesize_round(&round).unwrap();

        let despawns: Vec<_> = timeline
            .events()
            .iter()
            .filter_map(|e| match e {
                Event::SmokeDespawn { grenade_entity_id, position, .. } => {
                    Some((*grenade_entity_id, *position))
                }
                _ => None,
            })
            .collect();
        assert_eq!(despawns.len(), 1, "one vanished smoke, one despawn event");
        assert_eq!(despawns[0].0, 42);
        assert_eq!(despawns[0].1, Position::new(512.0, 256.0, 8.0));
    }

    #[test]
    fn test_fire_spawn_and_despawn() {
        let mut frame_a = test_frame(1000, vec![test_player(1, Side::Ct)], vec![]);
        frame_a.fires.push(Fire { unique_id: 9, x: 1.0, y: 2.0, z: 3.0 });
        let mut frame_b = test_frame(1064, vec![test_player(1, Side::Ct)], vec![]);
        frame_b.fires.push(Fire { unique_id: 10, x: 4.0, y: 5.0, z: 6.0 });

        let round = test_round(vec![frame_a, frame_b]);
        let timeline = synthesize_round(&round).unwrap();
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::FireSpawn { .. })), 1);
        assert_eq!(count_kind(&timeline, |e| matches!(e, Event::FireDespawn { .. })), 1);
    }

    #[test]
    fn test_event_ticks_lie_within_round_bounds() {
        let mut round = test_round(vec![
            test_frame(1000, vec![test_player(1, Side::Ct)], vec![]),
            test_frame(1064, vec![test_player(1, Side::Ct)], vec![]),
        ]);
        round.kills = vec![test_kill(1500)];
        round.grenades = vec![test_grenade(1200, 1400)];

        let timeline = synthesize_round(&round).unwrap();
        for event in timeline.events() {
            assert!(
                (round.start_tick..=round.end_official_tick).contains(&event.tick()),
                "event at tick {} escapes the round",
                event.tick()
            );
        }
    }

    #[test]
    fn test_match_timeline_includes_connections() {
        let demo = Demo {
            match_id: "m1".to_string(),
            client_name: "GOTV".to_string(),
            map_name: "de_test".to_string(),
            tick_rate: 128,
            player_connections: vec![
                PlayerConnection { tick: 10, action: "connect".to_string(), steam_id: 1 },
                PlayerConnection { tick: 20, action: "connect".to_string(), steam_id: 2 },
            ],
            game_rounds: vec![test_round(Vec::new())],
        };
        let timeline = synthesize_match(&demo).unwrap();
        assert_eq!(
            count_kind(&timeline, |e| matches!(e, Event::PlayerConnection { .. })),
            2
        );
        assert!(timeline.is_sorted_by_tick());
    }

    proptest! {
        /// The finished timeline is sorted no matter what tick order the
        /// inputs arrive in.
        #[test]
        fn prop_timeline_sorted_for_arbitrary_connection_ticks(
            ticks in proptest::collection::vec(0i64..1_000_000, 0..40)
        ) {
            let demo = Demo {
                match_id: "m1".to_string(),
                client_name: "GOTV".to_string(),
                map_name: "de_test".to_string(),
                tick_rate: 128,
                player_connections: ticks
                    .iter()
                    .enumerate()
                    .map(|(i, tick)| PlayerConnection {
                        tick: *tick,
                        action: "connect".to_string(),
                        steam_id: i as u64,
                    })
                    .collect(),
                game_rounds: Vec::new(),
            };
            let timeline = synthesize_match(&demo).unwrap();
            prop_assert!(timeline.is_sorted_by_tick());
            prop_assert_eq!(timeline.len(), ticks.len());
        }
    }
}
