//! Benchmarks for the vision hot path. The per-ray step march dominates the
//! whole pipeline, so regressions here are regressions everywhere.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use dl_core::models::{Bomb, Frame, PlayerFrameState, TeamFrameState, Weapon};
use dl_core::vision::{build_vision_graph, trace_vision, TraceConfig};
use dl_core::{NavGraph, NavRegion, Position, Side};

/// A square map of `side x side` regions, each 100 units, 4-connected.
fn grid_nav(side: u32) -> NavGraph {
    let mut regions = Vec::new();
    let mut edges = Vec::new();
    for row in 0..side {
        for col in 0..side {
            let id = row * side + col + 1;
            let x = col as f64 * 100.0;
            let y = row as f64 * 100.0;
            regions.push(NavRegion::new(
                id,
                Position::new(x, y + 100.0, 0.0),
                Position::new(x + 100.0, y, 0.0),
            ));
            if col + 1 < side {
                edges.push((id, id + 1));
            }
            if row + 1 < side {
                edges.push((id, id + side));
            }
        }
    }
    NavGraph::from_regions(regions, &edges).expect("grid map is well formed")
}

fn bench_player(steam_id: u64, side: Side, x: f64, y: f64, yaw: f64) -> PlayerFrameState {
    PlayerFrameState {
        steam_id,
        name: format!("player_{steam_id}"),
        team: "Alpha".to_string(),
        side,
        x,
        y,
        z: 0.0,
        velocity_x: 0.0,
        velocity_y: 0.0,
        velocity_z: 0.0,
        view_x: yaw,
        view_y: 0.0,
        hp: 100,
        armor: 100,
        active_weapon: "AK-47".to_string(),
        total_utility: 0,
        is_alive: true,
        is_blinded: false,
        is_airborne: false,
        is_ducking: false,
        is_ducking_in_progress: false,
        is_unducking_in_progress: false,
        is_defusing: false,
        is_planting: false,
        is_reloading: false,
        is_in_bomb_zone: false,
        is_in_buy_zone: false,
        is_standing: true,
        is_scoped: false,
        is_walking: false,
        is_unknown: false,
        inventory: vec![Weapon {
            name: "AK-47".to_string(),
            weapon_class: "Rifle".to_string(),
            ammo_in_magazine: 30,
            ammo_in_reserve: 90,
        }],
        equipment_value: 2700,
        equipment_value_freeze_time_end: 2700,
        equipment_value_round_start: 200,
        cash: 800,
        cash_spend_this_round: 2700,
        cash_spend_total: 2700,
        has_helmet: true,
        has_defuse_kit: false,
        has_bomb: false,
        ping: 20,
        zoom_level: 0,
    }
}

fn bench_team(side: Side, players: Vec<PlayerFrameState>) -> TeamFrameState {
    TeamFrameState {
        side,
        team_name: "Alpha".to_string(),
        team_eq_val: 10000,
        alive_players: players.len() as i32,
        total_utility: 0,
        players,
    }
}

fn bench_frame(ct: Vec<PlayerFrameState>, t: Vec<PlayerFrameState>) -> Frame {
    Frame {
        is_kill_frame: false,
        tick: 1000,
        seconds: 7.8,
        clock_time: "01:47".to_string(),
        t: bench_team(Side::T, t),
        ct: bench_team(Side::Ct, ct),
        bomb_planted: false,
        bomb_site: String::new(),
        bomb: Bomb { x: 0.0, y: 0.0, z: 0.0 },
        projectiles: Vec::new(),
        smokes: Vec::new(),
        fires: Vec::new(),
    }
}

fn bench_trace_single_player(c: &mut Criterion) {
    let nav = grid_nav(32);
    let player = bench_player(1, Side::Ct, 1600.0, 1600.0, 45.0);
    let frame = bench_frame(vec![player.clone()], Vec::new());
    let config = TraceConfig::default();

    c.bench_function("trace_vision/32x32_grid", |b| {
        b.iter(|| trace_vision(black_box(&player), &frame, &nav, &config))
    });
}

fn bench_full_frame_ten_players(c: &mut Criterion) {
    let nav = grid_nav(32);
    let ct: Vec<_> = (0..5)
        .map(|i| bench_player(i + 1, Side::Ct, 400.0 + i as f64 * 150.0, 600.0, 0.0))
        .collect();
    let t: Vec<_> = (0..5)
        .map(|i| bench_player(i + 6, Side::T, 400.0 + i as f64 * 150.0, 2600.0, 270.0))
        .collect();
    let frame = bench_frame(ct, t);
    let config = TraceConfig::default();

    c.bench_function("build_vision_graph/10_players", |b| {
        b.iter(|| build_vision_graph(black_box(&frame), &nav, &config))
    });
}

criterion_group!(benches, bench_trace_single_player, bench_full_frame_ten_players);
criterion_main!(benches);
