use std::sync::Arc;

use boat_blitz::catalog::Catalog;
use boat_blitz::combat;
use boat_blitz::compute::{key_down, tick};
use boat_blitz::config::RunConfig;
use boat_blitz::constants::*;
use boat_blitz::entities::*;
use boat_blitz::input::{InputState, Key, PLAYER_ONE_CONTROLS};
use boat_blitz::qte;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn make_state(vehicle: &str) -> GameState {
    let catalog = Arc::new(Catalog::embedded().unwrap());
    let config = RunConfig { vehicle: vehicle.into(), ..RunConfig::default() };
    let mut s = boat_blitz::compute::init_run(catalog, &config, 0, &mut seeded_rng()).unwrap();
    s.enemies.clear();
    s
}

/// A plain boss shot just inside the player's danger zone, not touching them.
fn incoming_shot(state: &mut GameState) -> EntityId {
    let p = &state.players[0];
    let (x, y) = (p.x + 15.0, p.y - 100.0);
    let id = state.alloc_id();
    state.boss_projectiles.push(BossProjectile {
        id,
        x,
        y,
        w: BOSS_PROJECTILE_WIDTH,
        h: BOSS_PROJECTILE_HEIGHT,
        dx: 0.0,
        dy: BOSS_PROJECTILE_SPEED,
        status: None,
        created_at: 0,
        lifetime: None,
        health: None,
    });
    id
}

fn triggered(now: u64) -> GameState {
    let mut s = make_state("p5");
    incoming_shot(&mut s);
    combat::resolve_threats(&mut s, now, &mut seeded_rng());
    assert!(s.qte.is_some());
    s
}

fn sequence(state: &GameState) -> Vec<Direction> {
    state.qte.as_ref().unwrap().sequence.clone()
}

// ── Successful dodge ──────────────────────────────────────────────

#[test]
fn typed_sequence_dodges_the_threat() {
    let mut s = triggered(100);
    assert!(s.events.contains(&FrameEvent::QteStarted { player: PlayerId::One }));
    assert_eq!(sequence(&s).len(), QTE_SEQUENCE_LENGTH);
    let start_x = s.players[0].x;
    let hp = s.players[0].hp;
    let mut input = InputState::new();

    for dir in sequence(&s) {
        key_down(&mut s, &mut input, PLAYER_ONE_CONTROLS.key_for(dir), 200);
    }

    assert!(s.qte.is_none());
    assert!(s.boss_projectiles.is_empty());
    assert_eq!(s.players[0].hp, hp);
    assert_eq!(s.players[0].x, start_x - QTE_DODGE_DISTANCE);
    assert!(s.events.contains(&FrameEvent::QteResolved {
        player: PlayerId::One,
        resolution: QteResolution::Dodged,
    }));
    // Keys typed into the session are not held afterwards.
    assert!(sequence_keys_released(&input));
}

fn sequence_keys_released(input: &InputState) -> bool {
    [Key::W, Key::A, Key::S, Key::D].iter().all(|k| !input.is_pressed(*k))
}

#[test]
fn wrong_key_takes_one_reduced_hit() {
    let mut s = triggered(100);
    let first = sequence(&s)[0];
    let wrong = [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
        .into_iter()
        .find(|d| *d != first)
        .unwrap();
    let before = s.players[0].hp;

    key_down(&mut s, &mut InputState::new(), PLAYER_ONE_CONTROLS.key_for(wrong), 200);

    assert!(s.qte.is_none());
    assert!(s.boss_projectiles.is_empty());
    assert!((before - s.players[0].hp - 8.0).abs() < 1e-4);
    assert!(s.events.contains(&FrameEvent::QteResolved {
        player: PlayerId::One,
        resolution: QteResolution::Failed,
    }));
}

#[test]
fn unrelated_keys_are_swallowed() {
    let mut s = triggered(100);
    let mut input = InputState::new();
    key_down(&mut s, &mut input, Key::Space, 150);
    key_down(&mut s, &mut input, Key::ArrowUp, 160);
    assert!(s.qte.is_some());
    assert_eq!(s.qte.as_ref().unwrap().progress, 0);
    assert!(!input.is_pressed(Key::Space));
}

#[test]
fn session_times_out_as_a_hit() {
    let mut s = triggered(100);
    let before = s.players[0].hp;

    qte::check_timeout(&mut s, 100 + QTE_SLOW_MO_DURATION);
    assert!(s.qte.is_some());

    qte::check_timeout(&mut s, 101 + QTE_SLOW_MO_DURATION);
    assert!(s.qte.is_none());
    assert!(s.players[0].hp < before);
    assert!(s.events.contains(&FrameEvent::QteResolved {
        player: PlayerId::One,
        resolution: QteResolution::TimedOut,
    }));
}

#[test]
fn cooldown_blocks_immediate_retrigger() {
    let mut s = triggered(100);
    let mut input = InputState::new();
    for dir in sequence(&s) {
        key_down(&mut s, &mut input, PLAYER_ONE_CONTROLS.key_for(dir), 200);
    }

    incoming_shot(&mut s);
    combat::resolve_threats(&mut s, 300, &mut seeded_rng());
    assert!(s.qte.is_none());

    combat::resolve_threats(&mut s, 200 + QTE_COOLDOWN, &mut seeded_rng());
    assert!(s.qte.is_some());
}

#[test]
fn only_aegis_pilots_dodge() {
    let mut s = make_state("p1");
    incoming_shot(&mut s);
    combat::resolve_threats(&mut s, 100, &mut seeded_rng());
    assert!(s.qte.is_none());
    assert_eq!(s.boss_projectiles.len(), 1);
}

#[test]
fn held_threat_cannot_hit_during_session() {
    let mut s = triggered(100);
    let (px, py) = (s.players[0].x, s.players[0].y);
    let shot = &mut s.boss_projectiles[0];
    shot.x = px;
    shot.y = py;
    let before = s.players[0].hp;

    combat::resolve_threats(&mut s, 150, &mut seeded_rng());

    assert_eq!(s.players[0].hp, before);
    assert!(s.qte.is_some());
}

#[test]
fn world_crawls_and_guns_stay_quiet_during_session() {
    let mut s = triggered(100);
    let mut input = InputState::new();
    input.press(Key::Space);
    input.press(Key::A);
    let (px, shot_y) = (s.players[0].x, s.boss_projectiles[0].y);

    tick(&mut s, &mut input, 116, &mut seeded_rng()).unwrap();

    assert_eq!(s.players[0].x, px);
    let moved = s.boss_projectiles[0].y - shot_y;
    assert!((moved - BOSS_PROJECTILE_SPEED * QTE_SLOW_MO_FACTOR).abs() < 1e-4);
    assert!(!s.events.iter().any(|e| matches!(e, FrameEvent::WeaponFired { .. })));
    assert!(s.projectiles.is_empty());
}

#[test]
fn dodge_pulse_clears_plain_shots_nearby() {
    let mut s = triggered(100);
    let (cx, cy) = (s.players[0].x - QTE_DODGE_DISTANCE + 25.0, s.players[0].y + 25.0);
    for status in [None, Some(StatusHit { kind: StatusKind::Slow, duration: 1000 })] {
        let id = s.alloc_id();
        s.boss_projectiles.push(BossProjectile {
            id,
            x: cx - 10.0,
            y: cy - 60.0,
            w: BOSS_PROJECTILE_WIDTH,
            h: BOSS_PROJECTILE_HEIGHT,
            dx: 0.0,
            dy: 0.0,
            status,
            created_at: 0,
            lifetime: None,
            health: None,
        });
    }
    let mut input = InputState::new();
    for dir in sequence(&s) {
        key_down(&mut s, &mut input, PLAYER_ONE_CONTROLS.key_for(dir), 200);
    }
    assert_eq!(s.boss_projectiles.len(), 1);
    assert!(s.boss_projectiles[0].is_status());
}
