use std::sync::Arc;

use boat_blitz::catalog::Catalog;
use boat_blitz::combat;
use boat_blitz::compute::*;
use boat_blitz::config::RunConfig;
use boat_blitz::constants::*;
use boat_blitz::entities::*;
use boat_blitz::error::GameError;
use boat_blitz::input::{InputState, Key};
use boat_blitz::timers::Expiry;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn config() -> RunConfig {
    RunConfig::default()
}

fn make_state(config: &RunConfig) -> GameState {
    let catalog = Arc::new(Catalog::embedded().unwrap());
    init_run(catalog, config, 0, &mut seeded_rng()).unwrap()
}

fn bomb_at(state: &mut GameState, x: f32, y: f32, damage: f32) {
    let id = state.alloc_id();
    state.projectiles.push(Projectile {
        id,
        owner: PlayerId::One,
        kind: ProjectileKind::Bomb,
        x,
        y,
        w: BOMB_WIDTH,
        h: BOMB_HEIGHT,
        damage,
        vy: -BOMB_SPEED,
        glyph: 'o',
    });
}

fn enemy_at(state: &mut GameState, x: f32, y: f32) -> EntityId {
    let id = state.alloc_id();
    state.enemies.push(Enemy {
        id,
        x,
        y,
        w: ENEMY_WIDTH,
        h: ENEMY_HEIGHT,
        glyph: 'e',
        dx: None,
        dy: None,
        health: None,
    });
    id
}

fn make_invincible(state: &mut GameState) {
    state
        .buffs
        .invincible
        .activate(&mut state.timers, 0, 10_000_000, Expiry::Invincibility);
}

// ── init_run ──────────────────────────────────────────────────────────────────

#[test]
fn init_run_sets_up_first_level() {
    let s = make_state(&config());
    assert_eq!(s.level, 1);
    assert_eq!(s.players.len(), 1);
    assert_eq!(s.enemies.len(), 8);
    assert!(s.enemies.iter().all(|e| e.y < 0.0));
    assert!(s.boss.is_none());
    assert_eq!(s.status, GameStatus::Playing);
    assert!(s.outcome.is_none());
}

#[test]
fn init_run_applies_vehicle_hp_multiplier() {
    let s = make_state(&RunConfig { vehicle: "p3".into(), ..config() });
    assert_eq!(s.players[0].max_hp, PLAYER_BASE_HP * 2.0);
    assert_eq!(s.players[0].hp, s.players[0].max_hp);
}

#[test]
fn init_run_fills_ammo_from_gun() {
    let s = make_state(&RunConfig { gun: Some("g2".into()), ..config() });
    assert_eq!(s.players[0].ammo, 50);
}

#[test]
fn init_run_multiplayer_has_two_players_apart() {
    let s = make_state(&RunConfig { multiplayer: true, ..config() });
    assert_eq!(s.players.len(), 2);
    assert!(s.players[0].x < s.players[1].x);
}

#[test]
fn init_run_rejects_unknown_gun() {
    let catalog = Arc::new(Catalog::embedded().unwrap());
    let bad = RunConfig { gun: Some("nope".into()), ..config() };
    let err = init_run(catalog, &bad, 0, &mut seeded_rng()).unwrap_err();
    assert!(matches!(err, GameError::UnknownGun(id) if id == "nope"));
}

#[test]
fn init_run_rejects_unknown_level() {
    let catalog = Arc::new(Catalog::embedded().unwrap());
    let bad = RunConfig { start_level: 99, ..config() };
    let err = init_run(catalog, &bad, 0, &mut seeded_rng()).unwrap_err();
    assert!(matches!(err, GameError::UnknownLevel(99)));
}

// ── Basic kill ────────────────────────────────────────────────────

#[test]
fn bomb_kills_enemy_and_drops_currency() {
    let mut s = make_state(&config());
    s.enemies.clear();
    enemy_at(&mut s, 100.0, 100.0);
    bomb_at(&mut s, 107.5, 120.0, 1.0);

    combat::resolve_player_shots(&mut s, 0, &mut seeded_rng());

    assert!(s.enemies.is_empty());
    assert!(s.projectiles.is_empty());
    assert_eq!(s.players[0].score, ENEMY_SCORE);
    assert_eq!(s.run_xp, ENEMY_XP_DROP);
    assert_eq!(s.drops.len(), 1);
    assert_eq!(s.drops[0].kind, DropKind::Currency);
    assert_eq!((s.drops[0].x, s.drops[0].y), (100.0, 100.0));
    assert_eq!(s.drops[0].amount, ENEMY_CURRENCY_DROP);
}

// ── Cleared wave brings the boss ─────────────────────────────────

#[test]
fn cleared_wave_spawns_configured_boss() {
    let mut s = make_state(&config());
    s.enemies.clear();
    let mut input = InputState::new();

    tick(&mut s, &mut input, 16, &mut seeded_rng()).unwrap();

    assert!(s.is_boss_active());
    let boss = s.boss.as_ref().unwrap();
    assert_eq!(boss.kind, BossKind::Octopus);
    assert_eq!(boss.health, 20.0);
    assert_eq!(boss.max_health, 20.0);
    assert!(s.events.contains(&FrameEvent::BossSpawned { kind: BossKind::Octopus }));

    let id = boss.id;
    tick(&mut s, &mut input, 32, &mut seeded_rng()).unwrap();
    assert_eq!(s.boss.as_ref().map(|b| b.id), Some(id));
}

#[test]
fn boss_waits_for_the_wave() {
    let mut s = make_state(&config());
    tick(&mut s, &mut InputState::new(), 16, &mut seeded_rng()).unwrap();
    assert!(!s.is_boss_active());
}

// ── Damage reduction ─────────────────────────────────────────────

#[test]
fn damage_reduction_scales_incoming_hits() {
    let mut s = make_state(&RunConfig { vehicle: "p3".into(), ..config() });
    let dealt = combat::incoming_damage(&s, HIT_DAMAGE);
    assert!((dealt - 8.0).abs() < 1e-4);

    let before = s.players[0].hp;
    combat::damage_player(&mut s, PlayerId::One, dealt);
    assert!((before - s.players[0].hp - 8.0).abs() < 1e-4);
}

// ── Rapid fire ────────────────────────────────────────────────────

fn gunner() -> GameState {
    let mut s = make_state(&RunConfig { gun: Some("g1".into()), ..config() });
    s.players[0].weapon = WeaponSelection::Gun;
    s
}

#[test]
fn second_shot_inside_cooldown_is_rejected() {
    let mut s = gunner();
    assert!(combat::try_fire(&mut s, PlayerId::One, 1000));
    assert!(!combat::try_fire(&mut s, PlayerId::One, 1060));
}

#[test]
fn rapid_fire_halves_gun_cooldown() {
    let mut s = gunner();
    s.buffs
        .rapid_fire
        .activate(&mut s.timers, 1000, RAPID_FIRE_DURATION, Expiry::RapidFire);
    assert!(combat::try_fire(&mut s, PlayerId::One, 1000));
    assert!(combat::try_fire(&mut s, PlayerId::One, 1060));
    assert_eq!(s.players[0].ammo, 98);
}

// ── Run completion ────────────────────────────────────────────────

#[test]
fn beating_final_boss_ends_run_once() {
    let final_level = Catalog::embedded().unwrap().final_level();
    let mut s = make_state(&RunConfig { start_level: final_level, ..config() });
    make_invincible(&mut s);
    s.enemies.clear();
    let mut input = InputState::new();
    let mut rng = seeded_rng();

    tick(&mut s, &mut input, 16, &mut rng).unwrap();
    s.boss.as_mut().unwrap().health = 0.0;
    tick(&mut s, &mut input, 32, &mut rng).unwrap();

    assert_eq!(s.status, GameStatus::Victory);
    let outcome = s.outcome.clone().unwrap();
    assert!(outcome.won);
    assert_eq!(outcome.scores.len(), 1);
    assert_eq!(outcome.scores[0], BOSS_KILL_SCORE_PER_LEVEL * final_level);
    assert_eq!(
        s.events.iter().filter(|e| matches!(e, FrameEvent::RunEnded { .. })).count(),
        1
    );
    assert_eq!(s.level, final_level);
    assert!(s.enemies.is_empty());
    assert!(s.boss.is_none());

    tick(&mut s, &mut input, 48, &mut rng).unwrap();
    assert_eq!(s.outcome, Some(outcome));
    assert!(s.boss.is_none());
}

#[test]
fn beating_a_boss_advances_level() {
    let mut s = make_state(&config());
    make_invincible(&mut s);
    s.enemies.clear();
    let mut input = InputState::new();
    let mut rng = seeded_rng();

    tick(&mut s, &mut input, 16, &mut rng).unwrap();
    s.boss.as_mut().unwrap().health = 0.0;
    tick(&mut s, &mut input, 32, &mut rng).unwrap();

    assert_eq!(s.level, 2);
    assert_eq!(s.enemies.len(), 12);
    assert!(s.boss.is_none());
    assert_eq!(s.players[0].score, BOSS_KILL_SCORE_PER_LEVEL);
    assert_eq!(s.run_xp, BOSS_XP_PER_LEVEL);
    assert!(s.events.contains(&FrameEvent::LevelAdvanced { level: 2 }));
    assert_eq!(s.status, GameStatus::Playing);
}

#[test]
fn level_advance_releases_held_keys() {
    let mut s = make_state(&config());
    make_invincible(&mut s);
    s.enemies.clear();
    let mut input = InputState::new();
    let mut rng = seeded_rng();

    tick(&mut s, &mut input, 16, &mut rng).unwrap();
    key_down(&mut s, &mut input, Key::D, 20);
    assert!(input.is_pressed(Key::D));
    s.boss.as_mut().unwrap().health = 0.0;
    tick(&mut s, &mut input, 32, &mut rng).unwrap();

    assert!(s.events.contains(&FrameEvent::LevelAdvanced { level: 2 }));
    assert!(!input.is_pressed(Key::D));

    let x = s.players[0].x;
    tick(&mut s, &mut input, 48, &mut rng).unwrap();
    assert_eq!(s.players[0].x, x);
}

#[test]
fn multiplayer_boss_kill_is_split() {
    let mut s = make_state(&RunConfig { multiplayer: true, ..config() });
    make_invincible(&mut s);
    s.enemies.clear();
    let mut rng = seeded_rng();
    tick(&mut s, &mut InputState::new(), 16, &mut rng).unwrap();
    s.boss.as_mut().unwrap().health = 0.0;
    defeat_boss(&mut s, 32, &mut rng).unwrap();
    assert_eq!(s.players[0].score, BOSS_KILL_SCORE_PER_LEVEL / 2);
    assert_eq!(s.players[1].score, BOSS_KILL_SCORE_PER_LEVEL / 2);
}

#[test]
fn last_player_down_ends_run() {
    let mut s = make_state(&config());
    s.players[0].hp = 0.0;
    tick(&mut s, &mut InputState::new(), 16, &mut seeded_rng()).unwrap();

    assert_eq!(s.status, GameStatus::GameOver);
    assert!(s.players[0].dead);
    assert_eq!(s.players[0].x, DEAD_PLAYER_X);
    let outcome = s.outcome.as_ref().unwrap();
    assert!(!outcome.won);
}

#[test]
fn one_survivor_keeps_multiplayer_run_alive() {
    let mut s = make_state(&RunConfig { multiplayer: true, ..config() });
    s.players[1].hp = 0.0;
    tick(&mut s, &mut InputState::new(), 16, &mut seeded_rng()).unwrap();
    assert!(s.players[1].dead);
    assert_eq!(s.status, GameStatus::Playing);
}

// ── Properties ────────────────────────────────────────────────────────────────

#[test]
fn players_stay_inside_arena() {
    let mut s = make_state(&RunConfig { multiplayer: true, ..config() });
    make_invincible(&mut s);
    let mut input = InputState::new();
    for key in [Key::A, Key::W, Key::ArrowRight, Key::ArrowDown] {
        input.press(key);
    }
    let mut rng = seeded_rng();
    for i in 1..=200 {
        tick(&mut s, &mut input, i * 16, &mut rng).unwrap();
        for p in s.live_players() {
            assert!(p.x >= 0.0 && p.x <= ARENA_WIDTH - p.w);
            assert!(p.y >= 0.0 && p.y <= ARENA_HEIGHT - p.h);
        }
    }
    assert_eq!(s.players[0].x, 0.0);
    assert_eq!(s.players[0].y, 0.0);
    assert_eq!(s.players[1].x, ARENA_WIDTH - PLAYER_WIDTH);
    assert_eq!(s.players[1].y, ARENA_HEIGHT - PLAYER_HEIGHT);
}

#[test]
fn health_stays_in_bounds_over_a_long_fight() {
    let mut s = make_state(&RunConfig { start_level: 10, ..config() });
    s.enemies.clear();
    let mut input = InputState::new();
    input.press(Key::Space);
    let mut rng = seeded_rng();
    for i in 1..=600 {
        tick(&mut s, &mut input, i * 16, &mut rng).unwrap();
        for p in &s.players {
            assert!(p.hp >= 0.0 && p.hp <= p.max_hp);
        }
        if let Some(b) = &s.boss {
            assert!(b.health >= 0.0 && b.health <= b.max_health);
        }
        if s.status != GameStatus::Playing {
            break;
        }
    }
}

#[test]
fn empty_gun_never_fires() {
    let mut s = gunner();
    s.players[0].ammo = 0;
    let mut input = InputState::new();
    input.press(Key::Space);
    let mut rng = seeded_rng();
    for i in 1..=30 {
        tick(&mut s, &mut input, i * 100, &mut rng).unwrap();
        assert!(!s.events.iter().any(|e| matches!(e, FrameEvent::WeaponFired { .. })));
    }
    assert!(s.projectiles.iter().all(|p| p.kind != ProjectileKind::Bullet));
    assert_eq!(s.players[0].ammo, 0);
}

// ── Input ─────────────────────────────────────────────────────────────────────

#[test]
fn swap_key_toggles_weapon_only_with_gun() {
    let mut input = InputState::new();

    let mut plain = make_state(&config());
    key_down(&mut plain, &mut input, Key::Q, 0);
    assert_eq!(plain.players[0].weapon, WeaponSelection::Bomb);

    let mut armed = gunner();
    key_down(&mut armed, &mut input, Key::Q, 0);
    assert_eq!(armed.players[0].weapon, WeaponSelection::Bomb);
    key_down(&mut armed, &mut input, Key::Q, 0);
    assert_eq!(armed.players[0].weapon, WeaponSelection::Gun);
}

#[test]
fn pause_drops_debuffs_and_held_keys() {
    let mut s = make_state(&config());
    let mut input = InputState::new();
    input.press(Key::D);
    s.players[0]
        .status
        .stunned
        .activate(&mut s.timers, 0, 2000, Expiry::Stun(PlayerId::One));
    s.buffs
        .gold_rush
        .activate(&mut s.timers, 0, GOLD_RUSH_DURATION, Expiry::GoldRush);

    pause(&mut s, &mut input);

    assert!(!s.players[0].status.stunned.is_active());
    assert!(!input.is_pressed(Key::D));
    assert!(s.buffs.gold_rush.is_active());
    assert_eq!(s.timers.len(), 1);
}

// ── Consumables & timers ──────────────────────────────────────────────────────

fn with_consumable(id: &str, quantity: u32) -> GameState {
    make_state(&RunConfig {
        consumable: Some(id.into()),
        consumable_quantity: quantity,
        ..config()
    })
}

#[test]
fn shield_expires_through_its_timer() {
    let mut s = with_consumable("pw1", 1);
    assert!(use_consumable(&mut s, 0));
    assert!(s.buffs.invincible.is_active());
    assert_eq!(s.consumables_left, 0);
    assert!(!use_consumable(&mut s, 10));

    tick(&mut s, &mut InputState::new(), INVINCIBILITY_DURATION, &mut seeded_rng()).unwrap();
    assert!(!s.buffs.invincible.is_active());
}

#[test]
fn nuke_splits_rewards_between_players() {
    let mut s = make_state(&RunConfig {
        multiplayer: true,
        consumable: Some("pw2".into()),
        consumable_quantity: 2,
        ..config()
    });
    s.enemies.clear();
    for i in 0..5 {
        enemy_at(&mut s, 50.0 * i as f32, 100.0);
    }
    assert!(use_consumable(&mut s, 0));

    assert!(s.enemies.is_empty());
    assert_eq!(s.players[0].score, 3 * ENEMY_SCORE);
    assert_eq!(s.players[1].score, 2 * ENEMY_SCORE);
    assert_eq!(s.run_xp, 5 * ENEMY_XP_DROP);
    assert_eq!(s.drops.len(), 5);
}

#[test]
fn repair_kit_heals_half_capped_at_max() {
    let mut s = with_consumable("pw7", 2);
    s.players[0].hp = 10.0;
    use_consumable(&mut s, 0);
    assert_eq!(s.players[0].hp, 60.0);
    use_consumable(&mut s, 0);
    assert_eq!(s.players[0].hp, s.players[0].max_hp);
}

#[test]
fn drone_trails_and_fires() {
    let mut s = with_consumable("pw6", 1);
    use_consumable(&mut s, 0);
    assert!(s.drone.is_some());
    tick(&mut s, &mut InputState::new(), 16, &mut seeded_rng()).unwrap();
    assert!(s
        .projectiles
        .iter()
        .any(|p| p.kind == ProjectileKind::DroneBullet));
}

#[test]
fn no_consumable_equipped_does_nothing() {
    let mut s = make_state(&RunConfig { consumable_quantity: 5, ..config() });
    assert_eq!(s.consumables_left, 0);
    assert!(!use_consumable(&mut s, 0));
}

#[test]
fn level_setup_cancels_every_timer() {
    let mut s = make_state(&config());
    s.buffs
        .rapid_fire
        .activate(&mut s.timers, 0, RAPID_FIRE_DURATION, Expiry::RapidFire);
    s.players[0]
        .status
        .slowed
        .activate(&mut s.timers, 0, 4000, Expiry::Slow(PlayerId::One));

    s.level = 2;
    setup_level(&mut s, 100, &mut seeded_rng()).unwrap();

    assert!(s.timers.is_empty());
    assert!(!s.buffs.rapid_fire.is_active());
    assert!(!s.players[0].status.slowed.is_active());
    assert_eq!(s.enemies.len(), 12);
}

#[test]
fn stale_expiry_cannot_clear_a_newer_buff() {
    let mut s = make_state(&config());
    s.buffs
        .time_slow
        .activate(&mut s.timers, 0, 1000, Expiry::TimeSlow);
    s.buffs
        .time_slow
        .activate(&mut s.timers, 500, 1000, Expiry::TimeSlow);
    tick(&mut s, &mut InputState::new(), 1200, &mut seeded_rng()).unwrap();
    assert!(s.buffs.time_slow.is_active());
    tick(&mut s, &mut InputState::new(), 1500, &mut seeded_rng()).unwrap();
    assert!(!s.buffs.time_slow.is_active());
}

#[test]
fn ids_are_unique_across_entities() {
    let mut s = make_state(&config());
    let mut ids: Vec<EntityId> = s.enemies.iter().map(|e| e.id).collect();
    ids.push(s.alloc_id());
    let mut sorted = ids.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), ids.len());
}
