/// Game loop driver: run setup, level transitions and the per-frame tick.
///
/// Every entry point mutates the `GameState` it is handed in place and takes
/// the current game-clock time (`now`, ms) and, where needed, an injected
/// RNG. Nothing here blocks or reads a global.

use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::boss;
use crate::catalog::{Catalog, ConsumableEffect};
use crate::combat;
use crate::config::RunConfig;
use crate::constants::*;
use crate::entities::{
    Cooldowns, Drone, Enemy, FrameEvent, GameState, GameStatus, Loadout, Player, PlayerId,
    RunOutcome, WeaponSelection,
};
use crate::error::GameResult;
use crate::input::{ControlScheme, InputState, Key, CONSUMABLE_KEY};
use crate::movement;
use crate::qte;
use crate::timers::{Expiry, GlobalBuffs, PlayerStatus, TimerQueue};

// ── Constructors ─────────────────────────────────────────────────────────────

/// Where each player starts a level.
fn spawn_point(id: PlayerId, multiplayer: bool) -> (f32, f32) {
    let y = ARENA_HEIGHT - PLAYER_HEIGHT - 20.0;
    let x = match (multiplayer, id) {
        (false, _) => ARENA_WIDTH / 2.0,
        (true, PlayerId::One) => ARENA_WIDTH / 3.0,
        (true, PlayerId::Two) => ARENA_WIDTH * 2.0 / 3.0,
    };
    (x - PLAYER_WIDTH / 2.0, y)
}

fn new_player(id: PlayerId, multiplayer: bool, max_hp: f32, ammo: u32) -> Player {
    let (x, y) = spawn_point(id, multiplayer);
    Player {
        id,
        x,
        y,
        w: PLAYER_WIDTH,
        h: PLAYER_HEIGHT,
        hp: max_hp,
        max_hp,
        dead: false,
        status: PlayerStatus::default(),
        weapon: WeaponSelection::Bomb,
        ammo,
        score: 0,
        cooldowns: Cooldowns::default(),
    }
}

/// Resolve the loadout and build the state for the configured start level.
/// Any id missing from the catalog fails the whole run.
pub fn init_run(
    catalog: Arc<Catalog>,
    config: &RunConfig,
    now: u64,
    rng: &mut impl Rng,
) -> GameResult<GameState> {
    let vehicle = catalog.vehicle(&config.vehicle)?.clone();
    let bomb = catalog.bomb(&config.bomb)?.clone();
    let gun = match config.gun.as_deref() {
        Some(id) => Some(catalog.gun(id)?.clone()),
        None => None,
    };
    let consumable = match config.consumable.as_deref() {
        Some(id) => Some(catalog.consumable(id)?.clone()),
        None => None,
    };
    catalog.level(config.start_level)?;

    let max_hp = PLAYER_BASE_HP * vehicle.hp_multiplier;
    let ammo = gun.as_ref().map_or(0, |g| g.max_ammo);
    let mut players = vec![new_player(PlayerId::One, config.multiplayer, max_hp, ammo)];
    if config.multiplayer {
        players.push(new_player(PlayerId::Two, true, max_hp, ammo));
    }
    let consumables_left = if consumable.is_some() { config.consumable_quantity } else { 0 };

    info!(
        level = config.start_level,
        multiplayer = config.multiplayer,
        vehicle = %vehicle.id,
        bomb = %bomb.id,
        "Run started"
    );

    let mut state = GameState {
        catalog,
        loadout: Loadout { vehicle, bomb, gun, consumable },
        multiplayer: config.multiplayer,
        player_level: config.player_level.max(1),
        player_xp: config.player_xp,
        level: config.start_level,
        players,
        enemies: Vec::new(),
        projectiles: Vec::new(),
        boss: None,
        boss_projectiles: Vec::new(),
        drops: Vec::new(),
        explosions: Vec::new(),
        drone: None,
        qte: None,
        buffs: GlobalBuffs::default(),
        timers: TimerQueue::new(),
        consumables_left,
        run_xp: 0,
        run_currency: 0.0,
        taunt: None,
        status: GameStatus::Playing,
        outcome: None,
        events: Vec::new(),
        frame: 0,
        next_id: 0,
    };
    setup_level(&mut state, now, rng)?;
    Ok(state)
}

/// Reset everything level-scoped and spawn the level's wave. Pending timers
/// are cancelled before any flag is cleared. HP and scores carry over; dead
/// players stay dead.
pub fn setup_level(state: &mut GameState, _now: u64, rng: &mut impl Rng) -> GameResult<()> {
    let config = state.catalog.level(state.level)?.clone();

    state.timers.cancel_all();
    state.buffs = GlobalBuffs::default();
    state.enemies.clear();
    state.projectiles.clear();
    state.boss = None;
    state.boss_projectiles.clear();
    state.drops.clear();
    state.explosions.clear();
    state.drone = None;
    state.qte = None;
    state.taunt = None;

    let multiplayer = state.multiplayer;
    let ammo = state.loadout.gun.as_ref().map_or(0, |g| g.max_ammo);
    for player in state.players.iter_mut() {
        player.status = PlayerStatus::default();
        player.cooldowns = Cooldowns::default();
        player.ammo = ammo;
        if !player.dead {
            let (x, y) = spawn_point(player.id, multiplayer);
            player.x = x;
            player.y = y;
        }
    }

    for _ in 0..config.enemies.count {
        let id = state.alloc_id();
        state.enemies.push(Enemy {
            id,
            x: rng.gen_range(0.0..ARENA_WIDTH - ENEMY_WIDTH),
            y: -ENEMY_HEIGHT - rng.gen_range(0.0..ENEMY_SPAWN_BAND),
            w: ENEMY_WIDTH,
            h: ENEMY_HEIGHT,
            glyph: config.enemies.glyph,
            dx: None,
            dy: None,
            health: None,
        });
    }
    info!(level = state.level, enemies = config.enemies.count, "Level set up");
    Ok(())
}

// ── Input ────────────────────────────────────────────────────────────────────

/// Route a key press. An open reflex-dodge session gets first refusal and
/// swallows every other key while it lasts; otherwise one-shot actions
/// fire and the key is recorded as held.
pub fn key_down(state: &mut GameState, input: &mut InputState, key: Key, now: u64) {
    if state.status != GameStatus::Playing {
        return;
    }
    if state.qte.is_some() {
        qte::handle_key(state, key, now);
        return;
    }
    input.press(key);

    if key == CONSUMABLE_KEY {
        use_consumable(state, now);
        return;
    }
    if state.loadout.gun.is_none() {
        return;
    }
    for player in state.players.iter_mut().filter(|p| !p.dead) {
        if ControlScheme::for_player(player.id).swap == key {
            player.weapon = match player.weapon {
                WeaponSelection::Bomb => WeaponSelection::Gun,
                WeaponSelection::Gun => WeaponSelection::Bomb,
            };
            debug!(player = ?player.id, weapon = ?player.weapon, "Weapon swapped");
        }
    }
}

pub fn key_up(input: &mut InputState, key: Key) {
    input.release(key);
}

/// Going to the pause screen drops held keys and every player debuff along
/// with its timer. Buffs keep their remaining time because the game clock
/// stops while paused.
pub fn pause(state: &mut GameState, input: &mut InputState) {
    input.clear();
    for player in state.players.iter_mut() {
        player.status.clear(&mut state.timers);
    }
    info!(level = state.level, "Paused");
}

/// Spend one of the equipped consumable. Returns false when none is
/// equipped, none is left, or the run is over.
pub fn use_consumable(state: &mut GameState, now: u64) -> bool {
    if state.status != GameStatus::Playing || state.consumables_left == 0 {
        return false;
    }
    let Some(consumable) = state.loadout.consumable.clone() else {
        return false;
    };

    match consumable.effect {
        ConsumableEffect::Shield => state.buffs.invincible.activate(
            &mut state.timers,
            now,
            INVINCIBILITY_DURATION,
            Expiry::Invincibility,
        ),
        ConsumableEffect::Nuke => combat::nuke(state, now),
        ConsumableEffect::RapidFire => state.buffs.rapid_fire.activate(
            &mut state.timers,
            now,
            RAPID_FIRE_DURATION,
            Expiry::RapidFire,
        ),
        ConsumableEffect::TimeSlow => state.buffs.time_slow.activate(
            &mut state.timers,
            now,
            TIME_SLOW_DURATION,
            Expiry::TimeSlow,
        ),
        ConsumableEffect::GoldRush => state.buffs.gold_rush.activate(
            &mut state.timers,
            now,
            GOLD_RUSH_DURATION,
            Expiry::GoldRush,
        ),
        ConsumableEffect::Drone => {
            let (x, y) = state
                .first_live_player()
                .map_or((0.0, 0.0), |p| (p.x - DRONE_WIDTH - 10.0, p.y));
            state.drone = Some(Drone {
                x,
                y,
                w: DRONE_WIDTH,
                h: DRONE_HEIGHT,
                last_fire: None,
            });
        }
        ConsumableEffect::RepairKit => {
            for player in state.players.iter_mut().filter(|p| !p.dead) {
                player.hp = (player.hp + player.max_hp * REPAIR_KIT_FRACTION).min(player.max_hp);
            }
        }
    }

    state.consumables_left -= 1;
    info!(consumable = %consumable.id, left = state.consumables_left, "Consumable used");
    state.events.push(FrameEvent::ConsumableUsed { id: consumable.id });
    true
}

// ── Timers ───────────────────────────────────────────────────────────────────

pub fn apply_expiry(state: &mut GameState, expiry: Expiry) {
    debug!(?expiry, "Timer fired");
    match expiry {
        Expiry::Invincibility => state.buffs.invincible.expire(),
        Expiry::RapidFire => state.buffs.rapid_fire.expire(),
        Expiry::TimeSlow => state.buffs.time_slow.expire(),
        Expiry::GoldRush => state.buffs.gold_rush.expire(),
        Expiry::Stun(id) => {
            if let Some(p) = state.player_mut(id) {
                p.status.stunned.expire();
            }
        }
        Expiry::Slow(id) => {
            if let Some(p) = state.player_mut(id) {
                p.status.slowed.expire();
            }
        }
        Expiry::ControlsReversed(id) => {
            if let Some(p) = state.player_mut(id) {
                p.status.controls_reversed.expire();
            }
        }
        Expiry::BossRecoil { dy } => boss::apply_recoil(state, dy),
    }
}

// ── Level & run transitions ──────────────────────────────────────────────────

/// Record the outcome and stop the simulation. Only the first call counts.
pub fn end_run(state: &mut GameState, won: bool) {
    if state.outcome.is_some() {
        return;
    }
    state.timers.cancel_all();
    state.buffs = GlobalBuffs::default();
    state.qte = None;
    state.status = if won { GameStatus::Victory } else { GameStatus::GameOver };
    let outcome = RunOutcome {
        won,
        scores: state.players.iter().map(|p| p.score).collect(),
        xp_earned: state.run_xp,
        consumables_left: state.consumables_left,
        currency_earned: state.run_currency.round() as u32,
    };
    info!(?outcome, "Run ended");
    state.outcome = Some(outcome);
    state.events.push(FrameEvent::RunEnded { won });
}

/// Pay out the kill and move to the next level, or end the run after the
/// final one.
pub fn defeat_boss(state: &mut GameState, now: u64, rng: &mut impl Rng) -> GameResult<()> {
    let Some(defeated) = state.boss.take() else {
        return Ok(());
    };
    let level = state.level;
    let score = BOSS_KILL_SCORE_PER_LEVEL * level;
    if state.multiplayer {
        for player in state.players.iter_mut() {
            player.score += score / 2;
        }
    } else if let Some(player) = state.player_mut(PlayerId::One) {
        player.score += score;
    }
    state.run_xp += BOSS_XP_PER_LEVEL * level;
    let multiplier = combat::currency_multiplier(state);
    state.run_currency += BOSS_CURRENCY_DROP_PER_LEVEL * level as f32 * multiplier;
    state.boss_projectiles.clear();
    info!(level, kind = ?defeated.kind, "Boss defeated");
    state.events.push(FrameEvent::BossDefeated { kind: defeated.kind });

    if level >= state.catalog.final_level() {
        end_run(state, true);
        return Ok(());
    }
    state.level += 1;
    setup_level(state, now, rng)?;
    state.events.push(FrameEvent::LevelAdvanced { level: state.level });
    Ok(())
}

// ── Per-frame tick ───────────────────────────────────────────────────────────

/// Advance the simulation by one frame. All randomness comes through `rng`
/// and all time through `now`, so a seeded RNG and a scripted clock replay
/// a run exactly. Held keys are dropped when the level changes.
pub fn tick(
    state: &mut GameState,
    input: &mut InputState,
    now: u64,
    rng: &mut impl Rng,
) -> GameResult<()> {
    if state.status != GameStatus::Playing {
        return Ok(());
    }
    state.frame += 1;
    state.events.clear();

    for expiry in state.timers.drain_due(now) {
        apply_expiry(state, expiry);
    }

    // ── 1. Reflex-dodge timeout ──────────────────────────────────────────────
    qte::check_timeout(state, now);

    // ── 2. Movement ──────────────────────────────────────────────────────────
    movement::move_players(state, input, now);
    movement::move_passive(state, now);

    // ── 3. Weapons ───────────────────────────────────────────────────────────
    combat::fire_weapons(state, input, now);
    if state.qte.is_none() {
        combat::fire_passives(state, now);
    }

    // ── 4. Boss AI ───────────────────────────────────────────────────────────
    boss::tick(state, now, rng);

    // ── 5. Damage, hits and pickups ──────────────────────────────────────────
    combat::resolve_threats(state, now, rng);
    combat::resolve_player_shots(state, now, rng);
    combat::pickup_drops(state);
    combat::check_player_deaths(state, now);

    if state.live_players().next().is_none() {
        warn!(level = state.level, "All players down");
        end_run(state, false);
        return Ok(());
    }

    // ── 6. Boss defeat, level advance, boss spawn ────────────────────────────
    if state.boss.as_ref().is_some_and(|b| b.health <= 0.0) {
        defeat_boss(state, now, rng)?;
        if state.level_advanced() {
            input.clear();
        }
    }
    if state.status == GameStatus::Playing {
        boss::spawn_if_cleared(state, now, rng);
    }
    Ok(())
}
