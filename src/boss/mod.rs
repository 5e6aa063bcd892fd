//! Boss behaviour: one strategy row per species, looked up by `BossKind`.
//!
//! Each row holds a movement law, an attack pattern and an optional special
//! power. The driver calls `tick` once per frame while a boss is alive; the
//! row functions only see the boss and a read-only `Context`, and hand their
//! projectiles and player effects back to be applied here.

pub mod attacks;
pub mod movement;
pub mod specials;

use rand::{Rng, RngCore};
use tracing::{debug, info};

use crate::catalog::LevelConfig;
use crate::combat;
use crate::constants::*;
use crate::entities::{
    ActivePower, AttackState, Boss, BossKind, BossProjectile, Enemy, EntityId, FrameEvent,
    GameState, SpecialPower,
};
use crate::timers::{Expiry, PushForce};

// ── Strategy table ───────────────────────────────────────────────────────────

/// Read-only view of the world handed to behaviour functions.
#[derive(Clone, Debug)]
pub struct Context {
    pub now: u64,
    pub level: u32,
    /// Top-left corners of live players, player one first.
    pub players: Vec<(f32, f32)>,
    /// Global movement multiplier for this tick.
    pub speed: f32,
}

impl Context {
    pub fn from_state(state: &GameState, now: u64) -> Self {
        Self {
            now,
            level: state.level,
            players: state.live_players().map(|p| (p.x, p.y)).collect(),
            speed: crate::movement::speed_multiplier(state),
        }
    }

    /// Centre of a random live player, if any.
    pub fn pick_target(&self, rng: &mut dyn RngCore) -> Option<(f32, f32)> {
        if self.players.is_empty() {
            return None;
        }
        let (x, y) = self.players[rng.gen_range(0..self.players.len())];
        Some((x + PLAYER_WIDTH / 2.0, y + PLAYER_HEIGHT / 2.0))
    }
}

/// Output of one attack: the shots it fires and an optional lunge.
#[derive(Clone, Debug, Default)]
pub struct Volley {
    pub shots: Vec<BossProjectile>,
    /// Temporary downward displacement, undone by a timer.
    pub recoil: Option<f32>,
}

/// Side effects of a special power on the rest of the world.
#[derive(Clone, Debug, PartialEq)]
pub enum SpecialEffect {
    Shot(BossProjectile),
    PushPlayers { dx: f32, dy: f32 },
    ReverseControls,
    Minions(usize),
}

#[derive(Clone, Debug)]
pub struct Special {
    pub power: SpecialPower,
    pub duration: u64,
    pub effects: Vec<SpecialEffect>,
}

pub type MoveFn = fn(&mut Boss, &Context, &mut dyn RngCore);
pub type AttackFn = fn(&mut Boss, &Context, &mut Volley, &mut dyn RngCore);
pub type SpecialFn = fn(&Boss, &Context, &mut dyn RngCore) -> Special;

#[derive(Clone, Copy)]
pub struct BossBehavior {
    pub movement: MoveFn,
    pub attack: AttackFn,
    pub special: Option<SpecialFn>,
    /// Fast species shoot twice as often.
    pub fast: bool,
}

const fn row(movement: MoveFn, attack: AttackFn, special: Option<SpecialFn>) -> BossBehavior {
    BossBehavior { movement, attack, special, fast: false }
}

const fn fast(movement: MoveFn, attack: AttackFn, special: Option<SpecialFn>) -> BossBehavior {
    BossBehavior { movement, attack, special, fast: true }
}

use self::attacks as a;
use self::movement as m;
use self::specials as s;

/// Indexed by `BossKind as usize`, in campaign order.
pub static BEHAVIORS: [BossBehavior; BossKind::COUNT] = [
    row(m::patrol, a::homing, None),                           // Octopus
    row(m::patrol, a::spread_three, None),                     // Shark
    row(m::patrol, a::twin_claws, None),                       // Crab
    row(m::patrol, a::spread_five, None),                      // Pufferfish
    row(m::patrol, a::vertical_volley, None),                  // Lobster
    row(m::patrol, a::rotating_pair, None),                    // Shell
    row(m::patrol, a::pearl_trio, None),                       // Oyster
    row(m::patrol, a::radial_eight, None),                     // Squid
    row(m::patrol, a::sine_pair, None),                        // Snake
    fast(m::wander, a::aimed_single, Some(s::yarn_ball)),      // Grandma
    row(m::patrol, a::fan_three, Some(s::ground_pound)),       // Gorilla
    row(m::patrol, a::heavy_drop, Some(s::roar)),              // TRex
    row(m::patrol, a::sweeping_pair, Some(s::dragon_breath)),  // Dragon
    row(m::patrol, a::scorpion_cycle, Some(s::poison)),        // Scorpion
    row(m::patrol, a::web_trio, Some(s::cocoon)),              // Spider
    row(m::stationary, a::blink_fan, Some(s::invisibility)),   // Wizard
    row(m::patrol, a::fan_five, Some(s::gust)),                // Eagle
    row(m::patrol, a::beam, Some(s::hypnosis)),                // Eye
    row(m::patrol, a::rain, Some(s::minions)),                 // Whale
    fast(m::patrol, a::royal_cycle, Some(s::decree)),          // King
    row(m::stationary, a::urn_burst, None),                    // Urn
    row(m::patrol, a::ring_burst, None),                       // Planet
    row(m::patrol, a::piston_volley, None),                    // RoboArm
    row(m::track_player, a::pack_howl, None),                  // Wolf
    row(m::patrol, a::ice_volley, None),                       // IceBlock
    row(m::patrol, a::eruption, None),                         // Volcano
    row(m::patrol, a::spiral_arms, None),                      // Galaxy
    fast(m::patrol, a::holy_beams, None),                      // Angel
    fast(m::patrol, a::mimic, None),                           // Mystery
    row(m::stationary, a::spawn_fragment, None),               // BlackHole
];

pub fn behavior(kind: BossKind) -> &'static BossBehavior {
    &BEHAVIORS[kind.index()]
}

/// Shot cooldown for `boss` on campaign `level`, in ms.
pub fn shoot_cooldown(level: u32, boss: &Boss) -> f32 {
    let mut cooldown = BOSS_SHOOT_COOLDOWN as f32;
    cooldown *= match level {
        2..=5 => 0.8,
        6..=9 => 0.6,
        l if l >= 10 => 0.5,
        _ => 1.0,
    };
    if behavior(boss.kind).fast {
        cooldown /= 2.0;
    }
    if boss.power_active(SpecialPower::Decree) {
        cooldown /= 2.0;
    }
    cooldown
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

/// A fresh boss for `config`, positioned for its species.
pub fn create(config: &LevelConfig, id: EntityId, now: u64, rng: &mut impl Rng) -> Boss {
    let kind = config.boss.kind;
    let (x, y) = if kind == BossKind::BlackHole {
        (ARENA_WIDTH / 2.0 - BOSS_WIDTH / 2.0, BLACK_HOLE_SPAWN_Y)
    } else {
        (rng.gen_range(0.0..ARENA_WIDTH - BOSS_WIDTH), BOSS_SPAWN_Y)
    };
    Boss {
        id,
        kind,
        x,
        y,
        w: BOSS_WIDTH,
        h: BOSS_HEIGHT,
        health: config.boss.health,
        max_health: config.boss.health,
        power: None,
        last_damaged: now,
        attack: AttackState {
            direction: 1.0,
            shot_counter: 0,
            wander_target: None,
            mimic: None,
            last_shot: None,
            next_special_at: now + BOSS_SPECIAL_INITIAL_DELAY,
            last_taunt_request: None,
        },
        sub_entities: Vec::new(),
    }
}

/// Bring in this level's boss once the wave is gone.
pub fn spawn_if_cleared(state: &mut GameState, now: u64, rng: &mut impl Rng) {
    if state.boss.is_some() || !state.enemies.is_empty() || state.outcome.is_some() {
        return;
    }
    let Ok(config) = state.catalog.level(state.level).cloned() else {
        return;
    };
    let id = state.alloc_id();
    let boss = create(&config, id, now, rng);
    info!(level = state.level, kind = ?boss.kind, health = boss.health, "Boss spawned");
    state.events.push(FrameEvent::BossSpawned { kind: boss.kind });
    state.boss = Some(boss);
}

/// True once per taunt interval while a Grandma boss is alive.
pub fn taunt_due(state: &mut GameState, now: u64) -> bool {
    let Some(boss) = state.boss.as_mut() else {
        return false;
    };
    if boss.kind != BossKind::Grandma {
        return false;
    }
    let due = boss
        .attack
        .last_taunt_request
        .map_or(true, |t| now.saturating_sub(t) >= GRANDMA_TAUNT_INTERVAL);
    if due {
        boss.attack.last_taunt_request = Some(now);
    }
    due
}

// ── Per-frame update ─────────────────────────────────────────────────────────

/// Advance the live boss: powers, movement, attacks, sub-entities, healing.
pub fn tick<R: Rng>(state: &mut GameState, now: u64, rng: &mut R) {
    let Some(mut boss) = state.boss.take() else {
        return;
    };
    let ctx = Context::from_state(state, now);
    let rng: &mut dyn RngCore = rng;
    let strategy = behavior(boss.kind);

    if boss.power.is_some_and(|p| now > p.ends_at) {
        boss.power = None;
    }

    if ctx.level >= BOSS_SPECIAL_MIN_LEVEL
        && boss.power.is_none()
        && now >= boss.attack.next_special_at
    {
        boss.attack.next_special_at = now + BOSS_SPECIAL_COOLDOWN;
        if let Some(special_fn) = strategy.special {
            let special = special_fn(&boss, &ctx, rng);
            info!(kind = ?boss.kind, power = ?special.power, "Boss special activated");
            boss.power = Some(ActivePower {
                power: special.power,
                started_at: now,
                ends_at: now + special.duration,
            });
            state.events.push(FrameEvent::BossPower { power: special.power });
            apply_special(state, &boss, special, now);
        }
    }

    if boss.power_active(SpecialPower::DragonBreath) && now % 100 < 50 {
        let breath = specials::breath_puff(&boss, now);
        push_shot(state, breath);
    }

    (strategy.movement)(&mut boss, &ctx, rng);

    let cooldown = shoot_cooldown(ctx.level, &boss);
    let ready = boss
        .attack
        .last_shot
        .map_or(true, |t| now.saturating_sub(t) as f32 > cooldown);
    if ready {
        boss.attack.last_shot = Some(now);
        let mut volley = Volley::default();
        (strategy.attack)(&mut boss, &ctx, &mut volley, rng);
        debug!(kind = ?boss.kind, shots = volley.shots.len(), "Boss volley");
        for shot in volley.shots {
            push_shot(state, shot);
        }
        if let Some(dy) = volley.recoil {
            boss.y += dy;
            state.timers.schedule(now + ROBO_ARM_RECOIL_MS, Expiry::BossRecoil { dy });
        }
    }

    for sub in boss.sub_entities.iter_mut().filter(|s| s.id == EntityId::PENDING) {
        sub.id = state.alloc_id();
    }

    if boss.kind == BossKind::Wolf && boss.sub_entities.len() >= 2 {
        let (bx, by) = (boss.x, boss.y);
        boss.sub_entities[0].x = bx - 50.0;
        boss.sub_entities[0].y = by;
        boss.sub_entities[1].x = bx + BOSS_WIDTH + 20.0;
        boss.sub_entities[1].y = by;
    }

    if boss.kind == BossKind::Angel && now.saturating_sub(boss.last_damaged) > ANGEL_HEAL_DELAY {
        boss.health = (boss.health + ANGEL_HEAL_PER_TICK).min(boss.max_health);
    }

    state.boss = Some(boss);
    combat::return_fragments(state, now);
}

fn push_shot(state: &mut GameState, shot: BossProjectile) {
    let id = state.alloc_id();
    state.boss_projectiles.push(BossProjectile { id, ..shot });
}

fn apply_special(state: &mut GameState, boss: &Boss, special: Special, now: u64) {
    let ends_at = now + special.duration;
    for effect in special.effects {
        match effect {
            SpecialEffect::Shot(shot) => push_shot(state, shot),
            SpecialEffect::PushPlayers { dx, dy } => {
                for player in state.players.iter_mut().filter(|p| !p.dead) {
                    player.status.push = Some(PushForce { dx, dy, ends_at });
                }
            }
            SpecialEffect::ReverseControls => {
                for player in state.players.iter_mut().filter(|p| !p.dead) {
                    let id = player.id;
                    player.status.controls_reversed.activate(
                        &mut state.timers,
                        now,
                        special.duration,
                        Expiry::ControlsReversed(id),
                    );
                }
            }
            SpecialEffect::Minions(count) => {
                for i in 0..count {
                    let id = state.alloc_id();
                    state.enemies.push(Enemy {
                        id,
                        x: boss.x,
                        y: boss.y,
                        w: ENEMY_WIDTH,
                        h: ENEMY_HEIGHT,
                        glyph: 'f',
                        dx: Some((i as f32 - 1.0) * ENEMY_SPEED * 0.5),
                        dy: None,
                        health: Some(WHALE_MINION_HEALTH),
                    });
                }
            }
        }
    }
}

/// Undo a Robo Arm lunge.
pub fn apply_recoil(state: &mut GameState, dy: f32) {
    if let Some(boss) = state.boss.as_mut() {
        boss.y -= dy;
    }
}
