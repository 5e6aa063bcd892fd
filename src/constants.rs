//! Tuning constants. Distances are arena pixels, times are milliseconds,
//! speeds are pixels per tick at the nominal ~60 Hz refresh.

// ── Arena ─────────────────────────────────────────────────────────────────────

pub const ARENA_WIDTH: f32 = 800.0;
pub const ARENA_HEIGHT: f32 = 600.0;
/// Boss projectiles may start this far above the arena before being culled.
pub const OFFSCREEN_MARGIN: f32 = 400.0;

// ── Players ───────────────────────────────────────────────────────────────────

pub const PLAYER_WIDTH: f32 = 50.0;
pub const PLAYER_HEIGHT: f32 = 50.0;
pub const PLAYER_SPEED: f32 = 7.0;
pub const PLAYER_BASE_HP: f32 = 100.0;
/// Nominal damage of one hit before the vehicle's reduction.
pub const HIT_DAMAGE: f32 = 10.0;
/// Dead players are parked here so nothing can collide with them.
pub const DEAD_PLAYER_X: f32 = -2000.0;
/// Push-forces scale with the player's current speed by this factor.
pub const PUSH_FORCE_SCALE: f32 = 0.8;

// ── Player weapons ────────────────────────────────────────────────────────────

pub const BOMB_WIDTH: f32 = 25.0;
pub const BOMB_HEIGHT: f32 = 25.0;
pub const BOMB_SPEED: f32 = 10.0;
pub const BOMB_COOLDOWN: u64 = 200;

pub const BULLET_WIDTH: f32 = 10.0;
pub const BULLET_HEIGHT: f32 = 25.0;
pub const BULLET_SPEED: f32 = 15.0;
pub const GUN_COOLDOWN: u64 = 100;

pub const DRONE_WIDTH: f32 = 30.0;
pub const DRONE_HEIGHT: f32 = 30.0;
pub const DRONE_FIRE_COOLDOWN: u64 = 500;
pub const DRONE_DAMAGE: f32 = 1.0;
/// Fraction of the gap to its anchor the drone closes each tick.
pub const DRONE_FOLLOW_RATE: f32 = 0.1;

pub const DAMAGE_BONUS_PER_LEVEL: f32 = 0.05;

// ── Vehicle passives ──────────────────────────────────────────────────────────

pub const BATTLESHIP_SIDE_CANNON_COOLDOWN: u64 = 1000;
pub const BATTLESHIP_SIDE_CANNON_DAMAGE: f32 = 1.0;

pub const AEGIS_LASER_COOLDOWN: u64 = 400;
pub const AEGIS_LASER_DAMAGE: f32 = 0.5;
pub const AEGIS_BOMB_COOLDOWN_FACTOR: f32 = 0.75;
pub const AEGIS_CURRENCY_BONUS: f32 = 1.1;
pub const AEGIS_RETALIATION_PULSE_RADIUS: f32 = 75.0;

// ── Enemies ───────────────────────────────────────────────────────────────────

pub const ENEMY_WIDTH: f32 = 40.0;
pub const ENEMY_HEIGHT: f32 = 40.0;
pub const ENEMY_SPEED: f32 = 2.0;
/// Wave enemies start somewhere in this band above the arena.
pub const ENEMY_SPAWN_BAND: f32 = 300.0;

// ── Bosses ────────────────────────────────────────────────────────────────────

pub const BOSS_WIDTH: f32 = 100.0;
pub const BOSS_HEIGHT: f32 = 100.0;
pub const BOSS_SPEED: f32 = 3.0;
pub const BOSS_SPAWN_Y: f32 = 50.0;

pub const BOSS_PROJECTILE_WIDTH: f32 = 20.0;
pub const BOSS_PROJECTILE_HEIGHT: f32 = 20.0;
pub const BOSS_PROJECTILE_SPEED: f32 = 5.0;
pub const BOSS_SHOOT_COOLDOWN: u64 = 1500;

pub const BOSS_SPECIAL_COOLDOWN: u64 = 12_000;
/// Specials stay locked for this long after a boss appears.
pub const BOSS_SPECIAL_INITIAL_DELAY: u64 = 5000;
/// First campaign level on which bosses use their special power.
pub const BOSS_SPECIAL_MIN_LEVEL: u32 = 10;

pub const GRANDMA_YARN_DURATION: u64 = 6000;
pub const GORILLA_POUND_DURATION: u64 = 500;
pub const TREX_ROAR_DURATION: u64 = 2500;
pub const DRAGON_BREATH_DURATION: u64 = 3000;
pub const SCORPION_SLOW_DURATION: u64 = 4000;
pub const SPIDER_COCOON_DURATION: u64 = 1500;
pub const WIZARD_INVISIBILITY_DURATION: u64 = 4500;
pub const EAGLE_GUST_DURATION: u64 = 3500;
pub const EYE_HYPNOSIS_DURATION: u64 = 4000;
pub const KING_DECREE_DURATION: u64 = 5000;
pub const WHALE_MINIONS_DURATION: u64 = 0;
pub const WHALE_MINION_COUNT: usize = 3;
pub const WHALE_MINION_HEALTH: f32 = 3.0;

/// Grandma never picks a wander target closer than this to the player.
pub const GRANDMA_MIN_TARGET_DISTANCE: f32 = 200.0;
pub const GRANDMA_TAUNT_INTERVAL: u64 = 10_000;

pub const ANGEL_HEAL_DELAY: u64 = 3000;
pub const ANGEL_HEAL_PER_TICK: f32 = 0.5;

pub const ROBO_ARM_RECOIL: f32 = 30.0;
pub const ROBO_ARM_RECOIL_MS: u64 = 200;

pub const MYSTERY_ATTACK_WINDOW: u64 = 3000;

pub const WOLF_SPIRIT_SIZE: f32 = 30.0;
pub const BLACK_HOLE_FRAGMENT_SIZE: f32 = 40.0;

pub const BLACK_HOLE_SPAWN_Y: f32 = 100.0;
pub const BLACK_HOLE_DIRECT_DAMAGE_MODIFIER: f32 = 0.1;
pub const BLACK_HOLE_MAX_FRAGMENTS: usize = 5;
pub const FRAGMENT_RETURN_SPEED: f32 = 15.0;
pub const FRAGMENT_ARRIVAL_DISTANCE: f32 = 50.0;
pub const FRAGMENT_CORE_DAMAGE: f32 = 50.0;

/// Narrow, strong attraction of the black hole.
pub const BLACK_HOLE_RANGE: f32 = 400.0;
pub const BLACK_HOLE_STRENGTH: f32 = 800.0;
pub const BLACK_HOLE_MAX_PULL: f32 = 4.0;
/// Pull applied to player shots by the black hole.
pub const BLACK_HOLE_SHOT_STRENGTH: f32 = 300.0;
/// Wide, gentle attraction of the galaxy.
pub const GALAXY_STRENGTH: f32 = 300.0;
pub const GALAXY_MAX_PULL: f32 = 2.0;

pub const SHATTER_SHARD_HEALTH: f32 = 5.0;
pub const SHATTER_FRAGMENT_COUNT: usize = 8;
pub const SHATTER_STUN_MS: u64 = 1000;

// ── Drops & rewards ───────────────────────────────────────────────────────────

pub const CURRENCY_DROP_WIDTH: f32 = 30.0;
pub const CURRENCY_DROP_HEIGHT: f32 = 30.0;
pub const AMMO_DROP_WIDTH: f32 = 30.0;
pub const AMMO_DROP_HEIGHT: f32 = 30.0;
pub const AMMO_DROP_CHANCE_ON_BOSS_HIT: f64 = 0.15;
pub const AMMO_DROP_BASE_AMOUNT: u32 = 20;
pub const DROP_FALL_FACTOR: f32 = 0.5;

pub const ENEMY_SCORE: u32 = 100;
pub const BOSS_HIT_SCORE: u32 = 50;
pub const BOSS_KILL_SCORE_PER_LEVEL: u32 = 1000;
pub const ENEMY_CURRENCY_DROP: f32 = 10.0;
pub const BOSS_CURRENCY_DROP_PER_LEVEL: f32 = 100.0;
pub const ENEMY_XP_DROP: u32 = 15;
pub const BOSS_XP_PER_LEVEL: u32 = 200;

pub const EXPLOSION_DURATION: u64 = 400;

// ── Consumable buffs ──────────────────────────────────────────────────────────

pub const INVINCIBILITY_DURATION: u64 = 5000;
pub const RAPID_FIRE_DURATION: u64 = 10_000;
pub const TIME_SLOW_DURATION: u64 = 8000;
pub const GOLD_RUSH_DURATION: u64 = 15_000;
pub const TIME_SLOW_FACTOR: f32 = 0.5;
pub const SLOWED_SPEED_FACTOR: f32 = 0.5;
pub const REPAIR_KIT_FRACTION: f32 = 0.5;

// ── Reflex dodge ──────────────────────────────────────────────────────────────

pub const QTE_DANGER_RADIUS: f32 = 120.0;
pub const QTE_COOLDOWN: u64 = 750;
pub const QTE_DODGE_DISTANCE: f32 = 80.0;
pub const QTE_SLOW_MO_FACTOR: f32 = 0.1;
pub const QTE_SLOW_MO_DURATION: u64 = 2000;
pub const QTE_SEQUENCE_LENGTH: usize = 3;
