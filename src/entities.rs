//! Game entity types. Pure data; the systems live elsewhere.
//!
//! Positions are the top-left corner in arena pixels. Every entity that can
//! collide implements `Bounded`.

use std::sync::Arc;

use serde::Deserialize;

use crate::catalog::{BombType, Catalog, Consumable, GunType, Vehicle};
use crate::collision::{Bounded, Rect};
use crate::timers::{GlobalBuffs, PlayerStatus, TimerQueue};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Placeholder for entities built before the state hands out an id.
    pub const PENDING: EntityId = EntityId(0);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerId {
    One,
    Two,
}

impl PlayerId {
    pub fn index(self) -> usize {
        match self {
            PlayerId::One => 0,
            PlayerId::Two => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    GameOver,
    Victory,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeaponSelection {
    Bomb,
    Gun,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

// ── Players ───────────────────────────────────────────────────────────────────

/// Last time each timed action fired, `None` if never.
#[derive(Clone, Debug, Default)]
pub struct Cooldowns {
    pub weapon: Option<u64>,
    pub side_cannon: Option<u64>,
    pub laser: Option<u64>,
    pub qte: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub dead: bool,
    pub status: PlayerStatus,
    pub weapon: WeaponSelection,
    pub ammo: u32,
    pub score: u32,
    pub cooldowns: Cooldowns,
}

/// Companion granted by the Wingman Drone consumable. Trails player one.
#[derive(Clone, Debug)]
pub struct Drone {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub last_fire: Option<u64>,
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Enemy {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub glyph: char,
    /// Overrides the default straight-down drift when set.
    pub dx: Option<f32>,
    pub dy: Option<f32>,
    /// Only boss minions carry health; wave enemies die to any hit.
    pub health: Option<f32>,
}

// ── Bosses ────────────────────────────────────────────────────────────────────

/// The thirty boss species, in campaign order.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BossKind {
    Octopus,
    Shark,
    Crab,
    Pufferfish,
    Lobster,
    Shell,
    Oyster,
    Squid,
    Snake,
    Grandma,
    Gorilla,
    TRex,
    Dragon,
    Scorpion,
    Spider,
    Wizard,
    Eagle,
    Eye,
    Whale,
    King,
    Urn,
    Planet,
    RoboArm,
    Wolf,
    IceBlock,
    Volcano,
    Galaxy,
    Angel,
    Mystery,
    BlackHole,
}

impl BossKind {
    pub const COUNT: usize = 30;

    pub const ALL: [BossKind; BossKind::COUNT] = [
        BossKind::Octopus,
        BossKind::Shark,
        BossKind::Crab,
        BossKind::Pufferfish,
        BossKind::Lobster,
        BossKind::Shell,
        BossKind::Oyster,
        BossKind::Squid,
        BossKind::Snake,
        BossKind::Grandma,
        BossKind::Gorilla,
        BossKind::TRex,
        BossKind::Dragon,
        BossKind::Scorpion,
        BossKind::Spider,
        BossKind::Wizard,
        BossKind::Eagle,
        BossKind::Eye,
        BossKind::Whale,
        BossKind::King,
        BossKind::Urn,
        BossKind::Planet,
        BossKind::RoboArm,
        BossKind::Wolf,
        BossKind::IceBlock,
        BossKind::Volcano,
        BossKind::Galaxy,
        BossKind::Angel,
        BossKind::Mystery,
        BossKind::BlackHole,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            BossKind::Octopus => "Octopus",
            BossKind::Shark => "Shark",
            BossKind::Crab => "Crab",
            BossKind::Pufferfish => "Pufferfish",
            BossKind::Lobster => "Lobster",
            BossKind::Shell => "Nautilus",
            BossKind::Oyster => "Oyster",
            BossKind::Squid => "Squid",
            BossKind::Snake => "Sea Snake",
            BossKind::Grandma => "Grandma",
            BossKind::Gorilla => "Gorilla",
            BossKind::TRex => "T-Rex",
            BossKind::Dragon => "Dragon",
            BossKind::Scorpion => "Scorpion",
            BossKind::Spider => "Spider",
            BossKind::Wizard => "Wizard",
            BossKind::Eagle => "Eagle",
            BossKind::Eye => "The Eye",
            BossKind::Whale => "Whale",
            BossKind::King => "King",
            BossKind::Urn => "Cursed Urn",
            BossKind::Planet => "Ringed Planet",
            BossKind::RoboArm => "Robo Arm",
            BossKind::Wolf => "Dire Wolf",
            BossKind::IceBlock => "Ice Block",
            BossKind::Volcano => "Volcano",
            BossKind::Galaxy => "Galaxy",
            BossKind::Angel => "Angel",
            BossKind::Mystery => "Mystery",
            BossKind::BlackHole => "Black Hole",
        }
    }
}

/// Boss-exclusive timed abilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecialPower {
    YarnBall,
    GroundPound,
    Roar,
    DragonBreath,
    PoisonSlow,
    Cocoon,
    Invisibility,
    Gust,
    Hypnosis,
    Minions,
    Decree,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActivePower {
    pub power: SpecialPower,
    pub started_at: u64,
    pub ends_at: u64,
}

/// A borrowed attack pattern and when to pick the next one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mimic {
    pub kind: BossKind,
    pub until: u64,
}

/// Per-boss attack bookkeeping. Each species reads only the fields it needs.
#[derive(Clone, Debug)]
pub struct AttackState {
    /// +1 or -1 for patrolling bosses.
    pub direction: f32,
    /// Advances on every volley of the species that rotate or cycle phases.
    pub shot_counter: u32,
    pub wander_target: Option<(f32, f32)>,
    pub mimic: Option<Mimic>,
    pub last_shot: Option<u64>,
    /// Earliest game time the next special power may start.
    pub next_special_at: u64,
    pub last_taunt_request: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubEntityKind {
    /// Wolf companion: blocks shots, fires alongside the boss.
    Spirit,
    /// Black-hole shard: shoot it and it falls back into the core.
    Fragment,
}

#[derive(Clone, Debug)]
pub struct SubEntity {
    pub id: EntityId,
    pub kind: SubEntityKind,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub health: Option<f32>,
}

#[derive(Clone, Debug)]
pub struct Boss {
    pub id: EntityId,
    pub kind: BossKind,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub health: f32,
    pub max_health: f32,
    pub power: Option<ActivePower>,
    pub last_damaged: u64,
    pub attack: AttackState,
    pub sub_entities: Vec<SubEntity>,
}

impl Boss {
    pub fn power_active(&self, power: SpecialPower) -> bool {
        self.power.is_some_and(|p| p.power == power)
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileKind {
    Bomb,
    Bullet,
    DroneBullet,
}

/// A player-side shot travelling up the arena.
#[derive(Clone, Debug)]
pub struct Projectile {
    pub id: EntityId,
    pub owner: PlayerId,
    pub kind: ProjectileKind,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub damage: f32,
    /// Pixels per tick, negative is up.
    pub vy: f32,
    pub glyph: char,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Stun,
    Slow,
}

/// Status projectiles deal no damage; they apply this instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusHit {
    pub kind: StatusKind,
    pub duration: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BossProjectile {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub dx: f32,
    pub dy: f32,
    pub status: Option<StatusHit>,
    pub created_at: u64,
    pub lifetime: Option<u64>,
    /// Breakable projectiles can be shot down.
    pub health: Option<f32>,
}

impl BossProjectile {
    pub fn is_status(&self) -> bool {
        self.status.is_some()
    }

    pub fn is_breakable(&self) -> bool {
        self.health.is_some_and(|h| h > 0.0)
    }
}

// ── Drops & effects ───────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropKind {
    Ammo,
    Currency,
}

#[derive(Clone, Debug)]
pub struct DropItem {
    pub id: EntityId,
    pub kind: DropKind,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub amount: f32,
}

/// Cosmetic only.
#[derive(Clone, Debug)]
pub struct Explosion {
    pub x: f32,
    pub y: f32,
    pub started_at: u64,
    pub glyph: char,
}

// ── Reflex dodge ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreatKind {
    Enemy,
    Projectile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThreatRef {
    pub id: EntityId,
    pub kind: ThreatKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct QteSession {
    pub player: PlayerId,
    pub threat: ThreatRef,
    pub sequence: Vec<Direction>,
    pub progress: usize,
    pub started_at: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QteResolution {
    Dodged,
    Failed,
    TimedOut,
}

// ── Events & outcome ──────────────────────────────────────────────────────────

/// Things that happened during one tick, for audio/presentation hooks.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameEvent {
    EnemyKilled { by: PlayerId },
    PlayerDamaged { player: PlayerId, amount: f32 },
    PlayerDied { player: PlayerId },
    PlayerStatus { player: PlayerId, kind: StatusKind },
    WeaponFired { player: PlayerId, kind: ProjectileKind },
    Pickup { player: PlayerId, kind: DropKind, amount: f32 },
    ConsumableUsed { id: String },
    BossSpawned { kind: BossKind },
    BossDamaged { amount: f32 },
    BossPower { power: SpecialPower },
    BossDefeated { kind: BossKind },
    LevelAdvanced { level: u32 },
    QteStarted { player: PlayerId },
    QteResolved { player: PlayerId, resolution: QteResolution },
    RunEnded { won: bool },
}

/// Reported once when the run ends, for the progression collaborator.
#[derive(Clone, Debug, PartialEq)]
pub struct RunOutcome {
    pub won: bool,
    pub scores: Vec<u32>,
    pub xp_earned: u32,
    pub consumables_left: u32,
    pub currency_earned: u32,
}

// ── Master game state ─────────────────────────────────────────────────────────

/// Equipment resolved from the catalog at run start.
#[derive(Clone, Debug)]
pub struct Loadout {
    pub vehicle: Vehicle,
    pub bomb: BombType,
    pub gun: Option<GunType>,
    pub consumable: Option<Consumable>,
}

/// The entire simulation state. Owned by the driver; presentation only
/// reads it between ticks.
#[derive(Clone, Debug)]
pub struct GameState {
    pub catalog: Arc<Catalog>,
    pub loadout: Loadout,
    pub multiplayer: bool,
    pub player_level: u32,
    pub player_xp: u32,
    pub level: u32,
    pub players: Vec<Player>,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub boss: Option<Boss>,
    pub boss_projectiles: Vec<BossProjectile>,
    pub drops: Vec<DropItem>,
    pub explosions: Vec<Explosion>,
    pub drone: Option<Drone>,
    pub qte: Option<QteSession>,
    pub buffs: GlobalBuffs,
    pub timers: TimerQueue,
    pub consumables_left: u32,
    pub run_xp: u32,
    pub run_currency: f32,
    pub taunt: Option<String>,
    pub status: GameStatus,
    pub outcome: Option<RunOutcome>,
    /// Events of the most recent tick only.
    pub events: Vec<FrameEvent>,
    pub frame: u64,
    pub next_id: u64,
}

impl GameState {
    pub fn alloc_id(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id.index())
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id.index())
    }

    pub fn live_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| !p.dead)
    }

    /// First player still in the fight, in player order.
    pub fn first_live_player(&self) -> Option<&Player> {
        self.live_players().next()
    }

    /// A `LevelAdvanced` event was raised this frame.
    pub fn level_advanced(&self) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, FrameEvent::LevelAdvanced { .. }))
    }

    pub fn is_boss_active(&self) -> bool {
        self.boss.is_some()
    }
}

// ── Bounds ────────────────────────────────────────────────────────────────────

macro_rules! impl_bounded {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Bounded for $ty {
                fn bounds(&self) -> Rect {
                    Rect::new(self.x, self.y, self.w, self.h)
                }
            }
        )*
    };
}

impl_bounded!(Player, Drone, Enemy, SubEntity, Boss, Projectile, BossProjectile, DropItem);
