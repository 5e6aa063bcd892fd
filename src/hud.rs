//! Derived heads-up values, computed from a post-tick snapshot.

use crate::entities::{BossKind, Direction, GameState, PlayerId, WeaponSelection};

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerHud {
    pub id: PlayerId,
    pub score: u32,
    pub hp: f32,
    pub max_hp: f32,
    pub dead: bool,
    pub weapon: WeaponSelection,
    /// `None` when no gun is equipped.
    pub ammo: Option<u32>,
    pub stunned: bool,
    pub slowed: bool,
    pub reversed: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BossHud {
    pub kind: BossKind,
    pub name: &'static str,
    /// `health / max_health`, in `0.0..=1.0`.
    pub fraction: f32,
    pub invisible: bool,
}

/// Whole seconds left on each consumable buff, zero when inactive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuffCountdowns {
    pub invincible: u64,
    pub rapid_fire: u64,
    pub time_slow: u64,
    pub gold_rush: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DodgePrompt {
    pub player: PlayerId,
    pub sequence: Vec<Direction>,
    pub progress: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HudView {
    pub level: u32,
    pub final_level: u32,
    pub players: Vec<PlayerHud>,
    pub currency: u32,
    pub player_level: u32,
    pub xp: u32,
    pub consumable: Option<(String, char)>,
    pub consumables_left: u32,
    pub buffs: BuffCountdowns,
    pub boss: Option<BossHud>,
    pub taunt: Option<String>,
    pub dodge: Option<DodgePrompt>,
}

fn seconds(ms: u64) -> u64 {
    ms.div_ceil(1000)
}

impl HudView {
    pub fn from_state(state: &GameState, now: u64) -> Self {
        let has_gun = state.loadout.gun.is_some();
        let players = state
            .players
            .iter()
            .map(|p| PlayerHud {
                id: p.id,
                score: p.score,
                hp: p.hp,
                max_hp: p.max_hp,
                dead: p.dead,
                weapon: p.weapon,
                ammo: has_gun.then_some(p.ammo),
                stunned: p.status.stunned.is_active(),
                slowed: p.status.slowed.is_active(),
                reversed: p.status.controls_reversed.is_active(),
            })
            .collect();

        let boss = state.boss.as_ref().map(|b| BossHud {
            kind: b.kind,
            name: b.kind.name(),
            fraction: if b.max_health > 0.0 {
                (b.health / b.max_health).clamp(0.0, 1.0)
            } else {
                0.0
            },
            invisible: b.power_active(crate::entities::SpecialPower::Invisibility),
        });

        let buffs = &state.buffs;
        Self {
            level: state.level,
            final_level: state.catalog.final_level(),
            players,
            currency: state.run_currency.round() as u32,
            player_level: state.player_level,
            xp: state.player_xp + state.run_xp,
            consumable: state
                .loadout
                .consumable
                .as_ref()
                .map(|c| (c.name.clone(), c.glyph)),
            consumables_left: state.consumables_left,
            buffs: BuffCountdowns {
                invincible: seconds(buffs.invincible.remaining(now)),
                rapid_fire: seconds(buffs.rapid_fire.remaining(now)),
                time_slow: seconds(buffs.time_slow.remaining(now)),
                gold_rush: seconds(buffs.gold_rush.remaining(now)),
            },
            boss,
            taunt: state.taunt.clone(),
            dodge: state.qte.as_ref().map(|s| DodgePrompt {
                player: s.player,
                sequence: s.sequence.clone(),
                progress: s.progress,
            }),
        }
    }
}
