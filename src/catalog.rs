//! Immutable reference data: vehicles, weapons, consumables and the ordered
//! campaign. Parsed once from the embedded `data/catalog.ron` and shared
//! read-only by every run.

use serde::Deserialize;

use crate::entities::BossKind;
use crate::error::{GameError, GameResult};

const EMBEDDED_CATALOG: &str = include_str!("../data/catalog.ron");

/// Passive ability carried by a vehicle.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VehicleAbility {
    #[default]
    None,
    /// Auto-firing cannons on both flanks.
    SideCannons,
    /// Reflex dodge, twin lasers, faster bombs, currency bonus.
    Aegis,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    pub glyph: char,
    pub hp_multiplier: f32,
    /// Fraction of incoming damage ignored, 0.0..1.0.
    #[serde(default)]
    pub damage_reduction: f32,
    #[serde(default)]
    pub ability: VehicleAbility,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BombType {
    pub id: String,
    pub name: String,
    pub glyph: char,
    pub damage: f32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GunType {
    pub id: String,
    pub name: String,
    pub glyph: char,
    pub damage: f32,
    pub max_ammo: u32,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsumableEffect {
    Shield,
    Nuke,
    RapidFire,
    TimeSlow,
    GoldRush,
    Drone,
    RepairKit,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Consumable {
    pub id: String,
    pub name: String,
    pub glyph: char,
    pub effect: ConsumableEffect,
    pub cost: u32,
    #[serde(default = "one")]
    pub quantity_per_drop: u32,
}

fn one() -> u32 {
    1
}

#[derive(Deserialize, Clone, Debug)]
pub struct WaveConfig {
    pub glyph: char,
    pub count: u32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BossConfig {
    pub kind: BossKind,
    pub health: f32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LevelConfig {
    pub level: u32,
    pub enemies: WaveConfig,
    pub boss: BossConfig,
    pub background: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct Catalog {
    pub vehicles: Vec<Vehicle>,
    pub bombs: Vec<BombType>,
    pub guns: Vec<GunType>,
    pub consumables: Vec<Consumable>,
    pub levels: Vec<LevelConfig>,
}

impl Catalog {
    /// The catalog shipped with the game.
    pub fn embedded() -> GameResult<Self> {
        Self::from_ron(EMBEDDED_CATALOG)
    }

    pub fn from_ron(source: &str) -> GameResult<Self> {
        let catalog: Catalog = ron::from_str(source).map_err(|e| GameError::CatalogParse {
            details: e.to_string(),
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Levels must be numbered 1..=n in order.
    fn validate(&self) -> GameResult<()> {
        if self.levels.is_empty() {
            return Err(GameError::CatalogParse {
                details: "catalog defines no levels".to_string(),
            });
        }
        for (i, level) in self.levels.iter().enumerate() {
            if level.level != i as u32 + 1 {
                return Err(GameError::CatalogParse {
                    details: format!("level at index {} is numbered {}", i, level.level),
                });
            }
        }
        Ok(())
    }

    pub fn vehicle(&self, id: &str) -> GameResult<&Vehicle> {
        self.vehicles
            .iter()
            .find(|v| v.id == id)
            .ok_or_else(|| GameError::UnknownVehicle(id.to_string()))
    }

    pub fn bomb(&self, id: &str) -> GameResult<&BombType> {
        self.bombs
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| GameError::UnknownBomb(id.to_string()))
    }

    pub fn gun(&self, id: &str) -> GameResult<&GunType> {
        self.guns
            .iter()
            .find(|g| g.id == id)
            .ok_or_else(|| GameError::UnknownGun(id.to_string()))
    }

    pub fn consumable(&self, id: &str) -> GameResult<&Consumable> {
        self.consumables
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| GameError::UnknownConsumable(id.to_string()))
    }

    /// Level by its 1-based number.
    pub fn level(&self, number: u32) -> GameResult<&LevelConfig> {
        number
            .checked_sub(1)
            .and_then(|i| self.levels.get(i as usize))
            .ok_or(GameError::UnknownLevel(number))
    }

    pub fn final_level(&self) -> u32 {
        self.levels.len() as u32
    }
}
