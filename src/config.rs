//! Run configuration handed in by the menu/progression layer.
//!
//! Read from an optional RON file. Every field has a default so a partial
//! file only overrides what it names.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ron::extensions::Extensions;
use ron::Options;
use serde::Deserialize;
use tracing::info;

use crate::error::{GameError, GameResult};

/// Audio and overlay preferences. The core only reads `show_controls`;
/// volumes are passed through for whoever plays sound.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub master_volume: f32,
    pub music_volume: f32,
    pub sfx_volume: f32,
    pub show_controls: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 1.0,
            music_volume: 0.5,
            sfx_volume: 0.8,
            show_controls: true,
        }
    }
}

impl Settings {
    /// Clamp volumes into `0.0..=1.0`.
    pub fn normalized(mut self) -> Self {
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub start_level: u32,
    pub multiplayer: bool,
    pub vehicle: String,
    pub bomb: String,
    pub gun: Option<String>,
    pub consumable: Option<String>,
    /// How many of the equipped consumable the player owns.
    pub consumable_quantity: u32,
    pub player_level: u32,
    pub player_xp: u32,
    pub settings: Settings,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            start_level: 1,
            multiplayer: false,
            vehicle: "p1".to_string(),
            bomb: "b1".to_string(),
            gun: None,
            consumable: None,
            consumable_quantity: 0,
            player_level: 1,
            player_xp: 0,
            settings: Settings::default(),
        }
    }
}

fn ron_options() -> Options {
    Options::default().with_default_extension(Extensions::IMPLICIT_SOME)
}

impl RunConfig {
    pub fn from_ron(source: &str, path: &str) -> GameResult<Self> {
        let config: RunConfig =
            ron_options()
                .from_str(source)
                .map_err(|e| GameError::ConfigParse {
                    path: path.to_string(),
                    details: e.to_string(),
                })?;
        Ok(Self {
            settings: config.settings.normalized(),
            ..config
        })
    }

    /// A missing file is not an error; it yields the defaults.
    pub fn load_from(path: &Path) -> GameResult<Self> {
        let shown = path.display().to_string();
        match fs::read_to_string(path) {
            Ok(contents) => {
                let config = Self::from_ron(&contents, &shown)?;
                info!(path = %shown, "Loaded run config");
                Ok(config)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(GameError::ConfigRead {
                path: shown,
                details: e.to_string(),
            }),
        }
    }
}

/// `$HOME/.boat_blitz.ron`, or the working directory when `HOME` is unset.
pub fn default_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".boat_blitz.ron")
}
