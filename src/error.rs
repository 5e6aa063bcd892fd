//! Error types for reference data, run configuration and external collaborators.

use thiserror::Error;

/// Errors surfaced by the simulation core.
///
/// Lookup failures are fatal for the run being set up: they mean the
/// equipped loadout points at data that does not exist.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Unknown vehicle id '{0}'")]
    UnknownVehicle(String),

    #[error("Unknown bomb id '{0}'")]
    UnknownBomb(String),

    #[error("Unknown gun id '{0}'")]
    UnknownGun(String),

    #[error("Unknown consumable id '{0}'")]
    UnknownConsumable(String),

    #[error("No level configured with number {0}")]
    UnknownLevel(u32),

    /// The embedded catalog failed to parse.
    #[error("Catalog parse error: {details}")]
    CatalogParse { details: String },

    /// Config file exists but could not be read.
    #[error("Failed to read config '{path}': {details}")]
    ConfigRead { path: String, details: String },

    /// RON parsing of the config file failed.
    #[error("Parse error in config '{path}': {details}")]
    ConfigParse { path: String, details: String },

    /// The taunt collaborator could not produce a line.
    #[error("Taunt source unavailable: {0}")]
    TauntUnavailable(String),
}

pub type GameResult<T> = Result<T, GameError>;
