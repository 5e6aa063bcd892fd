//! Core simulation for a scrolling boat shooter: wave enemies, one boss per
//! level, timed buffs and debuffs, and the reflex-dodge challenge.
//!
//! The library is pure simulation. Terminal input and drawing live in the
//! binary (`main.rs`, `display.rs`).

pub mod boss;
pub mod catalog;
pub mod collision;
pub mod combat;
pub mod compute;
pub mod config;
pub mod constants;
pub mod entities;
pub mod error;
pub mod hud;
pub mod input;
pub mod movement;
pub mod qte;
pub mod taunt;
pub mod timers;
