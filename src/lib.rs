//! Snake Remake - a tick-driven grid snake with named save slots
//!
//! This library provides:
//! - Core game logic: board, spawner, snake, collision rules (game module)
//! - Fixed-stride binary save slots keyed by username (storage module)
//! - TUI rendering and keyboard input (render, input modules)
//! - The interactive host loop (modes module)

pub mod error;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod storage;

pub use error::{GameError, StorageError};
