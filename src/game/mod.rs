//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! The host loop owns a [`GameState`] and drives it through a [`GameEngine`].

pub mod action;
pub mod board;
pub mod config;
pub mod engine;
pub mod snapshot;
pub mod spawner;
pub mod state;

// Re-export commonly used types
pub use action::{Command, Direction};
pub use board::{Board, Rgb, TileKind};
pub use config::{GameConfig, GrowthTable};
pub use engine::{
    CollisionType, CommandOutcome, GameEngine, StepInfo, StepResult, StorageRequest,
};
pub use snapshot::RenderSnapshot;
pub use spawner::Spawner;
pub use state::{DirectionQueue, GameState, Phase, Position, ScoreState, Snake};
