use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::board::TileKind;

/// Highest tick or frame rate, one per millisecond
pub const MAX_RATE: u32 = 1000;

/// Extra growth granted by each reward kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthTable {
    pub reward_a: i32,
    pub reward_b: i32,
    pub reward_c: i32,
}

impl Default for GrowthTable {
    fn default() -> Self {
        Self {
            reward_a: 2,
            reward_b: 3,
            reward_c: 1,
        }
    }
}

impl GrowthTable {
    /// Growth budget for a reward kind, zero for anything else
    pub fn for_kind(&self, kind: TileKind) -> i32 {
        match kind {
            TileKind::RewardA => self.reward_a,
            TileKind::RewardB => self.reward_b,
            TileKind::RewardC => self.reward_c,
            TileKind::SnakeBody | TileKind::SnakeHead | TileKind::Hazard => 0,
        }
    }
}

/// Configuration for the game
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of columns, odd so the board has a center cell
    pub cols: usize,
    /// Number of rows, odd so the board has a center cell
    pub rows: usize,
    /// Length below which the tail is never dropped
    pub min_snake_length: usize,
    /// Capacity of the pending direction queue
    pub max_queued_directions: usize,

    // Scoring
    /// Award value a fresh reward is worth
    pub initial_reward_value: i32,
    /// Award value never decays below this
    pub reward_value_floor: i32,
    /// Growth budget per reward kind
    pub growth: GrowthTable,

    /// Number of hazards placed on reset
    pub hazard_count: usize,

    // Pacing (consumed by the host loop)
    pub ticks_per_second: f32,
    pub frames_per_second: u32,

    /// Fixed RNG seed; entropy when absent
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cols: 25,
            rows: 25,
            min_snake_length: 5,
            max_queued_directions: 3,
            initial_reward_value: 100,
            reward_value_floor: 10,
            growth: GrowthTable::default(),
            hazard_count: 1,
            ticks_per_second: 9.0,
            frames_per_second: 50,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom board size
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            ..Default::default()
        }
    }

    /// Same configuration with a fixed seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Create a small board for testing
    pub fn small() -> Self {
        Self::new(11, 11)
    }

    /// Load a JSON configuration file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        let config: GameConfig =
            serde_json::from_str(&json).context("Failed to deserialize config")?;
        Ok(config)
    }

    /// Total number of cells
    pub fn capacity(&self) -> usize {
        self.cols * self.rows
    }

    /// Check that the configuration describes a playable board
    pub fn validate(&self) -> Result<(), String> {
        if self.cols == 0 || self.rows == 0 {
            return Err(format!(
                "board must be non-empty, got {}x{}",
                self.cols, self.rows
            ));
        }

        if self.cols % 2 == 0 || self.rows % 2 == 0 {
            return Err(format!(
                "board dimensions must be odd, got {}x{}",
                self.cols, self.rows
            ));
        }

        if i32::try_from(self.capacity()).is_err() {
            return Err(format!("board of {} cells is too large", self.capacity()));
        }

        if self.min_snake_length == 0 {
            return Err("min_snake_length must be at least 1".to_string());
        }

        if self.max_queued_directions == 0 {
            return Err("max_queued_directions must be at least 1".to_string());
        }

        if self.reward_value_floor > self.initial_reward_value {
            return Err(format!(
                "reward_value_floor ({}) cannot exceed initial_reward_value ({})",
                self.reward_value_floor, self.initial_reward_value
            ));
        }

        // the host needs timer periods of at least a millisecond
        if !(self.ticks_per_second > 0.0 && self.ticks_per_second <= MAX_RATE as f32) {
            return Err(format!(
                "ticks_per_second must be in (0, {}], got {}",
                MAX_RATE, self.ticks_per_second
            ));
        }

        if self.frames_per_second == 0 || self.frames_per_second > MAX_RATE {
            return Err(format!(
                "frames_per_second must be in 1..={}, got {}",
                MAX_RATE, self.frames_per_second
            ));
        }

        // head + three rewards + hazards
        let initial_entities = 1 + 3 + self.hazard_count;
        if initial_entities > self.capacity() {
            return Err(format!(
                "{} initial entities do not fit on a {}x{} board",
                initial_entities, self.cols, self.rows
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.cols, 25);
        assert_eq!(config.rows, 25);
        assert_eq!(config.min_snake_length, 5);
        assert_eq!(config.max_queued_directions, 3);
        assert_eq!(config.initial_reward_value, 100);
        assert_eq!(config.reward_value_floor, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15, 15);
        assert_eq!(config.cols, 15);
        assert_eq!(config.rows, 15);
        assert_eq!(config.capacity(), 225);
    }

    #[test]
    fn test_growth_table() {
        let growth = GrowthTable::default();
        assert_eq!(growth.for_kind(TileKind::RewardA), 2);
        assert_eq!(growth.for_kind(TileKind::RewardB), 3);
        assert_eq!(growth.for_kind(TileKind::RewardC), 1);
        assert_eq!(growth.for_kind(TileKind::Hazard), 0);
    }

    #[test]
    fn test_validation_even_dimensions() {
        assert!(GameConfig::new(24, 25).validate().is_err());
        assert!(GameConfig::new(25, 24).validate().is_err());
        assert!(GameConfig::new(0, 25).validate().is_err());
    }

    #[test]
    fn test_validation_floor_above_reward() {
        let config = GameConfig {
            reward_value_floor: 200,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_entities_do_not_fit() {
        let config = GameConfig {
            hazard_count: 10,
            ..GameConfig::new(3, 3)
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_queue() {
        let config = GameConfig {
            max_queued_directions: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_frame_rate_limits() {
        let at_limit = GameConfig {
            frames_per_second: MAX_RATE,
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());

        // would round to a zero render period
        let too_fast = GameConfig {
            frames_per_second: 2000,
            ..Default::default()
        };
        assert!(too_fast.validate().is_err());

        let zero = GameConfig {
            frames_per_second: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_validation_tick_rate_limits() {
        let at_limit = GameConfig {
            ticks_per_second: 1000.0,
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());

        for ticks_per_second in [1.0e9, 0.0, -3.0, f32::NAN, f32::INFINITY] {
            let config = GameConfig {
                ticks_per_second,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{} accepted", ticks_per_second);
        }
    }

    #[test]
    fn test_from_file_fills_missing_fields() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "cols": 15, "rows": 13, "seed": 7 }"#).unwrap();

        let config = GameConfig::from_file(&path).unwrap();
        assert_eq!(config.cols, 15);
        assert_eq!(config.rows, 13);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.min_snake_length, 5);
        assert_eq!(config.growth, GrowthTable::default());
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(GameConfig::from_file(&dir.path().join("nope.json")).is_err());
    }
}
