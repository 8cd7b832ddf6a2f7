use tracing::{debug, info, warn};

use super::{
    action::{Command, Direction},
    board::{Rgb, TileKind},
    config::GameConfig,
    spawner::Spawner,
    state::{DirectionQueue, GameState, Phase, Position, ScoreState, Snake},
};
use crate::error::GameError;
use crate::storage::SaveRecord;

/// What ended the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake left the board
    Wall,
    /// Snake hit itself
    SelfCollision,
    /// Snake ran into a hazard
    Hazard,
}

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Reward kind eaten this step
    pub eaten: Option<TileKind>,
    /// Type of collision if one occurred
    pub collision_type: Option<CollisionType>,
}

/// Result of a game step
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Points added to the score this step
    pub points: i32,
    /// Whether the game has terminated
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

impl StepResult {
    fn idle(terminated: bool) -> Self {
        Self {
            points: 0,
            terminated,
            info: StepInfo {
                eaten: None,
                collision_type: None,
            },
        }
    }

    fn fatal(collision_type: CollisionType) -> Self {
        Self {
            points: 0,
            terminated: true,
            info: StepInfo {
                eaten: None,
                collision_type: Some(collision_type),
            },
        }
    }
}

/// Which store operation a command asks the host for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageRequest {
    Save,
    Load,
}

/// How the engine handled a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied,
    /// Not valid in the current phase, or filtered out
    Ignored,
    /// Needs a username and the save store; the host takes over
    StorageRequested(StorageRequest),
}

/// What the head is about to enter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Landing {
    Empty,
    Reward(TileKind),
    Hazard,
    Body,
}

impl From<Option<TileKind>> for Landing {
    fn from(tile: Option<TileKind>) -> Self {
        match tile {
            None => Landing::Empty,
            Some(kind @ (TileKind::RewardA | TileKind::RewardB | TileKind::RewardC)) => {
                Landing::Reward(kind)
            }
            Some(TileKind::Hazard) => Landing::Hazard,
            Some(TileKind::SnakeBody | TileKind::SnakeHead) => Landing::Body,
        }
    }
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    spawner: Spawner,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        let spawner = Spawner::new(config.seed);
        Self { config, spawner }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// A game waiting for its first start command
    pub fn new_game(&self) -> GameState {
        GameState::new(&self.config)
    }

    /// Reset the game to its initial running state
    pub fn reset(&mut self, state: &mut GameState) -> Result<(), GameError> {
        state.score = ScoreState::default();
        state.growth = 0;

        let head = state.center();
        state.snake = Snake::new(head);
        state.board.clear();
        state.board.set(head, Some(TileKind::SnakeHead))?;

        state.directions = DirectionQueue::new(Direction::North, self.config.max_queued_directions);

        for kind in TileKind::REWARDS {
            self.spawn_reward(state, kind)?;
        }
        for _ in 0..self.config.hazard_count {
            self.spawner
                .spawn(&mut state.board, TileKind::Hazard, state.snake.len())?;
        }

        state.phase = Phase::Running;
        info!(
            cols = self.config.cols,
            rows = self.config.rows,
            hazards = self.config.hazard_count,
            "game reset"
        );
        Ok(())
    }

    /// Execute one tick of the game
    ///
    /// Only a running game moves. The front of the direction queue is
    /// peeked rather than popped; it is only dropped once another turn is
    /// waiting behind it, so a turn entered during a tick takes effect on
    /// the following one.
    pub fn step(&mut self, state: &mut GameState) -> Result<StepResult, GameError> {
        if state.phase != Phase::Running {
            return Ok(StepResult::idle(state.phase == Phase::Over));
        }
        let Some(head) = state.snake.head() else {
            return Ok(StepResult::idle(false));
        };

        let target = head.moved_in_direction(state.directions.current());

        // Leaving the board counts as hitting the body
        if !state.is_in_bounds(target) {
            return Ok(self.game_over(state, CollisionType::Wall));
        }

        let mut landing = Landing::from(state.board.get(target)?);
        if !matches!(landing, Landing::Reward(_)) {
            state.growth = state.growth.saturating_sub(1);
            if state.growth < 1
                && landing != Landing::Hazard
                && self.keeping_tail_overgrows(&state.snake)
            {
                self.drop_tail(state)?;
                // the tail may have just left the target cell
                landing = Landing::from(state.board.get(target)?);
            }
        }

        match landing {
            Landing::Body => Ok(self.game_over(state, CollisionType::SelfCollision)),
            Landing::Hazard => {
                self.advance_head(state, head, target)?;
                Ok(self.game_over(state, CollisionType::Hazard))
            }
            Landing::Reward(kind) => {
                self.advance_head(state, head, target)?;

                let points = state.score.next_reward;
                state.score.fruits_eaten += 1;
                state.score.score += points;
                state.growth = self.config.growth.for_kind(kind);
                state.board.set_decoration(target, kind.trail_color())?;
                debug!(?kind, points, length = state.snake.len(), "reward eaten");

                if let Err(err) = self.spawn_reward(state, kind) {
                    warn!(%err, "board is full, ending game");
                    state.phase = Phase::Over;
                    return Err(err);
                }

                Ok(StepResult {
                    points,
                    terminated: false,
                    info: StepInfo {
                        eaten: Some(kind),
                        collision_type: None,
                    },
                })
            }
            Landing::Empty => {
                self.advance_head(state, head, target)?;
                if state.score.next_reward > self.config.reward_value_floor {
                    state.score.next_reward -= 1;
                }
                Ok(StepResult::idle(false))
            }
        }
    }

    /// Dispatch a command from the input side
    pub fn apply(
        &mut self,
        state: &mut GameState,
        command: Command,
    ) -> Result<CommandOutcome, GameError> {
        let outcome = match command {
            Command::MoveIntent(direction) => {
                if state.phase == Phase::Running && state.directions.enqueue(direction) {
                    CommandOutcome::Applied
                } else {
                    CommandOutcome::Ignored
                }
            }
            Command::TogglePause => match state.phase {
                Phase::Running => {
                    state.phase = Phase::Paused;
                    CommandOutcome::Applied
                }
                Phase::Paused => {
                    state.phase = Phase::Running;
                    CommandOutcome::Applied
                }
                Phase::NotStarted | Phase::Over => CommandOutcome::Ignored,
            },
            Command::StartOrReset => match state.phase {
                Phase::NotStarted | Phase::Over => {
                    self.reset(state)?;
                    CommandOutcome::Applied
                }
                Phase::Running | Phase::Paused => CommandOutcome::Ignored,
            },
            Command::SaveRequest => CommandOutcome::StorageRequested(StorageRequest::Save),
            Command::LoadRequest => CommandOutcome::StorageRequested(StorageRequest::Load),
        };
        Ok(outcome)
    }

    /// Stop ticking while a prompt or file operation is in flight
    ///
    /// Returns the phase to hand back to [`GameEngine::release`].
    pub fn hold(&self, state: &mut GameState) -> Phase {
        let prior = state.phase;
        if prior == Phase::Running {
            state.phase = Phase::Paused;
        }
        prior
    }

    /// Undo a [`GameEngine::hold`]
    pub fn release(&self, state: &mut GameState, prior: Phase) {
        if state.phase == Phase::Paused {
            state.phase = prior;
        }
    }

    /// Save record for `state`, stamped with `phase`
    ///
    /// The phase is passed separately so a game held for a prompt is saved
    /// with the phase it had before the prompt opened.
    pub fn capture(&self, state: &GameState, phase: Phase) -> SaveRecord {
        SaveRecord::capture(state, phase)
    }

    /// Replace `state` with a decoded save record
    ///
    /// The record is checked against this board before anything changes;
    /// then the game is reset and every field overwritten.
    pub fn restore(&mut self, state: &mut GameState, record: SaveRecord) -> Result<(), GameError> {
        self.check_record(&record)?;

        self.reset(state)?;

        let SaveRecord {
            score,
            fruits_eaten,
            next_reward,
            new_game,
            paused,
            game_over,
            snake,
            directions,
            cells,
        } = record;

        state.score = ScoreState {
            score,
            fruits_eaten,
            next_reward,
        };
        state.growth = 0;
        state.snake = Snake::from_segments(snake);
        state.directions =
            DirectionQueue::from_entries(&directions, self.config.max_queued_directions)
                .unwrap_or_else(|| {
                    DirectionQueue::new(Direction::North, self.config.max_queued_directions)
                });
        state.board.replace_cells(cells)?;
        state.phase = Phase::from_flags(new_game, paused, game_over);

        info!(
            score,
            length = state.snake.len(),
            phase = ?state.phase,
            "game restored"
        );
        Ok(())
    }

    fn check_record(&self, record: &SaveRecord) -> Result<(), GameError> {
        let capacity = self.config.capacity();
        if record.cells.len() != capacity {
            return Err(GameError::InvalidRecord(format!(
                "record board has {} cells, expected {}",
                record.cells.len(),
                capacity
            )));
        }

        let (cols, rows) = (self.config.cols as i32, self.config.rows as i32);
        if let Some(pos) = record
            .snake
            .iter()
            .find(|pos| pos.x < 0 || pos.y < 0 || pos.x >= cols || pos.y >= rows)
        {
            return Err(GameError::InvalidRecord(format!(
                "snake segment ({}, {}) is off the board",
                pos.x, pos.y
            )));
        }

        if record.snake.is_empty() && !record.new_game {
            return Err(GameError::InvalidRecord(
                "started game has no snake".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether keeping the tail this tick would leave the snake longer
    /// than its floor
    fn keeping_tail_overgrows(&self, snake: &Snake) -> bool {
        snake.len() >= self.config.min_snake_length
    }

    fn advance_head(
        &self,
        state: &mut GameState,
        head: Position,
        target: Position,
    ) -> Result<(), GameError> {
        state.board.set(head, Some(TileKind::SnakeBody))?;
        state.snake.push_head(target);
        state.board.set(target, Some(TileKind::SnakeHead))?;
        state.directions.advance();
        Ok(())
    }

    fn drop_tail(&mut self, state: &mut GameState) -> Result<(), GameError> {
        if let Some(tail) = state.snake.pop_tail() {
            state.board.set(tail, None)?;
            state.board.set_decoration(tail, Rgb::BODY)?;
        }
        Ok(())
    }

    fn spawn_reward(&mut self, state: &mut GameState, kind: TileKind) -> Result<Position, GameError> {
        state.score.next_reward = self.config.initial_reward_value;
        self.spawner
            .spawn(&mut state.board, kind, state.snake.len())
    }

    fn game_over(&self, state: &mut GameState, collision_type: CollisionType) -> StepResult {
        state.phase = Phase::Over;
        info!(
            ?collision_type,
            score = state.score.score,
            length = state.snake.len(),
            "game over"
        );
        StepResult::fatal(collision_type)
    }
}
