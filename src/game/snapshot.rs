use super::action::Direction;
use super::board::{Rgb, TileKind};
use super::state::{GameState, Phase, Position};

/// Read-only view of a game, taken once per frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSnapshot {
    pub cols: usize,
    pub rows: usize,
    /// Row-major cell kinds
    pub cells: Vec<Option<TileKind>>,
    /// Row-major decoration colors
    pub decorations: Vec<Rgb>,
    pub head_direction: Direction,
    pub phase: Phase,
    pub score: i32,
    pub fruits_eaten: i32,
    pub next_reward: i32,
    pub snake_length: usize,
}

impl RenderSnapshot {
    pub fn capture(state: &GameState) -> Self {
        Self {
            cols: state.board.cols(),
            rows: state.board.rows(),
            cells: state.board.cells().to_vec(),
            decorations: state.board.decorations().to_vec(),
            head_direction: state.directions.current(),
            phase: state.phase,
            score: state.score.score,
            fruits_eaten: state.score.fruits_eaten,
            next_reward: state.score.next_reward,
            snake_length: state.snake.len(),
        }
    }

    pub fn cell(&self, pos: Position) -> Option<TileKind> {
        if pos.x < 0 || pos.y < 0 || pos.x as usize >= self.cols || pos.y as usize >= self.rows {
            return None;
        }
        self.cells[pos.y as usize * self.cols + pos.x as usize]
    }

    pub fn decoration(&self, pos: Position) -> Rgb {
        if pos.x < 0 || pos.y < 0 || pos.x as usize >= self.cols || pos.y as usize >= self.rows {
            return Rgb::BODY;
        }
        self.decorations[pos.y as usize * self.cols + pos.x as usize]
    }
}
