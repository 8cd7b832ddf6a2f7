//! Fixed-stride binary save record.
//!
//! Layout, big-endian, in write order:
//!
//! | field                        | width                    |
//! |------------------------------|--------------------------|
//! | score, fruits eaten, award   | 3 x i32                  |
//! | new game, paused, game over  | 3 x u8 (0/1)             |
//! | snake length + (x, y) pairs  | i32 + capacity x 2 x i32 |
//! | direction count + codes      | i32 + capacity x i32     |
//! | board length + cell codes    | i32 + capacity x i32     |
//!
//! Unused snake and direction slots hold `-1`, so every record on a given
//! board has the same size and can be addressed by `index * size`.

use crate::error::StorageError;
use crate::game::{Direction, GameState, Phase, Position, TileKind, board::EMPTY_CODE};

const PAD: i32 = -1;

/// Everything needed to rebuild a game
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRecord {
    pub score: i32,
    pub fruits_eaten: i32,
    pub next_reward: i32,
    pub new_game: bool,
    pub paused: bool,
    pub game_over: bool,
    /// Head first
    pub snake: Vec<Position>,
    /// Front first
    pub directions: Vec<Direction>,
    /// Row-major
    pub cells: Vec<Option<TileKind>>,
}

impl SaveRecord {
    /// Record for `state`, with the phase flags taken from `phase`
    pub fn capture(state: &GameState, phase: Phase) -> Self {
        let (new_game, paused, game_over) = phase.to_flags();
        Self {
            score: state.score.score,
            fruits_eaten: state.score.fruits_eaten,
            next_reward: state.score.next_reward,
            new_game,
            paused,
            game_over,
            snake: state.snake.segments().collect(),
            directions: state.directions.entries(),
            cells: state.board.cells().to_vec(),
        }
    }

    /// Byte length of one record on a board of `capacity` cells
    pub fn size(capacity: usize) -> usize {
        3 * 4 + 3 + (4 + capacity * 8) + (4 + capacity * 4) + (4 + capacity * 4)
    }

    pub fn encode(&self, capacity: usize) -> Result<Vec<u8>, StorageError> {
        if self.snake.len() > capacity || self.directions.len() > capacity {
            return Err(StorageError::CorruptRecord(format!(
                "snake of {} / {} directions exceed board capacity {}",
                self.snake.len(),
                self.directions.len(),
                capacity
            )));
        }
        if self.cells.len() != capacity {
            return Err(StorageError::CorruptRecord(format!(
                "board of {} cells does not match capacity {}",
                self.cells.len(),
                capacity
            )));
        }

        let mut out = Writer(Vec::with_capacity(Self::size(capacity)));
        out.i32(self.score);
        out.i32(self.fruits_eaten);
        out.i32(self.next_reward);
        out.bool(self.new_game);
        out.bool(self.paused);
        out.bool(self.game_over);

        out.i32(self.snake.len() as i32);
        for pos in &self.snake {
            out.i32(pos.x);
            out.i32(pos.y);
        }
        for _ in self.snake.len()..capacity {
            out.i32(PAD);
            out.i32(PAD);
        }

        out.i32(self.directions.len() as i32);
        for direction in &self.directions {
            out.i32(direction.code());
        }
        for _ in self.directions.len()..capacity {
            out.i32(PAD);
        }

        out.i32(capacity as i32);
        for cell in &self.cells {
            out.i32(cell.map_or(EMPTY_CODE, |kind| kind.code()));
        }

        Ok(out.0)
    }

    /// Decode a record, rejecting anything that does not fit the layout
    pub fn decode(bytes: &[u8], capacity: usize) -> Result<Self, StorageError> {
        let mut input = Reader { bytes, pos: 0 };

        let score = input.i32()?;
        let fruits_eaten = input.i32()?;
        let next_reward = input.i32()?;
        let new_game = input.bool()?;
        let paused = input.bool()?;
        let game_over = input.bool()?;

        let snake_len = input.count("snake length", capacity)?;
        let mut snake = Vec::with_capacity(snake_len);
        for _ in 0..snake_len {
            let x = input.i32()?;
            let y = input.i32()?;
            snake.push(Position::new(x, y));
        }
        for _ in snake_len..capacity {
            input.padding()?;
            input.padding()?;
        }

        let direction_count = input.count("direction count", capacity)?;
        let mut directions = Vec::with_capacity(direction_count);
        for _ in 0..direction_count {
            let code = input.i32()?;
            let direction = Direction::from_code(code).ok_or_else(|| {
                StorageError::CorruptRecord(format!("unknown direction code {}", code))
            })?;
            directions.push(direction);
        }
        for _ in direction_count..capacity {
            input.padding()?;
        }

        let board_len = input.i32()?;
        if board_len != capacity as i32 {
            return Err(StorageError::CorruptRecord(format!(
                "board length {} does not match capacity {}",
                board_len, capacity
            )));
        }
        let mut cells = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            let code = input.i32()?;
            let cell = if code == EMPTY_CODE {
                None
            } else {
                Some(TileKind::from_code(code).ok_or_else(|| {
                    StorageError::CorruptRecord(format!("unknown tile code {}", code))
                })?)
            };
            cells.push(cell);
        }

        Ok(Self {
            score,
            fruits_eaten,
            next_reward,
            new_game,
            paused,
            game_over,
            snake,
            directions,
            cells,
        })
    }
}

struct Writer(Vec<u8>);

impl Writer {
    fn i32(&mut self, value: i32) {
        self.0.extend_from_slice(&value.to_be_bytes());
    }

    fn bool(&mut self, value: bool) {
        self.0.push(u8::from(value));
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], StorageError> {
        let end = self.pos + N;
        let chunk = self
            .bytes
            .get(self.pos..end)
            .ok_or_else(|| StorageError::CorruptRecord(format!("record truncated at byte {}", self.pos)))?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(chunk);
        Ok(out)
    }

    fn i32(&mut self) -> Result<i32, StorageError> {
        Ok(i32::from_be_bytes(self.take::<4>()?))
    }

    fn bool(&mut self) -> Result<bool, StorageError> {
        match self.take::<1>()?[0] {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(StorageError::CorruptRecord(format!(
                "invalid boolean byte {}",
                other
            ))),
        }
    }

    fn count(&mut self, what: &str, capacity: usize) -> Result<usize, StorageError> {
        let value = self.i32()?;
        usize::try_from(value)
            .ok()
            .filter(|count| *count <= capacity)
            .ok_or_else(|| {
                StorageError::CorruptRecord(format!(
                    "{} {} outside 0..={}",
                    what, value, capacity
                ))
            })
    }

    fn padding(&mut self) -> Result<(), StorageError> {
        let value = self.i32()?;
        if value != PAD {
            return Err(StorageError::CorruptRecord(format!(
                "expected padding, found {}",
                value
            )));
        }
        Ok(())
    }
}
