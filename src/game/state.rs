use std::collections::VecDeque;

use super::action::Direction;
use super::board::Board;
use super::config::GameConfig;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// The snake as an ordered chain of cells, head first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snake {
    body: VecDeque<Position>,
}

impl Snake {
    /// A snake that is only a head
    pub fn new(head: Position) -> Self {
        Self {
            body: VecDeque::from([head]),
        }
    }

    /// Rebuild a snake from stored segments, head first
    pub fn from_segments(segments: impl IntoIterator<Item = Position>) -> Self {
        Self {
            body: segments.into_iter().collect(),
        }
    }

    pub fn head(&self) -> Option<Position> {
        self.body.front().copied()
    }

    pub fn tail(&self) -> Option<Position> {
        self.body.back().copied()
    }

    pub(crate) fn push_head(&mut self, pos: Position) {
        self.body.push_front(pos);
    }

    pub(crate) fn pop_tail(&mut self) -> Option<Position> {
        self.body.pop_back()
    }

    /// Segments from head to tail
    pub fn segments(&self) -> impl Iterator<Item = Position> + '_ {
        self.body.iter().copied()
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Only true before the first game starts
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Pending turns, front first.
///
/// The front entry is the direction the snake is travelling in. The queue
/// is never empty, and no entry reverses or repeats the one before it.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionQueue {
    active: Direction,
    pending: VecDeque<Direction>,
    capacity: usize,
}

impl DirectionQueue {
    pub fn new(initial: Direction, capacity: usize) -> Self {
        Self {
            active: initial,
            pending: VecDeque::new(),
            capacity,
        }
    }

    /// Rebuild a queue from stored entries, front first
    ///
    /// Returns `None` for an empty list.
    pub fn from_entries(entries: &[Direction], capacity: usize) -> Option<Self> {
        let (&active, rest) = entries.split_first()?;
        Some(Self {
            active,
            pending: rest.iter().copied().collect(),
            capacity,
        })
    }

    /// Direction the snake currently travels in
    pub fn current(&self) -> Direction {
        self.active
    }

    /// Most recently queued direction
    pub fn last(&self) -> Direction {
        self.pending.back().copied().unwrap_or(self.active)
    }

    /// Queue a turn; returns false when the turn is dropped
    pub fn enqueue(&mut self, direction: Direction) -> bool {
        if self.len() >= self.capacity {
            return false;
        }

        let last = self.last();
        if direction == last || direction.is_opposite(last) {
            return false;
        }

        self.pending.push_back(direction);
        true
    }

    /// Drop the front entry if another one is waiting behind it
    pub(crate) fn advance(&mut self) {
        if let Some(next) = self.pending.pop_front() {
            self.active = next;
        }
    }

    /// Reset to a single entry
    pub fn reset(&mut self, initial: Direction) {
        self.active = initial;
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        1 + self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Entries front first
    pub fn entries(&self) -> Vec<Direction> {
        std::iter::once(self.active)
            .chain(self.pending.iter().copied())
            .collect()
    }
}

/// Score counters shown to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreState {
    pub score: i32,
    pub fruits_eaten: i32,
    /// What the next reward is worth; decays while nothing is eaten
    pub next_reward: i32,
}

/// Coarse game lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    Running,
    Paused,
    Over,
}

impl Phase {
    /// Flags as stored in a save record: (new game, paused, game over)
    pub fn to_flags(self) -> (bool, bool, bool) {
        (
            self == Phase::NotStarted,
            self == Phase::Paused,
            self == Phase::Over,
        )
    }

    /// Game over wins over paused, paused over new game
    pub fn from_flags(new_game: bool, paused: bool, over: bool) -> Self {
        if over {
            Phase::Over
        } else if paused {
            Phase::Paused
        } else if new_game {
            Phase::NotStarted
        } else {
            Phase::Running
        }
    }
}

/// Complete game state
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub board: Board,
    pub snake: Snake,
    pub directions: DirectionQueue,
    pub score: ScoreState,
    /// Ticks left during which the tail stays put
    pub growth: i32,
    pub phase: Phase,
}

impl GameState {
    /// An unstarted game on an empty board
    pub fn new(config: &GameConfig) -> Self {
        Self {
            board: Board::new(config.cols, config.rows),
            snake: Snake::default(),
            directions: DirectionQueue::new(Direction::North, config.max_queued_directions),
            score: ScoreState::default(),
            growth: 0,
            phase: Phase::NotStarted,
        }
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        self.board.contains(pos)
    }

    /// Board center, where every new game starts
    pub fn center(&self) -> Position {
        Position::new((self.board.cols() / 2) as i32, (self.board.rows() / 2) as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved_by(1, 0), Position::new(6, 5));
        assert_eq!(pos.moved_by(-1, 0), Position::new(4, 5));
        assert_eq!(pos.moved_in_direction(Direction::North), Position::new(5, 4));
        assert_eq!(pos.moved_in_direction(Direction::South), Position::new(5, 6));
    }

    #[test]
    fn test_snake_head_and_tail() {
        let mut snake = Snake::new(Position::new(5, 5));
        assert_eq!(snake.len(), 1);
        assert_eq!(snake.head(), snake.tail());

        snake.push_head(Position::new(5, 4));
        assert_eq!(snake.head(), Some(Position::new(5, 4)));
        assert_eq!(snake.tail(), Some(Position::new(5, 5)));

        assert_eq!(snake.pop_tail(), Some(Position::new(5, 5)));
        assert_eq!(snake.len(), 1);
        assert!(snake.contains(Position::new(5, 4)));
    }

    #[test]
    fn test_queue_starts_with_one_entry() {
        let queue = DirectionQueue::new(Direction::North, 3);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.current(), Direction::North);
        assert_eq!(queue.last(), Direction::North);
    }

    #[test]
    fn test_queue_rejects_reversal_of_active() {
        let mut queue = DirectionQueue::new(Direction::North, 3);
        assert!(!queue.enqueue(Direction::South));
        assert!(!queue.enqueue(Direction::North));
        assert!(queue.enqueue(Direction::East));
        assert_eq!(queue.entries(), vec![Direction::North, Direction::East]);
    }

    #[test]
    fn test_queue_checks_last_enqueued() {
        let mut queue = DirectionQueue::new(Direction::North, 3);
        assert!(queue.enqueue(Direction::East));
        assert!(!queue.enqueue(Direction::West));
        assert!(queue.enqueue(Direction::South));
        assert_eq!(
            queue.entries(),
            vec![Direction::North, Direction::East, Direction::South]
        );
    }

    #[test]
    fn test_queue_capacity() {
        let mut queue = DirectionQueue::new(Direction::North, 3);
        assert!(queue.enqueue(Direction::East));
        assert!(queue.enqueue(Direction::North));
        assert!(!queue.enqueue(Direction::West));
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_queue_advance() {
        let mut queue = DirectionQueue::new(Direction::North, 3);
        queue.advance();
        assert_eq!(queue.current(), Direction::North);

        queue.enqueue(Direction::West);
        queue.advance();
        assert_eq!(queue.current(), Direction::West);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_queue_from_entries() {
        assert!(DirectionQueue::from_entries(&[], 3).is_none());
        let queue =
            DirectionQueue::from_entries(&[Direction::East, Direction::South], 3).unwrap();
        assert_eq!(queue.current(), Direction::East);
        assert_eq!(queue.last(), Direction::South);
    }

    #[test]
    fn test_phase_flags() {
        for phase in [Phase::NotStarted, Phase::Running, Phase::Paused, Phase::Over] {
            let (new_game, paused, over) = phase.to_flags();
            assert_eq!(Phase::from_flags(new_game, paused, over), phase);
        }
        assert_eq!(Phase::from_flags(false, true, true), Phase::Over);
    }

    #[test]
    fn test_new_state_is_not_started() {
        let state = GameState::new(&GameConfig::default());
        assert_eq!(state.phase, Phase::NotStarted);
        assert!(state.snake.is_empty());
        assert_eq!(state.center(), Position::new(12, 12));
        assert!(state.is_in_bounds(Position::new(24, 24)));
        assert!(!state.is_in_bounds(Position::new(25, 0)));
    }
}
