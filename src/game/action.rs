/// Direction the snake can move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(&self, other: Direction) -> bool {
        matches!(
            (self, other),
            (Direction::North, Direction::South)
                | (Direction::South, Direction::North)
                | (Direction::East, Direction::West)
                | (Direction::West, Direction::East)
        )
    }

    /// Returns the delta (dx, dy) for moving in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    /// Integer code used by the save record
    pub fn code(&self) -> i32 {
        match self {
            Direction::North => 1,
            Direction::South => 2,
            Direction::East => 3,
            Direction::West => 4,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Direction::North),
            2 => Some(Direction::South),
            3 => Some(Direction::East),
            4 => Some(Direction::West),
            _ => None,
        }
    }
}

/// Commands forwarded from the input side into the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Queue a turn
    MoveIntent(Direction),
    /// Flip between Running and Paused
    TogglePause,
    /// Start a new game from NotStarted or Over
    StartOrReset,
    /// Persist the current game under a username
    SaveRequest,
    /// Replace the current game with a saved one
    LoadRequest,
}

impl From<Direction> for Command {
    fn from(direction: Direction) -> Self {
        Command::MoveIntent(direction)
    }
}
