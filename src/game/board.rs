//! The tile grid: one optional tile kind per cell plus a decoration layer.

use super::state::Position;
use crate::error::GameError;

/// What can occupy a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileKind {
    RewardA,
    RewardB,
    RewardC,
    SnakeBody,
    SnakeHead,
    Hazard,
}

impl TileKind {
    pub const REWARDS: [TileKind; 3] = [TileKind::RewardA, TileKind::RewardB, TileKind::RewardC];

    pub fn is_reward(&self) -> bool {
        matches!(
            self,
            TileKind::RewardA | TileKind::RewardB | TileKind::RewardC
        )
    }

    pub fn is_hazard(&self) -> bool {
        matches!(self, TileKind::Hazard)
    }

    /// Integer code used by the save record
    pub fn code(&self) -> i32 {
        match self {
            TileKind::RewardA => 1,
            TileKind::SnakeHead => 2,
            TileKind::SnakeBody => 3,
            TileKind::Hazard => 4,
            TileKind::RewardB => 5,
            TileKind::RewardC => 6,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(TileKind::RewardA),
            2 => Some(TileKind::SnakeHead),
            3 => Some(TileKind::SnakeBody),
            4 => Some(TileKind::Hazard),
            5 => Some(TileKind::RewardB),
            6 => Some(TileKind::RewardC),
            _ => None,
        }
    }

    /// Decoration a reward leaves behind once eaten
    pub fn trail_color(&self) -> Rgb {
        match self {
            TileKind::RewardA => Rgb::new(220, 40, 60),
            TileKind::RewardB => Rgb::new(255, 170, 110),
            TileKind::RewardC => Rgb::new(250, 220, 60),
            TileKind::SnakeBody | TileKind::SnakeHead | TileKind::Hazard => Rgb::BODY,
        }
    }
}

/// Code stored for an empty cell
pub const EMPTY_CODE: i32 = -1;

/// Per-cell decoration color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Neutral body color
    pub const BODY: Rgb = Rgb::new(0, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::BODY
    }
}

/// Fixed-size grid, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    cols: usize,
    rows: usize,
    tiles: Vec<Option<TileKind>>,
    decorations: Vec<Rgb>,
}

impl Board {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            tiles: vec![None; cols * rows],
            decorations: vec![Rgb::BODY; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn capacity(&self) -> usize {
        self.tiles.len()
    }

    /// Check if a position is within the grid bounds
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.cols as i32 && pos.y >= 0 && pos.y < self.rows as i32
    }

    fn index(&self, pos: Position) -> Result<usize, GameError> {
        if !self.contains(pos) {
            return Err(GameError::OutOfBounds { x: pos.x, y: pos.y });
        }
        Ok(pos.y as usize * self.cols + pos.x as usize)
    }

    pub fn get(&self, pos: Position) -> Result<Option<TileKind>, GameError> {
        Ok(self.tiles[self.index(pos)?])
    }

    pub fn set(&mut self, pos: Position, kind: Option<TileKind>) -> Result<(), GameError> {
        let idx = self.index(pos)?;
        self.tiles[idx] = kind;
        Ok(())
    }

    pub fn decoration(&self, pos: Position) -> Result<Rgb, GameError> {
        Ok(self.decorations[self.index(pos)?])
    }

    pub fn set_decoration(&mut self, pos: Position, color: Rgb) -> Result<(), GameError> {
        let idx = self.index(pos)?;
        self.decorations[idx] = color;
        Ok(())
    }

    /// Empty every cell and reset decorations to the body color
    pub fn clear(&mut self) {
        self.tiles.fill(None);
        self.decorations.fill(Rgb::BODY);
    }

    /// Row-major view of every cell
    pub fn cells(&self) -> &[Option<TileKind>] {
        &self.tiles
    }

    pub fn decorations(&self) -> &[Rgb] {
        &self.decorations
    }

    /// Replace the whole tile layer; decorations are left alone
    pub fn replace_cells(&mut self, cells: Vec<Option<TileKind>>) -> Result<(), GameError> {
        if cells.len() != self.tiles.len() {
            return Err(GameError::InvalidRecord(format!(
                "board holds {} cells, record has {}",
                self.tiles.len(),
                cells.len()
            )));
        }
        self.tiles = cells;
        Ok(())
    }

    /// Number of cells currently holding `kind`
    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|tile| **tile == Some(kind)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(5, 7);
        assert_eq!(board.capacity(), 35);
        assert!(board.cells().iter().all(Option::is_none));
        assert!(board.decorations().iter().all(|c| *c == Rgb::BODY));
    }

    #[test]
    fn test_set_and_get() {
        let mut board = Board::new(5, 5);
        let pos = Position::new(3, 1);
        board.set(pos, Some(TileKind::Hazard)).unwrap();
        assert_eq!(board.get(pos).unwrap(), Some(TileKind::Hazard));
        assert_eq!(board.cells()[5 + 3], Some(TileKind::Hazard));

        board.set(pos, None).unwrap();
        assert_eq!(board.get(pos).unwrap(), None);
    }

    #[test]
    fn test_out_of_bounds_is_rejected() {
        let mut board = Board::new(5, 5);
        assert!(matches!(
            board.get(Position::new(5, 0)),
            Err(GameError::OutOfBounds { x: 5, y: 0 })
        ));
        assert!(board.set(Position::new(0, -1), Some(TileKind::RewardA)).is_err());
        assert!(board.decoration(Position::new(-1, 2)).is_err());
    }

    #[test]
    fn test_clear_resets_tiles_and_decorations() {
        let mut board = Board::new(3, 3);
        let pos = Position::new(1, 1);
        board.set(pos, Some(TileKind::SnakeHead)).unwrap();
        board.set_decoration(pos, Rgb::new(1, 2, 3)).unwrap();

        board.clear();
        assert_eq!(board.get(pos).unwrap(), None);
        assert_eq!(board.decoration(pos).unwrap(), Rgb::BODY);
    }

    #[test]
    fn test_tile_codes() {
        for kind in [
            TileKind::RewardA,
            TileKind::RewardB,
            TileKind::RewardC,
            TileKind::SnakeBody,
            TileKind::SnakeHead,
            TileKind::Hazard,
        ] {
            assert_eq!(TileKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(TileKind::RewardA.code(), 1);
        assert_eq!(TileKind::RewardC.code(), 6);
        assert_eq!(TileKind::from_code(EMPTY_CODE), None);
        assert_eq!(TileKind::from_code(7), None);
    }

    #[test]
    fn test_replace_cells_checks_length() {
        let mut board = Board::new(3, 3);
        assert!(board.replace_cells(vec![None; 8]).is_err());

        let mut cells = vec![None; 9];
        cells[4] = Some(TileKind::SnakeHead);
        board.replace_cells(cells).unwrap();
        assert_eq!(board.get(Position::new(1, 1)).unwrap(), Some(TileKind::SnakeHead));
        assert_eq!(board.count(TileKind::SnakeHead), 1);
    }
}
