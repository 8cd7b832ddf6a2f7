//! Uniform placement of tiles on free cells.
//!
//! Instead of rejection sampling, which degrades as the snake fills the
//! board, the candidates are counted in one column-major pass, a rank is
//! drawn from that count, and a second pass stamps the candidate with that
//! rank. A cell is a candidate when it is empty or already holds the kind
//! being placed, so a reward can be re-rolled in place without removing it
//! first.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use super::board::{Board, TileKind};
use super::state::Position;
use crate::error::GameError;

pub struct Spawner {
    rng: StdRng,
}

impl Spawner {
    /// Spawner seeded from `seed`, or from OS entropy when absent
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Stamp `kind` on a uniformly chosen candidate cell and return where
    /// it landed
    ///
    /// `snake_len` short-circuits the scan once the snake alone fills the
    /// board.
    pub fn spawn(
        &mut self,
        board: &mut Board,
        kind: TileKind,
        snake_len: usize,
    ) -> Result<Position, GameError> {
        if board.capacity() <= snake_len {
            warn!(?kind, "board saturated by the snake");
            return Err(GameError::BoardSaturated { kind });
        }

        let found = count_candidates(board, kind);
        if found == 0 {
            warn!(?kind, "no candidate cell left");
            return Err(GameError::BoardSaturated { kind });
        }

        let rank = self.rng.gen_range(0..found);
        let pos = nth_candidate(board, kind, rank).ok_or(GameError::BoardSaturated { kind })?;

        board.set(pos, Some(kind))?;
        debug!(?kind, x = pos.x, y = pos.y, candidates = found, "spawned");
        Ok(pos)
    }
}

fn is_candidate(tile: Option<TileKind>, kind: TileKind) -> bool {
    tile.is_none() || tile == Some(kind)
}

/// Candidate cells in column-major order
fn candidates(board: &Board, kind: TileKind) -> impl Iterator<Item = Position> + '_ {
    let cols = board.cols();
    let rows = board.rows();
    let cells = board.cells();
    (0..cols)
        .flat_map(move |x| (0..rows).map(move |y| (x, y)))
        .filter(move |&(x, y)| is_candidate(cells[y * cols + x], kind))
        .map(|(x, y)| Position::new(x as i32, y as i32))
}

fn count_candidates(board: &Board, kind: TileKind) -> usize {
    candidates(board, kind).count()
}

/// The candidate with rank `n`, if there are that many
fn nth_candidate(board: &Board, kind: TileKind, n: usize) -> Option<Position> {
    candidates(board, kind).nth(n)
}
