//! Error taxonomy for the simulation core and the save-slot store.

use std::path::PathBuf;

use thiserror::Error;

use crate::game::TileKind;

/// Failures raised by the simulation core
#[derive(Debug, Error)]
pub enum GameError {
    /// Grid access outside `[0, cols) x [0, rows)`
    #[error("cell ({x}, {y}) is outside the board")]
    OutOfBounds { x: i32, y: i32 },

    /// No empty or same-kind cell left to place a tile on
    #[error("no free cell left to spawn {kind:?}")]
    BoardSaturated { kind: TileKind },

    /// A decoded record does not fit this board
    #[error("save record rejected: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failures raised by the index and data files
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error("i/o failure on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt save record: {0}")]
    CorruptRecord(String),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_converts_into_game_error() {
        let err: GameError = StorageError::UserNotFound("alice".to_string()).into();
        assert!(matches!(err, GameError::Storage(StorageError::UserNotFound(_))));
        assert_eq!(err.to_string(), "user 'alice' not found");
    }

    #[test]
    fn test_out_of_bounds_message() {
        let err = GameError::OutOfBounds { x: -1, y: 3 };
        assert_eq!(err.to_string(), "cell (-1, 3) is outside the board");
    }
}
