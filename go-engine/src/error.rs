use std::fmt;

use thiserror::Error;

use crate::status::GameStatus;
use crate::{PlayerId, Pos};

/// Broad class of a rejection, used by callers to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input: out-of-range position, unseated player.
    Validation,
    /// Rule violation on an otherwise well-formed move.
    IllegalMove,
    /// Wrong status or turn for the requested operation.
    IllegalState,
    /// Unknown game or snapshot reference.
    NotFound,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::IllegalMove => write!(f, "illegal move"),
            ErrorKind::IllegalState => write!(f, "illegal state"),
            ErrorKind::NotFound => write!(f, "not found"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GoError {
    #[error("position {0} is not on the board")]
    NotOnBoard(Pos),
    #[error("no stone at position {0}")]
    InvalidPosition(Pos),
    #[error("player {0} is not seated in this game")]
    NotSeated(PlayerId),
    #[error("unsupported board size {0}")]
    BoardSize(u8),
    #[error("description is longer than {max} characters")]
    DescriptionTooLong { max: usize },
    #[error("overwrite")]
    Overwrite,
    #[error("suicide")]
    Suicide,
    #[error("ko violation")]
    KoViolation,
    #[error("game is {0}")]
    WrongStatus(GameStatus),
    #[error("out of turn")]
    OutOfTurn,
    #[error("cannot join own game")]
    OwnGame,
    #[error("no moves to undo")]
    NothingToUndo,
    #[error("corrupt snapshot chain: {0}")]
    CorruptHistory(String),
}

impl GoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GoError::NotOnBoard(_)
            | GoError::InvalidPosition(_)
            | GoError::NotSeated(_)
            | GoError::BoardSize(_)
            | GoError::DescriptionTooLong { .. } => ErrorKind::Validation,
            GoError::Overwrite | GoError::Suicide | GoError::KoViolation => {
                ErrorKind::IllegalMove
            }
            GoError::WrongStatus(_)
            | GoError::OutOfTurn
            | GoError::OwnGame
            | GoError::NothingToUndo => ErrorKind::IllegalState,
            GoError::CorruptHistory(_) => ErrorKind::NotFound,
        }
    }

    /// Programmer-error-class conditions, as opposed to routine gameplay rejections.
    pub fn is_fault(&self) -> bool {
        matches!(self, GoError::CorruptHistory(_))
    }
}
