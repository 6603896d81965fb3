use go_engine::{ErrorKind, GameId, GoError};
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Game(#[from] GoError),
    #[error("game {0} not found")]
    NotFound(GameId),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Game(e) => e.kind(),
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::BadRequest(_) => ErrorKind::IllegalState,
            ServiceError::Config(_) => ErrorKind::Validation,
        }
    }

    /// Hard failures, as opposed to rejections a player can cause by playing badly.
    pub fn is_fault(&self) -> bool {
        match self {
            ServiceError::Game(e) => e.is_fault(),
            ServiceError::NotFound(_) | ServiceError::Config(_) => true,
            ServiceError::BadRequest(_) => false,
        }
    }
}
