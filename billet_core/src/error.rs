use thiserror::Error;

use crate::state::PlayerId;

/// Everything that can go wrong between a client frame and the match
/// state. Containment rules: `Protocol` is fatal to its session,
/// `UnknownMessage` and `InvalidMove` are reported to the offender and
/// the session continues, `Delivery` is swallowed during broadcasts.
#[derive(Debug, Error, PartialEq)]
pub enum GameError {
    #[error("protocol violation: {0}")]
    Protocol(String),
    #[error("unknown message type \"{0}\"")]
    UnknownMessage(String),
    #[error("invalid move: {0}")]
    InvalidMove(String),
    #[error("could not deliver message to player {0}")]
    Delivery(PlayerId),
}

impl GameError {
    /// Whether the owning session must be closed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameError::Protocol(_))
    }
}
