pub mod card;
pub mod engine;
pub mod error;
pub mod message;
pub mod resolver;
pub mod state;
pub mod utils;

pub use card::Card;
pub use error::GameError;
pub use message::{ClientMessage, HistoryEntry, Outgoing, Recipient, ServerMessage};
pub use state::{MatchState, Player, PlayerId, MAX_PLAYERS, MIN_PLAYERS};
