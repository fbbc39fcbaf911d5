use serde::{Deserialize, Serialize};

use crate::{card::Card, state::PlayerId};

/// One entry of the public play history, in application order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub player: String,
    pub card: Card,
}

/// Frames a client may send, newline-delimited JSON tagged on `type`.
/// The first frame of every session must be `name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Name {
        name: String,
    },
    Ready,
    Play {
        card: Card,
        #[serde(default)]
        target: Option<PlayerId>,
        #[serde(default)]
        guess: Option<Card>,
    },
}

/// Frames the server emits, unicast or broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Info { content: String },
    Log { content: String },
    Start { players: Vec<String> },
    Hand { hand: Vec<Card> },
    YourTurn { hand: Vec<Card>, history: Vec<HistoryEntry> },
    Reveal { target: String, card: Vec<Card> },
    End { winner: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recipient {
    All,
    One(PlayerId),
}

/// A delivery instruction produced by the engine and consumed by the
/// messenger. The engine never touches sockets.
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub to: Recipient,
    pub message: ServerMessage,
}

impl Outgoing {
    pub fn all(message: ServerMessage) -> Self {
        Outgoing {
            to: Recipient::All,
            message,
        }
    }

    pub fn one(player: PlayerId, message: ServerMessage) -> Self {
        Outgoing {
            to: Recipient::One(player),
            message,
        }
    }
}

impl ServerMessage {
    pub fn info(content: impl Into<String>) -> Self {
        ServerMessage::Info {
            content: content.into(),
        }
    }
}
