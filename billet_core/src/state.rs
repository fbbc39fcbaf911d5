use std::collections::BTreeSet;

use crate::{card::Card, error::GameError, message::HistoryEntry};

pub type PlayerId = usize;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

pub struct Player {
    pub name: String,
    pub hand: Vec<Card>,
    pub protected: bool,
    pub ready: bool,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Player {
            name: name.into(),
            hand: vec![],
            protected: false,
            ready: false,
        }
    }
}

/// The one shared record of a match: players, deck, turn pointer,
/// eliminations and play history. Created once per process, runs
/// `unstarted -> started -> finished` exactly once.
pub struct MatchState {
    pub players: Vec<Player>,
    pub deck: Vec<Card>,
    pub turn: PlayerId,
    pub started: bool,
    pub finished: bool,
    pub eliminated: BTreeSet<PlayerId>,
    pub history: Vec<HistoryEntry>,
    /// Cards permanently out of circulation: played, Prince-folded, or
    /// still in an eliminated player's hand when they dropped out.
    pub discarded: usize,
}

impl MatchState {
    pub fn new() -> Self {
        MatchState {
            players: vec![],
            deck: vec![],
            turn: 0,
            started: false,
            finished: false,
            eliminated: BTreeSet::new(),
            history: vec![],
            discarded: 0,
        }
    }

    /// Registers a player at the next dense id. Ids are assigned in
    /// join order and never reused.
    pub fn register_player(&mut self, name: &str) -> Result<PlayerId, GameError> {
        if self.started {
            return Err(GameError::InvalidMove(
                "the match has already started".to_string(),
            ));
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(GameError::InvalidMove("the match is full".to_string()));
        }
        let id = self.players.len();
        self.players.push(Player::new(name));
        Ok(id)
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, GameError> {
        self.players
            .get(id)
            .ok_or_else(|| GameError::InvalidMove(format!("no player with id {id}")))
    }

    pub fn name(&self, id: PlayerId) -> &str {
        &self.players[id].name
    }

    pub fn names(&self) -> Vec<String> {
        self.players.iter().map(|p| p.name.clone()).collect()
    }

    pub fn is_eliminated(&self, id: PlayerId) -> bool {
        self.eliminated.contains(&id)
    }

    /// Ids still in the running, in join order.
    pub fn living(&self) -> Vec<PlayerId> {
        (0..self.players.len())
            .filter(|id| !self.is_eliminated(*id))
            .collect()
    }

    /// Removes a player from win consideration. Their remaining hand
    /// leaves circulation so the card census stays balanced.
    pub fn eliminate(&mut self, id: PlayerId) {
        if self.eliminated.insert(id) {
            self.discarded += self.players[id].hand.len();
            self.players[id].hand.clear();
        }
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.deck.pop()
    }

    /// Deck plus every hand plus the discard count. 16 from the deal
    /// onwards, whatever has happened since.
    pub fn card_census(&self) -> usize {
        self.deck.len()
            + self
                .players
                .iter()
                .map(|p| p.hand.len())
                .sum::<usize>()
            + self.discarded
    }
}

impl Default for MatchState {
    fn default() -> Self {
        MatchState::new()
    }
}
