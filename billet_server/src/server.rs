use billet_core::{engine, Card, GameError, MatchState, PlayerId, ServerMessage};
use log::debug;
use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;

use crate::messenger::Messenger;

/// The one match authority of the process. Every action from every
/// session funnels through the single mutex, which is held from
/// validation until all resulting messages are queued: actions are
/// atomic as far as any client can observe. Nothing under the lock
/// blocks, queuing a message is a channel push.
pub struct Server {
    inner: Mutex<Inner>,
}

struct Inner {
    state: MatchState,
    messenger: Messenger,
}

impl Server {
    pub fn new() -> Self {
        Server {
            inner: Mutex::new(Inner {
                state: MatchState::new(),
                messenger: Messenger::new(),
            }),
        }
    }

    /// Registers a player and wires up their outbound channel. Fails
    /// when the match has started or the table is full.
    pub fn join(
        &self,
        name: &str,
        sender: UnboundedSender<ServerMessage>,
    ) -> Result<PlayerId, GameError> {
        let mut inner = self.inner.lock();
        let id = inner.state.register_player(name)?;
        inner.messenger.register(id, sender);
        inner
            .messenger
            .broadcast(&ServerMessage::info(format!("{name} joined the match")));
        // newcomers get the card reference right away
        let _ = inner.messenger.unicast(id, ServerMessage::info(Card::rules()));
        Ok(id)
    }

    pub fn ready(&self, id: PlayerId) {
        let mut inner = self.inner.lock();
        if inner.state.started {
            let _ = inner
                .messenger
                .unicast(id, ServerMessage::info("the match has already started"));
            return;
        }
        inner.state.players[id].ready = true;
        let name = inner.state.name(id).to_string();
        inner
            .messenger
            .broadcast(&ServerMessage::info(format!("{name} is ready")));
        let batch = engine::check_start(&mut inner.state);
        inner.messenger.deliver(batch);
    }

    /// A rejected play mutates nothing; the actor gets the reason as
    /// an `info` so their client is never silently stuck.
    pub fn play(&self, id: PlayerId, card: Card, target: Option<PlayerId>, guess: Option<Card>) {
        let mut inner = self.inner.lock();
        match engine::play_card(&mut inner.state, id, card, target, guess) {
            Ok(batch) => inner.messenger.deliver(batch),
            Err(err) => {
                debug!("player {id}: {err}");
                let _ = inner.messenger.unicast(id, ServerMessage::info(err.to_string()));
            }
        }
    }

    /// Releases the connection and forfeits the player.
    pub fn disconnect(&self, id: PlayerId) {
        let mut inner = self.inner.lock();
        inner.messenger.unregister(id);
        let batch = engine::forfeit(&mut inner.state, id);
        inner.messenger.deliver(batch);
    }
}

#[cfg(test)]
mod tests {
    use billet_core::{Card, ServerMessage};
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    use super::Server;

    fn drain(rx: &mut UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut messages = vec![];
        while let Ok(msg) = rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    #[test]
    fn ready_players_should_start_the_match_exactly_once() {
        let server = Server::new();
        let (tx0, mut rx0) = mpsc::unbounded_channel();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        server.join("Alice", tx0).unwrap();
        server.join("Bob", tx1).unwrap();
        server.ready(0);
        server.ready(1);
        // a duplicate ready must not deal a second time
        server.ready(1);

        let starts = |msgs: &[ServerMessage]| {
            msgs.iter()
                .filter(|m| matches!(m, ServerMessage::Start { .. }))
                .count()
        };
        assert_eq!(starts(&drain(&mut rx0)), 1);
        assert_eq!(starts(&drain(&mut rx1)), 1);
    }

    #[test]
    fn a_fifth_join_should_be_refused() {
        let server = Server::new();
        for name in ["a", "b", "c", "d"] {
            let (tx, _rx) = mpsc::unbounded_channel();
            server.join(name, tx).unwrap();
        }
        let (tx, _rx) = mpsc::unbounded_channel();
        assert!(server.join("e", tx).is_err());
    }

    #[test]
    fn a_rejected_play_should_answer_the_actor_only() {
        let server = Server::new();
        let (tx0, mut rx0) = mpsc::unbounded_channel();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        server.join("Alice", tx0).unwrap();
        server.join("Bob", tx1).unwrap();
        drain(&mut rx0);
        drain(&mut rx1);

        server.play(0, Card::Guard, None, None);
        let to_alice = drain(&mut rx0);
        assert_eq!(to_alice.len(), 1);
        assert!(matches!(to_alice[0], ServerMessage::Info { .. }));
        assert!(drain(&mut rx1).is_empty());
    }
}
