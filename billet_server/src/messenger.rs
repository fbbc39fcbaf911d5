use std::collections::HashMap;

use billet_core::{GameError, Outgoing, PlayerId, Recipient, ServerMessage};
use log::warn;
use tokio::sync::mpsc::UnboundedSender;

/// Delivers engine output to sockets. Each connected player owns an
/// unbounded channel drained by their session's writer task, so
/// queuing here never blocks and a dead peer never stalls a broadcast.
pub struct Messenger {
    connections: HashMap<PlayerId, UnboundedSender<ServerMessage>>,
}

impl Messenger {
    pub fn new() -> Self {
        Messenger {
            connections: HashMap::new(),
        }
    }

    pub fn register(&mut self, id: PlayerId, sender: UnboundedSender<ServerMessage>) {
        self.connections.insert(id, sender);
    }

    pub fn unregister(&mut self, id: PlayerId) {
        self.connections.remove(&id);
    }

    pub fn unicast(&self, id: PlayerId, message: ServerMessage) -> Result<(), GameError> {
        let sender = self
            .connections
            .get(&id)
            .ok_or(GameError::Delivery(id))?;
        sender.send(message).map_err(|_| GameError::Delivery(id))
    }

    /// Best effort to every connected player; failures are logged and
    /// never abort delivery to the remaining recipients.
    pub fn broadcast(&self, message: &ServerMessage) {
        for (&id, sender) in &self.connections {
            if sender.send(message.clone()).is_err() {
                warn!("dropping message for disconnected player {id}");
            }
        }
    }

    pub fn deliver(&self, batch: Vec<Outgoing>) {
        for outgoing in batch {
            match outgoing.to {
                Recipient::All => self.broadcast(&outgoing.message),
                Recipient::One(id) => {
                    if let Err(err) = self.unicast(id, outgoing.message) {
                        warn!("{err}");
                    }
                }
            }
        }
    }
}
