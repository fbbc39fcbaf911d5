use rand::seq::SliceRandom;

use crate::{
    card::Card,
    error::GameError,
    message::{HistoryEntry, Outgoing, ServerMessage},
    state::{MatchState, PlayerId, MAX_PLAYERS, MIN_PLAYERS},
    resolver::resolve,
    utils::VecExtensions,
};

/// Starts the match if every present player is ready and the table
/// holds 2 to 4 of them. Callers hold the state lock, so the
/// `started` flag makes the transition one-shot even under a burst of
/// concurrent `ready` frames.
pub fn check_start(state: &mut MatchState) -> Vec<Outgoing> {
    if state.started {
        return vec![];
    }
    let present = state.living();
    let ready = present
        .iter()
        .filter(|&&id| state.players[id].ready)
        .count();
    if ready != present.len() || !(MIN_PLAYERS..=MAX_PLAYERS).contains(&present.len()) {
        return vec![];
    }
    start_match(state)
}

fn start_match(state: &mut MatchState) -> Vec<Outgoing> {
    state.started = true;
    let mut deck = Card::deck();
    deck.shuffle(&mut rand::thread_rng());
    state.deck = deck;

    let mut messages = vec![Outgoing::all(ServerMessage::Start {
        players: state.names(),
    })];
    for id in state.living() {
        if let Some(card) = state.draw() {
            state.players[id].hand.push(card);
        }
        messages.push(Outgoing::one(
            id,
            ServerMessage::Hand {
                hand: state.players[id].hand.clone(),
            },
        ));
    }
    messages.extend(advance_turn(state));
    messages
}

/// Moves the turn pointer to the next living player, performs the
/// forced draw and announces the turn. With an exhausted deck the
/// match ends in a showdown instead. Callers guarantee at least one
/// living player.
pub fn advance_turn(state: &mut MatchState) -> Vec<Outgoing> {
    while state.is_eliminated(state.turn) {
        state.turn = (state.turn + 1) % state.players.len();
    }
    let id = state.turn;
    // protection lasts until the start of the owner's own next turn
    state.players[id].protected = false;
    match state.draw() {
        Some(card) => {
            state.players[id].hand.push(card);
            vec![Outgoing::one(
                id,
                ServerMessage::YourTurn {
                    hand: state.players[id].hand.clone(),
                    history: state.history.clone(),
                },
            )]
        }
        None => showdown(state),
    }
}

fn showdown(state: &mut MatchState) -> Vec<Outgoing> {
    state.finished = true;
    let mut winner: Option<(PlayerId, u8)> = None;
    for id in state.living() {
        let value = state.players[id].hand.first().map_or(0, Card::value);
        // strict comparison, so ties go to the earliest join
        if winner.map_or(true, |(_, best)| value > best) {
            winner = Some((id, value));
        }
    }
    let mut messages = vec![Outgoing::all(ServerMessage::Log {
        content: "The deck is empty, the highest card wins".to_string(),
    })];
    if let Some((id, _)) = winner {
        messages.push(Outgoing::all(ServerMessage::End {
            winner: state.name(id).to_string(),
        }));
    }
    messages
}

/// Validates and applies one play. Every precondition is checked
/// before the first mutation, so a rejected action leaves the state
/// untouched.
pub fn play_card(
    state: &mut MatchState,
    actor: PlayerId,
    card: Card,
    target: Option<PlayerId>,
    guess: Option<Card>,
) -> Result<Vec<Outgoing>, GameError> {
    if !state.started {
        return Err(GameError::InvalidMove(
            "the match has not started yet".to_string(),
        ));
    }
    if state.finished {
        return Err(GameError::InvalidMove("the match is over".to_string()));
    }
    state.player(actor)?;
    if state.is_eliminated(actor) {
        return Err(GameError::InvalidMove("you are eliminated".to_string()));
    }
    if state.turn != actor {
        return Err(GameError::InvalidMove("it is not your turn".to_string()));
    }
    if !state.players[actor].hand.contains(&card) {
        return Err(GameError::InvalidMove(format!(
            "you do not hold the {card}"
        )));
    }
    // stray fields on untargeted cards are ignored, as the source did
    let target = target.filter(|_| card.needs_target());
    let guess = guess.filter(|_| card.needs_guess());
    if let Some(op) = target {
        if op >= state.players.len() {
            return Err(GameError::InvalidMove(format!("no player with id {op}")));
        }
        if state.is_eliminated(op) {
            return Err(GameError::InvalidMove(format!(
                "{} is already eliminated",
                state.name(op)
            )));
        }
        if op == actor && card != Card::Prince {
            return Err(GameError::InvalidMove(
                "you cannot target yourself".to_string(),
            ));
        }
        if card.needs_guess() && guess.is_none() {
            return Err(GameError::InvalidMove(
                "the Guard needs a guess".to_string(),
            ));
        }
    }

    let card = state.players[actor]
        .hand
        .remove_first_where(|&c| c == card)
        .ok_or_else(|| GameError::InvalidMove(format!("you do not hold the {card}")))?;
    state.discarded += 1;
    let entry = HistoryEntry {
        player: state.name(actor).to_string(),
        card,
    };
    state.history.push(entry);

    let resolution = resolve(state, actor, card, target, guess);
    let mut messages = resolution.messages;
    messages.push(Outgoing::all(ServerMessage::Log {
        content: resolution.line,
    }));

    let living = state.living();
    if living.len() == 1 {
        state.finished = true;
        messages.push(Outgoing::all(ServerMessage::End {
            winner: state.name(living[0]).to_string(),
        }));
    } else {
        state.turn = (state.turn + 1) % state.players.len();
        messages.extend(advance_turn(state));
    }
    Ok(messages)
}

/// Disconnect semantics: the player forfeits and is eliminated on the
/// spot. Before the start this can complete the lobby (the remaining
/// ready players no longer wait on the leaver); during the match it
/// can hand the turn on or end the game.
pub fn forfeit(state: &mut MatchState, id: PlayerId) -> Vec<Outgoing> {
    if id >= state.players.len() || state.is_eliminated(id) || state.finished {
        return vec![];
    }
    state.eliminate(id);
    let mut messages = vec![Outgoing::all(ServerMessage::Info {
        content: format!("{} left the match and forfeits", state.name(id)),
    })];
    if !state.started {
        messages.extend(check_start(state));
        return messages;
    }
    let living = state.living();
    if living.len() == 1 {
        state.finished = true;
        messages.push(Outgoing::all(ServerMessage::End {
            winner: state.name(living[0]).to_string(),
        }));
    } else if state.turn == id {
        state.turn = (state.turn + 1) % state.players.len();
        messages.extend(advance_turn(state));
    }
    messages
}
