use crate::{
    card::Card,
    message::{Outgoing, ServerMessage},
    state::{MatchState, PlayerId},
};

/// What a single card play amounted to: the public result line and any
/// side-channel unicasts (reveals, refreshed hands).
pub struct Resolution {
    pub line: String,
    pub messages: Vec<Outgoing>,
}

impl Resolution {
    fn new(line: String) -> Self {
        Resolution {
            line,
            messages: vec![],
        }
    }
}

/// Applies the effect of `card` to the match state. The caller has
/// already validated the action (card was in hand, target in range and
/// alive, Guard came with a guess) and removed the card from the
/// actor's hand; nothing here can fail, it can only fizzle.
pub fn resolve(
    state: &mut MatchState,
    actor: PlayerId,
    card: Card,
    target: Option<PlayerId>,
    guess: Option<Card>,
) -> Resolution {
    let mut res = Resolution::new(format!("{} plays {}", state.name(actor), card));
    match card {
        Card::Guard => {
            let (Some(op), Some(guess)) = (target, guess) else {
                return res;
            };
            if guess == Card::Guard {
                res.line += " but the Guard may not be guessed";
            } else if state.players[op].protected {
                res.line += &format!(" but {} is protected", state.name(op));
            } else if state.players[op].hand.first() == Some(&guess) {
                res.line += &format!(" and eliminates {} (guessed {})", state.name(op), guess);
                state.eliminate(op);
            } else {
                res.line += " but the guess is wrong";
            }
        }
        Card::Priest => {
            let Some(op) = target else {
                return res;
            };
            if state.players[op].protected {
                res.line += &format!(" but {} is protected", state.name(op));
            } else {
                res.line += &format!(" and looks at {}'s hand", state.name(op));
                res.messages.push(Outgoing::one(
                    actor,
                    ServerMessage::Reveal {
                        target: state.name(op).to_string(),
                        card: state.players[op].hand.clone(),
                    },
                ));
            }
        }
        Card::Baron => {
            let Some(op) = target else {
                return res;
            };
            if state.players[op].protected {
                res.line += &format!(" but {} is protected", state.name(op));
            } else {
                // both hands hold at most one card at this point
                let own = hand_value(state, actor);
                let theirs = hand_value(state, op);
                if theirs < own {
                    res.line += &format!(" and eliminates {} (lower card)", state.name(op));
                    state.eliminate(op);
                } else if own < theirs {
                    res.line += &format!(" and {} is eliminated (lower card)", state.name(actor));
                    state.eliminate(actor);
                } else {
                    res.line += " and the cards are equal, nobody is eliminated";
                }
            }
        }
        Card::Handmaid => {
            state.players[actor].protected = true;
            res.line += " and is protected until their next turn";
        }
        Card::Prince => {
            let Some(op) = target else {
                return res;
            };
            if op != actor && state.players[op].protected {
                res.line += &format!(" but {} is protected", state.name(op));
            } else if let Some(folded) = state.players[op].hand.pop() {
                state.discarded += 1;
                if folded == Card::Princess {
                    res.line += &format!(
                        " and eliminates {} (the Princess was discarded)",
                        state.name(op)
                    );
                    state.eliminate(op);
                } else {
                    res.line += &format!(" and forces {} to discard {}", state.name(op), folded);
                    if let Some(replacement) = state.draw() {
                        state.players[op].hand.push(replacement);
                    }
                    res.messages.push(Outgoing::one(
                        op,
                        ServerMessage::Hand {
                            hand: state.players[op].hand.clone(),
                        },
                    ));
                }
            }
        }
        Card::King => {
            let Some(op) = target else {
                return res;
            };
            if state.players[op].protected {
                // the source ignored protection here; honoring it is a
                // deliberate rule fix
                res.line += &format!(" but {} is protected", state.name(op));
            } else {
                res.line += &format!(" and trades hands with {}", state.name(op));
                let own = std::mem::take(&mut state.players[actor].hand);
                let theirs = std::mem::replace(&mut state.players[op].hand, own);
                state.players[actor].hand = theirs;
                for id in [actor, op] {
                    res.messages.push(Outgoing::one(
                        id,
                        ServerMessage::Hand {
                            hand: state.players[id].hand.clone(),
                        },
                    ));
                }
            }
        }
        Card::Countess => {}
        Card::Princess => {
            res.line += " and is eliminated (the Princess may not be played)";
            state.eliminate(actor);
        }
    }
    res
}

fn hand_value(state: &MatchState, id: PlayerId) -> u8 {
    state.players[id].hand.first().map_or(0, Card::value)
}

#[cfg(test)]
mod tests {
    use super::resolve;
    use crate::{
        card::Card,
        message::{Outgoing, Recipient, ServerMessage},
        state::MatchState,
    };

    fn two_player_state(alice: Card, bob: Card) -> MatchState {
        let mut state = MatchState::new();
        state.register_player("Alice").unwrap();
        state.register_player("Bob").unwrap();
        state.started = true;
        state.deck = vec![Card::Guard, Card::Priest];
        state.players[0].hand.push(alice);
        state.players[1].hand.push(bob);
        state
    }

    #[test]
    fn guard_should_eliminate_on_exact_guess() {
        let mut state = two_player_state(Card::Baron, Card::Priest);
        let res = resolve(&mut state, 0, Card::Guard, Some(1), Some(Card::Priest));
        assert!(state.is_eliminated(1));
        assert!(res.line.contains("eliminates Bob"));
    }

    #[test]
    fn guard_should_never_eliminate_on_guard_guess() {
        let mut state = two_player_state(Card::Baron, Card::Guard);
        let res = resolve(&mut state, 0, Card::Guard, Some(1), Some(Card::Guard));
        assert!(!state.is_eliminated(1));
        assert!(res.line.contains("may not be guessed"));
    }

    #[test]
    fn guard_should_fizzle_on_wrong_guess() {
        let mut state = two_player_state(Card::Baron, Card::King);
        let res = resolve(&mut state, 0, Card::Guard, Some(1), Some(Card::Priest));
        assert!(!state.is_eliminated(1));
        assert!(res.line.contains("wrong"));
    }

    #[test]
    fn guard_should_not_touch_a_protected_target() {
        let mut state = two_player_state(Card::Baron, Card::Priest);
        state.players[1].protected = true;
        resolve(&mut state, 0, Card::Guard, Some(1), Some(Card::Priest));
        assert!(!state.is_eliminated(1));
    }

    #[test]
    fn priest_should_reveal_the_target_hand_to_the_actor_only() {
        let mut state = two_player_state(Card::Baron, Card::Princess);
        let res = resolve(&mut state, 0, Card::Priest, Some(1), None);
        assert_eq!(
            res.messages,
            vec![Outgoing::one(
                0,
                ServerMessage::Reveal {
                    target: "Bob".to_string(),
                    card: vec![Card::Princess],
                }
            )]
        );
    }

    #[test]
    fn priest_should_not_reveal_a_protected_target() {
        let mut state = two_player_state(Card::Baron, Card::Princess);
        state.players[1].protected = true;
        let res = resolve(&mut state, 0, Card::Priest, Some(1), None);
        assert!(res.messages.is_empty());
    }

    #[test]
    fn baron_should_eliminate_the_lower_hand() {
        let mut state = two_player_state(Card::King, Card::Priest);
        resolve(&mut state, 0, Card::Baron, Some(1), None);
        assert!(state.is_eliminated(1));
        assert!(!state.is_eliminated(0));

        let mut state = two_player_state(Card::Priest, Card::King);
        resolve(&mut state, 0, Card::Baron, Some(1), None);
        assert!(state.is_eliminated(0));
        assert!(!state.is_eliminated(1));
    }

    #[test]
    fn baron_tie_should_eliminate_nobody() {
        let mut state = two_player_state(Card::Priest, Card::Priest);
        let res = resolve(&mut state, 0, Card::Baron, Some(1), None);
        assert!(state.eliminated.is_empty());
        assert!(res.line.contains("nobody"));
    }

    #[test]
    fn handmaid_should_protect_the_actor() {
        let mut state = two_player_state(Card::Guard, Card::Priest);
        resolve(&mut state, 0, Card::Handmaid, None, None);
        assert!(state.players[0].protected);
    }

    #[test]
    fn prince_should_replace_the_target_card() {
        let mut state = two_player_state(Card::Guard, Card::Priest);
        let res = resolve(&mut state, 0, Card::Prince, Some(1), None);
        // the target folded Priest and drew the top of the deck
        assert_eq!(state.players[1].hand, vec![Card::Priest]);
        assert_eq!(state.discarded, 1);
        assert!(matches!(
            res.messages[0],
            Outgoing {
                to: Recipient::One(1),
                message: ServerMessage::Hand { .. }
            }
        ));
    }

    #[test]
    fn prince_should_eliminate_a_target_folding_the_princess() {
        let mut state = two_player_state(Card::Guard, Card::Princess);
        resolve(&mut state, 0, Card::Prince, Some(1), None);
        assert!(state.is_eliminated(1));
    }

    #[test]
    fn prince_with_empty_deck_should_leave_the_target_without_a_card() {
        let mut state = two_player_state(Card::Guard, Card::Priest);
        state.deck.clear();
        resolve(&mut state, 0, Card::Prince, Some(1), None);
        assert!(state.players[1].hand.is_empty());
        assert!(!state.is_eliminated(1));
    }

    #[test]
    fn prince_may_target_the_actor() {
        let mut state = two_player_state(Card::Guard, Card::Priest);
        state.players[0].protected = true;
        resolve(&mut state, 0, Card::Prince, Some(0), None);
        assert_eq!(state.players[0].hand, vec![Card::Priest]);
    }

    #[test]
    fn king_should_swap_hands_and_notify_both_players() {
        let mut state = two_player_state(Card::Guard, Card::Princess);
        let res = resolve(&mut state, 0, Card::King, Some(1), None);
        assert_eq!(state.players[0].hand, vec![Card::Princess]);
        assert_eq!(state.players[1].hand, vec![Card::Guard]);
        assert_eq!(res.messages.len(), 2);
    }

    #[test]
    fn king_should_honor_protection() {
        let mut state = two_player_state(Card::Guard, Card::Princess);
        state.players[1].protected = true;
        resolve(&mut state, 0, Card::King, Some(1), None);
        assert_eq!(state.players[0].hand, vec![Card::Guard]);
        assert_eq!(state.players[1].hand, vec![Card::Princess]);
    }

    #[test]
    fn countess_should_have_no_effect() {
        let mut state = two_player_state(Card::Guard, Card::Priest);
        let res = resolve(&mut state, 0, Card::Countess, None, None);
        assert_eq!(res.line, "Alice plays Countess");
        assert!(state.eliminated.is_empty());
    }

    #[test]
    fn princess_should_eliminate_the_actor() {
        let mut state = two_player_state(Card::Guard, Card::Priest);
        resolve(&mut state, 0, Card::Princess, None, None);
        assert!(state.is_eliminated(0));
    }
}
