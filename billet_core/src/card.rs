use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{EnumMessage, IntoEnumIterator};
use strum_macros::{Display, EnumIter, EnumMessage, EnumString};

/// The eight ranks of the game, in ascending power order.
///
/// The declaration order is significant: `value()` and the derived
/// `Ord` both follow it, and Baron comparisons rely on it.
#[derive(
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Copy,
    Clone,
    Hash,
    Display,
    EnumIter,
    EnumString,
    EnumMessage,
    Serialize,
    Deserialize,
)]
pub enum Card {
    #[strum(
        message = "Choose an opponent and attempt to guess their card. If you guess right they are eliminated. You may not guess the Guard."
    )]
    Guard,
    #[strum(message = "Choose an opponent and secretly look at their card.")]
    Priest,
    #[strum(
        message = "Compare your other card against the card of an opponent. The one with the lower card is eliminated. On a tie nobody is eliminated."
    )]
    Baron,
    #[strum(message = "You cannot be targeted by other cards until the start of your next turn.")]
    Handmaid,
    #[strum(
        message = "Choose a player (yourself included) who must discard their card and draw a new one."
    )]
    Prince,
    #[strum(message = "Choose an opponent and exchange your other card with theirs.")]
    King,
    #[strum(message = "No effect when played.")]
    Countess,
    #[strum(message = "If you discard this card by any means, you are eliminated.")]
    Princess,
}

impl Card {
    /// Power value used for Baron comparisons and the end-of-match showdown.
    pub fn value(&self) -> u8 {
        *self as u8 + 1
    }

    /// How many copies of this rank go into a fresh deck.
    pub fn count(&self) -> usize {
        match self {
            Card::Guard => 5,
            Card::Priest | Card::Baron | Card::Handmaid | Card::Prince => 2,
            Card::King | Card::Countess | Card::Princess => 1,
        }
    }

    /// The full 16-card multiset, unshuffled.
    pub fn deck() -> Vec<Card> {
        Card::iter()
            .flat_map(|c| std::iter::repeat(c).take(c.count()))
            .collect()
    }

    pub fn needs_guess(&self) -> bool {
        self == &Card::Guard
    }

    pub fn needs_target(&self) -> bool {
        matches!(
            self,
            Card::Guard | Card::Priest | Card::Baron | Card::Prince | Card::King
        )
    }

    pub fn rules() -> String {
        Card::iter().map(|c| c.rule()).join("\n")
    }

    pub fn rule(&self) -> String {
        format!(
            "{} [value = {}]: {}",
            self,
            self.value(),
            self.get_message().unwrap_or("No rule")
        )
    }
}
