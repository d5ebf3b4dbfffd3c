use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::money::Chips;

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum Street {
    #[default]
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Street {
    pub const BETTING: [Street; 4] = [Street::Preflop, Street::Flop, Street::Turn, Street::River];

    /// The street whose last aggressor holds the continuation-bet option here.
    pub fn previous(self) -> Option<Street> {
        match self {
            Street::Preflop => None,
            Street::Flop => Some(Street::Preflop),
            Street::Turn => Some(Street::Flop),
            Street::River => Some(Street::Turn),
            Street::Showdown => Some(Street::River),
        }
    }

    pub fn is_postflop(self) -> bool {
        matches!(self, Street::Flop | Street::Turn | Street::River)
    }

    pub fn label(self) -> &'static str {
        match self {
            Street::Preflop => "preflop",
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
            Street::Showdown => "showdown",
        }
    }
}

impl Display for Street {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Six-way seat rotation measured from the button.
///
/// The rotation length is fixed at six regardless of how many seats are
/// occupied, so on larger tables several seats share a label (seat offsets
/// 0 and 6 are both `Button`). Consumers that need full-ring positions must
/// derive them from `Player::seat` themselves.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Position {
    #[serde(rename = "Button")]
    Button,
    #[serde(rename = "Small Blind")]
    SmallBlind,
    #[serde(rename = "Big Blind")]
    BigBlind,
    #[serde(rename = "UTG")]
    Utg,
    #[serde(rename = "Hijack")]
    Hijack,
    #[serde(rename = "Cutoff")]
    Cutoff,
}

impl Position {
    pub const ROTATION: [Position; 6] = [
        Position::Button,
        Position::SmallBlind,
        Position::BigBlind,
        Position::Utg,
        Position::Hijack,
        Position::Cutoff,
    ];

    pub fn from_seats(seat: u32, button_seat: u32) -> Self {
        let offset = (i64::from(seat) - i64::from(button_seat)).rem_euclid(6);
        Self::ROTATION[offset as usize]
    }

    pub fn index(self) -> usize {
        match self {
            Position::Button => 0,
            Position::SmallBlind => 1,
            Position::BigBlind => 2,
            Position::Utg => 3,
            Position::Hijack => 4,
            Position::Cutoff => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Position::Button => "Button",
            Position::SmallBlind => "Small Blind",
            Position::BigBlind => "Big Blind",
            Position::Utg => "UTG",
            Position::Hijack => "Hijack",
            Position::Cutoff => "Cutoff",
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Fold,
    Check,
    Call(Chips),
    Bet(Chips),
    Raise { added: Chips, to: Chips },
    AllIn(Chips),
    Post(Chips),
    Collect(Chips),
    /// Uncalled bet handed back to its owner.
    Return(Chips),
}

impl ActionKind {
    /// Signed money movement into the pot caused by this action.
    pub fn contribution(&self) -> Chips {
        match *self {
            ActionKind::Call(amount)
            | ActionKind::Bet(amount)
            | ActionKind::AllIn(amount)
            | ActionKind::Post(amount) => amount,
            ActionKind::Raise { added, .. } => added,
            ActionKind::Return(amount) => -amount,
            ActionKind::Fold | ActionKind::Check | ActionKind::Collect(_) => Chips::ZERO,
        }
    }

    /// Absolute amount shown on the action row.
    pub fn amount(&self) -> Chips {
        match *self {
            ActionKind::Collect(amount) | ActionKind::Return(amount) => amount,
            other => other.contribution(),
        }
    }

    pub fn is_aggressive(&self) -> bool {
        matches!(
            self,
            ActionKind::Bet(_) | ActionKind::Raise { .. } | ActionKind::AllIn(_)
        )
    }

    pub fn is_voluntary(&self) -> bool {
        !matches!(self, ActionKind::Post(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Fold => "fold",
            ActionKind::Check => "check",
            ActionKind::Call(_) => "call",
            ActionKind::Bet(_) => "bet",
            ActionKind::Raise { .. } => "raise",
            ActionKind::AllIn(_) => "all_in",
            ActionKind::Post(_) => "post",
            ActionKind::Collect(_) => "collect",
            ActionKind::Return(_) => "return",
        }
    }
}

/// One atomic decision (or money movement) by one player, in textual order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Action {
    pub sequence: usize,
    pub actor: String,
    pub kind: ActionKind,
    pub street: Street,
    pub position: Position,
    pub pot_before: Chips,
    pub pot_after: Chips,
    /// Actor's total commitment on the current street after this action.
    pub total_bet: Chips,
    pub is_voluntary: bool,
    pub is_aggressive: bool,
    pub bet_to_pot: f64,
    pub pot_odds: f64,
    pub cbet_opportunity: bool,
    pub cbet: bool,
}

impl Action {
    pub fn contribution(&self) -> Chips {
        self.kind.contribution()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_wraps_around_the_button() {
        assert_eq!(Position::from_seats(4, 4), Position::Button);
        assert_eq!(Position::from_seats(5, 4), Position::SmallBlind);
        assert_eq!(Position::from_seats(1, 4), Position::Utg);
        assert_eq!(Position::from_seats(3, 4), Position::Cutoff);
    }

    #[test]
    fn seven_handed_tables_alias_the_button() {
        assert_eq!(Position::from_seats(8, 2), Position::Button);
    }

    #[test]
    fn returns_take_money_out_of_the_pot() {
        let refund = ActionKind::Return(Chips::from_cents(50));
        assert_eq!(refund.contribution(), Chips::from_cents(-50));
        assert_eq!(refund.amount(), Chips::from_cents(50));
        assert!(refund.is_voluntary());
        assert!(!ActionKind::Post(Chips::from_cents(100)).is_voluntary());
    }
}
