use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde_with::{DeserializeFromStr, SerializeDisplay};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    /// Accepts the letter form used by every site plus the glyphs some
    /// clients paste into exported logs.
    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "c" | "C" | "♣" => Suit::Clubs,
            "d" | "D" | "♦" => Suit::Diamonds,
            "h" | "H" | "♥" => Suit::Hearts,
            "s" | "S" | "♠" => Suit::Spades,
            _ => return None,
        })
    }

    fn letter(self) -> char {
        match self {
            Suit::Clubs => 'c',
            Suit::Diamonds => 'd',
            Suit::Hearts => 'h',
            Suit::Spades => 's',
        }
    }
}

/// Card rank, ordered deuce to ace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];
    const SYMBOLS: &'static str = "23456789TJQKA";

    fn symbol(self) -> char {
        let idx = Self::ALL.iter().position(|rank| *rank == self).unwrap_or(0);
        Self::SYMBOLS.as_bytes()[idx] as char
    }

    fn from_token(token: &str) -> Option<Self> {
        if token == "10" {
            return Some(Rank::Ten);
        }
        let mut chars = token.chars();
        let symbol = chars.next()?.to_ascii_uppercase();
        if chars.next().is_some() {
            return None;
        }
        Self::SYMBOLS
            .find(symbol)
            .map(|idx| Self::ALL[idx])
    }
}

impl Display for Rank {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A single card as printed in hand histories (`Ah`, `Td`, `10c`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.rank, self.suit.letter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid card '{0}'")]
pub struct ParseCardError(String);

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let invalid = || ParseCardError(token.to_string());
        let (split, _) = token.char_indices().last().ok_or_else(invalid)?;
        let rank = Rank::from_token(&token[..split]).ok_or_else(invalid)?;
        let suit = Suit::from_token(&token[split..]).ok_or_else(invalid)?;
        Ok(Card::new(rank, suit))
    }
}

/// Parses a whitespace-separated card list, dropping unreadable tokens.
pub fn parse_cards(text: &str) -> Vec<Card> {
    text.split_whitespace()
        .filter_map(|token| token.parse().ok())
        .collect()
}

/// Starting-hand class label: `AA`, `AKs`, `T9o`. Empty unless exactly two cards.
pub fn hand_category(cards: &[Card]) -> String {
    let [first, second] = cards else {
        return String::new();
    };
    let (high, low) = if first.rank >= second.rank {
        (first, second)
    } else {
        (second, first)
    };
    if high.rank == low.rank {
        return format!("{}{}", high.rank, low.rank);
    }
    let suited = if high.suit == low.suit { 's' } else { 'o' };
    format!("{}{}{}", high.rank, low.rank, suited)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_history_notation() {
        let card: Card = "Td".parse().unwrap();
        assert_eq!(card, Card::new(Rank::Ten, Suit::Diamonds));
        let ten: Card = "10c".parse().unwrap();
        assert_eq!(ten.rank, Rank::Ten);
        let glyph: Card = "q♥".parse().unwrap();
        assert_eq!(glyph, Card::new(Rank::Queen, Suit::Hearts));
        assert_eq!(card.to_string(), "Td");
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert!("Xx".parse::<Card>().is_err());
        assert!("h".parse::<Card>().is_err());
        assert!("".parse::<Card>().is_err());
        assert_eq!(
            parse_cards("Ah ?? 7d"),
            vec![
                Card::new(Rank::Ace, Suit::Hearts),
                Card::new(Rank::Seven, Suit::Diamonds)
            ]
        );
    }

    #[test]
    fn categorizes_starting_hands() {
        assert_eq!(hand_category(&parse_cards("Kh Ah")), "AKs");
        assert_eq!(hand_category(&parse_cards("9c Td")), "T9o");
        assert_eq!(hand_category(&parse_cards("Qs Qd")), "QQ");
        assert_eq!(hand_category(&parse_cards("Qs")), "");
    }
}
