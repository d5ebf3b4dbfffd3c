use regex::{Captures, Regex};

use crate::money::Chips;

const AMOUNT: &str = r"(\d[\d,]*(?:\.\d+)?|\.\d+)";

/// Patterns that embed the configured currency symbol, compiled once per parser.
#[derive(Debug, Clone)]
pub struct Patterns {
    pub(crate) amount: Regex,
    pub(crate) raise_to: Regex,
    pub(crate) seat: Regex,
    pub(crate) uncalled: Regex,
    pub(crate) stakes: Regex,
    pub(crate) ante: Regex,
    pub(crate) summary_won: Regex,
    pub(crate) summary_collected: Regex,
    pub(crate) total_pot_line: Regex,
    pub(crate) fee_segment: Regex,
    pub(crate) fee_fallbacks: Vec<(FeeKind, Regex)>,
    pub(crate) pot_fallbacks: Vec<Regex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeKind {
    Rake,
    Jackpot,
    BonusPool,
    Tax,
    Other,
}

impl FeeKind {
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_ascii_lowercase();
        if label.starts_with("rake") {
            FeeKind::Rake
        } else if label.starts_with("jackpot") {
            FeeKind::Jackpot
        } else if label.starts_with("bingo")
            || label.starts_with("fortune")
            || label.starts_with("bonus")
        {
            FeeKind::BonusPool
        } else if label.starts_with("tax") {
            FeeKind::Tax
        } else {
            FeeKind::Other
        }
    }
}

impl Patterns {
    pub fn new(currency: &str) -> Result<Self, regex::Error> {
        let cur = regex::escape(currency.trim());
        let fee = |label: &str| Regex::new(&format!(r"(?i)\b{label}\s*:?\s*{cur}\s?{AMOUNT}"));

        Ok(Self {
            amount: Regex::new(&format!(r"{cur}\s?{AMOUNT}"))?,
            raise_to: Regex::new(&format!(r"(?i)\bto\s+{cur}\s?{AMOUNT}"))?,
            seat: Regex::new(&format!(
                r"(?i)^Seat\s+(\d+):\s+(.+?)\s+\(\s*{cur}\s?{AMOUNT}\s+in chips"
            ))?,
            uncalled: Regex::new(&format!(
                r"(?i)^uncalled bet\s*\(?\s*{cur}\s?{AMOUNT}\s*\)?\s*returned to\s+(.+?)\s*$"
            ))?,
            stakes: Regex::new(&format!(
                r"\(\s*{cur}\s?{AMOUNT}\s*/\s*{cur}\s?{AMOUNT}(?:\s+[A-Z]{{3}})?\s*\)"
            ))?,
            ante: Regex::new(&format!(r"(?i)\bante\s+{cur}\s?{AMOUNT}"))?,
            summary_won: Regex::new(&format!(r"(?i)\bwon\s*\(\s*{cur}\s?{AMOUNT}\s*\)"))?,
            summary_collected: Regex::new(&format!(
                r"(?i)\bcollected\s*\(\s*{cur}\s?{AMOUNT}\s*\)"
            ))?,
            total_pot_line: Regex::new(&format!(r"(?im)^\s*total pot\s*:?\s*{cur}\s?{AMOUNT}(.*)$"))?,
            fee_segment: Regex::new(&format!(
                r"^\s*([A-Za-z][A-Za-z ]*?)\s*:?\s*{cur}\s?{AMOUNT}"
            ))?,
            fee_fallbacks: vec![
                (FeeKind::Rake, fee(r"rake(?:\s+taken)?")?),
                (FeeKind::Jackpot, fee("jackpot")?),
                (FeeKind::BonusPool, fee("bingo")?),
                (FeeKind::BonusPool, fee("fortune")?),
                (FeeKind::BonusPool, fee(r"bonus(?:\s+pool)?")?),
                (FeeKind::Tax, fee("tax")?),
            ],
            pot_fallbacks: vec![
                Regex::new(&format!(r"(?i)\btotal pot\s*:?\s*{cur}\s?{AMOUNT}"))?,
                Regex::new(&format!(r"(?i)\bpot size\s*:?\s*{cur}\s?{AMOUNT}"))?,
                Regex::new(&format!(r"(?im)^\s*total\s*:?\s*{cur}\s?{AMOUNT}"))?,
            ],
        })
    }

    /// First currency amount appearing in `text`.
    pub fn first_amount(&self, text: &str) -> Option<Chips> {
        self.amount
            .captures(text)
            .and_then(|caps| capture_amount(&caps, 1))
    }

    pub fn raise_target(&self, text: &str) -> Option<Chips> {
        self.raise_to
            .captures(text)
            .and_then(|caps| capture_amount(&caps, 1))
    }
}

pub(crate) fn capture_amount(caps: &Captures<'_>, group: usize) -> Option<Chips> {
    caps.get(group).and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_symbol_is_escaped() {
        let patterns = Patterns::new("$").unwrap();
        assert_eq!(
            patterns.first_amount("calls $1,250.50"),
            Some(Chips::from_cents(125_050))
        );
        assert_eq!(patterns.first_amount("calls €3"), None);
    }

    #[test]
    fn other_currencies_and_bare_chips() {
        let euro = Patterns::new("€").unwrap();
        assert_eq!(euro.first_amount("bets €0.40"), Some(Chips::from_cents(40)));

        let chips = Patterns::new("").unwrap();
        assert_eq!(chips.first_amount("bets 1500"), Some(Chips::from_cents(150_000)));
    }

    #[test]
    fn raise_target_reads_the_to_amount() {
        let patterns = Patterns::new("$").unwrap();
        assert_eq!(
            patterns.raise_target("raises $3.00 to $4.00"),
            Some(Chips::from_cents(400))
        );
    }
}
