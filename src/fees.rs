use serde::{Deserialize, Serialize};

use crate::money::Chips;
use crate::patterns::{FeeKind, Patterns, capture_amount};

/// Fees taken from one pot, by category.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeeBreakdown {
    pub rake: Chips,
    pub jackpot: Chips,
    pub bonus_pool: Chips,
    pub tax: Chips,
    pub other: Chips,
}

impl FeeBreakdown {
    pub fn total(&self) -> Chips {
        self.rake + self.jackpot + self.bonus_pool + self.tax + self.other
    }

    fn add(&mut self, kind: FeeKind, amount: Chips) {
        let slot = match kind {
            FeeKind::Rake => &mut self.rake,
            FeeKind::Jackpot => &mut self.jackpot,
            FeeKind::BonusPool => &mut self.bonus_pool,
            FeeKind::Tax => &mut self.tax,
            FeeKind::Other => &mut self.other,
        };
        *slot += amount;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PotSummary {
    pub total_pot: Option<Chips>,
    pub fees: FeeBreakdown,
}

/// Reads the pot size and every fee the summary reports.
///
/// A `Total pot ... | Rake ... | Jackpot ...` line is read segment by
/// segment. Without one, each fee keyword and the pot size are searched for
/// independently anywhere in the hand.
pub fn reconcile(text: &str, patterns: &Patterns) -> PotSummary {
    if let Some(summary) = combined_line(text, patterns) {
        return summary;
    }

    let mut fees = FeeBreakdown::default();
    for (kind, pattern) in &patterns.fee_fallbacks {
        if let Some(amount) = pattern
            .captures(text)
            .and_then(|caps| capture_amount(&caps, 1))
        {
            fees.add(*kind, amount);
        }
    }
    let total_pot = patterns
        .pot_fallbacks
        .iter()
        .find_map(|pattern| pattern.captures(text).and_then(|caps| capture_amount(&caps, 1)));
    PotSummary { total_pot, fees }
}

fn combined_line(text: &str, patterns: &Patterns) -> Option<PotSummary> {
    let caps = patterns.total_pot_line.captures(text)?;
    let rest = caps.get(2).map_or("", |m| m.as_str());
    if !rest.contains('|') {
        return None;
    }

    let mut fees = FeeBreakdown::default();
    for segment in rest.split('|').skip(1) {
        let Some(fee) = patterns.fee_segment.captures(segment) else {
            continue;
        };
        if let Some(amount) = capture_amount(&fee, 2) {
            fees.add(FeeKind::from_label(&fee[1]), amount);
        }
    }
    Some(PotSummary {
        total_pot: capture_amount(&caps, 1),
        fees,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipe_delimited_summary() {
        let patterns = Patterns::new("$").unwrap();
        let summary = reconcile(
            "*** SUMMARY ***\nTotal pot $25.50 Main pot $20. Side pot $5.50. | Rake $1.20 | Jackpot $0.50 | Bingo $0.10 | Tax $0.05",
            &patterns,
        );
        assert_eq!(summary.total_pot, Some(Chips::from_cents(2550)));
        assert_eq!(summary.fees.rake, Chips::from_cents(120));
        assert_eq!(summary.fees.jackpot, Chips::from_cents(50));
        assert_eq!(summary.fees.bonus_pool, Chips::from_cents(10));
        assert_eq!(summary.fees.total(), Chips::from_cents(185));
    }

    #[test]
    fn keyword_fallback() {
        let patterns = Patterns::new("€").unwrap();
        let summary = reconcile("Pot size: €12.00\nRake taken: €0.60", &patterns);
        assert_eq!(summary.total_pot, Some(Chips::from_cents(1200)));
        assert_eq!(summary.fees.total(), Chips::from_cents(60));
    }

    #[test]
    fn nothing_to_find() {
        let patterns = Patterns::new("$").unwrap();
        assert_eq!(reconcile("Hero: folds", &patterns), PotSummary::default());
    }
}
