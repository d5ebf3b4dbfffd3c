use crate::cards::Card;
use crate::game::Street;
use crate::lexer::{ClassifiedLine, LineKind, Marker, SummaryLine, Verb};
use crate::record::{Board, ShowdownEntry};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShowdownReport {
    pub board: Board,
    pub entries: Vec<ShowdownEntry>,
    pub winner: String,
    /// Players the summary lists as having mucked.
    pub mucked: Vec<String>,
}

/// Pulls the board from street markers and the reveals from show lines,
/// topping both up from the summary section.
pub fn extract(lines: &[ClassifiedLine<'_>]) -> ShowdownReport {
    let mut report = ShowdownReport::default();
    let mut summary_board = Vec::new();
    let mut summary_won = None;
    let mut summary_collected = None;

    for line in lines {
        match &line.kind {
            LineKind::Marker(Marker::Street { street, cards }) => match street {
                Street::Flop if report.board.flop.is_empty() => {
                    report.board.flop = cards.iter().copied().take(3).collect();
                }
                Street::Turn if report.board.turn.is_none() => {
                    report.board.turn = cards.last().copied();
                }
                Street::River if report.board.river.is_none() => {
                    report.board.river = cards.last().copied();
                }
                _ => {}
            },
            LineKind::Action {
                actor,
                verb: Verb::Shows { cards, description },
            } => record_entry(&mut report.entries, actor, cards, description.as_deref()),
            LineKind::Summary(SummaryLine::Board(cards)) => summary_board = cards.clone(),
            LineKind::Summary(SummaryLine::Seat {
                name,
                showed,
                description,
                mucked,
                won,
                collected,
            }) => {
                if let Some(cards) = showed {
                    record_entry(&mut report.entries, name, cards, description.as_deref());
                }
                if *mucked && !report.mucked.contains(name) {
                    report.mucked.push(name.clone());
                }
                if won.is_some() && summary_won.is_none() {
                    summary_won = Some(name.clone());
                }
                if collected.is_some() && summary_collected.is_none() {
                    summary_collected = Some(name.clone());
                }
            }
            _ => {}
        }
    }

    if report.board.flop.is_empty() && summary_board.len() >= 3 {
        report.board.flop = summary_board[..3].to_vec();
        report.board.turn = summary_board.get(3).copied();
        report.board.river = summary_board.get(4).copied();
    }

    report.winner = report
        .entries
        .first()
        .map(|entry| entry.player.clone())
        .or(summary_won)
        .or(summary_collected)
        .unwrap_or_default();
    report
}

fn record_entry(
    entries: &mut Vec<ShowdownEntry>,
    player: &str,
    cards: &[Card],
    description: Option<&str>,
) {
    match entries.iter_mut().find(|entry| entry.player == player) {
        Some(entry) => {
            if entry.description.is_empty() {
                if let Some(description) = description {
                    entry.description = description.to_string();
                }
            }
            if entry.cards.is_empty() {
                entry.cards = cards.to_vec();
            }
        }
        None => entries.push(ShowdownEntry {
            player: player.to_string(),
            cards: cards.to_vec(),
            description: description.unwrap_or_default().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::parse_cards;
    use crate::lexer::tokenize;
    use crate::patterns::Patterns;

    const HAND: &str = "\
PokerStars Hand #1: Hold'em No Limit ($1/$2) - 2024/01/01 10:00:00
Table 'T' 6-max Seat #1 is the button
Seat 1: Alice ($200 in chips)
Seat 2: Bob ($200 in chips)
*** FLOP *** [Ah 7d 2c]
*** TURN *** [Ah 7d 2c] [Ks]
*** RIVER *** [Ah 7d 2c Ks] [3h]
*** SHOW DOWN ***
Bob: shows [Ad Kd] (two pair, Aces and Kings)
Alice: mucks hand
Bob collected $20 from pot
*** SUMMARY ***
Board [Ah 7d 2c Ks 3h]
Seat 1: Alice (button) mucked [Qc Qs]
Seat 2: Bob showed [Ad Kd] and won ($20) with two pair, Aces and Kings";

    #[test]
    fn reads_board_and_reveals() {
        let patterns = Patterns::new("$").unwrap();
        let report = extract(&tokenize(HAND, &patterns));
        assert_eq!(report.board.cards(), parse_cards("Ah 7d 2c Ks 3h"));
        assert_eq!(report.entries.len(), 1);
        assert_eq!(report.entries[0].description, "two pair, Aces and Kings");
        assert_eq!(report.winner, "Bob");
        assert_eq!(report.mucked, vec!["Alice".to_string()]);
    }
}
