use std::collections::HashSet;

use crate::config::ParserConfig;
use crate::error::HandError;
use crate::game::Position;
use crate::lexer::{ClassifiedLine, LineKind};
use crate::record::Player;

/// Builds the roster from seat declarations in table order. Seat lines
/// repeated in the summary section do not carry chip counts and never
/// reach this point.
pub fn build_roster(lines: &[ClassifiedLine<'_>]) -> Result<Vec<Player>, HandError> {
    let mut seats = HashSet::new();
    let mut names = HashSet::new();
    let mut players = Vec::new();

    for line in lines {
        let LineKind::Seat { seat, name, stack } = &line.kind else {
            continue;
        };
        if !seats.insert(*seat) {
            return Err(HandError::DuplicateSeat { seat: *seat });
        }
        if !names.insert(name.as_str()) {
            return Err(HandError::DuplicatePlayer { name: name.clone() });
        }
        players.push(Player::new(name.clone(), *seat, *stack));
    }
    Ok(players)
}

/// Resolves the button: the declared seat when it is occupied, otherwise
/// the lowest occupied seat when no button was declared.
pub fn resolve_button(declared: Option<u32>, players: &[Player]) -> Result<u32, HandError> {
    match declared {
        Some(seat) if players.is_empty() || players.iter().any(|p| p.seat == seat) => Ok(seat),
        Some(seat) => Err(HandError::VacantButton { seat }),
        None => Ok(players.iter().map(|p| p.seat).min().unwrap_or(0)),
    }
}

pub fn assign_positions(players: &mut [Player], button_seat: u32) {
    for player in players {
        player.position = Position::from_seats(player.seat, button_seat);
    }
}

pub fn mark_subject(players: &mut [Player], config: &ParserConfig) {
    for player in players {
        player.is_subject = config.is_subject(&player.name);
    }
}

/// Attaches `Dealt to` cards. Two known cards make the player eligible for
/// the preflop statistics of this hand.
pub fn deal_hole_cards(players: &mut [Player], lines: &[ClassifiedLine<'_>]) {
    for line in lines {
        let LineKind::Dealt { name, cards } = &line.kind else {
            continue;
        };
        if let Some(player) = players.iter_mut().find(|p| &p.name == name) {
            if cards.len() == 2 {
                player.hole_cards = cards.clone();
                player.vpip_eligible = true;
                player.pfr_eligible = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::money::Chips;
    use crate::patterns::Patterns;

    const SEATS: &str = "Seat 1: Alice ($50 in chips)\nSeat 3: Bob ($25.50 in chips)\nSeat 6: Hero ($100 in chips)\nDealt to Hero [Ah Kd]";

    #[test]
    fn builds_roster_in_seat_order() {
        let patterns = Patterns::new("$").unwrap();
        let lines = tokenize(SEATS, &patterns);
        let mut players = build_roster(&lines).unwrap();
        assert_eq!(players.len(), 3);
        assert_eq!(players[1].starting_stack, Chips::from_cents(2550));

        assign_positions(&mut players, 3);
        assert_eq!(players[0].position, Position::Hijack);
        assert_eq!(players[1].position, Position::Button);
        assert_eq!(players[2].position, Position::Utg);

        deal_hole_cards(&mut players, &lines);
        assert!(players[2].vpip_eligible);
        assert!(!players[0].vpip_eligible);
    }

    #[test]
    fn rejects_duplicate_seats() {
        let patterns = Patterns::new("$").unwrap();
        let lines = tokenize(
            "Seat 1: Alice ($50 in chips)\nSeat 1: Bob ($50 in chips)",
            &patterns,
        );
        assert_eq!(
            build_roster(&lines),
            Err(HandError::DuplicateSeat { seat: 1 })
        );
    }

    #[test]
    fn button_resolution() {
        let players = vec![
            Player::new("a", 2, Chips::ZERO),
            Player::new("b", 5, Chips::ZERO),
        ];
        assert_eq!(resolve_button(Some(5), &players), Ok(5));
        assert_eq!(resolve_button(None, &players), Ok(2));
        assert_eq!(
            resolve_button(Some(4), &players),
            Err(HandError::VacantButton { seat: 4 })
        );
    }
}
