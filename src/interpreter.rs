//! The street-by-street state machine that turns action lines into typed
//! [`Action`]s with pot and aggressor bookkeeping.

use std::collections::HashMap;

use crate::game::{Action, ActionKind, Street};
use crate::lexer::{ClassifiedLine, LineKind, Marker, Verb};
use crate::money::Chips;
use crate::record::{Player, StreetAggressors};

/// Preflop behaviour of one player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreflopFlags {
    pub vpip: bool,
    pub raised: bool,
    pub called: bool,
    /// Made at least one non-forced preflop decision.
    pub decided: bool,
}

/// Everything the action stream yields for one hand.
#[derive(Debug, Clone, Default)]
pub struct Interpretation {
    pub actions: Vec<Action>,
    pub aggressors: StreetAggressors,
    pub final_street: Street,
    pub went_to_showdown: bool,
    /// Distinct players that revealed cards, in order of first reveal.
    pub showers: Vec<String>,
    pub muckers: Vec<String>,
    pub all_in: Vec<String>,
    pub preflop: HashMap<String, PreflopFlags>,
    pub first_ante: Option<Chips>,
}

pub struct StreetMachine<'r> {
    roster: &'r [Player],
    current_street: Street,
    pot: Chips,
    current_round_total: HashMap<String, Chips>,
    last_aggressor_by_street: StreetAggressors,
    first_bet_by_street: HashMap<Street, String>,
    /// Previous street's last aggressor, fixed when the current street opened.
    cbet_holder: Option<String>,
    out: Interpretation,
}

impl<'r> StreetMachine<'r> {
    pub fn new(roster: &'r [Player]) -> Self {
        Self {
            roster,
            current_street: Street::Preflop,
            pot: Chips::ZERO,
            current_round_total: HashMap::new(),
            last_aggressor_by_street: StreetAggressors::default(),
            first_bet_by_street: HashMap::new(),
            cbet_holder: None,
            out: Interpretation::default(),
        }
    }

    pub fn current_street(&self) -> Street {
        self.current_street
    }

    pub fn pot(&self) -> Chips {
        self.pot
    }

    pub fn feed(&mut self, kind: &LineKind) {
        match kind {
            LineKind::Marker(Marker::Street { street, .. }) => self.enter(*street),
            LineKind::Action { actor, verb } => self.act(actor, verb),
            LineKind::Uncalled { player, amount } => self.refund(player, *amount),
            _ => {}
        }
    }

    pub fn finish(mut self) -> Interpretation {
        self.out.final_street = self.current_street;
        self.out.aggressors = self.last_aggressor_by_street;
        self.out
    }

    /// Streets only move forward; a repeated or earlier marker is ignored.
    fn enter(&mut self, street: Street) {
        if street <= self.current_street {
            return;
        }
        self.current_street = street;
        self.current_round_total.clear();
        self.cbet_holder = if street.is_postflop() {
            street
                .previous()
                .and_then(|previous| self.last_aggressor_by_street.get(previous))
                .map(str::to_string)
        } else {
            None
        };
    }

    fn round_total(&self, player: &str) -> Chips {
        self.current_round_total
            .get(player)
            .copied()
            .unwrap_or_default()
    }

    fn highest_round_total(&self) -> Chips {
        self.current_round_total
            .values()
            .copied()
            .max()
            .unwrap_or_default()
    }

    fn commit(&mut self, player: &str, amount: Chips) {
        *self
            .current_round_total
            .entry(player.to_string())
            .or_default() += amount;
    }

    fn act(&mut self, actor: &str, verb: &Verb) {
        let street = self.current_street;
        let facing = self.highest_round_total();

        let kind = match *verb {
            Verb::Collected(amount) => ActionKind::Collect(amount),
            Verb::Posts { amount, ante } => {
                if ante {
                    self.out.first_ante.get_or_insert(amount);
                } else {
                    self.commit(actor, amount);
                }
                ActionKind::Post(amount)
            }
            Verb::Calls { amount, all_in } => {
                self.commit(actor, amount);
                self.note_all_in(actor, all_in);
                ActionKind::Call(amount)
            }
            Verb::Bets { amount, all_in } => {
                self.commit(actor, amount);
                self.note_all_in(actor, all_in);
                ActionKind::Bet(amount)
            }
            Verb::Raises { to, all_in, .. } => {
                let before = self.round_total(actor);
                let added = if to > before { to - before } else { Chips::ZERO };
                self.commit(actor, added);
                self.note_all_in(actor, all_in);
                ActionKind::Raise { added, to }
            }
            Verb::AllIn(amount) => {
                self.commit(actor, amount);
                self.note_all_in(actor, true);
                ActionKind::AllIn(amount)
            }
            Verb::Folds => ActionKind::Fold,
            Verb::Checks => ActionKind::Check,
            Verb::Shows { .. } => {
                self.out.went_to_showdown = true;
                push_distinct(&mut self.out.showers, actor);
                return;
            }
            Verb::Mucks => {
                push_distinct(&mut self.out.muckers, actor);
                return;
            }
        };

        if street == Street::Preflop {
            self.track_preflop(actor, &kind, facing);
        }

        let opens_street = matches!(kind, ActionKind::Bet(_) | ActionKind::AllIn(_))
            && facing.is_zero()
            && !self.first_bet_by_street.contains_key(&street);
        let decision = !matches!(
            kind,
            ActionKind::Post(_) | ActionKind::Collect(_) | ActionKind::Return(_)
        );
        let cbet_opportunity = decision
            && street.is_postflop()
            && !self.first_bet_by_street.contains_key(&street)
            && self.cbet_holder.as_deref() == Some(actor);
        let cbet = cbet_opportunity && opens_street;

        if street.is_postflop() && opens_street {
            self.first_bet_by_street
                .insert(street, actor.to_string());
        }
        if kind.is_aggressive() {
            self.last_aggressor_by_street.set(street, actor);
        }

        self.record(actor, kind, cbet_opportunity, cbet);
    }

    fn track_preflop(&mut self, actor: &str, kind: &ActionKind, facing: Chips) {
        let flags = self.out.preflop.entry(actor.to_string()).or_default();
        match *kind {
            ActionKind::Call(_) => {
                flags.vpip = true;
                flags.called = true;
            }
            ActionKind::Raise { .. } => {
                flags.vpip = true;
                flags.raised = true;
            }
            ActionKind::Bet(_) => flags.vpip = true,
            ActionKind::AllIn(_) => {
                flags.vpip = true;
                let total = self.current_round_total.get(actor).copied().unwrap_or_default();
                if total > facing {
                    flags.raised = true;
                } else {
                    flags.called = true;
                }
            }
            _ => {}
        }
        if !matches!(
            kind,
            ActionKind::Post(_) | ActionKind::Collect(_) | ActionKind::Return(_)
        ) {
            flags.decided = true;
        }
    }

    fn note_all_in(&mut self, actor: &str, all_in: bool) {
        if all_in {
            push_distinct(&mut self.out.all_in, actor);
        }
    }

    /// An uncalled bet handed back to its owner leaves the pot.
    fn refund(&mut self, player: &str, amount: Chips) {
        if !self.roster.iter().any(|p| p.name == player) {
            return;
        }
        *self
            .current_round_total
            .entry(player.to_string())
            .or_default() -= amount;
        self.record(player, ActionKind::Return(amount), false, false);
    }

    fn record(&mut self, actor: &str, kind: ActionKind, cbet_opportunity: bool, cbet: bool) {
        let Some(position) = self
            .roster
            .iter()
            .find(|p| p.name == actor)
            .map(|p| p.position)
        else {
            return;
        };

        let contribution = kind.contribution();
        let pot_before = self.pot;
        self.pot += contribution;
        let bet_to_pot = if contribution.is_positive() {
            contribution.ratio(pot_before)
        } else {
            0.0
        };
        let pot_odds = match kind {
            ActionKind::Call(amount) => amount.ratio(self.pot),
            _ => 0.0,
        };

        self.out.actions.push(Action {
            sequence: self.out.actions.len(),
            actor: actor.to_string(),
            kind,
            street: self.current_street,
            position,
            pot_before,
            pot_after: self.pot,
            total_bet: self.round_total(actor),
            is_voluntary: kind.is_voluntary(),
            is_aggressive: kind.is_aggressive(),
            bet_to_pot,
            pot_odds,
            cbet_opportunity,
            cbet,
        });
    }
}

fn push_distinct(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|existing| existing == name) {
        names.push(name.to_string());
    }
}

/// Runs every classified line through a fresh [`StreetMachine`].
pub fn interpret(lines: &[ClassifiedLine<'_>], roster: &[Player]) -> Interpretation {
    let mut machine = StreetMachine::new(roster);
    for line in lines {
        machine.feed(&line.kind);
    }
    machine.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Position;

    fn roster() -> Vec<Player> {
        let mut hero = Player::new("Hero", 1, Chips::from_cents(10_000));
        hero.position = Position::SmallBlind;
        let mut villain = Player::new("Villain", 2, Chips::from_cents(10_000));
        villain.position = Position::BigBlind;
        vec![hero, villain]
    }

    fn action(actor: &str, verb: Verb) -> LineKind {
        LineKind::Action {
            actor: actor.to_string(),
            verb,
        }
    }

    fn street(street: Street) -> LineKind {
        LineKind::Marker(Marker::Street {
            street,
            cards: Vec::new(),
        })
    }

    #[test]
    fn raise_increment_subtracts_the_round_total() {
        let roster = roster();
        let mut machine = StreetMachine::new(&roster);
        machine.feed(&action(
            "Hero",
            Verb::Posts {
                amount: Chips::from_cents(50),
                ante: false,
            },
        ));
        machine.feed(&action(
            "Villain",
            Verb::Posts {
                amount: Chips::from_cents(100),
                ante: false,
            },
        ));
        machine.feed(&action(
            "Hero",
            Verb::Raises {
                by: Chips::from_cents(200),
                to: Chips::from_cents(300),
                all_in: false,
            },
        ));
        let out = machine.finish();
        assert_eq!(
            out.actions[2].kind,
            ActionKind::Raise {
                added: Chips::from_cents(250),
                to: Chips::from_cents(300),
            }
        );
        assert_eq!(out.actions[2].pot_after, Chips::from_cents(400));
        assert_eq!(out.aggressors.preflop.as_deref(), Some("Hero"));
        assert!(out.preflop["Hero"].raised);
    }

    #[test]
    fn streets_never_move_backwards() {
        let roster = roster();
        let mut machine = StreetMachine::new(&roster);
        machine.feed(&street(Street::Turn));
        machine.feed(&street(Street::Flop));
        assert_eq!(machine.current_street(), Street::Turn);
    }

    #[test]
    fn cbet_goes_to_the_previous_aggressor_only() {
        let roster = roster();
        let mut machine = StreetMachine::new(&roster);
        machine.feed(&action(
            "Villain",
            Verb::Raises {
                by: Chips::from_cents(200),
                to: Chips::from_cents(300),
                all_in: false,
            },
        ));
        machine.feed(&action(
            "Hero",
            Verb::Calls {
                amount: Chips::from_cents(300),
                all_in: false,
            },
        ));
        machine.feed(&street(Street::Flop));
        machine.feed(&action(
            "Hero",
            Verb::Bets {
                amount: Chips::from_cents(400),
                all_in: false,
            },
        ));
        let out = machine.finish();
        let donk = out.actions.last().unwrap();
        assert!(!donk.cbet_opportunity);
        assert!(!donk.cbet);
        assert_eq!(out.aggressors.flop.as_deref(), Some("Hero"));
    }

    #[test]
    fn refunds_take_money_back_out() {
        let roster = roster();
        let mut machine = StreetMachine::new(&roster);
        machine.feed(&action(
            "Hero",
            Verb::Bets {
                amount: Chips::from_cents(500),
                all_in: false,
            },
        ));
        machine.feed(&LineKind::Uncalled {
            player: "Hero".into(),
            amount: Chips::from_cents(500),
        });
        assert_eq!(machine.pot(), Chips::ZERO);
    }
}
