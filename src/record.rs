use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::fees::FeeBreakdown;
use crate::game::{Action, ActionKind, Position, Street};
use crate::money::Chips;

/// One seat occupant for one hand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub name: String,
    pub seat: u32,
    pub starting_stack: Chips,
    pub position: Position,
    /// Empty unless both cards were dealt face up to the log writer.
    pub hole_cards: Vec<Card>,
    pub is_subject: bool,
    pub vpip_eligible: bool,
    pub pfr_eligible: bool,
    /// Called, bet or raised voluntarily before the flop.
    pub vpip: bool,
    pub pfr: bool,
    pub preflop_called: bool,
    pub showdown_reached: bool,
    pub showed_cards: bool,
    pub mucked_cards: bool,
    pub is_all_in: bool,
    pub final_hand: String,
}

impl Player {
    pub fn new(name: impl Into<String>, seat: u32, starting_stack: Chips) -> Self {
        Self {
            name: name.into(),
            seat,
            starting_stack,
            position: Position::Button,
            hole_cards: Vec::new(),
            is_subject: false,
            vpip_eligible: false,
            pfr_eligible: false,
            vpip: false,
            pfr: false,
            preflop_called: false,
            showdown_reached: false,
            showed_cards: false,
            mucked_cards: false,
            is_all_in: false,
            final_hand: String::new(),
        }
    }

    pub fn stack_in_big_blinds(&self, big_blind: Chips) -> f64 {
        self.starting_stack.ratio(big_blind)
    }
}

/// Community cards partitioned by street.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    pub flop: Vec<Card>,
    pub turn: Option<Card>,
    pub river: Option<Card>,
}

impl Board {
    pub fn cards(&self) -> Vec<Card> {
        self.flop
            .iter()
            .copied()
            .chain(self.turn)
            .chain(self.river)
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShowdownEntry {
    pub player: String,
    pub cards: Vec<Card>,
    pub description: String,
}

/// Last player to bet or raise on each betting street.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreetAggressors {
    pub preflop: Option<String>,
    pub flop: Option<String>,
    pub turn: Option<String>,
    pub river: Option<String>,
}

impl StreetAggressors {
    pub fn get(&self, street: Street) -> Option<&str> {
        match street {
            Street::Preflop => self.preflop.as_deref(),
            Street::Flop => self.flop.as_deref(),
            Street::Turn => self.turn.as_deref(),
            Street::River => self.river.as_deref(),
            Street::Showdown => None,
        }
    }

    pub fn set(&mut self, street: Street, player: &str) {
        let slot = match street {
            Street::Preflop => &mut self.preflop,
            Street::Flop => &mut self.flop,
            Street::Turn => &mut self.turn,
            Street::River => &mut self.river,
            Street::Showdown => return,
        };
        *slot = Some(player.to_string());
    }
}

/// One parsed hand. Built once by the parser and never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandRecord {
    pub hand_id: String,
    pub site: String,
    pub game: String,
    pub variant: String,
    pub is_tournament: bool,
    pub tournament_id: String,
    pub table_name: String,
    pub timestamp: Option<NaiveDateTime>,
    pub stakes: String,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub ante: Chips,
    pub button_seat: u32,
    pub number_of_players: usize,
    pub players: Vec<Player>,
    pub actions: Vec<Action>,
    pub board: Board,
    pub total_pot: Chips,
    /// Sum of every fee category.
    pub rake: Chips,
    pub fees: FeeBreakdown,
    pub winner: String,
    pub showdown: Vec<ShowdownEntry>,
    pub went_to_showdown: bool,
    pub aggressors: StreetAggressors,
    pub final_street: Street,
}

impl HandRecord {
    /// Stand-in for a hand that could not be assembled.
    pub fn placeholder() -> Self {
        Self {
            hand_id: String::new(),
            site: crate::header::UNKNOWN.to_string(),
            game: crate::header::UNKNOWN.to_string(),
            variant: crate::header::UNKNOWN.to_string(),
            is_tournament: false,
            tournament_id: String::new(),
            table_name: String::new(),
            timestamp: Some(chrono::Local::now().naive_local()),
            stakes: String::new(),
            small_blind: Chips::ZERO,
            big_blind: Chips::ZERO,
            ante: Chips::ZERO,
            button_seat: 0,
            number_of_players: 0,
            players: Vec::new(),
            actions: Vec::new(),
            board: Board::default(),
            total_pot: Chips::ZERO,
            rake: Chips::ZERO,
            fees: FeeBreakdown::default(),
            winner: String::new(),
            showdown: Vec::new(),
            went_to_showdown: false,
            aggressors: StreetAggressors::default(),
            final_street: Street::Preflop,
        }
    }

    pub fn player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.name == name)
    }

    pub fn subject(&self) -> Option<&Player> {
        self.players.iter().find(|player| player.is_subject)
    }

    pub fn actions_by<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Action> + 'a {
        self.actions.iter().filter(move |action| action.actor == name)
    }

    pub fn reached(&self, street: Street) -> bool {
        self.final_street >= street
    }

    /// Pot after the last money-moving action; zero for a hand without actions.
    pub fn final_pot(&self) -> Chips {
        self.actions
            .iter()
            .rev()
            .find(|action| !matches!(action.kind, ActionKind::Collect(_)))
            .map_or(Chips::ZERO, |action| action.pot_after)
    }

    pub fn showdown_players(&self) -> Vec<&str> {
        self.showdown
            .iter()
            .map(|entry| entry.player.as_str())
            .collect()
    }

    pub fn folded_on(&self, name: &str) -> Option<Street> {
        self.actions_by(name)
            .find(|action| action.kind == ActionKind::Fold)
            .map(|action| action.street)
    }
}
