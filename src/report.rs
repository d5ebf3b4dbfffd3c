//! Flat row shapes for the players, hands and actions tables, the subject
//! ledger and the summary metrics.

use std::io;

use chrono::NaiveDateTime;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::game::{Position, Street};
use crate::leaks;
use crate::money::Chips;
use crate::outcome::PlayerOutcome;
use crate::record::HandRecord;
use crate::stats::{PlayerStatsAccumulator, StatsAggregator, percentage};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn card_list(cards: &[Card]) -> String {
    cards.iter().join(" ")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerRow {
    pub player: String,
    pub hands_played: u32,
    pub vpip: f64,
    pub pfr: f64,
    pub vpip_pfr_gap: f64,
    pub three_bet: f64,
    pub cbet: f64,
    pub cbet_flop: f64,
    pub cbet_turn: f64,
    pub cbet_river: f64,
    pub saw_flop: u32,
    pub wtsd: f64,
    pub wsd: f64,
    pub aggression_factor: f64,
    pub aggression_frequency: f64,
    pub net_profit: Chips,
    pub net_profit_before_rake: Chips,
    pub rake_paid: Chips,
    pub bb_per_100: f64,
    pub leaks: String,
}

impl PlayerRow {
    pub fn from_stats(stats: &PlayerStatsAccumulator) -> Self {
        Self {
            player: stats.player.clone(),
            hands_played: stats.hands_played,
            vpip: round2(stats.vpip_pct()),
            pfr: round2(stats.pfr_pct()),
            vpip_pfr_gap: round2(stats.vpip_pfr_gap()),
            three_bet: round2(stats.three_bet_pct()),
            cbet: round2(stats.cbet_pct()),
            cbet_flop: round2(stats.cbet_flop_pct()),
            cbet_turn: round2(stats.cbet_turn_pct()),
            cbet_river: round2(stats.cbet_river_pct()),
            saw_flop: stats.saw_flop,
            wtsd: round2(stats.wtsd_pct()),
            wsd: round2(stats.wsd_pct()),
            aggression_factor: round2(stats.aggression_factor()),
            aggression_frequency: round2(stats.aggression_frequency()),
            net_profit: stats.net_profit,
            net_profit_before_rake: stats.net_profit_before_rake,
            rake_paid: stats.rake_paid,
            bb_per_100: round2(stats.bb_per_100()),
            leaks: leaks::detect(stats).iter().map(|leak| leak.code()).join(";"),
        }
    }
}

pub fn player_rows(aggregator: &StatsAggregator) -> Vec<PlayerRow> {
    aggregator.players().map(PlayerRow::from_stats).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandRow {
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
    pub board: String,
    pub flop: String,
    pub turn: String,
    pub river: String,
    pub total_pot: Chips,
    pub rake: Chips,
    pub winner: String,
    pub showdown_players: String,
    pub went_to_showdown: bool,
    pub final_street: Street,
}

impl HandRow {
    pub fn from_hand(hand: &HandRecord) -> Self {
        Self {
            hand_id: hand.hand_id.clone(),
            site: hand.site.clone(),
            game: hand.game.clone(),
            variant: hand.variant.clone(),
            is_tournament: hand.is_tournament,
            tournament_id: hand.tournament_id.clone(),
            table_name: hand.table_name.clone(),
            timestamp: hand.timestamp,
            stakes: hand.stakes.clone(),
            small_blind: hand.small_blind,
            big_blind: hand.big_blind,
            ante: hand.ante,
            button_seat: hand.button_seat,
            number_of_players: hand.number_of_players,
            board: card_list(&hand.board.cards()),
            flop: card_list(&hand.board.flop),
            turn: hand.board.turn.map(|card| card.to_string()).unwrap_or_default(),
            river: hand.board.river.map(|card| card.to_string()).unwrap_or_default(),
            total_pot: hand.total_pot,
            rake: hand.rake,
            winner: hand.winner.clone(),
            showdown_players: hand.showdown_players().join(","),
            went_to_showdown: hand.went_to_showdown,
            final_street: hand.final_street,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActionRow {
    pub hand_id: String,
    pub timestamp: Option<NaiveDateTime>,
    pub sequence: usize,
    pub player: String,
    pub action_type: String,
    pub amount: Chips,
    pub total_bet: Chips,
    pub street: Street,
    pub position: Position,
    pub pot_before: Chips,
    pub pot_after: Chips,
    pub is_voluntary: bool,
    pub is_aggressive: bool,
    pub bet_to_pot: f64,
    pub pot_odds: f64,
    pub cbet_opportunity: bool,
    pub cbet: bool,
}

pub fn action_rows(hands: &[HandRecord]) -> Vec<ActionRow> {
    hands
        .iter()
        .flat_map(|hand| {
            hand.actions.iter().map(move |action| ActionRow {
                hand_id: hand.hand_id.clone(),
                timestamp: hand.timestamp,
                sequence: action.sequence,
                player: action.actor.clone(),
                action_type: action.kind.label().to_string(),
                amount: action.kind.amount(),
                total_bet: action.total_bet,
                street: action.street,
                position: action.position,
                pot_before: action.pot_before,
                pot_after: action.pot_after,
                is_voluntary: action.is_voluntary,
                is_aggressive: action.is_aggressive,
                bet_to_pot: round2(action.bet_to_pot),
                pot_odds: round2(action.pot_odds),
                cbet_opportunity: action.cbet_opportunity,
                cbet: action.cbet,
            })
        })
        .collect()
}

/// One hand of the analyzed subject with running totals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LedgerRow {
    pub hand_number: usize,
    pub hand_id: String,
    pub timestamp: Option<NaiveDateTime>,
    pub stakes: String,
    pub position: Position,
    pub hole_cards: String,
    pub hand_category: String,
    pub total_contributed: Chips,
    pub total_collected: Chips,
    pub net_profit: Chips,
    pub rake_amount: Chips,
    pub net_profit_before_rake: Chips,
    pub vpip: bool,
    pub pfr: bool,
    pub saw_flop: bool,
    pub went_to_showdown: bool,
    pub won_at_showdown: bool,
    pub cbet_flop_opportunity: bool,
    pub cbet_flop: bool,
    pub running_profit: Chips,
    pub running_profit_before_rake: Chips,
    pub running_rake: Chips,
}

/// Subject rows in timestamp order; hands without the subject are skipped.
pub fn subject_ledger(hands: &[HandRecord]) -> Vec<LedgerRow> {
    let mut profit = Chips::ZERO;
    let mut before_rake = Chips::ZERO;
    let mut rake = Chips::ZERO;

    hands
        .iter()
        .sorted_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.hand_id.cmp(&b.hand_id))
        })
        .filter_map(|hand| {
            let subject = hand.subject()?;
            PlayerOutcome::for_player(hand, &subject.name).map(|outcome| (hand, subject, outcome))
        })
        .enumerate()
        .map(|(idx, (hand, subject, outcome))| {
            profit += outcome.net_profit;
            before_rake += outcome.net_profit_before_rake;
            rake += outcome.rake_amount;
            LedgerRow {
                hand_number: idx + 1,
                hand_id: hand.hand_id.clone(),
                timestamp: hand.timestamp,
                stakes: hand.stakes.clone(),
                position: outcome.position,
                hole_cards: card_list(&subject.hole_cards),
                hand_category: outcome.hand_category,
                total_contributed: outcome.total_contributed,
                total_collected: outcome.total_collected,
                net_profit: outcome.net_profit,
                rake_amount: outcome.rake_amount,
                net_profit_before_rake: outcome.net_profit_before_rake,
                vpip: outcome.vpip,
                pfr: outcome.pfr,
                saw_flop: outcome.saw_flop,
                went_to_showdown: outcome.went_to_showdown,
                won_at_showdown: outcome.won_at_showdown,
                cbet_flop_opportunity: outcome.cbet_flop_opportunity,
                cbet_flop: outcome.cbet_flop,
                running_profit: profit,
                running_profit_before_rake: before_rake,
                running_rake: rake,
            }
        })
        .collect()
}

/// Headline numbers for the analyzed subject over a set of hands.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KeyMetrics {
    pub hands: usize,
    pub total_profit: Chips,
    pub total_profit_before_rake: Chips,
    pub total_rake: Chips,
    pub average_profit: f64,
    pub average_rake: f64,
    pub rake_pct_of_pot: f64,
    pub vpip_rate: f64,
    pub preflop_raise_rate: f64,
    pub preflop_call_rate: f64,
    pub flop_rate: f64,
    pub flop_win_rate: f64,
    pub showdown_rate: f64,
    pub wsd_rate: f64,
    pub cbet_flop_opportunities: u32,
    pub cbet_flop_made: u32,
    pub cbet_turn_opportunities: u32,
    pub cbet_turn_made: u32,
    pub cbet_river_opportunities: u32,
    pub cbet_river_made: u32,
}

impl KeyMetrics {
    pub fn from_hands(hands: &[HandRecord]) -> Self {
        let outcomes: Vec<(&HandRecord, PlayerOutcome)> = hands
            .iter()
            .filter_map(|hand| PlayerOutcome::for_subject(hand).map(|outcome| (hand, outcome)))
            .collect();
        if outcomes.is_empty() {
            return Self::default();
        }

        let count = |pred: fn(&PlayerOutcome) -> bool| -> u32 {
            outcomes.iter().filter(|(_, outcome)| pred(outcome)).count() as u32
        };
        let hands_played = outcomes.len() as u32;
        let total_profit: Chips = outcomes.iter().map(|(_, o)| o.net_profit).sum();
        let total_rake: Chips = outcomes.iter().map(|(_, o)| o.rake_amount).sum();
        let total_pot: Chips = outcomes.iter().map(|(hand, _)| hand.total_pot).sum();
        let flops = count(|o| o.saw_flop);
        let showdowns = count(|o| o.went_to_showdown);

        Self {
            hands: outcomes.len(),
            total_profit,
            total_profit_before_rake: outcomes.iter().map(|(_, o)| o.net_profit_before_rake).sum(),
            total_rake,
            average_profit: round2(total_profit.as_f64() / f64::from(hands_played)),
            average_rake: round2(total_rake.as_f64() / f64::from(hands_played)),
            rake_pct_of_pot: round2(total_rake.ratio(total_pot) * 100.0),
            vpip_rate: round2(percentage(count(|o| o.vpip), hands_played)),
            preflop_raise_rate: round2(percentage(count(|o| o.pfr), hands_played)),
            preflop_call_rate: round2(percentage(count(|o| o.preflop_called), hands_played)),
            flop_rate: round2(percentage(flops, hands_played)),
            flop_win_rate: round2(percentage(count(|o| o.won_when_saw_flop), flops)),
            showdown_rate: round2(percentage(showdowns, flops)),
            wsd_rate: round2(percentage(count(|o| o.won_at_showdown), showdowns)),
            cbet_flop_opportunities: count(|o| o.cbet_flop_opportunity),
            cbet_flop_made: count(|o| o.cbet_flop),
            cbet_turn_opportunities: count(|o| o.cbet_turn_opportunity),
            cbet_turn_made: count(|o| o.cbet_turn),
            cbet_river_opportunities: count(|o| o.cbet_river_opportunity),
            cbet_river_made: count(|o| o.cbet_river),
        }
    }
}

/// One-line heads-up display: `name  VPIP/PFR/3B  AF  WTSD/W$SD  (n hands)`.
pub fn hud_line(stats: &PlayerStatsAccumulator) -> String {
    format!(
        "{}  {:.0}/{:.0}/{:.0}  AF {:.1}  {:.0}/{:.0}  ({} hands)",
        stats.player,
        stats.vpip_pct(),
        stats.pfr_pct(),
        stats.three_bet_pct(),
        stats.aggression_factor(),
        stats.wtsd_pct(),
        stats.wsd_pct(),
        stats.hands_played
    )
}

/// Hands, VPIP and PFR per seat position, in button-first order.
pub fn positional_report(stats: &PlayerStatsAccumulator) -> Vec<(Position, u32, f64, f64)> {
    Position::ROTATION
        .iter()
        .map(|&position| {
            let bucket = stats.position(position);
            (
                position,
                bucket.hands,
                round2(bucket.vpip.percent()),
                round2(bucket.pfr.percent()),
            )
        })
        .collect()
}

pub fn write_csv<S: Serialize, W: io::Write>(rows: &[S], writer: W) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}
