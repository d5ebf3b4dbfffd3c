use serde::{Deserialize, Serialize};

use crate::cards::hand_category;
use crate::game::{ActionKind, Position, Street};
use crate::money::Chips;
use crate::record::HandRecord;

/// How one hand went for one seated player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerOutcome {
    pub player: String,
    pub position: Position,
    pub hand_category: String,
    pub total_contributed: Chips,
    /// Pot collections plus uncalled bets handed back.
    pub total_collected: Chips,
    pub total_refunded: Chips,
    pub net_profit: Chips,
    pub rake_amount: Chips,
    pub net_profit_before_rake: Chips,
    pub vpip_eligible: bool,
    pub vpip: bool,
    pub pfr: bool,
    pub preflop_called: bool,
    pub three_bet_opportunity: bool,
    pub three_bet: bool,
    pub saw_flop: bool,
    pub went_to_showdown: bool,
    pub won_at_showdown: bool,
    pub won_when_saw_flop: bool,
    pub cbet_flop_opportunity: bool,
    pub cbet_flop: bool,
    pub cbet_turn_opportunity: bool,
    pub cbet_turn: bool,
    pub cbet_river_opportunity: bool,
    pub cbet_river: bool,
    pub preflop_actions: u32,
    pub flop_actions: u32,
    pub turn_actions: u32,
    pub river_actions: u32,
    /// Postflop bets and raises.
    pub postflop_aggressive: u32,
    pub postflop_calls: u32,
    pub postflop_checks_folds: u32,
}

impl PlayerOutcome {
    pub fn for_subject(hand: &HandRecord) -> Option<Self> {
        let subject = hand.subject()?;
        Self::for_player(hand, &subject.name)
    }

    pub fn for_player(hand: &HandRecord, name: &str) -> Option<Self> {
        let player = hand.player(name)?;

        let mut contributed = Chips::ZERO;
        let mut collected = Chips::ZERO;
        let mut refunded = Chips::ZERO;
        let mut street_actions = [0u32; 4];
        let mut postflop_aggressive = 0;
        let mut postflop_calls = 0;
        let mut postflop_checks_folds = 0;

        for action in hand.actions_by(name) {
            match action.kind {
                ActionKind::Collect(amount) => {
                    collected += amount;
                    continue;
                }
                ActionKind::Return(amount) => {
                    refunded += amount;
                    continue;
                }
                _ => contributed += action.contribution(),
            }
            if let Some(slot) = street_slot(action.street) {
                street_actions[slot] += 1;
            }
            if action.street.is_postflop() {
                match action.kind {
                    ActionKind::Bet(_) | ActionKind::Raise { .. } | ActionKind::AllIn(_) => {
                        postflop_aggressive += 1
                    }
                    ActionKind::Call(_) => postflop_calls += 1,
                    ActionKind::Check | ActionKind::Fold => postflop_checks_folds += 1,
                    _ => {}
                }
            }
        }

        let total_collected = collected + refunded;
        let net_profit = total_collected - contributed;
        // Rake comes out of the winner's share only.
        let rake_amount = if total_collected.is_positive() {
            hand.rake
        } else {
            Chips::ZERO
        };

        let saw_flop = player.vpip_eligible
            && hand.reached(Street::Flop)
            && hand.folded_on(name) != Some(Street::Preflop);
        let went_to_showdown = player.showdown_reached;
        // Only pot collections count; an uncalled bet handed back is not a win.
        let won_at_showdown =
            went_to_showdown && distinct_showers(hand) >= 2 && collected.is_positive();
        let (three_bet_opportunity, three_bet) = three_bet(hand, name);
        let cbet = |street: Street| cbet_on(hand, name, street);
        let (cbet_flop_opportunity, cbet_flop) = cbet(Street::Flop);
        let (cbet_turn_opportunity, cbet_turn) = cbet(Street::Turn);
        let (cbet_river_opportunity, cbet_river) = cbet(Street::River);

        Some(Self {
            player: name.to_string(),
            position: player.position,
            hand_category: hand_category(&player.hole_cards),
            total_contributed: contributed,
            total_collected,
            total_refunded: refunded,
            net_profit,
            rake_amount,
            net_profit_before_rake: net_profit + rake_amount,
            vpip_eligible: player.vpip_eligible,
            vpip: player.vpip,
            pfr: player.pfr,
            preflop_called: player.preflop_called,
            three_bet_opportunity,
            three_bet,
            saw_flop,
            went_to_showdown,
            won_at_showdown,
            won_when_saw_flop: saw_flop && net_profit.is_positive(),
            cbet_flop_opportunity,
            cbet_flop,
            cbet_turn_opportunity,
            cbet_turn,
            cbet_river_opportunity,
            cbet_river,
            preflop_actions: street_actions[0],
            flop_actions: street_actions[1],
            turn_actions: street_actions[2],
            river_actions: street_actions[3],
            postflop_aggressive,
            postflop_calls,
            postflop_checks_folds,
        })
    }
}

fn street_slot(street: Street) -> Option<usize> {
    Street::BETTING.iter().position(|s| *s == street)
}

fn distinct_showers(hand: &HandRecord) -> usize {
    hand.players.iter().filter(|p| p.showed_cards).count()
}

/// Opportunity when the player acts preflop facing exactly one raise;
/// realized when that decision is itself a raise.
fn three_bet(hand: &HandRecord, name: &str) -> (bool, bool) {
    let mut raises = 0;
    let mut opportunity = false;
    for action in hand.actions.iter().filter(|a| a.street == Street::Preflop) {
        let raising = matches!(action.kind, ActionKind::Raise { .. } | ActionKind::AllIn(_));
        let decision = !matches!(
            action.kind,
            ActionKind::Post(_) | ActionKind::Collect(_) | ActionKind::Return(_)
        );
        if action.actor == name && decision && raises == 1 {
            opportunity = true;
            if raising {
                return (true, true);
            }
        }
        if raising {
            raises += 1;
        }
    }
    (opportunity, false)
}

/// The option belongs to the previous street's last aggressor once the
/// street is dealt; it is taken by making the street's first bet.
fn cbet_on(hand: &HandRecord, name: &str, street: Street) -> (bool, bool) {
    let Some(previous) = street.previous() else {
        return (false, false);
    };
    let opportunity = hand.reached(street) && hand.aggressors.get(previous) == Some(name);
    let realized = opportunity
        && hand
            .actions_by(name)
            .any(|action| action.street == street && action.cbet);
    (opportunity, realized)
}
