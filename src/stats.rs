//! Per-player running statistics over many hands.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::game::Position;
use crate::money::Chips;
use crate::outcome::PlayerOutcome;
use crate::record::{HandRecord, Player};

/// `numerator / denominator * 100`, or 0 for an empty denominator.
pub fn percentage(numerator: u32, denominator: u32) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        f64::from(numerator) / f64::from(denominator) * 100.0
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tally {
    pub hits: u32,
    pub chances: u32,
}

impl Tally {
    pub fn record(&mut self, hit: bool) {
        self.chances += 1;
        if hit {
            self.hits += 1;
        }
    }

    pub fn percent(&self) -> f64 {
        percentage(self.hits, self.chances)
    }

    fn merge(&mut self, other: Tally) {
        self.hits += other.hits;
        self.chances += other.chances;
    }
}

/// Hand, VPIP and PFR counts for one slice of a player's hands.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Bucket {
    pub hands: u32,
    pub vpip: Tally,
    pub pfr: Tally,
}

impl Bucket {
    fn record(&mut self, outcome: &PlayerOutcome) {
        self.hands += 1;
        if outcome.vpip_eligible {
            self.vpip.record(outcome.vpip);
            self.pfr.record(outcome.pfr);
        }
    }

    fn merge(&mut self, other: Bucket) {
        self.hands += other.hands;
        self.vpip.merge(other.vpip);
        self.pfr.merge(other.pfr);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackDepth {
    /// 20 big blinds or fewer.
    Shallow,
    /// Over 20, up to 50 big blinds.
    Mid,
    /// Over 100 big blinds.
    Deep,
}

impl StackDepth {
    /// Stacks between 50 and 100 big blinds fall in no bucket.
    pub fn classify(stack_in_bb: f64) -> Option<Self> {
        if stack_in_bb <= 20.0 {
            Some(StackDepth::Shallow)
        } else if stack_in_bb <= 50.0 {
            Some(StackDepth::Mid)
        } else if stack_in_bb > 100.0 {
            Some(StackDepth::Deep)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StackDepthBuckets {
    pub shallow: Bucket,
    pub mid: Bucket,
    pub deep: Bucket,
}

impl StackDepthBuckets {
    fn slot(&mut self, depth: StackDepth) -> &mut Bucket {
        match depth {
            StackDepth::Shallow => &mut self.shallow,
            StackDepth::Mid => &mut self.mid,
            StackDepth::Deep => &mut self.deep,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerStatsAccumulator {
    pub player: String,
    pub hands_played: u32,
    pub vpip: Tally,
    pub pfr: Tally,
    pub three_bet: Tally,
    pub cbet_flop: Tally,
    pub cbet_turn: Tally,
    pub cbet_river: Tally,
    pub saw_flop: u32,
    pub went_to_showdown: u32,
    pub won_at_showdown: u32,
    pub postflop_aggressive: u32,
    pub postflop_calls: u32,
    pub postflop_checks_folds: u32,
    pub net_profit: Chips,
    pub net_profit_before_rake: Chips,
    pub rake_paid: Chips,
    pub net_profit_bb: f64,
    /// Indexed by [`Position::index`].
    pub positions: [Bucket; 6],
    pub stack_depth: StackDepthBuckets,
}

impl PlayerStatsAccumulator {
    pub fn new(player: impl Into<String>) -> Self {
        Self {
            player: player.into(),
            hands_played: 0,
            vpip: Tally::default(),
            pfr: Tally::default(),
            three_bet: Tally::default(),
            cbet_flop: Tally::default(),
            cbet_turn: Tally::default(),
            cbet_river: Tally::default(),
            saw_flop: 0,
            went_to_showdown: 0,
            won_at_showdown: 0,
            postflop_aggressive: 0,
            postflop_calls: 0,
            postflop_checks_folds: 0,
            net_profit: Chips::ZERO,
            net_profit_before_rake: Chips::ZERO,
            rake_paid: Chips::ZERO,
            net_profit_bb: 0.0,
            positions: [Bucket::default(); 6],
            stack_depth: StackDepthBuckets::default(),
        }
    }

    /// Folds one hand into the running totals.
    pub fn record(&mut self, hand: &HandRecord, player: &Player) {
        let Some(outcome) = PlayerOutcome::for_player(hand, &player.name) else {
            return;
        };

        self.hands_played += 1;
        if outcome.vpip_eligible {
            self.vpip.record(outcome.vpip);
            self.pfr.record(outcome.pfr);
        }
        if outcome.three_bet_opportunity {
            self.three_bet.record(outcome.three_bet);
        }
        if outcome.cbet_flop_opportunity {
            self.cbet_flop.record(outcome.cbet_flop);
        }
        if outcome.cbet_turn_opportunity {
            self.cbet_turn.record(outcome.cbet_turn);
        }
        if outcome.cbet_river_opportunity {
            self.cbet_river.record(outcome.cbet_river);
        }
        self.saw_flop += u32::from(outcome.saw_flop);
        self.went_to_showdown += u32::from(outcome.went_to_showdown);
        self.won_at_showdown += u32::from(outcome.won_at_showdown);
        self.postflop_aggressive += outcome.postflop_aggressive;
        self.postflop_calls += outcome.postflop_calls;
        self.postflop_checks_folds += outcome.postflop_checks_folds;

        self.net_profit += outcome.net_profit;
        self.net_profit_before_rake += outcome.net_profit_before_rake;
        self.rake_paid += outcome.rake_amount;
        self.net_profit_bb += outcome.net_profit.ratio(hand.big_blind);

        self.positions[outcome.position.index()].record(&outcome);
        if hand.big_blind.is_positive() {
            if let Some(depth) = StackDepth::classify(player.stack_in_big_blinds(hand.big_blind)) {
                self.stack_depth.slot(depth).record(&outcome);
            }
        }
    }

    pub fn merge(&mut self, other: &PlayerStatsAccumulator) {
        self.hands_played += other.hands_played;
        self.vpip.merge(other.vpip);
        self.pfr.merge(other.pfr);
        self.three_bet.merge(other.three_bet);
        self.cbet_flop.merge(other.cbet_flop);
        self.cbet_turn.merge(other.cbet_turn);
        self.cbet_river.merge(other.cbet_river);
        self.saw_flop += other.saw_flop;
        self.went_to_showdown += other.went_to_showdown;
        self.won_at_showdown += other.won_at_showdown;
        self.postflop_aggressive += other.postflop_aggressive;
        self.postflop_calls += other.postflop_calls;
        self.postflop_checks_folds += other.postflop_checks_folds;
        self.net_profit += other.net_profit;
        self.net_profit_before_rake += other.net_profit_before_rake;
        self.rake_paid += other.rake_paid;
        self.net_profit_bb += other.net_profit_bb;
        for (mine, theirs) in self.positions.iter_mut().zip(other.positions) {
            mine.merge(theirs);
        }
        self.stack_depth.shallow.merge(other.stack_depth.shallow);
        self.stack_depth.mid.merge(other.stack_depth.mid);
        self.stack_depth.deep.merge(other.stack_depth.deep);
    }

    pub fn vpip_pct(&self) -> f64 {
        self.vpip.percent()
    }

    pub fn pfr_pct(&self) -> f64 {
        self.pfr.percent()
    }

    pub fn three_bet_pct(&self) -> f64 {
        self.three_bet.percent()
    }

    pub fn cbet_flop_pct(&self) -> f64 {
        self.cbet_flop.percent()
    }

    pub fn cbet_turn_pct(&self) -> f64 {
        self.cbet_turn.percent()
    }

    pub fn cbet_river_pct(&self) -> f64 {
        self.cbet_river.percent()
    }

    /// Continuation bets over opportunities, all streets together.
    pub fn cbet_pct(&self) -> f64 {
        let mut all = self.cbet_flop;
        all.merge(self.cbet_turn);
        all.merge(self.cbet_river);
        all.percent()
    }

    pub fn wtsd_pct(&self) -> f64 {
        percentage(self.went_to_showdown, self.hands_played)
    }

    pub fn wsd_pct(&self) -> f64 {
        percentage(self.won_at_showdown, self.went_to_showdown)
    }

    pub fn vpip_pfr_gap(&self) -> f64 {
        self.vpip_pct() - self.pfr_pct()
    }

    /// Postflop bets and raises per call; the raw count when there are no calls.
    pub fn aggression_factor(&self) -> f64 {
        if self.postflop_calls == 0 {
            f64::from(self.postflop_aggressive)
        } else {
            f64::from(self.postflop_aggressive) / f64::from(self.postflop_calls)
        }
    }

    pub fn aggression_frequency(&self) -> f64 {
        percentage(
            self.postflop_aggressive,
            self.postflop_aggressive + self.postflop_calls + self.postflop_checks_folds,
        )
    }

    pub fn bb_per_100(&self) -> f64 {
        if self.hands_played == 0 {
            0.0
        } else {
            self.net_profit_bb / f64::from(self.hands_played) * 100.0
        }
    }

    pub fn position(&self, position: Position) -> &Bucket {
        &self.positions[position.index()]
    }
}

/// Accumulators keyed by player name, iterated alphabetically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsAggregator {
    players: BTreeMap<String, PlayerStatsAccumulator>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_hands<'a>(hands: impl IntoIterator<Item = &'a HandRecord>) -> Self {
        let mut aggregator = Self::new();
        for hand in hands {
            aggregator.ingest(hand);
        }
        aggregator
    }

    /// Shards the hands across the rayon pool and merges the shard totals.
    pub fn from_hands_parallel(hands: &[HandRecord]) -> Self {
        hands
            .par_iter()
            .fold(Self::new, |mut shard, hand| {
                shard.ingest(hand);
                shard
            })
            .reduce(Self::new, |mut left, right| {
                left.merge(&right);
                left
            })
    }

    pub fn ingest(&mut self, hand: &HandRecord) {
        for player in &hand.players {
            self.players
                .entry(player.name.clone())
                .or_insert_with(|| PlayerStatsAccumulator::new(&player.name))
                .record(hand, player);
        }
    }

    pub fn merge(&mut self, other: &StatsAggregator) {
        for (name, stats) in &other.players {
            match self.players.get_mut(name) {
                Some(mine) => mine.merge(stats),
                None => {
                    self.players.insert(name.clone(), stats.clone());
                }
            }
        }
    }

    pub fn get(&self, player: &str) -> Option<&PlayerStatsAccumulator> {
        self.players.get(player)
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerStatsAccumulator> {
        self.players.values()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

/// Aggregator that many threads can feed at once. Each player gets one
/// accumulator behind its own lock, inserted the first time the name is seen.
#[derive(Debug, Clone, Default)]
pub struct SharedAggregator {
    players: Arc<RwLock<HashMap<String, Arc<Mutex<PlayerStatsAccumulator>>>>>,
}

impl SharedAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn accumulator(&self, player: &str) -> Arc<Mutex<PlayerStatsAccumulator>> {
        if let Some(existing) = self.players.read().get(player) {
            return existing.clone();
        }
        self.players
            .write()
            .entry(player.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(PlayerStatsAccumulator::new(player))))
            .clone()
    }

    pub fn ingest(&self, hand: &HandRecord) {
        for player in &hand.players {
            self.accumulator(&player.name).lock().record(hand, player);
        }
    }

    pub fn snapshot(&self) -> StatsAggregator {
        let players = self
            .players
            .read()
            .iter()
            .map(|(name, stats)| (name.clone(), stats.lock().clone()))
            .collect();
        StatsAggregator { players }
    }
}
