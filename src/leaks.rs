use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::stats::PlayerStatsAccumulator;

/// A statistic outside its healthy band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "leak", rename_all = "snake_case")]
pub enum Leak {
    VpipTooHigh { vpip: f64 },
    VpipTooLow { vpip: f64 },
    PfrTooHigh { pfr: f64, vpip: f64 },
    PassivePreflop { pfr: f64, vpip: f64 },
    ThreeBetTooHigh { three_bet: f64 },
    ThreeBetTooLow { three_bet: f64 },
    CbetTooHigh { cbet: f64 },
    CbetTooLow { cbet: f64 },
    TooAggressive { factor: f64 },
    TooPassive { factor: f64 },
}

impl Leak {
    pub fn code(&self) -> &'static str {
        match self {
            Leak::VpipTooHigh { .. } => "vpip_too_high",
            Leak::VpipTooLow { .. } => "vpip_too_low",
            Leak::PfrTooHigh { .. } => "pfr_too_high",
            Leak::PassivePreflop { .. } => "passive_preflop",
            Leak::ThreeBetTooHigh { .. } => "three_bet_too_high",
            Leak::ThreeBetTooLow { .. } => "three_bet_too_low",
            Leak::CbetTooHigh { .. } => "cbet_too_high",
            Leak::CbetTooLow { .. } => "cbet_too_low",
            Leak::TooAggressive { .. } => "too_aggressive",
            Leak::TooPassive { .. } => "too_passive",
        }
    }
}

impl Display for Leak {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Leak::VpipTooHigh { vpip } => write!(f, "VPIP too high ({vpip:.1}%), playing too many hands"),
            Leak::VpipTooLow { vpip } => write!(f, "VPIP too low ({vpip:.1}%), playing too tight"),
            Leak::PfrTooHigh { pfr, vpip } => {
                write!(f, "PFR {pfr:.1}% is close to VPIP {vpip:.1}%, rarely flatting")
            }
            Leak::PassivePreflop { pfr, vpip } => {
                write!(f, "PFR {pfr:.1}% is far below VPIP {vpip:.1}%, too much calling preflop")
            }
            Leak::ThreeBetTooHigh { three_bet } => write!(f, "3-bet too high ({three_bet:.1}%)"),
            Leak::ThreeBetTooLow { three_bet } => write!(f, "3-bet too low ({three_bet:.1}%)"),
            Leak::CbetTooHigh { cbet } => write!(f, "flop c-bet too high ({cbet:.1}%)"),
            Leak::CbetTooLow { cbet } => write!(f, "flop c-bet too low ({cbet:.1}%)"),
            Leak::TooAggressive { factor } => write!(f, "aggression factor too high ({factor:.2})"),
            Leak::TooPassive { factor } => write!(f, "aggression factor too low ({factor:.2})"),
        }
    }
}

/// Checks accumulated percentages against fixed bands. Stats whose
/// denominator is still zero are skipped.
pub fn detect(stats: &PlayerStatsAccumulator) -> Vec<Leak> {
    let mut leaks = Vec::new();

    if stats.vpip.chances > 0 {
        let vpip = stats.vpip_pct();
        let pfr = stats.pfr_pct();
        if vpip > 25.0 {
            leaks.push(Leak::VpipTooHigh { vpip });
        } else if vpip < 15.0 {
            leaks.push(Leak::VpipTooLow { vpip });
        }
        if vpip > 0.0 {
            if pfr > vpip * 0.8 {
                leaks.push(Leak::PfrTooHigh { pfr, vpip });
            } else if pfr < vpip * 0.6 {
                leaks.push(Leak::PassivePreflop { pfr, vpip });
            }
        }
    }

    if stats.three_bet.chances > 0 {
        let three_bet = stats.three_bet_pct();
        if three_bet > 8.0 {
            leaks.push(Leak::ThreeBetTooHigh { three_bet });
        } else if three_bet < 3.0 {
            leaks.push(Leak::ThreeBetTooLow { three_bet });
        }
    }

    if stats.cbet_flop.chances > 0 {
        let cbet = stats.cbet_flop_pct();
        if cbet > 80.0 {
            leaks.push(Leak::CbetTooHigh { cbet });
        } else if cbet < 50.0 {
            leaks.push(Leak::CbetTooLow { cbet });
        }
    }

    if stats.postflop_aggressive + stats.postflop_calls > 0 {
        let factor = stats.aggression_factor();
        if factor > 3.0 {
            leaks.push(Leak::TooAggressive { factor });
        } else if factor < 1.0 {
            leaks.push(Leak::TooPassive { factor });
        }
    }

    leaks
}
