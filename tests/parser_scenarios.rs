use std::sync::Arc;

use pokerlog::cards::parse_cards;
use pokerlog::diagnostics::ParseEvent;
use pokerlog::stats::Tally;
use pokerlog::{
    ActionKind, Chips, CollectingReporter, HandParser, HandRecord, MissingField, ParserConfig,
    PlayerOutcome, Position, StatsAggregator, Street,
};

const SESSION: &str = include_str!("fixtures/session.txt");

fn parser() -> HandParser {
    HandParser::new(ParserConfig::default()).expect("default config is valid")
}

fn session() -> Vec<HandRecord> {
    parser().parse_text(SESSION)
}

fn hand(id: &str) -> HandRecord {
    session()
        .into_iter()
        .find(|hand| hand.hand_id == id)
        .expect("hand present in fixture")
}

fn hero(hand: &HandRecord) -> PlayerOutcome {
    PlayerOutcome::for_subject(hand).expect("hero seated")
}

fn cents(value: i64) -> Chips {
    Chips::from_cents(value)
}

#[test]
fn splits_the_session_into_five_hands() {
    let hands = session();
    let ids: Vec<&str> = hands.iter().map(|hand| hand.hand_id.as_str()).collect();
    assert_eq!(ids, ["2001", "2002", "2003", "2004", "2005"]);
    for hand in &hands {
        assert_eq!(hand.number_of_players, hand.players.len());
        assert_eq!(hand.site, "PokerStars");
        assert_eq!(hand.table_name, "Alpha");
        assert_eq!(hand.variant, "6-max");
        assert_eq!(hand.stakes, "$0.50/$1.00");
        assert_eq!(hand.big_blind, cents(100));
    }
}

#[test]
fn folding_to_an_unopened_big_blind() {
    let hand = hand("2001");
    let outcome = hero(&hand);

    assert!(!hand.went_to_showdown);
    assert_eq!(hand.final_street, Street::Preflop);
    assert_eq!(outcome.position, Position::BigBlind);
    assert_eq!(outcome.total_contributed, cents(100));
    assert_eq!(outcome.total_refunded, cents(50));
    assert_eq!(outcome.total_collected, cents(150));
    assert_eq!(outcome.net_profit, cents(50));
    assert!(outcome.vpip_eligible);
    assert!(!outcome.vpip);
    assert!(!outcome.pfr);
    assert!(!outcome.saw_flop);
    assert_eq!(hand.winner, "Hero");
}

#[test]
fn raising_first_in_and_betting_the_flop_is_a_continuation_bet() {
    let hand = hand("2002");
    let outcome = hero(&hand);

    assert!(outcome.pfr);
    assert!(outcome.vpip);
    assert!(outcome.cbet_flop_opportunity);
    assert!(outcome.cbet_flop);
    assert!(!outcome.cbet_turn_opportunity);
    assert_eq!(hand.aggressors.preflop.as_deref(), Some("Hero"));

    let raise = hand
        .actions_by("Hero")
        .find(|action| matches!(action.kind, ActionKind::Raise { .. }))
        .expect("hero raised");
    assert_eq!(
        raise.kind,
        ActionKind::Raise {
            added: cents(350),
            to: cents(400),
        }
    );
    assert_eq!(raise.total_bet, cents(400));
    assert_eq!(hand.board.flop, parse_cards("Kd 7c 2s"));
    assert_eq!(hand.board.turn, None);
}

#[test]
fn calling_the_preflop_raiser_gives_no_flop_continuation_bet() {
    let hand = hand("2003");
    let outcome = hero(&hand);

    assert!(!outcome.cbet_flop_opportunity);
    assert!(!outcome.cbet_flop);
    assert!(outcome.three_bet_opportunity);
    assert!(!outcome.three_bet);
    assert!(outcome.preflop_called);

    let hero_flop_raise = hand
        .actions_by("Hero")
        .find(|action| action.street == Street::Flop)
        .expect("hero acted on the flop");
    assert!(hero_flop_raise.is_aggressive);
    assert!(!hero_flop_raise.cbet_opportunity);

    let villain = PlayerOutcome::for_player(&hand, "Villain").expect("villain seated");
    assert!(villain.cbet_flop_opportunity);
    assert!(villain.cbet_flop);

    // Hero took the lead with the flop raise.
    assert!(outcome.cbet_turn_opportunity);
    assert!(outcome.cbet_turn);
    assert_eq!(hand.final_street, Street::Turn);
}

#[test]
fn two_players_showing_down_is_a_won_showdown() {
    let hand = hand("2004");
    let outcome = hero(&hand);

    assert!(hand.went_to_showdown);
    assert!(outcome.went_to_showdown);
    assert!(outcome.won_at_showdown);
    assert_eq!(hand.showdown_players(), ["Hero", "Villain"]);
    assert_eq!(hand.showdown[1].description, "a pair of Queens - lower kicker");
    assert_eq!(hand.board.cards(), parse_cards("Qh 8d 4c 5s Jc"));
    assert_eq!(hand.fees.rake, cents(100));
    assert_eq!(hand.fees.jackpot, cents(10));
    assert_eq!(hand.rake, cents(110));

    let villain = PlayerOutcome::for_player(&hand, "Villain").expect("villain seated");
    assert!(villain.went_to_showdown);
    assert!(!villain.won_at_showdown);
    assert_eq!(villain.net_profit, cents(-1200));
}

#[test]
fn showing_alone_against_a_muck_is_not_a_won_showdown() {
    let hand = hand("2005");
    let outcome = hero(&hand);

    assert!(outcome.went_to_showdown);
    assert!(!outcome.won_at_showdown);
    assert!(outcome.net_profit.is_positive());

    let villain = hand.player("Villain").expect("villain seated");
    assert!(villain.mucked_cards);
    assert!(!villain.showed_cards);
    assert!(villain.showdown_reached);
}

#[test]
fn an_uncalled_bet_returned_is_not_a_showdown_win() {
    let text = "\
PokerStars Hand #2101: Hold'em No Limit ($0.50/$1.00 USD) - 2024/05/01 21:10:00 ET
Table 'Alpha' 6-max Seat #1 is the button
Seat 1: Hero ($100.00 in chips)
Seat 2: Villain ($40.00 in chips)
Hero: posts small blind $0.50
Villain: posts big blind $1.00
*** HOLE CARDS ***
Dealt to Hero [Ah Kh]
Hero: raises $99.00 to $100.00 and is all-in
Villain: calls $39.00 and is all-in
Uncalled bet ($60.00) returned to Hero
*** FLOP *** [2c 7d 9s]
*** TURN *** [2c 7d 9s] [Tc]
*** RIVER *** [2c 7d 9s Tc] [3h]
*** SHOW DOWN ***
Hero: shows [Ah Kh] (high card Ace)
Villain: shows [Qs Qd] (a pair of Queens)
Villain collected $80.00 from pot
*** SUMMARY ***
Total pot $80.00 | Rake $0
Board [2c 7d 9s Tc 3h]
Seat 1: Hero (button) (small blind) showed [Ah Kh] and lost with high card Ace
Seat 2: Villain (big blind) showed [Qs Qd] and won ($80.00) with a pair of Queens";

    let hand = parser().try_parse_hand(text).expect("hand assembles");
    let outcome = hero(&hand);

    assert_eq!(hand.final_pot(), hand.total_pot);
    assert_eq!(outcome.total_refunded, cents(6000));
    assert_eq!(outcome.total_collected, cents(6000));
    assert_eq!(outcome.net_profit, cents(-4000));
    assert!(outcome.went_to_showdown);
    assert!(!outcome.won_at_showdown);

    let villain = PlayerOutcome::for_player(&hand, "Villain").expect("villain seated");
    assert!(villain.won_at_showdown);
    assert_eq!(villain.net_profit, cents(4000));

    let stats = StatsAggregator::from_hands(std::slice::from_ref(&hand));
    let hero_stats = stats.get("Hero").expect("hero tracked");
    assert_eq!(hero_stats.went_to_showdown, 1);
    assert_eq!(hero_stats.won_at_showdown, 0);
}

#[test]
fn summary_show_lines_mark_the_hand_as_a_showdown() {
    let text = "\
PokerStars Hand #2102: Hold'em No Limit ($0.50/$1.00 USD) - 2024/05/01 21:12:00 ET
Table 'Alpha' 6-max Seat #1 is the button
Seat 1: Hero ($100.00 in chips)
Seat 2: Villain ($100.00 in chips)
Hero: posts small blind $0.50
Villain: posts big blind $1.00
*** HOLE CARDS ***
Dealt to Hero [9h 9c]
Hero: calls $0.50
Villain: checks
*** FLOP *** [2c 7d Js]
Villain: checks
Hero: checks
*** TURN *** [2c 7d Js] [4h]
Villain: checks
Hero: checks
*** RIVER *** [2c 7d Js 4h] [Kc]
Villain: checks
Hero: checks
Hero collected $2.00 from pot
*** SUMMARY ***
Total pot $2.00 | Rake $0
Board [2c 7d Js 4h Kc]
Seat 1: Hero (button) (small blind) showed [9h 9c] and won ($2.00) with a pair of Nines
Seat 2: Villain (big blind) showed [8s 6s] and lost with high card King";

    let hand = parser().try_parse_hand(text).expect("hand assembles");

    assert!(hand.went_to_showdown);
    assert_eq!(hand.showdown_players(), ["Hero", "Villain"]);
    assert!(hand.players.iter().all(|player| player.showed_cards));
    assert_eq!(hand.winner, "Hero");

    let outcome = hero(&hand);
    assert!(outcome.went_to_showdown);
    assert!(outcome.won_at_showdown);
}

#[test]
fn re_raising_a_single_open_is_a_three_bet() {
    let text = "\
PokerStars Hand #2103: Hold'em No Limit ($0.50/$1.00 USD) - 2024/05/01 21:15:00 ET
Table 'Alpha' 6-max Seat #1 is the button
Seat 1: Fish ($100.00 in chips)
Seat 2: Villain ($100.00 in chips)
Seat 3: Hero ($100.00 in chips)
Villain: posts small blind $0.50
Hero: posts big blind $1.00
*** HOLE CARDS ***
Dealt to Hero [Ks Kc]
Fish: raises $2.00 to $3.00
Villain: folds
Hero: raises $7.00 to $10.00
Fish: folds
Uncalled bet ($7.00) returned to Hero
Hero collected $6.50 from pot
*** SUMMARY ***
Total pot $6.50 | Rake $0
Seat 1: Fish (button) folded before Flop
Seat 2: Villain (small blind) folded before Flop
Seat 3: Hero (big blind) collected ($6.50)";

    let hand = parser().try_parse_hand(text).expect("hand assembles");
    let outcome = hero(&hand);

    assert!(outcome.three_bet_opportunity);
    assert!(outcome.three_bet);
    assert!(outcome.pfr);
    assert!(outcome.vpip);
    assert_eq!(outcome.net_profit, cents(350));
    assert_eq!(hand.final_pot(), hand.total_pot);

    let villain = PlayerOutcome::for_player(&hand, "Villain").expect("villain seated");
    assert!(villain.three_bet_opportunity);
    assert!(!villain.three_bet);
    let fish = PlayerOutcome::for_player(&hand, "Fish").expect("fish seated");
    assert!(!fish.three_bet_opportunity);

    let stats = StatsAggregator::from_hands(std::slice::from_ref(&hand));
    let hero_stats = stats.get("Hero").expect("hero tracked");
    assert_eq!(hero_stats.three_bet, Tally { hits: 1, chances: 1 });
    assert_eq!(hero_stats.three_bet_pct(), 100.0);
}

#[test]
fn winner_is_the_first_player_to_show() {
    assert_eq!(hand("2004").winner, "Hero");
    assert_eq!(hand("2005").winner, "Hero");
}

#[test]
fn missing_hand_id_keeps_everything_else() {
    let text = "\
PokerStars Game: Hold'em No Limit ($0.50/$1.00 USD) - 2024/05/01 20:10:00 ET
Table 'Alpha' 6-max Seat #1 is the button
Seat 1: Hero ($100.00 in chips)
Seat 2: Villain ($100.00 in chips)
Hero: posts small blind $0.50
Villain: posts big blind $1.00
*** HOLE CARDS ***
Dealt to Hero [8s 8c]
Hero: raises $2.00 to $3.00
Villain: folds
Uncalled bet ($2.00) returned to Hero
Hero collected $2.00 from pot
*** SUMMARY ***
Total pot $2.00 | Rake $0
Seat 1: Hero (button) collected ($2.00)
Seat 2: Villain (big blind) folded before Flop";

    let reporter = Arc::new(CollectingReporter::new());
    let parser = parser().with_reporter(reporter.clone());
    let hand = parser.try_parse_hand(text).expect("hand assembles");

    assert_eq!(hand.hand_id, "");
    assert_eq!(hand.players.len(), 2);
    assert_eq!(hand.actions.len(), 6);
    assert_eq!(hand.total_pot, cents(200));
    assert_eq!(hero(&hand).net_profit, cents(100));
    assert_eq!(reporter.missing_fields(MissingField::HandId), 1);
    assert_eq!(reporter.missing_fields(MissingField::Timestamp), 0);
    assert_eq!(reporter.failed_hands(), 0);
}

#[test]
fn a_hand_without_actions_is_still_a_record() {
    let text = "\
PokerStars Hand #2099: Hold'em No Limit ($0.50/$1.00 USD) - 2024/05/01 21:00:00 ET
Table 'Alpha' 6-max Seat #1 is the button
Seat 1: Hero ($100.00 in chips)
Seat 2: Villain ($100.00 in chips)";

    let reporter = Arc::new(CollectingReporter::new());
    let hand = parser()
        .with_reporter(reporter.clone())
        .try_parse_hand(text)
        .expect("hand assembles");

    assert!(hand.actions.is_empty());
    assert_eq!(hand.players.len(), 2);
    assert_eq!(hand.total_pot, Chips::ZERO);
    assert_eq!(hand.final_pot(), Chips::ZERO);
    assert_eq!(reporter.missing_fields(MissingField::TotalPot), 1);
}

#[test]
fn parsing_twice_gives_identical_records() {
    let parser = parser();
    for unit in pokerlog::parser::split_hands(SESSION) {
        assert_eq!(parser.parse_hand(unit), parser.parse_hand(unit));
    }
}

#[test]
fn vacant_button_becomes_a_placeholder() {
    let text = "\
PokerStars Hand #2100: Hold'em No Limit ($0.50/$1.00 USD) - 2024/05/01 21:05:00 ET
Table 'Alpha' 6-max Seat #5 is the button
Seat 1: Hero ($100.00 in chips)
Seat 2: Villain ($100.00 in chips)
Hero: posts small blind $0.50";

    let reporter = Arc::new(CollectingReporter::new());
    let hands = parser()
        .with_reporter(reporter.clone())
        .parse_text(&format!("{text}\n\n{SESSION}"));

    assert_eq!(hands.len(), 6);
    assert_eq!(hands[0].hand_id, "");
    assert!(hands[0].players.is_empty());
    assert!(hands[0].timestamp.is_some());
    assert_eq!(reporter.failed_hands(), 1);
    assert!(reporter.events().contains(&ParseEvent::HandFailed {
        hand_id: "2100".to_string(),
        message: "button seat 5 is not occupied".to_string(),
    }));
}

#[test]
fn tournament_hands_with_antes_and_bare_chip_amounts() {
    let text = "\
PokerStars Hand #3001: Tournament #555, Hold'em No Limit - Level I (10/20) - 2024/05/02 10:00:00 ET
Table '555 1' 9-max Seat #1 is the button
Seat 1: Hero (1500 in chips)
Seat 2: Villain (1500 in chips)
Seat 3: Fish (1500 in chips)
Hero: posts the ante 5
Villain: posts the ante 5
Fish: posts the ante 5
Villain: posts small blind 10
Fish: posts big blind 20
*** HOLE CARDS ***
Dealt to Hero [Ac Ad]
Hero: raises 40 to 60
Villain: folds
Fish: folds
Uncalled bet (40) returned to Hero
Hero collected 65 from pot
*** SUMMARY ***
Total pot 65 | Rake 0
Seat 1: Hero (button) collected (65)";

    let parser = HandParser::new(ParserConfig::new("", "hero")).expect("valid config");
    let hand = parser.try_parse_hand(text).expect("hand assembles");

    assert!(hand.is_tournament);
    assert_eq!(hand.tournament_id, "555");
    assert_eq!(hand.variant, "9-max");
    assert_eq!(hand.table_name, "555 1");
    assert_eq!(hand.ante, cents(500));
    assert_eq!(hand.stakes, "10.00/20.00");

    let raise = &hand.actions[5];
    assert_eq!(
        raise.kind,
        ActionKind::Raise {
            added: cents(6000),
            to: cents(6000),
        }
    );
    assert_eq!(hand.final_pot(), hand.total_pot);
    assert_eq!(hero(&hand).net_profit, cents(4000));
}
