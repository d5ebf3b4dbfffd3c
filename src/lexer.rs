//! Line-level classification of hand-history text.
//!
//! Every line of a hand maps to exactly one [`LineKind`]. Classification is
//! ordered and total: anything the rules do not recognize becomes
//! [`LineKind::Unrecognized`] and is skipped by the extractors.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::cards::{Card, parse_cards};
use crate::game::Street;
use crate::money::Chips;
use crate::patterns::{Patterns, capture_amount};

static BRACKETS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]").unwrap());
static DEALT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^Dealt to\s+(.+?)(?:\s*\[([^\]]*)\])?\s*$").unwrap());
static SHOW_DESCRIPTION: Lazy<Regex> = Lazy::new(|| Regex::new(r"\]\s*\(([^)]*)\)").unwrap());
static SUMMARY_SEAT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^Seat\s+\d+:\s+(.+)$").unwrap());
static SUMMARY_SHOWED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:showed|shows)\s*\[([^\]]*)\]").unwrap());
static SUMMARY_WITH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bwith\s+(.+?)\s*$").unwrap());
static BOARD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^Board\s*\[([^\]]*)\]").unwrap());

/// Which part of the hand text the scanner is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Header,
    Body,
    Summary,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    /// `*** HOLE CARDS ***`: a phase marker, not a street change.
    HoleCards,
    Street { street: Street, cards: Vec<Card> },
    Summary,
    Other(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verb {
    Collected(Chips),
    Posts { amount: Chips, ante: bool },
    Calls { amount: Chips, all_in: bool },
    Bets { amount: Chips, all_in: bool },
    Raises { by: Chips, to: Chips, all_in: bool },
    Folds,
    Checks,
    Shows {
        cards: Vec<Card>,
        description: Option<String>,
    },
    AllIn(Chips),
    Mucks,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SummaryLine {
    Seat {
        name: String,
        showed: Option<Vec<Card>>,
        description: Option<String>,
        mucked: bool,
        won: Option<Chips>,
        collected: Option<Chips>,
    },
    Board(Vec<Card>),
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Header,
    Seat { seat: u32, name: String, stack: Chips },
    Marker(Marker),
    Dealt { name: String, cards: Vec<Card> },
    Action { actor: String, verb: Verb },
    Uncalled { player: String, amount: Chips },
    FeePot,
    Summary(SummaryLine),
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedLine<'t> {
    pub text: &'t str,
    pub kind: LineKind,
}

/// Classifies lines against the roster of seated names.
pub struct LineClassifier<'a> {
    patterns: &'a Patterns,
    roster: Vec<&'a str>,
}

impl<'a> LineClassifier<'a> {
    pub fn new(patterns: &'a Patterns, names: &'a [String]) -> Self {
        let mut roster: Vec<&str> = names.iter().map(String::as_str).collect();
        // Longest first so "Bob Smith" wins over "Bob".
        roster.sort_by_key(|name| std::cmp::Reverse(name.len()));
        Self { patterns, roster }
    }

    pub fn classify(&self, line: &str, section: Section) -> LineKind {
        if line.starts_with("***") {
            return LineKind::Marker(classify_marker(line));
        }
        if let Some(caps) = self.patterns.uncalled.captures(line) {
            if let Some(amount) = capture_amount(&caps, 1) {
                return LineKind::Uncalled {
                    player: caps[2].to_string(),
                    amount,
                };
            }
        }
        if let Some((actor, rest)) = self.split_actor(line) {
            return match self.classify_verb(rest) {
                Some(verb) => LineKind::Action {
                    actor: actor.to_string(),
                    verb,
                },
                None => LineKind::Unrecognized,
            };
        }
        if let Some(seat) = seat_declaration(line, self.patterns) {
            return seat;
        }
        if let Some(caps) = DEALT.captures(line) {
            return LineKind::Dealt {
                name: caps[1].trim().to_string(),
                cards: caps.get(2).map(|m| parse_cards(m.as_str())).unwrap_or_default(),
            };
        }
        if is_fee_pot_line(line) {
            return LineKind::FeePot;
        }
        match section {
            Section::Header => LineKind::Header,
            Section::Summary => LineKind::Summary(self.classify_summary(line)),
            Section::Body => LineKind::Unrecognized,
        }
    }

    fn split_actor<'l>(&self, line: &'l str) -> Option<(&'a str, &'l str)> {
        self.roster.iter().find_map(|&name| {
            let rest = line.strip_prefix(name)?;
            if let Some(rest) = rest.strip_prefix(':') {
                return Some((name, rest.trim()));
            }
            let rest = rest.trim_start();
            rest.to_ascii_lowercase()
                .starts_with("collected")
                .then_some((name, rest))
        })
    }

    fn classify_verb(&self, rest: &str) -> Option<Verb> {
        let lower = rest.to_ascii_lowercase();
        let words: Vec<&str> = lower
            .split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric() && c != '-'))
            .collect();
        let has = |verb: &str| words.contains(&verb);
        let all_in = lower.contains("all-in") || lower.contains("all in");
        let amount = || self.patterns.first_amount(rest);

        if has("collected") {
            return amount().map(Verb::Collected);
        }
        if has("posts") || has("posted") {
            return amount().map(|amount| Verb::Posts {
                amount,
                ante: has("ante"),
            });
        }
        if has("calls") {
            return amount().map(|amount| Verb::Calls { amount, all_in });
        }
        if has("bets") {
            return amount().map(|amount| Verb::Bets { amount, all_in });
        }
        if has("raises") {
            let to = self.patterns.raise_target(rest).or_else(amount)?;
            let by = lower
                .find(" to ")
                .and_then(|idx| self.patterns.first_amount(&rest[..idx]))
                .unwrap_or(to);
            return Some(Verb::Raises { by, to, all_in });
        }
        if has("folds") {
            return Some(Verb::Folds);
        }
        if has("checks") {
            return Some(Verb::Checks);
        }
        if has("shows") || has("showed") {
            let cards = BRACKETS
                .captures(rest)
                .map(|caps| parse_cards(&caps[1]))
                .unwrap_or_default();
            let description = SHOW_DESCRIPTION
                .captures(rest)
                .map(|caps| caps[1].trim().to_string())
                .filter(|text| !text.is_empty());
            return Some(Verb::Shows { cards, description });
        }
        if all_in {
            return amount().map(Verb::AllIn);
        }
        if has("mucks") {
            return Some(Verb::Mucks);
        }
        None
    }

    fn classify_summary(&self, line: &str) -> SummaryLine {
        if let Some(caps) = BOARD.captures(line) {
            return SummaryLine::Board(parse_cards(&caps[1]));
        }
        let Some(caps) = SUMMARY_SEAT.captures(line) else {
            return SummaryLine::Other;
        };
        let rest = caps.get(1).map_or("", |m| m.as_str());
        let Some(name) = self.roster.iter().find(|name| rest.starts_with(**name)) else {
            return SummaryLine::Other;
        };
        let showed = SUMMARY_SHOWED
            .captures(rest)
            .map(|caps| parse_cards(&caps[1]));
        let description = showed
            .as_ref()
            .and_then(|_| SUMMARY_WITH.captures(rest))
            .map(|caps| caps[1].to_string());
        SummaryLine::Seat {
            name: name.to_string(),
            showed,
            description,
            mucked: rest.to_ascii_lowercase().contains("mucked"),
            won: self
                .patterns
                .summary_won
                .captures(rest)
                .and_then(|caps| capture_amount(&caps, 1)),
            collected: self
                .patterns
                .summary_collected
                .captures(rest)
                .and_then(|caps| capture_amount(&caps, 1)),
        }
    }
}

fn seat_declaration(line: &str, patterns: &Patterns) -> Option<LineKind> {
    let caps = patterns.seat.captures(line)?;
    Some(LineKind::Seat {
        seat: caps[1].parse().ok()?,
        name: caps[2].trim().to_string(),
        stack: capture_amount(&caps, 3)?,
    })
}

fn classify_marker(line: &str) -> Marker {
    let body = line.trim_start_matches('*');
    let (name, tail) = body.split_once("***").unwrap_or((body, ""));
    let name = name.trim().to_ascii_uppercase();
    let cards = || {
        BRACKETS
            .captures_iter(tail)
            .last()
            .map(|caps| parse_cards(&caps[1]))
            .unwrap_or_default()
    };
    let street = |street| Marker::Street {
        street,
        cards: cards(),
    };

    if name.contains("HOLE CARDS") {
        Marker::HoleCards
    } else if name.contains("SUMMARY") {
        Marker::Summary
    } else if name.contains("SHOW DOWN") || name.contains("SHOWDOWN") {
        street(Street::Showdown)
    } else if name.contains("RIVER") {
        street(Street::River)
    } else if name.contains("TURN") {
        street(Street::Turn)
    } else if name.contains("FLOP") {
        street(Street::Flop)
    } else {
        Marker::Other(name)
    }
}

fn is_fee_pot_line(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    ["total pot", "pot size", "rake"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

/// Splits `text` into trimmed non-blank lines and classifies each one,
/// tracking the header/body/summary section as it goes.
pub fn tokenize<'t>(text: &'t str, patterns: &Patterns) -> Vec<ClassifiedLine<'t>> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let names: Vec<String> = lines
        .iter()
        .filter_map(|line| match seat_declaration(line, patterns) {
            Some(LineKind::Seat { name, .. }) => Some(name),
            _ => None,
        })
        .collect();
    let classifier = LineClassifier::new(patterns, &names);

    let mut section = Section::Header;
    lines
        .into_iter()
        .map(|text| {
            let kind = classifier.classify(text, section);
            section = match (&kind, section) {
                (LineKind::Marker(Marker::Summary), _) => Section::Summary,
                (LineKind::Seat { .. } | LineKind::Marker(_), Section::Header) => Section::Body,
                (_, current) => current,
            };
            ClassifiedLine { text, kind }
        })
        .collect()
}
