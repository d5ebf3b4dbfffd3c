use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::money::Chips;
use crate::patterns::{Patterns, capture_amount};

static HAND_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"Hand #([A-Za-z0-9]+)").unwrap());
static TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2})").unwrap());
static TABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"Table\s+['"]([^'"]+)['"]"#).unwrap());
static BUTTON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)Seat #(\d+) is the button").unwrap());
static TOURNAMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)Tournament #(\d+)").unwrap());
static MAX_SEATS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(\d+)[- ]?max\b").unwrap());
static HEADS_UP: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)heads[- ]up|\bHU\b").unwrap());

static SITES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        ("PokerStars", r"(?i)pokerstars"),
        ("888poker", r"(?i)888\s?poker"),
        ("ACR", r"(?i)americas cardroom|\bACR\b"),
        ("GGPoker", r"(?i)ggpoker|^\s*Poker Hand #"),
        ("PartyPoker", r"(?i)partypoker|party poker"),
        ("Winamax", r"(?i)winamax"),
        ("Unibet", r"(?i)unibet"),
        ("Bet365", r"(?i)bet365"),
        ("William Hill", r"(?i)william hill"),
    ]
    .into_iter()
    .map(|(site, pattern)| (site, Regex::new(pattern).unwrap()))
    .collect()
});

pub const UNKNOWN: &str = "Unknown";

/// Identity and table structure read from the lines before the first seat.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HandHeader {
    pub hand_id: Option<String>,
    pub site: String,
    pub game: String,
    pub variant: Option<String>,
    pub tournament_id: Option<String>,
    pub table_name: Option<String>,
    pub timestamp: Option<NaiveDateTime>,
    pub stakes: Option<Stakes>,
    pub ante: Option<Chips>,
    pub button_seat: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stakes {
    pub small_blind: Chips,
    pub big_blind: Chips,
}

impl Stakes {
    pub fn label(&self, currency: &str) -> String {
        format!("{currency}{}/{currency}{}", self.small_blind, self.big_blind)
    }
}

/// Reads every header field independently; an absent pattern leaves its
/// field empty without affecting the others.
pub fn extract(header: &str, patterns: &Patterns) -> HandHeader {
    HandHeader {
        hand_id: first_capture(&HAND_ID, header),
        site: detect_site(header),
        game: detect_game(header).to_string(),
        variant: detect_variant(header),
        tournament_id: first_capture(&TOURNAMENT, header),
        table_name: first_capture(&TABLE, header).map(|name| name.trim().to_string()),
        timestamp: first_capture(&TIMESTAMP, header)
            .and_then(|raw| NaiveDateTime::parse_from_str(&raw, "%Y/%m/%d %H:%M:%S").ok()),
        stakes: patterns.stakes.captures(header).and_then(|caps| {
            Some(Stakes {
                small_blind: capture_amount(&caps, 1)?,
                big_blind: capture_amount(&caps, 2)?,
            })
        }),
        ante: patterns
            .ante
            .captures(header)
            .and_then(|caps| capture_amount(&caps, 1)),
        button_seat: first_capture(&BUTTON, header).and_then(|seat| seat.parse().ok()),
    }
}

/// Hand id from anywhere in a hand unit, for tagging failures before the
/// header has been isolated.
pub fn hand_id(text: &str) -> Option<String> {
    first_capture(&HAND_ID, text)
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern.captures(text).map(|caps| caps[1].to_string())
}

fn detect_site(header: &str) -> String {
    SITES
        .iter()
        .find(|(_, pattern)| pattern.is_match(header))
        .map_or(UNKNOWN, |(site, _)| *site)
        .to_string()
}

fn detect_game(header: &str) -> &'static str {
    let lower = header.to_ascii_lowercase();
    if lower.contains("omaha") {
        "Omaha"
    } else if lower.contains("stud") {
        "Stud"
    } else {
        "Hold'em"
    }
}

fn detect_variant(header: &str) -> Option<String> {
    if HEADS_UP.is_match(header) {
        return Some("HU".to_string());
    }
    MAX_SEATS
        .captures(header)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .map(variant_for_seats)
}

/// Variant tag implied by a seat count.
pub fn variant_for_seats(seats: u32) -> String {
    match seats {
        0..=2 => "HU",
        3..=6 => "6-max",
        _ => "9-max",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "PokerStars Hand #245123456789: Hold'em No Limit ($0.25/$0.50 USD) - 2024/03/14 21:05:33 ET\nTable 'Altair III' 6-max Seat #4 is the button";

    #[test]
    fn reads_a_full_header() {
        let patterns = Patterns::new("$").unwrap();
        let header = extract(HEADER, &patterns);
        assert_eq!(header.hand_id.as_deref(), Some("245123456789"));
        assert_eq!(header.site, "PokerStars");
        assert_eq!(header.game, "Hold'em");
        assert_eq!(header.variant.as_deref(), Some("6-max"));
        assert_eq!(header.table_name.as_deref(), Some("Altair III"));
        assert_eq!(header.button_seat, Some(4));
        assert_eq!(
            header.stakes,
            Some(Stakes {
                small_blind: Chips::from_cents(25),
                big_blind: Chips::from_cents(50),
            })
        );
        assert_eq!(
            header.timestamp.map(|ts| ts.to_string()).as_deref(),
            Some("2024-03-14 21:05:33")
        );
        assert_eq!(header.tournament_id, None);
    }

    #[test]
    fn missing_fields_do_not_block_the_rest() {
        let patterns = Patterns::new("$").unwrap();
        let header = extract("Some Room - Table 'Vega' ($1/$2)", &patterns);
        assert_eq!(header.hand_id, None);
        assert_eq!(header.timestamp, None);
        assert_eq!(header.site, UNKNOWN);
        assert_eq!(header.table_name.as_deref(), Some("Vega"));
        assert_eq!(
            header.stakes.map(|s| s.label("$")).as_deref(),
            Some("$1.00/$2.00")
        );
    }

    #[test]
    fn gg_style_headers() {
        let patterns = Patterns::new("$").unwrap();
        let header = extract(
            "Poker Hand #RC1234: Hold'em No Limit ($0.05/$0.10) - 2024/01/02 03:04:05",
            &patterns,
        );
        assert_eq!(header.site, "GGPoker");
        assert_eq!(header.hand_id.as_deref(), Some("RC1234"));
    }
}
