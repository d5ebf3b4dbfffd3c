//! Hand assembly and batch parsing.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;

use crate::config::ParserConfig;
use crate::diagnostics::{ParseReporter, TracingReporter};
use crate::error::{BatchError, ConfigError, HandError, MissingField};
use crate::header::{self, UNKNOWN};
use crate::interpreter;
use crate::lexer::{self, LineKind};
use crate::money::Chips;
use crate::patterns::Patterns;
use crate::record::HandRecord;
use crate::{fees, seats, showdown};

static HAND_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"Hand #\S").unwrap());

/// Parses hand-history text into [`HandRecord`]s.
///
/// Cheap to share across threads; every call is independent.
#[derive(Clone)]
pub struct HandParser {
    config: ParserConfig,
    patterns: Patterns,
    reporter: Arc<dyn ParseReporter>,
}

/// Result of a multi-file load.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub hands: Vec<HandRecord>,
    pub files_read: usize,
    pub skipped_files: Vec<PathBuf>,
    /// Units that produced a placeholder instead of a real record.
    pub failed_hands: usize,
}

impl HandParser {
    pub fn new(config: ParserConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let patterns = Patterns::new(&config.currency)?;
        Ok(Self {
            config,
            patterns,
            reporter: Arc::new(TracingReporter),
        })
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ParseReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Parses one hand, substituting a placeholder if it cannot be assembled.
    pub fn parse_hand(&self, text: &str) -> HandRecord {
        self.parse_unit(text).unwrap_or_else(HandRecord::placeholder)
    }

    fn parse_unit(&self, text: &str) -> Option<HandRecord> {
        match self.try_parse_hand(text) {
            Ok(hand) => Some(hand),
            Err(error) => {
                let hand_id = header::hand_id(text).unwrap_or_default();
                self.reporter.hand_failed(&hand_id, &error);
                None
            }
        }
    }

    pub fn try_parse_hand(&self, text: &str) -> Result<HandRecord, HandError> {
        if text.trim().is_empty() {
            return Err(HandError::Empty);
        }
        let lines = lexer::tokenize(text, &self.patterns);

        let header_text = lines
            .iter()
            .filter(|line| line.kind == LineKind::Header)
            .map(|line| line.text)
            .collect::<Vec<_>>()
            .join("\n");
        let header = header::extract(&header_text, &self.patterns);
        let hand_id = header.hand_id.clone().unwrap_or_default();
        let missing = |field| self.reporter.field_missing(&hand_id, field);

        let mut players = seats::build_roster(&lines)?;
        if header.button_seat.is_none() {
            missing(MissingField::ButtonSeat);
        }
        let button_seat = seats::resolve_button(header.button_seat, &players)?;
        seats::assign_positions(&mut players, button_seat);
        seats::mark_subject(&mut players, &self.config);
        seats::deal_hole_cards(&mut players, &lines);

        let interpretation = interpreter::interpret(&lines, &players);
        let report = showdown::extract(&lines);
        let pot = fees::reconcile(text, &self.patterns);

        for player in &mut players {
            if let Some(flags) = interpretation.preflop.get(&player.name) {
                player.vpip = flags.vpip;
                player.pfr = flags.raised;
                player.preflop_called = flags.called;
                if flags.decided {
                    player.vpip_eligible = true;
                    player.pfr_eligible = true;
                }
            }
            let entry = report.entries.iter().find(|entry| entry.player == player.name);
            player.showed_cards =
                entry.is_some() || interpretation.showers.contains(&player.name);
            player.mucked_cards = interpretation.muckers.contains(&player.name)
                || report.mucked.contains(&player.name);
            player.showdown_reached = player.showed_cards || player.mucked_cards;
            player.is_all_in = interpretation.all_in.contains(&player.name);
            if let Some(entry) = entry {
                player.final_hand = entry.description.clone();
            }
        }

        if header.timestamp.is_none() {
            missing(MissingField::Timestamp);
        }
        if header.table_name.is_none() {
            missing(MissingField::TableName);
        }
        if header.stakes.is_none() {
            missing(MissingField::Stakes);
        }
        if pot.total_pot.is_none() {
            missing(MissingField::TotalPot);
        }
        if header.hand_id.is_none() {
            missing(MissingField::HandId);
        }

        let variant = header
            .variant
            .unwrap_or_else(|| header::variant_for_seats(players.len() as u32));
        let stakes = header.stakes;
        let went_to_showdown = interpretation.went_to_showdown || !report.entries.is_empty();

        Ok(HandRecord {
            hand_id,
            site: header.site,
            game: header.game,
            variant,
            is_tournament: header.tournament_id.is_some(),
            tournament_id: header.tournament_id.unwrap_or_default(),
            table_name: header.table_name.unwrap_or_else(|| UNKNOWN.to_string()),
            timestamp: header.timestamp,
            stakes: stakes
                .map(|stakes| stakes.label(&self.config.currency))
                .unwrap_or_default(),
            small_blind: stakes.map_or(Chips::ZERO, |stakes| stakes.small_blind),
            big_blind: stakes.map_or(Chips::ZERO, |stakes| stakes.big_blind),
            ante: header
                .ante
                .or(interpretation.first_ante)
                .unwrap_or_default(),
            button_seat,
            number_of_players: players.len(),
            players,
            actions: interpretation.actions,
            board: report.board,
            total_pot: pot.total_pot.unwrap_or_default(),
            rake: pot.fees.total(),
            fees: pot.fees,
            winner: report.winner,
            showdown: report.entries,
            went_to_showdown,
            aggressors: interpretation.aggressors,
            final_street: interpretation.final_street,
        })
    }

    /// Parses every hand in one text blob, in file order.
    pub fn parse_text(&self, text: &str) -> Vec<HandRecord> {
        split_hands(text)
            .into_iter()
            .map(|unit| self.parse_hand(unit))
            .collect()
    }

    /// Fans the hands of many texts out across the rayon pool and returns
    /// them ordered by timestamp, then hand id.
    pub fn parse_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Vec<HandRecord> {
        self.parse_units(texts).0
    }

    fn parse_units<S: AsRef<str> + Sync>(&self, texts: &[S]) -> (Vec<HandRecord>, usize) {
        let units: Vec<&str> = texts
            .iter()
            .flat_map(|text| split_hands(text.as_ref()))
            .collect();
        let parsed: Vec<Option<HandRecord>> =
            units.par_iter().map(|unit| self.parse_unit(unit)).collect();
        let failed = parsed.iter().filter(|hand| hand.is_none()).count();
        let mut hands: Vec<HandRecord> = parsed
            .into_iter()
            .map(|hand| hand.unwrap_or_else(HandRecord::placeholder))
            .collect();
        sort_hands(&mut hands);
        (hands, failed)
    }

    /// Reads and parses files; unreadable files are reported and skipped.
    pub fn load_files<P: AsRef<Path>>(&self, paths: &[P]) -> BatchOutcome {
        let mut texts = Vec::new();
        let mut skipped_files = Vec::new();
        for path in paths {
            let path = path.as_ref();
            match read_text(path) {
                Ok(text) => texts.push(text),
                Err(error) => {
                    self.reporter.file_skipped(path, &error);
                    skipped_files.push(path.to_path_buf());
                }
            }
        }
        let (hands, failed_hands) = self.parse_units(&texts);
        BatchOutcome {
            hands,
            files_read: texts.len(),
            skipped_files,
            failed_hands,
        }
    }
}

fn read_text(path: &Path) -> Result<String, BatchError> {
    let bytes = fs::read(path).map_err(|source| BatchError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8(bytes).map_err(|_| BatchError::Decode {
        path: path.to_path_buf(),
    })?;
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// Stable ordering for display: missing timestamps first, ties by hand id.
pub fn sort_hands(hands: &mut [HandRecord]) {
    hands.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.hand_id.cmp(&b.hand_id))
    });
}

/// Splits a blob at every line carrying a `Hand #` header. Text before the
/// first header counts as a hand of its own unless it is blank.
pub fn split_hands(text: &str) -> Vec<&str> {
    let mut starts = Vec::new();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if HAND_START.is_match(line) {
            starts.push(offset);
        }
        offset += line.len();
    }
    if starts.first() != Some(&0) {
        starts.insert(0, 0);
    }

    starts
        .iter()
        .enumerate()
        .map(|(idx, &start)| {
            let end = starts.get(idx + 1).copied().unwrap_or(text.len());
            &text[start..end]
        })
        .filter(|unit| !unit.trim().is_empty())
        .collect()
}
