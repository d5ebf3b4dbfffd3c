use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::{Deserialize, Serialize};

use crate::config::ParserConfig;
use crate::leaks;
use crate::parser::{BatchOutcome, HandParser};
use crate::report::{
    self, HandRow, KeyMetrics, action_rows, hud_line, player_rows, subject_ledger,
};
use crate::stats::StatsAggregator;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    #[default]
    Players,
    Hands,
    Actions,
    Ledger,
    Summary,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(flatten)]
    pub parser: ParserConfig,
    #[serde(default)]
    pub table: TableKind,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub no_color: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            table: TableKind::Players,
            format: OutputFormat::Text,
            no_color: false,
        }
    }
}

/// Loads hand-history files and prints one of the report tables.
pub struct Analyzer {
    config: AnalyzerConfig,
    parser: HandParser,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        let parser = HandParser::new(config.parser.clone()).context("invalid parser settings")?;
        Ok(Self { config, parser })
    }

    pub fn load(&self, inputs: &[PathBuf]) -> BatchOutcome {
        let paths = expand_inputs(inputs);
        tracing::info!(files = paths.len(), "loading hand histories");
        self.parser.load_files(&paths)
    }

    pub fn run(&self, inputs: &[PathBuf]) -> Result<()> {
        let outcome = self.load(inputs);
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.render(&outcome, &mut out)?;
        out.flush()?;
        self.print_summary(&outcome);
        Ok(())
    }

    pub fn render<W: Write>(&self, outcome: &BatchOutcome, out: &mut W) -> Result<()> {
        let hands = &outcome.hands;
        match self.config.format {
            OutputFormat::Json => {
                match self.config.table {
                    TableKind::Players => {
                        let stats = StatsAggregator::from_hands_parallel(hands);
                        serde_json::to_writer_pretty(&mut *out, &player_rows(&stats))?
                    }
                    TableKind::Hands => {
                        let rows: Vec<HandRow> = hands.iter().map(HandRow::from_hand).collect();
                        serde_json::to_writer_pretty(&mut *out, &rows)?
                    }
                    TableKind::Actions => serde_json::to_writer_pretty(&mut *out, &action_rows(hands))?,
                    TableKind::Ledger => serde_json::to_writer_pretty(&mut *out, &subject_ledger(hands))?,
                    TableKind::Summary => {
                        serde_json::to_writer_pretty(&mut *out, &KeyMetrics::from_hands(hands))?
                    }
                }
                writeln!(out)?;
            }
            OutputFormat::Csv => match self.config.table {
                TableKind::Players => {
                    let stats = StatsAggregator::from_hands_parallel(hands);
                    report::write_csv(&player_rows(&stats), out)?
                }
                TableKind::Hands => {
                    let rows: Vec<HandRow> = hands.iter().map(HandRow::from_hand).collect();
                    report::write_csv(&rows, out)?
                }
                TableKind::Actions => report::write_csv(&action_rows(hands), out)?,
                TableKind::Ledger => report::write_csv(&subject_ledger(hands), out)?,
                TableKind::Summary => report::write_csv(&[KeyMetrics::from_hands(hands)], out)?,
            },
            OutputFormat::Text => self.render_text(outcome, out)?,
        }
        Ok(())
    }

    fn render_text<W: Write>(&self, outcome: &BatchOutcome, out: &mut W) -> Result<()> {
        let hands = &outcome.hands;
        match self.config.table {
            TableKind::Players => {
                let stats = StatsAggregator::from_hands_parallel(hands);
                for player in stats.players() {
                    let subject = self.config.parser.is_subject(&player.player);
                    let line = hud_line(player);
                    if self.config.no_color {
                        writeln!(out, "{line}")?;
                    } else if subject {
                        writeln!(out, "{}", line.bold().yellow())?;
                    } else {
                        writeln!(out, "{}", line.cyan())?;
                    }
                    for leak in leaks::detect(player) {
                        if self.config.no_color {
                            writeln!(out, "    leak: {leak}")?;
                        } else {
                            writeln!(out, "    {} {}", "leak:".red(), leak)?;
                        }
                    }
                }
            }
            TableKind::Hands => {
                for row in hands.iter().map(HandRow::from_hand) {
                    let timestamp = row
                        .timestamp
                        .map(|ts| ts.to_string())
                        .unwrap_or_else(|| "--".to_string());
                    writeln!(
                        out,
                        "{} {} {} pot {} rake {} winner {} board [{}]",
                        row.hand_id, timestamp, row.stakes, row.total_pot, row.rake, row.winner, row.board
                    )?;
                }
            }
            TableKind::Actions => {
                for row in action_rows(hands) {
                    writeln!(
                        out,
                        "{} #{} {} {} {} {} pot {} -> {}",
                        row.hand_id,
                        row.sequence,
                        row.street,
                        row.player,
                        row.action_type,
                        row.amount,
                        row.pot_before,
                        row.pot_after
                    )?;
                }
            }
            TableKind::Ledger => {
                for row in subject_ledger(hands) {
                    writeln!(
                        out,
                        "{:>4} {} {} {} net {} running {}",
                        row.hand_number,
                        row.hand_id,
                        row.position,
                        row.hand_category,
                        row.net_profit,
                        row.running_profit
                    )?;
                }
            }
            TableKind::Summary => {
                let metrics = KeyMetrics::from_hands(hands);
                let body = format!(
                    "hands={} profit={} before_rake={} rake={} vpip={:.1}% pfr={:.1}% flop={:.1}% sd/flop={:.1}% wsd={:.1}%",
                    metrics.hands,
                    metrics.total_profit,
                    metrics.total_profit_before_rake,
                    metrics.total_rake,
                    metrics.vpip_rate,
                    metrics.preflop_raise_rate,
                    metrics.flop_rate,
                    metrics.showdown_rate,
                    metrics.wsd_rate
                );
                if self.config.no_color {
                    writeln!(out, "{} {}", self.config.parser.subject, body)?;
                } else {
                    writeln!(out, "{} {}", self.config.parser.subject.bold().magenta(), body)?;
                }
            }
        }
        Ok(())
    }

    pub fn print_summary(&self, outcome: &BatchOutcome) {
        let skipped = outcome.skipped_files.len();
        if self.config.no_color {
            eprintln!(
                "Loaded {} hands from {} files ({} skipped, {} failed)",
                outcome.hands.len(),
                outcome.files_read,
                skipped,
                outcome.failed_hands
            );
        } else {
            eprintln!(
                "{} {} hands from {} files ({} skipped, {} failed)",
                "Loaded".bold().green(),
                outcome.hands.len(),
                outcome.files_read,
                skipped,
                outcome.failed_hands
            );
        }
    }
}

/// Replaces each directory by the `.txt` files directly inside it, sorted.
/// Files and unreadable paths pass through unchanged.
pub fn expand_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for input in inputs {
        if input.is_dir() {
            match text_files(input) {
                Ok(mut files) => {
                    files.sort();
                    paths.extend(files);
                }
                Err(_) => paths.push(input.clone()),
            }
        } else {
            paths.push(input.clone());
        }
    }
    paths
}

fn text_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_text = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if path.is_file() && is_text {
            files.push(path);
        }
    }
    Ok(files)
}
