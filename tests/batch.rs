use std::fs;
use std::sync::Arc;

use pokerlog::analyzer::expand_inputs;
use pokerlog::diagnostics::ParseEvent;
use pokerlog::{CollectingReporter, HandParser, ParserConfig};
use tempfile::tempdir;

const SESSION: &str = include_str!("fixtures/session.txt");

#[test]
fn unreadable_files_are_skipped_and_the_rest_load() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let good = dir.path().join("alpha.txt");
    let broken = dir.path().join("broken.txt");
    let missing = dir.path().join("missing.txt");
    fs::write(&good, SESSION)?;
    fs::write(&broken, [0xff, 0xfe, 0x00, 0x48])?;

    let reporter = Arc::new(CollectingReporter::new());
    let parser = HandParser::new(ParserConfig::default())?.with_reporter(reporter.clone());
    let outcome = parser.load_files(&[&good, &broken, &missing]);

    assert_eq!(outcome.hands.len(), 5);
    assert_eq!(outcome.files_read, 1);
    assert_eq!(outcome.skipped_files, vec![broken.clone(), missing.clone()]);
    assert_eq!(outcome.failed_hands, 0);

    let skipped: Vec<_> = reporter
        .events()
        .into_iter()
        .filter_map(|event| match event {
            ParseEvent::FileSkipped { path, .. } => Some(path),
            _ => None,
        })
        .collect();
    assert_eq!(skipped, vec![broken, missing]);
    Ok(())
}

#[test]
fn byte_order_marks_are_ignored() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("bom.txt");
    fs::write(&path, format!("\u{feff}{SESSION}"))?;

    let parser = HandParser::new(ParserConfig::default())?;
    let outcome = parser.load_files(&[&path]);
    assert_eq!(outcome.hands.len(), 5);
    assert_eq!(outcome.hands[0].site, "PokerStars");
    Ok(())
}

#[test]
fn batches_are_ordered_by_timestamp() -> anyhow::Result<()> {
    let units = pokerlog::parser::split_hands(SESSION);
    let mut reversed: Vec<&str> = units.clone();
    reversed.reverse();

    let parser = HandParser::new(ParserConfig::default())?;
    let hands = parser.parse_batch(&reversed);
    let ids: Vec<&str> = hands.iter().map(|hand| hand.hand_id.as_str()).collect();
    assert_eq!(ids, ["2001", "2002", "2003", "2004", "2005"]);
    Ok(())
}

#[test]
fn failed_hands_are_counted() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("dupes.txt");
    let duplicate = "\
PokerStars Hand #2200: Hold'em No Limit ($0.50/$1.00 USD) - 2024/05/01 22:00:00 ET
Table 'Alpha' 6-max Seat #1 is the button
Seat 1: Hero ($100.00 in chips)
Seat 1: Villain ($100.00 in chips)
";
    fs::write(&path, format!("{duplicate}\n{SESSION}"))?;

    let parser = HandParser::new(ParserConfig::default())?;
    let outcome = parser.load_files(&[&path]);
    assert_eq!(outcome.hands.len(), 6);
    assert_eq!(outcome.failed_hands, 1);
    Ok(())
}

#[test]
fn directories_expand_to_their_text_files() -> anyhow::Result<()> {
    let dir = tempdir()?;
    fs::write(dir.path().join("b.txt"), SESSION)?;
    fs::write(dir.path().join("a.TXT"), SESSION)?;
    fs::write(dir.path().join("notes.md"), "not a hand history")?;
    fs::create_dir(dir.path().join("nested"))?;
    fs::write(dir.path().join("nested").join("c.txt"), SESSION)?;
    let single = dir.path().join("nested").join("c.txt");

    let paths = expand_inputs(&[dir.path().to_path_buf(), single.clone()]);
    assert_eq!(
        paths,
        vec![dir.path().join("a.TXT"), dir.path().join("b.txt"), single]
    );
    Ok(())
}

#[test]
fn empty_subject_is_rejected() {
    assert!(HandParser::new(ParserConfig::new("$", "  ")).is_err());
}
