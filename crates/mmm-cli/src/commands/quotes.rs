//! The `mmm quotes` command.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};

use mmm_core::generators::word_count;
use mmm_core::quote_bank::{bundled_quotes, parse_quotes};
use mmm_core::settings::{expand_home, load_challenge_settings};
use mmm_core::ChallengeKind;
use mmm_store::MmmConfig;

use super::open_store;

pub fn execute(config: &MmmConfig, path: Option<PathBuf>, words_max: Option<u32>) -> Result<()> {
    let store = open_store(config)?;
    let settings = load_challenge_settings(&store, ChallengeKind::Quotes)?;

    let source = path.or_else(|| {
        if settings.quotes_path.trim().is_empty() {
            config.quotes_path.clone()
        } else {
            Some(expand_home(&settings.quotes_path))
        }
    });

    let quotes = match &source {
        Some(p) => {
            let file = File::open(p)
                .with_context(|| format!("failed to open quote file: {}", p.display()))?;
            parse_quotes(file)
                .with_context(|| format!("failed to parse quote file: {}", p.display()))?
        }
        None => bundled_quotes(),
    };

    let words_max = words_max.unwrap_or(settings.words_max);
    let fitting = quotes
        .iter()
        .filter(|q| word_count(q) <= words_max as usize)
        .count();

    match &source {
        Some(p) => println!("Source: {}", p.display()),
        None => println!("Source: bundled quotes"),
    }
    println!("Quotes: {}", quotes.len());
    println!("With at most {words_max} words: {fitting}");
    Ok(())
}
