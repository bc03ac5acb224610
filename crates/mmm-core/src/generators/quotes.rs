use std::path::PathBuf;

use rand::seq::index;
use rand::{Rng, RngCore};
use tracing::{debug, warn};

use super::ChallengeGenerator;
use crate::display::{mask, StyledText, Tone};
use crate::error::ChallengeError;
use crate::matcher::{strip_punctuation, MatchMode};
use crate::model::{ChallengeKind, ChallengeSettings};
use crate::quote_bank::QuoteBank;
use crate::settings::expand_home;

/// Line break token inside the word list.
const BREAK: &str = "\n";

/// Word limit applied on the first two levels.
const EARLY_WORDS_MAX: u32 = 20;

/// Tokens that are never hidden.
const UNHIDEABLE: [&str; 4] = [BREAK, "/", "-", "--"];

/// Split a quote into its body and author.
///
/// A trailing parenthesized group is the author, starting at the leftmost
/// `(` that reaches the end without an inner `)`. Otherwise the last line of a
/// multi-line quote is, and single-line quotes are attributed to "Unknown".
pub fn split_author(quote: &str) -> (String, String) {
    let tail = quote.strip_suffix('\n').unwrap_or(quote);
    if let Some(before_close) = tail.strip_suffix(')') {
        let open = before_close.match_indices('(').map(|(i, _)| i).find(|&i| {
            let inner = &before_close[i + 1..];
            !inner.is_empty() && !inner.contains(')')
        });
        if let Some(open) = open {
            let author = &tail[open..];
            let body = quote.replace(author, "");
            return (body.trim().to_string(), author.to_string());
        }
    }

    let lines: Vec<&str> = quote.split('\n').collect();
    if lines.len() > 1 {
        let body = lines[..lines.len() - 1].join("\n");
        let author = lines[lines.len() - 1];
        (body.trim().to_string(), author.trim().to_string())
    } else {
        (quote.trim().to_string(), "Unknown".to_string())
    }
}

/// Split a body into words, with a break token after every line.
fn split_body(body: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for line in body.split('\n') {
        tokens.extend(line.split(' ').map(str::to_string));
        tokens.push(BREAK.to_string());
    }
    tokens
}

/// Words in the body of a quote, ignoring line breaks and the author.
pub fn word_count(quote: &str) -> usize {
    let (body, _) = split_author(quote);
    split_body(&body)
        .iter()
        .filter(|t| t.as_str() != BREAK && !t.is_empty())
        .count()
}

fn is_hideable(token: &str) -> bool {
    !UNHIDEABLE.contains(&token) && !strip_punctuation(token).is_empty()
}

/// Number of words to hide at `level` out of `candidates`.
fn hidden_count(candidates: usize, level: u32) -> usize {
    if level >= 10 {
        return candidates;
    }
    let n = candidates * level as usize / 10;
    n.max(1).min(candidates)
}

/// Cloze challenge over a quote.
#[derive(Debug)]
pub struct QuotesGenerator {
    bank: QuoteBank,
    default_source: Option<PathBuf>,
    tokens: Vec<String>,
    author: String,
    hidden: Vec<usize>,
    current_idx: Option<usize>,
    resume_idx: Option<usize>,
}

impl QuotesGenerator {
    /// `resume_idx` reopens that quote of the filtered pool on the first challenge.
    pub fn new(
        bank: QuoteBank,
        default_source: Option<PathBuf>,
        resume_idx: Option<usize>,
    ) -> Self {
        Self {
            bank,
            default_source,
            tokens: Vec::new(),
            author: String::new(),
            hidden: Vec::new(),
            current_idx: None,
            resume_idx,
        }
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    fn pick(&self, pool_len: usize, rng: &mut dyn RngCore) -> usize {
        let mut idx = rng.gen_range(0..pool_len);
        if pool_len > 1 {
            while Some(idx) == self.current_idx {
                idx = rng.gen_range(0..pool_len);
            }
        }
        idx
    }

    fn hide_words(&mut self, level: u32, rng: &mut dyn RngCore) {
        let candidates: Vec<usize> = self
            .tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| is_hideable(t))
            .map(|(i, _)| i)
            .collect();
        let amount = hidden_count(candidates.len(), level);
        let mut hidden: Vec<usize> = index::sample(rng, candidates.len(), amount)
            .into_iter()
            .map(|n| candidates[n])
            .collect();
        hidden.sort_unstable();
        self.hidden = hidden;
    }

    fn word_for_display(
        &self,
        idx: usize,
        token: &str,
        settings: &ChallengeSettings,
        reveal: bool,
    ) -> (String, Tone) {
        if reveal || self.hidden.binary_search(&idx).is_err() {
            return (token.to_string(), Tone::Plain);
        }
        let word = strip_punctuation(token);
        let masked = match word.chars().next() {
            Some(first) if settings.show_first_letter && word.chars().count() > 2 => {
                let rest: String = word.chars().skip(1).collect();
                format!("{first}{}", mask(&rest))
            }
            _ => mask(&word),
        };
        (masked, Tone::Masked)
    }
}

impl ChallengeGenerator for QuotesGenerator {
    fn kind(&self) -> ChallengeKind {
        ChallengeKind::Quotes
    }

    fn new_challenge(
        &mut self,
        settings: &mut ChallengeSettings,
        rng: &mut dyn RngCore,
        regenerate: bool,
    ) -> Result<(), ChallengeError> {
        let source = if settings.quotes_path.trim().is_empty() {
            self.default_source.clone()
        } else {
            Some(expand_home(&settings.quotes_path))
        };
        self.bank.set_source(source);

        let resume = self.resume_idx.take();
        if !regenerate && resume.is_none() && !self.tokens.is_empty() {
            return Ok(());
        }

        let words_max = if settings.level <= 2 {
            settings.words_max.min(EARLY_WORDS_MAX)
        } else {
            settings.words_max
        };
        let quotes = self.bank.quotes();
        if quotes.is_empty() {
            return Err(ChallengeError::EmptyQuotePool { words_max });
        }
        let mut pool: Vec<&String> = quotes
            .iter()
            .filter(|q| word_count(q) <= words_max as usize)
            .collect();
        if pool.is_empty() {
            let shortest = quotes.iter().map(|q| word_count(q)).min().unwrap_or(0);
            warn!(
                target: "mmm::generator",
                words_max,
                shortest,
                "no quote fits words_max, using the shortest quotes"
            );
            pool = quotes.iter().filter(|q| word_count(q) == shortest).collect();
        }

        let idx = match resume {
            Some(idx) if idx < pool.len() => idx,
            _ => self.pick(pool.len(), rng),
        };

        let (body, author) = split_author(pool[idx]);
        self.tokens = split_body(&body);
        self.author = author;
        self.current_idx = Some(idx);
        settings.last_quote_idx = idx;
        self.hide_words(settings.level, rng);

        debug!(target: "mmm::generator", idx, pool = pool.len(), hidden = ?self.hidden, "quote");
        Ok(())
    }

    fn items(&self) -> &[String] {
        &self.tokens
    }

    fn hidden_positions(&self) -> &[usize] {
        &self.hidden
    }

    fn format_challenge_for_display(
        &self,
        settings: &ChallengeSettings,
        reveal: bool,
    ) -> StyledText {
        let mut text = StyledText::new();
        let end = self
            .tokens
            .iter()
            .rposition(|t| t.as_str() != BREAK)
            .map_or(0, |i| i + 1);

        let mut need_space = false;
        for (idx, token) in self.tokens[..end].iter().enumerate() {
            if token.as_str() == BREAK {
                text.push(BREAK, Tone::Plain);
                need_space = false;
                continue;
            }
            if need_space {
                text.push(" ", Tone::Plain);
            }
            let (word, tone) = self.word_for_display(idx, token, settings, reveal);
            text.push(word, tone);
            need_space = true;
        }

        if self.author.contains('(') {
            text.push(" ", Tone::Plain);
        } else {
            text.push("\n\n", Tone::Plain);
        }
        text.push(self.author.as_str(), Tone::Attribution);
        text
    }

    fn generate_answer(&self) -> Result<String, ChallengeError> {
        Ok(self
            .hidden
            .iter()
            .filter_map(|&i| self.tokens.get(i))
            .map(|t| strip_punctuation(t))
            .collect::<Vec<_>>()
            .join(" "))
    }

    fn format_answer_for_display(
        &self,
        settings: &ChallengeSettings,
    ) -> Result<StyledText, ChallengeError> {
        Ok(self.format_challenge_for_display(settings, true))
    }

    fn match_mode(&self) -> MatchMode {
        MatchMode::Text
    }

    fn has_memorize_phase(&self) -> bool {
        false
    }

    fn reload(&mut self) {
        self.bank.invalidate();
    }

    fn reopen(&mut self, settings: &ChallengeSettings) {
        self.resume_idx = Some(settings.last_quote_idx);
    }
}
