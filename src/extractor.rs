//! Entity Extractor
//!
//! Pulls candidate amounts and known token symbols out of free-form text.
//! Pure functions: the same input always yields the same entities.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::Token;

lazy_static! {
    static ref AMOUNT_PATTERN: Regex = Regex::new(r"[0-9]+").expect("amount pattern is valid");
}

/// Entities found in a single message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entities {
    /// Positive integers in order of appearance. The first one wins.
    pub amounts: Vec<u64>,
    /// Recognised tokens, deduplicated, in order of first appearance.
    pub tokens: Vec<Token>,
}

impl Entities {
    pub fn extract(text: &str) -> Self {
        Self {
            amounts: extract_amounts(text),
            tokens: extract_tokens(text),
        }
    }

    pub fn first_amount(&self) -> Option<u64> {
        self.amounts.first().copied()
    }

    pub fn first_token(&self) -> Option<Token> {
        self.tokens.first().copied()
    }
}

/// ASCII digit runs parsed as integers; zero and overflowing runs are dropped.
pub fn extract_amounts(text: &str) -> Vec<u64> {
    AMOUNT_PATTERN
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<u64>().ok())
        .filter(|n| *n > 0)
        .collect()
}

/// Case-insensitive substring search over the fixed token vocabulary.
pub fn extract_tokens(text: &str) -> Vec<Token> {
    let lowered = text.to_lowercase();

    let mut found: Vec<(usize, Token)> = Token::VOCABULARY
        .iter()
        .filter_map(|token| {
            lowered
                .find(&token.symbol().to_lowercase())
                .map(|position| (position, *token))
        })
        .collect();

    found.sort_by_key(|(position, _)| *position);
    found.into_iter().map(|(_, token)| token).collect()
}

/// Lowercased alphanumeric words, for whole-word trigger matching.
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

pub fn contains_any_word(text: &str, vocabulary: &[&str]) -> bool {
    words(text).any(|w| vocabulary.contains(&w.as_str()))
}
