//! Intent Router
//!
//! Decides what a message means for the session:
//! - An active intent is sticky: follow-up messages continue the flow
//! - Help words reset the session, greeting words only say hello
//! - With no active intent, keyword containment picks a flow by precedence

use crate::extractor::contains_any_word;
use crate::models::Intent;

/// Outcome of routing one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Keep feeding the active flow.
    Continue(Intent),
    /// A new flow was detected.
    Start(Intent),
    /// Hard reset followed by the capabilities overview.
    Help,
    /// Static greeting; session state is left alone.
    Greeting,
    /// Nothing matched: show the catalog of example prompts.
    Catalog,
}

impl Route {
    pub fn intent(&self) -> Option<Intent> {
        match self {
            Route::Continue(intent) | Route::Start(intent) => Some(*intent),
            _ => None,
        }
    }
}

/// Static keyword lists, in precedence order
const INTENT_KEYWORDS: &[(Intent, &[&str])] = &[
    (Intent::Credit, &["credit", "loan", "borrow"]),
    (Intent::AssetTokenization, &["rwa", "tokenize", "property", "asset"]),
    (Intent::PrivateTrade, &["trade", "swap", "exchange"]),
    (Intent::PortfolioAutomation, &["automat", "optimize", "manage"]),
];

const HELP_TRIGGERS: &[&str] = &["help", "what", "how", "capabilities"];

const GREETING_TRIGGERS: &[&str] = &["hi", "hello", "hey"];

/// Phrase rewrites applied before keyword matching
const NORMALIZATIONS: &[(&str, &str)] = &[("do borrow", "borrow"), ("to borrow", "borrow")];

/// Keyword-based intent router
pub struct IntentClassifier;

impl IntentClassifier {
    /// Route a message given the session's current intent
    pub fn route(text: &str, current: Option<Intent>) -> Route {
        if let Some(intent) = current {
            if is_help(text) {
                return Route::Help;
            }
            if is_greeting(text) {
                return Route::Greeting;
            }
            return Route::Continue(intent);
        }

        if let Some(intent) = Self::detect(text) {
            Route::Start(intent)
        } else if is_help(text) {
            Route::Help
        } else if is_greeting(text) {
            Route::Greeting
        } else {
            Route::Catalog
        }
    }

    /// First intent whose keywords appear in the normalized text
    pub fn detect(text: &str) -> Option<Intent> {
        let normalized = normalize(text);

        INTENT_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| normalized.contains(kw)))
            .map(|(intent, _)| *intent)
    }
}

fn normalize(text: &str) -> String {
    NORMALIZATIONS
        .iter()
        .fold(text.to_lowercase(), |acc, (from, to)| acc.replace(from, to))
}

fn is_help(text: &str) -> bool {
    contains_any_word(text, HELP_TRIGGERS)
}

fn is_greeting(text: &str) -> bool {
    contains_any_word(text, GREETING_TRIGGERS)
}
