//! DeFi Assistant
//!
//! A rule-based chat assistant that walks users through four
//! privacy-preserving DeFi flows:
//! - private credit (loan against collateral)
//! - real-world asset tokenization
//! - private trade matching
//! - portfolio automation
//!
//! Each flow is a small slot-filling state machine keyed per user.
//! Replies are templated; quotes are derived from the collected slots.
//!
//! TURN LOOP:
//! INPUT → EXTRACT → ROUTE → ADVANCE FLOW → QUOTE → REPLY

pub mod agent;
pub mod api;
pub mod backend;
pub mod classifier;
pub mod config;
pub mod error;
pub mod extractor;
pub mod flow;
pub mod models;
pub mod quote;
pub mod responses;
pub mod state;

pub use error::Result;

// Re-export common types
pub use agent::MockAssistant;
pub use classifier::{IntentClassifier, Route};
pub use models::*;
