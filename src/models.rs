//! Core data models for the DeFi assistant

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::flow::Flow;

//
// ================= Enums =================
//

/// High-level goal of a chat flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Intent {
    #[serde(rename = "credit")]
    Credit,
    #[serde(rename = "rwa")]
    AssetTokenization,
    #[serde(rename = "trade")]
    PrivateTrade,
    #[serde(rename = "automation")]
    PortfolioAutomation,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Credit => "credit",
            Intent::AssetTokenization => "rwa",
            Intent::PrivateTrade => "trade",
            Intent::PortfolioAutomation => "automation",
        }
    }
}

/// Token symbols the assistant recognises in free text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Token {
    Usdc,
    Sol,
    Eth,
    Usdt,
    Btc,
}

impl Token {
    /// Fixed recognition vocabulary.
    pub const VOCABULARY: [Token; 5] = [Token::Usdc, Token::Sol, Token::Eth, Token::Usdt, Token::Btc];

    pub fn symbol(&self) -> &'static str {
        match self {
            Token::Usdc => "USDC",
            Token::Sol => "SOL",
            Token::Eth => "ETH",
            Token::Usdt => "USDT",
            Token::Btc => "BTC",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Residential,
    Commercial,
    Land,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Yield,
    Balanced,
    Aggressive,
    Conservative,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Yield,
        Strategy::Balanced,
        Strategy::Aggressive,
        Strategy::Conservative,
    ];
}

//
// ================= Chat I/O =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    #[serde(alias = "agent")]
    Assistant,
    System,
}

/// A prior turn supplied by the caller. Accepted for interface
/// compatibility; the state machine never replays it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, alias = "prior_turns")]
    pub previous_messages: Vec<ChatTurn>,
}

impl ChatRequest {
    pub fn new(user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            user_id: Some(user_id.into()),
            previous_messages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub response: String,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
}

//
// ================= Session =================
//

/// Per-user conversation state held between turns.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub user_id: String,
    /// Active flow; its variant is the session intent.
    pub flow: Option<Flow>,
    /// Raw inputs, append-only. Diagnostics only.
    pub message_history: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id: user_id.into(),
            flow: None,
            message_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn intent(&self) -> Option<Intent> {
        self.flow.as_ref().map(Flow::intent)
    }

    pub fn step(&self) -> &'static str {
        self.flow.as_ref().map(Flow::step).unwrap_or("initial")
    }

    pub fn record_message(&mut self, message: &str) {
        self.message_history.push(message.to_string());
        self.updated_at = Utc::now();
    }

    /// Drop the active flow together with every collected slot.
    pub fn reset(&mut self) {
        self.flow = None;
        self.updated_at = Utc::now();
    }
}

/// Read-only view of a session for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    pub user_id: String,
    pub intent: Option<Intent>,
    pub step: String,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&SessionContext> for SessionSnapshot {
    fn from(ctx: &SessionContext) -> Self {
        Self {
            user_id: ctx.user_id.clone(),
            intent: ctx.intent(),
            step: ctx.step().to_string(),
            message_count: ctx.message_history.len(),
            created_at: ctx.created_at,
            updated_at: ctx.updated_at,
        }
    }
}

//
// ================= Display =================
//

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PropertyType::Residential => "Residential",
            PropertyType::Commercial => "Commercial",
            PropertyType::Land => "Land",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Strategy::Yield => "Yield Farming",
            Strategy::Balanced => "Balanced",
            Strategy::Aggressive => "Aggressive",
            Strategy::Conservative => "Conservative",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_wire_names() {
        let json = serde_json::to_string(&Intent::AssetTokenization).unwrap();
        assert_eq!(json, "\"rwa\"");

        let parsed: Intent = serde_json::from_str("\"automation\"").unwrap();
        assert_eq!(parsed, Intent::PortfolioAutomation);
    }

    #[test]
    fn test_response_omits_missing_intent() {
        let response = ChatResponse {
            response: "hello".to_string(),
            user_id: "u1".to_string(),
            intent: None,
        };
        let value = serde_json::to_value(&response).unwrap();
        assert!(value.get("intent").is_none());
    }

    #[test]
    fn test_request_accepts_prior_turns_alias() {
        let request: ChatRequest = serde_json::from_str(
            r#"{"message":"hi","prior_turns":[{"role":"agent","content":"hello"}]}"#,
        )
        .unwrap();
        assert!(request.user_id.is_none());
        assert_eq!(request.previous_messages.len(), 1);
        assert_eq!(request.previous_messages[0].role, MessageRole::Assistant);
    }

    #[test]
    fn test_fresh_session_is_idle() {
        let ctx = SessionContext::new("u1");
        assert_eq!(ctx.intent(), None);
        assert_eq!(ctx.step(), "initial");
        assert!(ctx.message_history.is_empty());
    }
}
