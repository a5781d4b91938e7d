//! Flow State Machine
//!
//! One machine per intent. Every flow walks the same shape:
//!
//! initial → collect_<field>... → processing → completed
//!
//! Transitions are pure: they read the extracted entities, fill empty
//! slots and produce a [`Reply`]. Completion numbers that involve
//! randomness or the clock are rendered later by [`crate::quote`].

use std::fmt::Debug;

use crate::extractor::Entities;
use crate::models::{Intent, PropertyType, Strategy, Token};
use crate::responses;

pub mod automation;
pub mod credit;
pub mod tokenization;
pub mod trade;

pub use automation::{AutomationField, AutomationSlots};
pub use credit::{CreditField, CreditSlots};
pub use tokenization::{TokenizationField, TokenizationSlots};
pub use trade::{TradeField, TradeSlots};

/// One inbound message, as seen by a flow.
#[derive(Debug, Clone, Copy)]
pub struct Turn<'a> {
    pub text: &'a str,
    pub entities: &'a Entities,
}

impl<'a> Turn<'a> {
    pub fn new(text: &'a str, entities: &'a Entities) -> Self {
        Self { text, entities }
    }
}

/// What a transition produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Scripted text, ready to send.
    Prompt(String),
    /// The flow finished; derived values still need to be quoted.
    Completed(Completion),
}

/// Collected slots of a finished flow.
#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Credit {
        amount: u64,
        collateral: Token,
    },
    Tokenization {
        property_type: PropertyType,
        value: u64,
        location: String,
    },
    Trade {
        amount: u64,
        sell: Token,
        buy: Token,
    },
    Automation {
        portfolio_value: u64,
        strategy: Strategy,
    },
}

/// Position within a flow's fixed step sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage<F> {
    Initial,
    Collect(F),
    Processing,
    Completed,
}

/// A slot that must be filled before the flow can complete.
pub trait Field: Copy + Eq + Debug + 'static {
    /// Step tag of the `collect_<field>` step.
    fn step_tag(&self) -> &'static str;
}

/// Slot set of one intent: how to fill it and what to say.
pub trait FlowSlots: Clone + Debug + Default + PartialEq {
    type Field: Field;

    /// Collection order.
    const FIELDS: &'static [Self::Field];

    fn is_filled(&self, field: Self::Field) -> bool;

    /// Fill `field` from the turn. `current` is true when the flow is
    /// sitting on that field's collect step.
    fn try_fill(&mut self, field: Self::Field, turn: &Turn<'_>, current: bool) -> bool;

    /// Opening prompt when the first message carried nothing usable.
    fn intro(&self) -> String;

    /// Ask for `field`, acknowledging what was captured so far.
    fn ask(&self, field: Self::Field) -> String;

    /// Re-prompt after a message that filled nothing.
    fn clarify(&self, field: Self::Field) -> String;

    /// Acknowledgement when one message satisfied every slot.
    fn processing(&self) -> String;

    fn completion(&self) -> Option<Completion>;
}

/// Generic step machine over a slot set.
#[derive(Debug, Clone, PartialEq)]
pub struct Machine<S: FlowSlots> {
    stage: Stage<S::Field>,
    slots: S,
}

impl<S: FlowSlots> Default for Machine<S> {
    fn default() -> Self {
        Self {
            stage: Stage::Initial,
            slots: S::default(),
        }
    }
}

impl<S: FlowSlots> Machine<S> {
    pub fn stage(&self) -> Stage<S::Field> {
        self.stage
    }

    pub fn slots(&self) -> &S {
        &self.slots
    }

    pub fn step_tag(&self) -> &'static str {
        match self.stage {
            Stage::Initial => "initial",
            Stage::Collect(field) => field.step_tag(),
            Stage::Processing => "processing",
            Stage::Completed => "completed",
        }
    }

    pub fn advance(&mut self, turn: &Turn<'_>) -> Reply {
        match self.stage {
            Stage::Initial => {
                let filled = self.fill(turn, None);
                match self.first_missing() {
                    None => {
                        self.stage = Stage::Processing;
                        Reply::Prompt(self.slots.processing())
                    }
                    Some(field) => {
                        self.stage = Stage::Collect(field);
                        if filled {
                            Reply::Prompt(self.slots.ask(field))
                        } else {
                            Reply::Prompt(self.slots.intro())
                        }
                    }
                }
            }
            Stage::Collect(current) => {
                if !self.fill(turn, Some(current)) {
                    return Reply::Prompt(self.slots.clarify(current));
                }
                match self.first_missing() {
                    None => self.complete(),
                    Some(field) => {
                        self.stage = Stage::Collect(field);
                        Reply::Prompt(self.slots.ask(field))
                    }
                }
            }
            Stage::Processing => self.complete(),
            // the assistant releases a finished flow; only direct callers get here
            Stage::Completed => Reply::Prompt(responses::catalog()),
        }
    }

    /// Fill every empty slot the turn can satisfy. Filled slots are never overwritten.
    fn fill(&mut self, turn: &Turn<'_>, current: Option<S::Field>) -> bool {
        let mut filled = false;
        for field in S::FIELDS {
            if !self.slots.is_filled(*field)
                && self.slots.try_fill(*field, turn, current == Some(*field))
            {
                filled = true;
            }
        }
        filled
    }

    fn first_missing(&self) -> Option<S::Field> {
        S::FIELDS
            .iter()
            .copied()
            .find(|field| !self.slots.is_filled(*field))
    }

    fn complete(&mut self) -> Reply {
        match self.slots.completion() {
            Some(completion) => {
                self.stage = Stage::Completed;
                Reply::Completed(completion)
            }
            None => {
                let field = self.first_missing().unwrap_or(S::FIELDS[0]);
                self.stage = Stage::Collect(field);
                Reply::Prompt(self.slots.clarify(field))
            }
        }
    }
}

/// Active flow of a session. The variant is the session intent.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Credit(Machine<CreditSlots>),
    Tokenization(Machine<TokenizationSlots>),
    Trade(Machine<TradeSlots>),
    Automation(Machine<AutomationSlots>),
}

impl Flow {
    pub fn start(intent: Intent) -> Self {
        match intent {
            Intent::Credit => Flow::Credit(Machine::default()),
            Intent::AssetTokenization => Flow::Tokenization(Machine::default()),
            Intent::PrivateTrade => Flow::Trade(Machine::default()),
            Intent::PortfolioAutomation => Flow::Automation(Machine::default()),
        }
    }

    pub fn intent(&self) -> Intent {
        match self {
            Flow::Credit(_) => Intent::Credit,
            Flow::Tokenization(_) => Intent::AssetTokenization,
            Flow::Trade(_) => Intent::PrivateTrade,
            Flow::Automation(_) => Intent::PortfolioAutomation,
        }
    }

    pub fn step(&self) -> &'static str {
        match self {
            Flow::Credit(m) => m.step_tag(),
            Flow::Tokenization(m) => m.step_tag(),
            Flow::Trade(m) => m.step_tag(),
            Flow::Automation(m) => m.step_tag(),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.step() == "completed"
    }

    pub fn advance(&mut self, turn: &Turn<'_>) -> Reply {
        match self {
            Flow::Credit(m) => m.advance(turn),
            Flow::Tokenization(m) => m.advance(turn),
            Flow::Trade(m) => m.advance(turn),
            Flow::Automation(m) => m.advance(turn),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::send;
    use super::*;

    #[test]
    fn test_start_sets_intent_and_initial_step() {
        for intent in [
            Intent::Credit,
            Intent::AssetTokenization,
            Intent::PrivateTrade,
            Intent::PortfolioAutomation,
        ] {
            let flow = Flow::start(intent);
            assert_eq!(flow.intent(), intent);
            assert_eq!(flow.step(), "initial");
            assert!(!flow.is_completed());
        }
    }

    #[test]
    fn test_processing_completes_on_any_next_message() {
        let mut flow = Flow::start(Intent::Credit);
        send(&mut flow, "borrow 1000 USDC");
        assert_eq!(flow.step(), "processing");

        let reply = send(&mut flow, "ok");
        assert_eq!(
            reply,
            Reply::Completed(Completion::Credit {
                amount: 1000,
                collateral: Token::Usdc,
            })
        );
        assert!(flow.is_completed());
    }

    #[test]
    fn test_field_table_matches_collect_steps() {
        let tags: Vec<&str> = TokenizationSlots::FIELDS.iter().map(Field::step_tag).collect();
        assert_eq!(
            tags,
            vec!["collect_property_type", "collect_value", "collect_location"]
        );
    }

    #[test]
    fn test_completed_flow_answers_with_catalog() {
        let mut flow = Flow::start(Intent::Credit);
        send(&mut flow, "borrow 1000 USDC");
        send(&mut flow, "yes");

        let reply = send(&mut flow, "again?");
        assert_eq!(reply, Reply::Prompt(responses::catalog()));
        assert!(flow.is_completed());
    }
}
