//! Credit flow: amount (USDC) → collateral token.

use super::{Completion, Field, FlowSlots, Turn};
use crate::models::Token;
use crate::responses::{checklist, status_line};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditField {
    Amount,
    Collateral,
}

impl Field for CreditField {
    fn step_tag(&self) -> &'static str {
        match self {
            CreditField::Amount => "collect_amount",
            CreditField::Collateral => "collect_collateral",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreditSlots {
    pub amount: Option<u64>,
    pub collateral: Option<Token>,
}

impl CreditSlots {
    fn status(&self) -> Vec<String> {
        vec![
            status_line("Amount", self.amount.map(|a| format!("{} USDC", a))),
            status_line("Collateral", self.collateral.map(|t| t.to_string())),
        ]
    }
}

impl FlowSlots for CreditSlots {
    type Field = CreditField;

    const FIELDS: &'static [CreditField] = &[CreditField::Amount, CreditField::Collateral];

    fn is_filled(&self, field: CreditField) -> bool {
        match field {
            CreditField::Amount => self.amount.is_some(),
            CreditField::Collateral => self.collateral.is_some(),
        }
    }

    fn try_fill(&mut self, field: CreditField, turn: &Turn<'_>, _current: bool) -> bool {
        match field {
            CreditField::Amount => {
                self.amount = turn.entities.first_amount();
                self.amount.is_some()
            }
            CreditField::Collateral => {
                self.collateral = turn.entities.first_token();
                self.collateral.is_some()
            }
        }
    }

    fn intro(&self) -> String {
        "💳 I can help you get a private DeFi loan!\n\n\
         I'll need:\n\
         - Amount (USDC)\n\
         - Collateral type\n\n\
         Your credit score will be calculated privately. How much would you like to borrow?"
            .to_string()
    }

    fn ask(&self, field: CreditField) -> String {
        match (field, self.amount, self.collateral) {
            (CreditField::Collateral, Some(amount), _) => format!(
                "✅ Amount: {} USDC\n\nWhat collateral would you like to use?\n(e.g., SOL, ETH, USDC)",
                amount
            ),
            (CreditField::Amount, _, Some(collateral)) => format!(
                "✅ Collateral: {}\n\nHow much USDC would you like to borrow?",
                collateral
            ),
            _ => self.intro(),
        }
    }

    fn clarify(&self, _field: CreditField) -> String {
        checklist(&self.status(), "Could you specify what's missing?")
    }

    fn processing(&self) -> String {
        let amount = self.amount.map(|a| a.to_string()).unwrap_or_default();
        let collateral = self.collateral.map(|t| t.to_string()).unwrap_or_default();
        format!(
            "✅ Perfect! Processing your credit request:\n\n\
             💰 Amount: {} USDC\n\
             🔒 Collateral: {}\n\n\
             🔍 Checking credit policy...\n\
             📊 Calculating credit score...\n\n\
             Reply to confirm and I'll finalize your loan terms.",
            amount, collateral
        )
    }

    fn completion(&self) -> Option<Completion> {
        Some(Completion::Credit {
            amount: self.amount?,
            collateral: self.collateral?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::test_support::{prompt, send};
    use crate::flow::{Flow, Reply};
    use crate::models::Intent;

    #[test]
    fn test_fast_path_jumps_to_processing() {
        let mut flow = Flow::start(Intent::Credit);
        let text = prompt(send(&mut flow, "I want to borrow 1000 USDC"));

        assert_eq!(flow.step(), "processing");
        assert!(text.contains("1000"));
        assert!(text.contains("USDC"));
    }

    #[test]
    fn test_step_by_step_completion() {
        let mut flow = Flow::start(Intent::Credit);

        let intro = prompt(send(&mut flow, "I need a loan"));
        assert!(intro.contains("How much"));
        assert_eq!(flow.step(), "collect_amount");

        let ask = prompt(send(&mut flow, "2500"));
        assert!(ask.contains("2500 USDC"));
        assert_eq!(flow.step(), "collect_collateral");

        let reply = send(&mut flow, "SOL please");
        assert_eq!(
            reply,
            Reply::Completed(Completion::Credit {
                amount: 2500,
                collateral: Token::Sol,
            })
        );
        assert_eq!(flow.step(), "completed");
    }

    #[test]
    fn test_missing_value_reprompts_in_place() {
        let mut flow = Flow::start(Intent::Credit);
        send(&mut flow, "loan");
        send(&mut flow, "750");

        let text = prompt(send(&mut flow, "not sure yet"));
        assert_eq!(flow.step(), "collect_collateral");
        assert!(text.contains("750 USDC ✅"));
        assert!(text.contains("Collateral: ❓ Not provided yet"));
    }

    #[test]
    fn test_filled_amount_is_not_overwritten() {
        let mut flow = Flow::start(Intent::Credit);
        send(&mut flow, "borrow 400");
        let reply = send(&mut flow, "999 ETH");

        assert_eq!(
            reply,
            Reply::Completed(Completion::Credit {
                amount: 400,
                collateral: Token::Eth,
            })
        );
    }

    #[test]
    fn test_collateral_first_then_amount() {
        let mut flow = Flow::start(Intent::Credit);
        let text = prompt(send(&mut flow, "credit against my ETH"));
        assert_eq!(flow.step(), "collect_amount");
        assert!(text.contains("Collateral: ETH"));
    }
}
