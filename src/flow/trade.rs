//! Private (dark pool) trade flow: amount → sell token → buy token.

use super::{Completion, Field, FlowSlots, Turn};
use crate::models::Token;
use crate::responses::{checklist, status_line};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeField {
    Amount,
    SellToken,
    BuyToken,
}

impl Field for TradeField {
    fn step_tag(&self) -> &'static str {
        match self {
            TradeField::Amount => "collect_amount",
            TradeField::SellToken => "collect_sell_token",
            TradeField::BuyToken => "collect_buy_token",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradeSlots {
    pub amount: Option<u64>,
    pub sell_token: Option<Token>,
    pub buy_token: Option<Token>,
}

impl TradeSlots {
    fn status(&self) -> Vec<String> {
        vec![
            status_line("Amount to sell", self.amount.map(|a| a.to_string())),
            status_line("Sell token", self.sell_token.map(|t| t.to_string())),
            status_line("Buy token", self.buy_token.map(|t| t.to_string())),
        ]
    }

    fn question(&self, field: TradeField) -> String {
        match field {
            TradeField::Amount => match self.sell_token {
                Some(token) => format!("How much {} would you like to sell?", token),
                None => "How much would you like to sell?".to_string(),
            },
            TradeField::SellToken => "Which token are you selling? (e.g., SOL, ETH, BTC)".to_string(),
            TradeField::BuyToken => "Which token would you like to receive? (e.g., USDC, USDT)".to_string(),
        }
    }
}

impl FlowSlots for TradeSlots {
    type Field = TradeField;

    const FIELDS: &'static [TradeField] = &[TradeField::Amount, TradeField::SellToken, TradeField::BuyToken];

    fn is_filled(&self, field: TradeField) -> bool {
        match field {
            TradeField::Amount => self.amount.is_some(),
            TradeField::SellToken => self.sell_token.is_some(),
            TradeField::BuyToken => self.buy_token.is_some(),
        }
    }

    fn try_fill(&mut self, field: TradeField, turn: &Turn<'_>, _current: bool) -> bool {
        match field {
            TradeField::Amount => {
                self.amount = turn.entities.first_amount();
                self.amount.is_some()
            }
            TradeField::SellToken => {
                self.sell_token = turn.entities.first_token();
                self.sell_token.is_some()
            }
            // the buy side must differ from the sell side
            TradeField::BuyToken => {
                let Some(sell) = self.sell_token else {
                    return false;
                };
                self.buy_token = turn.entities.tokens.iter().copied().find(|t| *t != sell);
                self.buy_token.is_some()
            }
        }
    }

    fn intro(&self) -> String {
        "🌑 I can help you trade privately in a dark pool!\n\n\
         I'll need:\n\
         - Amount to sell\n\
         - Tokens (from/to)\n\n\
         Your order will be matched privately without moving the market. \
         How much would you like to sell?"
            .to_string()
    }

    fn ask(&self, field: TradeField) -> String {
        let captured: Vec<String> = self
            .status()
            .into_iter()
            .filter(|line| line.ends_with('✅'))
            .collect();
        format!("{}\n\n{}", captured.join("\n"), self.question(field))
    }

    fn clarify(&self, field: TradeField) -> String {
        checklist(&self.status(), &self.question(field))
    }

    fn processing(&self) -> String {
        format!(
            "✅ Processing your private order:\n\n{}\n\n\
             🔍 Searching the dark pool for a counterparty...\n\n\
             Reply to confirm and I'll execute the match.",
            self.status().join("\n")
        )
    }

    fn completion(&self) -> Option<Completion> {
        Some(Completion::Trade {
            amount: self.amount?,
            sell: self.sell_token?,
            buy: self.buy_token?,
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
    fn test_single_message_order() {
        let mut flow = Flow::start(Intent::PrivateTrade);
        let text = prompt(send(&mut flow, "swap 10 SOL for USDC"));
        assert_eq!(flow.step(), "processing");
        assert!(text.contains("Sell token: SOL"));
        assert!(text.contains("Buy token: USDC"));
    }

    #[test]
    fn test_tokens_then_amount() {
        let mut flow = Flow::start(Intent::PrivateTrade);
        let text = prompt(send(&mut flow, "trade ETH to BTC"));
        assert_eq!(flow.step(), "collect_amount");
        assert!(text.contains("How much ETH"));

        let reply = send(&mut flow, "3");
        assert_eq!(
            reply,
            Reply::Completed(Completion::Trade {
                amount: 3,
                sell: Token::Eth,
                buy: Token::Btc,
            })
        );
    }

    #[test]
    fn test_buy_token_must_differ() {
        let mut flow = Flow::start(Intent::PrivateTrade);
        send(&mut flow, "exchange 50 SOL");
        assert_eq!(flow.step(), "collect_buy_token");

        prompt(send(&mut flow, "SOL"));
        assert_eq!(flow.step(), "collect_buy_token");

        let reply = send(&mut flow, "USDT");
        assert!(matches!(reply, Reply::Completed(Completion::Trade { buy: Token::Usdt, .. })));
    }
}
