//! Portfolio automation flow: portfolio value → strategy.

use super::{Completion, Field, FlowSlots, Turn};
use crate::extractor::contains_any_word;
use crate::models::Strategy;
use crate::responses::{checklist, group_thousands, status_line};

const STRATEGY_WORDS: &[(Strategy, &[&str])] = &[
    (Strategy::Yield, &["yield", "farming", "farm"]),
    (Strategy::Balanced, &["balanced", "moderate"]),
    (Strategy::Aggressive, &["aggressive", "growth", "risky"]),
    (Strategy::Conservative, &["conservative", "safe", "stable"]),
];

pub fn detect_strategy(text: &str) -> Option<Strategy> {
    STRATEGY_WORDS
        .iter()
        .find(|(_, words)| contains_any_word(text, words))
        .map(|(strategy, _)| *strategy)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutomationField {
    PortfolioValue,
    Strategy,
}

impl Field for AutomationField {
    fn step_tag(&self) -> &'static str {
        match self {
            AutomationField::PortfolioValue => "collect_portfolio_value",
            AutomationField::Strategy => "collect_strategy",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutomationSlots {
    pub portfolio_value: Option<u64>,
    pub strategy: Option<Strategy>,
}

impl AutomationSlots {
    fn status(&self) -> Vec<String> {
        vec![
            status_line(
                "Portfolio value",
                self.portfolio_value.map(|v| format!("${}", group_thousands(v))),
            ),
            status_line("Strategy", self.strategy.map(|s| s.to_string())),
        ]
    }

    fn question(field: AutomationField) -> &'static str {
        match field {
            AutomationField::PortfolioValue => "What is your portfolio value in USD?",
            AutomationField::Strategy => {
                "Which strategy would you like? (Yield, Balanced, Aggressive or Conservative)"
            }
        }
    }
}

impl FlowSlots for AutomationSlots {
    type Field = AutomationField;

    const FIELDS: &'static [AutomationField] =
        &[AutomationField::PortfolioValue, AutomationField::Strategy];

    fn is_filled(&self, field: AutomationField) -> bool {
        match field {
            AutomationField::PortfolioValue => self.portfolio_value.is_some(),
            AutomationField::Strategy => self.strategy.is_some(),
        }
    }

    fn try_fill(&mut self, field: AutomationField, turn: &Turn<'_>, _current: bool) -> bool {
        match field {
            AutomationField::PortfolioValue => {
                self.portfolio_value = turn.entities.first_amount();
                self.portfolio_value.is_some()
            }
            AutomationField::Strategy => {
                self.strategy = detect_strategy(turn.text);
                self.strategy.is_some()
            }
        }
    }

    fn intro(&self) -> String {
        "🤖 I can automatically optimize your portfolio!\n\n\
         I'll need:\n\
         - Portfolio value\n\
         - Strategy (Yield, Balanced, Aggressive or Conservative)\n\n\
         I'll monitor markets 24/7 and rebalance for best yields. \
         What is your portfolio value in USD?"
            .to_string()
    }

    fn ask(&self, field: AutomationField) -> String {
        let captured: Vec<String> = self
            .status()
            .into_iter()
            .filter(|line| line.ends_with('✅'))
            .collect();
        format!("{}\n\n{}", captured.join("\n"), Self::question(field))
    }

    fn clarify(&self, field: AutomationField) -> String {
        checklist(&self.status(), Self::question(field))
    }

    fn processing(&self) -> String {
        format!(
            "✅ Setting up your automation:\n\n{}\n\n\
             📊 Computing optimal allocation...\n\n\
             Reply to confirm and I'll activate the strategy.",
            self.status().join("\n")
        )
    }

    fn completion(&self) -> Option<Completion> {
        Some(Completion::Automation {
            portfolio_value: self.portfolio_value?,
            strategy: self.strategy?,
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
    fn test_strategy_detection() {
        assert_eq!(detect_strategy("yield farming please"), Some(Strategy::Yield));
        assert_eq!(detect_strategy("keep it Balanced"), Some(Strategy::Balanced));
        assert_eq!(detect_strategy("go aggressive"), Some(Strategy::Aggressive));
        assert_eq!(detect_strategy("something safe"), Some(Strategy::Conservative));
        // "rebalance" is not "balanced"
        assert_eq!(detect_strategy("rebalance weekly"), None);
    }

    #[test]
    fn test_value_then_strategy() {
        let mut flow = Flow::start(Intent::PortfolioAutomation);
        prompt(send(&mut flow, "automate my portfolio"));
        assert_eq!(flow.step(), "collect_portfolio_value");

        let ask = prompt(send(&mut flow, "25000"));
        assert_eq!(flow.step(), "collect_strategy");
        assert!(ask.contains("$25,000"));

        let reply = send(&mut flow, "conservative");
        assert_eq!(
            reply,
            Reply::Completed(Completion::Automation {
                portfolio_value: 25000,
                strategy: Strategy::Conservative,
            })
        );
    }

    #[test]
    fn test_fast_path() {
        let mut flow = Flow::start(Intent::PortfolioAutomation);
        prompt(send(&mut flow, "optimize 10000 with yield farming"));
        assert_eq!(flow.step(), "processing");
    }
}
