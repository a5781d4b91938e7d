//! Completion quotes
//!
//! Turns a finished flow into its final scripted answer. Randomness and
//! the clock are injected so tests can pin every number.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::{Arc, Mutex};

use crate::flow::Completion;
use crate::models::{PropertyType, Strategy, Token};
use crate::responses::group_thousands;

pub const CREDIT_RATE_MIN: f64 = 3.5;
pub const CREDIT_RATE_MAX: f64 = 5.5;
pub const LOAN_TO_VALUE: f64 = 0.75;
pub const TOKEN_SUPPLY: u64 = 1_000_000;

//
// ================= Injected sources =================
//

/// Source of uniform numbers in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    fn next_f64(&self) -> f64;

    /// Uniform integer in `[low, high)`.
    fn next_in_range(&self, low: u64, high: u64) -> u64 {
        if high <= low {
            return low;
        }
        let span = (high - low) as f64;
        low + ((self.next_f64() * span) as u64).min(high - low - 1)
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible sequence from a seed.
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&self) -> f64 {
        match self.rng.lock() {
            Ok(mut rng) => rng.gen::<f64>(),
            Err(poisoned) => poisoned.into_inner().gen::<f64>(),
        }
    }
}

/// Always returns the same value.
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_f64(&self) -> f64 {
        self.0
    }
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

//
// ================= Derived values =================
//

#[derive(Debug, Clone, PartialEq)]
pub struct CreditTerms {
    /// Percent, in `[3.5, 5.5)`
    pub interest_rate: f64,
    pub loan_to_value: f64,
    pub collateral_required: f64,
}

pub fn credit_terms(amount: u64, unit: f64) -> CreditTerms {
    CreditTerms {
        interest_rate: CREDIT_RATE_MIN + (CREDIT_RATE_MAX - CREDIT_RATE_MIN) * unit,
        loan_to_value: LOAN_TO_VALUE,
        collateral_required: amount as f64 / LOAN_TO_VALUE,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenizationTerms {
    pub token_id: String,
    pub supply: u64,
    pub price: f64,
}

pub fn tokenization_terms(value: u64, user_id: &str, now: DateTime<Utc>) -> TokenizationTerms {
    TokenizationTerms {
        token_id: token_id(user_id, now),
        supply: TOKEN_SUPPLY,
        price: value as f64 / TOKEN_SUPPLY as f64,
    }
}

/// `RWA-<first 6 alphanumerics of the user id>-<last 6 digits of the epoch millis>`
pub fn token_id(user_id: &str, now: DateTime<Utc>) -> String {
    let user_part: String = user_id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(6)
        .collect::<String>()
        .to_uppercase();
    let user_part = if user_part.is_empty() {
        "ANON".to_string()
    } else {
        user_part
    };

    let suffix = now.timestamp_millis().rem_euclid(1_000_000);
    format!("RWA-{}-{:06}", user_part, suffix)
}

/// Fixed unit price of the sold token, not a live quote.
pub fn match_price(sell: Token) -> f64 {
    match sell {
        Token::Sol => 150.0,
        Token::Eth => 3000.0,
        _ => 65000.0,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeMatch {
    pub price: f64,
    pub receive_amount: f64,
    pub order_id: String,
    pub counterparty_id: String,
}

pub fn trade_match(amount: u64, sell: Token, counterparty: u64, now: DateTime<Utc>) -> TradeMatch {
    let price = match_price(sell);
    TradeMatch {
        price,
        receive_amount: amount as f64 * price,
        order_id: format!("DP-{}", now.timestamp_millis()),
        counterparty_id: format!("counterparty_{}", counterparty),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutomationPlan {
    pub allocations: &'static [(&'static str, u32)],
    pub expected_apy: &'static str,
    pub rebalance: &'static str,
}

pub fn automation_plan(strategy: Strategy) -> AutomationPlan {
    match strategy {
        Strategy::Yield => AutomationPlan {
            allocations: &[
                ("SOL lending", 40),
                ("USDC lending", 30),
                ("LP providing", 20),
                ("Staking", 10),
            ],
            expected_apy: "10-14%",
            rebalance: "Daily",
        },
        Strategy::Balanced => AutomationPlan {
            allocations: &[("SOL", 35), ("USDC", 30), ("ETH", 20), ("BTC", 15)],
            expected_apy: "7-9%",
            rebalance: "Weekly",
        },
        Strategy::Aggressive => AutomationPlan {
            allocations: &[("SOL", 50), ("ETH", 25), ("BTC", 15), ("DeFi tokens", 10)],
            expected_apy: "15-25%",
            rebalance: "Every 12 hours",
        },
        Strategy::Conservative => AutomationPlan {
            allocations: &[
                ("USDC", 40),
                ("USDT", 25),
                ("BTC", 15),
                ("ETH", 10),
                ("SOL", 10),
            ],
            expected_apy: "4-6%",
            rebalance: "Monthly",
        },
    }
}

//
// ================= Rendering =================
//

/// Renders completion replies with injected randomness and time.
#[derive(Clone)]
pub struct Quoter {
    random: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
}

impl Quoter {
    pub fn new(random: Arc<dyn RandomSource>, clock: Arc<dyn Clock>) -> Self {
        Self { random, clock }
    }

    pub fn random(&self) -> &dyn RandomSource {
        self.random.as_ref()
    }

    pub fn render(&self, completion: &Completion, user_id: &str) -> String {
        match completion {
            Completion::Credit { amount, collateral } => {
                let terms = credit_terms(*amount, self.random.next_f64());
                format!(
                    "🎉 Credit approved!\n\n\
                     💰 Amount: {} USDC\n\
                     🔒 Collateral: {}\n\
                     📈 Interest rate: {:.2}% APR\n\
                     ⚖️ Loan-to-value: {:.0}%\n\
                     🧮 Collateral required: {:.2} USD in {}\n\n\
                     Your credit score was computed privately. Funds are on their way!",
                    amount,
                    collateral,
                    terms.interest_rate,
                    terms.loan_to_value * 100.0,
                    terms.collateral_required,
                    collateral
                )
            }
            Completion::Tokenization {
                property_type,
                value,
                location,
            } => {
                let terms = tokenization_terms(*value, user_id, self.clock.now());
                format!(
                    "🎉 Asset tokenized!\n\n\
                     🏢 Property: {}\n\
                     📍 Location: {}\n\
                     💵 Value: ${}\n\n\
                     🪙 Token ID: {}\n\
                     📦 Supply: {} tokens\n\
                     🏷️ Price per token: ${}\n\n\
                     ✅ Compliance checks passed for {} property.",
                    property_type,
                    location,
                    group_thousands(*value),
                    terms.token_id,
                    group_thousands(terms.supply),
                    terms.price,
                    describe(*property_type)
                )
            }
            Completion::Trade { amount, sell, buy } => {
                let counterparty = self.random.next_in_range(1000, 10000);
                let matched = trade_match(*amount, *sell, counterparty, self.clock.now());
                format!(
                    "🎉 Order matched privately!\n\n\
                     📤 Sell: {} {}\n\
                     📥 Receive: {:.2} {}\n\
                     💱 Match price: {:.2} per {}\n\n\
                     🧾 Order ID: {}\n\
                     🤝 Counterparty: {}\n\n\
                     The market never saw your order.",
                    amount,
                    sell,
                    matched.receive_amount,
                    buy,
                    matched.price,
                    sell,
                    matched.order_id,
                    matched.counterparty_id
                )
            }
            Completion::Automation {
                portfolio_value,
                strategy,
            } => {
                let plan = automation_plan(*strategy);
                let allocation = plan
                    .allocations
                    .iter()
                    .map(|(bucket, pct)| format!("- {}: {}%", bucket, pct))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    "🎉 Automation activated!\n\n\
                     💼 Portfolio: ${}\n\
                     🎯 Strategy: {}\n\n\
                     📊 Allocation:\n{}\n\n\
                     📈 Expected APY: {}\n\
                     🔄 Rebalancing: {}\n\n\
                     I'll monitor markets 24/7 for you.",
                    group_thousands(*portfolio_value),
                    strategy,
                    allocation,
                    plan.expected_apy,
                    plan.rebalance
                )
            }
        }
    }
}

impl Default for Quoter {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandom), Arc::new(SystemClock))
    }
}

fn describe(kind: PropertyType) -> &'static str {
    match kind {
        PropertyType::Residential => "residential",
        PropertyType::Commercial => "commercial",
        PropertyType::Land => "land",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_quoter(unit: f64) -> Quoter {
        let now = Utc.timestamp_millis_opt(1_700_000_123_456).unwrap();
        Quoter::new(Arc::new(FixedRandom(unit)), Arc::new(FixedClock(now)))
    }

    #[test]
    fn test_credit_rate_bounds() {
        assert_eq!(credit_terms(1000, 0.0).interest_rate, 3.5);
        assert!(credit_terms(1000, 0.999_999).interest_rate < 5.5);

        let random = SeededRandom::new(7);
        for _ in 0..200 {
            let rate = credit_terms(1000, random.next_f64()).interest_rate;
            assert!((CREDIT_RATE_MIN..CREDIT_RATE_MAX).contains(&rate));
        }
    }

    #[test]
    fn test_credit_render_is_deterministic_with_fakes() {
        let text = fixed_quoter(0.5).render(
            &Completion::Credit {
                amount: 1500,
                collateral: Token::Sol,
            },
            "u1",
        );
        assert!(text.contains("4.50% APR"));
        assert!(text.contains("Loan-to-value: 75%"));
        assert!(text.contains("2000.00 USD in SOL"));
    }

    #[test]
    fn test_token_id_shape() {
        let now = Utc.timestamp_millis_opt(1_700_000_123_456).unwrap();
        assert_eq!(token_id("wallet_9xYz", now), "RWA-WALLET-123456");
        assert_eq!(token_id("--", now), "RWA-ANON-123456");
    }

    #[test]
    fn test_tokenization_price() {
        let now = Utc::now();
        let terms = tokenization_terms(500000, "u1", now);
        assert_eq!(terms.supply, 1_000_000);
        assert_eq!(terms.price, 0.5);
        assert_eq!(format!("{}", terms.price), "0.5");
    }

    #[test]
    fn test_trade_receive_amount() {
        let now = Utc::now();
        for buy_agnostic_amount in [1u64, 10, 333] {
            let matched = trade_match(buy_agnostic_amount, Token::Sol, 1234, now);
            assert_eq!(matched.receive_amount, buy_agnostic_amount as f64 * 150.0);
        }
        assert_eq!(match_price(Token::Eth), 3000.0);
        assert_eq!(match_price(Token::Btc), 65000.0);
        assert_eq!(match_price(Token::Usdc), 65000.0);
    }

    #[test]
    fn test_trade_render_ignores_buy_token_for_price() {
        let quoter = fixed_quoter(0.0);
        for buy in [Token::Usdc, Token::Eth, Token::Btc] {
            let text = quoter.render(
                &Completion::Trade {
                    amount: 10,
                    sell: Token::Sol,
                    buy,
                },
                "u1",
            );
            assert!(text.contains(&format!("Receive: 1500.00 {}", buy)));
            assert!(text.contains("counterparty_1000"));
        }
    }

    #[test]
    fn test_allocations_sum_to_100() {
        for strategy in Strategy::ALL {
            let plan = automation_plan(strategy);
            let total: u32 = plan.allocations.iter().map(|(_, pct)| pct).sum();
            assert_eq!(total, 100, "{:?}", strategy);
            assert!((4..=5).contains(&plan.allocations.len()));
        }
    }

    #[test]
    fn test_range_helper_stays_in_bounds() {
        assert_eq!(FixedRandom(0.0).next_in_range(1000, 10000), 1000);
        assert_eq!(FixedRandom(0.999_999_9).next_in_range(1000, 10000), 9999);
        assert_eq!(FixedRandom(0.5).next_in_range(5, 5), 5);
    }
}
