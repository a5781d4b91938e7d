//! Scripted assistant replies that do not belong to a single flow.

pub fn greeting() -> String {
    "👋 Hi! I'm your DeFi assistant!\n\n\
     I can help you with:\n\
     💳 Private DeFi Credit\n\
     🏢 RWA Tokenization\n\
     🌑 Dark Pool Trading\n\
     🤖 DeFi Automation\n\n\
     What would you like to do?"
        .to_string()
}

pub fn help() -> String {
    "🦸 I'm your personal DeFi assistant!\n\n\
     I help you with complex DeFi operations:\n\n\
     💳 **Private DeFi Credit** - Get loans without revealing your portfolio\n\
     🏢 **RWA Compliance** - Tokenize real-world assets following regulations\n\
     🌑 **Dark Pool Trading** - Trade large amounts privately\n\
     🤖 **DeFi Automation** - Auto-optimize for best yields\n\n\
     Just tell me what you need!"
        .to_string()
}

/// Menu of example prompts shown when nothing matched.
pub fn catalog() -> String {
    "I can help with:\n\
     💳 Credit/Loans - \"I want to borrow 1000 USDC\"\n\
     🏢 RWA Tokenization - \"I want to tokenize a property\"\n\
     🌑 Private Trading - \"Swap 10 SOL for USDC\"\n\
     🤖 Portfolio Automation - \"Automate my portfolio with a balanced strategy\"\n\n\
     Which one interests you? Just tell me what you'd like to do!"
        .to_string()
}

/// One line of a slot checklist.
pub fn status_line(label: &str, value: Option<String>) -> String {
    match value {
        Some(v) => format!("- {}: {} ✅", label, v),
        None => format!("- {}: ❓ Not provided yet", label),
    }
}

/// Checklist re-prompt used when a message filled nothing.
pub fn checklist(lines: &[String], question: &str) -> String {
    format!("I need:\n{}\n\n{}", lines.join("\n"), question)
}

/// Group digits in thousands: 1000000 → "1,000,000".
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
