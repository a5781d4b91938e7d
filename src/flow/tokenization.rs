//! Real-world-asset tokenization flow: property type → value → location.

use super::{Completion, Field, FlowSlots, Turn};
use crate::extractor::contains_any_word;
use crate::models::PropertyType;
use crate::responses::{checklist, group_thousands, status_line};

/// Whole-word synonyms per property type. Exact type names are checked first.
const PROPERTY_SYNONYMS: &[(PropertyType, &[&str])] = &[
    (PropertyType::Residential, &["house", "home", "apartment", "condo", "villa", "flat"]),
    (PropertyType::Commercial, &["office", "retail", "warehouse", "building", "store", "shop"]),
    (PropertyType::Land, &["lot", "plot", "acre", "acres", "farmland"]),
];

const PROPERTY_NAMES: &[(PropertyType, &[&str])] = &[
    (PropertyType::Residential, &["residential"]),
    (PropertyType::Commercial, &["commercial"]),
    (PropertyType::Land, &["land"]),
];

pub fn detect_property_type(text: &str) -> Option<PropertyType> {
    [PROPERTY_NAMES, PROPERTY_SYNONYMS]
        .iter()
        .flat_map(|table| table.iter())
        .find(|(_, words)| contains_any_word(text, words))
        .map(|(kind, _)| *kind)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizationField {
    PropertyType,
    Value,
    Location,
}

impl Field for TokenizationField {
    fn step_tag(&self) -> &'static str {
        match self {
            TokenizationField::PropertyType => "collect_property_type",
            TokenizationField::Value => "collect_value",
            TokenizationField::Location => "collect_location",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizationSlots {
    pub property_type: Option<PropertyType>,
    /// USD value
    pub amount: Option<u64>,
    pub location: Option<String>,
}

impl TokenizationSlots {
    fn status(&self) -> Vec<String> {
        vec![
            status_line("Property type", self.property_type.map(|p| p.to_string())),
            status_line("Value", self.amount.map(|v| format!("${}", group_thousands(v)))),
            status_line("Location", self.location.clone()),
        ]
    }

    fn question(field: TokenizationField) -> &'static str {
        match field {
            TokenizationField::PropertyType => {
                "What type of property is it? (Residential, Commercial or Land)"
            }
            TokenizationField::Value => "What is the property's value in USD?",
            TokenizationField::Location => "Where is the property located?",
        }
    }
}

impl FlowSlots for TokenizationSlots {
    type Field = TokenizationField;

    const FIELDS: &'static [TokenizationField] = &[
        TokenizationField::PropertyType,
        TokenizationField::Value,
        TokenizationField::Location,
    ];

    fn is_filled(&self, field: TokenizationField) -> bool {
        match field {
            TokenizationField::PropertyType => self.property_type.is_some(),
            TokenizationField::Value => self.amount.is_some(),
            TokenizationField::Location => self.location.is_some(),
        }
    }

    fn try_fill(&mut self, field: TokenizationField, turn: &Turn<'_>, current: bool) -> bool {
        match field {
            TokenizationField::PropertyType => {
                self.property_type = detect_property_type(turn.text);
                self.property_type.is_some()
            }
            TokenizationField::Value => {
                self.amount = turn.entities.first_amount();
                self.amount.is_some()
            }
            // free text, only meaningful when it was asked for
            TokenizationField::Location => {
                let text = turn.text.trim();
                if current && !text.is_empty() {
                    self.location = Some(text.to_string());
                }
                self.location.is_some()
            }
        }
    }

    fn intro(&self) -> String {
        "🏢 I can help tokenize your real-world assets!\n\n\
         I'll need:\n\
         - Property type\n\
         - Property value\n\
         - Location\n\n\
         I'll check compliance rules automatically. What type of property is it? \
         (Residential, Commercial or Land)"
            .to_string()
    }

    fn ask(&self, field: TokenizationField) -> String {
        let captured: Vec<String> = self
            .status()
            .into_iter()
            .filter(|line| line.ends_with('✅'))
            .collect();
        format!("{}\n\n{}", captured.join("\n"), Self::question(field))
    }

    fn clarify(&self, field: TokenizationField) -> String {
        checklist(&self.status(), Self::question(field))
    }

    fn processing(&self) -> String {
        format!(
            "✅ Processing your tokenization request:\n\n{}\n\n\
             🔍 Checking compliance rules...\n\n\
             Reply to confirm and I'll mint your asset tokens.",
            self.status().join("\n")
        )
    }

    fn completion(&self) -> Option<Completion> {
        Some(Completion::Tokenization {
            property_type: self.property_type?,
            value: self.amount?,
            location: self.location.clone()?,
        })
    }
}
