use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteItem {
    pub name: String,
    pub qty: u32,
    pub price: Decimal,
}

impl QuoteItem {
    pub fn subtotal(&self) -> Result<Decimal, DomainError> {
        self.price.checked_mul(Decimal::from(self.qty)).ok_or_else(|| {
            DomainError::InvariantViolation(format!(
                "quote item `{}` subtotal exceeds the representable amount",
                self.name
            ))
        })
    }
}

/// Priced offer prepared for a single lead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteDocument {
    pub business_name: String,
    pub lead_id: String,
    pub items: Vec<QuoteItem>,
}

impl QuoteDocument {
    pub fn total(&self) -> Result<Decimal, DomainError> {
        self.items.iter().try_fold(Decimal::ZERO, |total, item| {
            total.checked_add(item.subtotal()?).ok_or_else(|| {
                DomainError::InvariantViolation(
                    "quote total exceeds the representable amount".to_string(),
                )
            })
        })
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.business_name.trim().is_empty() {
            return Err(DomainError::InvariantViolation(
                "quote business_name must not be empty".to_string(),
            ));
        }
        // lead_id ends up in a file name
        let safe_lead_id = !self.lead_id.is_empty()
            && self.lead_id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe_lead_id {
            return Err(DomainError::InvariantViolation(
                "quote lead_id must be non-empty and contain only [A-Za-z0-9_-]".to_string(),
            ));
        }
        if self.items.iter().any(|item| item.price < Decimal::ZERO) {
            return Err(DomainError::InvariantViolation(
                "quote item prices must not be negative".to_string(),
            ));
        }
        self.total().map(|_| ())
    }
}
