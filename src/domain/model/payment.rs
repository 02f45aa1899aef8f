// src/domain/model/payment.rs
// Tagged payment requests; method-specific fields are part of each variant

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::{DomainError, PaymentError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    Cash,
    Card,
    MobileMoney,
    BankTransfer,
    LoyaltyPoints,
    GiftCard,
}

impl PaymentMethodKind {
    /// Card, mobile money and bank transfer need a transaction reference
    pub fn requires_reference(&self) -> bool {
        matches!(
            self,
            PaymentMethodKind::Card | PaymentMethodKind::MobileMoney | PaymentMethodKind::BankTransfer
        )
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentMethodKind::Cash => "Cash",
            PaymentMethodKind::Card => "Credit/Debit Card",
            PaymentMethodKind::MobileMoney => "Mobile Money",
            PaymentMethodKind::BankTransfer => "Bank Transfer",
            PaymentMethodKind::LoyaltyPoints => "Loyalty Points",
            PaymentMethodKind::GiftCard => "Gift Card",
        }
    }
}

impl fmt::Display for PaymentMethodKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PaymentMethodKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethodKind::Cash),
            "card" => Ok(PaymentMethodKind::Card),
            "mobile_money" => Ok(PaymentMethodKind::MobileMoney),
            "bank_transfer" => Ok(PaymentMethodKind::BankTransfer),
            "loyalty_points" => Ok(PaymentMethodKind::LoyaltyPoints),
            "gift_card" => Ok(PaymentMethodKind::GiftCard),
            _ => Err(DomainError::UnknownPaymentMethod(s.to_string())),
        }
    }
}

/// Non-empty transaction reference (card slip, mobile money or bank ref)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Reference(String);

impl Reference {
    pub fn new(method: PaymentMethodKind, raw: &str) -> Result<Self, PaymentError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PaymentError::MissingReference(method));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Reference {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("reference must not be empty".to_string());
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl From<Reference> for String {
    fn from(reference: Reference) -> Self {
        reference.0
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One portion of a split payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitPayment {
    pub method: PaymentMethodKind,
    pub amount: Decimal,
    #[serde(default)]
    pub reference: Option<Reference>,
    /// Gift card code, for gift card entries
    #[serde(default)]
    pub code: Option<String>,
}

impl SplitPayment {
    /// `reference` carries the transaction reference, or the card code for a
    /// gift card entry.
    pub fn new(
        method: PaymentMethodKind,
        amount: Decimal,
        reference: Option<&str>,
    ) -> Result<Self, PaymentError> {
        let raw = reference.map(str::trim).filter(|r| !r.is_empty());
        let (reference, code) = match (method, raw) {
            (PaymentMethodKind::GiftCard, Some(code)) => (None, Some(code.to_string())),
            (PaymentMethodKind::GiftCard, None) => return Err(PaymentError::MissingGiftCardCode),
            (_, Some(raw)) => (Some(Reference::new(method, raw)?), None),
            (_, None) if method.requires_reference() => return Err(PaymentError::MissingReference(method)),
            (_, None) => (None, None),
        };
        Ok(Self {
            method,
            amount,
            reference,
            code,
        })
    }

    /// Entry carries what its method needs
    pub fn check_details(&self) -> Result<(), PaymentError> {
        if self.method.requires_reference() && self.reference.is_none() {
            return Err(PaymentError::MissingReference(self.method));
        }
        if self.method == PaymentMethodKind::GiftCard
            && self.code.as_deref().map_or(true, |c| c.trim().is_empty())
        {
            return Err(PaymentError::MissingGiftCardCode);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentRequest {
    Cash {
        amount: Decimal,
        #[serde(default)]
        tendered: Option<Decimal>,
    },
    Card {
        amount: Decimal,
        reference: Reference,
    },
    MobileMoney {
        amount: Decimal,
        reference: Reference,
    },
    BankTransfer {
        amount: Decimal,
        reference: Reference,
    },
    LoyaltyPoints {
        points: u64,
    },
    GiftCard {
        amount: Decimal,
        code: String,
    },
    Split {
        payments: Vec<SplitPayment>,
    },
}

impl PaymentRequest {
    /// Method of a single payment, `None` for split payments
    pub fn method(&self) -> Option<PaymentMethodKind> {
        match self {
            PaymentRequest::Cash { .. } => Some(PaymentMethodKind::Cash),
            PaymentRequest::Card { .. } => Some(PaymentMethodKind::Card),
            PaymentRequest::MobileMoney { .. } => Some(PaymentMethodKind::MobileMoney),
            PaymentRequest::BankTransfer { .. } => Some(PaymentMethodKind::BankTransfer),
            PaymentRequest::LoyaltyPoints { .. } => Some(PaymentMethodKind::LoyaltyPoints),
            PaymentRequest::GiftCard { .. } => Some(PaymentMethodKind::GiftCard),
            PaymentRequest::Split { .. } => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            PaymentRequest::Split { payments } => {
                let methods: Vec<&str> = payments.iter().map(|p| p.method.display_name()).collect();
                format!("Split ({})", methods.join(" + "))
            }
            other => other
                .method()
                .map(|m| m.display_name().to_string())
                .unwrap_or_default(),
        }
    }

    pub fn reference(&self) -> Option<&Reference> {
        match self {
            PaymentRequest::Card { reference, .. }
            | PaymentRequest::MobileMoney { reference, .. }
            | PaymentRequest::BankTransfer { reference, .. } => Some(reference),
            _ => None,
        }
    }
}

/// Outcome reported by the payment backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub transaction_id: String,
    pub amount_paid: Decimal,
    pub change_given: Decimal,
}
