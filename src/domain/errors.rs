// src/domain/errors.rs
use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::model::{PaymentMethodKind, TradeInStatus};
use crate::domain::model::permissions::Permission;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Pricing error: {0}")]
    Pricing(#[from] PricingError),

    #[error("Payment error: {0}")]
    Payment(#[from] PaymentError),

    #[error("Permission error: {0}")]
    Permission(#[from] PermissionError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Application error: {0}")]
    Application(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<String> for AppError {
    fn from(s: String) -> Self {
        AppError::Unknown(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Unknown condition rating: {0}")]
    UnknownCondition(String),

    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    #[error("Unknown user role: {0}")]
    UnknownRole(String),

    #[error("Invalid trade-in status transition from {from} to {to}")]
    InvalidTransition { from: TradeInStatus, to: TradeInStatus },

    #[error("Trade-in {0} is not approved yet")]
    NotApproved(String),

    #[error("Invalid trade-in price: {0}")]
    InvalidTradeInPrice(String),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Invalid quantity for {0}")]
    InvalidQuantity(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("Discount value cannot be negative: {0}")]
    NegativeDiscount(Decimal),

    #[error("Tip cannot be negative: {0}")]
    NegativeTip(Decimal),

    #[error("Cost price must be positive: {0}")]
    InvalidCost(Decimal),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaymentError {
    #[error("Split payment amounts must equal the total amount (expected {expected}, got {actual})")]
    SplitMismatch { expected: Decimal, actual: Decimal },

    #[error("Split payment needs at least one entry")]
    EmptySplit,

    #[error("Payment amount must be between 0 and {remaining}")]
    AmountOutOfRange { remaining: Decimal },

    #[error("Please enter reference number for {0}")]
    MissingReference(PaymentMethodKind),

    #[error("Please select a payment method")]
    NoMethodSelected,

    #[error("Please enter loyalty points to use")]
    NoLoyaltyPoints,

    #[error("Not enough loyalty points available ({available} < {requested})")]
    InsufficientLoyaltyPoints { available: u64, requested: u64 },

    #[error("At least {minimum} points are needed to redeem")]
    BelowMinimumRedemption { minimum: u64 },

    #[error("Loyalty redemption of {value} exceeds the allowed {limit}")]
    RedemptionLimitExceeded { value: Decimal, limit: Decimal },

    #[error("Loyalty program is disabled")]
    LoyaltyDisabled,

    #[error("Please enter gift card code")]
    MissingGiftCardCode,

    #[error("Cash tendered {tendered} is less than amount due {due}")]
    InsufficientCash { due: Decimal, tendered: Decimal },

    #[error("Payment is not ready to submit: {0}")]
    NotReady(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PermissionError {
    #[error("Permission denied: {0}")]
    Denied(Permission),

    #[error("Discount of {requested}% exceeds the allowed {allowed}%")]
    DiscountTooLarge { requested: Decimal, allowed: Decimal },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type PricingResult<T> = Result<T, PricingError>;
pub type PaymentResult<T> = Result<T, PaymentError>;
