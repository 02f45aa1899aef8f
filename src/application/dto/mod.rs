// src/application/dto/mod.rs
// Request DTOs as they arrive from the register screens, and application errors

pub mod parser;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::errors::{
    AppError, DomainError, PaymentError, PermissionError, PricingError, RepositoryError,
};
use crate::domain::model::{CartItem, ConditionMultipliers, Customer, DamageItem};

#[derive(Debug, Error)]
pub enum ApplicationError {
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

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Number parse error: {0}")]
    NumberParseError(#[from] rust_decimal::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<ApplicationError> for AppError {
    fn from(error: ApplicationError) -> Self {
        match error {
            ApplicationError::Domain(e) => AppError::Domain(e),
            ApplicationError::Pricing(e) => AppError::Pricing(e),
            ApplicationError::Payment(e) => AppError::Payment(e),
            ApplicationError::Permission(e) => AppError::Permission(e),
            ApplicationError::Repository(e) => AppError::Repository(e),
            ApplicationError::JsonError(e) => AppError::Serialization(e),
            other => AppError::Application(other.to_string()),
        }
    }
}

/// Trade-in form as submitted by the calculator screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeInRequestDto {
    pub customer_id: String,
    pub device_name: String,
    #[serde(default)]
    pub device_model: Option<String>,
    #[serde(default)]
    pub device_imei: Option<String>,
    #[serde(default)]
    pub device_serial_number: Option<String>,
    pub base_trade_in_price: Decimal,
    pub condition_rating: String,
    #[serde(default)]
    pub damage_items: Vec<DamageItem>,
    #[serde(default)]
    pub new_product_id: Option<String>,
    #[serde(default)]
    pub new_device_price: Option<Decimal>,
    #[serde(default)]
    pub needs_repair: bool,
    #[serde(default)]
    pub resale_price: Option<Decimal>,
    #[serde(default)]
    pub staff_notes: Option<String>,
}

/// Reference price form; multipliers default to the trade-in settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeInPriceDto {
    pub product_id: String,
    #[serde(default)]
    pub variant_id: Option<String>,
    pub device_name: String,
    #[serde(default)]
    pub device_model: Option<String>,
    pub base_trade_in_price: Decimal,
    #[serde(default)]
    pub multipliers: Option<ConditionMultipliers>,
    #[serde(default = "active")]
    pub is_active: bool,
}

fn active() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractFormDto {
    pub customer_id_number: String,
    pub customer_id_type: String,
    #[serde(default)]
    pub ownership_confirmed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountDto {
    #[serde(rename = "type")]
    pub discount_type: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitPaymentDto {
    pub method: String,
    pub amount: Decimal,
    #[serde(default)]
    pub reference: Option<String>,
}

/// Payment modal state, before method-specific fields are checked
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentDto {
    pub method: String,
    pub amount: Option<Decimal>,
    pub tendered: Option<Decimal>,
    pub reference: Option<String>,
    pub loyalty_points: Option<u64>,
    pub gift_card_code: Option<String>,
    pub split_payments: Vec<SplitPaymentDto>,
}

/// Anything the register can be asked to do from a request file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegisterRequestDto {
    Checkout(CheckoutRequestDto),
    TradeIn(TradeInRequestDto),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequestDto {
    pub items: Vec<CartItem>,
    #[serde(default)]
    pub discount: Option<DiscountDto>,
    #[serde(default)]
    pub tip: Option<Decimal>,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub cashier_name: Option<String>,
    #[serde(default)]
    pub cashier_role: Option<String>,
    #[serde(default)]
    pub trade_in_credit: Option<Decimal>,
    pub payment: PaymentDto,
}
