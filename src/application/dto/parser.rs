// src/application/dto/parser.rs
// Parsers for DTOs

use rust_decimal::Decimal;

use super::{
    ApplicationError, CheckoutRequestDto, DiscountDto, PaymentDto, RegisterRequestDto, SplitPaymentDto,
    TradeInRequestDto,
};
use crate::domain::errors::PaymentError;
use crate::domain::model::{ConditionRating, Discount, PaymentMethodKind, PaymentRequest, Reference, SplitPayment};

/// Parse a checkout request sent by the register
pub fn parse_checkout_request(message: &str) -> Result<CheckoutRequestDto, ApplicationError> {
    serde_json::from_str(message).map_err(ApplicationError::JsonError)
}

/// Parse a request file, telling checkouts and trade-in forms apart by shape
pub fn parse_register_request(message: &str) -> Result<RegisterRequestDto, ApplicationError> {
    serde_json::from_str(message).map_err(|e| {
        ApplicationError::ParseError(format!("Not a checkout or trade-in request: {}", e))
    })
}

/// Parse a trade-in form
pub fn parse_trade_in_request(message: &str) -> Result<TradeInRequestDto, ApplicationError> {
    serde_json::from_str(message).map_err(ApplicationError::JsonError)
}

impl TradeInRequestDto {
    pub fn condition(&self) -> Result<ConditionRating, ApplicationError> {
        Ok(self.condition_rating.parse()?)
    }
}

impl DiscountDto {
    pub fn to_discount(&self) -> Result<Discount, ApplicationError> {
        match self.discount_type.trim().to_lowercase().as_str() {
            "percentage" => Ok(Discount::Percentage(self.value)),
            "fixed" => Ok(Discount::Fixed(self.value)),
            other => Err(ApplicationError::ParseError(format!(
                "Invalid discount type: {}",
                other
            ))),
        }
    }
}

impl SplitPaymentDto {
    pub fn to_split(&self) -> Result<SplitPayment, ApplicationError> {
        let method: PaymentMethodKind = self.method.parse()?;
        Ok(SplitPayment::new(method, self.amount, self.reference.as_deref())?)
    }
}

impl PaymentDto {
    /// Build the tagged request. `default_amount` stands in for an amount the
    /// operator left untouched, which the modal pre-fills with the total.
    pub fn to_request(&self, default_amount: Decimal) -> Result<PaymentRequest, ApplicationError> {
        if self.method.trim().is_empty() {
            return Err(PaymentError::NoMethodSelected.into());
        }

        if self.method.trim().eq_ignore_ascii_case("split") {
            let payments = self
                .split_payments
                .iter()
                .map(SplitPaymentDto::to_split)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(PaymentRequest::Split { payments });
        }

        let method: PaymentMethodKind = self.method.parse()?;
        let amount = self.amount.unwrap_or(default_amount);
        let reference = |method| Reference::new(method, self.reference.as_deref().unwrap_or(""));

        let request = match method {
            PaymentMethodKind::Cash => PaymentRequest::Cash {
                amount,
                tendered: self.tendered,
            },
            PaymentMethodKind::Card => PaymentRequest::Card {
                amount,
                reference: reference(method)?,
            },
            PaymentMethodKind::MobileMoney => PaymentRequest::MobileMoney {
                amount,
                reference: reference(method)?,
            },
            PaymentMethodKind::BankTransfer => PaymentRequest::BankTransfer {
                amount,
                reference: reference(method)?,
            },
            PaymentMethodKind::LoyaltyPoints => PaymentRequest::LoyaltyPoints {
                points: self.loyalty_points.unwrap_or(0),
            },
            PaymentMethodKind::GiftCard => PaymentRequest::GiftCard {
                amount,
                code: self.gift_card_code.clone().unwrap_or_default(),
            },
        };

        Ok(request)
    }
}
