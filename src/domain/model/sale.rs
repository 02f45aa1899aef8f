// src/domain/model/sale.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::{CartItem, CartTotals, Discount};
use super::customer::Customer;
use super::payment::{PaymentConfirmation, PaymentRequest};

/// A committed sale, the input to receipts and notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub receipt_number: String,
    pub items: Vec<CartItem>,
    pub discount: Option<Discount>,
    pub totals: CartTotals,
    pub payment: PaymentRequest,
    pub confirmation: PaymentConfirmation,
    pub customer: Option<Customer>,
    pub cashier_name: Option<String>,
    /// Trade-in credit applied against this sale
    pub trade_in_credit: Option<Decimal>,
    pub loyalty_points_earned: u64,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    pub fn balance_due(&self) -> Decimal {
        (self.totals.final_amount - self.confirmation.amount_paid).max(Decimal::ZERO)
    }

    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }
}
