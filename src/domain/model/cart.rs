// src/domain/model/cart.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A product line in the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: String,
    #[serde(default)]
    pub variant_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl CartItem {
    pub fn new(product_id: &str, name: &str, quantity: u32, unit_price: Decimal) -> Self {
        Self {
            product_id: product_id.to_string(),
            variant_id: None,
            name: name.to_string(),
            sku: None,
            quantity,
            unit_price,
        }
    }

    pub fn with_sku(mut self, sku: &str) -> Self {
        self.sku = Some(sku.to_string());
        self
    }

    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// Discount typed at the register
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Discount {
    Percentage(Decimal),
    Fixed(Decimal),
}

impl Discount {
    pub fn value(&self) -> Decimal {
        match self {
            Discount::Percentage(v) | Discount::Fixed(v) => *v,
        }
    }
}

impl fmt::Display for Discount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Discount::Percentage(v) => write!(f, "{}%", v),
            Discount::Fixed(v) => write!(f, "{}", v),
        }
    }
}

/// Computed totals for a cart
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub taxable_amount: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub tip_amount: Decimal,
    /// Gift card or loyalty credit already applied against the bill
    pub adjustments: Decimal,
    pub final_amount: Decimal,
}

impl CartTotals {
    /// Discount as a share of the subtotal, for display
    pub fn discount_percentage(&self) -> Decimal {
        if self.subtotal.is_zero() {
            return Decimal::ZERO;
        }
        (self.discount_amount / self.subtotal * Decimal::ONE_HUNDRED).round()
    }
}
