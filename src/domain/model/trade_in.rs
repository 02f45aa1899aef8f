// src/domain/model/trade_in.rs
// Trade-in pricing, valuation and transaction records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::DomainError;

/// Physical/functional condition of a device being traded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionRating {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ConditionRating {
    pub const ALL: [ConditionRating; 4] = [
        ConditionRating::Excellent,
        ConditionRating::Good,
        ConditionRating::Fair,
        ConditionRating::Poor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionRating::Excellent => "excellent",
            ConditionRating::Good => "good",
            ConditionRating::Fair => "fair",
            ConditionRating::Poor => "poor",
        }
    }
}

impl fmt::Display for ConditionRating {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ConditionRating {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "excellent" => Ok(ConditionRating::Excellent),
            "good" => Ok(ConditionRating::Good),
            "fair" => Ok(ConditionRating::Fair),
            "poor" => Ok(ConditionRating::Poor),
            _ => Err(DomainError::UnknownCondition(s.to_string())),
        }
    }
}

/// Scaling factor per condition, expected non-increasing from excellent to poor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionMultipliers {
    pub excellent: Decimal,
    pub good: Decimal,
    pub fair: Decimal,
    pub poor: Decimal,
}

impl ConditionMultipliers {
    pub fn multiplier_for(&self, rating: ConditionRating) -> Decimal {
        match rating {
            ConditionRating::Excellent => self.excellent,
            ConditionRating::Good => self.good,
            ConditionRating::Fair => self.fair,
            ConditionRating::Poor => self.poor,
        }
    }

    /// True when every multiplier is within [0, 1] and they never increase
    /// as the condition gets worse.
    pub fn is_well_formed(&self) -> bool {
        let ordered = [self.excellent, self.good, self.fair, self.poor];
        ordered
            .iter()
            .all(|m| *m >= Decimal::ZERO && *m <= Decimal::ONE)
            && ordered.windows(2).all(|w| w[0] >= w[1])
    }
}

impl Default for ConditionMultipliers {
    fn default() -> Self {
        Self {
            excellent: dec!(1.00),
            good: dec!(0.85),
            fair: dec!(0.70),
            poor: dec!(0.50),
        }
    }
}

/// Reference pricing record for a device model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeInPrice {
    pub id: String,
    pub product_id: String,
    pub variant_id: Option<String>,
    pub device_name: String,
    pub device_model: Option<String>,
    /// Ceiling value for a device in excellent condition
    pub base_trade_in_price: Decimal,
    #[serde(flatten)]
    pub multipliers: ConditionMultipliers,
    pub is_active: bool,
}

/// A deduction line for damage found during inspection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageItem {
    /// Missing or negative prices deduct nothing
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
    /// Catalog spare part that explains the deduction
    #[serde(default)]
    pub spare_part_id: Option<String>,
}

impl DamageItem {
    pub fn new(price: Decimal, description: &str) -> Self {
        Self {
            price: Some(price),
            description: Some(description.to_string()),
            spare_part_id: None,
        }
    }

    pub fn deduction(&self) -> Decimal {
        self.price
            .filter(|p| *p > Decimal::ZERO)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Derived valuation of a trade-in, never persisted on its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeInCalculation {
    pub base_price: Decimal,
    pub condition_rating: ConditionRating,
    pub condition_multiplier: Decimal,
    pub condition_adjusted_price: Decimal,
    pub damage_deductions: Vec<DamageItem>,
    pub total_damage_deductions: Decimal,
    pub final_trade_in_value: Decimal,
    pub customer_payment_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeInStatus {
    Pending,
    Approved,
    Completed,
    Cancelled,
}

impl TradeInStatus {
    pub fn can_transition_to(&self, next: TradeInStatus) -> bool {
        matches!(
            (self, next),
            (TradeInStatus::Pending, TradeInStatus::Approved)
                | (TradeInStatus::Approved, TradeInStatus::Completed)
                | (TradeInStatus::Pending, TradeInStatus::Cancelled)
                | (TradeInStatus::Approved, TradeInStatus::Cancelled)
        )
    }
}

impl fmt::Display for TradeInStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TradeInStatus::Pending => write!(f, "pending"),
            TradeInStatus::Approved => write!(f, "approved"),
            TradeInStatus::Completed => write!(f, "completed"),
            TradeInStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeInTransaction {
    pub id: String,
    pub customer_id: String,
    pub device_name: String,
    pub device_model: Option<String>,
    pub device_imei: Option<String>,
    pub device_serial_number: Option<String>,
    pub calculation: TradeInCalculation,
    pub new_product_id: Option<String>,
    pub new_device_price: Option<Decimal>,
    pub needs_repair: bool,
    pub resale_price: Option<Decimal>,
    pub staff_notes: Option<String>,
    pub status: TradeInStatus,
    pub created_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TradeInTransaction {
    /// Move to `next`, stamping the matching timestamp
    pub fn transition(&mut self, next: TradeInStatus, at: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }

        match next {
            TradeInStatus::Approved => self.approved_at = Some(at),
            TradeInStatus::Completed => self.completed_at = Some(at),
            _ => {}
        }
        self.status = next;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeInContract {
    pub id: String,
    pub transaction_id: String,
    pub customer_id: String,
    pub customer_id_number: String,
    pub customer_id_type: String,
    pub device_name: String,
    pub device_imei: Option<String>,
    pub agreed_value: Decimal,
    pub terms_and_conditions: String,
    pub ownership_confirmed: bool,
    pub created_at: DateTime<Utc>,
}

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.map_or(false, |h| h.to_lowercase().contains(needle))
}

/// Narrowing for the reference price list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeInPriceFilters {
    /// Matched against device name and model, case-insensitive
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub device_name: Option<String>,
}

impl TradeInPriceFilters {
    pub fn matches(&self, price: &TradeInPrice) -> bool {
        if let Some(search) = &self.search {
            let needle = search.trim().to_lowercase();
            if !contains_ci(Some(price.device_name.as_str()), &needle)
                && !contains_ci(price.device_model.as_deref(), &needle)
            {
                return false;
            }
        }
        if self.is_active.is_some_and(|active| active != price.is_active) {
            return false;
        }
        if let Some(name) = &self.device_name {
            if !contains_ci(Some(price.device_name.as_str()), &name.trim().to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// Narrowing for the trade-in transaction list. Date and value bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeInFilters {
    /// Matched against device name, model, IMEI and transaction id
    pub search: Option<String>,
    pub status: Option<TradeInStatus>,
    pub condition_rating: Option<ConditionRating>,
    pub customer_id: Option<String>,
    pub needs_repair: Option<bool>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub min_value: Option<Decimal>,
    pub max_value: Option<Decimal>,
}

impl TradeInFilters {
    pub fn matches(&self, transaction: &TradeInTransaction) -> bool {
        if let Some(search) = &self.search {
            let needle = search.trim().to_lowercase();
            let hit = contains_ci(Some(transaction.device_name.as_str()), &needle)
                || contains_ci(transaction.device_model.as_deref(), &needle)
                || contains_ci(transaction.device_imei.as_deref(), &needle)
                || contains_ci(Some(transaction.id.as_str()), &needle);
            if !hit {
                return false;
            }
        }

        let value = transaction.calculation.final_trade_in_value;
        self.status.map_or(true, |s| s == transaction.status)
            && self
                .condition_rating
                .map_or(true, |c| c == transaction.calculation.condition_rating)
            && self
                .customer_id
                .as_ref()
                .map_or(true, |id| *id == transaction.customer_id)
            && self.needs_repair.map_or(true, |r| r == transaction.needs_repair)
            && self.date_from.map_or(true, |from| transaction.created_at >= from)
            && self.date_to.map_or(true, |to| transaction.created_at <= to)
            && self.min_value.map_or(true, |min| value >= min)
            && self.max_value.map_or(true, |max| value <= max)
    }
}
