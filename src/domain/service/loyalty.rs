// src/domain/service/loyalty.rs
// Loyalty points: earning, redemption limits and tiers

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::errors::{PaymentError, PaymentResult};
use crate::domain::model::{LoyaltySettings, LoyaltyTier};

/// Points earned on a purchase of `amount`
pub fn points_earned(amount: Decimal, settings: &LoyaltySettings) -> u64 {
    if !settings.enabled || amount < settings.min_purchase_for_points {
        return 0;
    }

    (amount * settings.points_per_currency)
        .floor()
        .to_u64()
        .unwrap_or(0)
}

/// Currency value of `points`
pub fn redemption_value(points: u64, settings: &LoyaltySettings) -> Decimal {
    Decimal::from(points) * settings.currency_per_point
}

/// Points needed to cover `value`, rounded up to a whole point
pub fn points_for_value(value: Decimal, settings: &LoyaltySettings) -> PaymentResult<u64> {
    if !settings.enabled || settings.currency_per_point <= Decimal::ZERO {
        return Err(PaymentError::LoyaltyDisabled);
    }
    (value / settings.currency_per_point)
        .ceil()
        .to_u64()
        .ok_or(PaymentError::NoLoyaltyPoints)
}

/// Check a redemption of `points` against the customer's balance and the
/// share of the bill points may cover. Returns the currency value.
pub fn validate_redemption(
    points: u64,
    balance: u64,
    final_amount: Decimal,
    settings: &LoyaltySettings,
) -> PaymentResult<Decimal> {
    if !settings.enabled {
        return Err(PaymentError::LoyaltyDisabled);
    }
    if points == 0 {
        return Err(PaymentError::NoLoyaltyPoints);
    }
    if points > balance {
        return Err(PaymentError::InsufficientLoyaltyPoints {
            available: balance,
            requested: points,
        });
    }
    if points < settings.min_redemption_points {
        return Err(PaymentError::BelowMinimumRedemption {
            minimum: settings.min_redemption_points,
        });
    }

    let value = redemption_value(points, settings);
    let limit = final_amount * settings.max_redemption_percent / Decimal::ONE_HUNDRED;
    if value > limit {
        return Err(PaymentError::RedemptionLimitExceeded { value, limit });
    }

    Ok(value)
}

/// Highest tier whose threshold the customer has reached
pub fn tier_for(points: u64, settings: &LoyaltySettings) -> Option<&LoyaltyTier> {
    settings
        .tiers
        .iter()
        .filter(|tier| tier.min_points <= points)
        .max_by_key(|tier| tier.min_points)
}
