// src/domain/service/valuation.rs
// Trade-in valuation and customer payment after trade-in credit

use rust_decimal::Decimal;

use crate::domain::model::{ConditionMultipliers, ConditionRating, DamageItem, TradeInCalculation};

/// Calculate trade-in value based on condition and damage.
///
/// The condition-adjusted price is `base_price * multiplier`; every damage
/// item is deducted in full and the result floors at zero. No rounding is
/// applied here, callers round for display.
pub fn calculate_trade_in_value(
    base_price: Decimal,
    condition_rating: ConditionRating,
    multipliers: &ConditionMultipliers,
    damage_items: &[DamageItem],
) -> TradeInCalculation {
    let multiplier = multipliers.multiplier_for(condition_rating);
    let condition_adjusted_price = base_price * multiplier;

    let total_damage_deductions: Decimal = damage_items.iter().map(DamageItem::deduction).sum();

    let final_trade_in_value =
        (condition_adjusted_price - total_damage_deductions).max(Decimal::ZERO);

    log::debug!(
        "Trade-in valuation: base={} condition={} adjusted={} deductions={} final={}",
        base_price,
        condition_rating,
        condition_adjusted_price,
        total_damage_deductions,
        final_trade_in_value
    );

    TradeInCalculation {
        base_price,
        condition_rating,
        condition_multiplier: multiplier,
        condition_adjusted_price,
        damage_deductions: damage_items.to_vec(),
        total_damage_deductions,
        final_trade_in_value,
        customer_payment_amount: None,
    }
}

/// Amount the customer still owes for a new device after trade-in credit.
/// A trade-in worth more than the device means the customer owes nothing.
pub fn calculate_customer_payment(new_device_price: Decimal, trade_in_value: Decimal) -> Decimal {
    (new_device_price - trade_in_value).max(Decimal::ZERO)
}

/// Attach the customer payment to a calculation when a new device is part of the deal
pub fn with_new_device(
    mut calculation: TradeInCalculation,
    new_device_price: Option<Decimal>,
) -> TradeInCalculation {
    calculation.customer_payment_amount = new_device_price
        .map(|price| calculate_customer_payment(price, calculation.final_trade_in_value));
    calculation
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn multipliers() -> ConditionMultipliers {
        ConditionMultipliers {
            excellent: dec!(1.0),
            good: dec!(0.8),
            fair: dec!(0.6),
            poor: dec!(0.3),
        }
    }

    fn damage(price: Decimal) -> DamageItem {
        DamageItem::new(price, "cracked screen")
    }

    #[test]
    fn test_excellent_without_damage_keeps_base_price() {
        let calc = calculate_trade_in_value(
            dec!(1000000),
            ConditionRating::Excellent,
            &multipliers(),
            &[],
        );
        assert_eq!(calc.final_trade_in_value, dec!(1000000));
        assert_eq!(calc.total_damage_deductions, Decimal::ZERO);
        assert_eq!(calc.condition_multiplier, dec!(1.0));
    }

    #[test]
    fn test_good_condition_with_damage() {
        let calc = calculate_trade_in_value(
            dec!(1000000),
            ConditionRating::Good,
            &multipliers(),
            &[damage(dec!(100000))],
        );
        assert_eq!(calc.condition_adjusted_price, dec!(800000));
        assert_eq!(calc.total_damage_deductions, dec!(100000));
        assert_eq!(calc.final_trade_in_value, dec!(700000));
    }

    #[test]
    fn test_deductions_larger_than_value_floor_at_zero() {
        let calc = calculate_trade_in_value(
            dec!(100000),
            ConditionRating::Poor,
            &multipliers(),
            &[damage(dec!(500000))],
        );
        assert_eq!(calc.condition_adjusted_price, dec!(30000));
        assert_eq!(calc.final_trade_in_value, Decimal::ZERO);
    }

    #[test]
    fn test_zero_base_price_is_zero() {
        let calc = calculate_trade_in_value(Decimal::ZERO, ConditionRating::Good, &multipliers(), &[]);
        assert_eq!(calc.final_trade_in_value, Decimal::ZERO);
    }

    #[test]
    fn test_missing_and_negative_prices_count_as_zero() {
        let items = vec![
            damage(dec!(20000)),
            DamageItem {
                price: None,
                description: Some("missing charger".to_string()),
                spare_part_id: None,
            },
            damage(dec!(-5000)),
        ];
        let calc =
            calculate_trade_in_value(dec!(200000), ConditionRating::Excellent, &multipliers(), &items);
        assert_eq!(calc.total_damage_deductions, dec!(20000));
        assert_eq!(calc.final_trade_in_value, dec!(180000));
        assert_eq!(calc.damage_deductions.len(), 3);
    }

    #[test]
    fn test_value_bounded_by_base_price_for_every_condition() {
        for base in [dec!(0), dec!(1), dec!(99999.99), dec!(1000000)] {
            for rating in ConditionRating::ALL {
                let calc = calculate_trade_in_value(base, rating, &multipliers(), &[]);
                assert!(calc.final_trade_in_value <= base, "{rating} at {base}");
                assert!(calc.final_trade_in_value >= Decimal::ZERO);
            }
        }
    }

    #[test]
    fn test_raising_a_deduction_never_raises_value() {
        let mut previous = None;
        for price in [dec!(0), dec!(10000), dec!(50000), dec!(300000), dec!(900000)] {
            let items = vec![damage(dec!(25000)), damage(price)];
            let value =
                calculate_trade_in_value(dec!(500000), ConditionRating::Fair, &multipliers(), &items)
                    .final_trade_in_value;
            if let Some(prev) = previous {
                assert!(value <= prev);
            }
            previous = Some(value);
        }
    }

    #[test]
    fn test_customer_payment() {
        assert_eq!(calculate_customer_payment(dec!(500000), dec!(700000)), Decimal::ZERO);
        assert_eq!(calculate_customer_payment(dec!(1000000), dec!(300000)), dec!(700000));
    }

    #[test]
    fn test_with_new_device_sets_payment_only_when_priced() {
        let calc = calculate_trade_in_value(dec!(400000), ConditionRating::Good, &multipliers(), &[]);
        let without = with_new_device(calc.clone(), None);
        assert_eq!(without.customer_payment_amount, None);

        let with = with_new_device(calc, Some(dec!(1000000)));
        assert_eq!(with.customer_payment_amount, Some(dec!(680000)));
    }
}
