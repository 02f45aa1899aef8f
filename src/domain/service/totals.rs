// src/domain/service/totals.rs
// Cart math: subtotal, discount, tax and final amount

use rust_decimal::Decimal;

use crate::domain::errors::{PricingError, PricingResult};
use crate::domain::model::{CartItem, CartTotals, Discount, GeneralSettings};

/// Extra amounts that move the payable total after tax
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TotalsAdjustments {
    pub tip: Decimal,
    /// Gift card or loyalty credit subtracted from the bill
    pub credits: Decimal,
}

pub fn subtotal(items: &[CartItem]) -> Decimal {
    items.iter().map(CartItem::line_total).sum()
}

/// Discount in currency units, clamped to `[0, subtotal]`.
///
/// A percentage above 100 or a fixed amount above the subtotal is capped at
/// the subtotal so the payable amount never goes below zero.
pub fn discount_amount(subtotal: Decimal, discount: Option<&Discount>) -> PricingResult<Decimal> {
    let Some(discount) = discount else {
        return Ok(Decimal::ZERO);
    };

    if discount.value() < Decimal::ZERO {
        return Err(PricingError::NegativeDiscount(discount.value()));
    }

    let raw = match discount {
        Discount::Percentage(pct) => subtotal * pct / Decimal::ONE_HUNDRED,
        Discount::Fixed(value) => *value,
    };

    if raw > subtotal {
        log::warn!(
            "Discount {} ({}) exceeds subtotal {}, capping",
            discount,
            raw,
            subtotal
        );
    }

    Ok(raw.min(subtotal).max(Decimal::ZERO))
}

/// Tax on the discounted amount; zero while tax is disabled
pub fn tax_amount(taxable_amount: Decimal, general: &GeneralSettings) -> Decimal {
    taxable_amount * general.effective_tax_rate() / Decimal::ONE_HUNDRED
}

pub fn calculate_totals(
    items: &[CartItem],
    discount: Option<&Discount>,
    general: &GeneralSettings,
    adjustments: TotalsAdjustments,
) -> PricingResult<CartTotals> {
    if adjustments.tip < Decimal::ZERO {
        return Err(PricingError::NegativeTip(adjustments.tip));
    }

    let subtotal = subtotal(items);
    let discount_amount = discount_amount(subtotal, discount)?;
    let taxable_amount = subtotal - discount_amount;
    let tax_amount = tax_amount(taxable_amount, general);
    let credits = adjustments.credits.max(Decimal::ZERO);

    let final_amount =
        (taxable_amount + tax_amount + adjustments.tip - credits).max(Decimal::ZERO);

    Ok(CartTotals {
        subtotal,
        discount_amount,
        taxable_amount,
        tax_rate: general.effective_tax_rate(),
        tax_amount,
        tip_amount: adjustments.tip,
        adjustments: credits,
        final_amount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn cart() -> Vec<CartItem> {
        vec![
            CartItem::new("p1", "Phone case", 2, dec!(15000)),
            CartItem::new("p2", "Charger", 1, dec!(20000)),
        ]
    }

    fn taxed() -> GeneralSettings {
        GeneralSettings {
            enable_tax: true,
            ..GeneralSettings::default()
        }
    }

    #[test]
    fn test_subtotal_sums_line_totals() {
        assert_eq!(subtotal(&cart()), dec!(50000));
        assert_eq!(subtotal(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_percentage_and_fixed_discounts() {
        assert_eq!(
            discount_amount(dec!(50000), Some(&Discount::Percentage(dec!(10)))).unwrap(),
            dec!(5000)
        );
        assert_eq!(
            discount_amount(dec!(50000), Some(&Discount::Fixed(dec!(7500)))).unwrap(),
            dec!(7500)
        );
        assert_eq!(discount_amount(dec!(50000), None).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_oversized_discount_is_capped_at_subtotal() {
        assert_eq!(
            discount_amount(dec!(50000), Some(&Discount::Percentage(dec!(150)))).unwrap(),
            dec!(50000)
        );
        assert_eq!(
            discount_amount(dec!(50000), Some(&Discount::Fixed(dec!(80000)))).unwrap(),
            dec!(50000)
        );
    }

    #[test]
    fn test_negative_discount_is_rejected() {
        let err = discount_amount(dec!(50000), Some(&Discount::Fixed(dec!(-1)))).unwrap_err();
        assert_eq!(err, PricingError::NegativeDiscount(dec!(-1)));
    }

    #[test]
    fn test_totals_without_tax() {
        let totals = calculate_totals(
            &cart(),
            Some(&Discount::Percentage(dec!(10))),
            &GeneralSettings::default(),
            TotalsAdjustments::default(),
        )
        .unwrap();

        assert_eq!(totals.subtotal, dec!(50000));
        assert_eq!(totals.discount_amount, dec!(5000));
        assert_eq!(totals.taxable_amount, dec!(45000));
        assert_eq!(totals.tax_amount, Decimal::ZERO);
        assert_eq!(totals.final_amount, dec!(45000));
        assert_eq!(totals.discount_percentage(), dec!(10));
    }

    #[test]
    fn test_totals_with_tax_tip_and_credit() {
        let totals = calculate_totals(
            &cart(),
            Some(&Discount::Fixed(dec!(10000))),
            &taxed(),
            TotalsAdjustments {
                tip: dec!(2000),
                credits: dec!(1200),
            },
        )
        .unwrap();

        assert_eq!(totals.taxable_amount, dec!(40000));
        assert_eq!(totals.tax_amount, dec!(7200));
        assert_eq!(totals.final_amount, dec!(48000));
    }

    #[test]
    fn test_full_discount_with_tip_stays_non_negative() {
        let totals = calculate_totals(
            &cart(),
            Some(&Discount::Percentage(dec!(100))),
            &taxed(),
            TotalsAdjustments {
                tip: Decimal::ZERO,
                credits: dec!(5000),
            },
        )
        .unwrap();
        assert_eq!(totals.final_amount, Decimal::ZERO);
    }

    #[test]
    fn test_negative_tip_is_rejected() {
        let result = calculate_totals(
            &cart(),
            None,
            &GeneralSettings::default(),
            TotalsAdjustments {
                tip: dec!(-10),
                credits: Decimal::ZERO,
            },
        );
        assert_eq!(result, Err(PricingError::NegativeTip(dec!(-10))));
    }
}
