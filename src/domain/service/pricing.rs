// src/domain/service/pricing.rs
// Markup helpers and dynamic pricing presets

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::errors::{PricingError, PricingResult};
use crate::domain::model::settings::HappyHourPreset;
use crate::domain::model::{CartItem, Customer, Discount, PricingSettings};

/// `(selling - cost) / cost * 100`, `None` when cost is zero
pub fn markup_percentage(cost: Decimal, selling: Decimal) -> Option<Decimal> {
    if cost.is_zero() {
        return None;
    }
    Some((selling - cost) / cost * Decimal::ONE_HUNDRED)
}

pub fn selling_price_from_markup(cost: Decimal, markup_percentage: Decimal) -> PricingResult<Decimal> {
    if cost < Decimal::ZERO {
        return Err(PricingError::InvalidCost(cost));
    }
    Ok(cost * (Decimal::ONE + markup_percentage / Decimal::ONE_HUNDRED))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresetKind {
    Loyalty,
    Bulk,
    HappyHour,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AppliedPreset {
    pub kind: PresetKind,
    pub percent: Decimal,
}

impl AppliedPreset {
    pub fn as_discount(&self) -> Discount {
        Discount::Percentage(self.percent)
    }
}

fn in_window(preset: &HappyHourPreset, at: NaiveTime) -> bool {
    if preset.start_time <= preset.end_time {
        at >= preset.start_time && at < preset.end_time
    } else {
        // window crosses midnight
        at >= preset.start_time || at < preset.end_time
    }
}

/// Best dynamic pricing preset for this cart. Presets do not stack; the
/// largest applicable percentage wins.
pub fn best_dynamic_discount(
    settings: &PricingSettings,
    items: &[CartItem],
    customer: Option<&Customer>,
    at: NaiveTime,
) -> Option<AppliedPreset> {
    if !settings.enable_dynamic_pricing {
        return None;
    }

    let mut candidates = Vec::with_capacity(3);

    let loyalty = &settings.loyalty_discount;
    if loyalty.enabled {
        if let Some(customer) = customer {
            if customer.loyalty_points >= loyalty.points_threshold {
                candidates.push(AppliedPreset {
                    kind: PresetKind::Loyalty,
                    percent: loyalty.discount_percent.min(loyalty.max_discount_percent),
                });
            }
        }
    }

    let bulk = &settings.bulk_discount;
    let quantity: u64 = items.iter().map(|i| u64::from(i.quantity)).sum();
    if bulk.enabled && quantity >= u64::from(bulk.min_quantity) {
        candidates.push(AppliedPreset {
            kind: PresetKind::Bulk,
            percent: bulk.discount_percent,
        });
    }

    let happy_hour = &settings.happy_hour;
    if happy_hour.enabled && in_window(happy_hour, at) {
        candidates.push(AppliedPreset {
            kind: PresetKind::HappyHour,
            percent: happy_hour.discount_percent,
        });
    }

    candidates
        .into_iter()
        .filter(|c| c.percent > Decimal::ZERO)
        .max_by(|a, b| a.percent.cmp(&b.percent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn dynamic() -> PricingSettings {
        PricingSettings {
            enable_dynamic_pricing: true,
            ..PricingSettings::default()
        }
    }

    #[test]
    fn test_markup_percentage() {
        assert_eq!(markup_percentage(dec!(100), dec!(130)), Some(dec!(30)));
        assert_eq!(markup_percentage(Decimal::ZERO, dec!(130)), None);
    }

    #[test]
    fn test_selling_price_from_markup() {
        assert_eq!(selling_price_from_markup(dec!(200000), dec!(30)).unwrap(), dec!(260000));
        assert!(selling_price_from_markup(dec!(-1), dec!(30)).is_err());
    }

    #[test]
    fn test_dynamic_pricing_disabled() {
        let customer = Customer::new("c1", "Juma").with_points(5000);
        let items = vec![CartItem::new("p1", "Cable", 20, dec!(5000))];
        assert!(best_dynamic_discount(&PricingSettings::default(), &items, Some(&customer), at(19, 0)).is_none());
    }

    #[test]
    fn test_loyalty_preset_needs_threshold() {
        let items = vec![CartItem::new("p1", "Cable", 1, dec!(5000))];
        let regular = Customer::new("c1", "Juma").with_points(999);
        let loyal = Customer::new("c2", "Neema").with_points(1000);

        assert!(best_dynamic_discount(&dynamic(), &items, Some(&regular), at(10, 0)).is_none());
        assert_eq!(
            best_dynamic_discount(&dynamic(), &items, Some(&loyal), at(10, 0)),
            Some(AppliedPreset {
                kind: PresetKind::Loyalty,
                percent: dec!(5)
            })
        );
    }

    #[test]
    fn test_largest_preset_wins() {
        let mut settings = dynamic();
        settings.bulk_discount.enabled = true;
        settings.happy_hour.enabled = true;

        let items = vec![CartItem::new("p1", "Cable", 12, dec!(5000))];
        let loyal = Customer::new("c2", "Neema").with_points(2000);

        let applied = best_dynamic_discount(&settings, &items, Some(&loyal), at(19, 30)).unwrap();
        assert_eq!(applied.kind, PresetKind::HappyHour);
        assert_eq!(applied.as_discount(), Discount::Percentage(dec!(15)));

        let applied = best_dynamic_discount(&settings, &items, Some(&loyal), at(21, 0)).unwrap();
        assert_eq!(applied.kind, PresetKind::Bulk);
    }

    #[test]
    fn test_bulk_quantity_does_not_wrap() {
        let mut settings = dynamic();
        settings.bulk_discount.enabled = true;

        let huge = u32::MAX / 2 + 1;
        let items = vec![
            CartItem::new("p1", "Cable", huge, dec!(1)),
            CartItem::new("p2", "Adapter", huge, dec!(1)),
        ];
        let applied = best_dynamic_discount(&settings, &items, None, at(10, 0)).unwrap();
        assert_eq!(applied.kind, PresetKind::Bulk);
    }

    #[test]
    fn test_happy_hour_across_midnight() {
        let preset = HappyHourPreset {
            enabled: true,
            start_time: at(22, 0),
            end_time: at(2, 0),
            discount_percent: dec!(10),
        };
        assert!(in_window(&preset, at(23, 15)));
        assert!(in_window(&preset, at(1, 59)));
        assert!(!in_window(&preset, at(2, 0)));
        assert!(!in_window(&preset, at(12, 0)));
    }
}
