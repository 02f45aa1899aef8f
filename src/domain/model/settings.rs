// src/domain/model/settings.rs
// Typed settings groups, loaded and saved through a SettingsRepository

use chrono::NaiveTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::permissions::{PermissionSet, UserRole};
use super::trade_in::ConditionMultipliers;

/// All register settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PosSettings {
    pub general: GeneralSettings,
    pub receipt: ReceiptSettings,
    pub notifications: NotificationSettings,
    pub pricing: PricingSettings,
    pub permissions: PermissionSettings,
    pub loyalty: LoyaltySettings,
    pub trade_in: TradeInSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub business_name: String,
    pub business_phone: Option<String>,
    pub business_email: Option<String>,
    pub business_address: Option<String>,
    pub business_website: Option<String>,
    /// ISO 4217 code
    pub currency: String,
    pub enable_tax: bool,
    /// Percentage, 18 means 18%
    pub tax_rate: Decimal,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            business_name: "My Store".to_string(),
            business_phone: None,
            business_email: None,
            business_address: None,
            business_website: None,
            currency: "TZS".to_string(),
            enable_tax: false,
            tax_rate: dec!(18),
        }
    }
}

impl GeneralSettings {
    /// Tax rate that actually applies, zero while tax is disabled
    pub fn effective_tax_rate(&self) -> Decimal {
        if self.enable_tax {
            self.tax_rate
        } else {
            Decimal::ZERO
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptSettings {
    /// Characters per line when rendered as text
    pub receipt_width: usize,
    pub show_business_name: bool,
    pub show_business_address: bool,
    pub show_business_phone: bool,
    pub show_transaction_id: bool,
    pub show_date_time: bool,
    pub show_cashier_name: bool,
    pub show_customer_name: bool,
    pub show_customer_phone: bool,
    pub show_product_names: bool,
    pub show_product_skus: bool,
    pub show_quantities: bool,
    pub show_unit_prices: bool,
    pub show_subtotal: bool,
    pub show_tax: bool,
    pub show_discount_total: bool,
    pub show_grand_total: bool,
    pub show_payment_method: bool,
    pub show_change_amount: bool,
    pub auto_print_receipt: bool,
    pub footer_message: String,
}

impl Default for ReceiptSettings {
    fn default() -> Self {
        Self {
            receipt_width: 40,
            show_business_name: true,
            show_business_address: true,
            show_business_phone: true,
            show_transaction_id: true,
            show_date_time: true,
            show_cashier_name: true,
            show_customer_name: true,
            show_customer_phone: false,
            show_product_names: true,
            show_product_skus: false,
            show_quantities: true,
            show_unit_prices: true,
            show_subtotal: true,
            show_tax: true,
            show_discount_total: true,
            show_grand_total: true,
            show_payment_method: true,
            show_change_amount: true,
            auto_print_receipt: false,
            footer_message: "Thank you for your business!".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub whatsapp_enabled: bool,
    pub whatsapp_auto_send: bool,
    pub whatsapp_message: String,
    pub sms_enabled: bool,
    pub sms_auto_send: bool,
    pub sms_template: String,
    pub email_enabled: bool,
    pub email_auto_send: bool,
    pub email_subject: String,
    pub email_template: String,
    pub notify_on_payment: bool,
    pub notify_on_refund: bool,
    pub notify_low_stock: bool,
    pub notify_new_customer: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            whatsapp_enabled: false,
            whatsapp_auto_send: false,
            whatsapp_message: "Hello {customer_name}, here is your receipt {invoice_no} from {business_name}. Total: {total}".to_string(),
            sms_enabled: true,
            sms_auto_send: false,
            sms_template: "Thank you! Total: {total}. Balance: {balance}. Ref: {invoice_no}".to_string(),
            email_enabled: false,
            email_auto_send: false,
            email_subject: "Your receipt {invoice_no} from {business_name}".to_string(),
            email_template: "Dear {customer_name},\n\nThank you for your purchase!\n\nInvoice: {invoice_no}\nTotal: {total}\nPaid: {paid}\nBalance: {balance}\n\nBest regards,\n{business_name}".to_string(),
            notify_on_payment: true,
            notify_on_refund: true,
            notify_low_stock: true,
            notify_new_customer: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    pub default_markup_percentage: Decimal,
    pub enable_dynamic_pricing: bool,
    pub loyalty_discount: LoyaltyDiscountPreset,
    pub bulk_discount: BulkDiscountPreset,
    pub happy_hour: HappyHourPreset,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            default_markup_percentage: dec!(30),
            enable_dynamic_pricing: false,
            loyalty_discount: LoyaltyDiscountPreset::default(),
            bulk_discount: BulkDiscountPreset::default(),
            happy_hour: HappyHourPreset::default(),
        }
    }
}

/// Automatic discount for customers above a points threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoyaltyDiscountPreset {
    pub enabled: bool,
    pub discount_percent: Decimal,
    pub points_threshold: u64,
    pub max_discount_percent: Decimal,
}

impl Default for LoyaltyDiscountPreset {
    fn default() -> Self {
        Self {
            enabled: true,
            discount_percent: dec!(5),
            points_threshold: 1000,
            max_discount_percent: dec!(20),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkDiscountPreset {
    pub enabled: bool,
    pub min_quantity: u32,
    pub discount_percent: Decimal,
}

impl Default for BulkDiscountPreset {
    fn default() -> Self {
        Self {
            enabled: false,
            min_quantity: 10,
            discount_percent: dec!(10),
        }
    }
}

/// Time-of-day discount, active in `[start_time, end_time)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HappyHourPreset {
    pub enabled: bool,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub discount_percent: Decimal,
}

impl Default for HappyHourPreset {
    fn default() -> Self {
        Self {
            enabled: false,
            start_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or(NaiveTime::MIN),
            end_time: NaiveTime::from_hms_opt(21, 0, 0).unwrap_or(NaiveTime::MIN),
            discount_percent: dec!(15),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionSettings {
    pub default_role: UserRole,
    /// Used for the `custom` role
    pub custom_permissions: Option<PermissionSet>,
}

impl Default for PermissionSettings {
    fn default() -> Self {
        Self {
            default_role: UserRole::Cashier,
            custom_permissions: None,
        }
    }
}

impl PermissionSettings {
    pub fn permissions_for(&self, role: UserRole) -> PermissionSet {
        match (role, &self.custom_permissions) {
            (UserRole::Custom, Some(custom)) => custom.clone(),
            _ => PermissionSet::for_role(role),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyTier {
    pub name: String,
    pub min_points: u64,
    pub max_points: Option<u64>,
    pub discount_percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoyaltySettings {
    pub enabled: bool,
    pub points_per_currency: Decimal,
    pub currency_per_point: Decimal,
    pub min_purchase_for_points: Decimal,
    pub min_redemption_points: u64,
    /// Largest share of a bill that points may cover
    pub max_redemption_percent: Decimal,
    pub tiers: Vec<LoyaltyTier>,
}

impl Default for LoyaltySettings {
    fn default() -> Self {
        let tier = |name: &str, min_points, max_points, pct| LoyaltyTier {
            name: name.to_string(),
            min_points,
            max_points,
            discount_percentage: pct,
        };

        Self {
            enabled: true,
            points_per_currency: dec!(1),
            currency_per_point: dec!(0.01),
            min_purchase_for_points: dec!(1),
            min_redemption_points: 100,
            max_redemption_percent: dec!(50),
            tiers: vec![
                tier("Bronze", 0, Some(999), dec!(5)),
                tier("Silver", 1000, Some(4999), dec!(10)),
                tier("Gold", 5000, Some(9999), dec!(15)),
                tier("Platinum", 10000, None, dec!(20)),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradeInSettings {
    pub multipliers: ConditionMultipliers,
    pub terms_and_conditions: String,
}

impl Default for TradeInSettings {
    fn default() -> Self {
        Self {
            multipliers: ConditionMultipliers::default(),
            terms_and_conditions: "The customer confirms they are the lawful owner of the device, \
that it is not reported lost or stolen, and that all personal data has been removed. \
The agreed trade-in value is final once the contract is signed."
                .to_string(),
        }
    }
}
