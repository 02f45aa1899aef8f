// src/domain/model/mod.rs
// Core domain models

pub mod cart;
pub mod customer;
pub mod payment;
pub mod permissions;
pub mod sale;
pub mod settings;
pub mod trade_in;

pub use cart::{CartItem, CartTotals, Discount};
pub use customer::Customer;
pub use payment::{PaymentConfirmation, PaymentMethodKind, PaymentRequest, Reference, SplitPayment};
pub use permissions::{Permission, PermissionSet, UserRole};
pub use sale::Sale;
pub use settings::{
    GeneralSettings, LoyaltySettings, LoyaltyTier, NotificationSettings, PermissionSettings,
    PosSettings, PricingSettings, ReceiptSettings, TradeInSettings,
};
pub use trade_in::{
    ConditionMultipliers, ConditionRating, DamageItem, TradeInCalculation, TradeInContract,
    TradeInFilters, TradeInPrice, TradeInPriceFilters, TradeInStatus, TradeInTransaction,
};
