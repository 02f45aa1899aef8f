// src/domain/mod.rs
pub mod errors;
pub mod model;
pub mod repository;
pub mod service;

// Re-export common types for convenience
pub use errors::{
    AppError, AppResult, DomainError, PaymentError, PermissionError, PricingError, RepositoryError,
};
pub use model::{
    CartItem, CartTotals, ConditionMultipliers, ConditionRating, Customer, DamageItem, Discount,
    PaymentMethodKind, PaymentRequest, PosSettings, Reference, Sale, SplitPayment,
    TradeInCalculation, TradeInContract, TradeInPrice, TradeInStatus, TradeInTransaction,
};
