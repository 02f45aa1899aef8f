// src/infrastructure/mod.rs
// Implementations of the domain repository traits

pub mod customer;
pub mod payment;
pub mod settings;
pub mod trade_in;

pub use customer::InMemoryCustomerRepository;
pub use payment::RecordingPaymentProcessor;
pub use settings::{InMemorySettingsRepository, JsonFileSettingsRepository};
pub use trade_in::{InMemoryPriceCatalog, InMemoryTradeInRepository};
