pub mod checkout_usecase;
pub mod payment_flow;
pub mod settings_usecase;
pub mod trade_in_usecase;

// Re-export public API
pub use checkout_usecase::{CheckoutManager, CheckoutOutcome, CheckoutUseCase, PricedCart};
pub use payment_flow::{PaymentSession, PaymentState};
pub use settings_usecase::{SettingsManager, SettingsUseCase};
pub use trade_in_usecase::{TradeInManager, TradeInUseCase};
